//! Branch link queries.
//!
//! A branch row links a child SWIFT code to its headquarters. A `NULL`
//! headquarter means the link is dangling.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Branch link row from database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRow {
    pub swift_code: String,
    pub headquarter: Option<String>,
    pub created_at: String,
    pub linked_at: Option<String>,
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<BranchRow> {
    Ok(BranchRow {
        swift_code: row.get(0)?,
        headquarter: row.get(1)?,
        created_at: row.get(2)?,
        linked_at: row.get(3)?,
    })
}

/// Insert a branch link, ignoring the write if the child already has one.
///
/// Returns `true` when a row was written.
pub fn insert_branch(conn: &Connection, swift_code: &str, headquarter: Option<&str>) -> DbResult<bool> {
    let changed = conn.execute(
        "INSERT INTO branches (swift_code, headquarter, linked_at)
         VALUES (?1, ?2, CASE WHEN ?2 IS NULL THEN NULL ELSE datetime('now') END)
         ON CONFLICT (swift_code) DO NOTHING",
        params![swift_code, headquarter],
    )?;
    Ok(changed == 1)
}

/// Point every dangling link derived from `headquarter` at it.
///
/// A link matches when the first eight characters of its child code followed
/// by `XXX` equal `headquarter`. Nothing is updated unless `headquarter` is
/// stored as a headquarters row. Returns the number of links repaired.
pub fn repair_dangling(conn: &Connection, headquarter: &str) -> DbResult<usize> {
    let repaired = conn.execute(
        "UPDATE branches
         SET headquarter = ?1, linked_at = datetime('now')
         WHERE headquarter IS NULL
           AND substr(swift_code, 1, 8) || 'XXX' = ?1
           AND EXISTS (SELECT 1 FROM swift_codes WHERE swift_code = ?1 AND is_headquarter = 1)",
        params![headquarter],
    )?;
    Ok(repaired)
}

/// Remove the link row owned by a child code.
pub fn delete_branch(conn: &Connection, swift_code: &str) -> DbResult<usize> {
    let removed = conn.execute(
        "DELETE FROM branches WHERE swift_code = ?1",
        params![swift_code],
    )?;
    Ok(removed)
}

/// Turn every link pointing at `headquarter` back into a dangling link.
pub fn detach_branches_of(conn: &Connection, headquarter: &str) -> DbResult<usize> {
    let detached = conn.execute(
        "UPDATE branches SET headquarter = NULL, linked_at = NULL WHERE headquarter = ?1",
        params![headquarter],
    )?;
    Ok(detached)
}

/// Count link rows that mention `swift_code` as child or as headquarters.
pub fn count_referencing(conn: &Connection, swift_code: &str) -> DbResult<usize> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM branches WHERE swift_code = ?1 OR headquarter = ?1",
        params![swift_code],
        |row| row.get(0),
    )?;
    Ok(count as usize)
}

/// Get the link row of a child code, if any.
pub fn get_branch(pool: &DbPool, swift_code: &str) -> DbResult<Option<BranchRow>> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT swift_code, headquarter, created_at, linked_at
             FROM branches WHERE swift_code = ?1",
            params![swift_code],
            map_row,
        )
        .optional()
        .map_err(DbError::from)
    })
}

/// List every dangling link.
pub fn list_dangling(pool: &DbPool) -> DbResult<Vec<BranchRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT swift_code, headquarter, created_at, linked_at
             FROM branches WHERE headquarter IS NULL
             ORDER BY swift_code",
        )?;

        let rows = stmt.query_map([], map_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Dangling links whose derived headquarters is stored right now.
///
/// Returns `(branch, headquarter)` pairs.
pub fn list_stale_dangling(pool: &DbPool) -> DbResult<Vec<(String, String)>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT b.swift_code, hq.swift_code
             FROM branches b
             JOIN swift_codes hq
               ON hq.swift_code = substr(b.swift_code, 1, 8) || 'XXX'
              AND hq.is_headquarter = 1
             WHERE b.headquarter IS NULL
             ORDER BY b.swift_code",
        )?;

        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Links whose headquarters is missing or not a headquarters row, or whose
/// own child row is gone.
pub fn list_orphaned(pool: &DbPool) -> DbResult<Vec<BranchRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT b.swift_code, b.headquarter, b.created_at, b.linked_at
             FROM branches b
             WHERE (b.headquarter IS NOT NULL AND NOT EXISTS (
                        SELECT 1 FROM swift_codes hq
                        WHERE hq.swift_code = b.headquarter AND hq.is_headquarter = 1))
                OR NOT EXISTS (SELECT 1 FROM swift_codes c WHERE c.swift_code = b.swift_code)
             ORDER BY b.swift_code",
        )?;

        let rows = stmt.query_map([], map_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Link rows owned by a code that is stored as a headquarters.
pub fn list_linked_headquarters(pool: &DbPool) -> DbResult<Vec<BranchRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT b.swift_code, b.headquarter, b.created_at, b.linked_at
             FROM branches b
             JOIN swift_codes s ON s.swift_code = b.swift_code
             WHERE s.is_headquarter = 1
             ORDER BY b.swift_code",
        )?;

        let rows = stmt.query_map([], map_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}
