//! SWIFT code (entity) queries.
//!
//! Writes and existence checks take a `&Connection` so callers can run them
//! either on a plain connection or inside an open `Transaction` (which derefs
//! to `Connection`). Reads that never participate in a transaction take the
//! pool, like the rest of the query modules.

use crate::pool::{DbError, DbPool, DbResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// SWIFT code row from database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwiftCodeRow {
    pub swift_code: String,
    pub country_iso2: String,
    pub country_name: String,
    pub bank_name: String,
    pub address: String,
    pub is_headquarter: bool,
    pub created_at: String,
}

/// Column values for a new SWIFT code row.
#[derive(Debug, Clone, Copy)]
pub struct NewSwiftCode<'a> {
    pub swift_code: &'a str,
    pub country_iso2: &'a str,
    pub country_name: &'a str,
    pub bank_name: &'a str,
    pub address: &'a str,
    pub is_headquarter: bool,
}

const COLUMNS: &str =
    "swift_code, country_iso2, country_name, bank_name, address, is_headquarter, created_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<SwiftCodeRow> {
    Ok(SwiftCodeRow {
        swift_code: row.get(0)?,
        country_iso2: row.get(1)?,
        country_name: row.get(2)?,
        bank_name: row.get(3)?,
        address: row.get(4)?,
        is_headquarter: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a SWIFT code, ignoring the write if the code already exists.
///
/// Returns `true` when a row was written, `false` on conflict.
pub fn insert_swift_code(conn: &Connection, code: &NewSwiftCode<'_>) -> DbResult<bool> {
    let changed = conn.execute(
        "INSERT INTO swift_codes (swift_code, country_iso2, country_name,
                                  bank_name, address, is_headquarter)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (swift_code) DO NOTHING",
        params![
            code.swift_code,
            code.country_iso2,
            code.country_name,
            code.bank_name,
            code.address,
            code.is_headquarter
        ],
    )?;
    Ok(changed == 1)
}

/// Whether a headquarters row with this code is visible on `conn`.
pub fn headquarter_exists(conn: &Connection, swift_code: &str) -> DbResult<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM swift_codes WHERE swift_code = ?1 AND is_headquarter = 1)",
        params![swift_code],
        |row| row.get(0),
    )?;
    Ok(exists)
}

/// Stored `is_headquarter` flag of a code, `None` when the code is absent.
pub fn stored_role(conn: &Connection, swift_code: &str) -> DbResult<Option<bool>> {
    let role = conn
        .query_row(
            "SELECT is_headquarter FROM swift_codes WHERE swift_code = ?1",
            params![swift_code],
            |row| row.get(0),
        )
        .optional()?;
    Ok(role)
}

/// Delete a SWIFT code by primary key. Returns the number of rows removed.
pub fn delete_swift_code(conn: &Connection, swift_code: &str) -> DbResult<usize> {
    let removed = conn.execute(
        "DELETE FROM swift_codes WHERE swift_code = ?1",
        params![swift_code],
    )?;
    Ok(removed)
}

/// Get a SWIFT code by primary key.
pub fn get_swift_code(pool: &DbPool, swift_code: &str) -> DbResult<SwiftCodeRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM swift_codes WHERE swift_code = ?1"),
            params![swift_code],
            map_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                DbError::NotFound(format!("SWIFT code: {}", swift_code))
            }
            e => DbError::Connection(e),
        })
    })
}

/// List every SWIFT code registered for a country.
pub fn list_by_country(pool: &DbPool, country_iso2: &str) -> DbResult<Vec<SwiftCodeRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM swift_codes WHERE country_iso2 = ?1 ORDER BY swift_code"
        ))?;

        let rows = stmt.query_map(params![country_iso2], map_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// List the branch rows linked to a headquarters code.
pub fn list_branches_of(pool: &DbPool, headquarter: &str) -> DbResult<Vec<SwiftCodeRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT s.swift_code, s.country_iso2, s.country_name, s.bank_name,
                    s.address, s.is_headquarter, s.created_at
             FROM branches b
             JOIN swift_codes s ON s.swift_code = b.swift_code
             WHERE b.headquarter = ?1
             ORDER BY s.swift_code",
        )?;

        let rows = stmt.query_map(params![headquarter], map_row)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Child codes that have no branch link row at all.
pub fn list_unlinked_branches(pool: &DbPool) -> DbResult<Vec<String>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT s.swift_code
             FROM swift_codes s
             LEFT JOIN branches b ON b.swift_code = s.swift_code
             WHERE s.is_headquarter = 0 AND b.swift_code IS NULL
             ORDER BY s.swift_code",
        )?;

        let rows = stmt.query_map([], |row| row.get(0))?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Count all SWIFT code rows.
pub fn count_swift_codes(pool: &DbPool) -> DbResult<i64> {
    pool.with_conn(|conn| {
        let count = conn.query_row("SELECT COUNT(*) FROM swift_codes", [], |row| row.get(0))?;
        Ok(count)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    fn setup() -> DbPool {
        let pool = DbPool::in_memory().unwrap();
        run_migrations(&pool).unwrap();
        pool
    }

    fn code(swift_code: &str, is_headquarter: bool) -> NewSwiftCode<'_> {
        NewSwiftCode {
            swift_code,
            country_iso2: "PL",
            country_name: "POLAND",
            bank_name: "PKO BANK POLSKI",
            address: "WARSZAWA",
            is_headquarter,
        }
    }

    #[test]
    fn test_insert_is_first_write_wins() {
        let pool = setup();
        pool.with_conn(|conn| -> DbResult<()> {
            assert!(insert_swift_code(conn, &code("PKOPPLPWXXX", true))?);
            let mut again = code("PKOPPLPWXXX", true);
            again.bank_name = "SOMEONE ELSE";
            assert!(!insert_swift_code(conn, &again)?);
            Ok(())
        })
        .unwrap();

        let row = get_swift_code(&pool, "PKOPPLPWXXX").unwrap();
        assert_eq!(row.bank_name, "PKO BANK POLSKI");
        assert!(row.is_headquarter);
        assert_eq!(count_swift_codes(&pool).unwrap(), 1);
    }

    #[test]
    fn test_headquarter_exists_requires_flag() {
        let pool = setup();
        pool.with_conn(|conn| -> DbResult<()> {
            insert_swift_code(conn, &code("PKOPPLPW001", false))?;
            insert_swift_code(conn, &code("PKOPPLPWXXX", true))?;
            assert!(headquarter_exists(conn, "PKOPPLPWXXX")?);
            assert!(!headquarter_exists(conn, "PKOPPLPW001")?);
            assert!(!headquarter_exists(conn, "MISSINGXXXX")?);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_stored_role() {
        let pool = setup();
        pool.with_conn(|conn| -> DbResult<()> {
            insert_swift_code(conn, &code("PKOPPLPWXXX", true))?;
            insert_swift_code(conn, &code("PKOPPLPW001", false))?;
            assert_eq!(stored_role(conn, "PKOPPLPWXXX")?, Some(true));
            assert_eq!(stored_role(conn, "PKOPPLPW001")?, Some(false));
            assert_eq!(stored_role(conn, "MISSINGXXXX")?, None);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let pool = setup();
        let err = get_swift_code(&pool, "NOPENOPEXXX").unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_list_by_country_filters() {
        let pool = setup();
        pool.with_conn(|conn| -> DbResult<()> {
            insert_swift_code(conn, &code("PKOPPLPWXXX", true))?;
            let mut other = code("BNPAFRPPXXX", true);
            other.country_iso2 = "FR";
            insert_swift_code(conn, &other)?;
            Ok(())
        })
        .unwrap();

        let rows = list_by_country(&pool, "PL").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].swift_code, "PKOPPLPWXXX");
        assert!(list_by_country(&pool, "DE").unwrap().is_empty());
    }

    #[test]
    fn test_delete_reports_rows_removed() {
        let pool = setup();
        pool.with_conn(|conn| -> DbResult<()> {
            insert_swift_code(conn, &code("PKOPPLPWXXX", true))?;
            assert_eq!(delete_swift_code(conn, "PKOPPLPWXXX")?, 1);
            assert_eq!(delete_swift_code(conn, "PKOPPLPWXXX")?, 0);
            Ok(())
        })
        .unwrap();
    }
}
