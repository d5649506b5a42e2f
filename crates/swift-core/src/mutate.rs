//! Single-record insert and delete.
//!
//! In [`InsertMode::Statementwise`] every step is its own statement on the
//! committed store. A headquarters and its branch inserted concurrently can
//! interleave so that the branch resolves before the headquarters exists and
//! writes its link after the repair sweep ran; that link stays dangling until
//! something else repairs it. [`InsertMode::Atomic`] runs the same steps in
//! one immediate transaction.
//!
//! Deletion never cascades under [`DeletePolicy::PreserveOrphans`]: links
//! that reference the deleted code are left in place.

use crate::config::{DeletePolicy, InsertMode, MutationConfig};
use crate::error::{SwiftError, SwiftResult};
use crate::model::{SwiftCode, WriteOutcome};
use crate::normalize::{canonical_code, normalize, NormalizedRecord, ParentKey, RawRecord};
use crate::resolver::{record_link, resolve, role_conflict, LinkState};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use swift_db::queries::{branches, swift_codes};
use swift_db::{DbError, DbPool, DbResult};
use tracing::{debug, info, warn};

/// Effects of a single insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOutcome {
    pub swift_code: String,
    pub write: WriteOutcome,
    /// Resolution result for a branch; `None` for a headquarters.
    pub link: Option<LinkState>,
    /// Whether a new link row was written (false if the branch had one).
    pub link_written: bool,
    /// Dangling links repaired by a headquarters insert.
    pub repaired: usize,
    /// The code was already stored with the other role; links were left alone.
    pub role_conflict: bool,
}

/// Effects of a delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub swift_code: String,
    /// Link rows still mentioning the deleted code.
    pub orphaned_links: usize,
    /// The deleted code's own link row, removed under cascade.
    pub links_removed: usize,
    /// Links reset to dangling under cascade.
    pub links_detached: usize,
}

impl InsertOutcome {
    fn skipped_for_role(code: &str) -> Self {
        Self {
            swift_code: code.to_string(),
            write: WriteOutcome::ConflictIgnored,
            link: None,
            link_written: false,
            repaired: 0,
            role_conflict: true,
        }
    }
}

/// Incremental mutator.
#[derive(Debug, Clone, Default)]
pub struct Mutator {
    config: MutationConfig,
}

impl Mutator {
    pub fn new(config: MutationConfig) -> Self {
        Self { config }
    }

    /// Insert one SWIFT code and resolve or repair its links.
    pub fn insert(&self, pool: &DbPool, raw: &RawRecord) -> SwiftResult<InsertOutcome> {
        let record = normalize(raw)?;
        let outcome = match self.config.insert_mode {
            InsertMode::Statementwise => insert_statementwise(pool, &record)?,
            InsertMode::Atomic => insert_atomic(pool, &record)?,
        };

        if outcome.write == WriteOutcome::ConflictIgnored {
            debug!(swift_code = %outcome.swift_code, "Insert ignored, code already exists");
        }
        if outcome.role_conflict {
            warn!(
                swift_code = %outcome.swift_code,
                "Code is stored with a different role, link step skipped"
            );
        }
        if let Some(LinkState::Dangling) = outcome.link {
            warn!(swift_code = %outcome.swift_code, "Branch inserted without a headquarters");
        }
        if outcome.repaired > 0 {
            info!(
                headquarter = %outcome.swift_code,
                repaired = outcome.repaired,
                "Repaired dangling branch links"
            );
        }
        Ok(outcome)
    }

    /// Delete a SWIFT code by primary key.
    pub fn delete(&self, pool: &DbPool, swift_code: &str) -> SwiftResult<DeleteOutcome> {
        let swift_code = canonical_code(swift_code);
        let outcome = match self.config.delete_policy {
            DeletePolicy::PreserveOrphans => delete_preserving(pool, &swift_code)?,
            DeletePolicy::Cascade => delete_cascading(pool, &swift_code)?,
        };

        if outcome.orphaned_links > 0 {
            warn!(
                swift_code = %outcome.swift_code,
                orphaned = outcome.orphaned_links,
                "Deleted code is still referenced by branch links"
            );
        }
        info!(swift_code = %outcome.swift_code, "SWIFT code deleted");
        Ok(outcome)
    }
}

fn partial(code: &str) -> impl Fn(DbError) -> SwiftError + '_ {
    move |source| SwiftError::PartialInsert {
        code: code.to_string(),
        source,
    }
}

/// Write the entity row on its own.
pub(crate) fn store_entity(pool: &DbPool, entity: &SwiftCode) -> SwiftResult<WriteOutcome> {
    pool.with_conn(|conn| -> SwiftResult<WriteOutcome> {
        let inserted = swift_codes::insert_swift_code(conn, &entity.as_new())?;
        Ok(WriteOutcome::from_inserted(inserted))
    })
}

/// Resolve against committed state.
pub(crate) fn resolve_committed(pool: &DbPool, key: &ParentKey) -> DbResult<LinkState> {
    pool.with_conn(|conn| resolve(conn, key))
}

pub(crate) fn write_link(pool: &DbPool, branch: &str, state: &LinkState) -> DbResult<bool> {
    pool.with_conn(|conn| record_link(conn, branch, state))
}

pub(crate) fn repair(pool: &DbPool, headquarter: &str) -> DbResult<usize> {
    pool.with_conn(|conn| branches::repair_dangling(conn, headquarter))
}

fn insert_statementwise(pool: &DbPool, record: &NormalizedRecord) -> SwiftResult<InsertOutcome> {
    let code = record.entity.swift_code.as_str();
    let write = store_entity(pool, &record.entity)?;

    if write == WriteOutcome::ConflictIgnored
        && pool
            .with_conn(|conn| role_conflict(conn, &record.entity))
            .map_err(partial(code))?
    {
        return Ok(InsertOutcome::skipped_for_role(code));
    }

    match &record.parent_key {
        Some(key) => {
            let state = resolve_committed(pool, key).map_err(partial(code))?;
            let link_written = write_link(pool, code, &state).map_err(partial(code))?;
            Ok(InsertOutcome {
                swift_code: code.to_string(),
                write,
                link: Some(state),
                link_written,
                repaired: 0,
                role_conflict: false,
            })
        }
        None => {
            let repaired = repair(pool, code).map_err(partial(code))?;
            Ok(InsertOutcome {
                swift_code: code.to_string(),
                write,
                link: None,
                link_written: false,
                repaired,
                role_conflict: false,
            })
        }
    }
}

fn apply_insert(conn: &Connection, record: &NormalizedRecord) -> DbResult<InsertOutcome> {
    let code = record.entity.swift_code.as_str();
    let write = WriteOutcome::from_inserted(swift_codes::insert_swift_code(
        conn,
        &record.entity.as_new(),
    )?);

    if write == WriteOutcome::ConflictIgnored && role_conflict(conn, &record.entity)? {
        return Ok(InsertOutcome::skipped_for_role(code));
    }

    let mut outcome = InsertOutcome {
        swift_code: code.to_string(),
        write,
        link: None,
        link_written: false,
        repaired: 0,
        role_conflict: false,
    };
    match &record.parent_key {
        Some(key) => {
            let state = resolve(conn, key)?;
            outcome.link_written = record_link(conn, code, &state)?;
            outcome.link = Some(state);
        }
        None => outcome.repaired = branches::repair_dangling(conn, code)?,
    }
    Ok(outcome)
}

fn insert_atomic(pool: &DbPool, record: &NormalizedRecord) -> SwiftResult<InsertOutcome> {
    let code = &record.entity.swift_code;
    pool.with_conn_mut(|conn| -> SwiftResult<InsertOutcome> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;

        let outcome = apply_insert(&tx, record).map_err(|source| SwiftError::TransactionAborted {
            record: Some(code.clone()),
            source,
        })?;

        tx.commit().map_err(|e| SwiftError::TransactionAborted {
            record: None,
            source: e.into(),
        })?;
        Ok(outcome)
    })
}

fn not_found(swift_code: &str) -> SwiftError {
    SwiftError::NotFound(format!("SWIFT code: {}", swift_code))
}

fn delete_preserving(pool: &DbPool, swift_code: &str) -> SwiftResult<DeleteOutcome> {
    pool.with_conn(|conn| -> SwiftResult<DeleteOutcome> {
        if swift_codes::delete_swift_code(conn, swift_code)? == 0 {
            return Err(not_found(swift_code));
        }
        let orphaned_links = branches::count_referencing(conn, swift_code)?;
        Ok(DeleteOutcome {
            swift_code: swift_code.to_string(),
            orphaned_links,
            links_removed: 0,
            links_detached: 0,
        })
    })
}

fn delete_cascading(pool: &DbPool, swift_code: &str) -> SwiftResult<DeleteOutcome> {
    pool.with_conn_mut(|conn| -> SwiftResult<DeleteOutcome> {
        let tx = conn.transaction().map_err(DbError::from)?;
        if swift_codes::delete_swift_code(&tx, swift_code)? == 0 {
            return Err(not_found(swift_code));
        }
        let links_removed = branches::delete_branch(&tx, swift_code)?;
        let links_detached = branches::detach_branches_of(&tx, swift_code)?;
        tx.commit().map_err(DbError::from)?;

        Ok(DeleteOutcome {
            swift_code: swift_code.to_string(),
            orphaned_links: 0,
            links_removed,
            links_detached,
        })
    })
}
