//! Branch-to-headquarters link resolution.
//!
//! Resolution reads whatever `conn` can see. Inside an open transaction that
//! includes the transaction's own uncommitted writes; on a plain connection
//! it is committed state only.

use crate::model::SwiftCode;
use crate::normalize::ParentKey;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use swift_db::queries::{branches, swift_codes};
use swift_db::DbResult;

/// Where a branch link points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "headquarter", rename_all = "snake_case")]
pub enum LinkState {
    /// Linked to an existing headquarters code.
    Linked(String),
    /// The headquarters had not been observed when the link was written.
    Dangling,
}

impl LinkState {
    pub fn headquarter(&self) -> Option<&str> {
        match self {
            Self::Linked(code) => Some(code),
            Self::Dangling => None,
        }
    }

    pub fn is_dangling(&self) -> bool {
        matches!(self, Self::Dangling)
    }
}

/// Resolve a headquarters key against the scope of `conn`.
pub fn resolve(conn: &Connection, key: &ParentKey) -> DbResult<LinkState> {
    if swift_codes::headquarter_exists(conn, key.as_str())? {
        Ok(LinkState::Linked(key.as_str().to_string()))
    } else {
        Ok(LinkState::Dangling)
    }
}

/// Persist a branch link in the given state, ignoring an existing link row.
///
/// Returns `true` when a row was written.
pub fn record_link(conn: &Connection, branch: &str, state: &LinkState) -> DbResult<bool> {
    branches::insert_branch(conn, branch, state.headquarter())
}

/// Whether `entity` lost a first-write-wins conflict to a row stored with
/// the other role. Links and repairs follow the stored row, so such a
/// record must not touch them.
pub fn role_conflict(conn: &Connection, entity: &SwiftCode) -> DbResult<bool> {
    let stored = swift_codes::stored_role(conn, &entity.swift_code)?;
    Ok(stored.is_some_and(|is_headquarter| is_headquarter != entity.is_headquarter))
}
