//! Read-only consistency report over the hierarchy.
//!
//! Nothing here repairs anything. It lists the states the import and
//! mutation paths are known to leave behind.

use crate::error::SwiftResult;
use serde::{Deserialize, Serialize};
use swift_db::queries::{branches, swift_codes};
use swift_db::DbPool;
use tracing::info;

/// A dangling link whose headquarters exists now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleLink {
    pub branch: String,
    pub headquarter: String,
}

/// A link naming a missing or non-headquarters code, or owned by a
/// deleted branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedLink {
    pub branch: String,
    pub headquarter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    /// Branches whose link has no headquarters.
    pub dangling: Vec<String>,
    pub stale_dangling: Vec<StaleLink>,
    pub orphaned: Vec<OrphanedLink>,
    /// Branch codes with no link row at all.
    pub unlinked_branches: Vec<String>,
    /// Link rows owned by a code stored as a headquarters.
    pub linked_headquarters: Vec<OrphanedLink>,
}

impl ConsistencyReport {
    /// Dangling links alone are fine as long as their headquarters was never
    /// stored.
    pub fn is_consistent(&self) -> bool {
        self.stale_dangling.is_empty()
            && self.orphaned.is_empty()
            && self.unlinked_branches.is_empty()
            && self.linked_headquarters.is_empty()
    }
}

/// Build a consistency report.
pub fn audit(pool: &DbPool) -> SwiftResult<ConsistencyReport> {
    let dangling = branches::list_dangling(pool)?
        .into_iter()
        .map(|row| row.swift_code)
        .collect();

    let stale_dangling = branches::list_stale_dangling(pool)?
        .into_iter()
        .map(|(branch, headquarter)| StaleLink { branch, headquarter })
        .collect();

    let orphaned = branches::list_orphaned(pool)?
        .into_iter()
        .map(|row| OrphanedLink {
            branch: row.swift_code,
            headquarter: row.headquarter,
        })
        .collect();

    let unlinked_branches = swift_codes::list_unlinked_branches(pool)?;

    let linked_headquarters = branches::list_linked_headquarters(pool)?
        .into_iter()
        .map(|row| OrphanedLink {
            branch: row.swift_code,
            headquarter: row.headquarter,
        })
        .collect();

    let report = ConsistencyReport {
        dangling,
        stale_dangling,
        orphaned,
        unlinked_branches,
        linked_headquarters,
    };

    info!(
        dangling = report.dangling.len(),
        stale = report.stale_dangling.len(),
        orphaned = report.orphaned.len(),
        unlinked = report.unlinked_branches.len(),
        linked_headquarters = report.linked_headquarters.len(),
        "Consistency audit finished"
    );
    Ok(report)
}
