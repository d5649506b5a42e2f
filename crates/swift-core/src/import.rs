//! Transactional bulk import.
//!
//! A whole batch commits or nothing does. Links are resolved against the
//! in-flight transaction, so a branch is linked only when its headquarters
//! was written earlier in the same pass. A headquarters that appears later
//! in the batch leaves the earlier branch dangling.

use crate::config::{ImportConfig, MissingParentPolicy};
use crate::error::{SwiftError, SwiftResult};
use crate::normalize::{normalize, NormalizedRecord, RawRecord};
use crate::resolver::{record_link, resolve, role_conflict, LinkState};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use swift_db::queries::swift_codes;
use swift_db::{DbError, DbPool, DbResult};
use tracing::{debug, info, warn};

/// Counters for one committed batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub records: usize,
    pub inserted: usize,
    /// Records whose code already existed.
    pub ignored: usize,
    pub linked: usize,
    pub dangling: usize,
    /// Branches that already had a link row.
    pub links_ignored: usize,
    pub synthesized_parents: usize,
    /// Duplicates whose role differs from the stored row; not linked.
    pub role_conflicts: usize,
}

/// Bulk importer.
#[derive(Debug, Clone, Default)]
pub struct BulkImporter {
    config: ImportConfig,
}

impl BulkImporter {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Import `records` in order as one transaction.
    pub fn import(&self, pool: &DbPool, records: &[RawRecord]) -> SwiftResult<ImportReport> {
        let normalized = records
            .iter()
            .enumerate()
            .map(|(position, raw)| normalize(raw).map_err(|e| e.at_record(position)))
            .collect::<SwiftResult<Vec<_>>>()?;

        info!(
            records = normalized.len(),
            missing_parent = ?self.config.missing_parent,
            "Starting bulk import"
        );

        let report = pool.with_conn_mut(|conn| -> SwiftResult<ImportReport> {
            let tx = conn.transaction().map_err(DbError::from)?;

            let mut report = ImportReport {
                records: normalized.len(),
                ..Default::default()
            };

            for record in &normalized {
                self.apply(&tx, record, &mut report).map_err(|source| {
                    SwiftError::TransactionAborted {
                        record: Some(record.entity.swift_code.clone()),
                        source,
                    }
                })?;
            }

            tx.commit().map_err(|e| SwiftError::TransactionAborted {
                record: None,
                source: e.into(),
            })?;

            Ok(report)
        })?;

        if report.dangling > 0 {
            warn!(
                dangling = report.dangling,
                "Bulk import left branches without a headquarters link"
            );
        }
        info!(
            inserted = report.inserted,
            ignored = report.ignored,
            linked = report.linked,
            dangling = report.dangling,
            synthesized = report.synthesized_parents,
            role_conflicts = report.role_conflicts,
            "Bulk import committed"
        );

        Ok(report)
    }

    fn apply(
        &self,
        tx: &Connection,
        record: &NormalizedRecord,
        report: &mut ImportReport,
    ) -> DbResult<()> {
        let entity = &record.entity;
        if swift_codes::insert_swift_code(tx, &entity.as_new())? {
            report.inserted += 1;
        } else {
            report.ignored += 1;
            debug!(swift_code = %entity.swift_code, "Duplicate code ignored");
            if role_conflict(tx, entity)? {
                report.role_conflicts += 1;
                warn!(
                    swift_code = %entity.swift_code,
                    "Duplicate code has a different role than the stored row, link skipped"
                );
                return Ok(());
            }
        }

        let Some(key) = &record.parent_key else {
            return Ok(());
        };

        let mut state = resolve(tx, key)?;
        if state.is_dangling() && self.config.missing_parent == MissingParentPolicy::AutoCreate {
            let synthetic = entity.synthesize_headquarter(key.as_str());
            if swift_codes::insert_swift_code(tx, &synthetic.as_new())? {
                report.synthesized_parents += 1;
                debug!(headquarter = %key, branch = %entity.swift_code, "Synthesized headquarters");
            }
            state = resolve(tx, key)?;
        }

        if record_link(tx, &entity.swift_code, &state)? {
            match state {
                LinkState::Linked(_) => report.linked += 1,
                LinkState::Dangling => {
                    report.dangling += 1;
                    debug!(branch = %entity.swift_code, headquarter = %key, "Branch left dangling");
                }
            }
        } else {
            report.links_ignored += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::fetch_by_code;
    use swift_db::init_memory_pool;
    use swift_db::queries::branches;

    fn raw(code: &str, bank: &str) -> RawRecord {
        RawRecord {
            swift_code: code.to_string(),
            country_iso2: "PL".to_string(),
            bank_name: bank.to_string(),
            address: "WARSZAWA".to_string(),
            country_name: "POLAND".to_string(),
            is_headquarter: None,
        }
    }

    fn headquarter_of(pool: &DbPool, branch: &str) -> Option<String> {
        branches::get_branch(pool, branch)
            .unwrap()
            .expect("branch link row")
            .headquarter
    }

    #[test]
    fn test_parent_first_links_branch() {
        let pool = init_memory_pool().unwrap();
        let report = BulkImporter::default()
            .import(&pool, &[raw("AAAABBCCXXX", "A"), raw("AAAABBCC001", "A")])
            .unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.linked, 1);
        assert_eq!(report.dangling, 0);

        let details = fetch_by_code(&pool, "AAAABBCCXXX").unwrap();
        assert_eq!(details.branches().len(), 1);
        assert_eq!(details.branches()[0].swift_code, "AAAABBCC001");
    }

    #[test]
    fn test_parent_later_in_batch_leaves_branch_dangling() {
        let pool = init_memory_pool().unwrap();
        let report = BulkImporter::default()
            .import(&pool, &[raw("AAAABBCC001", "A"), raw("AAAABBCCXXX", "A")])
            .unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.dangling, 1);
        assert_eq!(headquarter_of(&pool, "AAAABBCC001"), None);

        let details = fetch_by_code(&pool, "AAAABBCCXXX").unwrap();
        assert!(details.code.is_headquarter);
        assert!(details.branches().is_empty());
    }

    #[test]
    fn test_duplicate_codes_first_write_wins() {
        let pool = init_memory_pool().unwrap();
        let report = BulkImporter::default()
            .import(
                &pool,
                &[raw("AAAABBCCXXX", "FIRST"), raw("AAAABBCCXXX", "SECOND")],
            )
            .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.ignored, 1);
        let details = fetch_by_code(&pool, "AAAABBCCXXX").unwrap();
        assert_eq!(details.code.bank_name, "FIRST");

        let again = BulkImporter::default()
            .import(&pool, &[raw("AAAABBCCXXX", "THIRD")])
            .unwrap();
        assert_eq!(again.ignored, 1);
        assert_eq!(swift_codes::count_swift_codes(&pool).unwrap(), 1);
    }

    #[test]
    fn test_malformed_record_aborts_before_writing() {
        let pool = init_memory_pool().unwrap();
        let err = BulkImporter::default()
            .import(&pool, &[raw("AAAABBCCXXX", "A"), raw("SHORT", "A")])
            .unwrap_err();

        assert!(matches!(err, SwiftError::MalformedRecord { index: Some(1), .. }));
        assert_eq!(swift_codes::count_swift_codes(&pool).unwrap(), 0);
    }

    #[test]
    fn test_statement_failure_rolls_back_whole_batch() {
        let pool = init_memory_pool().unwrap();
        pool.with_conn(|conn| -> DbResult<()> {
            conn.execute_batch("DROP TABLE branches")?;
            Ok(())
        })
        .unwrap();

        let err = BulkImporter::default()
            .import(&pool, &[raw("AAAABBCCXXX", "A"), raw("AAAABBCC001", "A")])
            .unwrap_err();

        match err {
            SwiftError::TransactionAborted { record, .. } => {
                assert_eq!(record.as_deref(), Some("AAAABBCC001"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(fetch_by_code(&pool, "AAAABBCCXXX").unwrap_err().is_not_found());
    }

    #[test]
    fn test_auto_create_synthesizes_missing_parent() {
        let pool = init_memory_pool().unwrap();
        let importer = BulkImporter::new(ImportConfig {
            missing_parent: MissingParentPolicy::AutoCreate,
        });
        let report = importer
            .import(&pool, &[raw("AAAABBCC001", "BRANCH BANK"), raw("AAAABBCCXXX", "REAL HQ")])
            .unwrap();

        assert_eq!(report.synthesized_parents, 1);
        assert_eq!(report.linked, 1);
        assert_eq!(report.dangling, 0);
        // The synthesized row won; the later real record is ignored.
        assert_eq!(report.ignored, 1);

        let details = fetch_by_code(&pool, "AAAABBCCXXX").unwrap();
        assert_eq!(details.code.bank_name, "BRANCH BANK");
        assert_eq!(details.branches().len(), 1);
    }

    #[test]
    fn test_empty_batch_commits_nothing() {
        let pool = init_memory_pool().unwrap();
        let report = BulkImporter::default().import(&pool, &[]).unwrap();
        assert_eq!(report, ImportReport::default());
    }

    #[test]
    fn test_duplicate_with_other_role_is_not_linked() {
        let pool = init_memory_pool().unwrap();
        let mut explicit_hq = raw("AAAABBCC001", "A");
        explicit_hq.is_headquarter = Some(true);

        let report = BulkImporter::default()
            .import(
                &pool,
                &[raw("AAAABBCCXXX", "A"), explicit_hq, raw("AAAABBCC001", "A")],
            )
            .unwrap();

        assert_eq!(report.ignored, 1);
        assert_eq!(report.role_conflicts, 1);
        assert_eq!(report.linked, 0);
        assert!(branches::get_branch(&pool, "AAAABBCC001").unwrap().is_none());

        let details = fetch_by_code(&pool, "AAAABBCCXXX").unwrap();
        assert!(details.branches().is_empty());
        assert!(crate::audit::audit(&pool).unwrap().is_consistent());
    }
}
