//! Load service: persists an enriched collection into the place store.
//!
//! The service reads the collection, validates it, opens exactly one store
//! connection and hands every row to [`PlaceStore::upsert_all`] as one atomic
//! batch. The connection is closed on every exit path once it was opened.
//!
//! Validation runs before anything touches the store:
//!
//! | Condition                     | Result                                  |
//! |-------------------------------|-----------------------------------------|
//! | missing or empty `kakao_id`   | warning, record skipped                 |
//! | missing or empty `name`       | error, nothing is loaded                |
//! | missing or empty summary      | warning, stored as empty text           |
//! | `kakao_id` seen earlier       | counted, the later record wins on update |

use std::collections::HashSet;

use crate::collection::read_collection;
use crate::config::LoadConfig;
use crate::error::AppError;
use crate::models::{PlaceRecord, PlaceRow};
use crate::progress::{LoadEvent, ProgressReporter};
use crate::traits::{PlaceStore, PlaceStoreConnector};

/// Outcome of one load run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records read from the collection.
    pub records: usize,
    /// Affected-row count reported by the store. Zero on a dry run.
    pub rows_affected: u64,
    /// Records skipped because they have no `kakao_id`.
    pub skipped_without_key: usize,
    /// Records whose `kakao_id` repeats an earlier record.
    pub duplicate_keys: usize,
    /// Records stored with an empty summary.
    pub missing_summaries: usize,
    /// True if nothing was written.
    pub dry_run: bool,
}

/// Validates the collection and projects it onto store rows.
///
/// Records without a key cannot be upserted and are skipped with a warning.
/// Every other problem is collected before returning, so a single run reports
/// every invalid record.
pub fn prepare_rows<R: ProgressReporter>(
    records: &[PlaceRecord],
    reporter: &R,
) -> Result<(Vec<PlaceRow>, LoadSummary), AppError> {
    let mut summary = LoadSummary {
        records: records.len(),
        ..Default::default()
    };
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    let mut rows = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let index = idx + 1;

        let Some(key) = record.key() else {
            summary.skipped_without_key += 1;
            reporter.load(LoadEvent::MissingKey {
                index,
                name: record.name.as_deref().unwrap_or_default(),
            });
            continue;
        };
        if record.name.as_deref().is_none_or(str::is_empty) {
            problems.push(format!("record {} ({}): missing name", index, key));
            continue;
        }

        if record.needs_summary() {
            summary.missing_summaries += 1;
            reporter.load(LoadEvent::MissingSummary {
                index,
                kakao_id: &key,
            });
        }
        if seen.contains(&key) {
            summary.duplicate_keys += 1;
            reporter.load(LoadEvent::DuplicateKey {
                index,
                kakao_id: &key,
            });
        } else {
            seen.insert(key);
        }

        rows.push(PlaceRow::from_record(record)?);
    }

    if !problems.is_empty() {
        return Err(AppError::InvalidRecords(problems));
    }

    Ok((rows, summary))
}

/// Service that loads an enriched collection into the store.
pub struct LoadService<C: PlaceStoreConnector> {
    connector: C,
    config: LoadConfig,
}

impl<C: PlaceStoreConnector> LoadService<C> {
    pub fn new(connector: C, config: LoadConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Upserts `rows` over a single connection that is always released.
    ///
    /// Returns the affected-row count reported by the store.
    pub async fn load<R: ProgressReporter>(
        &self,
        rows: &[PlaceRow],
        reporter: &R,
    ) -> Result<u64, AppError> {
        let mut store = self.connector.connect().await?;
        reporter.load(LoadEvent::Connected);

        let result = store.upsert_all(rows).await;
        match &result {
            Ok(rows_affected) => reporter.load(LoadEvent::Committed {
                rows_affected: *rows_affected,
            }),
            Err(e) => reporter.load(LoadEvent::RolledBack {
                error: &e.to_string(),
            }),
        }

        match store.close().await {
            Ok(()) => reporter.load(LoadEvent::ConnectionClosed),
            Err(e) => reporter.load(LoadEvent::CloseFailed {
                error: &e.to_string(),
            }),
        }

        result
    }

    /// Runs the full load stage: read, validate, upsert.
    ///
    /// # Errors
    ///
    /// - [`AppError::InputNotFound`] if the input file does not exist; no
    ///   connection is opened in that case.
    /// - [`AppError::InvalidRecords`] if validation fails; no connection is
    ///   opened either.
    /// - [`AppError::DatabaseError`] if connecting or the batch fails; the
    ///   batch has been rolled back.
    pub async fn process_load<R: ProgressReporter>(
        &self,
        reporter: &R,
    ) -> Result<LoadSummary, AppError> {
        let input = &self.config.input;
        let records: Vec<PlaceRecord> = read_collection(input)?;
        reporter.load(LoadEvent::RecordsRead {
            count: records.len(),
            input,
        });

        let (rows, mut summary) = prepare_rows(&records, reporter)?;

        if self.config.dry_run {
            summary.dry_run = true;
            reporter.load(LoadEvent::DryRun { summary: &summary });
            return Ok(summary);
        }

        summary.rows_affected = self.load(&rows, reporter).await?;
        Ok(summary)
    }
}
