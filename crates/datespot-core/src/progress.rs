//! Progress reporting for the enrich and load stages.
//!
//! Services emit events through a [`ProgressReporter`] instead of logging
//! directly, so the CLI and tests decide how (or whether) progress is shown.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::enrich::EnrichStats;
use crate::error::GenerationError;
use crate::load::LoadSummary;

/// Events emitted while enriching a collection.
#[derive(Debug, Clone)]
pub enum EnrichEvent<'a> {
    /// The collection was read.
    Started { total: usize, input: &'a Path },
    /// A summary is being requested. `index` is 1-based.
    Generating {
        index: usize,
        total: usize,
        name: &'a str,
    },
    /// A summary was generated and written into the record.
    Generated {
        index: usize,
        total: usize,
        name: &'a str,
        summary: &'a str,
    },
    /// Generation failed; the fallback summary was written instead.
    FallbackUsed {
        index: usize,
        total: usize,
        name: &'a str,
        error: &'a GenerationError,
    },
    /// The record already had a summary.
    Skipped {
        index: usize,
        total: usize,
        name: &'a str,
    },
    /// The partially enriched collection was written to disk.
    CheckpointWritten { path: &'a Path, updated: usize },
    /// The pass finished and the output was written.
    Completed {
        stats: &'a EnrichStats,
        output: &'a Path,
    },
}

/// Events emitted while loading a collection into the store.
#[derive(Debug, Clone)]
pub enum LoadEvent<'a> {
    /// The collection was read.
    RecordsRead { count: usize, input: &'a Path },
    /// The record has no `kakao_id` and is not loaded.
    MissingKey { index: usize, name: &'a str },
    /// The record has no summary and will be stored with an empty one.
    MissingSummary { index: usize, kakao_id: &'a str },
    /// The record repeats the key of an earlier record and will update its row.
    DuplicateKey { index: usize, kakao_id: &'a str },
    /// Dry run: validation passed and nothing was written.
    DryRun { summary: &'a LoadSummary },
    /// The store connection is open.
    Connected,
    /// The batch was committed.
    Committed { rows_affected: u64 },
    /// The batch failed and was rolled back.
    RolledBack { error: &'a str },
    /// Closing the connection failed.
    CloseFailed { error: &'a str },
    /// The store connection was released.
    ConnectionClosed,
}

/// Trait for reporting pipeline progress.
///
/// The default implementations do nothing (silent mode).
pub trait ProgressReporter: Send + Sync {
    fn enrich(&self, event: EnrichEvent<'_>) {
        let _ = event;
    }

    fn load(&self, event: LoadEvent<'_>) {
        let _ = event;
    }
}

/// Silent reporter that ignores all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}

/// Tracing-based reporter for CLI logging.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn enrich(&self, event: EnrichEvent<'_>) {
        match event {
            EnrichEvent::Started { total, input } => {
                info!(total, input = %input.display(), "Starting reviewSummary generation");
            }
            EnrichEvent::Generating { index, total, name } => {
                debug!("[{}/{}] '{}' generating summary...", index, total, name);
            }
            EnrichEvent::Generated {
                index,
                total,
                name,
                summary,
            } => {
                info!("[{}/{}] '{}' -> {}", index, total, name, summary);
            }
            EnrichEvent::FallbackUsed {
                index,
                total,
                name,
                error,
            } => {
                info!(%error, "[{}/{}] '{}' -> fallback summary", index, total, name);
            }
            EnrichEvent::Skipped { index, total, name } => {
                debug!("[{}/{}] '{}' already has a summary", index, total, name);
            }
            EnrichEvent::CheckpointWritten { path, updated } => {
                info!(path = %path.display(), updated, "Checkpoint written");
            }
            EnrichEvent::Completed { stats, output } => {
                info!(
                    total = stats.total,
                    updated = stats.updated,
                    skipped = stats.skipped,
                    fallbacks = stats.fallbacks,
                    output = %output.display(),
                    "Enrichment complete"
                );
            }
        }
    }

    fn load(&self, event: LoadEvent<'_>) {
        match event {
            LoadEvent::RecordsRead { count, input } => {
                info!(count, input = %input.display(), "Read records");
            }
            LoadEvent::MissingKey { index, name } => {
                warn!(index, name, "Record has no kakao_id, skipping");
            }
            LoadEvent::MissingSummary { index, kakao_id } => {
                warn!(
                    index,
                    kakao_id, "Record has no reviewSummary, storing empty text"
                );
            }
            LoadEvent::DuplicateKey { index, kakao_id } => {
                debug!(index, kakao_id, "Duplicate kakao_id, later record wins");
            }
            LoadEvent::DryRun { summary } => {
                info!(
                    records = summary.records,
                    skipped_without_key = summary.skipped_without_key,
                    duplicate_keys = summary.duplicate_keys,
                    missing_summaries = summary.missing_summaries,
                    "Dry run: nothing written"
                );
            }
            LoadEvent::Connected => {
                debug!("Database connection opened");
            }
            LoadEvent::Committed { rows_affected } => {
                info!(rows_affected, "Batch committed");
            }
            LoadEvent::RolledBack { error } => {
                warn!(error, "Batch rolled back");
            }
            LoadEvent::CloseFailed { error } => {
                warn!(error, "Failed to close database connection");
            }
            LoadEvent::ConnectionClosed => {
                info!("Database connection closed");
            }
        }
    }
}
