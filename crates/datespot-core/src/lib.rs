//! Datespot Core - Domain types, enrichment and load services.
//!
//! This crate provides the core of the datespot pipeline:
//!
//! - **Domain models**: [`PlaceDocument`], [`PlaceRecord`], [`PlaceRow`]
//! - **Services**: [`EnrichService`] fills missing `reviewSummary` fields with
//!   generated text, [`LoadService`] upserts the enriched collection keyed on
//!   `kakao_id`
//! - **Traits**: [`SummaryGenerator`], [`PlaceStoreConnector`], [`PlaceStore`]
//!   for dependency injection
//! - **Progress reporting**: [`ProgressReporter`] trait for decoupled logging
//!
//! # Architecture
//!
//! The two stages share no process state. The enricher writes a JSON
//! collection file; the loader reads it later. Every record leaving the
//! enricher has a non-empty summary, which the loader checks for before
//! opening a connection.
//!
//! # Example
//!
//! ```ignore
//! use datespot_core::{EnrichConfig, EnrichService, LoadConfig, LoadService, TracingReporter};
//!
//! let enrich = EnrichService::new(openai_client, EnrichConfig::default());
//! let stats = enrich.process_enrichment(&TracingReporter).await?;
//!
//! let load = LoadService::new(pg_connector, LoadConfig::default());
//! let summary = load.process_load(&TracingReporter).await?;
//! ```

pub mod collection;
pub mod config;
pub mod enrich;
pub mod error;
pub mod load;
pub mod models;
pub mod progress;
pub mod traits;

// Configuration
pub use config::{
    DEFAULT_ENRICH_INPUT, DEFAULT_ENRICHED_PATH, EnrichConfig, GenerationConfig, HttpConfig,
    LoadConfig, StoreConfig,
};

// Error handling
pub use error::{AppError, GenerationError};

// Domain models
pub use models::{
    Identifier, PlaceDocument, PlaceRecord, PlaceRow, REVIEW_SUMMARY_KEY, decode_image_urls,
    encode_image_urls,
};

// Collection file I/O
pub use collection::{read_collection, write_collection};

// Progress reporting
pub use progress::{EnrichEvent, LoadEvent, ProgressReporter, SilentReporter, TracingReporter};

// Traits for dependency injection
pub use traits::{GenerationRequest, PlaceStore, PlaceStoreConnector, SummaryGenerator};

// Services
pub use enrich::{EnrichService, EnrichStats, FALLBACK_SUMMARY, SummaryOutcome};
pub use load::{LoadService, LoadSummary, prepare_rows};
