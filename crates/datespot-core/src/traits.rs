//! Trait definitions for external dependencies.
//!
//! The two pipeline stages talk to the outside world only through these
//! traits, so the services can be exercised with in-memory doubles:
//!
//! - [`SummaryGenerator`] - the text-generation provider
//! - [`PlaceStoreConnector`] / [`PlaceStore`] - the relational store

use std::future::Future;

use crate::AppError;
use crate::error::GenerationError;
use crate::models::PlaceRow;

/// One chat-style generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System-role instruction.
    pub system: String,
    /// User-role prompt.
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Provider for short generated texts.
///
/// Implementations perform exactly one attempt per call; there is no retry.
pub trait SummaryGenerator: Send + Sync {
    /// Returns the provider name (e.g. "openai").
    fn name(&self) -> &'static str;

    /// Sends the request and returns the raw generated text.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// An open, exclusively owned connection to the place store.
pub trait PlaceStore: Send {
    /// Inserts every row, updating the mutable columns of rows whose
    /// `kakao_id` already exists, as one atomic unit.
    ///
    /// Either all rows are committed or none are. Returns the affected-row
    /// count reported by the store.
    fn upsert_all(
        &mut self,
        rows: &[PlaceRow],
    ) -> impl Future<Output = Result<u64, AppError>> + Send;

    /// Releases the connection.
    fn close(self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Factory for store connections.
///
/// Kept separate from [`PlaceStore`] so the load service decides when (and
/// whether) a connection is opened.
pub trait PlaceStoreConnector: Send + Sync {
    type Store: PlaceStore;

    fn connect(&self) -> impl Future<Output = Result<Self::Store, AppError>> + Send;
}
