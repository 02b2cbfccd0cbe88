use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single text-generation call.
///
/// Generation errors never abort a pipeline run: the enrichment service maps
/// every variant to the fixed fallback summary (see
/// [`SummaryOutcome`](crate::enrich::SummaryOutcome)). They exist so that the
/// provider boundary stays typed and the fallback policy is visible.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The provider could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The request took longer than the configured timeout.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The provider rejected the request because of rate limiting (HTTP 429).
    #[error("rate limit exceeded")]
    RateLimited,

    /// The API key was rejected (HTTP 401).
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Any other non-success HTTP status returned by the provider.
    #[error("provider error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The provider answered successfully but returned no usable text.
    #[error("empty response from provider")]
    EmptyResponse,

    /// The HTTP client could not be built or the request could not be sent.
    #[error("client error: {0}")]
    Client(String),
}

/// Application-wide error types.
///
/// This enum represents every error that can stop one of the datespot stages.
/// Errors from the text-generation provider are deliberately *not* part of it:
/// those are recovered per record and never leave the enrichment service.
///
/// # Error Conversion
///
/// - `sqlx::Error` → `AppError::DatabaseError`
/// - `serde_json::Error` → `AppError::SerializationError`
///
/// # Examples
///
/// ```
/// use datespot_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::ConfigError("DB_CHARSET must be a UTF-8 variant".to_string()))
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// The input record collection does not exist.
    ///
    /// Reported before any output is written or any connection is opened.
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Reading or writing a collection file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Database operation failed.
    ///
    /// This error wraps all errors from SQLx, including connection failures,
    /// query errors and constraint violations. A batch that fails with this
    /// error has been rolled back.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// One or more records cannot be persisted.
    ///
    /// Produced by the load validation pass, before a connection is opened.
    #[error("{} invalid record(s): {}", .0.len(), .0.join("; "))]
    InvalidRecords(Vec<String>),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// HTTP client could not be created.
    #[error("API Client error: {0}")]
    ClientError(String),
}

impl AppError {
    /// Builds an [`AppError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InputNotFound(path) => format!(
                "Input file not found: {}\n   Check the --input path.",
                path.display()
            ),
            AppError::DatabaseError(e) => {
                if e.to_string().contains("connect") {
                    "Cannot connect to database. Is PostgreSQL running?\n   Check DB_HOST, DB_PORT and credentials.".to_string()
                } else {
                    format!("Database error: {}\n   No rows were committed.", e)
                }
            }
            AppError::InvalidRecords(problems) => format!(
                "{} record(s) cannot be loaded:\n   {}",
                problems.len(),
                problems.join("\n   ")
            ),
            AppError::ConfigError(msg) => {
                format!("Configuration error: {}\n   Check your flags or .env file.", msg)
            }
            _ => self.to_string(),
        }
    }

    /// Returns true for errors caused by a missing input collection.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, AppError::InputNotFound(_))
    }
}
