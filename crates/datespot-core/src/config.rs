//! Configuration types for datespot components.
//!
//! Every stage receives an explicit, immutable configuration value built once
//! at process start (the CLI fills these from flags and environment
//! variables). Defaults mirror the paths and parameters the pipeline has
//! always used.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;

/// Default location of the raw collection produced upstream.
pub const DEFAULT_ENRICH_INPUT: &str = "final_data.json";

/// Default location of the enriched collection (Enricher output, Loader input).
pub const DEFAULT_ENRICHED_PATH: &str = "src/main/resources/final_data_with_reviews.json";

/// HTTP client configuration for external API calls.
pub struct HttpConfig {
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Sampling and length settings sent with every summary request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    /// Model selector understood by the provider.
    pub model: String,
    /// Moderate, non-zero temperature: varied phrasing while staying on topic.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            max_tokens: 100,
        }
    }
}

impl GenerationConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Enrichment stage configuration.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Write the whole collection to `output` after this many new summaries.
    /// `None` writes only once, at the end of the pass.
    pub checkpoint_every: Option<usize>,
    pub generation: GenerationConfig,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_ENRICH_INPUT),
            output: PathBuf::from(DEFAULT_ENRICHED_PATH),
            checkpoint_every: None,
            generation: GenerationConfig::default(),
        }
    }
}

impl EnrichConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    /// Enables periodic checkpoints. A value of zero disables them.
    pub fn with_checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = (every > 0).then_some(every);
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }
}

/// Connection parameters for the relational store.
#[derive(Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub charset: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            database: "swe_dating_db".to_string(),
            charset: "utf8mb4".to_string(),
        }
    }
}

impl StoreConfig {
    /// Returns the PostgreSQL client encoding for the configured charset.
    ///
    /// Place names and summaries are Korean text, so only UTF-8 encodings are
    /// accepted. MySQL-style names (`utf8mb4`) are normalized.
    pub fn client_encoding(&self) -> Result<&'static str, AppError> {
        match self.charset.to_ascii_lowercase().replace('-', "").as_str() {
            "utf8" | "utf8mb4" | "unicode" => Ok("UTF8"),
            other => Err(AppError::ConfigError(format!(
                "Unsupported charset '{}'. The store requires UTF-8 (utf8, utf8mb4)",
                other
            ))),
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("charset", &self.charset)
            .finish()
    }
}

/// Load stage configuration.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub input: PathBuf,
    /// Validate and report without opening a connection.
    pub dry_run: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_ENRICHED_PATH),
            dry_run: false,
        }
    }
}

impl LoadConfig {
    pub fn new(input: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}
