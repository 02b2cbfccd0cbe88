use clap::{Args, Parser, Subcommand};
use datespot_core::{
    DEFAULT_ENRICH_INPUT, DEFAULT_ENRICHED_PATH, EnrichConfig, GenerationConfig, LoadConfig,
    StoreConfig,
};
use std::path::PathBuf;
use std::sync::LazyLock;

static VERSION_INFO: LazyLock<String> = LazyLock::new(|| {
    let version = env!("CARGO_PKG_VERSION");

    // Use VERGEN_GIT_SHA for the commit hash (with safe slicing)
    let commit = option_env!("VERGEN_GIT_SHA")
        .map(|s| s.chars().take(7).collect::<String>())
        .unwrap_or_else(|| "unknown".to_string());

    let built = option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown"); // YYYY-MM-DD
    let target = option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown");
    let rustc = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown");

    format!("{version}\ncommit: {commit}\nbuilt: {built}\ntarget: {target}\nrustc: {rustc}")
});

pub fn version_info() -> &'static str {
    &VERSION_INFO
}

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "datespot")]
#[command(
    author,
    version = version_info(),
    about = "Date-spot data pipeline: summary enrichment and database load"
)]
#[command(after_help = "Examples:
  datespot enrich --input final_data.json
  datespot load --db-password secret
  datespot load --dry-run

Both stages read a .env file from the working directory if present.")]
pub struct Config {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fill in missing review summaries with generated text
    #[command(after_help = "Examples:
  datespot enrich                                  # final_data.json -> src/main/resources/final_data_with_reviews.json
  datespot enrich --input raw.json --output out.json
  datespot enrich --checkpoint-every 50            # Save progress every 50 new summaries")]
    Enrich(EnrichArgs),
    /// Upsert the enriched collection into the places table
    #[command(after_help = "Examples:
  datespot load --db-host db.internal --db-password secret
  datespot load --input out.json --dry-run         # Validate only, no connection")]
    Load(LoadArgs),
}

/// Arguments of the `enrich` command
#[derive(Args, Debug)]
pub struct EnrichArgs {
    /// Record collection to enrich
    #[arg(long, env = "ENRICH_INPUT", default_value = DEFAULT_ENRICH_INPUT)]
    pub input: PathBuf,

    /// Where to write the enriched collection
    #[arg(long, env = "ENRICH_OUTPUT", default_value = DEFAULT_ENRICHED_PATH)]
    pub output: PathBuf,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Chat model used for summaries
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    /// Custom chat completions endpoint (for Azure OpenAI or proxies)
    #[arg(long, env = "OPENAI_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Write the output after every N new summaries (0 = only at the end)
    #[arg(long, env = "ENRICH_CHECKPOINT_EVERY", default_value = "0")]
    pub checkpoint_every: usize,
}

impl EnrichArgs {
    pub fn enrich_config(&self) -> EnrichConfig {
        EnrichConfig::new(&self.input, &self.output)
            .with_checkpoint_every(self.checkpoint_every)
            .with_generation(GenerationConfig::default().with_model(&self.model))
    }
}

/// Arguments of the `load` command
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Enriched collection to load
    #[arg(long, env = "LOAD_INPUT", default_value = DEFAULT_ENRICHED_PATH)]
    pub input: PathBuf,

    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value = "5432")]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "swe_dating_db")]
    pub db_name: String,

    /// Connection charset (must be a UTF-8 variant)
    #[arg(long, env = "DB_CHARSET", default_value = "utf8mb4")]
    pub db_charset: String,

    /// Validate and report without connecting to the database
    #[arg(long)]
    pub dry_run: bool,
}

impl LoadArgs {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_password.clone(),
            database: self.db_name.clone(),
            charset: self.db_charset.clone(),
        }
    }

    pub fn load_config(&self) -> LoadConfig {
        let config = LoadConfig::new(&self.input);
        if self.dry_run {
            config.with_dry_run()
        } else {
            config
        }
    }
}
