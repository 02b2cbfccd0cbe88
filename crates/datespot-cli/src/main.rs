use std::path::Path;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use datespot::{Command, Config, EnrichArgs, LoadArgs};
use datespot_client::OpenAIClient;
use datespot_core::traits::SummaryGenerator;
use datespot_core::{EnrichService, EnrichStats, LoadService, LoadSummary, TracingReporter};
use datespot_db::PgPlaceConnector;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::parse();

    let level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    match config.command {
        Command::Enrich(args) => enrich(&args).await?,
        Command::Load(args) => load(&args).await?,
    }

    Ok(())
}

/// Runs the enrichment stage. A missing input is reported and the process
/// exits successfully.
async fn enrich(args: &EnrichArgs) -> anyhow::Result<()> {
    let client =
        OpenAIClient::with_config(&args.openai_api_key, &args.model, args.endpoint.as_deref())
            .context("Failed to create OpenAI client")?;
    info!(
        endpoint = client.endpoint(),
        "Using {} generation provider (model {})",
        client.name(),
        client.model()
    );

    let service = EnrichService::new(client, args.enrich_config());

    match service.process_enrichment(&TracingReporter).await {
        Ok(stats) => {
            print_enrich_summary(&stats, &service.config().output);
            Ok(())
        }
        Err(e) if e.is_missing_input() => {
            error!("{}", e.user_message());
            Ok(())
        }
        Err(e) => {
            error!("{}", e.user_message());
            Err(e).context("Enrichment failed")
        }
    }
}

/// Runs the load stage. A missing input terminates the process with status 1.
async fn load(args: &LoadArgs) -> anyhow::Result<()> {
    let connector =
        PgPlaceConnector::new(args.store_config()).context("Invalid database configuration")?;
    let store = connector.config();
    info!(
        host = %store.host,
        port = store.port,
        database = %store.database,
        dry_run = args.dry_run,
        "Loading into places table"
    );
    let service = LoadService::new(connector, args.load_config());

    match service.process_load(&TracingReporter).await {
        Ok(summary) => {
            print_load_summary(&summary, &service.config().input);
            Ok(())
        }
        Err(e) if e.is_missing_input() => {
            error!("{}", e.user_message());
            std::process::exit(1);
        }
        Err(e) => {
            error!("{}", e.user_message());
            Err(e).context("Load failed")
        }
    }
}

fn print_enrich_summary(stats: &EnrichStats, output: &Path) {
    eprintln!();
    eprintln!("═══════════════════════════════════════════════════════");
    eprintln!("  ENRICHMENT COMPLETE");
    eprintln!("═══════════════════════════════════════════════════════");
    eprintln!("  Output:              {}", output.display());
    eprintln!("  Total records:       {}", stats.total);
    eprintln!("  New summaries:       {}", stats.updated);
    eprintln!("  Already present:     {}", stats.skipped);
    if stats.fallbacks > 0 {
        eprintln!("  Fallback text used:  {}", stats.fallbacks);
    }
    eprintln!("═══════════════════════════════════════════════════════");
    eprintln!();
}

fn print_load_summary(summary: &LoadSummary, input: &Path) {
    eprintln!();
    eprintln!("═══════════════════════════════════════════════════════");
    if summary.dry_run {
        eprintln!("  LOAD DRY RUN (nothing written)");
    } else {
        eprintln!("  LOAD COMPLETE");
    }
    eprintln!("═══════════════════════════════════════════════════════");
    eprintln!("  Input:               {}", input.display());
    eprintln!("  Records:             {}", summary.records);
    if !summary.dry_run {
        eprintln!("  Rows affected:       {}", summary.rows_affected);
    }
    eprintln!("───────────────────────────────────────────────────────");
    eprintln!("  Skipped (no key):    {}", summary.skipped_without_key);
    eprintln!("  Duplicate kakao_id:  {}", summary.duplicate_keys);
    eprintln!("  Missing summaries:   {}", summary.missing_summaries);
    eprintln!("═══════════════════════════════════════════════════════");
    eprintln!();
}
