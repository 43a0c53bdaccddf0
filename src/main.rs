//! Storefront-Harvest main entry point
//!
//! This is the command-line interface for the storefront scraping pipeline.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use storefront_harvest::config::{load_config_with_hash, validate, Config};
use storefront_harvest::crawler::crawl;
use storefront_harvest::output::{print_summary, write_raw_snapshot, RunSummary, SinkSet};
use storefront_harvest::transform::build_table;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Storefront-Harvest: a paginated storefront scraper
///
/// Crawls a range of product listing pages, cleans the scraped listings into
/// a typed table, and saves that table to CSV, Google Sheets and SQLite.
#[derive(Parser, Debug)]
#[command(name = "storefront-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A paginated storefront scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the last page to crawl
    #[arg(long, value_name = "PAGE")]
    end_page: Option<u32>,

    /// Override the maximum number of records collected
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _logging = setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(end_page) = cli.end_page {
        config.scraper.end_page = end_page;
    }
    if let Some(limit) = cli.limit {
        config.scraper.limit = limit;
    }
    validate(&config).context("invalid command-line override")?;

    if cli.dry_run {
        print_plan(&config);
        return Ok(());
    }

    run_pipeline(config, config_hash).await
}

/// Installs a subscriber for the lifetime of the returned guard
fn setup_logging(verbose: u8, quiet: bool) -> DefaultGuard {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("storefront_harvest=info,warn"),
            1 => EnvFilter::new("storefront_harvest=debug,info"),
            2 => EnvFilter::new("storefront_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .finish();

    tracing::subscriber::set_default(subscriber)
}

/// Handles --dry-run: shows the resolved configuration
fn print_plan(config: &Config) {
    let scraper = &config.scraper;
    println!("=== Storefront-Harvest Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Base URL: {}", scraper.base_url);
    println!("  Pages: {} to {}", scraper.start_page, scraper.end_page);
    println!("  Item limit: {}", scraper.limit);
    println!("  Timeout: {}s", scraper.timeout_secs);
    match scraper.stop_after_empty_pages {
        Some(n) => println!("  Stop after {} consecutive empty pages", n),
        None => println!("  Visit every page in range"),
    }

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    if let Some(raw) = &config.output.raw_csv_path {
        println!("  Raw snapshot: {}", raw);
    }
    match &config.output.sheets {
        Some(sheets) => println!(
            "  Google Sheets: {} ({})",
            sheets.spreadsheet_id, sheets.sheet_name
        ),
        None => println!("  Google Sheets: disabled"),
    }
    match &config.output.database {
        Some(db) => println!("  SQLite: {} (table {})", db.uri, db.table_name),
        None => println!("  SQLite: disabled"),
    }

    println!("\n✓ Configuration is valid");
}

/// Extract, transform, load
///
/// An empty extraction or an empty table ends the run early with a logged
/// error; it is not treated as a process failure.
async fn run_pipeline(config: Config, config_hash: String) -> anyhow::Result<()> {
    let report = crawl(config.scraper.clone())
        .await
        .context("failed to start crawl")?;

    if report.records.is_empty() {
        tracing::error!("No products were scraped. Exiting.");
        return Ok(());
    }

    if let Some(raw_path) = &config.output.raw_csv_path {
        if let Err(e) = write_raw_snapshot(Path::new(raw_path), &report.records) {
            tracing::warn!("Failed to save raw snapshot: {}", e);
        }
    }

    let table = build_table(&report.records);
    if table.is_empty() {
        tracing::error!("Transformation produced an empty table. Exiting.");
        return Ok(());
    }
    tracing::info!(
        "Transformed {} raw records into {} rows",
        report.records.len(),
        table.len()
    );

    let client = reqwest::Client::builder()
        .timeout(config.scraper.timeout())
        .build()
        .context("failed to build HTTP client for sinks")?;
    let sinks = SinkSet::from_config(&config.output, client);

    let mut summary = RunSummary::new(config_hash, &report, table.len());
    summary.sinks = sinks.persist_all(&table).await;

    if !summary.all_sinks_saved() {
        tracing::warn!(
            "{} of {} sinks failed",
            summary.sinks.len() - summary.sinks_saved(),
            summary.sinks.len()
        );
    }
    print_summary(&summary);

    Ok(())
}
