//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest single-site page harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_harvest::config::{load_config_with_hash, validate, Config};
use sumi_harvest::crawler::crawl;
use sumi_harvest::output::{print_statistics, write_csv_report, CrawlStatistics};
use sumi_harvest::url::parse_web_url;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a single-site page harvester
///
/// Sumi-Harvest crawls one website from a seed address, following only links on the
/// seed's domain, and writes each page's heading, first paragraph, links and images
/// to a CSV report.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A single-site page harvester", long_about = None)]
struct Cli {
    /// Absolute http(s) address to start crawling from
    #[arg(value_name = "SEED", value_parser = parse_seed)]
    seed: String,

    /// Maximum number of pages fetched at the same time
    #[arg(value_name = "MAX_CONCURRENCY", value_parser = clap::value_parser!(u32).range(1..))]
    max_concurrency: u32,

    /// Maximum number of pages to visit
    #[arg(value_name = "MAX_PAGES", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: u32,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the CSV report (overrides the config file)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn parse_seed(input: &str) -> Result<String, String> {
    parse_web_url(input)
        .map(|url| url.to_string())
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_settings(&cli)?;
    let report_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.report_path));

    println!("starting crawl of: {}", cli.seed);

    let outcome = crawl(&cli.seed, &config)
        .await
        .with_context(|| format!("Crawl of {} failed", cli.seed))?;

    println!("found {} pages", outcome.len());
    for record in outcome.records() {
        println!("{} - {}", record.url, record.heading);
    }

    write_report(outcome.records(), &report_path, &config.output.list_delimiter)?;

    if !cli.quiet {
        print_statistics(&CrawlStatistics::from_outcome(&outcome));
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_harvest=info,warn"),
            1 => EnvFilter::new("sumi_harvest=debug,info"),
            2 => EnvFilter::new("sumi_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if one was given, then applies the command-line limits
fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    config.crawler.max_concurrency = cli.max_concurrency;
    config.crawler.max_pages = cli.max_pages;
    validate(&config).context("Invalid settings")?;

    tracing::debug!(
        "Crawler limits: {} concurrent fetches, {} pages",
        config.crawler.max_concurrency,
        config.crawler.max_pages
    );

    Ok(config)
}

/// Writes the CSV report
fn write_report<'a>(
    pages: impl IntoIterator<Item = &'a sumi_harvest::PageRecord>,
    path: &Path,
    delimiter: &str,
) -> anyhow::Result<()> {
    write_csv_report(pages, path, delimiter)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
