//! Sumi-Harvest main entry point
//!
//! This is the command-line interface for the Sumi-Harvest site metadata fetcher.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_harvest::config::{load_config_with_hash, validate, Config};
use sumi_harvest::harvest::{BatchReport, Coordinator};
use sumi_harvest::output::{
    format_statistics, generate_markdown_summary, print_statistics, render_records, OutputFormat,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Sumi-Harvest: a concurrent site metadata fetcher
///
/// Fetches every URL once, at most N at a time, and prints one record per
/// URL in input order. URLs that cannot be fetched are shown as
/// placeholders.
#[derive(Parser, Debug)]
#[command(name = "sumi-harvest")]
#[command(version)]
#[command(about = "A concurrent, order-preserving site metadata fetcher", long_about = None)]
struct Cli {
    /// URLs to fetch
    #[arg(value_name = "URLS")]
    urls: Vec<String>,

    /// Read URLs from a file, one per line ('#' starts a comment line)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of fetches in flight
    #[arg(short = 'j', long = "jobs", value_name = "N")]
    jobs: Option<usize>,

    /// Per-fetch timeout in milliseconds
    #[arg(short = 't', long = "timeout", value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Write a markdown summary of the run to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Include response bodies in the output
    #[arg(long)]
    show_body: bool,

    /// Show the effective configuration and URL list without fetching
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only records
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let urls = collect_urls(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &urls);
        return Ok(());
    }

    let report = handle_batch(&config, &urls).await?;

    let rendered = render_records(
        &report.records,
        config.output.format,
        config.output.show_body,
    )?;
    print!("{}", rendered);

    if !cli.quiet {
        match config.output.format {
            OutputFormat::Text => {
                println!();
                print_statistics(&report.stats);
            }
            OutputFormat::Json => eprint!("{}", format_statistics(&report.stats)),
        }
    }

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&report, Path::new(path))?;
        tracing::info!("Summary written to: {}", path);
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

/// Loads the configuration file, if any, and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
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

    if let Some(jobs) = cli.jobs {
        config.fetcher.max_concurrent_fetches = jobs;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.fetcher.request_timeout_ms = timeout_ms;
    }
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }
    if cli.show_body {
        config.output.show_body = true;
    }

    validate(&config).context("Invalid command-line override")?;
    Ok(config)
}

/// Gathers URLs from the command line followed by the input file
fn collect_urls(cli: &Cli) -> anyhow::Result<Vec<String>> {
    let mut urls = cli.urls.clone();

    if let Some(path) = &cli.input {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read URL list from {}", path.display()))?;
        urls.extend(parse_url_list(&content));
    }

    if urls.is_empty() {
        tracing::warn!("No URLs given; nothing to fetch");
    }

    Ok(urls)
}

/// Splits a URL list into entries, skipping blank and comment lines
fn parse_url_list(content: &str) -> impl Iterator<Item = String> + '_ {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
}

/// Handles the --dry-run mode: shows the effective configuration and URLs
fn handle_dry_run(config: &Config, urls: &[String]) {
    println!("=== Sumi-Harvest Dry Run ===\n");

    println!("Fetcher Configuration:");
    println!("  Request timeout: {}ms", config.fetcher.request_timeout_ms);
    println!(
        "  Max concurrent fetches: {}",
        config.fetcher.max_concurrent_fetches
    );
    println!("  User agent: {}", config.fetcher.user_agent());

    println!("\nOutput:");
    println!("  Format: {:?}", config.output.format);
    println!("  Show body: {}", config.output.show_body);
    match &config.output.summary_path {
        Some(path) => println!("  Summary: {}", path),
        None => println!("  Summary: (none)"),
    }

    println!("\nURLs ({}):", urls.len());
    for (index, url) in urls.iter().enumerate() {
        println!("  {}. {}", index + 1, url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would fetch {} URLs", urls.len());
}

/// Runs the batch, cancelling it on Ctrl-C
async fn handle_batch(config: &Config, urls: &[String]) -> anyhow::Result<BatchReport> {
    let coordinator =
        Coordinator::from_config(&config.fetcher).context("Failed to build HTTP client")?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling batch");
            trigger.cancel();
        }
    });

    let report = coordinator.run_until_cancelled(urls, &cancel).await;

    if report.stats.cancelled > 0 {
        tracing::warn!(
            "{} URLs were not fetched because the batch was cancelled",
            report.stats.cancelled
        );
    }

    Ok(report)
}
