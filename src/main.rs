//! CLI entry point for seedwatch.

use anyhow::{Context, Result};
use clap::Parser;
use seedwatch::config::AppConfig;
use seedwatch::{Downloader, EngineSettings, HttpClient, ListingExtractor, PollEngine, WatchList};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    // Startup phase: any failure here aborts with a non-zero exit before the
    // poll loop starts.
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;

    let watch_list_file = args.watch_list.unwrap_or_else(|| config.watch_list_file.clone());
    let watchlist = WatchList::load(&watch_list_file)
        .with_context(|| format!("loading watch-list from {}", watch_list_file.display()))?;

    let output_dir = args.output_dir.unwrap_or_else(|| config.output_dir.clone());

    info!(
        watch_items = watchlist.len(),
        site = %config.site_host,
        output_dir = %output_dir.display(),
        "seedwatch starting"
    );

    let client = HttpClient::new(&config.fetch_config()).context("building HTTP client")?;
    let extractor =
        ListingExtractor::new(&config.site_config()).context("compiling extraction patterns")?;
    let downloader = Downloader::new(client.clone(), output_dir);

    let settings = EngineSettings {
        sleep_interval: config.sleep_interval(),
        ..EngineSettings::default()
    };

    let mut engine = PollEngine::new(client, extractor, downloader, watchlist, settings);
    engine.run().await;

    Ok(())
}
