use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use painting_scraper::config::{PipelineConfig, DEFAULT_CSV_NAME};
use painting_scraper::fetch::HttpFetcher;
use painting_scraper::pipeline;

#[derive(Parser)]
#[command(name = "painting_scraper", about = "Scrape The Joy of Painting catalog into a CSV dataset")]
struct Cli {
    /// File to save the dataset to. Should end with '.csv'.
    #[arg(long = "csv-name", alias = "csv_name", default_value = DEFAULT_CSV_NAME)]
    csv_name: PathBuf,
    /// If > 0, print progress per painting.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    verbose: i32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose > 0 { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    let t0 = Instant::now();
    let config = PipelineConfig::default();
    let fetcher = HttpFetcher::new(&config.user_agent).context("Failed to set up HTTP client")?;

    println!("Collecting Bob Ross paintings");
    let summary = pipeline::run(&fetcher, &config, &cli.csv_name, cli.verbose).await?;

    info!(pages = summary.pages, skipped = summary.skipped, "Run finished");
    println!(
        "Saved {} paintings to {} ({} skipped) in {:.1}s",
        summary.collected,
        cli.csv_name.display(),
        summary.skipped,
        t0.elapsed().as_secs_f64()
    );
    Ok(())
}
