use anyhow::{Context, Result};
use clap::Parser;
use straddle_charts::Cli;
use straddle_charts::config::PERSISTENCE;
use straddle_charts::data::startup::{backend_config, resolve_selection};
use straddle_charts::data::{CacheFile, HistoricalDataSource, HttpStraddleSource};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Cli::parse();
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(build_demo_cache(&args))
}

async fn build_demo_cache(args: &Cli) -> Result<()> {
    let selection = resolve_selection(args).await?;
    let source = HttpStraddleSource::new(backend_config(args))?;
    let history = source
        .fetch_historical_straddle(&selection)
        .await
        .with_context(|| format!("Failed to fetch {} from {}", selection, args.backend_url))?;

    println!(
        "Fetched {}: {} CE / {} PE candles",
        selection,
        history.ce_candles.len(),
        history.pe_candles.len()
    );

    let output_path = CacheFile::default_cache_path(&selection);
    let cache = CacheFile::new(selection, history, PERSISTENCE.cache.version);
    cache.save_to_path(&output_path)?;

    println!("✅ Demo cache written to {:?}", output_path);
    Ok(())
}
