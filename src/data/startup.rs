// Async setup run in main before the driver loop starts

use crate::Cli;
use crate::config::{BackendApiConfig, PERSISTENCE};
use crate::domain::StraddleSelection;
use crate::errors::FetchError;

use super::cache_file::{CacheFileSource, WriteThroughCache};
use super::http_source::HttpStraddleSource;
use super::source::HistoricalDataSource;

pub fn backend_config(args: &Cli) -> BackendApiConfig {
    BackendApiConfig {
        base_url: args.backend_url.clone(),
        ..Default::default()
    }
}

/// Network provider; every history it fetches is written through to the cache directory.
fn api_provider(args: &Cli) -> Result<Box<dyn HistoricalDataSource>, FetchError> {
    Ok(Box::new(WriteThroughCache::new(
        HttpStraddleSource::new(backend_config(args))?,
        PERSISTENCE.cache.directory,
    )))
}

fn cache_provider() -> Box<dyn HistoricalDataSource> {
    Box::new(CacheFileSource::default())
}

/// Provider order for a selection: local cache first unless the user prefers the API.
pub fn build_providers(args: &Cli) -> Result<Vec<Box<dyn HistoricalDataSource>>, FetchError> {
    let providers = if args.prefer_api {
        vec![api_provider(args)?, cache_provider()] // API first
    } else {
        vec![cache_provider(), api_provider(args)?] // local first
    };
    log::info!(
        "Historical providers: {:?}",
        providers.iter().map(|p| p.signature()).collect::<Vec<_>>()
    );
    Ok(providers)
}

/// Provider order for scheduled refreshes: always the API, the cache only when it is unreachable.
pub fn build_refresh_providers(args: &Cli) -> Result<Vec<Box<dyn HistoricalDataSource>>, FetchError> {
    Ok(vec![api_provider(args)?, cache_provider()])
}

/// Selection from the command line; without `--strike` ask the backend for the ATM strike.
pub async fn resolve_selection(args: &Cli) -> anyhow::Result<StraddleSelection> {
    use anyhow::Context;

    let strike = match args.strike {
        Some(strike) => strike,
        None => {
            let client = HttpStraddleSource::new(backend_config(args))?;
            let strikes = client
                .fetch_index_strikes(&args.index)
                .await
                .context(format!("Failed to look up default strike for {}", args.index))?;
            log::info!(
                "{} at {:.2}; using ATM strike {}",
                args.index,
                strikes.current_price,
                strikes.default_strike
            );
            strikes.default_strike
        }
    };
    Ok(StraddleSelection::new(&args.index, strike)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_provider_order_follows_prefer_api() {
        let local_first = build_providers(&Cli::parse_from(["x"])).unwrap();
        assert_eq!(local_first[0].signature(), "Local Cache");

        let api_first = build_providers(&Cli::parse_from(["x", "--prefer-api"])).unwrap();
        assert_eq!(api_first[0].signature(), "Backend REST");
        assert_eq!(api_first.len(), 2);
    }

    #[test]
    fn test_refresh_goes_to_the_api_even_when_cache_is_preferred() {
        let refresh = build_refresh_providers(&Cli::parse_from(["x"])).unwrap();
        let order: Vec<_> = refresh.iter().map(|p| p.signature()).collect();
        assert_eq!(order, vec!["Backend REST", "Local Cache"]);
    }

    #[tokio::test]
    async fn test_explicit_strike_needs_no_backend() {
        let args = Cli::parse_from(["x", "--index", "sensex", "--strike", "80000"]);
        let selection = resolve_selection(&args).await.unwrap();
        assert_eq!(selection.index, "SENSEX");
        assert_eq!(selection.strike, 80000.0);
    }
}
