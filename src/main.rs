use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;

use straddle_charts::config::{CHART, PERSISTENCE};
use straddle_charts::data::startup::{
    backend_config, build_providers, build_refresh_providers, resolve_selection,
};
use straddle_charts::data::HttpSubscriptionSink;
use straddle_charts::{ChartEngine, Cli, FallbackSource, PipelineState, PriceStreamManager};

fn main() -> Result<()> {
    // A. Init Logging
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {:?}", panic_info);
    }));
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    let settings = args.indicator_settings().context("Invalid indicator settings")?;
    let timeframe = args.timeframe().context("Invalid timeframe")?;
    if !CHART.timeframes_minutes.contains(&timeframe.minutes()) {
        log::warn!("{} is not one of the standard timeframes {:?}", timeframe, CHART.timeframes_minutes);
    }

    // C. Selection (may ask the backend for the ATM strike)
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let selection = rt.block_on(resolve_selection(&args))?;
    log::info!("Charting {} at {}", selection, timeframe);

    // D. Engine (network fetches write through to the cache; recomputes never touch it)
    log::info!("Cache directory: {} (v{})", PERSISTENCE.cache.directory, PERSISTENCE.cache.version);
    let source = Arc::new(FallbackSource::new(build_providers(&args)?));
    let refresh_source = Arc::new(FallbackSource::new(build_refresh_providers(&args)?));
    let sink = Arc::new(HttpSubscriptionSink::new(backend_config(&args))?);
    let mut engine = ChartEngine::new(source, sink, rt.handle().clone())
        .with_refresh_source(refresh_source);
    engine.set_timeframe(timeframe);
    engine.set_indicator_settings(settings)?;
    engine.select(selection.clone());

    // E. Live Feed
    let price_stream = PriceStreamManager::new(args.ws_url.clone());
    if !args.no_live {
        price_stream.start(rt.handle(), engine.quote_sender());
    }

    run_driver_loop(&mut engine, &price_stream, &args);
    Ok(())
}

/// Poll the engine, log every new or live-updated set, refresh on schedule.
/// Without a live feed or a refresh interval the loop ends after the first finished run.
fn run_driver_loop(engine: &mut ChartEngine, price_stream: &PriceStreamManager, args: &Cli) {
    let one_shot = args.no_live && args.refresh_secs == 0;
    let refresh_every = Duration::from_secs(args.refresh_secs);
    let mut last_refresh = Instant::now();
    let mut last_shown = None;
    let mut last_state = engine.state();
    let mut last_feed = price_stream.status();

    loop {
        engine.update();

        let state = engine.state();
        let entered = state != last_state;
        last_state = state;

        match state {
            PipelineState::Error if entered => {
                log::error!("{}", engine.get_status_msg());
                if one_shot {
                    return;
                }
            }
            PipelineState::Ready if entered => {
                if one_shot {
                    if let Some(series) = engine.displayed() {
                        log::info!("{}", series.summary());
                    }
                    return;
                }
            }
            _ => {}
        }

        // Log when the front buffer changed (new run or live merge)
        if let Some(series) = engine.displayed() {
            let changed = last_shown
                .as_ref()
                .is_none_or(|prev| !Arc::ptr_eq(prev, &series));
            if changed {
                log::info!("{}", series.summary());
                last_shown = Some(series);
            }
        }

        if !args.no_live {
            let feed = price_stream.status();
            if feed != last_feed {
                log::info!("Live feed: {:?}", feed);
                last_feed = feed;
            }
        }

        if args.refresh_secs > 0 && last_refresh.elapsed() >= refresh_every {
            last_refresh = Instant::now();
            engine.refresh();
        }

        std::thread::sleep(Duration::from_millis(CHART.update_poll_ms));
    }
}
