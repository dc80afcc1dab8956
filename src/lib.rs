#![allow(clippy::collapsible_if)]

// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod domain;
pub mod errors;
pub mod models;
pub mod utils;

// The engine
pub mod engine;

// Re-export commonly used types
pub use data::{FallbackSource, HistoricalDataSource, PriceStreamManager, SubscriptionSink};
pub use domain::{Candle, StraddleSelection, Timeframe};
pub use engine::{ChartEngine, PipelineState};
pub use errors::{ConfigError, FetchError};
pub use models::{IndicatorSettings, LiveQuote, MovingAverageKind, RenderableSeries};

// CLI argument parsing
use clap::Parser;

use config::{BACKEND, CHART};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Live option straddle charts with indicators", long_about = None)]
pub struct Cli {
    /// Backend REST base url
    #[arg(long, default_value = BACKEND.rest.base_url)]
    pub backend_url: String,

    /// Backend market-data websocket url
    #[arg(long, default_value = BACKEND.ws.url)]
    pub ws_url: String,

    /// Index to chart (NIFTY, BANKNIFTY, FINNIFTY, MIDCPNIFTY, SENSEX, BANKEX)
    #[arg(long, default_value = CHART.default_index)]
    pub index: String,

    /// Strike price. Defaults to the backend's ATM strike for the index
    #[arg(long)]
    pub strike: Option<f64>,

    /// Candle width in minutes
    #[arg(long, default_value_t = CHART.default_timeframe_minutes)]
    pub timeframe: u32,

    /// Use API as primary source instead of the local cache
    #[arg(long, default_value_t = false)]
    pub prefer_api: bool,

    /// Do not connect to the live price stream
    #[arg(long, default_value_t = false)]
    pub no_live: bool,

    /// Plot the CE leg close as its own series
    #[arg(long, default_value_t = false)]
    pub show_ce: bool,

    /// Plot the PE leg close as its own series
    #[arg(long, default_value_t = false)]
    pub show_pe: bool,

    /// Moving average kind (sma | ema)
    #[arg(long, default_value_t = CHART.default_indicators.moving_average.kind)]
    pub ma_kind: MovingAverageKind,

    #[arg(long, default_value_t = CHART.default_indicators.moving_average.period)]
    pub ma_period: usize,

    #[arg(long, default_value_t = CHART.default_indicators.bollinger.period)]
    pub bb_period: usize,

    #[arg(long, default_value_t = CHART.default_indicators.bollinger.std_dev_multiplier)]
    pub bb_std_dev: f64,

    #[arg(long, default_value_t = CHART.default_indicators.rsi.period)]
    pub rsi_period: usize,

    #[arg(long, default_value_t = false)]
    pub no_bollinger: bool,

    #[arg(long, default_value_t = false)]
    pub no_ma: bool,

    #[arg(long, default_value_t = false)]
    pub no_rsi: bool,

    #[arg(long, default_value_t = false)]
    pub no_vwap: bool,

    /// Re-fetch history every N seconds (0 = never)
    #[arg(long, default_value_t = 0)]
    pub refresh_secs: u64,
}

impl Cli {
    /// Indicator settings requested on the command line, validated.
    pub fn indicator_settings(&self) -> Result<IndicatorSettings, ConfigError> {
        let mut settings = IndicatorSettings::default();
        settings.bollinger.enabled = !self.no_bollinger;
        settings.bollinger.period = self.bb_period;
        settings.bollinger.std_dev_multiplier = self.bb_std_dev;
        settings.moving_average.enabled = !self.no_ma;
        settings.moving_average.kind = self.ma_kind;
        settings.moving_average.period = self.ma_period;
        settings.rsi.enabled = !self.no_rsi;
        settings.rsi.period = self.rsi_period;
        settings.vwap.enabled = !self.no_vwap;
        settings.series_visibility.show_ce = self.show_ce;
        settings.series_visibility.show_pe = self.show_pe;
        settings.validate()?;
        Ok(settings)
    }

    pub fn timeframe(&self) -> Result<Timeframe, ConfigError> {
        Timeframe::new(self.timeframe)
    }
}
