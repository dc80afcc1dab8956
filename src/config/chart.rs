//! Chart pipeline defaults

use crate::models::settings::{
    BollingerSettings, IndicatorSettings, MovingAverageKind, MovingAverageSettings, RsiSettings,
    SeriesVisibility, VwapSettings,
};

/// Series names the render collaborator can rely on
pub struct SeriesNames {
    pub straddle: &'static str,
    pub bb_upper: &'static str,
    pub bb_middle: &'static str,
    pub bb_lower: &'static str,
    pub vwap: &'static str,
    pub rsi: &'static str,
}

pub struct ChartConfig {
    /// Timeframes offered to users (minutes). The resampler itself accepts any width ≥ 1.
    pub timeframes_minutes: &'static [u32],
    pub default_timeframe_minutes: u32,
    pub default_index: &'static str,
    pub default_indicators: IndicatorSettings,
    pub names: SeriesNames,
    /// How often the headless driver polls the engine (ms)
    pub update_poll_ms: u64,
}

pub const CHART: ChartConfig = ChartConfig {
    timeframes_minutes: &[1, 3, 5, 15, 30, 60, 1440],
    default_timeframe_minutes: 1,
    default_index: "NIFTY",
    default_indicators: IndicatorSettings {
        bollinger: BollingerSettings {
            enabled: true,
            period: 20,
            std_dev_multiplier: 2.0,
        },
        moving_average: MovingAverageSettings {
            enabled: true,
            period: 20,
            kind: MovingAverageKind::Simple,
        },
        rsi: RsiSettings {
            enabled: true,
            period: 14,
        },
        vwap: VwapSettings { enabled: true },
        series_visibility: SeriesVisibility {
            show_ce: false,
            show_pe: false,
        },
    },
    names: SeriesNames {
        straddle: "Straddle",
        bb_upper: "BB Upper",
        bb_middle: "BB Middle",
        bb_lower: "BB Lower",
        vwap: "VWAP",
        rsi: "RSI",
    },
    update_poll_ms: 250,
};
