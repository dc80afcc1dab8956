use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::errors::ConfigError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum MovingAverageKind {
    #[default]
    #[strum(to_string = "SMA", serialize = "simple", serialize = "sma")]
    Simple,
    #[strum(to_string = "EMA", serialize = "exponential", serialize = "ema")]
    Exponential,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerSettings {
    pub enabled: bool,
    pub period: usize,
    pub std_dev_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSettings {
    pub enabled: bool,
    pub period: usize,
    pub kind: MovingAverageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiSettings {
    pub enabled: bool,
    pub period: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VwapSettings {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesVisibility {
    pub show_ce: bool,
    pub show_pe: bool,
}

/// Snapshot of the indicator configuration. Each pipeline run gets its own copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSettings {
    pub bollinger: BollingerSettings,
    pub moving_average: MovingAverageSettings,
    pub rsi: RsiSettings,
    pub vwap: VwapSettings,
    pub series_visibility: SeriesVisibility,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        crate::config::CHART.default_indicators
    }
}

impl IndicatorSettings {
    /// Disabled indicators are not checked; their parameters are never used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bollinger.enabled {
            if self.bollinger.period == 0 {
                return Err(ConfigError::ZeroPeriod { indicator: "bollinger" });
            }
            let mult = self.bollinger.std_dev_multiplier;
            if !mult.is_finite() || mult <= 0.0 {
                return Err(ConfigError::InvalidStdDevMultiplier(mult));
            }
        }
        if self.moving_average.enabled && self.moving_average.period == 0 {
            return Err(ConfigError::ZeroPeriod { indicator: "moving average" });
        }
        if self.rsi.enabled && self.rsi.period == 0 {
            return Err(ConfigError::ZeroPeriod { indicator: "rsi" });
        }
        Ok(())
    }

    /// Moving average series name, e.g. `SMA (20)`.
    pub fn moving_average_name(&self) -> String {
        format!("{} ({})", self.moving_average.kind, self.moving_average.period)
    }
}
