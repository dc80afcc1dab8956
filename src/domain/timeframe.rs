use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::utils::TimeUtils;

/// Resampling width in whole minutes (always ≥ 1).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timeframe(u32);

impl Timeframe {
    pub const ONE_MINUTE: Timeframe = Timeframe(1);

    pub fn new(minutes: u32) -> Result<Self, ConfigError> {
        if minutes == 0 {
            return Err(ConfigError::ZeroTimeframe);
        }
        Ok(Self(minutes))
    }

    pub fn minutes(&self) -> u32 {
        self.0
    }

    pub fn width_ms(&self) -> i64 {
        self.0 as i64 * TimeUtils::MS_IN_MIN
    }

    pub fn label(&self) -> String {
        TimeUtils::minutes_to_string(self.0)
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::ONE_MINUTE
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
