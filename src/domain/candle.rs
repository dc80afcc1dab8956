use serde::{Deserialize, Serialize};

use crate::utils::time_utils::format_candle_timestamp;

/// One OHLCV record. `timestamp_ms` is the start of the interval, in epoch milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// `low ≤ open,close ≤ high` and non-negative volume.
    /// Upstream data is not rejected when this fails; it is only reported.
    pub fn is_valid(&self) -> bool {
        self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
            && self.volume >= 0.0
    }

    /// (high + low + close) / 3, the price VWAP weights by volume.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Field-wise sum of two legs at the same timestamp (keeps `self`'s timestamp).
    pub fn add_leg(&self, other: &Candle) -> Candle {
        Candle {
            timestamp_ms: self.timestamp_ms,
            open: self.open + other.open,
            high: self.high + other.high,
            low: self.low + other.low,
            close: self.close + other.close,
            volume: self.volume + other.volume,
        }
    }

    pub fn label(&self) -> String {
        format_candle_timestamp(self.timestamp_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        let c = Candle::new(0, 100.0, 105.0, 99.0, 102.0, 1000.0);
        assert!(c.is_valid());

        let broken = Candle::new(0, 100.0, 99.0, 98.0, 97.0, 10.0);
        assert!(!broken.is_valid(), "open above high must be flagged");
    }

    #[test]
    fn test_add_leg() {
        let ce = Candle::new(60_000, 100.0, 105.0, 99.0, 102.0, 1000.0);
        let pe = Candle::new(60_000, 50.0, 52.0, 48.0, 51.0, 500.0);
        let straddle = ce.add_leg(&pe);
        assert_eq!(straddle, Candle::new(60_000, 150.0, 157.0, 147.0, 153.0, 1500.0));
        assert!((straddle.typical_price() - (157.0 + 147.0 + 153.0) / 3.0).abs() < 1e-12);
    }
}
