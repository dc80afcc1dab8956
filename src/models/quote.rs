use serde::{Deserialize, Serialize};

use crate::utils::TimeUtils;

/// Streaming market update keyed by instrument symbol.
/// Only `symbol` and `ltp` are required on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct LiveQuote {
    pub symbol: String,
    pub ltp: f64,
    /// Exchange feed time, epoch seconds
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub open: f64,
    #[serde(default)]
    pub high: f64,
    #[serde(default)]
    pub low: f64,
    #[serde(default)]
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub change: f64,
    #[serde(default)]
    pub change_percent: f64,
}

impl LiveQuote {
    pub fn new(symbol: &str, ltp: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            ltp,
            ..Default::default()
        }
    }

    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp * TimeUtils::MS_IN_S
    }

    /// A quote is only merged if its price is usable.
    pub fn is_usable(&self) -> bool {
        !self.symbol.is_empty() && self.ltp.is_finite() && self.ltp > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_market_update() {
        let text = r#"{"symbol":"NSE:NIFTY24N0723400CE","timestamp":1730692500,"ltp":103.5,
            "open":100.0,"high":105.0,"low":99.0,"prev_close":98.0,"change":5.5,
            "change_percent":5.61,"volume":125000}"#;
        let quote: LiveQuote = serde_json::from_str(text).expect("market update parses");
        assert_eq!(quote.symbol, "NSE:NIFTY24N0723400CE");
        assert_eq!(quote.ltp, 103.5);
        assert_eq!(quote.volume, 125000.0);
        assert_eq!(quote.timestamp_ms(), 1_730_692_500_000);
        assert!(quote.is_usable());
    }

    #[test]
    fn test_minimal_quote() {
        let quote: LiveQuote = serde_json::from_str(r#"{"symbol":"X","ltp":0}"#).unwrap();
        assert!(!quote.is_usable(), "zero ltp is not merged");
    }
}
