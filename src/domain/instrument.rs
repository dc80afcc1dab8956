use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::config::indices::find_index;
use crate::errors::ConfigError;

/// Which side of the straddle a contract symbol belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum OptionLeg {
    #[strum(to_string = "CE")]
    Call,
    #[strum(to_string = "PE")]
    Put,
}

impl OptionLeg {
    // Fyers-style symbols carry the leg as a suffix, e.g. NSE:NIFTY24N0723400CE
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let upper = symbol.trim().to_uppercase();
        OptionLeg::iter().find(|leg| upper.ends_with(&leg.to_string()))
    }
}

/// The user's instrument/strike choice. Changing it restarts the pipeline from a fresh fetch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StraddleSelection {
    pub index: String,
    pub strike: f64,
}

impl StraddleSelection {
    pub fn new(index: &str, strike: f64) -> Result<Self, ConfigError> {
        let info = find_index(index).ok_or_else(|| ConfigError::UnknownIndex(index.to_string()))?;
        if !strike.is_finite() || strike <= 0.0 {
            return Err(ConfigError::InvalidStrike(strike));
        }
        Ok(Self {
            index: info.name.to_string(),
            strike,
        })
    }

    /// Underlying index symbol, e.g. `NSE:NIFTY50-INDEX`.
    pub fn index_symbol(&self) -> &'static str {
        find_index(&self.index).map(|i| i.symbol).unwrap_or("UNKNOWN")
    }

    /// Strike as it goes into a URL path: `23400` rather than `23400.0`.
    pub fn strike_label(&self) -> String {
        if self.strike.fract() == 0.0 {
            format!("{}", self.strike as i64)
        } else {
            format!("{}", self.strike)
        }
    }
}

impl std::fmt::Display for StraddleSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} straddle", self.index, self.strike_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_validation() {
        let sel = StraddleSelection::new("nifty", 23400.0).expect("known index");
        assert_eq!(sel.index, "NIFTY");
        assert_eq!(sel.index_symbol(), "NSE:NIFTY50-INDEX");
        assert_eq!(sel.strike_label(), "23400");
        assert_eq!(sel.to_string(), "NIFTY 23400 straddle");

        assert_eq!(
            StraddleSelection::new("DOWJONES", 100.0),
            Err(ConfigError::UnknownIndex("DOWJONES".to_string()))
        );
        assert_eq!(
            StraddleSelection::new("NIFTY", 0.0),
            Err(ConfigError::InvalidStrike(0.0))
        );
    }

    #[test]
    fn test_fractional_strike_label() {
        let sel = StraddleSelection::new("MIDCPNIFTY", 12312.5).unwrap();
        assert_eq!(sel.strike_label(), "12312.5");
    }

    #[test]
    fn test_leg_from_symbol() {
        assert_eq!(OptionLeg::from_symbol("NSE:NIFTY24N0723400CE"), Some(OptionLeg::Call));
        assert_eq!(OptionLeg::from_symbol("NSE:NIFTY24N0723400PE"), Some(OptionLeg::Put));
        assert_eq!(OptionLeg::from_symbol("NSE:NIFTY50-INDEX"), None);
        assert_eq!(OptionLeg::Call.to_string(), "CE");
    }
}
