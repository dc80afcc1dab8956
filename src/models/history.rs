use serde::{Deserialize, Serialize};

use strum::IntoEnumIterator;

use crate::domain::{Candle, OptionLeg};

/// Raw CE/PE candles for one selection, as handed over by a historical data source.
/// Held for the lifetime of the selection and replaced wholesale when it changes.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct StraddleHistory {
    pub ce_symbol: String,
    pub pe_symbol: String,
    pub ce_candles: Vec<Candle>,
    pub pe_candles: Vec<Candle>,
}

impl StraddleHistory {
    pub fn symbols(&self) -> [&str; 2] {
        [&self.ce_symbol, &self.pe_symbol]
    }

    pub fn leg(&self, leg: OptionLeg) -> (&str, &[Candle]) {
        match leg {
            OptionLeg::Call => (&self.ce_symbol, &self.ce_candles),
            OptionLeg::Put => (&self.pe_symbol, &self.pe_candles),
        }
    }

    /// Legs whose symbol suffix does not match the side it was delivered as.
    pub fn mislabeled_legs(&self) -> Vec<OptionLeg> {
        OptionLeg::iter()
            .filter(|&leg| OptionLeg::from_symbol(self.leg(leg).0) != Some(leg))
            .collect()
    }

    /// Number of candles violating the OHLCV invariant (kept, only reported).
    pub fn invalid_candle_count(&self) -> usize {
        self.ce_candles
            .iter()
            .chain(self.pe_candles.iter())
            .filter(|c| !c.is_valid())
            .count()
    }
}
