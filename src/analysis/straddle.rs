//! CE + PE → synthetic straddle candles.

use std::collections::HashMap;

use crate::domain::Candle;

/// Inner-join the two legs on timestamp and add them field by field.
///
/// CE candles without a PE partner at the same timestamp are dropped: a straddle price needs
/// both legs. The result is always sorted ascending.
pub fn combine(ce: &[Candle], pe: &[Candle]) -> Vec<Candle> {
    // Later duplicates win
    let pe_by_ts: HashMap<i64, &Candle> = pe.iter().map(|c| (c.timestamp_ms, c)).collect();

    let mut straddle: Vec<Candle> = ce
        .iter()
        .filter_map(|ce_candle| {
            pe_by_ts
                .get(&ce_candle.timestamp_ms)
                .map(|pe_candle| ce_candle.add_leg(pe_candle))
        })
        .collect();

    sort_ascending(&mut straddle);
    straddle
}

/// Stable sort by timestamp.
pub fn sort_ascending(candles: &mut [Candle]) {
    candles.sort_by_key(|c| c.timestamp_ms);
}
