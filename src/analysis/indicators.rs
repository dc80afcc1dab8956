//! Technical indicators over the straddle series.
//!
//! Every function is pure and returns one value per input position, `None` where the
//! indicator is still warming up or the input is degenerate (zero period, zero volume).
//! None of them panic or emit non-finite values for finite input.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::domain::Candle;
use crate::models::MovingAverageKind;

/// Upper/middle/lower bands, all sharing the SMA warm-up cutoff.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Arithmetic mean of the trailing `period` prices; undefined for the first `period - 1`.
pub fn sma(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut averages = vec![None; prices.len()];
    if period == 0 || period > prices.len() {
        return averages;
    }
    for (i, window) in prices.windows(period).enumerate() {
        averages[i + period - 1] = Some(window.iter().sum::<f64>() / period as f64);
    }
    averages
}

/// Seeded with the first price, so there is no warm-up gap.
pub fn ema(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; prices.len()];
    }
    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut averages = Vec::with_capacity(prices.len());
    let mut previous: Option<f64> = None;
    for &price in prices {
        let next = match previous {
            None => price,
            Some(prev) => (price - prev) * multiplier + prev,
        };
        averages.push(Some(next));
        previous = Some(next);
    }
    averages
}

pub fn moving_average(prices: &[f64], period: usize, kind: MovingAverageKind) -> Vec<Option<f64>> {
    match kind {
        MovingAverageKind::Simple => sma(prices, period),
        MovingAverageKind::Exponential => ema(prices, period),
    }
}

/// SMA ± `std_dev_multiplier` population standard deviations of the same window.
pub fn bollinger(prices: &[f64], period: usize, std_dev_multiplier: f64) -> BollingerBands {
    let middle = sma(prices, period);
    let mut upper = vec![None; prices.len()];
    let mut lower = vec![None; prices.len()];

    if period > 0 && period <= prices.len() {
        for (i, window) in prices.windows(period).enumerate() {
            let idx = i + period - 1;
            if let Some(mean) = middle[idx] {
                let spread = std_dev_multiplier * window.iter().population_std_dev();
                upper[idx] = Some(mean + spread);
                lower[idx] = Some(mean - spread);
            }
        }
    }

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

/// Relative strength index using simple trailing means of gains and losses.
///
/// Defined from index `period` onwards. A window without losses reads 100
/// (50 if it has no gains either, i.e. a flat window).
pub fn rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; prices.len()];
    if period == 0 || prices.len() <= period {
        return out;
    }

    let changes: Vec<f64> = std::iter::once(0.0)
        .chain(prices.windows(2).map(|w| w[1] - w[0]))
        .collect();
    let gains: Vec<f64> = changes.iter().map(|c| c.max(0.0)).collect();
    let losses: Vec<f64> = changes.iter().map(|c| (-c).max(0.0)).collect();

    for i in period..prices.len() {
        let range = i + 1 - period..=i;
        let avg_gain = gains[range.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[range].iter().sum::<f64>() / period as f64;

        let value = if avg_loss == 0.0 {
            if avg_gain == 0.0 { 50.0 } else { 100.0 }
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };

        out[i] = value.is_finite().then(|| value.clamp(0.0, 100.0));
    }
    out
}

/// Running volume-weighted average of the typical price.
/// Undefined until some volume has traded; negative or non-finite volume counts as zero.
pub fn vwap(candles: &[Candle]) -> Vec<Option<f64>> {
    let mut cumulative_tpv = 0.0;
    let mut cumulative_volume = 0.0;

    candles
        .iter()
        .map(|candle| {
            let volume = if candle.volume.is_finite() && candle.volume > 0.0 {
                candle.volume
            } else {
                0.0
            };
            cumulative_tpv += candle.typical_price() * volume;
            cumulative_volume += volume;

            if cumulative_volume > 0.0 {
                let value = cumulative_tpv / cumulative_volume;
                value.is_finite().then_some(value)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_sma_warm_up() {
        assert_eq!(
            sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3),
            vec![None, None, Some(2.0), Some(3.0), Some(4.0)]
        );
        let long: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let out = sma(&long, 20);
        assert_eq!(out.iter().take_while(|v| v.is_none()).count(), 19);
        assert!(approx(out[19], 9.5));
    }

    #[test]
    fn test_sma_degenerate() {
        assert_eq!(sma(&[1.0, 2.0], 5), vec![None, None]);
        assert_eq!(sma(&[1.0, 2.0], 0), vec![None, None]);
        assert!(sma(&[], 3).is_empty());
        assert_eq!(sma(&[4.0], 1), vec![Some(4.0)]);
    }

    #[test]
    fn test_ema_seed_and_recurrence() {
        let out = ema(&[10.0, 20.0, 30.0], 2);
        // k = 2/3
        assert_eq!(out[0], Some(10.0), "EMA is seeded, not undefined");
        assert!(approx(out[1], 10.0 + (20.0 - 10.0) * 2.0 / 3.0));
        let second = 10.0 + (20.0 - 10.0) * 2.0 / 3.0;
        assert!(approx(out[2], second + (30.0 - second) * 2.0 / 3.0));
        assert!(ema(&[], 5).is_empty());
        assert_eq!(ema(&[1.0], 0), vec![None]);
    }

    #[test]
    fn test_moving_average_dispatch() {
        let prices = [1.0, 2.0, 3.0];
        assert_eq!(moving_average(&prices, 2, MovingAverageKind::Simple), sma(&prices, 2));
        assert_eq!(moving_average(&prices, 2, MovingAverageKind::Exponential), ema(&prices, 2));
    }

    #[test]
    fn test_bollinger_bands() {
        let prices = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let bands = bollinger(&prices, 8, 2.0);
        // Classic example: mean 5, population sigma 2
        assert!(approx(bands.middle[7], 5.0));
        assert!(approx(bands.upper[7], 9.0));
        assert!(approx(bands.lower[7], 1.0));
        assert!(bands.upper[..7].iter().all(Option::is_none));
        assert!(bands.lower[..7].iter().all(Option::is_none));
    }

    #[test]
    fn test_bollinger_flat_prices_collapse() {
        let bands = bollinger(&[100.0; 30], 20, 2.0);
        assert!(approx(bands.upper[25], 100.0));
        assert!(approx(bands.lower[25], 100.0));
        assert_eq!(bands.middle.iter().filter(|v| v.is_none()).count(), 19);
    }

    #[test]
    fn test_rsi_warm_up_and_range() {
        let prices: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        let out = rsi(&prices, 14);
        assert_eq!(out.len(), prices.len());
        assert!(out[..14].iter().all(Option::is_none));
        for v in out[14..].iter() {
            let v = v.expect("defined after warm-up");
            assert!((0.0..=100.0).contains(&v), "RSI out of range: {}", v);
        }
    }

    #[test]
    fn test_rsi_all_gains_and_flat() {
        let rising: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert!(approx(rsi(&rising, 14)[19], 100.0));

        let falling: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        assert!(approx(rsi(&falling, 14)[19], 0.0));

        assert!(approx(rsi(&[5.0; 20], 14)[19], 50.0));
    }

    #[test]
    fn test_rsi_known_value() {
        // changes: 0, +1, -1, +2  → period 2 at i=3: gains (0,2) losses (1,0) → RS = 1/0.5 = 2
        let out = rsi(&[10.0, 11.0, 10.0, 12.0], 2);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        // i=2: gains (1,0) losses (0,1) → RS 1 → 50
        assert!(approx(out[2], 50.0));
        assert!(approx(out[3], 100.0 - 100.0 / 3.0));
    }

    #[test]
    fn test_rsi_degenerate() {
        assert!(rsi(&[], 14).is_empty());
        assert_eq!(rsi(&[1.0, 2.0], 0), vec![None, None]);
        assert_eq!(rsi(&[1.0, 2.0, 3.0], 3), vec![None, None, None]);
    }

    #[test]
    fn test_vwap_constant_price() {
        let candles: Vec<Candle> = (0..10)
            .map(|i| Candle::new(i * 60_000, 50.0, 50.0, 50.0, 50.0, 10.0 + i as f64))
            .collect();
        assert!(vwap(&candles).iter().all(|v| approx(*v, 50.0)));
    }

    #[test]
    fn test_vwap_weighting() {
        let candles = vec![
            Candle::new(0, 10.0, 10.0, 10.0, 10.0, 1.0),
            Candle::new(60_000, 20.0, 20.0, 20.0, 20.0, 3.0),
        ];
        let out = vwap(&candles);
        assert!(approx(out[0], 10.0));
        assert!(approx(out[1], (10.0 + 60.0) / 4.0));
    }

    #[test]
    fn test_vwap_zero_volume_guarded() {
        let candles = vec![
            Candle::new(0, 10.0, 10.0, 10.0, 10.0, 0.0),
            Candle::new(60_000, 20.0, 20.0, 20.0, 20.0, 0.0),
            Candle::new(120_000, 30.0, 30.0, 30.0, 30.0, 2.0),
        ];
        assert_eq!(vwap(&candles), vec![None, None, Some(30.0)]);
        assert!(vwap(&[]).is_empty());
    }
}
