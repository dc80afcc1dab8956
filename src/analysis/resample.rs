//! Fixed-width time bucketing of fine-grained candles.

use itertools::Itertools;

use crate::domain::{Candle, Timeframe};
use crate::utils::TimeUtils;
use crate::utils::time_utils::truncate_to_minute;

/// Aggregate an ascending candle sequence into `timeframe`-wide buckets.
///
/// A width of one minute, or input that already sits one candle per bucket on the width's grid,
/// returns the input unchanged. Otherwise the first bucket starts at the first candle's minute,
/// rounded down to a multiple of the width within its hour. Each non-empty bucket becomes one candle stamped with
/// the bucket start; empty buckets (gaps) produce nothing.
pub fn resample(candles: &[Candle], timeframe: Timeframe) -> Vec<Candle> {
    if candles.is_empty() {
        return Vec::new();
    }

    let width = timeframe.minutes();
    if width == 1 || already_bucketed(candles, timeframe) {
        return candles.to_vec();
    }

    let width_ms = timeframe.width_ms();
    let mut bucket_start = first_bucket_start(candles[0].timestamp_ms, width);
    let mut current: Option<Candle> = None;
    let mut resampled = Vec::with_capacity(candles.len() / width as usize + 1);

    for candle in candles {
        if candle.timestamp_ms >= bucket_start + width_ms {
            if let Some(closed) = current.take() {
                resampled.push(closed);
            }
            // Jump straight to the bucket holding this candle, however many empty ones lie between
            let buckets_ahead = (candle.timestamp_ms - bucket_start) / width_ms;
            bucket_start += buckets_ahead * width_ms;
        }

        // Anything earlier than the open bucket (out of order, duplicates) folds into it
        match current.as_mut() {
            Some(agg) => {
                agg.high = agg.high.max(candle.high);
                agg.low = agg.low.min(candle.low);
                agg.close = candle.close;
                agg.volume += candle.volume;
            }
            None => {
                current = Some(Candle {
                    timestamp_ms: bucket_start,
                    ..*candle
                });
            }
        }
    }

    // Partially filled final bucket
    if let Some(closed) = current {
        resampled.push(closed);
    }

    #[cfg(debug_assertions)]
    if crate::config::debug::PRINT_PIPELINE_STAGES {
        log::info!(
            "Resampled {} candles into {} x {} buckets",
            candles.len(),
            resampled.len(),
            timeframe
        );
    }

    resampled
}

/// True when every candle is exactly on a bucket start of the grid the first candle anchors,
/// strictly ascending. Bucketing such input would reproduce it unchanged.
/// Spacing alone is not enough: sparse data `width` apart but off the grid must still be re-anchored,
/// or it would no longer line up with the other leg.
fn already_bucketed(candles: &[Candle], timeframe: Timeframe) -> bool {
    let width_ms = timeframe.width_ms();
    let origin = first_bucket_start(candles[0].timestamp_ms, timeframe.minutes());
    candles
        .iter()
        .all(|c| (c.timestamp_ms - origin).rem_euclid(width_ms) == 0)
        && candles
            .iter()
            .tuple_windows()
            .all(|(a, b)| a.timestamp_ms < b.timestamp_ms)
}

/// Drop seconds, then round the minute-of-hour down to a multiple of `width_minutes`.
fn first_bucket_start(timestamp_ms: i64, width_minutes: u32) -> i64 {
    let minute_start = truncate_to_minute(timestamp_ms);
    let minute_of_hour = (minute_start / TimeUtils::MS_IN_MIN).rem_euclid(60);
    let excess = minute_of_hour % width_minutes as i64;
    minute_start - excess * TimeUtils::MS_IN_MIN
}
