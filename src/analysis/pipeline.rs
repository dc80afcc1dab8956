//! The synchronous part of a chart update: resample → combine → indicators → series set.

use std::collections::HashMap;

use crate::analysis::indicators::{self, BollingerBands};
use crate::analysis::resample::resample;
use crate::analysis::straddle::combine;
use crate::config::CHART;
use crate::domain::{Candle, StraddleSelection, Timeframe};
use crate::engine::state::PipelineState;
use crate::models::{IndicatorSettings, NamedSeries, RenderableSeries, StraddleHistory};

/// Borrowed view of everything one run needs.
#[derive(Debug, Clone)]
pub struct PipelineInput<'a> {
    pub history: &'a StraddleHistory,
    pub selection: &'a StraddleSelection,
    pub timeframe: Timeframe,
    pub settings: IndicatorSettings,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct IndicatorOutputs {
    bollinger: Option<BollingerBands>,
    moving_average: Option<Vec<Option<f64>>>,
    rsi: Option<Vec<Option<f64>>>,
    vwap: Option<Vec<Option<f64>>>,
}

/// Run the full CPU-bound pass. `on_stage` is told as each stage starts
/// (Resampling, Combining, ComputingIndicators), always in that order.
pub fn build_renderable_series(
    input: PipelineInput<'_>,
    mut on_stage: impl FnMut(PipelineState),
) -> RenderableSeries {
    let PipelineInput {
        history,
        selection,
        timeframe,
        settings,
        generation,
    } = input;

    on_stage(PipelineState::Resampling);
    let (ce, pe) = rayon::join(
        || resample(&history.ce_candles, timeframe),
        || resample(&history.pe_candles, timeframe),
    );

    on_stage(PipelineState::Combining);
    let straddle = combine(&ce, &pe);

    on_stage(PipelineState::ComputingIndicators);
    let closes: Vec<f64> = straddle.iter().map(|c| c.close).collect();
    let outputs = compute_indicators(&closes, &straddle, &settings);

    let timestamps_ms: Vec<i64> = straddle.iter().map(|c| c.timestamp_ms).collect();
    let labels: Vec<String> = straddle.iter().map(|c| c.label()).collect();

    let names = &CHART.names;
    let mut series = vec![NamedSeries::from_values(names.straddle, closes.iter().copied())];

    let visibility = settings.series_visibility;
    if visibility.show_ce {
        series.push(NamedSeries::new(
            history.ce_symbol.clone(),
            closes_on_axis(&ce, &timestamps_ms),
        ));
    }
    if visibility.show_pe {
        series.push(NamedSeries::new(
            history.pe_symbol.clone(),
            closes_on_axis(&pe, &timestamps_ms),
        ));
    }

    if let Some(bands) = outputs.bollinger {
        series.push(NamedSeries::new(names.bb_upper, bands.upper));
        series.push(NamedSeries::new(names.bb_middle, bands.middle));
        series.push(NamedSeries::new(names.bb_lower, bands.lower));
    }
    if let Some(ma) = outputs.moving_average {
        series.push(NamedSeries::new(settings.moving_average_name(), ma));
    }
    if let Some(vwap) = outputs.vwap {
        series.push(NamedSeries::new(names.vwap, vwap));
    }
    if let Some(rsi) = outputs.rsi {
        series.push(NamedSeries::new(names.rsi, rsi));
    }

    RenderableSeries {
        selection: selection.clone(),
        timeframe,
        generation,
        ce_symbol: history.ce_symbol.clone(),
        pe_symbol: history.pe_symbol.clone(),
        timestamps_ms,
        labels,
        series,
    }
}

/// The four indicators share nothing but the input, so they run side by side.
fn compute_indicators(
    closes: &[f64],
    straddle: &[Candle],
    settings: &IndicatorSettings,
) -> IndicatorOutputs {
    let ((bollinger, moving_average), (rsi, vwap)) = rayon::join(
        || {
            rayon::join(
                || {
                    settings.bollinger.enabled.then(|| {
                        indicators::bollinger(
                            closes,
                            settings.bollinger.period,
                            settings.bollinger.std_dev_multiplier,
                        )
                    })
                },
                || {
                    settings.moving_average.enabled.then(|| {
                        indicators::moving_average(
                            closes,
                            settings.moving_average.period,
                            settings.moving_average.kind,
                        )
                    })
                },
            )
        },
        || {
            rayon::join(
                || {
                    settings
                        .rsi
                        .enabled
                        .then(|| indicators::rsi(closes, settings.rsi.period))
                },
                || settings.vwap.enabled.then(|| indicators::vwap(straddle)),
            )
        },
    );

    IndicatorOutputs {
        bollinger,
        moving_average,
        rsi,
        vwap,
    }
}

/// Leg closes re-indexed onto the straddle axis. Every axis point has both legs by construction.
fn closes_on_axis(leg: &[Candle], axis: &[i64]) -> Vec<Option<f64>> {
    let by_ts: HashMap<i64, f64> = leg.iter().map(|c| (c.timestamp_ms, c.close)).collect();
    axis.iter().map(|ts| by_ts.get(ts).copied()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovingAverageKind;
    use crate::utils::TimeUtils;
    use crate::utils::time_utils::parse_candle_timestamp;

    fn selection() -> StraddleSelection {
        StraddleSelection::new("NIFTY", 23400.0).unwrap()
    }

    fn history(minutes: usize) -> StraddleHistory {
        let start = parse_candle_timestamp("2024-11-04 09:15").unwrap();
        let leg = |base: f64, vol: f64| -> Vec<Candle> {
            (0..minutes)
                .map(|i| {
                    let p = base + (i as f64 * 0.3).sin() * 3.0;
                    Candle::new(
                        start + i as i64 * TimeUtils::MS_IN_MIN,
                        p,
                        p + 1.0,
                        p - 1.0,
                        p + 0.5,
                        vol,
                    )
                })
                .collect()
        };
        StraddleHistory {
            ce_symbol: "NSE:NIFTY24N0723400CE".to_string(),
            pe_symbol: "NSE:NIFTY24N0723400PE".to_string(),
            ce_candles: leg(100.0, 1000.0),
            pe_candles: leg(50.0, 500.0),
        }
    }

    #[test]
    fn test_end_to_end_single_candle() {
        let ts = parse_candle_timestamp("2024-11-04 09:15").unwrap();
        let history = StraddleHistory {
            ce_symbol: "CE".to_string(),
            pe_symbol: "PE".to_string(),
            ce_candles: vec![Candle::new(ts, 100.0, 105.0, 99.0, 102.0, 1000.0)],
            pe_candles: vec![Candle::new(ts, 50.0, 52.0, 48.0, 51.0, 500.0)],
        };
        let sel = selection();
        let out = build_renderable_series(
            PipelineInput {
                history: &history,
                selection: &sel,
                timeframe: Timeframe::ONE_MINUTE,
                settings: IndicatorSettings::default(),
                generation: 1,
            },
            |_| {},
        );
        assert_eq!(out.labels, vec!["2024-11-04 09:15"]);
        assert_eq!(out.last_value("Straddle"), Some(153.0));
        // (157 + 147 + 153) / 3 with a single candle
        let vwap = out.last_value("VWAP").unwrap();
        assert!((vwap - (157.0 + 147.0 + 153.0) / 3.0).abs() < 1e-9);
        // Warm-up everywhere else
        assert_eq!(out.last_value("SMA (20)"), None);
        assert_eq!(out.last_value("RSI"), None);
        assert!(out.is_aligned());
    }

    #[test]
    fn test_series_order_and_names() {
        let h = history(120);
        let sel = selection();
        let mut settings = IndicatorSettings::default();
        settings.series_visibility.show_ce = true;
        settings.series_visibility.show_pe = true;
        settings.moving_average.kind = MovingAverageKind::Exponential;
        settings.moving_average.period = 9;

        let out = build_renderable_series(
            PipelineInput {
                history: &h,
                selection: &sel,
                timeframe: Timeframe::new(5).unwrap(),
                settings,
                generation: 7,
            },
            |_| {},
        );
        assert_eq!(
            out.names(),
            vec![
                "Straddle",
                "NSE:NIFTY24N0723400CE",
                "NSE:NIFTY24N0723400PE",
                "BB Upper",
                "BB Middle",
                "BB Lower",
                "EMA (9)",
                "VWAP",
                "RSI",
            ]
        );
        assert_eq!(out.len(), 24);
        assert_eq!(out.generation, 7);
        assert!(out.is_aligned());

        // Legs line up with the straddle on every point
        for i in 0..out.len() {
            let ce = out.get("NSE:NIFTY24N0723400CE").unwrap().values[i].unwrap();
            let pe = out.get("NSE:NIFTY24N0723400PE").unwrap().values[i].unwrap();
            let straddle = out.get("Straddle").unwrap().values[i].unwrap();
            assert!((ce + pe - straddle).abs() < 1e-9);
        }
    }

    #[test]
    fn test_disabled_indicators_are_absent() {
        let h = history(30);
        let sel = selection();
        let mut settings = IndicatorSettings::default();
        settings.bollinger.enabled = false;
        settings.moving_average.enabled = false;
        settings.rsi.enabled = false;
        settings.vwap.enabled = false;

        let out = build_renderable_series(
            PipelineInput {
                history: &h,
                selection: &sel,
                timeframe: Timeframe::ONE_MINUTE,
                settings,
                generation: 1,
            },
            |_| {},
        );
        assert_eq!(out.names(), vec!["Straddle"]);
    }

    #[test]
    fn test_stages_reported_in_order() {
        let h = history(10);
        let sel = selection();
        let mut stages = Vec::new();
        build_renderable_series(
            PipelineInput {
                history: &h,
                selection: &sel,
                timeframe: Timeframe::new(3).unwrap(),
                settings: IndicatorSettings::default(),
                generation: 1,
            },
            |stage| stages.push(stage),
        );
        assert_eq!(
            stages,
            vec![
                PipelineState::Resampling,
                PipelineState::Combining,
                PipelineState::ComputingIndicators,
            ]
        );
    }

    #[test]
    fn test_empty_history_renders_empty_axis() {
        let h = StraddleHistory::default();
        let sel = selection();
        let out = build_renderable_series(
            PipelineInput {
                history: &h,
                selection: &sel,
                timeframe: Timeframe::new(15).unwrap(),
                settings: IndicatorSettings::default(),
                generation: 1,
            },
            |_| {},
        );
        assert!(out.is_empty());
        assert!(out.is_aligned());
        assert_eq!(out.last_value("Straddle"), None);
    }

    /// Candles at the given minute offsets from `start`, close = `close + offset`.
    fn leg_at(start: &str, offsets: impl IntoIterator<Item = i64>, close: f64) -> Vec<Candle> {
        let start = parse_candle_timestamp(start).unwrap();
        offsets
            .into_iter()
            .map(|m| {
                let c = close + m as f64;
                Candle::new(start + m * TimeUtils::MS_IN_MIN, c, c + 1.0, c - 1.0, c, 10.0)
            })
            .collect()
    }

    fn run(history: &StraddleHistory, minutes: u32) -> RenderableSeries {
        let mut settings = IndicatorSettings::default();
        settings.series_visibility.show_ce = true;
        settings.series_visibility.show_pe = true;
        build_renderable_series(
            PipelineInput {
                history,
                selection: &selection(),
                timeframe: Timeframe::new(minutes).unwrap(),
                settings,
                generation: 1,
            },
            |_| {},
        )
    }

    fn assert_legs_sum_to_straddle(out: &RenderableSeries) {
        for i in 0..out.len() {
            let ce = out.get("CE").unwrap().values[i].unwrap();
            let pe = out.get("PE").unwrap().values[i].unwrap();
            let straddle = out.get("Straddle").unwrap().values[i].unwrap();
            assert!((ce + pe - straddle).abs() < 1e-9, "point {} misaligned", i);
        }
    }

    #[test]
    fn test_sparse_leg_lines_up_with_dense_leg() {
        // Illiquid CE trades exactly 5 minutes apart but off the 5m grid; PE trades every minute
        let history = StraddleHistory {
            ce_symbol: "CE".to_string(),
            pe_symbol: "PE".to_string(),
            ce_candles: leg_at("2024-11-04 09:16", [0, 5, 10], 100.0),
            pe_candles: leg_at("2024-11-04 09:15", 0..15, 50.0),
        };
        let out = run(&history, 5);

        assert_eq!(
            out.labels,
            vec!["2024-11-04 09:15", "2024-11-04 09:20", "2024-11-04 09:25"]
        );
        // Bucket close is the last close inside the bucket on each leg
        assert_eq!(out.get("CE").unwrap().values[0], Some(100.0));
        assert_eq!(out.get("PE").unwrap().values[0], Some(54.0));
        assert_eq!(out.last_value("Straddle"), Some(110.0 + 64.0));
        assert_legs_sum_to_straddle(&out);
        assert!(out.is_aligned());
    }

    #[test]
    fn test_gap_and_out_of_phase_starts() {
        // CE starts two minutes late and goes quiet 09:41-09:59; PE trades throughout
        let mut ce = leg_at("2024-11-04 09:17", 0..24, 100.0);
        ce.extend(leg_at("2024-11-04 10:00", 0..10, 200.0));
        let history = StraddleHistory {
            ce_symbol: "CE".to_string(),
            pe_symbol: "PE".to_string(),
            ce_candles: ce,
            pe_candles: leg_at("2024-11-04 09:15", 0..55, 50.0),
        };
        let out = run(&history, 15);

        // 09:45 has no CE candle, so the inner join leaves it out
        assert_eq!(
            out.labels,
            vec!["2024-11-04 09:15", "2024-11-04 09:30", "2024-11-04 10:00"]
        );
        assert_legs_sum_to_straddle(&out);
        assert!(out.is_aligned());
        assert!(out.get("VWAP").unwrap().values.iter().all(|v| v.is_some()));
    }
}
