use std::collections::HashMap;
use std::sync::Arc;

#[cfg(debug_assertions)]
use crate::config::debug::PRINT_LIVE_MERGES;
use crate::models::{LiveQuote, RenderableSeries};

/// Folds streaming quotes into the displayed series set.
///
/// Only the last point of the series whose name equals the quote's symbol is touched.
/// Straddle and indicator series are left as the last pipeline run produced them.
#[derive(Debug, Default)]
pub struct LiveMergeEngine {
    latest: HashMap<String, LiveQuote>,
}

impl LiveMergeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the quote and merge it into `displayed` if a matching series exists.
    /// Returns true if the displayed set changed.
    pub fn apply(&mut self, displayed: &mut Option<Arc<RenderableSeries>>, quote: LiveQuote) -> bool {
        if !quote.is_usable() {
            log::debug!("Ignoring unusable quote for '{}'", quote.symbol);
            return false;
        }

        let changed = match displayed {
            Some(series) if Self::has_target(series, &quote.symbol) => {
                // Copy-on-write: a renderer holding the previous Arc keeps its snapshot
                Self::merge(Arc::make_mut(series), &quote)
            }
            _ => false,
        };

        #[cfg(debug_assertions)]
        if changed && PRINT_LIVE_MERGES {
            log::info!("Live merge {} -> {:.2}", quote.symbol, quote.ltp);
        }

        self.latest.insert(quote.symbol.clone(), quote);
        changed
    }

    /// Overwrite the last value of the series named `quote.symbol`.
    pub fn merge(series: &mut RenderableSeries, quote: &LiveQuote) -> bool {
        match series.get_mut(&quote.symbol) {
            Some(target) => match target.values.last_mut() {
                Some(last) => {
                    *last = Some(quote.ltp);
                    true
                }
                None => false,
            },
            None => false,
        }
    }

    fn has_target(series: &RenderableSeries, symbol: &str) -> bool {
        series.get(symbol).is_some_and(|s| !s.is_empty())
    }

    pub fn latest_price(&self, symbol: &str) -> Option<f64> {
        self.latest.get(symbol).map(|q| q.ltp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{StraddleSelection, Timeframe};
    use crate::models::NamedSeries;

    fn displayed() -> RenderableSeries {
        RenderableSeries {
            selection: StraddleSelection::new("NIFTY", 23400.0).unwrap(),
            timeframe: Timeframe::default(),
            generation: 1,
            ce_symbol: "CE1".to_string(),
            pe_symbol: "PE1".to_string(),
            timestamps_ms: vec![0, 60_000],
            labels: vec!["a".to_string(), "b".to_string()],
            series: vec![
                NamedSeries::from_values("Straddle", [200.0, 210.0]),
                NamedSeries::from_values("CE1", [100.0, 110.0]),
                NamedSeries::from_values("PE1", [100.0, 100.0]),
                NamedSeries::new("SMA (2)", vec![None, Some(205.0)]),
            ],
        }
    }

    #[test]
    fn test_merge_replaces_only_last_point_of_matching_series() {
        let mut live = LiveMergeEngine::new();
        let mut current = Some(Arc::new(displayed()));
        let snapshot = current.clone();

        assert!(live.apply(&mut current, LiveQuote::new("CE1", 123.0)));

        let merged = current.unwrap();
        assert_eq!(merged.get("CE1").unwrap().values, vec![Some(100.0), Some(123.0)]);
        // Everything else is frozen
        assert_eq!(merged.get("Straddle").unwrap().values, vec![Some(200.0), Some(210.0)]);
        assert_eq!(merged.get("SMA (2)").unwrap().values, vec![None, Some(205.0)]);
        assert_eq!(merged.len(), 2);

        // The previous snapshot was not mutated in place
        assert_eq!(snapshot.unwrap().last_value("CE1"), Some(110.0));
        assert_eq!(live.latest_price("CE1"), Some(123.0));
    }

    #[test]
    fn test_quote_for_undisplayed_symbol_is_recorded_only() {
        let mut live = LiveMergeEngine::new();
        let mut current = Some(Arc::new(displayed()));

        assert!(!live.apply(&mut current, LiveQuote::new("OTHER", 50.0)));
        assert_eq!(live.latest_price("OTHER"), Some(50.0));
        assert_eq!(current.unwrap().as_ref(), &displayed());
    }

    #[test]
    fn test_no_merge_without_display_or_into_empty_series() {
        let mut live = LiveMergeEngine::new();
        let mut nothing = None;
        assert!(!live.apply(&mut nothing, LiveQuote::new("CE1", 1.0)));
        assert!(nothing.is_none());

        let mut empty = displayed();
        empty.get_mut("CE1").unwrap().values.clear();
        let mut current = Some(Arc::new(empty));
        assert!(!live.apply(&mut current, LiveQuote::new("CE1", 1.0)));
    }

    #[test]
    fn test_unusable_quote_is_ignored() {
        let mut live = LiveMergeEngine::new();
        let mut current = Some(Arc::new(displayed()));
        assert!(!live.apply(&mut current, LiveQuote::new("CE1", f64::NAN)));
        assert_eq!(live.latest_price("CE1"), None);
    }
}
