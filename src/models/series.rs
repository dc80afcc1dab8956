use serde::{Deserialize, Serialize};

use crate::domain::{StraddleSelection, Timeframe};

/// One named line on the chart, aligned index-for-index with the shared timestamp axis.
/// `None` marks warm-up positions where the indicator is undefined.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NamedSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl NamedSeries {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn from_values(name: impl Into<String>, values: impl IntoIterator<Item = f64>) -> Self {
        Self::new(name, values.into_iter().map(Some).collect())
    }

    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Everything the render collaborator needs for one update cycle.
/// Produced fresh by each pipeline run and swapped in as a whole; readers never see a partial set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RenderableSeries {
    pub selection: StraddleSelection,
    pub timeframe: Timeframe,
    /// Pipeline generation that produced this set
    pub generation: u64,
    pub ce_symbol: String,
    pub pe_symbol: String,
    pub timestamps_ms: Vec<i64>,
    /// `YYYY-MM-DD HH:MM` labels, one per axis point
    pub labels: Vec<String>,
    /// Ordered: Straddle, CE, PE, Bollinger, MA, VWAP, RSI (the optional ones only when enabled)
    pub series: Vec<NamedSeries>,
}

impl RenderableSeries {
    pub fn len(&self) -> usize {
        self.timestamps_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps_ms.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&NamedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut NamedSeries> {
        self.series.iter_mut().find(|s| s.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn last_value(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|s| s.last())
    }

    /// One-line status: last label followed by the last value of every series.
    pub fn summary(&self) -> String {
        let Some(label) = self.labels.last() else {
            return format!("{} {}: no data", self.selection, self.timeframe);
        };
        let values = self
            .series
            .iter()
            .map(|s| match s.last() {
                Some(v) => format!("{}={:.2}", s.name, v),
                None => format!("{}=-", s.name),
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} {} @ {}: {}", self.selection, self.timeframe, label, values)
    }

    /// Every series has exactly one value per axis point.
    pub fn is_aligned(&self) -> bool {
        self.labels.len() == self.timestamps_ms.len()
            && self.series.iter().all(|s| s.len() == self.timestamps_ms.len())
    }
}
