use std::sync::Arc;

use crate::domain::{StraddleSelection, Timeframe};
use crate::errors::FetchError;
use crate::models::{IndicatorSettings, RenderableSeries, StraddleHistory};

use super::state::PipelineState;

/// A request to run resample → combine → indicators for one generation
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub generation: u64,
    pub selection: StraddleSelection,
    // Shared, immutable raw candles of the current selection
    pub history: Arc<StraddleHistory>,
    pub timeframe: Timeframe,
    pub settings: IndicatorSettings,
}

/// The result returned by the worker
#[derive(Debug, Clone)]
pub struct JobResult {
    pub generation: u64,
    pub duration_ms: u128,
    pub series: Arc<RenderableSeries>,
}

/// Everything the worker reports back
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Stage {
        generation: u64,
        stage: PipelineState,
    },
    Finished(JobResult),
}

/// Outcome of one historical fetch
#[derive(Debug)]
pub struct FetchResult {
    pub generation: u64,
    pub selection: StraddleSelection,
    pub result: Result<StraddleHistory, FetchError>,
}

/// Outcome of one subscription request
#[derive(Debug)]
pub struct SubscriptionResult {
    pub symbols: Vec<String>,
    pub result: Result<(), FetchError>,
}
