use std::sync::Arc;

use strum_macros::Display;

use crate::models::RenderableSeries;

/// Where the chart pipeline currently is.
/// `Error` is only entered from `Fetching`; everything after the fetch is infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PipelineState {
    Idle,
    Fetching,
    Resampling,
    Combining,
    ComputingIndicators,
    Ready,
    Error,
}

impl PipelineState {
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            PipelineState::Fetching
                | PipelineState::Resampling
                | PipelineState::Combining
                | PipelineState::ComputingIndicators
        )
    }
}

/// Represents the state of the chart for the current selection.
#[derive(Debug, Clone)]
pub struct ChartState {
    /// THE FRONT BUFFER.
    /// The renderer reads this. It is never written in place by a pipeline run:
    /// a finished run replaces the Arc, and live merges copy-on-write.
    pub displayed: Option<Arc<RenderableSeries>>,

    pub pipeline: PipelineState,

    /// Bumped by every trigger. Results carrying an older value are stale.
    pub generation: u64,

    /// Last error (if any) for status display
    pub last_error: Option<String>,
}

impl ChartState {
    pub fn new() -> Self {
        Self {
            displayed: None,
            pipeline: PipelineState::Idle,
            generation: 0,
            last_error: None,
        }
    }

    /// Start a new run; returns its generation.
    pub fn begin_run(&mut self, from: PipelineState) -> u64 {
        self.generation += 1;
        self.pipeline = from;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// The "Swap" operation.
    /// Promotes a finished run's series set to the front buffer in one assignment.
    pub fn update_buffer(&mut self, series: Arc<RenderableSeries>) {
        self.displayed = Some(series);
        self.pipeline = PipelineState::Ready;
        self.last_error = None;
    }

    /// A failed run leaves whatever was displayed before.
    pub fn mark_error(&mut self, message: String) {
        self.pipeline = PipelineState::Error;
        self.last_error = Some(message);
    }
}

impl Default for ChartState {
    fn default() -> Self {
        Self::new()
    }
}
