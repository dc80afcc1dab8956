// Resampling, straddle construction and indicator algorithms
pub mod indicators;
pub mod pipeline;
pub mod resample;
pub mod straddle;

// Re-export commonly used items
pub use pipeline::{PipelineInput, build_renderable_series};
pub use resample::resample;
pub use straddle::combine;
