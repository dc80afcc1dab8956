// Domain models for the straddle chart pipeline
// These modules contain plain data independent of fetching/visualization

pub mod history;
pub mod quote;
pub mod series;
pub mod settings;

// Re-export key types for convenience
pub use history::StraddleHistory;
pub use quote::LiveQuote;
pub use series::{NamedSeries, RenderableSeries};
pub use settings::{IndicatorSettings, MovingAverageKind};
