pub mod core;
pub mod live;
pub mod messages;
pub mod state;
pub mod subscriptions;
pub mod worker;

// Re-export key components
pub use core::ChartEngine;
pub use live::LiveMergeEngine;
pub use state::{ChartState, PipelineState};
pub use subscriptions::SubscribedSymbolSet;
