//! Configuration module for the straddle charting application.

pub mod backend;
pub mod chart;
pub mod debug;
pub mod indices;
pub mod persistence;

// Re-export commonly used items
pub use backend::{BACKEND, BackendApiConfig};
pub use chart::CHART;
pub use indices::{INDICES, IndexInfo};
pub use persistence::{PERSISTENCE, straddle_cache_filename};
