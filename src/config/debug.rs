//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so release
//! builds remain quiet.

/// Emit each pipeline stage transition (Fetching, Resampling, ...) with its generation.
pub const PRINT_PIPELINE_STAGES: bool = false;

/// Emit verbose logging for live price stream connections and ticks.
pub const PRINT_PRICE_STREAM_UPDATES: bool = false;

/// Emit every live-quote merge into the displayed series.
pub const PRINT_LIVE_MERGES: bool = false;

/// Emit detailed serialization/deserialization logs.
pub const PRINT_SERDE: bool = false;
