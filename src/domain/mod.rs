// Domain types and value objects
pub mod candle;
pub mod instrument;
pub mod timeframe;

// Re-export commonly used types
pub use candle::Candle;
pub use instrument::{OptionLeg, StraddleSelection};
pub use timeframe::Timeframe;
