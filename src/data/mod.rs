// Data sources: backend REST, local cache, live price stream
pub mod cache_file;
pub mod http_source;
pub mod price_stream;
pub mod source;
pub mod startup;

// Re-export commonly used types
pub use cache_file::{CacheFile, CacheFileSource, WriteThroughCache};
pub use http_source::{HttpStraddleSource, HttpSubscriptionSink, IndexStrikes};
pub use price_stream::PriceStreamManager;
pub use source::{FallbackSource, HistoricalDataSource, SubscriptionSink};
