use async_trait::async_trait;

use crate::domain::StraddleSelection;
use crate::errors::FetchError;
use crate::models::StraddleHistory;

/// Anything that can produce the raw CE/PE candles for one selection.
#[async_trait]
pub trait HistoricalDataSource: Send + Sync {
    async fn fetch_historical_straddle(
        &self,
        selection: &StraddleSelection,
    ) -> Result<StraddleHistory, FetchError>;

    /// A unique identifier for this implementation (so that afterwards we know which one we used).
    fn signature(&self) -> &'static str;
}

/// Live-feed subscription endpoint. Subscribing is idempotent server side but the engine
/// still de-duplicates before calling.
#[async_trait]
pub trait SubscriptionSink: Send + Sync {
    async fn subscribe(&self, symbols: &[String]) -> Result<(), FetchError>;
}

/// Try each source in order; the first success wins.
pub struct FallbackSource {
    sources: Vec<Box<dyn HistoricalDataSource>>,
}

impl FallbackSource {
    pub fn new(sources: Vec<Box<dyn HistoricalDataSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl HistoricalDataSource for FallbackSource {
    async fn fetch_historical_straddle(
        &self,
        selection: &StraddleSelection,
    ) -> Result<StraddleHistory, FetchError> {
        let mut last_error = None;
        for source in &self.sources {
            match source.fetch_historical_straddle(selection).await {
                Ok(history) => {
                    log::info!("Loaded {} via {}", selection, source.signature());
                    return Ok(history);
                }
                Err(e) => {
                    log::info!("Source '{}' failed for {}: {}", source.signature(), selection, e);
                    // Continue to the next implementation
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| FetchError::NotFound {
            index: selection.index.clone(),
            strike: selection.strike_label(),
        }))
    }

    fn signature(&self) -> &'static str {
        "Fallback"
    }
}
