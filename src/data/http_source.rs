use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::{BACKEND, BackendApiConfig};
#[cfg(debug_assertions)]
use crate::config::debug::PRINT_SERDE;
use crate::domain::{Candle, StraddleSelection};
use crate::errors::FetchError;
use crate::models::StraddleHistory;
use crate::utils::time_utils::parse_candle_timestamp;

use super::source::{HistoricalDataSource, SubscriptionSink};

/// `[date, open, high, low, close, volume]` as the backend sends it
type WireCandle = (String, f64, f64, f64, f64, f64);

#[derive(Debug, Deserialize)]
struct WireLeg {
    symbol: String,
    data: Vec<WireCandle>,
}

#[derive(Debug, Deserialize)]
struct HistoricalStraddleResponse {
    ce_data: WireLeg,
    pe_data: WireLeg,
}

/// Strike ladder for one index, used to pick a default (ATM) strike.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexStrikes {
    pub strikes: Vec<f64>,
    pub default_strike: f64,
    pub current_price: f64,
    #[serde(default)]
    pub index_symbol: String,
}

#[derive(Debug, Serialize)]
struct SubscribeRequest<'a> {
    symbols: &'a [String],
}

fn convert_leg(leg: WireLeg) -> (String, Vec<Candle>) {
    let total = leg.data.len();
    let candles: Vec<Candle> = leg
        .data
        .into_iter()
        .filter_map(|(date, open, high, low, close, volume)| {
            parse_candle_timestamp(&date).map(|ts| Candle::new(ts, open, high, low, close, volume))
        })
        .collect();

    if candles.len() != total {
        log::warn!(
            "{}: skipped {} rows with unparseable timestamps",
            leg.symbol,
            total - candles.len()
        );
    }
    (leg.symbol, candles)
}

fn parse_history(body: &str) -> Result<StraddleHistory, FetchError> {
    let response: HistoricalStraddleResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let (ce_symbol, ce_candles) = convert_leg(response.ce_data);
    let (pe_symbol, pe_candles) = convert_leg(response.pe_data);
    Ok(StraddleHistory {
        ce_symbol,
        pe_symbol,
        ce_candles,
        pe_candles,
    })
}

/// REST client for the straddle backend.
pub struct HttpStraddleSource {
    client: Client,
    base_url: String,
}

impl HttpStraddleSource {
    pub fn new(config: BackendApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, parts: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for part in parts {
            url.push('/');
            url.push_str(part);
        }
        url
    }

    async fn get_text(&self, url: &str, selection: Option<&StraddleSelection>) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            if let Some(sel) = selection {
                return Err(FetchError::NotFound {
                    index: sel.index.clone(),
                    strike: sel.strike_label(),
                });
            }
        }
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                detail: body,
            });
        }
        Ok(body)
    }

    pub async fn fetch_index_strikes(&self, index: &str) -> Result<IndexStrikes, FetchError> {
        let url = self.url(&[BACKEND.rest.index_strikes_path, index]);
        let body = self.get_text(&url, None).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[async_trait]
impl HistoricalDataSource for HttpStraddleSource {
    async fn fetch_historical_straddle(
        &self,
        selection: &StraddleSelection,
    ) -> Result<StraddleHistory, FetchError> {
        let url = self.url(&[
            BACKEND.rest.historical_straddle_path,
            &selection.index,
            &selection.strike_label(),
        ]);
        log::info!("Fetching {} from {}", selection, url);

        let body = self.get_text(&url, Some(selection)).await?;
        let history = parse_history(&body)?;

        #[cfg(debug_assertions)]
        if PRINT_SERDE {
            log::info!(
                "Decoded {} CE / {} PE candles for {}",
                history.ce_candles.len(),
                history.pe_candles.len(),
                selection
            );
        }
        Ok(history)
    }

    fn signature(&self) -> &'static str {
        "Backend REST"
    }
}

/// `POST {base}/subscribe`
pub struct HttpSubscriptionSink {
    client: Client,
    url: String,
}

impl HttpSubscriptionSink {
    pub fn new(config: BackendApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            url: format!(
                "{}/{}",
                config.base_url.trim_end_matches('/'),
                BACKEND.rest.subscribe_path
            ),
        })
    }
}

#[async_trait]
impl SubscriptionSink for HttpSubscriptionSink {
    async fn subscribe(&self, symbols: &[String]) -> Result<(), FetchError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SubscribeRequest { symbols })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                detail,
            });
        }
        log::info!("Subscribed to {:?}", symbols);
        Ok(())
    }
}
