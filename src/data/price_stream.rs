use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use tokio::runtime::Handle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::config::BACKEND;
#[cfg(debug_assertions)]
use crate::config::debug::PRINT_PRICE_STREAM_UPDATES;
use crate::models::LiveQuote;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Connecting,
    Disconnected,
}

/// How a connection ended
enum StreamEnd {
    /// Server closed; reconnect
    Closed,
    /// The engine dropped its receiver; stop for good
    ReceiverGone,
}

/// Manages the backend market-data websocket with automatic reconnection.
/// Parsed quotes are forwarded into the engine's quote channel.
pub struct PriceStreamManager {
    url: String,
    connection_status: Arc<Mutex<ConnectionStatus>>,
}

impl PriceStreamManager {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection_status: Arc::new(Mutex::new(ConnectionStatus::Disconnected)),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection_status
            .lock()
            .map(|s| *s)
            .unwrap_or(ConnectionStatus::Disconnected)
    }

    /// Spawn the reconnecting stream on `runtime`.
    pub fn start(&self, runtime: &Handle, quote_tx: Sender<LiveQuote>) {
        log::info!(">>> PriceStream: connecting to {}", self.url);
        let url = self.url.clone();
        let status = self.connection_status.clone();
        runtime.spawn(run_price_stream_with_reconnect(url, quote_tx, status));
    }
}

fn set_status(status: &Mutex<ConnectionStatus>, value: ConnectionStatus) {
    if let Ok(mut guard) = status.lock() {
        *guard = value;
    }
}

/// Next reconnect delay: doubled, capped at the configured maximum.
fn next_delay(current_sec: u64) -> u64 {
    (current_sec * 2).min(BACKEND.ws.max_reconnect_delay_sec)
}

/// Backend pushes one JSON object per market update; anything without a symbol/ltp is ignored.
pub fn parse_market_update(text: &str) -> Option<LiveQuote> {
    serde_json::from_str::<LiveQuote>(text)
        .ok()
        .filter(|q| !q.symbol.is_empty())
}

/// Wrapper that handles reconnection logic with exponential backoff
async fn run_price_stream_with_reconnect(
    url: String,
    quote_tx: Sender<LiveQuote>,
    status: Arc<Mutex<ConnectionStatus>>,
) {
    let mut reconnect_delay = BACKEND.ws.initial_reconnect_delay_sec;

    loop {
        set_status(&status, ConnectionStatus::Connecting);

        match run_price_stream(&url, &quote_tx, &status).await {
            Ok(StreamEnd::ReceiverGone) => {
                log::info!("Quote receiver dropped; stopping price stream");
                set_status(&status, ConnectionStatus::Disconnected);
                return;
            }
            Ok(StreamEnd::Closed) => {
                #[cfg(debug_assertions)]
                if PRINT_PRICE_STREAM_UPDATES {
                    log::info!("Price stream closed by server, reconnecting...");
                }
                // Reset delay on successful connection that later closes
                reconnect_delay = BACKEND.ws.initial_reconnect_delay_sec;
                // Small delay before reconnecting even on normal close
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(e) => {
                log::error!("Price stream error: {}", e);
                set_status(&status, ConnectionStatus::Disconnected);

                #[cfg(debug_assertions)]
                if PRINT_PRICE_STREAM_UPDATES {
                    log::info!("Reconnecting price stream in {} seconds...", reconnect_delay);
                }
                tokio::time::sleep(Duration::from_secs(reconnect_delay)).await;
                reconnect_delay = next_delay(reconnect_delay);
            }
        }
    }
}

async fn run_price_stream(
    url: &str,
    quote_tx: &Sender<LiveQuote>,
    status: &Mutex<ConnectionStatus>,
) -> Result<StreamEnd, Box<dyn std::error::Error + Send + Sync>> {
    let (ws_stream, _) = connect_async(url).await?;
    set_status(status, ConnectionStatus::Connected);
    log::info!("✓ Connected to price stream {}", url);

    let (_write, mut read) = ws_stream.split();

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => match parse_market_update(&text) {
                Some(quote) => {
                    #[cfg(debug_assertions)]
                    if PRINT_PRICE_STREAM_UPDATES {
                        log::info!("[price-stream] {} -> {:.2}", quote.symbol, quote.ltp);
                    }
                    if quote_tx.send(quote).is_err() {
                        return Ok(StreamEnd::ReceiverGone);
                    }
                }
                None => {
                    log::warn!("⚠️ Unexpected price stream payload: {:.200}", text.as_str());
                }
            },
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // WebSocket keepalive - handled automatically
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                log::error!("WebSocket error: {}", e);
                return Err(e.into());
            }
            _ => {}
        }
    }

    set_status(status, ConnectionStatus::Disconnected);
    Ok(StreamEnd::Closed)
}
