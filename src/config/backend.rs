//! Backend (historical REST + live websocket) configuration constants and types.

/// Configuration for the REST client used for historical candles and subscriptions
/// (This is the runtime struct used by the Http Client)
pub struct BackendApiConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for BackendApiConfig {
    fn default() -> Self {
        Self {
            base_url: BACKEND.rest.base_url.to_string(),
            timeout_ms: BACKEND.client.timeout_ms,
        }
    }
}

/// REST endpoint layout
pub struct RestEndpoints {
    /// Default base url of the backend (overridable on the command line)
    pub base_url: &'static str,
    /// `{base}/historical_straddle/{index}/{strike}`
    pub historical_straddle_path: &'static str,
    /// `{base}/index-strikes/{index}`
    pub index_strikes_path: &'static str,
    /// `{base}/subscribe` (POST)
    pub subscribe_path: &'static str,
}

/// Configuration for WebSocket Connections
pub struct WsConfig {
    /// WebSocket url pushing market updates
    pub url: &'static str,
    /// Maximum reconnection delay (seconds)
    pub max_reconnect_delay_sec: u64,
    /// Initial reconnection delay (seconds)
    pub initial_reconnect_delay_sec: u64,
}

/// Default values for the Rest Client
pub struct ClientDefaults {
    pub timeout_ms: u64,
}

/// The Master Configuration Struct
pub struct BackendConfig {
    pub rest: RestEndpoints,
    pub ws: WsConfig,
    pub client: ClientDefaults,
}

pub const BACKEND: BackendConfig = BackendConfig {
    rest: RestEndpoints {
        base_url: "http://localhost:8000",
        historical_straddle_path: "historical_straddle",
        index_strikes_path: "index-strikes",
        subscribe_path: "subscribe",
    },
    ws: WsConfig {
        url: "ws://localhost:8000/ws",
        max_reconnect_delay_sec: 300, // 5 minutes
        initial_reconnect_delay_sec: 1,
    },
    client: ClientDefaults {
        // Historical straddle pulls three symbols server side; give it room
        timeout_ms: 30_000,
    },
};
