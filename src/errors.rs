//! Typed errors shared across the crate.
//! Application boundaries (binaries, provider fallback) wrap these in `anyhow`.

use thiserror::Error;

/// Historical data could not be obtained. Terminal for the pipeline run that asked for it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("backend request failed: {0}")]
    Network(String),

    #[error("backend returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("could not decode backend payload: {0}")]
    Decode(String),

    #[error("no data for {index} @ {strike}")]
    NotFound { index: String, strike: String },

    #[error("local cache unusable: {0}")]
    Cache(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status {
                status: status.as_u16(),
                detail: e.to_string(),
            }
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// A selection or indicator configuration the pipeline refuses to run with.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown index '{0}'")]
    UnknownIndex(String),

    #[error("invalid strike {0}")]
    InvalidStrike(f64),

    #[error("timeframe must be at least 1 minute")]
    ZeroTimeframe,

    #[error("{indicator} period must be at least 1")]
    ZeroPeriod { indicator: &'static str },

    #[error("bollinger std dev multiplier must be > 0 (got {0})")]
    InvalidStdDevMultiplier(f64),
}
