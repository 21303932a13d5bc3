//! Market data error types

use thiserror::Error;

/// Errors that can occur while talking to the upstream data source
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-success status
    #[error("Upstream returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream payload could not be decoded or was missing fields
    #[error("Data error: {0}")]
    Data(String),

    /// Ticker has no quote data upstream
    #[error("No data found for ticker {0}")]
    UnknownTicker(String),

    /// Expiration is not listed for the ticker
    #[error("Expiration `{date}` cannot be found for {ticker}")]
    UnknownExpiration { ticker: String, date: String },

    /// Date string is not `YYYY-MM-DD`
    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl MarketDataError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MarketDataError::Data(err.to_string())
        } else {
            MarketDataError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(err: serde_json::Error) -> Self {
        MarketDataError::Data(err.to_string())
    }
}
