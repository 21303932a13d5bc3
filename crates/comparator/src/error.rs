//! Comparator error types

use market_data::MarketDataError;
use thiserror::Error;

/// Errors surfaced by comparisons and the chain/contract views
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComparatorError {
    /// Request is missing fields or carries unusable values
    #[error("{0}")]
    InvalidRequest(String),

    /// Requested item is not listed upstream
    #[error("{0}")]
    NotFound(String),

    /// Data needed for the answer could not be fetched
    #[error("{0}")]
    Unavailable(String),

    /// Upstream failure, message surfaced as-is
    #[error(transparent)]
    Upstream(#[from] MarketDataError),
}

impl ComparatorError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// True when the caller's input caused the error
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidRequest(_) | Self::NotFound(_) | Self::Unavailable(_) => true,
            Self::Upstream(e) => matches!(
                e,
                MarketDataError::InvalidDate(_)
                    | MarketDataError::UnknownTicker(_)
                    | MarketDataError::UnknownExpiration { .. }
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(ComparatorError::invalid("Missing required fields").is_client_error());
        assert!(ComparatorError::Unavailable("Could not fetch price".into()).is_client_error());
        assert!(ComparatorError::from(MarketDataError::UnknownTicker("ZZZZ".into())).is_client_error());
        assert!(!ComparatorError::from(MarketDataError::network("reset")).is_client_error());
    }

    #[test]
    fn test_upstream_message_is_transparent() {
        let err = ComparatorError::from(MarketDataError::Data("bad payload".into()));
        assert_eq!(err.to_string(), MarketDataError::Data("bad payload".into()).to_string());
    }
}
