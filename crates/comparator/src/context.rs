//! Per-request comparator context

use std::sync::Arc;

use chrono::NaiveDate;
use market_data::{MarketDataProvider, OptionQuote, OptionSide, PricePoint, TickerQuote};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::Result;

/// Options view over one ticker, scoped to a single request.
///
/// Built fresh per request and dropped with it. The current price is fetched
/// at most once per context; nothing else is remembered between calls.
pub struct OptionsComparator {
    provider: Arc<dyn MarketDataProvider>,
    ticker: String,
    current_price: OnceCell<Option<f64>>,
}

impl OptionsComparator {
    pub fn new(provider: Arc<dyn MarketDataProvider>, ticker: &str) -> Self {
        Self {
            provider,
            ticker: ticker.trim().to_uppercase(),
            current_price: OnceCell::new(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Spot quote with fundamentals. Errors propagate.
    pub async fn ticker_quote(&self) -> Result<TickerQuote> {
        Ok(self.provider.ticker_quote(&self.ticker).await?)
    }

    /// Current price, `None` when the quote cannot be fetched or has no price
    pub async fn current_price(&self) -> Option<f64> {
        *self
            .current_price
            .get_or_init(|| async {
                match self.provider.ticker_quote(&self.ticker).await {
                    Ok(quote) => quote.price(),
                    Err(e) => {
                        warn!(ticker = %self.ticker, error = %e, "Error fetching current price");
                        None
                    }
                }
            })
            .await
    }

    /// Listed expirations in upstream order
    pub async fn available_dates(&self) -> Result<Vec<String>> {
        Ok(self.provider.expirations(&self.ticker).await?)
    }

    /// Chain for one expiration. Fetch failures and empty chains are logged
    /// and reported as `None`.
    pub async fn option_chain(&self, date: &str, side: OptionSide) -> Option<Vec<OptionQuote>> {
        match self.provider.option_chain(&self.ticker, date, side).await {
            Ok(chain) if chain.is_empty() => {
                debug!(ticker = %self.ticker, date, %side, "Empty option chain");
                None
            }
            Ok(chain) => Some(chain),
            Err(e) => {
                warn!(ticker = %self.ticker, date, %side, error = %e, "Error fetching option chain");
                None
            }
        }
    }

    /// Daily closes between two dates, inclusive
    pub async fn history(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<PricePoint>> {
        Ok(self.provider.daily_closes(&self.ticker, start, end).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use market_data::{MarketDataError, RawOptionQuote, StaticProvider};

    use crate::ComparatorError;

    fn provider() -> Arc<StaticProvider> {
        Arc::new(
            StaticProvider::new()
                .with_quote(TickerQuote::new("MSFT", 300.0))
                .with_expirations("MSFT", ["2027-01-15"])
                .with_chain(
                    "MSFT",
                    "2027-01-15",
                    OptionSide::Calls,
                    vec![RawOptionQuote::at_strike(300.0)],
                )
                .with_chain("MSFT", "2027-01-15", OptionSide::Puts, vec![]),
        )
    }

    #[tokio::test]
    async fn test_current_price_is_memoized() {
        let provider = provider();
        let ctx = OptionsComparator::new(provider.clone(), " msft ");
        assert_eq!(ctx.ticker(), "MSFT");

        assert_eq!(ctx.current_price().await, Some(300.0));
        assert_eq!(ctx.current_price().await, Some(300.0));
        assert_eq!(provider.quote_calls(), 1);

        // A new context fetches again
        let other = OptionsComparator::new(provider.clone(), "MSFT");
        other.current_price().await;
        assert_eq!(provider.quote_calls(), 2);
    }

    #[tokio::test]
    async fn test_current_price_failure_is_none() {
        let ctx = OptionsComparator::new(provider(), "NOPE");
        assert_eq!(ctx.current_price().await, None);
        assert_matches!(
            ctx.ticker_quote().await,
            Err(ComparatorError::Upstream(MarketDataError::UnknownTicker(_)))
        );
    }

    #[tokio::test]
    async fn test_option_chain_failures_are_none() {
        let ctx = OptionsComparator::new(provider(), "MSFT");
        assert!(ctx.option_chain("2027-01-15", OptionSide::Calls).await.is_some());
        assert!(ctx.option_chain("2027-01-15", OptionSide::Puts).await.is_none());
        assert!(ctx.option_chain("2030-01-01", OptionSide::Calls).await.is_none());
    }
}
