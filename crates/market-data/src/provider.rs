//! Provider trait and an in-memory implementation

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::MarketDataError;
use crate::types::{parse_date, OptionQuote, OptionSide, PricePoint, RawOptionQuote, TickerQuote};
use crate::Result;

/// Upstream market data source - protocol agnostic
///
/// Every call is a fresh upstream round trip. Implementations must not
/// cache between calls; per-request memoization belongs to the caller.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Spot price and fundamentals
    async fn ticker_quote(&self, ticker: &str) -> Result<TickerQuote>;

    /// Listed expiration dates (`YYYY-MM-DD`), in upstream order
    async fn expirations(&self, ticker: &str) -> Result<Vec<String>>;

    /// Sanitized chain for one expiration and side
    async fn option_chain(
        &self,
        ticker: &str,
        date: &str,
        side: OptionSide,
    ) -> Result<Vec<OptionQuote>>;

    /// Daily closes between `start` and `end`, inclusive
    async fn daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>>;
}

// ==================== Static Implementation ====================

#[derive(Debug, Default, Clone)]
struct StaticTicker {
    quote: Option<TickerQuote>,
    expirations: Vec<String>,
    chains: HashMap<(String, OptionSide), Vec<RawOptionQuote>>,
    history: Vec<PricePoint>,
}

/// In-memory provider for tests and offline runs
///
/// Rows are stored raw and sanitized on every read, so it goes through the
/// same boundary as a network provider.
#[derive(Debug, Default)]
pub struct StaticProvider {
    tickers: HashMap<String, StaticTicker>,
    quote_calls: AtomicUsize,
    chain_calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, ticker: &str) -> &mut StaticTicker {
        self.tickers.entry(ticker.to_uppercase()).or_default()
    }

    fn get(&self, ticker: &str) -> Result<&StaticTicker> {
        self.tickers
            .get(&ticker.to_uppercase())
            .ok_or_else(|| MarketDataError::UnknownTicker(ticker.to_uppercase()))
    }

    pub fn with_quote(mut self, quote: TickerQuote) -> Self {
        let symbol = quote.symbol.clone();
        self.entry(&symbol).quote = Some(quote);
        self
    }

    pub fn with_expirations<I, S>(mut self, ticker: &str, dates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entry(ticker).expirations = dates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_chain(
        mut self,
        ticker: &str,
        date: &str,
        side: OptionSide,
        rows: Vec<RawOptionQuote>,
    ) -> Self {
        self.entry(ticker).chains.insert((date.to_string(), side), rows);
        self
    }

    pub fn with_history(mut self, ticker: &str, history: Vec<PricePoint>) -> Self {
        self.entry(ticker).history = history;
        self
    }

    /// Number of `ticker_quote` calls served so far
    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    /// Number of `option_chain` calls served so far
    pub fn chain_calls(&self) -> usize {
        self.chain_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn ticker_quote(&self, ticker: &str) -> Result<TickerQuote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.get(ticker)?
            .quote
            .clone()
            .ok_or_else(|| MarketDataError::UnknownTicker(ticker.to_uppercase()))
    }

    async fn expirations(&self, ticker: &str) -> Result<Vec<String>> {
        Ok(self.get(ticker)?.expirations.clone())
    }

    async fn option_chain(
        &self,
        ticker: &str,
        date: &str,
        side: OptionSide,
    ) -> Result<Vec<OptionQuote>> {
        self.chain_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self
            .get(ticker)?
            .chains
            .get(&(date.to_string(), side))
            .ok_or_else(|| MarketDataError::UnknownExpiration {
                ticker: ticker.to_uppercase(),
                date: date.to_string(),
            })?;

        Ok(rows.iter().cloned().filter_map(RawOptionQuote::sanitize).collect())
    }

    async fn daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let history = &self.get(ticker)?.history;
        let mut points = Vec::with_capacity(history.len());
        for point in history {
            let date = parse_date(&point.date)?;
            if date >= start && date <= end {
                points.push(point.clone());
            }
        }
        Ok(points)
    }
}
