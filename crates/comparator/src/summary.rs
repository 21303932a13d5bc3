//! Stock price summary

use market_data::{or_zero, TickerQuote};
use serde::Serialize;

use crate::{ComparatorError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub ticker: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub previous_close: f64,
    pub market_cap: f64,
    pub dividend_yield: f64,
    pub dividend_rate: f64,
    pub pe_ratio: f64,
    #[serde(rename = "forwardPE")]
    pub forward_pe: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
    pub volume: f64,
    pub avg_volume: f64,
    pub beta: f64,
    pub name: String,
}

impl PriceSummary {
    /// Build the summary; a quote with no usable price is an error
    pub fn from_quote(ticker: &str, quote: &TickerQuote) -> Result<Self> {
        let ticker = ticker.trim().to_uppercase();
        let price = quote
            .price()
            .ok_or_else(|| ComparatorError::Unavailable("Could not fetch price".to_string()))?;

        let previous_close = or_zero(Some(quote.previous_close));
        let (change, change_percent) = if previous_close != 0.0 {
            let change = price - previous_close;
            (change, change / previous_close * 100.0)
        } else {
            (0.0, 0.0)
        };

        Ok(Self {
            price,
            change: or_zero(Some(change)),
            change_percent: or_zero(Some(change_percent)),
            previous_close,
            market_cap: or_zero(Some(quote.market_cap)),
            dividend_yield: or_zero(Some(quote.dividend_yield)),
            dividend_rate: or_zero(Some(quote.dividend_rate)),
            pe_ratio: or_zero(Some(quote.trailing_pe)),
            forward_pe: or_zero(Some(quote.forward_pe)),
            fifty_two_week_high: or_zero(Some(quote.fifty_two_week_high)),
            fifty_two_week_low: or_zero(Some(quote.fifty_two_week_low)),
            volume: or_zero(Some(quote.volume)),
            avg_volume: or_zero(Some(quote.average_volume)),
            beta: or_zero(Some(quote.beta)),
            name: quote
                .short_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| ticker.clone()),
            ticker,
        })
    }
}
