//! Full option chain around the current price

use market_data::{OptionQuote, OptionSide, StrikeKey};
use serde::Serialize;
use tracing::{debug, info};

use crate::context::OptionsComparator;
use crate::{ComparatorError, Result};

/// Default fractional band around the current price
pub const DEFAULT_CHAIN_BAND: f64 = 0.30;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStrike {
    pub strike: f64,
    pub last_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub mid: f64,
    pub change: f64,
    pub percent_change: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub implied_volatility: f64,
}

impl From<&OptionQuote> for ChainStrike {
    fn from(q: &OptionQuote) -> Self {
        Self {
            strike: q.strike,
            last_price: q.last_price,
            bid: q.bid,
            ask: q.ask,
            mid: q.mid(),
            change: q.change,
            percent_change: q.percent_change,
            volume: q.volume,
            open_interest: q.open_interest,
            implied_volatility: q.implied_volatility,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainDate {
    pub date: String,
    pub strikes: Vec<ChainStrike>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullChain {
    pub ticker: String,
    pub current_price: f64,
    pub option_type: OptionSide,
    pub chain: Vec<ChainDate>,
}

/// Inclusive strike bounds `price * (1 -/+ band)` in cents
pub fn strike_band(price: f64, band: f64) -> (StrikeKey, StrikeKey) {
    (
        StrikeKey::from_price(price * (1.0 - band)),
        StrikeKey::from_price(price * (1.0 + band)),
    )
}

/// Quotes inside `[low, high]`, sorted by strike
pub fn within_band(chain: &[OptionQuote], low: StrikeKey, high: StrikeKey) -> Vec<ChainStrike> {
    let mut kept: Vec<&OptionQuote> = chain
        .iter()
        .filter(|q| (low..=high).contains(&q.strike_key()))
        .collect();
    kept.sort_by_key(|q| q.strike_key());
    kept.into_iter().map(ChainStrike::from).collect()
}

impl OptionsComparator {
    /// Every listed expiration, strikes filtered to the band around the
    /// current price. Expirations that fail or keep nothing are dropped.
    pub async fn full_chain(&self, side: OptionSide, band: f64) -> Result<FullChain> {
        let price = self
            .current_price()
            .await
            .ok_or_else(|| ComparatorError::Unavailable("Could not fetch price".to_string()))?;
        let (low, high) = strike_band(price, band);

        let dates = self.available_dates().await?;
        let mut chain = Vec::with_capacity(dates.len());
        for date in dates {
            let Some(quotes) = self.option_chain(&date, side).await else {
                continue;
            };
            let strikes = within_band(&quotes, low, high);
            if strikes.is_empty() {
                debug!(ticker = %self.ticker(), %date, "No strikes inside band");
                continue;
            }
            chain.push(ChainDate { date, strikes });
        }

        info!(
            ticker = %self.ticker(),
            %side,
            expirations = chain.len(),
            "Built full chain"
        );

        Ok(FullChain {
            ticker: self.ticker().to_string(),
            current_price: price,
            option_type: side,
            chain,
        })
    }
}
