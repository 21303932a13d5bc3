//! Single contract detail

use market_data::{find_by_strike, parse_date, OptionQuote, OptionSide, StrikeKey};
use serde::Serialize;

use crate::context::OptionsComparator;
use crate::{ComparatorError, Result};

/// Shares per listed equity option contract
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractQuote {
    pub contract_symbol: Option<String>,
    pub bid: f64,
    pub ask: f64,
    pub mid: f64,
    pub last: f64,
    pub spread: f64,
    pub contract_value: f64,
    pub change: f64,
    pub percent_change: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub implied_volatility: f64,
    pub in_the_money: bool,
}

impl From<&OptionQuote> for ContractQuote {
    fn from(q: &OptionQuote) -> Self {
        let mid = q.mid();
        Self {
            contract_symbol: q.contract_symbol.clone(),
            bid: q.bid,
            ask: q.ask,
            mid,
            last: q.last_price,
            spread: q.spread(),
            contract_value: mid * CONTRACT_MULTIPLIER,
            change: q.change,
            percent_change: q.percent_change,
            volume: q.volume,
            open_interest: q.open_interest,
            implied_volatility: q.implied_volatility,
            in_the_money: q.in_the_money,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDetail {
    pub ticker: String,
    pub stock_price: Option<f64>,
    pub date: String,
    pub strike: f64,
    pub option_type: OptionSide,
    pub contract: ContractQuote,
    pub breakeven: f64,
}

/// Underlying price at expiry where the position breaks even, paying `premium`
pub fn breakeven(strike: f64, premium: f64, side: OptionSide) -> f64 {
    match side {
        OptionSide::Calls => strike + premium,
        OptionSide::Puts => strike - premium,
    }
}

impl OptionsComparator {
    /// Quote, spread and breakeven for one listed contract
    pub async fn contract_detail(
        &self,
        date: &str,
        strike: f64,
        side: OptionSide,
    ) -> Result<ContractDetail> {
        let date = parse_date(date)
            .map_err(|e| ComparatorError::invalid(e.to_string()))?
            .format("%Y-%m-%d")
            .to_string();

        let chain = self
            .option_chain(&date, side)
            .await
            .ok_or_else(|| ComparatorError::Unavailable("Could not fetch option chain".to_string()))?;

        let key = StrikeKey::from_price(strike);
        let quote = find_by_strike(&chain, key)
            .ok_or_else(|| ComparatorError::NotFound(format!("Strike {} not found", key)))?;
        let contract = ContractQuote::from(quote);

        Ok(ContractDetail {
            ticker: self.ticker().to_string(),
            stock_price: self.current_price().await,
            date,
            strike: quote.strike,
            option_type: side,
            breakeven: breakeven(quote.strike, contract.mid, side),
            contract,
        })
    }
}
