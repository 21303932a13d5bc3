//! Shared types for market data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::MarketDataError;
use crate::sanitize::{finite, mid_price, or_zero};

/// Which side of the chain a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    #[default]
    Calls,
    Puts,
}

impl OptionSide {
    /// Parse from string (case-insensitive, singular or plural)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "calls" | "call" | "c" => Some(Self::Calls),
            "puts" | "put" | "p" => Some(Self::Puts),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calls => "calls",
            Self::Puts => "puts",
        }
    }
}

impl std::str::FromStr for OptionSide {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown option type: {} (expected calls or puts)", s))
    }
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strike price in integer cents.
///
/// Upstream strikes are floats; all equality and ordering between strikes
/// goes through this key so `449.99999999` and `450.0` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StrikeKey(i64);

impl StrikeKey {
    pub fn from_price(price: f64) -> Self {
        Self((price * 100.0).round() as i64)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn value(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Absolute distance in cents
    pub fn distance(&self, other: &StrikeKey) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for StrikeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Parse an expiration date in `YYYY-MM-DD` form
pub fn parse_date(s: &str) -> Result<NaiveDate, MarketDataError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| MarketDataError::InvalidDate(format!("{} (expected YYYY-MM-DD)", s)))
}

/// One option row as delivered upstream. Every number may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptionQuote {
    #[serde(default)]
    pub contract_symbol: Option<String>,
    #[serde(default)]
    pub strike: Option<f64>,
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub percent_change: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub open_interest: Option<f64>,
    #[serde(default)]
    pub implied_volatility: Option<f64>,
    #[serde(default)]
    pub in_the_money: Option<bool>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
    #[serde(default)]
    pub theta: Option<f64>,
    #[serde(default)]
    pub vega: Option<f64>,
}

impl RawOptionQuote {
    /// Row with only a strike set
    pub fn at_strike(strike: f64) -> Self {
        Self {
            strike: Some(strike),
            ..Default::default()
        }
    }

    /// Apply the boundary defaults. Rows without a usable strike are dropped.
    pub fn sanitize(self) -> Option<OptionQuote> {
        let strike = finite(self.strike)?;

        Some(OptionQuote {
            contract_symbol: self.contract_symbol,
            strike,
            last_price: or_zero(self.last_price),
            bid: or_zero(self.bid),
            ask: or_zero(self.ask),
            change: or_zero(self.change),
            percent_change: or_zero(self.percent_change),
            volume: count(self.volume),
            open_interest: count(self.open_interest),
            implied_volatility: or_zero(self.implied_volatility),
            in_the_money: self.in_the_money.unwrap_or(false),
            delta: finite(self.delta),
            gamma: finite(self.gamma),
            theta: finite(self.theta),
            vega: finite(self.vega),
        })
    }
}

fn count(value: Option<f64>) -> u64 {
    or_zero(value).max(0.0).round() as u64
}

/// Sanitized option quote: an immutable upstream snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionQuote {
    pub contract_symbol: Option<String>,
    pub strike: f64,
    pub last_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub change: f64,
    pub percent_change: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub implied_volatility: f64,
    pub in_the_money: bool,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
}

impl OptionQuote {
    pub fn strike_key(&self) -> StrikeKey {
        StrikeKey::from_price(self.strike)
    }

    /// Mid price, falling back to last when either side is unquoted
    pub fn mid(&self) -> f64 {
        mid_price(self.bid, self.ask, self.last_price)
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

/// Find the quote for a strike by cents key
pub fn find_by_strike(chain: &[OptionQuote], strike: StrikeKey) -> Option<&OptionQuote> {
    chain.iter().find(|q| q.strike_key() == strike)
}

/// Spot quote and fundamentals for an underlying
///
/// Price fields stay optional so callers can tell "no price" from zero;
/// everything else is sanitized to zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickerQuote {
    pub symbol: String,
    pub short_name: Option<String>,
    pub current_price: Option<f64>,
    pub regular_market_price: Option<f64>,
    pub previous_close: f64,
    pub market_cap: f64,
    pub dividend_yield: f64,
    pub dividend_rate: f64,
    pub trailing_pe: f64,
    pub forward_pe: f64,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
    pub volume: f64,
    pub average_volume: f64,
    pub beta: f64,
}

impl TickerQuote {
    pub fn new(symbol: impl Into<String>, price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            regular_market_price: Some(price),
            ..Default::default()
        }
    }

    /// Best available price: current, then regular market. Zero counts as missing.
    pub fn price(&self) -> Option<f64> {
        finite(self.current_price)
            .filter(|p| *p != 0.0)
            .or_else(|| finite(self.regular_market_price).filter(|p| *p != 0.0))
    }
}

/// One daily close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_side_parse() {
        assert_eq!(OptionSide::parse("calls"), Some(OptionSide::Calls));
        assert_eq!(OptionSide::parse("CALL"), Some(OptionSide::Calls));
        assert_eq!(OptionSide::parse("puts"), Some(OptionSide::Puts));
        assert_eq!(OptionSide::parse("Put"), Some(OptionSide::Puts));
        assert_eq!(OptionSide::parse("straddle"), None);
        assert!("straddle".parse::<OptionSide>().is_err());
        assert_eq!(OptionSide::Puts.to_string(), "puts");
    }

    #[test]
    fn test_strike_key_rounds_to_cents() {
        assert_eq!(StrikeKey::from_price(450.0), StrikeKey::from_price(449.999_999_9));
        assert_eq!(StrikeKey::from_price(452.5).cents(), 45_250);
        assert_ne!(StrikeKey::from_price(450.0), StrikeKey::from_price(450.01));
        assert_eq!(StrikeKey::from_price(440.0).distance(&StrikeKey::from_price(445.0)), 500);
        assert_eq!(StrikeKey::from_price(452.5).to_string(), "452.5");
        assert_eq!(StrikeKey::from_price(450.0).to_string(), "450");
    }

    #[test]
    fn test_raw_quote_sanitize() {
        let raw = RawOptionQuote {
            strike: Some(450.0),
            bid: Some(f64::NAN),
            ask: Some(2.0),
            last_price: None,
            volume: Some(f64::INFINITY),
            open_interest: Some(1200.0),
            delta: Some(f64::NAN),
            gamma: Some(0.01),
            ..Default::default()
        };

        let quote = raw.sanitize().unwrap();
        assert_eq!(quote.bid, 0.0);
        assert_eq!(quote.ask, 2.0);
        assert_eq!(quote.last_price, 0.0);
        assert_eq!(quote.volume, 0);
        assert_eq!(quote.open_interest, 1200);
        assert_eq!(quote.delta, None);
        assert_eq!(quote.gamma, Some(0.01));
        assert!(!quote.in_the_money);
        // bid unquoted -> mid falls back to last
        assert_eq!(quote.mid(), 0.0);
    }

    #[test]
    fn test_raw_quote_without_strike_is_dropped() {
        assert!(RawOptionQuote::default().sanitize().is_none());
        let raw = RawOptionQuote {
            strike: Some(f64::NAN),
            ..Default::default()
        };
        assert!(raw.sanitize().is_none());
    }

    #[test]
    fn test_raw_quote_deserializes_camel_case() {
        let raw: RawOptionQuote = serde_json::from_str(
            r#"{"contractSymbol":"MSFT270115C00450000","strike":450,"lastPrice":3.1,
                "openInterest":10,"impliedVolatility":0.25,"inTheMoney":true}"#,
        )
        .unwrap();
        let quote = raw.sanitize().unwrap();
        assert_eq!(quote.contract_symbol.as_deref(), Some("MSFT270115C00450000"));
        assert_eq!(quote.last_price, 3.1);
        assert_eq!(quote.open_interest, 10);
        assert!(quote.in_the_money);
    }

    #[test]
    fn test_find_by_strike() {
        let chain: Vec<OptionQuote> = [440.0, 450.0, 460.0]
            .into_iter()
            .filter_map(|s| RawOptionQuote::at_strike(s).sanitize())
            .collect();
        let found = find_by_strike(&chain, StrikeKey::from_price(450.0000001)).unwrap();
        assert_eq!(found.strike, 450.0);
        assert!(find_by_strike(&chain, StrikeKey::from_price(455.0)).is_none());
    }

    #[test]
    fn test_ticker_quote_price_fallback() {
        let mut quote = TickerQuote::new("MSFT", 410.0);
        assert_eq!(quote.price(), Some(410.0));

        quote.current_price = Some(412.0);
        assert_eq!(quote.price(), Some(412.0));

        quote.current_price = Some(0.0);
        assert_eq!(quote.price(), Some(410.0));

        quote.regular_market_price = None;
        assert_eq!(quote.price(), None);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2027-01-31").unwrap(),
            NaiveDate::from_ymd_opt(2027, 1, 31).unwrap()
        );
        assert!(parse_date("01/31/2027").is_err());
    }
}
