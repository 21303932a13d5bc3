//! Date and strike neighbor comparisons

use std::collections::BTreeSet;

use chrono::NaiveDate;
use market_data::{find_by_strike, parse_date, OptionQuote, OptionSide, StrikeKey};
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::OptionsComparator;
use crate::neighbor::{dedup_in_order, find_neighbors, Axis};
use crate::{ComparatorError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which coordinate varies across the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Fixed strike, neighboring expirations
    DateComparison,
    /// Fixed expiration, neighboring strikes
    StrikeComparison,
}

/// Quote fields carried by each series entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteData {
    pub strike: f64,
    pub last_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub mid: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub implied_volatility: f64,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub theta: Option<f64>,
    pub vega: Option<f64>,
}

impl From<&OptionQuote> for QuoteData {
    fn from(q: &OptionQuote) -> Self {
        Self {
            strike: q.strike,
            last_price: q.last_price,
            bid: q.bid,
            ask: q.ask,
            mid: q.mid(),
            volume: q.volume,
            open_interest: q.open_interest,
            implied_volatility: q.implied_volatility,
            delta: q.delta,
            gamma: q.gamma,
            theta: q.theta,
            vega: q.vega,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    pub position: &'static str,
    pub data: QuoteData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub mode: ComparisonMode,
    pub ticker: String,
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_strike: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<String>,
    pub option_type: OptionSide,
    pub series: Vec<SeriesEntry>,
}

impl Comparison {
    pub fn positions(&self) -> Vec<&'static str> {
        self.series.iter().map(|e| e.position).collect()
    }
}

fn parse_target_date(date: &str) -> Result<NaiveDate> {
    parse_date(date).map_err(|e| ComparatorError::invalid(e.to_string()))
}

fn day_distance(a: &NaiveDate, b: &NaiveDate) -> u64 {
    (*a - *b).num_days().unsigned_abs()
}

impl OptionsComparator {
    /// Fixed strike across the target expiration and its neighbors.
    ///
    /// Dates whose chain cannot be fetched, or that do not list the strike,
    /// are left out of the series.
    pub async fn compare_by_date(
        &self,
        target_date: &str,
        target_strike: f64,
        side: OptionSide,
    ) -> Result<Comparison> {
        let target = parse_target_date(target_date)?;
        let strike = StrikeKey::from_price(target_strike);

        let listed = self.available_dates().await?;
        let candidates = dedup_in_order(listed.iter().filter_map(|d| match parse_date(d) {
            Ok(date) => Some(date),
            Err(e) => {
                warn!(ticker = %self.ticker(), error = %e, "Skipping unparseable expiration");
                None
            }
        }));

        let mut series = Vec::new();
        if let Some(neighbors) = find_neighbors(&candidates, &target, day_distance) {
            if neighbors.substituted {
                warn!(
                    ticker = %self.ticker(),
                    requested = %target,
                    using = %neighbors.target,
                    "Expiration not listed, using closest"
                );
            }

            for (slot, date) in neighbors.slots() {
                let date = date.format(DATE_FORMAT).to_string();
                let position = Axis::Date.label(slot);

                let Some(chain) = self.option_chain(&date, side).await else {
                    continue;
                };
                match find_by_strike(&chain, strike) {
                    Some(quote) => series.push(SeriesEntry {
                        label: format!("{} ({})", date, position),
                        date: Some(date),
                        strike: None,
                        position,
                        data: quote.into(),
                    }),
                    None => debug!(ticker = %self.ticker(), %date, %strike, "Strike not listed"),
                }
            }
        }

        Ok(Comparison {
            mode: ComparisonMode::DateComparison,
            ticker: self.ticker().to_string(),
            current_price: self.current_price().await,
            target_strike: Some(target_strike),
            target_date: None,
            option_type: side,
            series,
        })
    }

    /// Fixed expiration across the target strike and its neighbors
    pub async fn compare_by_strike(
        &self,
        target_date: &str,
        target_strike: f64,
        side: OptionSide,
    ) -> Result<Comparison> {
        let date = parse_target_date(target_date)?.format(DATE_FORMAT).to_string();
        let target = StrikeKey::from_price(target_strike);

        let chain = self.option_chain(&date, side).await.ok_or_else(|| {
            ComparatorError::Unavailable(format!("Could not fetch option chain for {}", date))
        })?;

        let strikes: Vec<StrikeKey> = chain
            .iter()
            .map(OptionQuote::strike_key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut series = Vec::new();
        if let Some(neighbors) = find_neighbors(&strikes, &target, StrikeKey::distance) {
            if neighbors.substituted {
                warn!(
                    ticker = %self.ticker(),
                    requested = %target,
                    using = %neighbors.target,
                    "Strike not listed, using closest"
                );
            }

            for (slot, key) in neighbors.slots() {
                let position = Axis::Strike.label(slot);
                if let Some(quote) = find_by_strike(&chain, *key) {
                    series.push(SeriesEntry {
                        label: format!("${} ({})", key, position),
                        date: None,
                        strike: Some(quote.strike),
                        position,
                        data: quote.into(),
                    });
                }
            }
        }

        Ok(Comparison {
            mode: ComparisonMode::StrikeComparison,
            ticker: self.ticker().to_string(),
            current_price: self.current_price().await,
            target_strike: None,
            target_date: Some(date),
            option_type: side,
            series,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use market_data::{RawOptionQuote, StaticProvider, TickerQuote};
    use std::sync::Arc;

    fn row(strike: f64, bid: f64, ask: f64) -> RawOptionQuote {
        RawOptionQuote {
            bid: Some(bid),
            ask: Some(ask),
            last_price: Some(bid),
            ..RawOptionQuote::at_strike(strike)
        }
    }

    fn fixture() -> StaticProvider {
        StaticProvider::new()
            .with_quote(TickerQuote::new("SPY", 448.0))
            .with_expirations("SPY", ["2027-01-15", "2027-01-31", "2027-02-15", "2027-01-31"])
            .with_chain(
                "SPY",
                "2027-01-15",
                OptionSide::Calls,
                vec![row(440.0, 10.0, 11.0), row(450.0, 4.0, 5.0)],
            )
            .with_chain(
                "SPY",
                "2027-01-31",
                OptionSide::Calls,
                vec![
                    row(460.0, 2.0, 2.5),
                    row(440.0, 12.0, 13.0),
                    row(450.0, 6.0, 7.0),
                    row(450.0, 6.0, 7.0),
                ],
            )
            .with_chain("SPY", "2027-02-15", OptionSide::Calls, vec![row(460.0, 3.0, 4.0)])
    }

    fn comparator(provider: StaticProvider) -> OptionsComparator {
        OptionsComparator::new(Arc::new(provider), "spy")
    }

    #[tokio::test]
    async fn test_compare_by_date_exact() {
        let result = comparator(fixture())
            .compare_by_date("2027-01-31", 450.0, OptionSide::Calls)
            .await
            .unwrap();

        assert_eq!(result.mode, ComparisonMode::DateComparison);
        assert_eq!(result.ticker, "SPY");
        assert_eq!(result.current_price, Some(448.0));
        // 2027-02-15 has no 450 strike
        assert_eq!(result.positions(), vec!["before", "target"]);
        assert_eq!(result.series[0].label, "2027-01-15 (before)");
        assert_eq!(result.series[1].date.as_deref(), Some("2027-01-31"));
        assert_eq!(result.series[1].data.mid, 6.5);
    }

    #[tokio::test]
    async fn test_compare_by_date_uses_closest_listed_date() {
        let result = comparator(fixture())
            .compare_by_date("2027-02-10", 460.0, OptionSide::Calls)
            .await
            .unwrap();

        assert_eq!(result.positions(), vec!["before", "target"]);
        assert_eq!(result.series[1].label, "2027-02-15 (target)");
        assert_eq!(result.series[1].data.ask, 4.0);
    }

    #[tokio::test]
    async fn test_compare_by_date_skips_missing_chain() {
        let provider = StaticProvider::new()
            .with_quote(TickerQuote::new("SPY", 448.0))
            .with_expirations("SPY", ["2027-01-15", "2027-01-31"])
            .with_chain("SPY", "2027-01-31", OptionSide::Calls, vec![row(450.0, 1.0, 2.0)]);

        let result = comparator(provider)
            .compare_by_date("2027-01-15", 450.0, OptionSide::Calls)
            .await
            .unwrap();
        assert_eq!(result.positions(), vec!["after"]);
    }

    #[tokio::test]
    async fn test_compare_by_date_without_expirations() {
        let provider = StaticProvider::new()
            .with_quote(TickerQuote::new("SPY", 448.0))
            .with_expirations("SPY", Vec::<String>::new());

        let result = comparator(provider)
            .compare_by_date("2027-01-15", 450.0, OptionSide::Calls)
            .await
            .unwrap();
        assert!(result.series.is_empty());
    }

    #[tokio::test]
    async fn test_compare_by_date_rejects_bad_date() {
        let err = comparator(fixture())
            .compare_by_date("31/01/2027", 450.0, OptionSide::Calls)
            .await
            .unwrap_err();
        assert_matches!(err, ComparatorError::InvalidRequest(_));
    }

    #[tokio::test]
    async fn test_compare_by_strike_echoes_normalized_date() {
        let result = comparator(fixture())
            .compare_by_strike(" 2027-01-31 ", 450.0, OptionSide::Calls)
            .await
            .unwrap();
        assert_eq!(result.target_date.as_deref(), Some("2027-01-31"));
        assert_eq!(result.positions(), vec!["below", "target", "above"]);
    }

    #[tokio::test]
    async fn test_compare_by_strike_dedups_strikes() {
        let result = comparator(fixture())
            .compare_by_strike("2027-01-31", 450.0, OptionSide::Calls)
            .await
            .unwrap();

        assert_eq!(result.mode, ComparisonMode::StrikeComparison);
        assert_eq!(result.target_date.as_deref(), Some("2027-01-31"));
        assert_eq!(result.positions(), vec!["below", "target", "above"]);
        let strikes: Vec<_> = result.series.iter().map(|e| e.strike).collect();
        assert_eq!(strikes, vec![Some(440.0), Some(450.0), Some(460.0)]);
        assert_eq!(result.series[1].label, "$450 (target)");
    }

    #[tokio::test]
    async fn test_compare_by_strike_tie_resolves_low() {
        let result = comparator(fixture())
            .compare_by_strike("2027-01-31", 445.0, OptionSide::Calls)
            .await
            .unwrap();

        assert_eq!(result.positions(), vec!["target", "above"]);
        assert_eq!(result.series[0].strike, Some(440.0));
    }

    #[tokio::test]
    async fn test_compare_by_strike_at_edge() {
        let result = comparator(fixture())
            .compare_by_strike("2027-01-31", 460.0, OptionSide::Calls)
            .await
            .unwrap();
        assert_eq!(result.positions(), vec!["below", "target"]);
    }

    #[tokio::test]
    async fn test_compare_by_strike_missing_chain() {
        let err = comparator(fixture())
            .compare_by_strike("2027-03-19", 450.0, OptionSide::Puts)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ComparatorError::Unavailable("Could not fetch option chain for 2027-03-19".into())
        );
    }

    #[tokio::test]
    async fn test_comparison_serializes_snake_case_envelope() {
        let result = comparator(fixture())
            .compare_by_strike("2027-01-15", 450.0, OptionSide::Calls)
            .await
            .unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["mode"], "strike_comparison");
        assert_eq!(json["option_type"], "calls");
        assert_eq!(json["target_date"], "2027-01-15");
        assert!(json.get("target_strike").is_none());
        assert_eq!(json["series"][0]["data"]["lastPrice"], 10.0);
        assert!(json["series"][0]["data"]["delta"].is_null());
    }
}
