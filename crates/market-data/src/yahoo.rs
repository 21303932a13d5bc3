//! Yahoo Finance provider
//!
//! Uses the unofficial query endpoints:
//! - `/v7/finance/quote` for spot price and fundamentals
//! - `/v7/finance/options/{ticker}` for expirations and chains
//! - `/v8/finance/chart/{ticker}` for daily closes
//!
//! Yahoo gates these behind a cookie + crumb pair. The handshake runs once per
//! provider instance, on first use; if it fails requests go out without a
//! crumb and Yahoo decides.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, instrument, warn};

use crate::error::MarketDataError;
use crate::provider::MarketDataProvider;
use crate::sanitize::{finite, or_zero};
use crate::types::{parse_date, OptionQuote, OptionSide, PricePoint, RawOptionQuote, TickerQuote};
use crate::Result;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";
pub const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
pub const DEFAULT_CRUMB_URL: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Connection settings for [`YahooProvider`]
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    /// Page that sets the session cookie. `None` skips the handshake.
    pub cookie_url: Option<String>,
    /// Endpoint returning the crumb. `None` skips the handshake.
    pub crumb_url: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cookie_url: Some(DEFAULT_COOKIE_URL.to_string()),
            crumb_url: Some(DEFAULT_CRUMB_URL.to_string()),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

impl YahooConfig {
    /// Plain config against a custom base URL, no handshake
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            cookie_url: None,
            crumb_url: None,
            ..Default::default()
        }
    }
}

/// Yahoo Finance API client
pub struct YahooProvider {
    client: reqwest::Client,
    config: YahooConfig,
    crumb: OnceCell<Option<String>>,
}

impl YahooProvider {
    pub fn new(config: YahooConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| MarketDataError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: YahooConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            crumb: OnceCell::new(),
        })
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    async fn crumb(&self) -> Option<String> {
        self.crumb
            .get_or_init(|| async { self.fetch_crumb().await })
            .await
            .clone()
    }

    async fn fetch_crumb(&self) -> Option<String> {
        let crumb_url = self.config.crumb_url.as_ref()?;

        if let Some(cookie_url) = &self.config.cookie_url {
            // fc.yahoo.com answers 404 but still sets the cookie
            if let Err(e) = self.client.get(cookie_url).send().await {
                warn!(%e, "Yahoo cookie request failed");
            }
        }

        match self.client.get(crumb_url).send().await {
            Ok(response) if response.status().is_success() => {
                let text = response.text().await.unwrap_or_default();
                let crumb = text.trim();
                if crumb.is_empty() || crumb.contains('<') {
                    warn!("Yahoo returned an unusable crumb");
                    None
                } else {
                    debug!("Yahoo crumb acquired");
                    Some(crumb.to_string())
                }
            }
            Ok(response) => {
                warn!(status = %response.status(), "Yahoo crumb request rejected");
                None
            }
            Err(e) => {
                warn!(%e, "Yahoo crumb request failed");
                None
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<T> {
        if let Some(crumb) = self.crumb().await {
            query.push(("crumb", crumb));
        }

        let url = format!("{}{}", self.config.base_url, path);
        debug!(%url, "Yahoo request");

        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }

    async fn options_result(
        &self,
        ticker: &str,
        date: Option<i64>,
    ) -> Result<YahooOptionChainData> {
        let query = date.map(|ts| vec![("date", ts.to_string())]).unwrap_or_default();
        let response: YahooOptionsResponse = self
            .get_json(&format!("/v7/finance/options/{}", ticker), query)
            .await?;

        response
            .option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::UnknownTicker(ticker.to_string()))
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn format_timestamp(ts: i64) -> Option<String> {
    DateTime::from_timestamp(ts, 0).map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    #[instrument(skip(self))]
    async fn ticker_quote(&self, ticker: &str) -> Result<TickerQuote> {
        let ticker = ticker.to_uppercase();
        let response: YahooQuoteResponse = self
            .get_json("/v7/finance/quote", vec![("symbols", ticker.clone())])
            .await?;

        let data = response
            .quote_response
            .result
            .into_iter()
            .next()
            .ok_or_else(|| MarketDataError::UnknownTicker(ticker.clone()))?;

        Ok(data.into_ticker_quote(ticker))
    }

    #[instrument(skip(self))]
    async fn expirations(&self, ticker: &str) -> Result<Vec<String>> {
        let ticker = ticker.to_uppercase();
        let chain = self.options_result(&ticker, None).await?;

        Ok(chain
            .expiration_dates
            .iter()
            .filter_map(|&ts| format_timestamp(ts))
            .collect())
    }

    #[instrument(skip(self))]
    async fn option_chain(
        &self,
        ticker: &str,
        date: &str,
        side: OptionSide,
    ) -> Result<Vec<OptionQuote>> {
        let ticker = ticker.to_uppercase();
        let ts = midnight_utc(parse_date(date)?);
        let chain = self.options_result(&ticker, Some(ts)).await?;

        let unknown = || MarketDataError::UnknownExpiration {
            ticker: ticker.clone(),
            date: date.to_string(),
        };

        if !chain.expiration_dates.is_empty() && !chain.expiration_dates.contains(&ts) {
            return Err(unknown());
        }

        let options = chain.options.into_iter().next().ok_or_else(unknown)?;
        let rows = match side {
            OptionSide::Calls => options.calls,
            OptionSide::Puts => options.puts,
        };

        Ok(rows.into_iter().filter_map(RawOptionQuote::sanitize).collect())
    }

    #[instrument(skip(self))]
    async fn daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PricePoint>> {
        let ticker = ticker.to_uppercase();
        let query = vec![
            ("period1", midnight_utc(start).to_string()),
            // period2 is exclusive upstream
            ("period2", (midnight_utc(end) + 86_400).to_string()),
            ("interval", "1d".to_string()),
        ];
        let response: YahooChartResponse = self
            .get_json(&format!("/v8/finance/chart/{}", ticker), query)
            .await?;

        let result = response
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| MarketDataError::UnknownTicker(ticker.clone()))?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        Ok(result
            .timestamp
            .unwrap_or_default()
            .into_iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                let price = finite(close)?;
                Some(PricePoint {
                    date: format_timestamp(ts)?,
                    price,
                })
            })
            .collect())
    }
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResult,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResult {
    #[serde(default)]
    result: Vec<YahooQuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteData {
    #[serde(default)]
    short_name: Option<String>,
    #[serde(default)]
    current_price: Option<f64>,
    #[serde(default)]
    regular_market_price: Option<f64>,
    #[serde(default)]
    regular_market_previous_close: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    dividend_yield: Option<f64>,
    #[serde(default)]
    dividend_rate: Option<f64>,
    #[serde(default, rename = "trailingPE")]
    trailing_pe: Option<f64>,
    #[serde(default, rename = "forwardPE")]
    forward_pe: Option<f64>,
    #[serde(default)]
    fifty_two_week_high: Option<f64>,
    #[serde(default)]
    fifty_two_week_low: Option<f64>,
    #[serde(default)]
    regular_market_volume: Option<f64>,
    #[serde(default)]
    average_daily_volume3_month: Option<f64>,
    #[serde(default)]
    beta: Option<f64>,
}

impl YahooQuoteData {
    fn into_ticker_quote(self, symbol: String) -> TickerQuote {
        TickerQuote {
            symbol,
            short_name: self.short_name,
            current_price: finite(self.current_price),
            regular_market_price: finite(self.regular_market_price),
            previous_close: or_zero(self.regular_market_previous_close),
            market_cap: or_zero(self.market_cap),
            dividend_yield: or_zero(self.dividend_yield),
            dividend_rate: or_zero(self.dividend_rate),
            trailing_pe: or_zero(self.trailing_pe),
            forward_pe: or_zero(self.forward_pe),
            fifty_two_week_high: or_zero(self.fifty_two_week_high),
            fifty_two_week_low: or_zero(self.fifty_two_week_low),
            volume: or_zero(self.regular_market_volume),
            average_volume: or_zero(self.average_daily_volume3_month),
            beta: or_zero(self.beta),
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooOptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: YahooOptionChain,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChain {
    #[serde(default)]
    result: Vec<YahooOptionChainData>,
}

#[derive(Debug, Deserialize)]
struct YahooOptionChainData {
    #[serde(rename = "expirationDates", default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<YahooOptions>,
}

#[derive(Debug, Deserialize)]
struct YahooOptions {
    #[serde(default)]
    calls: Vec<RawOptionQuote>,
    #[serde(default)]
    puts: Vec<RawOptionQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use axum::extract::{Path, Query};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn ts(date: &str) -> i64 {
        midnight_utc(parse_date(date).unwrap())
    }

    async fn quote_handler(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
        let symbol = params.get("symbols").cloned().unwrap_or_default();
        if symbol != "MSFT" {
            return Json(json!({ "quoteResponse": { "result": [], "error": null } }));
        }
        Json(json!({
            "quoteResponse": {
                "result": [{
                    "symbol": "MSFT",
                    "shortName": "Microsoft Corporation",
                    "regularMarketPrice": 410.5,
                    "regularMarketPreviousClose": 400.0,
                    "marketCap": 3.05e12,
                    "trailingPE": 35.2,
                    "fiftyTwoWeekHigh": 468.35,
                    "regularMarketVolume": 21000000
                }],
                "error": null
            }
        }))
    }

    async fn options_handler(
        Path(ticker): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        if ticker != "MSFT" {
            return Json(json!({ "optionChain": { "result": [], "error": null } }));
        }
        let expirations = vec![ts("2027-01-15"), ts("2027-02-19")];
        let options = match params.get("date") {
            Some(date) if date == &ts("2027-01-15").to_string() => json!([{
                "calls": [
                    { "strike": 440.0, "bid": 10.0, "ask": 10.4, "lastPrice": 10.2 },
                    { "strike": 450.0, "bid": 6.0, "ask": 6.5, "impliedVolatility": 0.27 },
                    { "bid": 1.0 }
                ],
                "puts": [
                    { "strike": 440.0, "bid": 20.0, "ask": 21.0 }
                ]
            }]),
            _ => json!([]),
        };
        Json(json!({
            "optionChain": {
                "result": [{
                    "underlyingSymbol": "MSFT",
                    "expirationDates": expirations,
                    "options": options
                }],
                "error": null
            }
        }))
    }

    async fn chart_handler(Path(ticker): Path<String>) -> Json<Value> {
        let _ = ticker;
        Json(json!({
            "chart": {
                "result": [{
                    "timestamp": [ts("2026-10-01") + 48_600, ts("2026-10-02") + 48_600, ts("2026-10-05") + 48_600],
                    "indicators": { "quote": [{ "close": [401.0, null, 405.0] }] }
                }],
                "error": null
            }
        }))
    }

    async fn spawn_fake_yahoo() -> String {
        let router = Router::new()
            .route("/v7/finance/quote", get(quote_handler))
            .route("/v7/finance/options/:ticker", get(options_handler))
            .route("/v8/finance/chart/:ticker", get(chart_handler));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn provider() -> YahooProvider {
        let base_url = spawn_fake_yahoo().await;
        YahooProvider::new(YahooConfig::with_base_url(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_ticker_quote_maps_fundamentals() {
        let provider = provider().await;
        let quote = provider.ticker_quote("msft").await.unwrap();

        assert_eq!(quote.symbol, "MSFT");
        assert_eq!(quote.price(), Some(410.5));
        assert_eq!(quote.previous_close, 400.0);
        assert_eq!(quote.trailing_pe, 35.2);
        assert_eq!(quote.volume, 21_000_000.0);
        // Absent upstream -> zero
        assert_eq!(quote.beta, 0.0);
        assert_eq!(quote.short_name.as_deref(), Some("Microsoft Corporation"));
    }

    #[tokio::test]
    async fn test_unknown_ticker() {
        let provider = provider().await;
        assert_matches!(
            provider.ticker_quote("ZZZZ").await,
            Err(MarketDataError::UnknownTicker(t)) if t == "ZZZZ"
        );
        assert_matches!(
            provider.expirations("ZZZZ").await,
            Err(MarketDataError::UnknownTicker(_))
        );
    }

    #[tokio::test]
    async fn test_expirations_render_as_dates() {
        let provider = provider().await;
        let dates = provider.expirations("MSFT").await.unwrap();
        assert_eq!(dates, vec!["2027-01-15", "2027-02-19"]);
    }

    #[tokio::test]
    async fn test_option_chain_by_side() {
        let provider = provider().await;

        let calls = provider
            .option_chain("MSFT", "2027-01-15", OptionSide::Calls)
            .await
            .unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].strike, 450.0);
        assert_eq!(calls[1].implied_volatility, 0.27);
        assert_eq!(calls[1].last_price, 0.0);

        let puts = provider
            .option_chain("MSFT", "2027-01-15", OptionSide::Puts)
            .await
            .unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].mid(), 20.5);
    }

    #[tokio::test]
    async fn test_option_chain_unlisted_date() {
        let provider = provider().await;
        assert_matches!(
            provider.option_chain("MSFT", "2027-03-19", OptionSide::Calls).await,
            Err(MarketDataError::UnknownExpiration { date, .. }) if date == "2027-03-19"
        );
        assert_matches!(
            provider.option_chain("MSFT", "March", OptionSide::Calls).await,
            Err(MarketDataError::InvalidDate(_))
        );
    }

    #[tokio::test]
    async fn test_daily_closes_skip_nulls() {
        let provider = provider().await;
        let points = provider
            .daily_closes(
                "MSFT",
                NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 10, 5).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            points,
            vec![
                PricePoint { date: "2026-10-01".into(), price: 401.0 },
                PricePoint { date: "2026-10-05".into(), price: 405.0 },
            ]
        );
    }

    #[tokio::test]
    async fn test_upstream_status_is_surfaced() {
        let provider = provider().await;
        // No route -> axum answers 404
        let result: Result<Value> = provider.get_json("/v6/nothing", vec![]).await;
        assert_matches!(result, Err(MarketDataError::UpstreamStatus { status: 404, .. }));
    }

    #[tokio::test]
    #[ignore] // Requires network
    async fn test_live_expirations() {
        let provider = YahooProvider::new(YahooConfig::default()).unwrap();
        let dates = provider.expirations("MSFT").await.unwrap();

        assert!(!dates.is_empty());
        println!("MSFT expirations: {:?}", dates);
    }
}
