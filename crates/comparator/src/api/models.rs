//! API request/response models.

use market_data::{OptionSide, PricePoint};
use serde::{Deserialize, Serialize};

use crate::{ComparatorError, Result};

/// Strike as sent by clients: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StrikeInput {
    Number(f64),
    Text(String),
}

impl StrikeInput {
    pub fn value(&self) -> Result<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ComparatorError::invalid(format!("Invalid strike: {}", s)))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ComparatorError::invalid("Invalid strike: must be finite"))
        }
    }
}

/// Body shared by the comparison and contract endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompareRequest {
    pub ticker: Option<String>,
    pub date: Option<String>,
    pub strike: Option<StrikeInput>,
    pub option_type: Option<String>,
}

/// A [`CompareRequest`] with every field present and parsed
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub ticker: String,
    pub date: String,
    pub strike: f64,
    pub side: OptionSide,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Option type parameter, defaulting to calls
pub fn parse_side(value: Option<&str>) -> Result<OptionSide> {
    match non_empty(value) {
        None => Ok(OptionSide::Calls),
        Some(s) => OptionSide::parse(s).ok_or_else(|| {
            ComparatorError::invalid(format!("Invalid option_type: {} (expected calls or puts)", s))
        }),
    }
}

impl CompareRequest {
    pub fn validate(&self) -> Result<ValidatedRequest> {
        let missing = || ComparatorError::invalid("Missing required fields");

        let ticker = non_empty(self.ticker.as_deref()).ok_or_else(missing)?;
        let date = non_empty(self.date.as_deref()).ok_or_else(missing)?;
        let strike = self.strike.as_ref().ok_or_else(missing)?.value()?;
        if strike == 0.0 {
            return Err(missing());
        }

        Ok(ValidatedRequest {
            ticker: ticker.to_uppercase(),
            date: date.to_string(),
            strike,
            side: parse_side(self.option_type.as_deref())?,
        })
    }
}

/// Query for `GET /api/chain/:ticker`
#[derive(Debug, Default, Deserialize)]
pub struct ChainParams {
    #[serde(rename = "type")]
    pub option_type: Option<String>,
}

/// Query for `GET /api/history/:ticker`
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatesResponse {
    pub ticker: String,
    pub dates: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub ticker: String,
    pub start: String,
    pub end: String,
    pub history: Vec<PricePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn parse(json: &str) -> CompareRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_strike_number_or_string() {
        let req = parse(r#"{"ticker":"msft","date":"2027-01-15","strike":"450.5"}"#);
        let valid = req.validate().unwrap();
        assert_eq!(valid.ticker, "MSFT");
        assert_eq!(valid.strike, 450.5);
        assert_eq!(valid.side, OptionSide::Calls);

        let req = parse(r#"{"ticker":"MSFT","date":"2027-01-15","strike":450,"option_type":"puts"}"#);
        let valid = req.validate().unwrap();
        assert_eq!(valid.strike, 450.0);
        assert_eq!(valid.side, OptionSide::Puts);
    }

    #[test]
    fn test_missing_fields() {
        for body in [
            r#"{"date":"2027-01-15","strike":450}"#,
            r#"{"ticker":"","date":"2027-01-15","strike":450}"#,
            r#"{"ticker":"MSFT","strike":450}"#,
            r#"{"ticker":"MSFT","date":"2027-01-15"}"#,
            r#"{"ticker":"MSFT","date":"2027-01-15","strike":0}"#,
        ] {
            assert_eq!(
                parse(body).validate(),
                Err(ComparatorError::invalid("Missing required fields")),
                "{}",
                body
            );
        }
    }

    #[test]
    fn test_bad_values() {
        let req = parse(r#"{"ticker":"MSFT","date":"2027-01-15","strike":"abc"}"#);
        assert_matches!(req.validate(), Err(ComparatorError::InvalidRequest(m)) if m.contains("abc"));

        let req = parse(r#"{"ticker":"MSFT","date":"2027-01-15","strike":450,"option_type":"straddle"}"#);
        assert_matches!(req.validate(), Err(ComparatorError::InvalidRequest(m)) if m.contains("straddle"));
    }

    #[test]
    fn test_parse_side_default() {
        assert_eq!(parse_side(None), Ok(OptionSide::Calls));
        assert_eq!(parse_side(Some("  ")), Ok(OptionSide::Calls));
        assert_eq!(parse_side(Some("PUT")), Ok(OptionSide::Puts));
    }
}
