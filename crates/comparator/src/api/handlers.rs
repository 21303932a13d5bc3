//! HTTP request handlers for the CallTrack API.
//!
//! Every handler builds a fresh [`OptionsComparator`] for its request.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use market_data::{parse_date, MarketDataProvider};
use tracing::{error, info, warn};

use crate::api::models::*;
use crate::chain::{FullChain, DEFAULT_CHAIN_BAND};
use crate::comparison::Comparison;
use crate::context::OptionsComparator;
use crate::contract::ContractDetail;
use crate::summary::PriceSummary;
use crate::ComparatorError;

/// Default service name reported by the health endpoint
pub const DEFAULT_SERVICE_NAME: &str = "CallTrack API";

/// Shared state for API handlers. Holds no per-request data.
pub struct ApiState {
    pub provider: Arc<dyn MarketDataProvider>,
    pub service_name: String,
    /// Fractional strike band for the full chain view
    pub chain_band: f64,
}

impl ApiState {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            chain_band: DEFAULT_CHAIN_BAND,
        }
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_chain_band(mut self, band: f64) -> Self {
        self.chain_band = band;
        self
    }

    fn comparator(&self, ticker: &str) -> OptionsComparator {
        OptionsComparator::new(self.provider.clone(), ticker)
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

impl From<ComparatorError> for (StatusCode, Json<ErrorResponse>) {
    fn from(err: ComparatorError) -> Self {
        if err.is_client_error() {
            warn!("Request failed: {}", err);
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        } else {
            error!("Upstream failure: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn body(payload: Result<Json<CompareRequest>, JsonRejection>) -> Result<CompareRequest, ApiError> {
    match payload {
        Ok(Json(req)) => Ok(req),
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            Err(error_response(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    }
}

/// GET /api/health
pub async fn health_handler(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.service_name.clone(),
    })
}

/// GET /api/price/:ticker
pub async fn get_price(
    State(state): State<Arc<ApiState>>,
    Path(ticker): Path<String>,
) -> ApiResult<PriceSummary> {
    let ctx = state.comparator(&ticker);
    let quote = ctx.ticker_quote().await?;
    Ok(Json(PriceSummary::from_quote(ctx.ticker(), &quote)?))
}

/// GET /api/dates/:ticker
pub async fn get_dates(
    State(state): State<Arc<ApiState>>,
    Path(ticker): Path<String>,
) -> ApiResult<DatesResponse> {
    let ctx = state.comparator(&ticker);
    let dates = ctx.available_dates().await?;
    Ok(Json(DatesResponse {
        ticker: ctx.ticker().to_string(),
        dates,
    }))
}

/// POST /api/compare/date
pub async fn compare_by_date(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult<Comparison> {
    let req = body(payload)?.validate()?;
    info!(ticker = %req.ticker, date = %req.date, strike = req.strike, side = %req.side, "Date comparison");

    let result = state
        .comparator(&req.ticker)
        .compare_by_date(&req.date, req.strike, req.side)
        .await?;
    Ok(Json(result))
}

/// POST /api/compare/strike
pub async fn compare_by_strike(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult<Comparison> {
    let req = body(payload)?.validate()?;
    info!(ticker = %req.ticker, date = %req.date, strike = req.strike, side = %req.side, "Strike comparison");

    let result = state
        .comparator(&req.ticker)
        .compare_by_strike(&req.date, req.strike, req.side)
        .await?;
    Ok(Json(result))
}

/// GET /api/chain/:ticker?type=calls|puts
pub async fn get_full_chain(
    State(state): State<Arc<ApiState>>,
    Path(ticker): Path<String>,
    Query(params): Query<ChainParams>,
) -> ApiResult<FullChain> {
    let side = parse_side(params.option_type.as_deref())?;
    let chain = state
        .comparator(&ticker)
        .full_chain(side, state.chain_band)
        .await?;
    Ok(Json(chain))
}

/// POST /api/contract
pub async fn get_contract(
    State(state): State<Arc<ApiState>>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult<ContractDetail> {
    let req = body(payload)?.validate()?;
    let detail = state
        .comparator(&req.ticker)
        .contract_detail(&req.date, req.strike, req.side)
        .await?;
    Ok(Json(detail))
}

fn history_bound(value: Option<&str>, default: NaiveDate) -> Result<NaiveDate, ComparatorError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(s) => parse_date(s).map_err(|e| ComparatorError::invalid(e.to_string())),
        None => Ok(default),
    }
}

/// GET /api/history/:ticker?start=&end=
///
/// Defaults to the year ending today.
pub async fn get_history(
    State(state): State<Arc<ApiState>>,
    Path(ticker): Path<String>,
    Query(params): Query<HistoryParams>,
) -> ApiResult<HistoryResponse> {
    let today = Utc::now().date_naive();
    let end = history_bound(params.end.as_deref(), today)?;
    let year_before = end
        .checked_sub_signed(Duration::days(365))
        .ok_or_else(|| ComparatorError::invalid(format!("end {} is out of range", end)))?;
    let start = history_bound(params.start.as_deref(), year_before)?;
    if start > end {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("start {} is after end {}", start, end),
        ));
    }

    let ctx = state.comparator(&ticker);
    let history = ctx.history(start, end).await?;
    Ok(Json(HistoryResponse {
        ticker: ctx.ticker().to_string(),
        start: start.to_string(),
        end: end.to_string(),
        history,
    }))
}
