//! Axum route definitions for the CallTrack API.

use crate::api::handlers::{self, ApiState};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

/// Create all API routes.
///
/// # Routes
///
/// - `GET /api/health` - Liveness
/// - `GET /api/price/:ticker` - Stock price and fundamentals
/// - `GET /api/dates/:ticker` - Listed expiration dates
/// - `POST /api/compare/date` - Fixed strike across neighboring expirations
/// - `POST /api/compare/strike` - Fixed expiration across neighboring strikes
/// - `GET /api/chain/:ticker` - Full chain around the current price
/// - `POST /api/contract` - Single contract detail
/// - `GET /api/history/:ticker` - Daily closes
pub fn api_routes(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_handler))
        .route("/api/price/:ticker", get(handlers::get_price))
        .route("/api/dates/:ticker", get(handlers::get_dates))
        .route("/api/compare/date", post(handlers::compare_by_date))
        .route("/api/compare/strike", post(handlers::compare_by_strike))
        .route("/api/chain/:ticker", get(handlers::get_full_chain))
        .route("/api/contract", post(handlers::get_contract))
        .route("/api/history/:ticker", get(handlers::get_history))
        .with_state(state)
}
