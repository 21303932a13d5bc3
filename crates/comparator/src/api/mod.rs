//! HTTP API for CallTrack.
//!
//! ## Modules
//!
//! - `handlers` - Request handlers, one comparator context per request
//! - `routes` - Axum router
//! - `models` - Request/response types

pub mod handlers;
pub mod models;
pub mod routes;

pub use handlers::{ApiState, DEFAULT_SERVICE_NAME};
pub use routes::api_routes;
