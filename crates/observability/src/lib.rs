//! Observability for CallTrack
//!
//! - Structured logging via `tracing`
//! - Prometheus metrics for the HTTP API
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("calltrack", LogFormat::Pretty, "info")?;
//!
//! // Optional Prometheus exporter
//! observability::init_metrics("0.0.0.0:9090".parse()?)?;
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{init_logging, LogFormat};
pub use metrics::{init_metrics, RequestMetricsGuard, ServerMetrics};
