//! Prometheus metrics for the HTTP API

use metrics::{counter, gauge, histogram, Gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Start the Prometheus exporter, serving `/metrics` on `addr`.
///
/// Without this call every metric below is a no-op.
pub fn init_metrics(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics server listening");
    Ok(())
}

/// Request metrics for one server.
///
/// * `calltrack_http_requests_total{server,method,route,status}`
/// * `calltrack_http_request_duration_seconds{server,route}`
/// * `calltrack_http_requests_in_flight{server}`
#[derive(Clone)]
pub struct ServerMetrics {
    server_name: String,
    in_flight: Gauge,
}

impl ServerMetrics {
    pub fn new(server_name: &str) -> Self {
        Self {
            server_name: server_name.to_string(),
            in_flight: gauge!("calltrack_http_requests_in_flight", "server" => server_name.to_string()),
        }
    }

    pub fn record_request(&self, method: &str, route: &str, status_code: u16, duration: Duration) {
        counter!(
            "calltrack_http_requests_total",
            "server" => self.server_name.clone(),
            "method" => method.to_string(),
            "route" => route.to_string(),
            "status" => status_code.to_string()
        )
        .increment(1);
        histogram!(
            "calltrack_http_request_duration_seconds",
            "server" => self.server_name.clone(),
            "route" => route.to_string()
        )
        .record(duration.as_secs_f64());
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }
}

/// Tracks one request: bumps in-flight on creation and records the request
/// when dropped.
///
/// ```ignore
/// let mut guard = RequestMetricsGuard::new(&metrics, "GET", "/api/price/:ticker");
/// let response = next.run(request).await;
/// guard.set_status(response.status().as_u16());
/// ```
pub struct RequestMetricsGuard<'a> {
    metrics: &'a ServerMetrics,
    method: String,
    route: String,
    start: Instant,
    // 500 until told otherwise, so a dropped future counts as a failure
    status_code: u16,
}

impl<'a> RequestMetricsGuard<'a> {
    pub fn new(metrics: &'a ServerMetrics, method: impl Into<String>, route: impl Into<String>) -> Self {
        metrics.in_flight.increment(1.0);
        Self {
            metrics,
            method: method.into(),
            route: route.into(),
            start: Instant::now(),
            status_code: 500,
        }
    }

    pub fn set_status(&mut self, code: u16) {
        self.status_code = code;
    }
}

impl Drop for RequestMetricsGuard<'_> {
    fn drop(&mut self) {
        self.metrics.in_flight.decrement(1.0);
        self.metrics
            .record_request(&self.method, &self.route, self.status_code, self.start.elapsed());
    }
}
