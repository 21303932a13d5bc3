//! Cross-cutting HTTP layers: tracing, CORS and request metrics

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use observability::{RequestMetricsGuard, ServerMetrics};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Which layers to wrap a router in
#[derive(Clone, Default)]
pub struct HttpLayers {
    /// Allow any origin. The web UI is served from a different origin.
    pub cors_permissive: bool,
    /// Record per-request metrics
    pub metrics: Option<ServerMetrics>,
}

impl HttpLayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_permissive_cors(mut self) -> Self {
        self.cors_permissive = true;
        self
    }

    pub fn with_metrics(mut self, metrics: ServerMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Wrap `router`. Tracing is always on.
    pub fn apply(&self, router: Router) -> Router {
        let mut router = router;
        if let Some(metrics) = self.metrics.clone() {
            router = router.layer(middleware::from_fn_with_state(metrics, track_metrics));
        }
        if self.cors_permissive {
            router = router.layer(CorsLayer::permissive());
        }
        router.layer(TraceLayer::new_for_http())
    }
}

async fn track_metrics(State(metrics): State<ServerMetrics>, request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let mut guard = RequestMetricsGuard::new(&metrics, request.method().as_str(), route);

    let response = next.run(request).await;
    guard.set_status(response.status().as_u16());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest, StatusCode};
    use axum::routing::get;
    use tower::ServiceExt;

    fn router() -> Router {
        Router::new().route("/api/ping", get(|| async { "pong" }))
    }

    #[tokio::test]
    async fn test_permissive_cors_header() {
        let app = HttpLayers::new()
            .with_permissive_cors()
            .with_metrics(ServerMetrics::new("test"))
            .apply(router());

        let response = app
            .oneshot(
                HttpRequest::get("/api/ping")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_no_cors_by_default() {
        let response = HttpLayers::new()
            .apply(router())
            .oneshot(
                HttpRequest::get("/api/ping")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
