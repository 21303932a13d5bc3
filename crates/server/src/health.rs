//! Outbound health probes

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::error::Result;

/// Result of probing one URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub service: String,
    pub url: String,
    pub connected: bool,
    pub status_code: Option<u16>,
    pub latency_ms: u64,
    pub error: Option<String>,
}

/// HTTP client for health probes. Reuse one across calls.
#[derive(Clone)]
pub struct HealthClient {
    client: reqwest::Client,
}

impl HealthClient {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// GET `url`; any 2xx counts as connected
    pub async fn check(&self, service_name: &str, url: &str) -> ConnectionStatus {
        let start = Instant::now();
        let result = self.client.get(url).send().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                let status = response.status();
                ConnectionStatus {
                    service: service_name.to_string(),
                    url: url.to_string(),
                    connected: status.is_success(),
                    status_code: Some(status.as_u16()),
                    latency_ms,
                    error: (!status.is_success()).then(|| format!("HTTP {}", status)),
                }
            }
            Err(e) => ConnectionStatus {
                service: service_name.to_string(),
                url: url.to_string(),
                connected: false,
                status_code: None,
                latency_ms,
                error: Some(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    async fn spawn_app() -> String {
        let app = Router::new()
            .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
            .route("/broken", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_check_statuses() {
        let base = spawn_app().await;
        let client = HealthClient::new(Duration::from_secs(2), "test-agent").unwrap();

        let ok = client.check("api", &format!("{}/health", base)).await;
        assert!(ok.connected);
        assert_eq!(ok.status_code, Some(200));
        assert!(ok.error.is_none());

        let broken = client.check("api", &format!("{}/broken", base)).await;
        assert!(!broken.connected);
        assert_eq!(broken.status_code, Some(503));
        assert!(broken.error.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_check_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HealthClient::new(Duration::from_secs(2), "test-agent").unwrap();
        let status = client.check("api", &format!("http://{}/health", addr)).await;
        assert!(!status.connected);
        assert!(status.status_code.is_none());
        assert!(status.error.is_some());
    }
}
