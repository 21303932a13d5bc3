//! Graceful shutdown on `CancellationToken`

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Coordinates shutdown across the API server and background loops.
///
/// Cancelling the controller cancels every child token; a child can be
/// cancelled on its own without touching the parent.
#[derive(Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Controller that cancels itself on Ctrl+C
    pub fn with_ctrl_c() -> Self {
        let controller = Self::new();
        let token = controller.token.clone();

        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown...");
                    token.cancel();
                }
                Err(e) => {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
            }
        });

        controller
    }

    /// Token for one task; cancelled with the controller, or on its own
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }
}

/// Run `future` unless shutdown comes first.
///
/// `Some(result)` if the future completed, `None` if cancelled.
pub async fn run_until_shutdown<F, T>(token: &CancellationToken, future: F) -> Option<T>
where
    F: std::future::Future<Output = T>,
{
    tokio::select! {
        result = future => Some(result),
        _ = token.cancelled() => None,
    }
}
