//! Port checks before binding
//!
//! Checking then binding races with other processes; the real bind is the
//! source of truth. This only gives early feedback at startup.

use tokio::net::TcpListener;
use tracing::{debug, error, warn};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};

/// Reject port 0 and warn on privileged ports
pub fn validate_port_range(port: u16) -> Result<()> {
    if port == 0 {
        return Err(ServerError::ConfigError(
            "Port cannot be 0 (ephemeral port assignment not supported for explicit binding)"
                .to_string(),
        ));
    }
    if port < 1024 {
        warn!(port, "Privileged port (requires root/admin privileges)");
    }
    Ok(())
}

/// Check that the configured HTTP port can be bound
pub async fn validate_port_available(config: &ServerConfig) -> Result<()> {
    validate_port_range(config.http_port)?;

    let addr = config.http_addr()?;
    debug!(%addr, "Checking HTTP port");

    match TcpListener::bind(addr).await {
        Ok(listener) => {
            drop(listener);
            debug!(%addr, "HTTP port is available");
            Ok(())
        }
        Err(e) => {
            error!(%addr, "HTTP port is NOT available: {}", e);
            Err(ServerError::port_in_use(config.http_port, e.to_string()))
        }
    }
}
