//! HTTP server infrastructure for CallTrack
//!
//! The API runs behind an [`HttpServer`] implementing the [`Server`] trait.
//! [`ServerExt`] adds `spawn()` and `run_with_ctrl_c()`. Shutdown is
//! coordinated through `tokio_util`'s `CancellationToken`.
//!
//! # Quick Start
//!
//! ```ignore
//! use server::{HttpLayers, HttpServer, ServerConfig, ServerExt};
//!
//! let server = HttpServer::new(ServerConfig::default(), router)
//!     .with_layers(&HttpLayers::new().with_permissive_cors());
//! server.run_with_ctrl_c().await?;
//! ```
//!
//! # Modules
//!
//! - [`config`] - Bind configuration and default ports
//! - [`traits`] - `Server` and `ServerExt`
//! - [`http`] - Axum server
//! - [`middleware`] - Tracing, CORS and metrics layers
//! - [`health`] - Health handler and outbound probe client
//! - [`shutdown`] - Graceful shutdown
//! - [`port_validator`] - Startup port checks

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod middleware;
pub mod port_validator;
pub mod shutdown;
pub mod traits;

pub use config::{ports, ServerConfig};
pub use error::{Result, ServerError};
pub use health::{ConnectionStatus, HealthClient};
pub use http::HttpServer;
pub use middleware::HttpLayers;
pub use port_validator::{validate_port_available, validate_port_range};
pub use shutdown::{run_until_shutdown, ShutdownController};
pub use traits::{Server, ServerExt};
