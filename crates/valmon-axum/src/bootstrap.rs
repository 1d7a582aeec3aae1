//! Status server startup.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;
use valmon_core::ServerConfig;

use crate::routes::{STATUS_PATH, create_router};
use crate::state::AxumContext;

/// Where the status endpoint listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusServerConfig {
    pub bind: String,
    pub port: u16,
}

impl StatusServerConfig {
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            bind: config.status_bind.clone(),
            port: config.status_port,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Bind the listener without serving yet.
pub async fn bind(config: &StatusServerConfig) -> Result<TcpListener> {
    let addr = config.address();
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind status endpoint on {addr}"))
}

/// Serve on `listener` until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    ctx: AxumContext,
    shutdown: CancellationToken,
) -> Result<()> {
    let local: SocketAddr = listener.local_addr()?;
    info!("Status endpoint listening on http://{local}{STATUS_PATH}");

    axum::serve(listener, create_router(ctx))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Status endpoint stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_server_config() {
        let server = ServerConfig {
            status_bind: "127.0.0.1".to_string(),
            status_port: 9090,
            ..ServerConfig::default()
        };
        let config = StatusServerConfig::from_server_config(&server);
        assert_eq!(config.address(), "127.0.0.1:9090");
    }
}
