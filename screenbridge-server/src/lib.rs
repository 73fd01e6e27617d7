pub mod config;
pub mod room;
pub mod signaling;

pub use config::*;
pub use room::*;
pub use signaling::*;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Routes of the relay: the signaling socket and a health check.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// A bound, not yet serving, relay.
pub struct RelayServer {
    listener: TcpListener,
    state: AppState,
}

impl RelayServer {
    pub async fn bind(config: RelayConfig) -> Result<Self> {
        let listener = TcpListener::bind(config.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

        let connections = Connections::new();
        let relay = SignalingRelay::new(config, Arc::new(connections.clone()));

        Ok(Self {
            listener,
            state: AppState { relay, connections },
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn relay(&self) -> &SignalingRelay {
        &self.state.relay
    }

    /// Serves until the listener fails. The expiry sweep runs alongside.
    pub async fn run(self) -> Result<()> {
        let addr = self.local_addr()?;
        let sweeper = spawn_sweeper(
            self.state.relay.clone(),
            self.state.relay.config().sweep_interval,
        );

        info!("Relay listening on {}", addr);
        let result = axum::serve(self.listener, router(self.state))
            .await
            .context("Relay server stopped");

        sweeper.abort();
        result
    }
}

/// Binds and serves a relay with `config`.
pub async fn serve(config: RelayConfig) -> Result<()> {
    RelayServer::bind(config).await?.run().await
}
