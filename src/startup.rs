//! Application startup and lifecycle management.

use crate::config::GatewayConfig;
use crate::error::AppError;
use crate::handlers::{generate, health_check};
use crate::services::{AgentProvider, CursorAgentProvider};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state. Nothing here is mutable; each request owns its
/// own subprocess and buffers.
#[derive(Clone)]
pub struct AppState {
    pub config: GatewayConfig,
    pub agent: Arc<dyn AgentProvider>,
}

/// Build the router. Exposed so tests can drive handlers with a mock agent.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1beta/models/:model", post(generate))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let agent: Arc<dyn AgentProvider> =
            Arc::new(CursorAgentProvider::new(config.agent.clone()));
        tracing::info!(
            command = %config.agent.command,
            timeout_secs = config.agent.timeout.as_secs(),
            "Initialized cursor agent provider"
        );

        let state = AppState {
            config: config.clone(),
            agent,
        };

        // Bind HTTP listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Gateway listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped or signalled.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = router(self.state);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
