//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router answering every method on every path
//! - Wire up middleware (tracing)
//! - Bind server to listener
//! - Run one cluster check per request and render its verdict

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::CheckConfig;
use crate::health::{CheckPolicy, ClusterCheck};
use crate::session::SessionConnector;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub check: ClusterCheck,
}

/// HTTP server for the cluster check.
pub struct HttpServer {
    router: Router,
    config: CheckConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: CheckConfig, connector: Arc<dyn SessionConnector>) -> Self {
        let policy = Arc::new(CheckPolicy::from(&config));
        let state = AppState {
            check: ClusterCheck::new(policy, connector),
        };

        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(check_handler))
            .route("/{*path}", any(check_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            database = %self.config.database.host,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }
}

/// Runs a fresh check for every request, whatever the method or path.
async fn check_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.check.run().await
}
