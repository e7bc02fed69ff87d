//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the bundled handlers
//! - Wire up middleware (tracing, request ID, timeout, security headers)
//! - Apply reloaded header configuration
//! - Bind server to listener and shut down gracefully

use std::time::Duration;

use axum::{middleware::from_fn_with_state, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::middleware::{secure_headers_middleware, SecureHeadersState};
use crate::observability::metrics;

/// HTTP server serving the bundled app behind the security headers middleware.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
    headers: SecureHeadersState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        let headers = SecureHeadersState::new(config.headers.clone());
        let router = Self::build_router(&config, headers.clone());
        Self {
            router,
            config,
            headers,
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &AppConfig, headers: SecureHeadersState) -> Router {
        let routes = Router::new()
            .route("/", get(index_handler))
            .route("/health", get(health_handler));
        Self::layered(routes, config, headers)
    }

    /// Wrap `routes` in the middleware stack.
    ///
    /// The security headers sit outside the timeout so a 408 carries them too.
    #[allow(deprecated)]
    fn layered(routes: Router, config: &AppConfig, headers: SecureHeadersState) -> Router {
        routes
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
            .layer(from_fn_with_state(headers, secure_headers_middleware))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Handle used to swap the header configuration at runtime.
    pub fn headers_state(&self) -> SecureHeadersState {
        self.headers.clone()
    }

    /// Apply every configuration received on `updates` until the sender is dropped.
    ///
    /// Only the `[headers]` section takes effect at runtime; changes to the
    /// other sections are logged and need a restart.
    pub fn spawn_reloader(&self, mut updates: mpsc::UnboundedReceiver<AppConfig>) -> tokio::task::JoinHandle<()> {
        let headers = self.headers.clone();
        let running = self.config.clone();
        tokio::spawn(async move {
            while let Some(new_config) = updates.recv().await {
                for section in restart_only_changes(&running, &new_config) {
                    tracing::warn!(section, "Reloaded config changes a section that only applies at startup; restart to apply it");
                }
                headers.replace(new_config.headers);
                metrics::record_reload("applied");
                tracing::info!("Security headers configuration reloaded");
            }
        })
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// Sections of `new` that differ from `running` but are not hot-reloaded.
fn restart_only_changes(running: &AppConfig, new: &AppConfig) -> Vec<&'static str> {
    let mut changed = Vec::new();
    if running.server != new.server {
        changed.push("server");
    }
    if running.observability != new.observability {
        changed.push("observability");
    }
    changed
}

async fn index_handler() -> impl IntoResponse {
    "secure-headers"
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
