//! Security Headers Middleware.
//! Appends the configured security headers to every response.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::SecureHeadersConfig;
use crate::security::HeaderInjector;

/// State required by the middleware.
///
/// Holds the current configuration snapshot behind an `ArcSwap` so a reload
/// replaces it atomically. Each request works on the single snapshot it
/// loaded at the start.
#[derive(Clone)]
pub struct SecureHeadersState {
    config: Arc<ArcSwap<SecureHeadersConfig>>,
}

impl SecureHeadersState {
    pub fn new(config: SecureHeadersConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Injector bound to the snapshot current at call time.
    pub fn injector(&self) -> HeaderInjector {
        HeaderInjector::new(self.config.load_full())
    }

    /// Replace the snapshot seen by requests that start after this call.
    pub fn replace(&self, config: SecureHeadersConfig) {
        self.config.store(Arc::new(config));
    }
}

pub async fn secure_headers_middleware(
    State(state): State<SecureHeadersState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // 1. Build every header before the rest of the pipeline runs.
    let prepared = match state.injector().headers() {
        Ok(prepared) => prepared,
        Err(e) => {
            tracing::error!(
                header = e.header(),
                error = %e,
                path = %req.uri().path(),
                "Security headers could not be built"
            );
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        }
    };

    // 2. Run the rest of the pipeline, then append.
    let mut response = next.run(req).await;
    prepared.apply_to(&mut response);
    response
}
