//! Axum middleware functions.

pub mod secure_headers;

pub use secure_headers::{secure_headers_middleware, SecureHeadersState};
