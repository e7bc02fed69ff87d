//! Security Response Headers Library
//!
//! Appends OWASP-recommended security headers (HSTS, HPKP, X-Frame-Options,
//! X-XSS-Protection, X-Content-Type-Options, Content-Security-Policy,
//! X-Permitted-Cross-Domain-Policies) to HTTP responses, driven by an
//! immutable configuration snapshot.

pub mod config;
pub mod http;
pub mod observability;
pub mod policy;
pub mod security;

pub use config::schema::{AppConfig, SecureHeadersConfig};
pub use http::{secure_headers_middleware, HttpServer, SecureHeadersState};
pub use security::{HeaderError, HeaderInjector, SecureHeadersLayer};
