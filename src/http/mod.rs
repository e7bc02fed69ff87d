//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, request ID, timeout)
//!     → middleware/secure_headers.rs (build headers from current snapshot)
//!     → handler
//!     → middleware/secure_headers.rs (append headers)
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{secure_headers_middleware, SecureHeadersState};
pub use server::HttpServer;
