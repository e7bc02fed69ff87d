//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (walk rule table, build values, append headers)
//!     → layer.rs (tower Service wrapper around any inner service)
//!     → Send to client
//! ```
//!
//! # Design Decisions
//! - Fail closed: a header that cannot be built fails the request
//! - Append only: existing response headers are never read or removed
//! - One immutable configuration snapshot per request

pub mod headers;
pub mod layer;

pub use headers::{HeaderError, HeaderInjector, HeaderRule, HeaderSink, PreparedHeaders, HEADER_RULES, NOSNIFF};
pub use layer::{SecureHeadersLayer, SecureHeadersService};
