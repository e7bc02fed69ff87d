//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Injector, middleware and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters per header)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Metrics go through the `metrics` facade; with no recorder installed they are no-ops

pub mod logging;
pub mod metrics;
