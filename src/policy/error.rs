//! Errors raised while building header values.

use thiserror::Error;

/// A policy's settings cannot be turned into a header value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// HSTS preload list entries need includeSubDomains and a one year max-age.
    #[error("HSTS preload requires includeSubDomains and max-age >= {min_max_age} (got max-age={max_age})")]
    InvalidPreload { max_age: u64, min_max_age: u64 },

    /// Public-Key-Pins without any pin.
    #[error("Public-Key-Pins requires at least one pin-sha256 value")]
    MissingPins,

    /// A pin that is not the base64 encoding of a SHA-256 digest.
    #[error("invalid pin-sha256 value '{pin}': {reason}")]
    InvalidPin { pin: String, reason: String },

    /// X-Frame-Options ALLOW-FROM without an origin.
    #[error("X-Frame-Options ALLOW-FROM requires an allow_from origin")]
    MissingAllowFrom,

    /// X-XSS-Protection report mode without a report URI.
    #[error("X-XSS-Protection report mode requires a report_uri")]
    MissingReportUri,

    /// A URI field that does not parse as an absolute URL.
    #[error("invalid {field} '{uri}': {reason}")]
    InvalidUri {
        field: &'static str,
        uri: String,
        reason: String,
    },

    /// A CSP directive configured with an empty source list.
    #[error("CSP directive '{0}' has no sources")]
    EmptyDirective(&'static str),

    /// A CSP source that would break the directive grammar.
    #[error("CSP directive '{directive}' has invalid source '{source_expr}'")]
    InvalidSource {
        directive: &'static str,
        source_expr: String,
    },

    /// A CSP with nothing to emit.
    #[error("Content-Security-Policy has no directives")]
    EmptyPolicy,
}
