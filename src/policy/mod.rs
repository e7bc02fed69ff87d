//! Header value builders.
//!
//! # Data Flow
//! ```text
//! SecureHeadersConfig (one settings object per policy)
//!     → HeaderValueBuilder::build_header_value()
//!     → finished header string
//!     → security::headers (appends it to the response)
//! ```
//!
//! # Design Decisions
//! - Each builder only serializes its own settings; no cross-policy checks
//! - Builders are pure: same settings, same string
//! - Malformed settings surface as `PolicyError`, never as a silently dropped header

pub mod cross_domain;
pub mod csp;
pub mod error;
pub mod frame_options;
pub mod hpkp;
pub mod hsts;
pub mod xss;

pub use cross_domain::{CrossDomainPolicy, PermittedCrossDomainPolicyConfiguration};
pub use csp::{ContentSecurityPolicyConfiguration, CspDirective, CspSource};
pub use error::PolicyError;
pub use frame_options::{XFrameOption, XFrameOptionsConfiguration};
pub use hpkp::PublicKeyPinningConfiguration;
pub use hsts::HstsConfiguration;
pub use xss::{XssConfiguration, XssMode};

/// Serializes a policy's settings into the exact string its header carries.
pub trait HeaderValueBuilder {
    fn build_header_value(&self) -> Result<String, PolicyError>;
}

/// Parse a URI that must be absolute (scheme + host).
///
/// The raw text is emitted as-is by the builders, so anything that could end
/// a directive or a quoted string is rejected before parsing.
pub(crate) fn absolute_uri(field: &'static str, raw: &str) -> Result<url::Url, PolicyError> {
    if let Some(c) = raw
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || matches!(c, ';' | ',' | '"' | '\''))
    {
        return Err(PolicyError::InvalidUri {
            field,
            uri: raw.to_string(),
            reason: format!("contains forbidden character {:?}", c),
        });
    }

    let parsed = url::Url::parse(raw).map_err(|e| PolicyError::InvalidUri {
        field,
        uri: raw.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(PolicyError::InvalidUri {
            field,
            uri: raw.to_string(),
            reason: "expected an absolute URL with a host".to_string(),
        });
    }

    Ok(parsed)
}
