//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every enabled header has settings that build a legal value
//! - Addresses parse and timeouts are non-zero
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{AppConfig, SecureHeadersConfig};
use crate::security::{HeaderError, HEADER_RULES};

/// A single semantic problem in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error(transparent)]
    Header(#[from] HeaderError),
}

/// Check every enabled header; unlike the injector this does not stop at the first failure.
pub fn validate_headers(config: &SecureHeadersConfig) -> Vec<ValidationError> {
    HEADER_RULES
        .iter()
        .filter(|rule| rule.is_enabled(config))
        .filter_map(|rule| rule.build_value(config).err())
        .map(ValidationError::from)
        .collect()
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.server.bind_address.clone()));
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    errors.extend(validate_headers(&config.headers));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
