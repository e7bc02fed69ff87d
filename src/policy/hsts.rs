//! Strict-Transport-Security value builder.

use serde::{Deserialize, Serialize};

use crate::policy::{HeaderValueBuilder, PolicyError};

/// Minimum max-age accepted by browser preload lists (one year).
pub const PRELOAD_MIN_MAX_AGE: u64 = 31_536_000;

/// HSTS settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HstsConfiguration {
    /// Seconds the client should remember to use HTTPS only.
    pub max_age: u64,

    /// Apply the policy to every subdomain as well.
    pub include_sub_domains: bool,

    /// Opt in to browser preload lists.
    pub preload: bool,
}

impl Default for HstsConfiguration {
    fn default() -> Self {
        Self {
            max_age: 63_072_000, // two years
            include_sub_domains: true,
            preload: false,
        }
    }
}

impl HstsConfiguration {
    pub fn new(max_age: u64, include_sub_domains: bool) -> Self {
        Self {
            max_age,
            include_sub_domains,
            preload: false,
        }
    }

    pub fn with_preload(mut self) -> Self {
        self.preload = true;
        self
    }
}

impl HeaderValueBuilder for HstsConfiguration {
    fn build_header_value(&self) -> Result<String, PolicyError> {
        if self.preload && (!self.include_sub_domains || self.max_age < PRELOAD_MIN_MAX_AGE) {
            return Err(PolicyError::InvalidPreload {
                max_age: self.max_age,
                min_max_age: PRELOAD_MIN_MAX_AGE,
            });
        }

        let mut value = format!("max-age={}", self.max_age);
        if self.include_sub_domains {
            value.push_str("; includeSubDomains");
        }
        if self.preload {
            value.push_str("; preload");
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_value() {
        let value = HstsConfiguration::default().build_header_value().unwrap();
        assert_eq!(value, "max-age=63072000; includeSubDomains");
    }

    #[test]
    fn test_without_subdomains() {
        let value = HstsConfiguration::new(3600, false).build_header_value().unwrap();
        assert_eq!(value, "max-age=3600");
    }

    #[test]
    fn test_preload() {
        let value = HstsConfiguration::new(PRELOAD_MIN_MAX_AGE, true)
            .with_preload()
            .build_header_value()
            .unwrap();
        assert_eq!(value, "max-age=31536000; includeSubDomains; preload");
    }

    #[test]
    fn test_preload_rejects_short_max_age() {
        let err = HstsConfiguration::new(600, true)
            .with_preload()
            .build_header_value()
            .unwrap_err();
        assert!(matches!(err, PolicyError::InvalidPreload { max_age: 600, .. }));
    }

    #[test]
    fn test_preload_requires_subdomains() {
        let result = HstsConfiguration::new(PRELOAD_MIN_MAX_AGE, false)
            .with_preload()
            .build_header_value();
        assert!(result.is_err());
    }
}
