//! X-Frame-Options value builder.

use serde::{Deserialize, Serialize};

use crate::policy::{absolute_uri, HeaderValueBuilder, PolicyError};

/// Framing policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum XFrameOption {
    #[default]
    Deny,
    SameOrigin,
    /// Obsolete in modern browsers; CSP frame-ancestors replaces it.
    AllowFrom,
}

/// X-Frame-Options settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct XFrameOptionsConfiguration {
    pub option: XFrameOption,

    /// Origin allowed to frame the page, only read for `allow-from`.
    pub allow_from: Option<String>,
}

impl XFrameOptionsConfiguration {
    pub fn deny() -> Self {
        Self::default()
    }

    pub fn same_origin() -> Self {
        Self {
            option: XFrameOption::SameOrigin,
            allow_from: None,
        }
    }

    pub fn allow_from(origin: impl Into<String>) -> Self {
        Self {
            option: XFrameOption::AllowFrom,
            allow_from: Some(origin.into()),
        }
    }
}

impl HeaderValueBuilder for XFrameOptionsConfiguration {
    fn build_header_value(&self) -> Result<String, PolicyError> {
        match self.option {
            XFrameOption::Deny => Ok("DENY".to_string()),
            XFrameOption::SameOrigin => Ok("SAMEORIGIN".to_string()),
            XFrameOption::AllowFrom => {
                let origin = self
                    .allow_from
                    .as_deref()
                    .filter(|o| !o.trim().is_empty())
                    .ok_or(PolicyError::MissingAllowFrom)?;
                absolute_uri("allow_from", origin)?;
                Ok(format!("ALLOW-FROM {}", origin))
            }
        }
    }
}
