//! X-Permitted-Cross-Domain-Policies value builder.

use serde::{Deserialize, Serialize};

use crate::policy::{HeaderValueBuilder, PolicyError};

/// Which cross-domain policy files Flash/PDF clients may honour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrossDomainPolicy {
    #[default]
    None,
    MasterOnly,
    ByContentType,
    ByFtpFilename,
    All,
}

impl CrossDomainPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossDomainPolicy::None => "none",
            CrossDomainPolicy::MasterOnly => "master-only",
            CrossDomainPolicy::ByContentType => "by-content-type",
            CrossDomainPolicy::ByFtpFilename => "by-ftp-filename",
            CrossDomainPolicy::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PermittedCrossDomainPolicyConfiguration {
    pub policy: CrossDomainPolicy,
}

impl PermittedCrossDomainPolicyConfiguration {
    pub fn new(policy: CrossDomainPolicy) -> Self {
        Self { policy }
    }
}

impl HeaderValueBuilder for PermittedCrossDomainPolicyConfiguration {
    fn build_header_value(&self) -> Result<String, PolicyError> {
        Ok(self.policy.as_str().to_string())
    }
}
