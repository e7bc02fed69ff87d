//! X-XSS-Protection value builder.

use serde::{Deserialize, Serialize};

use crate::policy::{absolute_uri, HeaderValueBuilder, PolicyError};

/// Browser XSS filter mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum XssMode {
    /// `0`
    Disabled,
    /// `1`
    Enabled,
    /// `1; mode=block`
    #[default]
    Block,
    /// `1; report=<uri>`
    Report,
}

/// X-XSS-Protection settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct XssConfiguration {
    pub mode: XssMode,

    /// Only read in `report` mode.
    pub report_uri: Option<String>,
}

impl XssConfiguration {
    pub fn new(mode: XssMode) -> Self {
        Self {
            mode,
            report_uri: None,
        }
    }

    pub fn report(uri: impl Into<String>) -> Self {
        Self {
            mode: XssMode::Report,
            report_uri: Some(uri.into()),
        }
    }
}

impl HeaderValueBuilder for XssConfiguration {
    fn build_header_value(&self) -> Result<String, PolicyError> {
        let value = match self.mode {
            XssMode::Disabled => "0".to_string(),
            XssMode::Enabled => "1".to_string(),
            XssMode::Block => "1; mode=block".to_string(),
            XssMode::Report => {
                let uri = self
                    .report_uri
                    .as_deref()
                    .ok_or(PolicyError::MissingReportUri)?;
                absolute_uri("report_uri", uri)?;
                format!("1; report={}", uri)
            }
        };
        Ok(value)
    }
}
