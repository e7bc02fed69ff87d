//! Public-Key-Pins value builder.
//!
//! HPKP is deprecated by every major browser; it is kept for deployments that
//! still pin against legacy clients.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::policy::{absolute_uri, HeaderValueBuilder, PolicyError};

const SHA256_DIGEST_LEN: usize = 32;

/// HPKP settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PublicKeyPinningConfiguration {
    /// Base64 SHA-256 digests of the pinned SubjectPublicKeyInfo.
    pub pin_sha256: Vec<String>,

    /// Seconds the pins stay cached by the client.
    pub max_age: u64,

    pub include_sub_domains: bool,

    /// Where clients report pin validation failures.
    pub report_uri: Option<String>,
}

impl Default for PublicKeyPinningConfiguration {
    fn default() -> Self {
        Self {
            pin_sha256: Vec::new(),
            max_age: 10_000,
            include_sub_domains: false,
            report_uri: None,
        }
    }
}

impl PublicKeyPinningConfiguration {
    pub fn new<I, P>(pins: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            pin_sha256: pins.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

fn check_pin(pin: &str) -> Result<(), PolicyError> {
    let decoded = STANDARD.decode(pin).map_err(|e| PolicyError::InvalidPin {
        pin: pin.to_string(),
        reason: e.to_string(),
    })?;

    if decoded.len() != SHA256_DIGEST_LEN {
        return Err(PolicyError::InvalidPin {
            pin: pin.to_string(),
            reason: format!(
                "decodes to {} bytes, expected {}",
                decoded.len(),
                SHA256_DIGEST_LEN
            ),
        });
    }
    Ok(())
}

impl HeaderValueBuilder for PublicKeyPinningConfiguration {
    fn build_header_value(&self) -> Result<String, PolicyError> {
        if self.pin_sha256.is_empty() {
            return Err(PolicyError::MissingPins);
        }

        let mut parts = Vec::with_capacity(self.pin_sha256.len() + 3);
        for pin in &self.pin_sha256 {
            check_pin(pin)?;
            parts.push(format!("pin-sha256=\"{}\"", pin));
        }

        parts.push(format!("max-age={}", self.max_age));
        if self.include_sub_domains {
            parts.push("includeSubDomains".to_string());
        }
        if let Some(ref uri) = self.report_uri {
            absolute_uri("report_uri", uri)?;
            parts.push(format!("report-uri=\"{}\"", uri));
        }

        Ok(parts.join("; "))
    }
}
