//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::policy::{
    ContentSecurityPolicyConfiguration, CrossDomainPolicy, HstsConfiguration,
    PermittedCrossDomainPolicyConfiguration, PublicKeyPinningConfiguration, XFrameOptionsConfiguration,
    XssConfiguration, XssMode,
};

/// Root configuration for the bundled server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener and request handling.
    pub server: ServerConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Security headers injected into every response.
    pub headers: SecureHeadersConfig,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Which security headers to emit, and the settings each one is built from.
///
/// A toggle that is on must have its settings object present; this is not
/// checked until the header is built (or by `validation::validate_config`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SecureHeadersConfig {
    pub use_hsts: bool,
    pub hsts: Option<HstsConfiguration>,

    pub use_hpkp: bool,
    pub hpkp: Option<PublicKeyPinningConfiguration>,

    pub use_x_frame_options: bool,
    pub x_frame_options: Option<XFrameOptionsConfiguration>,

    pub use_xss_protection: bool,
    pub xss_protection: Option<XssConfiguration>,

    /// Emits `X-Content-Type-Options: nosniff`; takes no settings.
    pub use_x_content_type_options: bool,

    pub use_content_security_policy: bool,
    pub content_security_policy: Option<ContentSecurityPolicyConfiguration>,

    pub use_permitted_cross_domain_policy: bool,
    pub permitted_cross_domain_policy: Option<PermittedCrossDomainPolicyConfiguration>,
}

impl SecureHeadersConfig {
    pub fn builder() -> SecureHeadersBuilder {
        SecureHeadersBuilder::default()
    }

    /// HSTS, DENY framing, blocking XSS filter, nosniff, a mixed-content CSP
    /// and no cross-domain policy files.
    pub fn recommended() -> Self {
        Self::builder()
            .use_hsts(HstsConfiguration::default())
            .use_x_frame_options(XFrameOptionsConfiguration::deny())
            .use_xss_protection(XssConfiguration::new(XssMode::Block))
            .use_content_type_options()
            .use_content_security_policy(
                ContentSecurityPolicyConfiguration::new()
                    .block_all_mixed_content()
                    .upgrade_insecure_requests(),
            )
            .use_permitted_cross_domain_policies(PermittedCrossDomainPolicyConfiguration::new(
                CrossDomainPolicy::None,
            ))
            .build()
    }
}

/// Fluent construction of a `SecureHeadersConfig`.
///
/// Every `use_*` method turns the toggle on and stores its settings together,
/// so a builder-made config never has a toggle without settings.
#[derive(Debug, Clone, Default)]
pub struct SecureHeadersBuilder {
    config: SecureHeadersConfig,
}

impl SecureHeadersBuilder {
    pub fn use_hsts(mut self, settings: HstsConfiguration) -> Self {
        self.config.use_hsts = true;
        self.config.hsts = Some(settings);
        self
    }

    pub fn use_hpkp(mut self, settings: PublicKeyPinningConfiguration) -> Self {
        self.config.use_hpkp = true;
        self.config.hpkp = Some(settings);
        self
    }

    pub fn use_x_frame_options(mut self, settings: XFrameOptionsConfiguration) -> Self {
        self.config.use_x_frame_options = true;
        self.config.x_frame_options = Some(settings);
        self
    }

    pub fn use_xss_protection(mut self, settings: XssConfiguration) -> Self {
        self.config.use_xss_protection = true;
        self.config.xss_protection = Some(settings);
        self
    }

    pub fn use_content_type_options(mut self) -> Self {
        self.config.use_x_content_type_options = true;
        self
    }

    pub fn use_content_security_policy(mut self, settings: ContentSecurityPolicyConfiguration) -> Self {
        self.config.use_content_security_policy = true;
        self.config.content_security_policy = Some(settings);
        self
    }

    pub fn use_permitted_cross_domain_policies(
        mut self,
        settings: PermittedCrossDomainPolicyConfiguration,
    ) -> Self {
        self.config.use_permitted_cross_domain_policy = true;
        self.config.permitted_cross_domain_policy = Some(settings);
        self
    }

    pub fn build(self) -> SecureHeadersConfig {
        self.config
    }
}
