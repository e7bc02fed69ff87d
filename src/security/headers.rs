//! Security response header injection.
//!
//! # Responsibilities
//! - Walk the fixed rule table once per request
//! - Build each enabled header's value from its settings object
//! - Append (never replace) the header on the response
//! - Hand the response to the rest of the pipeline
//!
//! # Design Decisions
//! - Rule order is fixed so output is deterministic
//! - First failing rule stops the walk; the continuation is not called
//! - Configuration is shared read-only via `Arc`, the response is owned per call

use std::future::Future;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue, Response};
use thiserror::Error;

use crate::config::SecureHeadersConfig;
use crate::observability::metrics;
use crate::policy::{HeaderValueBuilder, PolicyError};

/// Value of `X-Content-Type-Options`.
pub const NOSNIFF: &str = "nosniff";

/// A header could not be produced for the current request.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// Toggle on, settings object absent.
    #[error("{header} is enabled but has no settings")]
    MissingSettings { header: &'static str },

    #[error("failed to build {header} value: {source}")]
    Policy {
        header: &'static str,
        #[source]
        source: PolicyError,
    },

    /// The built string contains bytes not allowed in a header value.
    #[error("{header} value {value:?} is not a valid header value")]
    InvalidValue { header: &'static str, value: String },
}

impl HeaderError {
    /// Canonical name of the header that failed.
    pub fn header(&self) -> &'static str {
        match self {
            HeaderError::MissingSettings { header }
            | HeaderError::Policy { header, .. }
            | HeaderError::InvalidValue { header, .. } => header,
        }
    }
}

/// One row of the rule table: when to emit a header and how to build it.
pub struct HeaderRule {
    name: &'static str,
    wire_name: &'static str,
    enabled: fn(&SecureHeadersConfig) -> bool,
    value: fn(&SecureHeadersConfig) -> Result<String, HeaderError>,
}

impl HeaderRule {
    /// Canonical casing, e.g. `Strict-Transport-Security`.
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// Header names are case-insensitive; `http` stores them lowercase.
    pub fn header_name(&self) -> HeaderName {
        HeaderName::from_static(self.wire_name)
    }

    pub fn is_enabled(&self, config: &SecureHeadersConfig) -> bool {
        (self.enabled)(config)
    }

    pub fn build_value(&self, config: &SecureHeadersConfig) -> Result<HeaderValue, HeaderError> {
        let value = (self.value)(config)?;
        HeaderValue::from_str(&value).map_err(|_| HeaderError::InvalidValue {
            header: self.name,
            value,
        })
    }
}

impl std::fmt::Debug for HeaderRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderRule").field("name", &self.name).finish()
    }
}

fn build<T: HeaderValueBuilder>(header: &'static str, settings: Option<&T>) -> Result<String, HeaderError> {
    let settings = settings.ok_or(HeaderError::MissingSettings { header })?;
    settings
        .build_header_value()
        .map_err(|source| HeaderError::Policy { header, source })
}

fn hsts_value(c: &SecureHeadersConfig) -> Result<String, HeaderError> {
    build("Strict-Transport-Security", c.hsts.as_ref())
}

fn hpkp_value(c: &SecureHeadersConfig) -> Result<String, HeaderError> {
    build("Public-Key-Pins", c.hpkp.as_ref())
}

fn frame_options_value(c: &SecureHeadersConfig) -> Result<String, HeaderError> {
    build("X-Frame-Options", c.x_frame_options.as_ref())
}

fn xss_value(c: &SecureHeadersConfig) -> Result<String, HeaderError> {
    build("X-XSS-Protection", c.xss_protection.as_ref())
}

fn nosniff_value(_: &SecureHeadersConfig) -> Result<String, HeaderError> {
    Ok(NOSNIFF.to_string())
}

fn csp_value(c: &SecureHeadersConfig) -> Result<String, HeaderError> {
    build("Content-Security-Policy", c.content_security_policy.as_ref())
}

fn cross_domain_value(c: &SecureHeadersConfig) -> Result<String, HeaderError> {
    build(
        "X-Permitted-Cross-Domain-Policies",
        c.permitted_cross_domain_policy.as_ref(),
    )
}

/// Every header the injector knows, in emission order.
pub static HEADER_RULES: [HeaderRule; 7] = [
    HeaderRule {
        name: "Strict-Transport-Security",
        wire_name: "strict-transport-security",
        enabled: |c| c.use_hsts,
        value: hsts_value,
    },
    HeaderRule {
        name: "Public-Key-Pins",
        wire_name: "public-key-pins",
        enabled: |c| c.use_hpkp,
        value: hpkp_value,
    },
    HeaderRule {
        name: "X-Frame-Options",
        wire_name: "x-frame-options",
        enabled: |c| c.use_x_frame_options,
        value: frame_options_value,
    },
    HeaderRule {
        name: "X-XSS-Protection",
        wire_name: "x-xss-protection",
        enabled: |c| c.use_xss_protection,
        value: xss_value,
    },
    HeaderRule {
        name: "X-Content-Type-Options",
        wire_name: "x-content-type-options",
        enabled: |c| c.use_x_content_type_options,
        value: nosniff_value,
    },
    HeaderRule {
        name: "Content-Security-Policy",
        wire_name: "content-security-policy",
        enabled: |c| c.use_content_security_policy,
        value: csp_value,
    },
    HeaderRule {
        name: "X-Permitted-Cross-Domain-Policies",
        wire_name: "x-permitted-cross-domain-policies",
        enabled: |c| c.use_permitted_cross_domain_policy,
        value: cross_domain_value,
    },
];

/// Anything that carries an append-only, multi-value header collection.
pub trait HeaderSink {
    fn append_header(&mut self, name: HeaderName, value: HeaderValue);
}

impl HeaderSink for HeaderMap {
    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.append(name, value);
    }
}

impl<B> HeaderSink for Response<B> {
    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().append(name, value);
    }
}

/// Headers built ahead of the response they will be appended to.
#[derive(Debug, Clone, Default)]
pub struct PreparedHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl PreparedHeaders {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    /// Append every entry, in order, to `sink`.
    pub fn apply_to<R: HeaderSink + ?Sized>(self, sink: &mut R) {
        for (name, value) in self.entries {
            metrics::record_header_applied(name.as_str());
            sink.append_header(name, value);
        }
    }
}

/// Injects the configured security headers into responses.
///
/// Cloning is cheap; every clone shares one configuration snapshot.
#[derive(Debug, Clone)]
pub struct HeaderInjector {
    config: Arc<SecureHeadersConfig>,
}

impl HeaderInjector {
    pub fn new(config: impl Into<Arc<SecureHeadersConfig>>) -> Self {
        Self {
            config: config.into(),
        }
    }

    pub fn config(&self) -> &SecureHeadersConfig {
        &self.config
    }

    fn build(&self, rule: &HeaderRule) -> Result<HeaderValue, HeaderError> {
        rule.build_value(&self.config).inspect_err(|e| {
            tracing::warn!(header = rule.display_name(), error = %e, "Security header could not be built");
            metrics::record_injection_failure(rule.wire_name);
        })
    }

    /// Build every enabled header without touching a response.
    pub fn headers(&self) -> Result<PreparedHeaders, HeaderError> {
        let mut entries = Vec::with_capacity(HEADER_RULES.len());
        for rule in HEADER_RULES.iter().filter(|r| r.is_enabled(&self.config)) {
            entries.push((rule.header_name(), self.build(rule)?));
        }
        Ok(PreparedHeaders { entries })
    }

    /// Append every enabled header to `response`, in rule order.
    ///
    /// Stops at the first rule that fails; headers appended before it stay.
    /// Returns the number of headers appended.
    pub fn inject<R: HeaderSink + ?Sized>(&self, response: &mut R) -> Result<usize, HeaderError> {
        let mut appended = 0;
        for rule in HEADER_RULES.iter().filter(|r| r.is_enabled(&self.config)) {
            let value = self.build(rule)?;
            let name = rule.header_name();
            metrics::record_header_applied(name.as_str());
            response.append_header(name, value);
            appended += 1;
        }
        tracing::trace!(appended, "Security headers appended");
        Ok(appended)
    }

    /// Canonical name and value of every enabled header, in rule order.
    pub fn describe(&self) -> Result<Vec<(&'static str, String)>, HeaderError> {
        let mut described = Vec::new();
        for rule in HEADER_RULES.iter().filter(|r| r.is_enabled(&self.config)) {
            let value = self.build(rule)?;
            described.push((
                rule.display_name(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            ));
        }
        Ok(described)
    }

    /// Annotate `response`, then hand it to `next` and await the rest of the
    /// pipeline. Whatever `next` returns is passed back unchanged.
    pub async fn process<R, F, Fut, T, E>(&self, mut response: R, next: F) -> Result<T, E>
    where
        R: HeaderSink,
        F: FnOnce(R) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<HeaderError>,
    {
        self.inject(&mut response)?;
        next(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{
        ContentSecurityPolicyConfiguration, CrossDomainPolicy, HstsConfiguration,
        PermittedCrossDomainPolicyConfiguration, PublicKeyPinningConfiguration, XFrameOptionsConfiguration,
        XssConfiguration, XssMode,
    };
    use crate::policy::csp::CspDirective;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PIN: &str = "cUPcTAZWKaASuYWhhneDttWpY3oBAkE3h2+soZS7sWs=";

    fn all_settings() -> SecureHeadersConfig {
        SecureHeadersConfig {
            hsts: Some(HstsConfiguration::new(600, true)),
            hpkp: Some(PublicKeyPinningConfiguration::new([PIN])),
            x_frame_options: Some(XFrameOptionsConfiguration::same_origin()),
            xss_protection: Some(XssConfiguration::new(XssMode::Block)),
            content_security_policy: Some(
                ContentSecurityPolicyConfiguration::new().directive(CspDirective::DefaultSrc, ["self"]),
            ),
            permitted_cross_domain_policy: Some(PermittedCrossDomainPolicyConfiguration::new(
                CrossDomainPolicy::MasterOnly,
            )),
            ..Default::default()
        }
    }

    fn expected_values() -> [(&'static str, String); 7] {
        [
            ("strict-transport-security", "max-age=600; includeSubDomains".to_string()),
            ("public-key-pins", format!("pin-sha256=\"{}\"; max-age=10000", PIN)),
            ("x-frame-options", "SAMEORIGIN".to_string()),
            ("x-xss-protection", "1; mode=block".to_string()),
            ("x-content-type-options", "nosniff".to_string()),
            ("content-security-policy", "default-src 'self'".to_string()),
            ("x-permitted-cross-domain-policies", "master-only".to_string()),
        ]
    }

    fn set_toggles(config: &mut SecureHeadersConfig, mask: u8) {
        config.use_hsts = mask & 1 != 0;
        config.use_hpkp = mask & 2 != 0;
        config.use_x_frame_options = mask & 4 != 0;
        config.use_xss_protection = mask & 8 != 0;
        config.use_x_content_type_options = mask & 16 != 0;
        config.use_content_security_policy = mask & 32 != 0;
        config.use_permitted_cross_domain_policy = mask & 64 != 0;
    }

    #[test]
    fn test_every_toggle_combination() {
        let expected = expected_values();
        for mask in 0u8..128 {
            let mut config = all_settings();
            set_toggles(&mut config, mask);
            let injector = HeaderInjector::new(config);

            let mut headers = HeaderMap::new();
            let appended = injector.inject(&mut headers).unwrap();

            assert_eq!(appended, mask.count_ones() as usize, "mask {:#09b}", mask);
            assert_eq!(headers.len(), appended, "mask {:#09b}", mask);
            for (bit, (name, value)) in expected.iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    assert_eq!(headers.get(*name).unwrap(), value.as_str(), "mask {:#09b}", mask);
                } else {
                    assert!(!headers.contains_key(*name), "mask {:#09b}", mask);
                }
            }
        }
    }

    #[test]
    fn test_all_enabled_in_rule_order() {
        let mut config = all_settings();
        set_toggles(&mut config, 0x7f);
        let prepared = HeaderInjector::new(config).headers().unwrap();

        let names: Vec<_> = prepared.iter().map(|(n, _)| n.as_str().to_string()).collect();
        let expected: Vec<_> = expected_values().iter().map(|(n, _)| n.to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_nosniff_literal() {
        let config = SecureHeadersConfig::builder().use_content_type_options().build();
        let mut response = Response::new(());
        HeaderInjector::new(config).inject(&mut response).unwrap();
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers().len(), 1);
    }

    #[tokio::test]
    async fn test_all_off_still_calls_next_once() {
        let injector = HeaderInjector::new(all_settings());
        let calls = AtomicUsize::new(0);

        let result: Result<HeaderMap, HeaderError> = injector
            .process(HeaderMap::new(), |headers| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(headers) }
            })
            .await;

        assert!(result.unwrap().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_next_sees_all_headers() {
        let mut config = all_settings();
        set_toggles(&mut config, 0x7f);
        let injector = HeaderInjector::new(config);

        let seen = injector
            .process(HeaderMap::new(), |headers| async move { Ok::<_, HeaderError>(headers.len()) })
            .await
            .unwrap();
        assert_eq!(seen, 7);
    }

    #[tokio::test]
    async fn test_next_error_passes_through() {
        #[derive(Debug, PartialEq)]
        enum Downstream {
            Headers,
            Failed(&'static str),
        }
        impl From<HeaderError> for Downstream {
            fn from(_: HeaderError) -> Self {
                Downstream::Headers
            }
        }

        let injector = HeaderInjector::new(SecureHeadersConfig::recommended());
        let result: Result<(), Downstream> = injector
            .process(HeaderMap::new(), |_| async { Err(Downstream::Failed("boom")) })
            .await;
        assert_eq!(result, Err(Downstream::Failed("boom")));
    }

    #[tokio::test]
    async fn test_builder_failure_stops_processing() {
        let mut config = all_settings();
        set_toggles(&mut config, 0x7f);
        config.hpkp = Some(PublicKeyPinningConfiguration::default()); // no pins
        let injector = HeaderInjector::new(config);
        let calls = AtomicUsize::new(0);

        let mut headers = HeaderMap::new();
        let err = injector.inject(&mut headers).unwrap_err();
        assert!(matches!(
            err,
            HeaderError::Policy {
                header: "Public-Key-Pins",
                source: PolicyError::MissingPins
            }
        ));
        // HSTS came first and stays; nothing after HPKP was processed.
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("strict-transport-security"));
        assert!(!headers.contains_key("x-frame-options"));

        let result: Result<(), HeaderError> = injector
            .process(HeaderMap::new(), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_settings() {
        let config = SecureHeadersConfig {
            use_x_frame_options: true,
            ..Default::default()
        };
        let err = HeaderInjector::new(config).headers().unwrap_err();
        assert!(matches!(err, HeaderError::MissingSettings { header: "X-Frame-Options" }));
        assert_eq!(err.header(), "X-Frame-Options");
    }

    #[test]
    fn test_appends_to_existing_header() {
        let config = SecureHeadersConfig::builder()
            .use_x_frame_options(XFrameOptionsConfiguration::deny())
            .build();
        let mut headers = HeaderMap::new();
        headers.insert("x-frame-options", HeaderValue::from_static("SAMEORIGIN"));

        HeaderInjector::new(config).inject(&mut headers).unwrap();

        let values: Vec<_> = headers.get_all("x-frame-options").iter().collect();
        assert_eq!(values, ["SAMEORIGIN", "DENY"]);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let injector = HeaderInjector::new(SecureHeadersConfig::recommended());
        let mut first = HeaderMap::new();
        let mut second = HeaderMap::new();
        injector.inject(&mut first).unwrap();
        injector.inject(&mut second).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn test_describe_uses_canonical_names() {
        let config = SecureHeadersConfig::builder()
            .use_content_type_options()
            .use_hsts(HstsConfiguration::new(60, false))
            .build();
        let described = HeaderInjector::new(config).describe().unwrap();
        assert_eq!(
            described,
            vec![
                ("Strict-Transport-Security", "max-age=60".to_string()),
                ("X-Content-Type-Options", "nosniff".to_string()),
            ]
        );
    }

    #[test]
    fn test_rule_names() {
        for rule in HEADER_RULES.iter() {
            assert_eq!(rule.header_name().as_str(), rule.display_name().to_ascii_lowercase());
        }
    }
}
