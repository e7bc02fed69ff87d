//! Content-Security-Policy value builder.
//!
//! # Responsibilities
//! - Hold the source lists for the fetch/navigation directives
//! - Quote keyword and hash/nonce sources, pass hosts and schemes through
//! - Emit directives in one fixed order so equal settings give equal strings
//!
//! # Design Decisions
//! - Sources are parsed from plain strings so TOML stays readable
//!   (`default_src = ["self", "https://cdn.example.com"]`)
//! - Characters that would end a directive early are rejected, not escaped

use serde::{Deserialize, Serialize};

use crate::policy::{absolute_uri, HeaderValueBuilder, PolicyError};

const KEYWORDS: &[&str] = &[
    "self",
    "none",
    "unsafe-inline",
    "unsafe-eval",
    "unsafe-hashes",
    "strict-dynamic",
    "report-sample",
    "wasm-unsafe-eval",
];

const QUOTED_PREFIXES: &[&str] = &["nonce-", "sha256-", "sha384-", "sha512-"];

/// One entry of a CSP source list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum CspSource {
    /// Emitted single-quoted, e.g. `'self'`.
    Keyword(String),
    /// Host, scheme or path source, emitted verbatim.
    Host(String),
}

impl CspSource {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let unquoted = trimmed
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''));

        match unquoted {
            Some(inner) => CspSource::Keyword(inner.to_string()),
            None if KEYWORDS.contains(&trimmed)
                || QUOTED_PREFIXES.iter().any(|p| trimmed.starts_with(p)) =>
            {
                CspSource::Keyword(trimmed.to_string())
            }
            None => CspSource::Host(trimmed.to_string()),
        }
    }

    fn raw(&self) -> &str {
        match self {
            CspSource::Keyword(k) => k,
            CspSource::Host(h) => h,
        }
    }

    fn render(&self) -> String {
        match self {
            CspSource::Keyword(k) => format!("'{}'", k),
            CspSource::Host(h) => h.clone(),
        }
    }
}

impl From<String> for CspSource {
    fn from(raw: String) -> Self {
        CspSource::parse(&raw)
    }
}

impl From<&str> for CspSource {
    fn from(raw: &str) -> Self {
        CspSource::parse(raw)
    }
}

impl From<CspSource> for String {
    fn from(source: CspSource) -> Self {
        source.render()
    }
}

/// Directives that take a source list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CspDirective {
    DefaultSrc,
    ScriptSrc,
    StyleSrc,
    ImgSrc,
    ConnectSrc,
    FontSrc,
    ObjectSrc,
    MediaSrc,
    FrameSrc,
    ChildSrc,
    WorkerSrc,
    ManifestSrc,
    FrameAncestors,
    BaseUri,
    FormAction,
}

impl CspDirective {
    /// Emission order.
    pub const ALL: [CspDirective; 15] = [
        CspDirective::DefaultSrc,
        CspDirective::ScriptSrc,
        CspDirective::StyleSrc,
        CspDirective::ImgSrc,
        CspDirective::ConnectSrc,
        CspDirective::FontSrc,
        CspDirective::ObjectSrc,
        CspDirective::MediaSrc,
        CspDirective::FrameSrc,
        CspDirective::ChildSrc,
        CspDirective::WorkerSrc,
        CspDirective::ManifestSrc,
        CspDirective::FrameAncestors,
        CspDirective::BaseUri,
        CspDirective::FormAction,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CspDirective::DefaultSrc => "default-src",
            CspDirective::ScriptSrc => "script-src",
            CspDirective::StyleSrc => "style-src",
            CspDirective::ImgSrc => "img-src",
            CspDirective::ConnectSrc => "connect-src",
            CspDirective::FontSrc => "font-src",
            CspDirective::ObjectSrc => "object-src",
            CspDirective::MediaSrc => "media-src",
            CspDirective::FrameSrc => "frame-src",
            CspDirective::ChildSrc => "child-src",
            CspDirective::WorkerSrc => "worker-src",
            CspDirective::ManifestSrc => "manifest-src",
            CspDirective::FrameAncestors => "frame-ancestors",
            CspDirective::BaseUri => "base-uri",
            CspDirective::FormAction => "form-action",
        }
    }
}

/// Content-Security-Policy settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentSecurityPolicyConfiguration {
    pub block_all_mixed_content: bool,
    pub upgrade_insecure_requests: bool,

    pub default_src: Option<Vec<CspSource>>,
    pub script_src: Option<Vec<CspSource>>,
    pub style_src: Option<Vec<CspSource>>,
    pub img_src: Option<Vec<CspSource>>,
    pub connect_src: Option<Vec<CspSource>>,
    pub font_src: Option<Vec<CspSource>>,
    pub object_src: Option<Vec<CspSource>>,
    pub media_src: Option<Vec<CspSource>>,
    pub frame_src: Option<Vec<CspSource>>,
    pub child_src: Option<Vec<CspSource>>,
    pub worker_src: Option<Vec<CspSource>>,
    pub manifest_src: Option<Vec<CspSource>>,
    pub frame_ancestors: Option<Vec<CspSource>>,
    pub base_uri: Option<Vec<CspSource>>,
    pub form_action: Option<Vec<CspSource>>,

    /// MIME types for `plugin-types`.
    pub plugin_types: Option<Vec<String>>,

    /// Sandbox flags; an empty list emits a bare `sandbox`.
    pub sandbox: Option<Vec<String>>,

    pub report_uri: Option<String>,
}

impl ContentSecurityPolicyConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_all_mixed_content(mut self) -> Self {
        self.block_all_mixed_content = true;
        self
    }

    pub fn upgrade_insecure_requests(mut self) -> Self {
        self.upgrade_insecure_requests = true;
        self
    }

    /// Set the source list of one directive, replacing any previous list.
    pub fn directive<I, S>(mut self, directive: CspDirective, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CspSource>,
    {
        *self.sources_mut(directive) = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    pub fn sandbox<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sandbox = Some(flags.into_iter().map(Into::into).collect());
        self
    }

    pub fn report_uri(mut self, uri: impl Into<String>) -> Self {
        self.report_uri = Some(uri.into());
        self
    }

    pub fn sources(&self, directive: CspDirective) -> Option<&Vec<CspSource>> {
        match directive {
            CspDirective::DefaultSrc => self.default_src.as_ref(),
            CspDirective::ScriptSrc => self.script_src.as_ref(),
            CspDirective::StyleSrc => self.style_src.as_ref(),
            CspDirective::ImgSrc => self.img_src.as_ref(),
            CspDirective::ConnectSrc => self.connect_src.as_ref(),
            CspDirective::FontSrc => self.font_src.as_ref(),
            CspDirective::ObjectSrc => self.object_src.as_ref(),
            CspDirective::MediaSrc => self.media_src.as_ref(),
            CspDirective::FrameSrc => self.frame_src.as_ref(),
            CspDirective::ChildSrc => self.child_src.as_ref(),
            CspDirective::WorkerSrc => self.worker_src.as_ref(),
            CspDirective::ManifestSrc => self.manifest_src.as_ref(),
            CspDirective::FrameAncestors => self.frame_ancestors.as_ref(),
            CspDirective::BaseUri => self.base_uri.as_ref(),
            CspDirective::FormAction => self.form_action.as_ref(),
        }
    }

    fn sources_mut(&mut self, directive: CspDirective) -> &mut Option<Vec<CspSource>> {
        match directive {
            CspDirective::DefaultSrc => &mut self.default_src,
            CspDirective::ScriptSrc => &mut self.script_src,
            CspDirective::StyleSrc => &mut self.style_src,
            CspDirective::ImgSrc => &mut self.img_src,
            CspDirective::ConnectSrc => &mut self.connect_src,
            CspDirective::FontSrc => &mut self.font_src,
            CspDirective::ObjectSrc => &mut self.object_src,
            CspDirective::MediaSrc => &mut self.media_src,
            CspDirective::FrameSrc => &mut self.frame_src,
            CspDirective::ChildSrc => &mut self.child_src,
            CspDirective::WorkerSrc => &mut self.worker_src,
            CspDirective::ManifestSrc => &mut self.manifest_src,
            CspDirective::FrameAncestors => &mut self.frame_ancestors,
            CspDirective::BaseUri => &mut self.base_uri,
            CspDirective::FormAction => &mut self.form_action,
        }
    }
}

fn check_token(directive: &'static str, token: &str) -> Result<(), PolicyError> {
    let broken = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == ';' || c == ',' || c == '\'');
    if broken {
        return Err(PolicyError::InvalidSource {
            directive,
            source_expr: token.to_string(),
        });
    }
    Ok(())
}

fn token_list(directive: &'static str, tokens: &[String]) -> Result<String, PolicyError> {
    if tokens.is_empty() {
        return Err(PolicyError::EmptyDirective(directive));
    }
    for token in tokens {
        check_token(directive, token)?;
    }
    Ok(format!("{} {}", directive, tokens.join(" ")))
}

impl HeaderValueBuilder for ContentSecurityPolicyConfiguration {
    fn build_header_value(&self) -> Result<String, PolicyError> {
        let mut directives = Vec::new();

        if self.block_all_mixed_content {
            directives.push("block-all-mixed-content".to_string());
        }
        if self.upgrade_insecure_requests {
            directives.push("upgrade-insecure-requests".to_string());
        }

        for directive in CspDirective::ALL {
            let Some(sources) = self.sources(directive) else {
                continue;
            };
            let name = directive.name();
            if sources.is_empty() {
                return Err(PolicyError::EmptyDirective(name));
            }

            let mut rendered = Vec::with_capacity(sources.len());
            for source in sources {
                check_token(name, source.raw())?;
                rendered.push(source.render());
            }
            directives.push(format!("{} {}", name, rendered.join(" ")));
        }

        if let Some(ref types) = self.plugin_types {
            directives.push(token_list("plugin-types", types)?);
        }

        if let Some(ref flags) = self.sandbox {
            if flags.is_empty() {
                directives.push("sandbox".to_string());
            } else {
                directives.push(token_list("sandbox", flags)?);
            }
        }

        if let Some(ref uri) = self.report_uri {
            absolute_uri("report_uri", uri)?;
            directives.push(format!("report-uri {}", uri));
        }

        if directives.is_empty() {
            return Err(PolicyError::EmptyPolicy);
        }

        Ok(directives.join("; "))
    }
}
