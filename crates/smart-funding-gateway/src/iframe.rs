//! Validation and rendering for the remember-funding iframe.
//!
//! [`IframeGateway::handle`] is framework-free: it takes the incoming
//! cookies and query, and returns either a rejection or everything the HTTP
//! layer needs to build the response.

use funding::{Clock, CookieMap, FundingMemory, FundingSource, ResponseCookies};
use serde::Deserialize;

use crate::allowlist::AllowList;
use crate::csp::ContentSecurityPolicy;
use crate::error::GatewayError;
use crate::meta::{MetaUnpacker, SdkLoader};
use crate::nonce::NonceSource;
use crate::validation::{is_valid_origin, parse_funding_sources};

/// Query parameters of `GET /smart/funding/remember`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RememberQuery {
    pub domain: Option<String>,
    #[serde(rename = "fundingSources")]
    pub funding_sources: Option<String>,
    #[serde(rename = "sdkMeta")]
    pub sdk_meta: Option<String>,
    #[serde(rename = "clientID")]
    pub client_id: Option<String>,
}

/// A request that passed every check.
#[derive(Debug, Clone)]
pub struct ValidatedRemember {
    pub client_id: String,
    pub domain: String,
    pub funding_sources: Vec<FundingSource>,
    pub sdk_loader: SdkLoader,
}

/// Everything the HTTP layer needs for a 200 response.
#[derive(Debug, Clone)]
pub struct RememberOutcome {
    pub client_id: String,
    pub funding_sources: Vec<FundingSource>,
    pub cookies: ResponseCookies,
    pub csp: ContentSecurityPolicy,
    pub allow_origin: String,
    pub html: String,
}

/// Shared across all requests; holds only immutable configuration.
pub struct IframeGateway {
    allow_list: AllowList,
    memory: FundingMemory,
    unpacker: Box<dyn MetaUnpacker>,
    nonces: Box<dyn NonceSource>,
    clock: Box<dyn Clock>,
    provider_domain: String,
    sdk_namespace: String,
}

impl IframeGateway {
    pub fn new(
        allow_list: AllowList,
        memory: FundingMemory,
        unpacker: Box<dyn MetaUnpacker>,
        nonces: Box<dyn NonceSource>,
        clock: Box<dyn Clock>,
        provider_domain: impl Into<String>,
        sdk_namespace: impl Into<String>,
    ) -> Self {
        Self {
            allow_list,
            memory,
            unpacker,
            nonces,
            clock,
            provider_domain: provider_domain.into(),
            sdk_namespace: sdk_namespace.into(),
        }
    }

    pub fn memory(&self) -> &FundingMemory {
        &self.memory
    }

    pub fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Run every check in order, stopping at the first failure.
    pub fn validate(&self, query: &RememberQuery) -> Result<ValidatedRemember, GatewayError> {
        let funding_sources = required(&query.funding_sources, "fundingSources")?;
        let sdk_meta = required(&query.sdk_meta, "sdkMeta")?;
        let client_id = required(&query.client_id, "clientID")?;
        let domain = required(&query.domain, "domain")?;

        if !is_valid_origin(domain) {
            return Err(GatewayError::MalformedDomain(domain.to_string()));
        }

        let client = self
            .allow_list
            .get(client_id)
            .ok_or_else(|| GatewayError::InvalidClientId(client_id.to_string()))?;

        let funding_sources = parse_funding_sources(funding_sources)?;

        if let Some(denied) = funding_sources
            .iter()
            .find(|&&source| !client.allows_funding(source))
        {
            return Err(GatewayError::FundingNotAllowed {
                client_id: client_id.to_string(),
                funding_source: denied.to_string(),
            });
        }

        if !client.allows_domain(domain) {
            return Err(GatewayError::InvalidDomain(domain.to_string()));
        }

        let sdk_loader = self.unpacker.unpack(sdk_meta).map_err(|e| {
            tracing::debug!(error = %e, "sdk meta failed to unpack");
            GatewayError::InvalidSdkMeta(sdk_meta.to_string())
        })?;

        Ok(ValidatedRemember {
            client_id: client_id.to_string(),
            domain: domain.to_string(),
            funding_sources,
            sdk_loader,
        })
    }

    /// Validate, then remember the funding sources and render the page.
    /// Nothing is written unless validation passes.
    pub fn handle(
        &self,
        request_cookies: &CookieMap,
        query: &RememberQuery,
    ) -> Result<RememberOutcome, GatewayError> {
        let validated = self.validate(query)?;

        let mut cookies = ResponseCookies::new();
        self.memory.remember(
            request_cookies,
            &mut cookies,
            &validated.funding_sources,
            self.clock.now(),
        );

        let nonce = self.nonces.generate();
        let csp = self.content_security_policy(&nonce, &validated.domain);
        let html = self.render(&validated, &nonce);

        Ok(RememberOutcome {
            client_id: validated.client_id,
            funding_sources: validated.funding_sources,
            cookies,
            csp,
            allow_origin: validated.domain,
            html,
        })
    }

    /// Scripts only from the provider and this response's nonce; framing only
    /// by the validated merchant origin; everything else off.
    pub fn content_security_policy(&self, nonce: &str, domain: &str) -> ContentSecurityPolicy {
        let provider = format!("https://*.{}:*", self.provider_domain);
        ContentSecurityPolicy::new()
            .directive(
                "script-src",
                [
                    "'self'".to_string(),
                    provider.clone(),
                    format!("'nonce-{}'", nonce),
                ],
            )
            .directive("connect-src", ["'self'".to_string(), provider])
            .directive("frame-ancestors", [domain])
            .directive("img-src", ["data:"])
            .directive("style-src", ["'none'"])
            .directive("frame-src", ["'none'"])
            .directive("font-src", ["'none'"])
            .directive("object-src", ["'none'"])
            .directive("media-src", ["'none'"])
    }

    fn render(&self, validated: &ValidatedRemember, nonce: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<head>
    <link rel="icon" href="data:,">
    {loader}
    <script nonce="{nonce}">
        {namespace}.rememberFunding({sources});
    </script>
</head>
<body></body>
</html>
"#,
            loader = validated.sdk_loader.script_tag(nonce),
            nonce = crate::meta::escape_html(nonce),
            namespace = self.sdk_namespace,
            sources = js_string_array(&validated.funding_sources),
        )
    }
}

/// Funding source ids are lowercase ASCII words, so quoting needs no escaping.
fn js_string_array(sources: &[FundingSource]) -> String {
    let items: Vec<String> = sources
        .iter()
        .map(|source| format!("\"{}\"", source.as_str()))
        .collect();
    format!("[{}]", items.join(","))
}

/// An absent or empty parameter counts as missing.
fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, GatewayError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(GatewayError::MissingParam(name)),
    }
}
