//! Unpacking of the `sdkMeta` blob into an SDK script loader.
//!
//! The merchant page passes the metadata its own SDK script was loaded with,
//! so the iframe can load the same SDK build. The blob is base64 JSON:
//!
//! ```json
//! { "url": "https://www.paypal.com/sdk/js?client-id=abc", "attrs": { "data-namespace": "paypal" } }
//! ```

use std::collections::BTreeMap;

use base64::Engine;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetaError {
    #[error("sdk meta is not base64")]
    InvalidEncoding,

    #[error("sdk meta is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("sdk url is not a valid URL: {0}")]
    InvalidUrl(String),

    #[error("sdk url must use https: {0}")]
    InsecureUrl(String),

    #[error("sdk url host is not a provider domain: {0}")]
    UntrustedHost(String),

    #[error("invalid script attribute: {0}")]
    InvalidAttribute(String),
}

/// Turns a raw `sdkMeta` value into a script loader.
pub trait MetaUnpacker: Send + Sync {
    fn unpack(&self, raw: &str) -> Result<SdkLoader, MetaError>;
}

/// Renders the script tag that loads the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLoader {
    url: Url,
    attrs: BTreeMap<String, String>,
}

impl SdkLoader {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Script tag carrying `nonce`, the SDK `src` and the data attributes.
    pub fn script_tag(&self, nonce: &str) -> String {
        let mut tag = format!(
            r#"<script nonce="{}" src="{}""#,
            escape_html(nonce),
            escape_html(self.url.as_str())
        );
        for (name, value) in &self.attrs {
            tag.push_str(&format!(r#" {}="{}""#, name, escape_html(value)));
        }
        tag.push_str("></script>");
        tag
    }
}

#[derive(Deserialize)]
struct RawMeta {
    url: String,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
}

/// Accepts SDK URLs served over https from the provider domain or one of its
/// subdomains.
#[derive(Debug, Clone)]
pub struct ProviderMetaUnpacker {
    provider_domain: String,
}

impl ProviderMetaUnpacker {
    pub fn new(provider_domain: impl Into<String>) -> Self {
        Self {
            provider_domain: provider_domain.into().to_ascii_lowercase(),
        }
    }

    fn is_provider_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        host == self.provider_domain
            || host
                .strip_suffix(&self.provider_domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    }
}

impl MetaUnpacker for ProviderMetaUnpacker {
    fn unpack(&self, raw: &str) -> Result<SdkLoader, MetaError> {
        let bytes = decode_base64(raw).ok_or(MetaError::InvalidEncoding)?;
        let meta: RawMeta =
            serde_json::from_slice(&bytes).map_err(|e| MetaError::InvalidJson(e.to_string()))?;

        let url = Url::parse(&meta.url).map_err(|_| MetaError::InvalidUrl(meta.url.clone()))?;
        if url.scheme() != "https" {
            return Err(MetaError::InsecureUrl(meta.url));
        }
        match url.host_str() {
            Some(host) if self.is_provider_host(host) => {}
            _ => return Err(MetaError::UntrustedHost(meta.url)),
        }

        if let Some(bad) = meta.attrs.keys().find(|name| !is_data_attribute(name)) {
            return Err(MetaError::InvalidAttribute(bad.clone()));
        }

        Ok(SdkLoader {
            url,
            attrs: meta.attrs,
        })
    }
}

fn decode_base64(raw: &str) -> Option<Vec<u8>> {
    use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

    let raw = raw.trim();
    STANDARD
        .decode(raw)
        .or_else(|_| URL_SAFE_NO_PAD.decode(raw.trim_end_matches('=')))
        .ok()
}

fn is_data_attribute(name: &str) -> bool {
    name.strip_prefix("data-").is_some_and(|rest| {
        !rest.is_empty()
            && rest
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    })
}

/// Minimal escaping for text placed in double-quoted HTML attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
