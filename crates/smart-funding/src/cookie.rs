//! The structured SDK cookie and the cookie maps it is read from and written to.

use std::collections::{BTreeMap, HashMap};

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::source::FundingSource;

/// Current SDK cookie record version. Newer records are not understood and
/// read as empty.
pub const SDK_COOKIE_VERSION: u32 = 1;

/// Value written to legacy single-purpose cookies.
pub const LEGACY_COOKIE_VALUE: &str = "1";

/// Cookies sent by the browser, name to raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieMap {
    cookies: HashMap<String, String>,
}

impl CookieMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// A cookie counts as present only with a non-empty value.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CookieMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = CookieMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Cookies to set on the outgoing response. Setting a name twice keeps the
/// last value, so each name yields at most one `Set-Cookie` header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseCookies {
    cookies: BTreeMap<String, String>,
}

impl ResponseCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// What the browser would send back on its next request.
    pub fn as_request_cookies(&self) -> CookieMap {
        self.iter().collect()
    }
}

/// Remembered state of a single funding source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingEntry {
    #[serde(default, skip_serializing_if = "is_false")]
    pub remembered: bool,
    /// Seconds since the epoch after which the entry reads as forgotten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn current_version() -> u32 {
    SDK_COOKIE_VERSION
}

/// Payload of the SDK cookie.
///
/// Wire format: unpadded base64url of the JSON record. Top-level fields this
/// crate does not own are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkCookie {
    #[serde(rename = "v", default = "current_version")]
    pub version: u32,
    /// Keyed by wire identifier so entries for sources this build does not
    /// know survive a rewrite.
    #[serde(default)]
    pub funding: BTreeMap<String, FundingEntry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for SdkCookie {
    fn default() -> Self {
        Self {
            version: SDK_COOKIE_VERSION,
            funding: BTreeMap::new(),
            extra: serde_json::Map::new(),
        }
    }
}

impl SdkCookie {
    /// Decode a raw cookie value. Anything unreadable yields the default record.
    pub fn decode(raw: &str) -> Self {
        let bytes = match base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(raw.trim()) {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(error = %e, "sdk cookie is not base64url, ignoring");
                return Self::default();
            }
        };

        let cookie: SdkCookie = match serde_json::from_slice(&bytes) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "sdk cookie has unexpected shape, ignoring");
                return Self::default();
            }
        };

        if cookie.version > SDK_COOKIE_VERSION {
            tracing::debug!(version = cookie.version, "sdk cookie version not supported, ignoring");
            return Self::default();
        }

        cookie
    }

    pub fn encode(&self) -> String {
        // A map of plain records always serializes.
        let json = serde_json::to_vec(self).unwrap_or_default();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json)
    }

    /// Entry for `source`, or an empty entry when none is stored.
    pub fn entry(&self, source: FundingSource) -> FundingEntry {
        self.funding
            .get(source.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Mutable entry for `source`, created empty if missing.
    pub fn entry_mut(&mut self, source: FundingSource) -> &mut FundingEntry {
        self.funding.entry(source.as_str().to_string()).or_default()
    }
}

/// Reads and writes the SDK cookie under a fixed name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieStore {
    name: String,
}

impl CookieStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read the SDK cookie from `override_cookies` if given, else from the
    /// request's own cookies. Never fails.
    pub fn read(&self, request: &CookieMap, override_cookies: Option<&CookieMap>) -> SdkCookie {
        let cookies = override_cookies.unwrap_or(request);
        cookies
            .get(&self.name)
            .map(SdkCookie::decode)
            .unwrap_or_default()
    }

    /// Attach the full record to the response, replacing any earlier write.
    pub fn write(&self, response: &mut ResponseCookies, cookie: &SdkCookie) {
        response.set(self.name.clone(), cookie.encode());
    }
}
