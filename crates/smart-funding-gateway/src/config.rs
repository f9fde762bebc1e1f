use std::env;

use funding::{FundingConfigTable, FundingError};

use crate::allowlist::AllowList;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_PROVIDER_DOMAIN: &str = "paypal.com";
const DEFAULT_SDK_NAMESPACE: &str = "paypal";
const DEFAULT_SDK_COOKIE_NAME: &str = "sdk_state";
const DEFAULT_COOKIE_MAX_AGE_DAYS: i64 = 365;
/// Browsers clamp `Max-Age` to 400 days.
const MAX_COOKIE_MAX_AGE_DAYS: i64 = 400;
const DEFAULT_RATE_LIMIT_RPM: u32 = 120;

#[derive(Clone)]
pub struct GatewayConfig {
    /// Server port
    pub port: u16,
    /// Provider domain trusted for scripts and SDK URLs (e.g. "paypal.com")
    pub provider_domain: String,
    /// Global the iframe page calls `rememberFunding` on
    pub sdk_namespace: String,
    /// Name of the structured SDK cookie
    pub sdk_cookie_name: String,
    /// `Domain` attribute of written cookies (None = host-only)
    pub cookie_domain: Option<String>,
    /// `Max-Age` of written cookies, in days
    pub cookie_max_age_days: i64,
    /// Clients allowed to use the iframe
    pub allow_list: AllowList,
    /// Per-funding-source cookie behavior
    pub funding_config: FundingConfigTable,
    /// Rate limit requests per minute
    pub rate_limit_rpm: u32,
    /// Bearer token required for /metrics endpoint (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("provider_domain", &self.provider_domain)
            .field("sdk_namespace", &self.sdk_namespace)
            .field("sdk_cookie_name", &self.sdk_cookie_name)
            .field("cookie_domain", &self.cookie_domain)
            .field("cookie_max_age_days", &self.cookie_max_age_days)
            .field("allowed_clients", &self.allow_list.len())
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue("PORT", v))?,
            None => DEFAULT_PORT,
        };

        let provider_domain =
            var("PROVIDER_DOMAIN").unwrap_or_else(|| DEFAULT_PROVIDER_DOMAIN.to_string());
        if !is_hostname(&provider_domain) {
            return Err(ConfigError::InvalidValue("PROVIDER_DOMAIN", provider_domain));
        }

        let sdk_namespace =
            var("SDK_NAMESPACE").unwrap_or_else(|| DEFAULT_SDK_NAMESPACE.to_string());
        if !is_js_identifier(&sdk_namespace) {
            return Err(ConfigError::InvalidValue("SDK_NAMESPACE", sdk_namespace));
        }

        let sdk_cookie_name =
            var("SDK_COOKIE_NAME").unwrap_or_else(|| DEFAULT_SDK_COOKIE_NAME.to_string());
        if !is_cookie_name(&sdk_cookie_name) {
            return Err(ConfigError::InvalidValue("SDK_COOKIE_NAME", sdk_cookie_name));
        }

        let cookie_domain = var("COOKIE_DOMAIN");

        let cookie_max_age_days = match var("COOKIE_MAX_AGE_DAYS") {
            Some(v) => v
                .parse()
                .ok()
                .filter(|d: &i64| (1..=MAX_COOKIE_MAX_AGE_DAYS).contains(d))
                .ok_or(ConfigError::InvalidValue("COOKIE_MAX_AGE_DAYS", v))?,
            None => DEFAULT_COOKIE_MAX_AGE_DAYS,
        };

        let allow_list = match (var("ALLOWED_CLIENTS"), var("ALLOWED_CLIENTS_PATH")) {
            (Some(json), _) => AllowList::from_json(&json)?,
            (None, Some(path)) => AllowList::from_json(&read_file(&path)?)?,
            (None, None) => AllowList::new(),
        };
        if allow_list.is_empty() {
            tracing::warn!("No allowed clients configured; every iframe request will be rejected");
        }

        let funding_config = match var("FUNDING_CONFIG_PATH") {
            Some(path) => FundingConfigTable::from_json(&read_file(&path)?)?,
            None => FundingConfigTable::default(),
        };

        let rate_limit_rpm = match var("RATE_LIMIT_RPM") {
            Some(v) => v
                .parse()
                .ok()
                .filter(|rpm: &u32| *rpm > 0)
                .ok_or(ConfigError::InvalidValue("RATE_LIMIT_RPM", v))?,
            None => DEFAULT_RATE_LIMIT_RPM,
        };

        let metrics_token = var("METRICS_TOKEN");
        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set; /metrics endpoint is publicly accessible");
        }

        Ok(Self {
            port,
            provider_domain,
            sdk_namespace,
            sdk_cookie_name,
            cookie_domain,
            cookie_max_age_days,
            allow_list,
            funding_config,
            rate_limit_rpm,
            metrics_token,
        })
    }
}

fn read_file(path: &str) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_string(), e))
}

fn is_hostname(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('.')
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

fn is_js_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_cookie_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("invalid allow-list: {0}")]
    AllowList(String),

    #[error("invalid funding config: {0}")]
    Funding(#[from] FundingError),

    #[error("failed to read {0}: {1}")]
    Io(String, std::io::Error),
}
