//! Static client allow-list for the iframe endpoint.

use std::collections::{HashMap, HashSet};

use funding::FundingSource;
use serde::Deserialize;

use crate::config::ConfigError;
use crate::validation::is_valid_origin;

/// What one client may do through the iframe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    #[serde(default)]
    pub allowed_funding: HashSet<FundingSource>,
    /// Exact origins, compared byte for byte.
    #[serde(default)]
    pub allowed_domains: HashSet<String>,
}

impl ClientConfig {
    pub fn allows_funding(&self, source: FundingSource) -> bool {
        self.allowed_funding.contains(&source)
    }

    pub fn allows_domain(&self, domain: &str) -> bool {
        self.allowed_domains.contains(domain)
    }
}

/// Client id to [`ClientConfig`]. Built once at startup, never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    clients: HashMap<String, ClientConfig>,
}

impl AllowList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(mut self, client_id: impl Into<String>, config: ClientConfig) -> Self {
        self.clients.insert(client_id.into(), config);
        self
    }

    pub fn get(&self, client_id: &str) -> Option<&ClientConfig> {
        self.clients.get(client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Parse `{ "<clientID>": { "allowedFunding": [...], "allowedDomains": [...] } }`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let clients: HashMap<String, ClientConfig> =
            serde_json::from_str(json).map_err(|e| ConfigError::AllowList(e.to_string()))?;

        for (client_id, config) in &clients {
            if client_id.is_empty() {
                return Err(ConfigError::AllowList("empty client id".to_string()));
            }
            if let Some(bad) = config.allowed_domains.iter().find(|d| !is_valid_origin(d)) {
                return Err(ConfigError::AllowList(format!(
                    "client {client_id}: domain {bad} is not an http(s) origin"
                )));
            }
        }

        Ok(Self { clients })
    }
}
