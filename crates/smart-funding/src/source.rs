//! Funding-source identifiers and their static cookie behavior.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FundingError;

/// Seconds in one day, for expiry windows.
const DAY_SECS: i64 = 24 * 60 * 60;

/// A payment instrument type a shopper can pick at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FundingSource {
    Paypal,
    Venmo,
    Itau,
    Credit,
    Paylater,
    Applepay,
    Ideal,
    Sepa,
    Bancontact,
    Giropay,
    Sofort,
    Eps,
    Mybank,
    P24,
    Blik,
    Trustly,
    Oxxo,
    Boleto,
    Maxima,
    Mercadopago,
    Card,
}

impl FundingSource {
    /// Every known funding source, in enumeration order.
    pub const ALL: [FundingSource; 21] = [
        FundingSource::Paypal,
        FundingSource::Venmo,
        FundingSource::Itau,
        FundingSource::Credit,
        FundingSource::Paylater,
        FundingSource::Applepay,
        FundingSource::Ideal,
        FundingSource::Sepa,
        FundingSource::Bancontact,
        FundingSource::Giropay,
        FundingSource::Sofort,
        FundingSource::Eps,
        FundingSource::Mybank,
        FundingSource::P24,
        FundingSource::Blik,
        FundingSource::Trustly,
        FundingSource::Oxxo,
        FundingSource::Boleto,
        FundingSource::Maxima,
        FundingSource::Mercadopago,
        FundingSource::Card,
    ];

    /// Wire identifier, as used in query strings and cookie keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            FundingSource::Paypal => "paypal",
            FundingSource::Venmo => "venmo",
            FundingSource::Itau => "itau",
            FundingSource::Credit => "credit",
            FundingSource::Paylater => "paylater",
            FundingSource::Applepay => "applepay",
            FundingSource::Ideal => "ideal",
            FundingSource::Sepa => "sepa",
            FundingSource::Bancontact => "bancontact",
            FundingSource::Giropay => "giropay",
            FundingSource::Sofort => "sofort",
            FundingSource::Eps => "eps",
            FundingSource::Mybank => "mybank",
            FundingSource::P24 => "p24",
            FundingSource::Blik => "blik",
            FundingSource::Trustly => "trustly",
            FundingSource::Oxxo => "oxxo",
            FundingSource::Boleto => "boleto",
            FundingSource::Maxima => "maxima",
            FundingSource::Mercadopago => "mercadopago",
            FundingSource::Card => "card",
        }
    }
}

impl fmt::Display for FundingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FundingSource {
    type Err = FundingError;

    /// Exact, case-sensitive match against the wire identifiers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FundingSource::ALL
            .iter()
            .copied()
            .find(|source| source.as_str() == s)
            .ok_or_else(|| FundingError::UnknownFundingSource(s.to_string()))
    }
}

/// Per-source cookie behavior.
///
/// An absent config and `FundingSourceConfig::default()` behave identically:
/// no legacy cookie, no expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingSourceConfig {
    /// A present legacy cookie counts as remembered, ignoring expiry.
    #[serde(default)]
    pub legacy_read: bool,
    /// Remembering also sets the legacy cookie.
    #[serde(default)]
    pub legacy_write: bool,
    /// Name of the legacy cookie.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_key: Option<String>,
    /// Remember window in seconds, added to "now" on every remember.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<i64>,
}

impl FundingSourceConfig {
    /// Legacy cookie name to consult on read, if legacy reads are enabled.
    pub fn legacy_read_key(&self) -> Option<&str> {
        if self.legacy_read {
            self.legacy_key.as_deref().filter(|k| !k.is_empty())
        } else {
            None
        }
    }

    /// Legacy cookie name to set on write, if legacy writes are enabled.
    pub fn legacy_write_key(&self) -> Option<&str> {
        if self.legacy_write {
            self.legacy_key.as_deref().filter(|k| !k.is_empty())
        } else {
            None
        }
    }
}

/// Static mapping from funding source to its cookie behavior.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingConfigTable {
    entries: HashMap<FundingSource, FundingSourceConfig>,
}

impl FundingConfigTable {
    /// Table with no special behavior for any source.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Set the config for one source, replacing any previous entry.
    pub fn with(mut self, source: FundingSource, config: FundingSourceConfig) -> Self {
        self.entries.insert(source, config);
        self
    }

    pub fn get(&self, source: FundingSource) -> Option<&FundingSourceConfig> {
        self.entries.get(&source)
    }

    /// Parse a JSON object keyed by funding-source identifier.
    ///
    /// Rejects unknown identifiers and entries that enable a legacy cookie
    /// without naming it.
    pub fn from_json(json: &str) -> Result<Self, FundingError> {
        let raw: HashMap<String, FundingSourceConfig> = serde_json::from_str(json)?;
        let mut table = Self::empty();

        for (key, config) in raw {
            let source: FundingSource = key.parse()?;

            let needs_key = config.legacy_read || config.legacy_write;
            let has_key = config.legacy_key.as_deref().is_some_and(|k| !k.is_empty());
            if needs_key && !has_key {
                return Err(FundingError::MissingLegacyKey(key));
            }
            if matches!(config.expiry, Some(secs) if secs <= 0) {
                return Err(FundingError::InvalidConfig(format!(
                    "{key}: expiry must be a positive number of seconds"
                )));
            }

            table.entries.insert(source, config);
        }

        Ok(table)
    }
}

impl Default for FundingConfigTable {
    fn default() -> Self {
        Self::empty()
            .with(
                FundingSource::Venmo,
                FundingSourceConfig {
                    legacy_read: true,
                    legacy_write: true,
                    legacy_key: Some("pwv".to_string()),
                    expiry: None,
                },
            )
            .with(
                FundingSource::Itau,
                FundingSourceConfig {
                    expiry: Some(30 * DAY_SECS),
                    ..Default::default()
                },
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_wire_identifier() {
        for source in FundingSource::ALL {
            assert_eq!(source.as_str().parse::<FundingSource>().unwrap(), source);
        }
    }

    #[test]
    fn rejects_unknown_and_differently_cased_identifiers() {
        assert!("bitcoin".parse::<FundingSource>().is_err());
        assert!("Venmo".parse::<FundingSource>().is_err());
        assert!("".parse::<FundingSource>().is_err());
    }

    #[test]
    fn serde_uses_wire_identifiers() {
        let json = serde_json::to_string(&[FundingSource::P24, FundingSource::Applepay]).unwrap();
        assert_eq!(json, r#"["p24","applepay"]"#);
    }

    #[test]
    fn default_table_configures_venmo_legacy_cookie() {
        let table = FundingConfigTable::default();
        let venmo = table.get(FundingSource::Venmo).unwrap();
        assert_eq!(venmo.legacy_read_key(), Some("pwv"));
        assert_eq!(venmo.legacy_write_key(), Some("pwv"));
        assert!(table.get(FundingSource::Card).is_none());
    }

    #[test]
    fn legacy_keys_require_their_flags() {
        let config = FundingSourceConfig {
            legacy_key: Some("pwv".to_string()),
            ..Default::default()
        };
        assert_eq!(config.legacy_read_key(), None);
        assert_eq!(config.legacy_write_key(), None);
    }

    #[test]
    fn from_json_reads_camel_case_fields() {
        let table = FundingConfigTable::from_json(
            r#"{"venmo":{"legacyRead":true,"legacyKey":"pwv"},"card":{"expiry":3600}}"#,
        )
        .unwrap();
        assert_eq!(
            table.get(FundingSource::Venmo).unwrap().legacy_read_key(),
            Some("pwv")
        );
        assert_eq!(table.get(FundingSource::Card).unwrap().expiry, Some(3600));
    }

    #[test]
    fn from_json_rejects_legacy_flag_without_key() {
        let err = FundingConfigTable::from_json(r#"{"venmo":{"legacyWrite":true}}"#).unwrap_err();
        assert!(matches!(err, FundingError::MissingLegacyKey(ref k) if k == "venmo"));
    }

    #[test]
    fn from_json_rejects_unknown_source() {
        let err = FundingConfigTable::from_json(r#"{"bitcoin":{}}"#).unwrap_err();
        assert!(matches!(err, FundingError::UnknownFundingSource(_)));
    }

    #[test]
    fn from_json_rejects_non_positive_expiry() {
        assert!(FundingConfigTable::from_json(r#"{"card":{"expiry":0}}"#).is_err());
    }
}
