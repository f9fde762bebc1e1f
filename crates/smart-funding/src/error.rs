use thiserror::Error;

/// Errors raised while loading static funding configuration.
///
/// Request-time operations never fail; see [`crate::CookieStore::read`].
#[derive(Debug, Error)]
pub enum FundingError {
    #[error("unknown funding source: {0}")]
    UnknownFundingSource(String),

    #[error("funding source {0} enables a legacy cookie but has no legacyKey")]
    MissingLegacyKey(String),

    #[error("invalid funding config: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}
