use funding::FundingSource;

use crate::error::GatewayError;

/// Check that `domain` is a bare origin: `http://` or `https://` followed by
/// a host of ASCII alphanumerics, `.`, `_` and `-`. Ports, paths, queries
/// and credentials are all rejected.
pub fn is_valid_origin(domain: &str) -> bool {
    let host = match domain
        .strip_prefix("https://")
        .or_else(|| domain.strip_prefix("http://"))
    {
        Some(h) => h,
        None => return false,
    };

    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Split a comma-separated list into funding sources, preserving order and
/// duplicates. The first unknown entry is reported verbatim.
pub fn parse_funding_sources(raw: &str) -> Result<Vec<FundingSource>, GatewayError> {
    raw.split(',')
        .map(|item| {
            item.parse::<FundingSource>()
                .map_err(|_| GatewayError::InvalidFundingSource(item.to_string()))
        })
        .collect()
}
