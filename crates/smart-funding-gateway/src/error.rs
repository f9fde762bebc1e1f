use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Request rejections. Every variant answers 400 with the message as a
/// plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Query string could not be decoded
    InvalidQuery(String),
    /// A required query parameter is absent or empty
    MissingParam(&'static str),
    /// `domain` is not a bare `http(s)://host` origin
    MalformedDomain(String),
    /// `clientID` is not in the allow-list
    InvalidClientId(String),
    /// Not a known funding source
    InvalidFundingSource(String),
    /// Known funding source the client may not remember
    FundingNotAllowed {
        client_id: String,
        funding_source: String,
    },
    /// Origin not allowed for the client
    InvalidDomain(String),
    /// `sdkMeta` failed to unpack
    InvalidSdkMeta(String),
}

impl GatewayError {
    /// Short label for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            GatewayError::InvalidQuery(_) => "invalid_query",
            GatewayError::MissingParam(_) => "missing_param",
            GatewayError::MalformedDomain(_) => "malformed_domain",
            GatewayError::InvalidClientId(_) => "invalid_client_id",
            GatewayError::InvalidFundingSource(_) => "invalid_funding_source",
            GatewayError::FundingNotAllowed { .. } => "funding_not_allowed",
            GatewayError::InvalidDomain(_) => "invalid_domain",
            GatewayError::InvalidSdkMeta(_) => "invalid_sdk_meta",
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::InvalidQuery(msg) => write!(f, "Invalid query string: {}", msg),
            GatewayError::MissingParam(name) => write!(f, "Expected {} query param", name),
            GatewayError::MalformedDomain(domain) => write!(
                f,
                "Expected domain query param to be an origin like https://example.com, got: {}",
                domain
            ),
            GatewayError::InvalidClientId(id) => write!(f, "Invalid client id: {}", id),
            GatewayError::InvalidFundingSource(source) => {
                write!(f, "Invalid funding source: {}", source)
            }
            GatewayError::FundingNotAllowed {
                client_id,
                funding_source,
            } => write!(
                f,
                "Funding source not allowed for client id {}: {}",
                client_id, funding_source
            ),
            GatewayError::InvalidDomain(domain) => write!(f, "Invalid domain: {}", domain),
            GatewayError::InvalidSdkMeta(raw) => write!(f, "Invalid sdkMeta: {}", raw),
        }
    }
}

impl std::error::Error for GatewayError {}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    // Messages echo request input, so the body must never be sniffed as HTML.
    fn error_response(&self) -> HttpResponse {
        HttpResponse::BadRequest()
            .content_type("text/plain; charset=utf-8")
            .insert_header((header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
            .body(self.to_string())
    }
}
