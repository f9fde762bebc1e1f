//! Cross-domain "remember this funding source" iframe endpoint.
//!
//! An allow-listed merchant page embeds `/smart/funding/remember` in an
//! iframe served from the provider's domain. The gateway validates the
//! request, records the funding sources in the shopper's first-party SDK
//! cookie, and returns a locked-down HTML page that loads the provider's
//! script and tells it what was remembered.

pub mod allowlist;
pub mod config;
pub mod csp;
pub mod error;
pub mod iframe;
pub mod meta;
pub mod metrics;
pub mod nonce;
pub mod routes;
pub mod state;
pub mod validation;

pub use allowlist::{AllowList, ClientConfig};
pub use config::GatewayConfig;
pub use error::GatewayError;
pub use iframe::{IframeGateway, RememberOutcome, RememberQuery};
pub use state::AppState;
