//! Per-browser memory of the funding sources a shopper has chosen before.
//!
//! State lives in one structured cookie (the "SDK cookie") on the shopper's
//! top-level domain. Nothing is stored server-side: every request reads the
//! incoming cookies, and every write re-emits the whole record.
//!
//! # Pieces
//!
//! - [`CookieStore`]: reads and writes the SDK cookie, degrading to an empty
//!   record on anything malformed
//! - [`FundingMemory`]: answers "is this source remembered?" and records new
//!   remembrances, honoring expiry windows and legacy single-value cookies
//! - [`FundingConfigTable`]: static per-source behavior (legacy keys, expiry)
//!
//! # Example
//!
//! ```
//! use funding::{CookieMap, FundingMemory, FundingSource, ResponseCookies};
//!
//! let memory = FundingMemory::with_defaults("sdk_state");
//! let request = CookieMap::new();
//! let mut response = ResponseCookies::new();
//!
//! memory.remember(&request, &mut response, &[FundingSource::Card], 1_700_000_000);
//!
//! let next_request = response.as_request_cookies();
//! assert!(memory.is_remembered(&next_request, FundingSource::Card, 1_700_000_001, None));
//! ```

pub mod clock;
pub mod cookie;
pub mod error;
pub mod memory;
pub mod source;

pub use clock::{Clock, FixedClock, SystemClock};
pub use cookie::{
    CookieMap, CookieStore, FundingEntry, ResponseCookies, SdkCookie, LEGACY_COOKIE_VALUE,
    SDK_COOKIE_VERSION,
};
pub use error::FundingError;
pub use memory::FundingMemory;
pub use source::{FundingConfigTable, FundingSource, FundingSourceConfig};
