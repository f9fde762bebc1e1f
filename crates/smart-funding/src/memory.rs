//! Remembered-funding state machine over the SDK cookie.

use crate::cookie::{CookieMap, CookieStore, ResponseCookies, LEGACY_COOKIE_VALUE};
use crate::source::{FundingConfigTable, FundingSource, FundingSourceConfig};

/// Reads and records which funding sources a shopper has chosen before.
///
/// Holds only immutable configuration; all state travels in cookies.
#[derive(Debug, Clone)]
pub struct FundingMemory {
    store: CookieStore,
    table: FundingConfigTable,
}

impl FundingMemory {
    pub fn new(store: CookieStore, table: FundingConfigTable) -> Self {
        Self { store, table }
    }

    /// Memory over the built-in funding config table.
    pub fn with_defaults(cookie_name: impl Into<String>) -> Self {
        Self::new(CookieStore::new(cookie_name), FundingConfigTable::default())
    }

    pub fn store(&self) -> &CookieStore {
        &self.store
    }

    pub fn table(&self) -> &FundingConfigTable {
        &self.table
    }

    /// Whether `source` should be highlighted as previously chosen.
    ///
    /// A present legacy cookie wins outright and is not subject to expiry.
    /// Otherwise the SDK cookie entry decides, reading as forgotten once its
    /// expiry is strictly before `now`.
    pub fn is_remembered(
        &self,
        request: &CookieMap,
        source: FundingSource,
        now: i64,
        override_cookies: Option<&CookieMap>,
    ) -> bool {
        let config = self.table.get(source);
        let cookies = override_cookies.unwrap_or(request);

        if let Some(key) = config.and_then(FundingSourceConfig::legacy_read_key) {
            if cookies.is_set(key) {
                return true;
            }
        }

        let entry = self.store.read(request, override_cookies).entry(source);

        match entry.expiry {
            Some(expiry) if expiry < now => false,
            _ => entry.remembered,
        }
    }

    /// Every remembered source, in enumeration order.
    pub fn remembered_funding(
        &self,
        request: &CookieMap,
        now: i64,
        override_cookies: Option<&CookieMap>,
    ) -> Vec<FundingSource> {
        FundingSource::ALL
            .into_iter()
            .filter(|&source| self.is_remembered(request, source, now, override_cookies))
            .collect()
    }

    /// Mark each of `sources` as remembered.
    ///
    /// The SDK cookie is read once, updated in place and written once, so
    /// sources remembered by earlier requests are kept. Duplicates are applied
    /// in order; the last occurrence decides the stored expiry.
    pub fn remember(
        &self,
        request: &CookieMap,
        response: &mut ResponseCookies,
        sources: &[FundingSource],
        now: i64,
    ) {
        let mut cookie = self.store.read(request, None);

        for &source in sources {
            let config = self.table.get(source);
            let entry = cookie.entry_mut(source);
            entry.remembered = true;

            if let Some(key) = config.and_then(FundingSourceConfig::legacy_write_key) {
                response.set(key, LEGACY_COOKIE_VALUE);
            }

            if let Some(window) = config.and_then(|c| c.expiry) {
                entry.expiry = Some(now.saturating_add(window));
            }

            tracing::debug!(funding_source = %source, expiry = ?entry.expiry, "remembering funding source");
        }

        self.store.write(response, &cookie);
    }
}
