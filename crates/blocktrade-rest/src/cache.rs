//! Read-through cache for reference data
//!
//! Trading assets and trading pairs change rarely, so lookups are served from
//! memory and only a miss triggers a fetch of the full list. Entries are
//! never replaced or evicted once cached.

use crate::error::{RestError, RestResult};
use blocktrade_types::{TradingAsset, TradingPair};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use tracing::debug;

/// How a cached entry is looked up
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    /// Exchange-assigned id
    Id(i64),
    /// Asset ISO code, case-sensitive
    IsoCode(String),
    /// Pair by base and quote asset ids
    Pair { base: i64, quote: i64 },
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id {}", id),
            Self::IsoCode(code) => write!(f, "iso code {}", code),
            Self::Pair { base, quote } => write!(f, "base {} / quote {}", base, quote),
        }
    }
}

/// A record that can live in a [`ReferenceCache`]
pub trait CacheEntry: Clone + Send + Sync + 'static {
    /// Name used in not-found errors
    const KIND: &'static str;

    /// Cache key of this entry
    fn id(&self) -> i64;

    /// Check a secondary lookup key; ids are matched by the cache itself
    fn matches(&self, key: &LookupKey) -> bool {
        matches!(key, LookupKey::Id(id) if *id == self.id())
    }
}

impl CacheEntry for TradingAsset {
    const KIND: &'static str = "trading asset";

    fn id(&self) -> i64 {
        self.id
    }

    fn matches(&self, key: &LookupKey) -> bool {
        match key {
            LookupKey::Id(id) => *id == self.id,
            LookupKey::IsoCode(code) => *code == self.iso_code,
            LookupKey::Pair { .. } => false,
        }
    }
}

impl CacheEntry for TradingPair {
    const KIND: &'static str = "trading pair";

    fn id(&self) -> i64 {
        self.id
    }

    fn matches(&self, key: &LookupKey) -> bool {
        match key {
            LookupKey::Id(id) => *id == self.id,
            LookupKey::Pair { base, quote } => self.is_market(*base, *quote),
            LookupKey::IsoCode(_) => false,
        }
    }
}

/// Id-keyed cache of reference records
pub struct ReferenceCache<T> {
    entries: RwLock<HashMap<i64, T>>,
}

impl<T: CacheEntry> ReferenceCache<T> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Look up a cached entry without fetching
    pub fn get(&self, key: &LookupKey) -> Option<T> {
        let entries = self.entries.read();
        match key {
            LookupKey::Id(id) => entries.get(id).cloned(),
            _ => entries.values().find(|e| e.matches(key)).cloned(),
        }
    }

    /// Insert entries whose id is not cached yet, returning how many were added
    pub fn insert_missing(&self, items: impl IntoIterator<Item = T>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        for item in items {
            entries.entry(item.id()).or_insert(item);
        }
        entries.len() - before
    }

    /// Return the cached entry for `key`, fetching the full list on a miss
    ///
    /// No lock is held while `fetch` runs. Fetch errors are returned as-is;
    /// an entry still missing afterwards yields [`RestError::NotFound`].
    pub async fn get_or_fetch<F, Fut>(&self, key: &LookupKey, fetch: F) -> RestResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RestResult<Vec<T>>>,
    {
        if let Some(entry) = self.get(key) {
            return Ok(entry);
        }

        debug!(kind = T::KIND, %key, "Cache miss, fetching");
        let added = self.insert_missing(fetch().await?);
        debug!(kind = T::KIND, added, "Cache refreshed");

        self.get(key).ok_or_else(|| RestError::NotFound {
            key: format!("{} with {}", T::KIND, key),
        })
    }
}

impl<T: CacheEntry> Default for ReferenceCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CacheEntry> fmt::Debug for ReferenceCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceCache")
            .field("kind", &T::KIND)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pair(id: i64, base: i64, quote: i64) -> TradingPair {
        TradingPair {
            id,
            base_asset_id: base,
            quote_asset_id: quote,
            decimal_precision: 2,
            lot_size: dec!(0.0001),
            tick_size: dec!(0.01),
        }
    }

    #[tokio::test]
    async fn test_miss_fetches_once_then_hits() {
        let cache = ReferenceCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![pair(1, 10, 20), pair(2, 11, 20)])
        };

        let first = cache.get_or_fetch(&LookupKey::Id(2), fetch).await.unwrap();
        assert_eq!(first.base_asset_id, 11);

        let second = cache
            .get_or_fetch(&LookupKey::Pair { base: 10, quote: 20 }, fetch)
            .await
            .unwrap();
        assert_eq!(second.id, 1);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_after_fetch_is_not_found() {
        let cache = ReferenceCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![pair(1, 10, 20)])
        };

        let err = cache.get_or_fetch(&LookupKey::Id(99), fetch).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("trading pair with id 99"));

        // Every miss refetches
        let _ = cache.get_or_fetch(&LookupKey::Id(99), fetch).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_propagates_and_caches_nothing() {
        let cache: ReferenceCache<TradingPair> = ReferenceCache::new();
        let result = cache
            .get_or_fetch(&LookupKey::Id(1), || async {
                Err(RestError::Api {
                    code: 500,
                    message: String::new(),
                })
            })
            .await;

        assert_eq!(result.unwrap_err().status_code(), Some(500));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cached_entries_are_not_replaced() {
        let cache = ReferenceCache::new();
        assert_eq!(cache.insert_missing(vec![pair(1, 10, 20)]), 1);
        assert_eq!(cache.insert_missing(vec![pair(1, 99, 99), pair(2, 1, 2)]), 1);

        let cached = cache.get(&LookupKey::Id(1)).unwrap();
        assert_eq!(cached.base_asset_id, 10);
    }

    #[test]
    fn test_pair_ignores_iso_code_key() {
        let cache = ReferenceCache::new();
        cache.insert_missing(vec![pair(1, 10, 20)]);
        assert!(cache.get(&LookupKey::IsoCode("BTC".into())).is_none());
        assert!(cache.get(&LookupKey::Pair { base: 20, quote: 10 }).is_none());
    }
}
