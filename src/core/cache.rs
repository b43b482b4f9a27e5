use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::quote::Quote;

/// Default validity window of a cached quote.
pub const DEFAULT_VALIDITY_HOURS: i64 = 24;

struct CacheEntry {
    quote: Quote,
    inserted_at: DateTime<Utc>,
}

/// Time-bounded, in-memory store of resolved quotes keyed by uppercase symbol.
///
/// Expired entries are never evicted. They read as a miss and get overwritten
/// by the next successful resolution. There is no size bound since the key
/// space is the user's watchlist.
pub struct QuoteCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    symbol_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    validity: Duration,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::with_validity(Duration::hours(DEFAULT_VALIDITY_HOURS))
    }

    pub fn with_validity(validity: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            symbol_locks: Mutex::new(HashMap::new()),
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Returns the cached quote if present and younger than the validity
    /// window. Absent and expired entries look the same to callers.
    pub async fn get(&self, symbol: &str) -> Option<Quote> {
        self.get_at(symbol, Utc::now()).await
    }

    pub(crate) async fn get_at(&self, symbol: &str, now: DateTime<Utc>) -> Option<Quote> {
        let cache = self.entries.lock().await;
        match cache.get(symbol) {
            Some(entry) if now - entry.inserted_at < self.validity => {
                debug!("Cache HIT for key: {:?}", symbol);
                Some(entry.quote.clone())
            }
            Some(_) => {
                debug!("Cache entry expired for key: {:?}", symbol);
                None
            }
            None => {
                debug!("Cache MISS for key: {:?}", symbol);
                None
            }
        }
    }

    /// Inserts or overwrites the entry for `symbol`, resetting its timestamp.
    pub async fn put(&self, symbol: &str, quote: Quote) {
        self.put_at(symbol, quote, Utc::now()).await
    }

    pub(crate) async fn put_at(&self, symbol: &str, quote: Quote, now: DateTime<Utc>) {
        let mut cache = self.entries.lock().await;
        debug!("Cache PUT for key: {:?}", symbol);
        cache.insert(
            symbol.to_string(),
            CacheEntry {
                quote,
                inserted_at: now,
            },
        );
    }

    pub async fn clear(&self) {
        let mut cache = self.entries.lock().await;
        cache.clear();
        debug!("Cache CLEAR");
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Serializes resolutions of one symbol. Holding the guard across the
    /// miss, the provider fetch and the write-through keeps concurrent
    /// callers for the same symbol from fetching twice. Other symbols are
    /// not blocked.
    pub async fn lock_symbol(&self, symbol: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.symbol_locks.lock().await;
            Arc::clone(locks.entry(symbol.to_string()).or_default())
        };
        lock.lock_owned().await
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}
