use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;

/// Endpoint identity plus its query parameters, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(endpoint: &str, params: &[(String, String)]) -> Self {
        if params.is_empty() {
            return Self(endpoint.to_string());
        }
        let query = serde_urlencoded::to_string(params).unwrap_or_else(|_| format!("{:?}", params));
        Self(format!("{}?{}", endpoint, query))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

/// Process-wide response cache. Each entry carries its own expiry so one
/// instance serves every data category; an expired entry is never returned.
/// Writes are last-write-wins per key. [`TtlCache::lock_key`] serializes
/// producers of the same key so a miss is filled once.
#[derive(Debug, Clone)]
pub struct TtlCache<T> {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry<T>>>>,
    in_flight: Arc<Mutex<HashMap<CacheKey, Arc<Mutex<()>>>>>,
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> TtlCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: CacheKey, value: T, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Exclusive producer slot for `key`. Hold the guard while fetching and
    /// inserting; callers queued on the same key re-check the cache after it
    /// is released.
    pub async fn lock_key(&self, key: &CacheKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(in_flight.entry(key.clone()).or_default())
        };
        slot.lock_owned().await
    }

    /// Drops expired entries and idle producer slots; returns how many
    /// entries were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        let now = Instant::now();
        entries.retain(|_, entry| now < entry.expires_at);

        let mut in_flight = self.in_flight.lock().await;
        in_flight.retain(|_, slot| Arc::strong_count(slot) > 1);
        before - entries.len()
    }

    #[cfg(test)]
    async fn slots(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_key_includes_params() {
        let a = CacheKey::new("https://x/coins/bitcoin/ohlc", &params(&[("days", "30")]));
        let b = CacheKey::new("https://x/coins/bitcoin/ohlc", &params(&[("days", "90")]));
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "https://x/coins/bitcoin/ohlc?days=30");
        assert_eq!(CacheKey::new("https://x/ping", &[]).to_string(), "https://x/ping");
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = TtlCache::new();
        let key = CacheKey::new("snapshot", &[]);
        cache.insert(key.clone(), 42u32, Duration::from_secs(300)).await;

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get(&key).await, Some(42));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(&key).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_have_independent_ttls() {
        let cache = TtlCache::new();
        let fast = CacheKey::new("simple/price", &[]);
        let slow = CacheKey::new("coins/solana", &[]);
        cache.insert(fast.clone(), "price", Duration::from_secs(300)).await;
        cache.insert(slow.clone(), "meta", Duration::from_secs(1800)).await;

        tokio::time::advance(Duration::from_secs(600)).await;
        assert_eq!(cache.get(&fast).await, None);
        assert_eq!(cache.get(&slow).await, Some("meta"));

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_key_lock_serializes_producers() {
        let cache: TtlCache<u32> = TtlCache::new();
        let key = CacheKey::new("coins/bitcoin/ohlc", &[]);
        let other = CacheKey::new("coins/solana/ohlc", &[]);

        let guard = cache.lock_key(&key).await;
        let same = tokio::time::timeout(Duration::from_millis(50), cache.lock_key(&key)).await;
        assert!(same.is_err());
        let unrelated = tokio::time::timeout(Duration::from_millis(50), cache.lock_key(&other)).await;
        assert!(unrelated.is_ok());
        drop(unrelated);

        assert_eq!(cache.purge_expired().await, 0);
        assert_eq!(cache.slots().await, 1);
        drop(guard);
        cache.purge_expired().await;
        assert_eq!(cache.slots().await, 0);
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let cache = TtlCache::new();
        let key = CacheKey::new("coins/ripple", &[]);
        cache.insert(key.clone(), 1, Duration::from_secs(60)).await;
        cache.insert(key.clone(), 2, Duration::from_secs(60)).await;
        assert_eq!(cache.get(&key).await, Some(2));

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
