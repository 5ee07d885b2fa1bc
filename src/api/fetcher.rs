use log::{debug, error, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::{FetchRequest, Transport};
use crate::config::{CacheConfig, FetchConfig};
use crate::metrics::{CACHE_HITS, CACHE_MISSES, FETCH_LATENCY, UPSTREAM_FAILURES, UPSTREAM_REQUESTS};
use crate::utils::cache::TtlCache;

/// Upstream GET with a fixed number of attempts and a fixed pause between
/// them. Every failure class (timeout, DNS, 4xx including 429, 5xx) is
/// retried the same way. Exhaustion yields `None`, never an error.
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, config: &FetchConfig) -> Self {
        Self {
            transport,
            max_attempts: config.max_attempts.max(1),
            retry_delay: config.retry_delay(),
        }
    }

    pub async fn fetch(&self, request: &FetchRequest) -> Option<Value> {
        let started = Instant::now();
        let mut result = None;

        for attempt in 1..=self.max_attempts {
            UPSTREAM_REQUESTS.inc();
            match self.transport.get_json(request).await {
                Ok(payload) => {
                    result = Some(payload);
                    break;
                }
                Err(e) => {
                    UPSTREAM_FAILURES.inc();
                    warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt, self.max_attempts, request.url, e
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        if result.is_none() {
            error!("Giving up on {} after {} attempts", request.url, self.max_attempts);
        }
        FETCH_LATENCY.observe(started.elapsed().as_secs_f64());
        result
    }

    /// The underlying transport, for single-shot calls that skip the retry loop.
    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }
}

/// Freshness class of a payload; each class has its own TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCategory {
    Snapshot,
    Metadata,
    History,
    Prediction,
    ModelInfo,
}

/// [`Fetcher`] behind the shared [`TtlCache`]. Within a TTL window a given
/// endpoint and parameter set goes upstream at most once; concurrent misses
/// on the same key wait for the first one and reuse its result.
#[derive(Clone)]
pub struct CachedFetcher {
    fetcher: Fetcher,
    cache: TtlCache<Option<Value>>,
    config: CacheConfig,
}

impl CachedFetcher {
    pub fn new(fetcher: Fetcher, cache: TtlCache<Option<Value>>, config: CacheConfig) -> Self {
        Self {
            fetcher,
            cache,
            config,
        }
    }

    pub fn ttl(&self, category: DataCategory) -> Duration {
        let secs = match category {
            DataCategory::Snapshot => self.config.snapshot_ttl_secs,
            DataCategory::Metadata => self.config.metadata_ttl_secs,
            DataCategory::History => self.config.history_ttl_secs,
            DataCategory::Prediction => self.config.prediction_ttl_secs,
            DataCategory::ModelInfo => self.config.model_info_ttl_secs,
        };
        Duration::from_secs(secs)
    }

    pub async fn fetch(&self, category: DataCategory, request: &FetchRequest) -> Option<Value> {
        let key = request.cache_key();
        if let Some(cached) = self.cache.get(&key).await {
            CACHE_HITS.inc();
            debug!("Cache hit for {}", key);
            return cached;
        }

        let _producer = self.cache.lock_key(&key).await;
        if let Some(cached) = self.cache.get(&key).await {
            CACHE_HITS.inc();
            debug!("Cache filled while waiting for {}", key);
            return cached;
        }

        CACHE_MISSES.inc();
        debug!("Cache miss for {}", key);
        let payload = self.fetcher.fetch(request).await;
        if payload.is_some() || self.config.cache_failures {
            self.cache.insert(key, payload.clone(), self.ttl(category)).await;
        }
        payload
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn cache(&self) -> &TtlCache<Option<Value>> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockTransport;
    use crate::error::Error;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fetcher_with(transport: MockTransport) -> Fetcher {
        Fetcher::new(Arc::new(transport), &FetchConfig::default())
    }

    fn cached_with(transport: MockTransport, config: CacheConfig) -> CachedFetcher {
        CachedFetcher::new(fetcher_with(transport), TtlCache::new(), config)
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_exhausted_retries_return_none() {
        let mut transport = MockTransport::new();
        transport.expect_get_json().times(3).returning(|request| {
            Err(Error::HttpStatus {
                status: 429,
                url: request.url.clone(),
            })
        });

        let started = Instant::now();
        let result = fetcher_with(transport).fetch(&FetchRequest::new("https://upstream/ping")).await;
        assert!(result.is_none());
        // two pauses between three attempts, none after the last one
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(4000));
        assert!(elapsed < Duration::from_millis(6000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_second_attempt() {
        let mut transport = MockTransport::new();
        let mut seq = mockall::Sequence::new();
        transport
            .expect_get_json()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(Error::ApiConnectionFailed("timeout".to_string())));
        transport
            .expect_get_json()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(json!({"ok": true})));

        let result = fetcher_with(transport).fetch(&FetchRequest::new("https://upstream/ping")).await;
        assert_eq!(result, Some(json!({"ok": true})));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_call_within_ttl_is_cached() {
        let mut transport = MockTransport::new();
        transport
            .expect_get_json()
            .withf(|request| request.params == vec![("ids".to_string(), "ethereum".to_string())])
            .times(1)
            .returning(|_| Ok(json!({"ethereum": {"usd": 3000.0}})));

        let cached = cached_with(transport, CacheConfig::default());
        let request = FetchRequest::new("https://upstream/simple/price").param("ids", "ethereum");

        let first = cached.fetch(DataCategory::Snapshot, &request).await;
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = cached.fetch(DataCategory::Snapshot, &request).await;
        assert_eq!(first, second);
        assert!(first.is_some());
    }

    /// Answers after a delay so overlapping callers are really in flight.
    struct SlowTransport {
        delay: Duration,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Transport for SlowTransport {
        async fn get_json(&self, _request: &FetchRequest) -> crate::Result<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(json!({"ethereum": {"usd": 3000.0}}))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_misses_share_one_upstream_call() {
        let transport = Arc::new(SlowTransport {
            delay: Duration::from_millis(500),
            calls: AtomicUsize::new(0),
        });
        let fetcher = Fetcher::new(transport.clone(), &FetchConfig::default());
        let cached = CachedFetcher::new(fetcher, TtlCache::new(), CacheConfig::default());
        let request = FetchRequest::new("https://upstream/simple/price").param("ids", "ethereum");
        let other = FetchRequest::new("https://upstream/simple/price").param("ids", "solana");

        let (first, second, third) = tokio::join!(
            cached.fetch(DataCategory::Snapshot, &request),
            cached.fetch(DataCategory::Snapshot, &request),
            cached.fetch(DataCategory::Snapshot, &other),
        );
        assert!(first.is_some());
        assert_eq!(first, second);
        assert!(third.is_some());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_refetches() {
        let mut transport = MockTransport::new();
        transport
            .expect_get_json()
            .times(2)
            .returning(|_| Ok(json!([[1_700_000_000_000i64, 1.0, 2.0, 0.5, 1.5]])));

        let cached = cached_with(transport, CacheConfig::default());
        let request = FetchRequest::new("https://upstream/coins/bitcoin/ohlc").param("days", 90);

        cached.fetch(DataCategory::History, &request).await;
        tokio::time::advance(cached.ttl(DataCategory::History)).await;
        cached.fetch(DataCategory::History, &request).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_params_are_distinct_entries() {
        let mut transport = MockTransport::new();
        transport.expect_get_json().times(2).returning(|_| Ok(json!({})));

        let cached = cached_with(transport, CacheConfig::default());
        let base = FetchRequest::new("https://upstream/coins/solana/ohlc");
        cached.fetch(DataCategory::History, &base.clone().param("days", 30)).await;
        cached.fetch(DataCategory::History, &base.param("days", 90)).await;
        assert_eq!(cached.cache().len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_memoized_when_enabled() {
        let mut transport = MockTransport::new();
        transport
            .expect_get_json()
            .times(3)
            .returning(|_| Err(Error::ApiConnectionFailed("refused".to_string())));

        let cached = cached_with(transport, CacheConfig::default());
        let request = FetchRequest::new("https://predictor/predict/bitcoin");
        assert!(cached.fetch(DataCategory::Prediction, &request).await.is_none());
        assert!(cached.fetch(DataCategory::Prediction, &request).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_retry_when_memoization_disabled() {
        let mut transport = MockTransport::new();
        transport
            .expect_get_json()
            .times(6)
            .returning(|_| Err(Error::ApiConnectionFailed("refused".to_string())));

        let config = CacheConfig {
            cache_failures: false,
            ..CacheConfig::default()
        };
        let cached = cached_with(transport, config);
        let request = FetchRequest::new("https://predictor/predict/bitcoin");
        cached.fetch(DataCategory::Prediction, &request).await;
        cached.fetch(DataCategory::Prediction, &request).await;
        assert!(cached.cache().is_empty().await);
    }

    #[test]
    fn test_category_ttls() {
        let cached = cached_with(MockTransport::new(), CacheConfig::default());
        assert_eq!(cached.ttl(DataCategory::Snapshot), Duration::from_secs(300));
        assert!(cached.ttl(DataCategory::Metadata) > cached.ttl(DataCategory::Snapshot));
        assert_eq!(cached.ttl(DataCategory::ModelInfo), Duration::from_secs(1800));
    }
}
