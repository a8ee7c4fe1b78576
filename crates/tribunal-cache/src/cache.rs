//! Stale-while-revalidate cache implementation

use crate::{CacheConfig, CacheCounters, CacheMetrics};
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::time::Instant;
use tracing::{debug, warn};

type KeyLock = Arc<tokio::sync::Mutex<()>>;

/// One in-flight background refresh
///
/// Dropping it unsettled means the refresh task panicked or was cancelled;
/// that counts as a failed revalidation. The key lock is released last.
struct PendingRefresh<K: Debug, V> {
    cache: Arc<SwrCache<K, V>>,
    key: K,
    settled: bool,
    _lock: tokio::sync::OwnedMutexGuard<()>,
}

impl<K: Debug, V> Drop for PendingRefresh<K, V> {
    fn drop(&mut self) {
        if !self.settled {
            warn!(key = ?self.key, "background refresh aborted, keeping stale value");
            self.cache.metrics.record_revalidate_failed();
        }
        self.cache.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Fresh,
    Stale,
    Expired,
}

/// Keyed cache serving stale values while a single refresh runs
///
/// Always held behind an `Arc`; background refreshes keep their own handle
/// to the cache until they finish.
#[derive(Debug)]
pub struct SwrCache<K, V> {
    config: CacheConfig,
    entries: RwLock<HashMap<K, Entry<V>>>,
    locks: Mutex<HashMap<K, KeyLock>>,
    metrics: CacheMetrics,
    pending: AtomicUsize,
}

impl<K, V> SwrCache<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create a new shared cache
    pub fn new(config: CacheConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            entries: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
            metrics: CacheMetrics::new(),
            pending: AtomicUsize::new(0),
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Return the cached value for `key`, computing it with `factory` if needed
    ///
    /// A stale entry is returned as-is while `factory` runs in the background,
    /// at most once per key at a time. On a miss the factory's error is
    /// returned and nothing is stored.
    pub async fn get_or_refresh<F, Fut, E>(self: &Arc<Self>, key: K, factory: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        match self.lookup(&key) {
            Some((value, Freshness::Fresh)) => {
                self.metrics.record_hit();
                return Ok(value);
            }
            Some((value, Freshness::Stale)) => {
                self.metrics.record_stale_hit();
                self.schedule_refresh(key, factory);
                return Ok(value);
            }
            Some((_, Freshness::Expired)) | None => {}
        }

        let lock = self.key_lock(&key);
        let _guard = lock.lock().await;

        // Another caller may have filled the entry while we waited
        if let Some((value, Freshness::Fresh)) = self.lookup(&key) {
            self.metrics.record_hit();
            return Ok(value);
        }

        self.metrics.record_miss();
        debug!(?key, "cache miss, computing");
        let value = factory().await?;
        self.store(key, value.clone());
        Ok(value)
    }

    fn schedule_refresh<F, Fut, E>(self: &Arc<Self>, key: K, factory: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        let Ok(guard) = self.key_lock(&key).try_lock_owned() else {
            debug!(?key, "refresh already in flight");
            return;
        };

        if matches!(self.lookup(&key), Some((_, Freshness::Fresh))) {
            return;
        }

        self.pending.fetch_add(1, Ordering::SeqCst);
        let mut refresh = PendingRefresh {
            cache: Arc::clone(self),
            key,
            settled: false,
            _lock: guard,
        };
        tokio::spawn(async move {
            match factory().await {
                Ok(value) => {
                    refresh.cache.store(refresh.key.clone(), value);
                    refresh.cache.metrics.record_revalidated();
                }
                Err(e) => {
                    warn!(key = ?refresh.key, error = %e, "background refresh failed, keeping stale value");
                    refresh.cache.metrics.record_revalidate_failed();
                }
            }
            refresh.settled = true;
        });
    }

    fn lookup(&self, key: &K) -> Option<(V, Freshness)> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;
        Some((entry.value.clone(), self.freshness(entry.stored_at)))
    }

    fn freshness(&self, stored_at: Instant) -> Freshness {
        let age = stored_at.elapsed();
        if age < self.config.fresh_ttl() {
            Freshness::Fresh
        } else if age < self.config.fresh_ttl() + self.config.stale_ttl() {
            Freshness::Stale
        } else {
            Freshness::Expired
        }
    }

    fn store(&self, key: K, value: V) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                key,
                Entry {
                    value,
                    stored_at: Instant::now(),
                },
            );
    }

    fn key_lock(&self, key: &K) -> KeyLock {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_default()
            .clone()
    }

    /// Drop one entry; returns whether it existed
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
        removed
    }

    /// Drop every entry and idle key lock
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, lock| Arc::strong_count(lock) > 1);
        debug!("cache cleared");
    }

    /// Remove entries past the stale window and idle key locks
    ///
    /// Returns how many entries were removed.
    pub fn purge_expired(&self) -> usize {
        let removed = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let before = entries.len();
            entries.retain(|_, entry| self.freshness(entry.stored_at) != Freshness::Expired);
            before - entries.len()
        };

        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        if removed > 0 {
            debug!(removed, locks = locks.len(), "expired entries purged");
        }
        removed
    }

    /// Number of key locks currently tracked
    pub fn tracked_locks(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Background refreshes not yet finished
    pub fn pending_refreshes(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Snapshot of the hit/miss counters
    pub fn counters(&self) -> CacheCounters {
        self.metrics.snapshot()
    }

    /// Reset the hit/miss counters
    pub fn reset_counters(&self) {
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    fn config() -> CacheConfig {
        CacheConfig {
            fresh_ttl_secs: 10,
            stale_ttl_secs: 60,
        }
    }

    async fn settle<K, V>(cache: &Arc<SwrCache<K, V>>)
    where
        K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        while cache.pending_refreshes() > 0 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_then_hit() {
        let cache = SwrCache::<String, u32>::new(config());

        let first = cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(1) })
            .await
            .unwrap();
        let second = cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(2) })
            .await
            .unwrap();

        assert_eq!(first, 1);
        assert_eq!(second, 1);
        let counters = cache.counters();
        assert_eq!(counters.miss, 1);
        assert_eq!(counters.hit, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_error_is_not_stored() {
        let cache = SwrCache::<String, u32>::new(config());

        let err = cache
            .get_or_refresh("k".to_string(), || async { Err::<u32, _>("boom".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_refreshes_exactly_once() {
        let cache = SwrCache::<String, u32>::new(config());
        cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(1) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;

        let refreshes = Arc::new(AtomicU32::new(0));
        let callers = (0..8).map(|_| {
            let refreshes = refreshes.clone();
            cache.get_or_refresh("k".to_string(), move || async move {
                refreshes.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(2)
            })
        });
        let values = join_all(callers).await;

        // Every concurrent caller sees the stale value
        assert!(values.into_iter().all(|v| v == Ok(1)));

        settle(&cache).await;
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);

        let counters = cache.counters();
        assert_eq!(counters.stale_hit, 8);
        assert_eq!(counters.revalidated, 1);

        let refreshed = cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(3) })
            .await
            .unwrap();
        assert_eq!(refreshed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_stale_value() {
        let cache = SwrCache::<String, u32>::new(config());
        cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(1) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;

        let value = cache
            .get_or_refresh("k".to_string(), || async { Err::<u32, _>("down".to_string()) })
            .await
            .unwrap();
        assert_eq!(value, 1);

        settle(&cache).await;
        assert_eq!(cache.counters().revalidate_failed, 1);

        let value = cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(5) })
            .await
            .unwrap();
        assert_eq!(value, 1);
    }

    fn exploding() -> Result<u32, String> {
        panic!("refresh factory exploded")
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_refresh_is_counted_and_released() {
        let cache = SwrCache::<String, u32>::new(config());
        cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(1) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;

        let value = cache
            .get_or_refresh("k".to_string(), || async { exploding() })
            .await
            .unwrap();
        assert_eq!(value, 1);

        settle(&cache).await;
        assert_eq!(cache.pending_refreshes(), 0);
        assert_eq!(cache.counters().revalidate_failed, 1);

        // The key lock was released, so the next stale hit refreshes again
        let value = cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(2) })
            .await
            .unwrap();
        assert_eq!(value, 1);
        settle(&cache).await;
        assert_eq!(cache.counters().revalidated, 1);

        let value = cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(3) })
            .await
            .unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_drops_idle_key_locks() {
        let cache = SwrCache::<String, u32>::new(config());
        for i in 0..50u32 {
            cache
                .get_or_refresh(format!("query-{i}"), move || async move { Ok::<_, String>(i) })
                .await
                .unwrap();
        }
        assert_eq!(cache.tracked_locks(), 50);

        // Nothing expired yet, but idle locks go anyway
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.tracked_locks(), 0);

        tokio::time::advance(Duration::from_secs(71)).await;
        assert_eq!(cache.purge_expired(), 50);
        assert!(cache.is_empty());
        assert_eq!(cache.tracked_locks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_keeps_lock_of_running_refresh() {
        let cache = SwrCache::<String, u32>::new(config());
        cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(1) })
            .await
            .unwrap();
        tokio::time::advance(Duration::from_secs(11)).await;

        let (release, released) = tokio::sync::oneshot::channel::<()>();
        cache
            .get_or_refresh("k".to_string(), move || async move {
                let _ = released.await;
                Ok::<_, String>(2)
            })
            .await
            .unwrap();

        cache.purge_expired();
        assert_eq!(cache.tracked_locks(), 1);

        release.send(()).unwrap();
        settle(&cache).await;
        cache.purge_expired();
        assert_eq!(cache.tracked_locks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_a_miss() {
        let cache = SwrCache::<String, u32>::new(config());
        cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(1) })
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(71)).await;

        let value = cache
            .get_or_refresh("k".to_string(), || async { Ok::<_, String>(9) })
            .await
            .unwrap();
        assert_eq!(value, 9);
        assert_eq!(cache.counters().miss, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_key_does_not_block_other_keys() {
        let cache = SwrCache::<String, u32>::new(config());
        let (release, released) = tokio::sync::oneshot::channel::<()>();

        let slow_cache = cache.clone();
        let slow = tokio::spawn(async move {
            slow_cache
                .get_or_refresh("slow".to_string(), move || async move {
                    let _ = released.await;
                    Ok::<_, String>(1)
                })
                .await
        });
        tokio::task::yield_now().await;

        let fast = cache
            .get_or_refresh("fast".to_string(), || async { Ok::<_, String>(2) })
            .await
            .unwrap();
        assert_eq!(fast, 2);

        release.send(()).unwrap();
        assert_eq!(slow.await.unwrap().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_clear_and_purge() {
        let cache = SwrCache::<String, u32>::new(config());
        for (key, value) in [("a", 1), ("b", 2), ("c", 3)] {
            cache
                .get_or_refresh(key.to_string(), move || async move { Ok::<_, String>(value) })
                .await
                .unwrap();
        }
        assert_eq!(cache.len(), 3);

        assert!(cache.invalidate(&"a".to_string()));
        assert!(!cache.invalidate(&"a".to_string()));
        assert_eq!(cache.len(), 2);

        tokio::time::advance(Duration::from_secs(71)).await;
        assert_eq!(cache.purge_expired(), 2);

        cache
            .get_or_refresh("d".to_string(), || async { Ok::<_, String>(4) })
            .await
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());

        cache.reset_counters();
        assert_eq!(cache.counters().lookups(), 0);
    }
}
