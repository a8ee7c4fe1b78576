//! Named counters for cache outcomes

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated from request paths and background refreshes
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hit: AtomicU64,
    stale_hit: AtomicU64,
    miss: AtomicU64,
    revalidated: AtomicU64,
    revalidate_failed: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCounters {
    /// Fresh entries served
    pub hit: u64,
    /// Stale entries served
    pub stale_hit: u64,
    /// Entries computed synchronously
    pub miss: u64,
    /// Background refreshes that stored a new value
    pub revalidated: u64,
    /// Background refreshes whose factory failed
    pub revalidate_failed: u64,
}

impl CacheMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fresh hit
    pub fn record_hit(&self) {
        self.hit.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a stale hit
    pub fn record_stale_hit(&self) {
        self.stale_hit.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a miss
    pub fn record_miss(&self) {
        self.miss.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful background refresh
    pub fn record_revalidated(&self) {
        self.revalidated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed background refresh
    pub fn record_revalidate_failed(&self) {
        self.revalidate_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> CacheCounters {
        CacheCounters {
            hit: self.hit.load(Ordering::Relaxed),
            stale_hit: self.stale_hit.load(Ordering::Relaxed),
            miss: self.miss.load(Ordering::Relaxed),
            revalidated: self.revalidated.load(Ordering::Relaxed),
            revalidate_failed: self.revalidate_failed.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.hit.store(0, Ordering::Relaxed);
        self.stale_hit.store(0, Ordering::Relaxed);
        self.miss.store(0, Ordering::Relaxed);
        self.revalidated.store(0, Ordering::Relaxed);
        self.revalidate_failed.store(0, Ordering::Relaxed);
    }
}

impl CacheCounters {
    /// Total lookups served
    pub fn lookups(&self) -> u64 {
        self.hit + self.stale_hit + self.miss
    }

    /// Generate a summary report of the counters
    pub fn summary(&self) -> String {
        [
            "Cache Metrics Summary".to_string(),
            "=====================".to_string(),
            format!("Lookups: {}", self.lookups()),
            format!("  hit: {}", self.hit),
            format!("  stale_hit: {}", self.stale_hit),
            format!("  miss: {}", self.miss),
            "Refreshes:".to_string(),
            format!("  revalidated: {}", self.revalidated),
            format!("  revalidate_failed: {}", self.revalidate_failed),
        ]
        .join("\n")
    }
}
