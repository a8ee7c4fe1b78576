//! Tribunal Cache
//!
//! Stale-while-revalidate cache shared by the pipeline stages that want to
//! skip redundant recomputation.
//!
//! # Overview
//!
//! `get_or_refresh(key, factory)` has three outcomes:
//! - **Fresh entry**: returned immediately (`hit`)
//! - **Stale entry**: returned immediately, and exactly one background
//!   refresh is scheduled for that key (`stale_hit`, then `revalidated` or
//!   `revalidate_failed`)
//! - **No entry**: the per-key lock is taken, the entry is re-checked under
//!   the lock, then computed and stored synchronously (`miss`)
//!
//! # Locking
//!
//! Each key has its own async mutex; it is the only lock held across an
//! await, and only while computing that key. A refresh of one key never
//! blocks a lookup of another.
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! fresh_ttl_secs = 300
//! stale_ttl_secs = 3600
//! ```
//!
//! # Usage
//!
//! ```
//! use tribunal_cache::{CacheConfig, SwrCache};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache = SwrCache::<String, u64>::new(CacheConfig::default());
//! let value = cache
//!     .get_or_refresh("answer".to_string(), || async { Ok::<_, String>(42) })
//!     .await
//!     .unwrap();
//! assert_eq!(value, 42);
//! assert_eq!(cache.counters().miss, 1);
//! # }
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod metrics;

pub use cache::SwrCache;
pub use config::CacheConfig;
pub use error::CacheError;
pub use metrics::{CacheCounters, CacheMetrics};
