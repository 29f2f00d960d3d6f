//! # Cache Backends
//!
//! String key/value storage with per-entry TTL. The projection layer on top
//! ([`crate::projection_cache`]) owns keys, encoding and invalidation rules.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      dyn Cache                                          │
//! │                                                                         │
//! │  MemoryCache    single process, tests        backend = "memory"        │
//! │  RedisCache     shared across instances       backend = "redis"         │
//! │  DisabledCache  always misses                 backend = "disabled"      │
//! │                                                                         │
//! │  Any backend may fail. Callers log and carry on.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod disabled;
mod memory;
mod redis_cache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{CacheBackend, CacheSettings};
use crate::error::CacheError;

pub use disabled::DisabledCache;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// Result cache collaborator.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Value stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Deletes every key starting with `prefix`. Returns how many were removed.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

    /// Backend reachability.
    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Builds the configured backend.
///
/// A Redis backend that can't be reached falls back to the in-memory cache
/// with a warning; projections never depend on the cache being up.
pub async fn build_cache(settings: &CacheSettings) -> Arc<dyn Cache> {
    match settings.backend {
        CacheBackend::Disabled => {
            info!("Projection cache disabled");
            Arc::new(DisabledCache)
        }
        CacheBackend::Memory => {
            info!("Using in-memory projection cache");
            Arc::new(MemoryCache::new())
        }
        CacheBackend::Redis => {
            let url = settings.redis_url.as_deref().unwrap_or_default();
            match RedisCache::connect(url).await {
                Ok(cache) => {
                    info!("Connected to Redis projection cache");
                    Arc::new(cache)
                }
                Err(e) => {
                    warn!(error = %e, "Failed to connect to Redis, falling back to in-memory cache");
                    Arc::new(MemoryCache::new())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_disabled_and_memory() {
        let mut settings = CacheSettings::default();
        settings.backend = CacheBackend::Disabled;
        assert_eq!(build_cache(&settings).await.backend(), "disabled");

        settings.backend = CacheBackend::Memory;
        assert_eq!(build_cache(&settings).await.backend(), "memory");
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_memory() {
        let mut settings = CacheSettings::default();
        settings.backend = CacheBackend::Redis;
        settings.redis_url = Some("not-a-redis-url".to_string());

        assert_eq!(build_cache(&settings).await.backend(), "memory");
    }
}
