//! # Projection Cache
//!
//! Get-or-compute memoization of projection results on top of any
//! [`Cache`] backend.
//!
//! ## Keys and TTLs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  projection:{account}:sales:{period}      6h                            │
//! │  projection:{account}:cashflow:{period}   6h                            │
//! │  projection:{account}:health              1h                            │
//! │                                                                         │
//! │  invalidate(account) ──► DEL projection:{account}:*                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle of a Miss
//! ```text
//!   get ──hit──► return cached value
//!    │
//!   miss
//!    │
//!    ├── single flight on? take the key's flight lock, get again
//!    │
//!    ├── remember the account's generation
//!    ├── compute
//!    ├── generation unchanged? ──yes──► set with TTL
//!    │                          └─no──► skip (an invalidation ran meanwhile)
//!    └── return computed value
//! ```
//!
//! Backend failures and undecodable entries are logged at `warn` and treated
//! as misses. With a failing or disabled backend every call computes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{Cache, DisabledCache};
use crate::error::EngineResult;
use lucra_core::ProjectionPeriod;

/// Prefix shared by every key this module writes.
pub const KEY_NAMESPACE: &str = "projection";

// =============================================================================
// Policy
// =============================================================================

/// TTLs and coalescing behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Sales and cashflow projections.
    pub projection_ttl: Duration,
    /// Health scores.
    pub health_ttl: Duration,
    pub single_flight: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        CachePolicy {
            projection_ttl: Duration::from_secs(6 * 3600),
            health_ttl: Duration::from_secs(3600),
            single_flight: true,
        }
    }
}

// =============================================================================
// Keys
// =============================================================================

/// Identity of one cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Sales { account_id: String, period: ProjectionPeriod },
    Cashflow { account_id: String, period: ProjectionPeriod },
    Health { account_id: String },
}

impl CacheKey {
    pub fn sales(account_id: &str, period: ProjectionPeriod) -> Self {
        CacheKey::Sales {
            account_id: account_id.to_string(),
            period,
        }
    }

    pub fn cashflow(account_id: &str, period: ProjectionPeriod) -> Self {
        CacheKey::Cashflow {
            account_id: account_id.to_string(),
            period,
        }
    }

    pub fn health(account_id: &str) -> Self {
        CacheKey::Health {
            account_id: account_id.to_string(),
        }
    }

    pub fn account_id(&self) -> &str {
        match self {
            CacheKey::Sales { account_id, .. }
            | CacheKey::Cashflow { account_id, .. }
            | CacheKey::Health { account_id } => account_id,
        }
    }

    /// Result kind segment of the key.
    pub fn kind(&self) -> &'static str {
        match self {
            CacheKey::Sales { .. } => "sales",
            CacheKey::Cashflow { .. } => "cashflow",
            CacheKey::Health { .. } => "health",
        }
    }

    /// Prefix matching every key of `account_id`.
    pub fn account_prefix(account_id: &str) -> String {
        format!("{KEY_NAMESPACE}:{account_id}:")
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Sales { account_id, period } | CacheKey::Cashflow { account_id, period } => {
                write!(f, "{KEY_NAMESPACE}:{account_id}:{}:{}", self.kind(), period.days())
            }
            CacheKey::Health { account_id } => write!(f, "{KEY_NAMESPACE}:{account_id}:health"),
        }
    }
}

// =============================================================================
// Projection Cache
// =============================================================================

/// Memoizes projection results per account.
pub struct ProjectionCache {
    backend: Arc<dyn Cache>,
    policy: CachePolicy,
    /// Per-key locks held while a miss is being computed.
    flights: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Per-account invalidation counters. An entry lives only while a compute
    /// or invalidation for the account holds it.
    generations: Mutex<HashMap<String, Arc<Mutex<u64>>>>,
}

impl std::fmt::Debug for ProjectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionCache")
            .field("backend", &self.backend.backend())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl ProjectionCache {
    pub fn new(backend: Arc<dyn Cache>, policy: CachePolicy) -> Self {
        ProjectionCache {
            backend,
            policy,
            flights: Mutex::new(HashMap::new()),
            generations: Mutex::new(HashMap::new()),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Arc::new(DisabledCache), CachePolicy::default())
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    pub fn backend(&self) -> &dyn Cache {
        self.backend.as_ref()
    }

    /// TTL of the result stored under `key`.
    pub fn ttl(&self, key: &CacheKey) -> Duration {
        match key {
            CacheKey::Health { .. } => self.policy.health_ttl,
            CacheKey::Sales { .. } | CacheKey::Cashflow { .. } => self.policy.projection_ttl,
        }
    }

    /// Returns the cached value for `key`, or computes, stores and returns it.
    ///
    /// Errors from `compute` are returned and nothing is stored.
    pub async fn get_or_compute<T, F, Fut>(&self, key: &CacheKey, compute: F) -> EngineResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = EngineResult<T>>,
    {
        let cache_key = key.to_string();
        if let Some(hit) = self.lookup(&cache_key).await {
            return Ok(hit);
        }

        if !self.policy.single_flight {
            return self.compute_and_store(key, &cache_key, compute).await;
        }

        let flight = self.flight_lock(&cache_key).await;
        let guard = flight.lock_owned().await;

        // Whoever held the lock before us may have filled the entry.
        let result = match self.lookup(&cache_key).await {
            Some(hit) => Ok(hit),
            None => self.compute_and_store(key, &cache_key, compute).await,
        };

        drop(guard);
        self.release_flight(&cache_key).await;
        result
    }

    /// Drops every cached result of `account_id`.
    ///
    /// Results being computed right now are still returned to their callers
    /// but will not be written. Returns the number of entries deleted.
    pub async fn invalidate(&self, account_id: &str) -> u64 {
        {
            let slot = self.generation_slot(account_id).await;
            *slot.lock().await += 1;
        }
        self.release_generation(account_id).await;

        let prefix = CacheKey::account_prefix(account_id);
        match self.backend.delete_by_prefix(&prefix).await {
            Ok(deleted) => {
                info!(account_id, deleted, "Invalidated cached projections");
                deleted
            }
            Err(e) => {
                warn!(account_id, error = %e, "Cache invalidation failed");
                0
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn lookup<T: DeserializeOwned>(&self, cache_key: &str) -> Option<T> {
        match self.backend.get(cache_key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(cache_key, "Cache hit");
                    Some(value)
                }
                Err(e) => {
                    warn!(cache_key, error = %e, "Undecodable cache entry, recomputing");
                    None
                }
            },
            Ok(None) => {
                debug!(cache_key, "Cache miss");
                None
            }
            Err(e) => {
                warn!(cache_key, error = %e, "Cache read failed, recomputing");
                None
            }
        }
    }

    async fn compute_and_store<T, F, Fut>(&self, key: &CacheKey, cache_key: &str, compute: F) -> EngineResult<T>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = EngineResult<T>>,
    {
        // The slot stays referenced until the write is decided, which keeps
        // its counter from being pruned under this compute.
        let slot = self.generation_slot(key.account_id()).await;
        let seen = *slot.lock().await;

        let result = compute().await;
        if let Ok(value) = &result {
            self.store_if_current(&slot, key, cache_key, value, seen).await;
        }

        drop(slot);
        self.release_generation(key.account_id()).await;
        result
    }

    async fn store_if_current<T: Serialize>(
        &self,
        slot: &Mutex<u64>,
        key: &CacheKey,
        cache_key: &str,
        value: &T,
        seen: u64,
    ) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(cache_key, error = %e, "Failed to encode projection for cache");
                return;
            }
        };

        // Held across the write so an invalidation can't slip between the
        // generation check and the set.
        let generation = slot.lock().await;
        if *generation != seen {
            debug!(cache_key, "Skipping cache write, account invalidated during compute");
            return;
        }

        if let Err(e) = self.backend.set(cache_key, &encoded, self.ttl(key)).await {
            warn!(cache_key, error = %e, "Cache write failed");
        }
    }

    async fn generation_slot(&self, account_id: &str) -> Arc<Mutex<u64>> {
        let mut generations = self.generations.lock().await;
        generations.entry(account_id.to_string()).or_default().clone()
    }

    /// Drops the account's counter once nothing references it. A compute that
    /// starts afterwards reads a fresh counter, so no write can be misjudged.
    async fn release_generation(&self, account_id: &str) {
        let mut generations = self.generations.lock().await;
        if generations.get(account_id).is_some_and(|slot| Arc::strong_count(slot) == 1) {
            generations.remove(account_id);
        }
    }

    async fn flight_lock(&self, cache_key: &str) -> Arc<Mutex<()>> {
        let mut flights = self.flights.lock().await;
        flights.entry(cache_key.to_string()).or_default().clone()
    }

    async fn release_flight(&self, cache_key: &str) {
        let mut flights = self.flights.lock().await;
        if flights.get(cache_key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            flights.remove(cache_key);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::error::{CacheError, EngineError, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn memory_cache(single_flight: bool) -> (Arc<MemoryCache>, ProjectionCache) {
        let backend = Arc::new(MemoryCache::new());
        let policy = CachePolicy {
            single_flight,
            ..CachePolicy::default()
        };
        (backend.clone(), ProjectionCache::new(backend, policy))
    }

    struct BrokenCache;

    #[async_trait]
    impl Cache for BrokenCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
        async fn delete_by_prefix(&self, _prefix: &str) -> Result<u64, CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }
        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            CacheKey::sales("acc_1", ProjectionPeriod::Month).to_string(),
            "projection:acc_1:sales:30"
        );
        assert_eq!(
            CacheKey::cashflow("acc_1", ProjectionPeriod::Year).to_string(),
            "projection:acc_1:cashflow:365"
        );
        assert_eq!(CacheKey::health("acc_1").to_string(), "projection:acc_1:health");
        assert!(CacheKey::health("acc_1")
            .to_string()
            .starts_with(&CacheKey::account_prefix("acc_1")));
        assert!(!CacheKey::health("acc_10")
            .to_string()
            .starts_with(&CacheKey::account_prefix("acc_1")));
    }

    #[test]
    fn test_ttl_per_kind() {
        let cache = ProjectionCache::disabled();
        assert_eq!(cache.ttl(&CacheKey::sales("a", ProjectionPeriod::Week)), Duration::from_secs(21_600));
        assert_eq!(cache.ttl(&CacheKey::cashflow("a", ProjectionPeriod::Week)), Duration::from_secs(21_600));
        assert_eq!(cache.ttl(&CacheKey::health("a")), Duration::from_secs(3_600));
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let (_, cache) = memory_cache(true);
        let key = CacheKey::sales("acc", ProjectionPeriod::Week);
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value: u32 = cache
                .get_or_compute(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let (backend, cache) = memory_cache(true);
        let key = CacheKey::health("acc");

        let result: EngineResult<u32> = cache
            .get_or_compute(&key, || async {
                Err(EngineError::StoreUnavailable(StoreError::Unavailable("down".into())))
            })
            .await;
        assert!(result.is_err());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_forces_recompute() {
        let (_, cache) = memory_cache(true);
        let week = CacheKey::sales("acc", ProjectionPeriod::Week);
        let health = CacheKey::health("acc");
        let other = CacheKey::health("other");

        let _: u32 = cache.get_or_compute(&week, || async { Ok(1) }).await.unwrap();
        let _: u32 = cache.get_or_compute(&health, || async { Ok(2) }).await.unwrap();
        let _: u32 = cache.get_or_compute(&other, || async { Ok(3) }).await.unwrap();

        assert_eq!(cache.invalidate("acc").await, 2);

        let week_again: u32 = cache.get_or_compute(&week, || async { Ok(10) }).await.unwrap();
        let other_again: u32 = cache.get_or_compute(&other, || async { Ok(30) }).await.unwrap();
        assert_eq!(week_again, 10);
        assert_eq!(other_again, 3);
    }

    #[tokio::test]
    async fn test_result_computed_across_invalidation_is_not_stored() {
        let (backend, cache) = memory_cache(true);
        let key = CacheKey::sales("acc", ProjectionPeriod::Month);

        let value: u32 = cache
            .get_or_compute(&key, || async {
                cache.invalidate("acc").await;
                Ok(99)
            })
            .await
            .unwrap();

        assert_eq!(value, 99);
        assert!(backend.is_empty().await);
        assert!(cache.generations.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_generation_counters_are_pruned_when_idle() {
        let (_, cache) = memory_cache(false);

        for account in ["acc_a", "acc_b", "acc_c"] {
            let key = CacheKey::health(account);
            let _: u32 = cache.get_or_compute(&key, || async { Ok(1) }).await.unwrap();
        }
        let failed: EngineResult<u32> = cache
            .get_or_compute(&CacheKey::health("acc_d"), || async {
                Err(EngineError::StoreUnavailable(StoreError::Unavailable("down".into())))
            })
            .await;
        assert!(failed.is_err());
        cache.invalidate("acc_e").await;

        assert!(cache.generations.lock().await.is_empty());

        // A fresh counter after pruning still lets results be stored.
        cache.invalidate("acc_a").await;
        let key = CacheKey::sales("acc_a", ProjectionPeriod::Week);
        let _: u32 = cache.get_or_compute(&key, || async { Ok(7) }).await.unwrap();
        let cached: u32 = cache.get_or_compute(&key, || async { Ok(8) }).await.unwrap();
        assert_eq!(cached, 7);
    }

    #[tokio::test]
    async fn test_single_flight_coalesces_concurrent_misses() {
        let (_, cache) = memory_cache(true);
        let key = CacheKey::sales("acc", ProjectionPeriod::Quarter);
        let calls = AtomicUsize::new(0);

        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok::<u32, EngineError>(5)
        };
        let (a, b) = tokio::join!(cache.get_or_compute(&key, compute), cache.get_or_compute(&key, compute));

        assert_eq!((a.unwrap(), b.unwrap()), (5, 5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.flights.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_without_single_flight_both_compute() {
        let (_, cache) = memory_cache(false);
        let key = CacheKey::sales("acc", ProjectionPeriod::Quarter);
        let calls = AtomicUsize::new(0);

        let compute = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok::<u32, EngineError>(5)
        };
        let (a, b) = tokio::join!(cache.get_or_compute(&key, compute), cache.get_or_compute(&key, compute));

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_broken_backend_degrades_to_recompute() {
        let cache = ProjectionCache::new(Arc::new(BrokenCache), CachePolicy::default());
        let key = CacheKey::health("acc");
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: u32 = cache
                .get_or_compute(&key, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await
                .unwrap();
            assert_eq!(value, 1);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.invalidate("acc").await, 0);
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let (backend, cache) = memory_cache(true);
        let key = CacheKey::health("acc");
        backend
            .set(&key.to_string(), "{not json", Duration::from_secs(60))
            .await
            .unwrap();

        let value: u32 = cache.get_or_compute(&key, || async { Ok(4) }).await.unwrap();
        assert_eq!(value, 4);
        assert_eq!(backend.get(&key.to_string()).await.unwrap().as_deref(), Some("4"));
    }
}
