//! # Projection Service
//!
//! The engine's public face. One instance per process, built with its
//! collaborators injected; nothing global.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate_cashflow_projection("acc_1", 30)                            │
//! │       │                                                                 │
//! │       ├── validate account id, period            (no I/O on failure)   │
//! │       ▼                                                                 │
//! │  ProjectionCache  projection:acc_1:cashflow:30 ──hit──► return         │
//! │       │ miss                                                            │
//! │       ├── calculate_sales_projection (cached, projection:acc_1:sales:30)│
//! │       │        └── HistoryStore::fetch_confirmed_sales(acc_1, -90d)     │
//! │       ├── HistoryStore::fetch_ad_spend(acc_1, -30d)                     │
//! │       ├── lucra_core::cashflow::project_cashflow                        │
//! │       ▼                                                                 │
//! │  store (6h) unless invalidated meanwhile ──► return                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Live vs As-Of
//! `calculate_*` run against "now" and go through the cache. The as-of forms
//! (`sales_projection`, `cashflow_projection`, `health_score_at`,
//! `seasonality_report_at`) compute directly: cache keys carry no date, so a
//! historical result must never be stored under them.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{EngineResult, StoreError};
use crate::events::InvalidationEvent;
use crate::projection_cache::{CacheKey, ProjectionCache};
use crate::store::HistoryStore;
use lucra_core::cashflow::{project_cashflow, AD_SPEND_LOOKBACK_DAYS};
use lucra_core::health::{assess_health, HEALTH_LOOKBACK_DAYS};
use lucra_core::projection::{lookback_days, project_sales, BASE_LOOKBACK_DAYS};
use lucra_core::seasonality::seasonality_report;
use lucra_core::validation::{validate_account_id, validate_period};
use lucra_core::window::TimeWindow;
use lucra_core::{
    CashflowProjection, HealthScore, ProjectionPeriod, ProjectionRequest, ProjectionResult, SeasonalityReport,
    TransactionRecord, TransactionStatus,
};

/// Sales forecasts, cashflow projections and health scores per account.
pub struct ProjectionService {
    store: Arc<dyn HistoryStore>,
    cache: ProjectionCache,
}

impl std::fmt::Debug for ProjectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionService")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl ProjectionService {
    pub fn new(store: Arc<dyn HistoryStore>, cache: ProjectionCache) -> Self {
        info!(cache = cache.backend().backend(), "Projection service ready");
        ProjectionService { store, cache }
    }

    /// A service that recomputes on every call.
    pub fn uncached(store: Arc<dyn HistoryStore>) -> Self {
        Self::new(store, ProjectionCache::disabled())
    }

    /// Opens the SQLite store and cache backend described by `config`.
    pub async fn from_config(config: &EngineConfig) -> Result<Self, StoreError> {
        let db = lucra_db::Database::new(config.db_config()).await?;
        let backend = crate::cache::build_cache(&config.cache).await;
        Ok(Self::new(Arc::new(db), ProjectionCache::new(backend, config.cache.policy())))
    }

    pub fn cache(&self) -> &ProjectionCache {
        &self.cache
    }

    // =========================================================================
    // Live (cached)
    // =========================================================================

    /// Three-scenario sales forecast for the next `period_days` days.
    pub async fn calculate_sales_projection(
        &self,
        account_id: &str,
        period_days: u32,
    ) -> EngineResult<ProjectionResult> {
        validate_account_id(account_id)?;
        let period = validate_period(period_days)?;
        self.cached_sales(account_id, period).await
    }

    /// Sales forecast combined with projected spend.
    pub async fn calculate_cashflow_projection(
        &self,
        account_id: &str,
        period_days: u32,
    ) -> EngineResult<CashflowProjection> {
        validate_account_id(account_id)?;
        let period = validate_period(period_days)?;

        let key = CacheKey::cashflow(account_id, period);
        let ttl = self.cache.ttl(&key);
        self.cache
            .get_or_compute(&key, || async move {
                let sales = self.cached_sales(account_id, period).await?;
                let as_of = Utc::now();
                self.compute_cashflow(account_id, sales, as_of, expires_at(as_of, ttl)).await
            })
            .await
    }

    /// Composite health score over the last 90 days.
    pub async fn calculate_health_score(&self, account_id: &str) -> EngineResult<HealthScore> {
        validate_account_id(account_id)?;

        let key = CacheKey::health(account_id);
        let ttl = self.cache.ttl(&key);
        self.cache
            .get_or_compute(&key, || async move {
                let as_of = Utc::now();
                self.compute_health(account_id, as_of, expires_at(as_of, ttl)).await
            })
            .await
    }

    /// Heuristic and observed weekday tables. Never cached.
    pub async fn seasonality_report(&self, account_id: &str) -> EngineResult<SeasonalityReport> {
        self.seasonality_report_at(account_id, Utc::now()).await
    }

    /// Drops every cached result of `account_id`. Returns entries deleted.
    pub async fn invalidate_cache(&self, account_id: &str, event: InvalidationEvent) -> EngineResult<u64> {
        validate_account_id(account_id)?;
        info!(account_id, event = %event, "Invalidating projection cache");
        Ok(self.cache.invalidate(account_id).await)
    }

    // =========================================================================
    // As-of (uncached)
    // =========================================================================

    /// Sales forecast as it would have been computed at `request.as_of`.
    pub async fn sales_projection(&self, request: &ProjectionRequest) -> EngineResult<ProjectionResult> {
        validate_account_id(&request.account_id)?;
        let ttl = self.cache.ttl(&CacheKey::sales(&request.account_id, request.period));
        self.compute_sales(
            &request.account_id,
            request.period,
            request.as_of,
            expires_at(request.as_of, ttl),
        )
        .await
    }

    /// Cashflow projection as it would have been computed at `request.as_of`.
    pub async fn cashflow_projection(&self, request: &ProjectionRequest) -> EngineResult<CashflowProjection> {
        let sales = self.sales_projection(request).await?;
        let ttl = self.cache.ttl(&CacheKey::cashflow(&request.account_id, request.period));
        self.compute_cashflow(&request.account_id, sales, request.as_of, expires_at(request.as_of, ttl))
            .await
    }

    /// Health score as it would have been computed at `as_of`.
    pub async fn health_score_at(&self, account_id: &str, as_of: DateTime<Utc>) -> EngineResult<HealthScore> {
        validate_account_id(account_id)?;
        let ttl = self.cache.ttl(&CacheKey::health(account_id));
        self.compute_health(account_id, as_of, expires_at(as_of, ttl)).await
    }

    /// Seasonality tables over the 90 days before `as_of`.
    pub async fn seasonality_report_at(
        &self,
        account_id: &str,
        as_of: DateTime<Utc>,
    ) -> EngineResult<SeasonalityReport> {
        validate_account_id(account_id)?;
        let since = TimeWindow::trailing(as_of, BASE_LOOKBACK_DAYS).start;
        let sales = self.load_sales(account_id, since).await?;
        Ok(seasonality_report(&sales, as_of)?)
    }

    // =========================================================================
    // Computation
    // =========================================================================

    async fn cached_sales(&self, account_id: &str, period: ProjectionPeriod) -> EngineResult<ProjectionResult> {
        let key = CacheKey::sales(account_id, period);
        let ttl = self.cache.ttl(&key);
        self.cache
            .get_or_compute(&key, || async move {
                let as_of = Utc::now();
                self.compute_sales(account_id, period, as_of, expires_at(as_of, ttl)).await
            })
            .await
    }

    async fn compute_sales(
        &self,
        account_id: &str,
        period: ProjectionPeriod,
        as_of: DateTime<Utc>,
        cache_expires_at: DateTime<Utc>,
    ) -> EngineResult<ProjectionResult> {
        let since = TimeWindow::trailing(as_of, lookback_days(period)).start;
        let sales = self.load_sales(account_id, since).await?;

        let forecast = project_sales(&sales, period, as_of)?;
        debug!(
            account_id,
            period = period.days(),
            days_covered = forecast.days_covered,
            trend = %forecast.trend,
            "Computed sales projection"
        );
        Ok(forecast.into_result(cache_expires_at))
    }

    async fn compute_cashflow(
        &self,
        account_id: &str,
        sales: ProjectionResult,
        as_of: DateTime<Utc>,
        cache_expires_at: DateTime<Utc>,
    ) -> EngineResult<CashflowProjection> {
        let since = TimeWindow::trailing(as_of, AD_SPEND_LOOKBACK_DAYS).start;
        let ad_spend = self.store.fetch_ad_spend(account_id, since).await?;

        let cashflow = project_cashflow(sales, &ad_spend, as_of, cache_expires_at);
        debug!(
            account_id,
            period = cashflow.period.days(),
            expenses = %cashflow.expenses.total,
            "Computed cashflow projection"
        );
        Ok(cashflow)
    }

    async fn compute_health(
        &self,
        account_id: &str,
        as_of: DateTime<Utc>,
        cache_expires_at: DateTime<Utc>,
    ) -> EngineResult<HealthScore> {
        let since = TimeWindow::trailing(as_of, HEALTH_LOOKBACK_DAYS).start;
        let sales = self.load_sales(account_id, since).await?;
        let ad_spend = self.store.fetch_ad_spend(account_id, since).await?;

        let assessment = assess_health(&sales, &ad_spend, as_of)?;
        debug!(
            account_id,
            overall = assessment.overall_score,
            days_covered = assessment.variation.samples,
            "Computed health score"
        );
        Ok(assessment.into_score(cache_expires_at))
    }

    /// Confirmed sales since `since`. Rows of any other status are dropped.
    async fn load_sales(&self, account_id: &str, since: DateTime<Utc>) -> EngineResult<Vec<TransactionRecord>> {
        let mut sales = self.store.fetch_confirmed_sales(account_id, since).await?;
        let fetched = sales.len();
        sales.retain(|s| s.status == TransactionStatus::Confirmed);
        if sales.len() != fetched {
            debug!(account_id, dropped = fetched - sales.len(), "Store returned unconfirmed sales");
        }
        Ok(sales)
    }
}

/// `as_of + ttl`, saturating at `as_of` when out of range.
fn expires_at(as_of: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| as_of.checked_add_signed(ttl))
        .unwrap_or(as_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_expires_at() {
        let as_of = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            expires_at(as_of, Duration::from_secs(3600)),
            Utc.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap()
        );
        assert_eq!(expires_at(as_of, Duration::MAX), as_of);
    }
}
