//! # History Store
//!
//! The read-only view of an account's past the engine projects from.
//!
//! ```text
//!   ProjectionService
//!        │  fetch_confirmed_sales(account, since)
//!        │  fetch_ad_spend(account, since)
//!        ▼
//!   dyn HistoryStore
//!        ├── lucra_db::Database      (SQLite, production)
//!        └── InMemoryHistoryStore    (tests, demos)
//! ```
//!
//! Implementations must only return `Confirmed` sales. The service drops
//! anything else it receives, but never asks the store to filter twice.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::StoreError;
use lucra_core::{ExpenseRecord, TransactionRecord, TransactionStatus};
use lucra_db::Database;

/// Source of confirmed sales and ad spend.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Confirmed sales with `occurred_at >= since`, oldest first.
    async fn fetch_confirmed_sales(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Ad spend with `occurred_at >= since`.
    async fn fetch_ad_spend(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ExpenseRecord>, StoreError>;
}

// =============================================================================
// SQLite
// =============================================================================

#[async_trait]
impl HistoryStore for Database {
    async fn fetch_confirmed_sales(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        Ok(self.transactions().confirmed_since(account_id, since).await?)
    }

    async fn fetch_ad_spend(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ExpenseRecord>, StoreError> {
        Ok(self.ad_spend().since(account_id, since).await?)
    }
}

// =============================================================================
// In-Memory
// =============================================================================

#[derive(Debug, Default)]
struct AccountHistory {
    sales: Vec<TransactionRecord>,
    ad_spend: Vec<ExpenseRecord>,
}

/// Process-local store. Honors the same contract as the SQLite store.
#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    accounts: RwLock<HashMap<String, AccountHistory>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sale of any status.
    pub async fn add_sale(&self, account_id: &str, sale: TransactionRecord) {
        let mut accounts = self.accounts.write().await;
        accounts.entry(account_id.to_string()).or_default().sales.push(sale);
    }

    /// Records an ad spend entry.
    pub async fn add_ad_spend(&self, account_id: &str, spend: ExpenseRecord) {
        let mut accounts = self.accounts.write().await;
        accounts.entry(account_id.to_string()).or_default().ad_spend.push(spend);
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn fetch_confirmed_sales(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let accounts = self.accounts.read().await;
        let mut sales: Vec<TransactionRecord> = accounts
            .get(account_id)
            .map(|h| {
                h.sales
                    .iter()
                    .filter(|s| s.status == TransactionStatus::Confirmed && s.occurred_at >= since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sales.sort_by_key(|s| s.occurred_at);
        Ok(sales)
    }

    async fn fetch_ad_spend(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ExpenseRecord>, StoreError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .get(account_id)
            .map(|h| h.ad_spend.iter().filter(|e| e.occurred_at >= since).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use lucra_core::Money;
    use lucra_db::DbConfig;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_filters_status_and_since() {
        let store = InMemoryHistoryStore::new();
        store
            .add_sale("acc", TransactionRecord::confirmed("new", Money::from_cents(100), now()))
            .await;
        store
            .add_sale("acc", TransactionRecord::confirmed("old", Money::from_cents(100), now() - Duration::days(40)))
            .await;
        let mut pending = TransactionRecord::confirmed("p", Money::from_cents(100), now());
        pending.status = TransactionStatus::Pending;
        store.add_sale("acc", pending).await;

        let sales = store.fetch_confirmed_sales("acc", now() - Duration::days(30)).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, "new");
        assert!(store.fetch_confirmed_sales("other", now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_database_is_a_history_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.transactions()
            .insert("acc", &TransactionRecord::confirmed("t1", Money::from_cents(990), now()))
            .await
            .unwrap();

        let store: &dyn HistoryStore = &db;
        let sales = store.fetch_confirmed_sales("acc", now() - Duration::days(1)).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert!(store.fetch_ad_spend("acc", now()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_closed_database_is_unavailable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let err = db.fetch_confirmed_sales("acc", now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
