//! # Transaction Repository
//!
//! Sales transactions per account.
//!
//! ## Status Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  pending ──► confirmed      (payment settled: counts toward history)   │
//! │     │                                                                   │
//! │     └─────► cancelled      (refund / chargeback: never counted)        │
//! │                                                                         │
//! │  Only `confirmed` rows are ever returned to the projection engine.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use lucra_core::{Money, TransactionRecord, TransactionStatus};

/// Row shape of the `transactions` table as the engine reads it.
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: String,
    amount_cents: i64,
    status: TransactionStatus,
    occurred_at: DateTime<Utc>,
}

impl From<TransactionRow> for TransactionRecord {
    fn from(row: TransactionRow) -> Self {
        TransactionRecord {
            id: row.id,
            amount: Money::from_cents(row.amount_cents),
            occurred_at: row.occurred_at,
            status: row.status,
        }
    }
}

/// Repository for sales transactions.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// Confirmed transactions of `account_id` with `occurred_at >= since`,
    /// oldest first.
    pub async fn confirmed_since(
        &self,
        account_id: &str,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<TransactionRecord>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, amount_cents, status, occurred_at
            FROM transactions
            WHERE account_id = ?1
              AND status = ?2
              AND occurred_at >= ?3
            ORDER BY occurred_at
            "#,
        )
        .bind(account_id)
        .bind(TransactionStatus::Confirmed)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        debug!(account_id, since = %since, rows = rows.len(), "Fetched confirmed sales");

        Ok(rows.into_iter().map(TransactionRecord::from).collect())
    }

    /// Appends a transaction for `account_id`.
    pub async fn insert(&self, account_id: &str, record: &TransactionRecord) -> DbResult<()> {
        debug!(id = %record.id, account_id, "Inserting transaction");

        sqlx::query(
            r#"
            INSERT INTO transactions (id, account_id, amount_cents, status, occurred_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&record.id)
        .bind(account_id)
        .bind(record.amount.cents())
        .bind(record.status)
        .bind(record.occurred_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Moves a transaction to a new status (e.g. pending → confirmed).
    pub async fn set_status(&self, id: &str, status: TransactionStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE transactions SET status = ?1 WHERE id = ?2")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Transaction", id));
        }
        Ok(())
    }

    /// Number of transactions (any status) stored for `account_id`.
    pub async fn count(&self, account_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions WHERE account_id = ?1")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).unwrap()
    }

    fn record(id: &str, cents: i64, days_ago: i64, status: TransactionStatus) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            amount: Money::from_cents(cents),
            occurred_at: now() - Duration::days(days_ago),
            status,
        }
    }

    async fn repo() -> TransactionRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().transactions()
    }

    #[tokio::test]
    async fn test_only_confirmed_rows_are_returned() {
        let repo = repo().await;
        repo.insert("acc_1", &record("t1", 1_000, 1, TransactionStatus::Confirmed)).await.unwrap();
        repo.insert("acc_1", &record("t2", 2_000, 1, TransactionStatus::Pending)).await.unwrap();
        repo.insert("acc_1", &record("t3", 3_000, 1, TransactionStatus::Cancelled)).await.unwrap();

        let sales = repo.confirmed_since("acc_1", now() - Duration::days(30)).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].id, "t1");
        assert_eq!(sales[0].amount, Money::from_cents(1_000));
        assert_eq!(sales[0].occurred_at, now() - Duration::days(1));
    }

    #[tokio::test]
    async fn test_since_bound_and_account_isolation() {
        let repo = repo().await;
        repo.insert("acc_1", &record("old", 1_000, 100, TransactionStatus::Confirmed)).await.unwrap();
        repo.insert("acc_1", &record("edge", 1_000, 90, TransactionStatus::Confirmed)).await.unwrap();
        repo.insert("acc_1", &record("new", 1_000, 2, TransactionStatus::Confirmed)).await.unwrap();
        repo.insert("acc_2", &record("other", 1_000, 2, TransactionStatus::Confirmed)).await.unwrap();

        let sales = repo.confirmed_since("acc_1", now() - Duration::days(90)).await.unwrap();
        let ids: Vec<_> = sales.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["edge", "new"]);
    }

    #[tokio::test]
    async fn test_set_status_confirms_pending_sale() {
        let repo = repo().await;
        repo.insert("acc_1", &record("t1", 5_000, 3, TransactionStatus::Pending)).await.unwrap();
        assert!(repo.confirmed_since("acc_1", now() - Duration::days(7)).await.unwrap().is_empty());

        repo.set_status("t1", TransactionStatus::Confirmed).await.unwrap();
        assert_eq!(repo.confirmed_since("acc_1", now() - Duration::days(7)).await.unwrap().len(), 1);

        let err = repo.set_status("missing", TransactionStatus::Confirmed).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let repo = repo().await;
        let sale = record("t1", 1_000, 1, TransactionStatus::Confirmed);
        repo.insert("acc_1", &sale).await.unwrap();

        let err = repo.insert("acc_1", &sale).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(repo.count("acc_1").await.unwrap(), 1);
    }
}
