//! # Ad Spend Repository
//!
//! Advertising spend per account. Every row is a realized cost; there is
//! no status column.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use lucra_core::{ExpenseRecord, Money};

#[derive(Debug, sqlx::FromRow)]
struct AdSpendRow {
    id: String,
    amount_cents: i64,
    occurred_at: DateTime<Utc>,
}

impl From<AdSpendRow> for ExpenseRecord {
    fn from(row: AdSpendRow) -> Self {
        ExpenseRecord::new(row.id, Money::from_cents(row.amount_cents), row.occurred_at)
    }
}

/// Repository for ad spend rows.
#[derive(Debug, Clone)]
pub struct AdSpendRepository {
    pool: SqlitePool,
}

impl AdSpendRepository {
    /// Creates a new AdSpendRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AdSpendRepository { pool }
    }

    /// Spend of `account_id` with `occurred_at >= since`, oldest first.
    pub async fn since(&self, account_id: &str, since: DateTime<Utc>) -> DbResult<Vec<ExpenseRecord>> {
        let rows: Vec<AdSpendRow> = sqlx::query_as(
            r#"
            SELECT id, amount_cents, occurred_at
            FROM ad_spend
            WHERE account_id = ?1
              AND occurred_at >= ?2
            ORDER BY occurred_at
            "#,
        )
        .bind(account_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        debug!(account_id, since = %since, rows = rows.len(), "Fetched ad spend");

        Ok(rows.into_iter().map(ExpenseRecord::from).collect())
    }

    /// Appends a spend row. `campaign` is informational only.
    pub async fn insert(
        &self,
        account_id: &str,
        record: &ExpenseRecord,
        campaign: Option<&str>,
    ) -> DbResult<()> {
        debug!(id = %record.id, account_id, "Inserting ad spend");

        sqlx::query(
            r#"
            INSERT INTO ad_spend (id, account_id, amount_cents, campaign, occurred_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&record.id)
        .bind(account_id)
        .bind(record.amount.cents())
        .bind(campaign)
        .bind(record.occurred_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of spend rows stored for `account_id`.
    pub async fn count(&self, account_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ad_spend WHERE account_id = ?1")
            .bind(account_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_fetch_window() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().ad_spend();
        for d in [45_i64, 20, 3] {
            let row = ExpenseRecord::new(format!("ad{d}"), Money::from_cents(d * 100), now() - Duration::days(d));
            repo.insert("acc_1", &row, Some("summer")).await.unwrap();
        }

        let spend = repo.since("acc_1", now() - Duration::days(30)).await.unwrap();
        let ids: Vec<_> = spend.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ad20", "ad3"]);
        assert_eq!(spend[0].amount, Money::from_cents(2_000));
        assert_eq!(repo.count("acc_1").await.unwrap(), 3);
        assert!(repo.since("acc_2", now() - Duration::days(30)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_spend_is_rejected() {
        let repo = Database::new(DbConfig::in_memory()).await.unwrap().ad_spend();
        let row = ExpenseRecord::new("neg", Money::from_cents(-1), now());

        let err = repo.insert("acc_1", &row, None).await.unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(_)));
    }
}
