//! # Transfer Repository
//!
//! Database operations for the append-only inter-branch transfer log.
//!
//! Transfers are only ever inserted and read back in full; there is no
//! update or delete path, and the aggregators consume the complete log.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use pharma_core::TransferRecord;

/// Repository for transfer-log database operations.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    pool: SqlitePool,
}

impl TransferRepository {
    /// Creates a new TransferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TransferRepository { pool }
    }

    /// Appends a transfer to the log.
    ///
    /// ## Returns
    /// The id of the stored transfer.
    pub async fn insert(&self, transfer: &TransferRecord) -> DbResult<String> {
        sqlx::query(
            "INSERT INTO transfers ( \
                 id, from_branch, to_branch, product_id, quantity, cost_cents, date \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&transfer.id)
        .bind(transfer.from_branch)
        .bind(transfer.to_branch)
        .bind(&transfer.product_id)
        .bind(transfer.quantity)
        .bind(transfer.cost)
        .bind(transfer.date)
        .execute(&self.pool)
        .await?;

        debug!(id = %transfer.id, "Inserted transfer");
        Ok(transfer.id.clone())
    }

    /// Fetches the full transfer log, ordered by date then insertion order.
    pub async fn fetch_all(&self) -> DbResult<Vec<TransferRecord>> {
        let transfers = sqlx::query_as::<_, TransferRecord>(
            "SELECT id, from_branch, to_branch, product_id, quantity, \
             cost_cents AS cost, date \
             FROM transfers ORDER BY date, rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(transfers)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use pharma_core::Money;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn transfer(id: &str, from: i64, to: i64, date: NaiveDate) -> TransferRecord {
        TransferRecord {
            id: id.to_string(),
            from_branch: from,
            to_branch: to,
            product_id: "P001".to_string(),
            quantity: 40,
            cost: Money::from_cents(125),
            date,
        }
    }

    #[tokio::test]
    async fn test_insert_returns_id_and_roundtrips() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.transfers();

        let original = transfer("t1", 1, 2, day(2025, 8, 25));
        let id = repo.insert(&original).await.unwrap();
        assert_eq!(id, "t1");

        let fetched = repo.fetch_all().await.unwrap();
        assert_eq!(fetched, vec![original]);
    }

    #[tokio::test]
    async fn test_fetch_all_ordered_by_date() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.transfers();

        repo.insert(&transfer("t-late", 1, 2, day(2025, 8, 27))).await.unwrap();
        repo.insert(&transfer("t-early", 2, 1, day(2025, 8, 25))).await.unwrap();

        let fetched = repo.fetch_all().await.unwrap();
        let ids: Vec<&str> = fetched.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t-early", "t-late"]);
    }

    #[tokio::test]
    async fn test_negative_quantity_stored_unvalidated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.transfers();

        let mut odd = transfer("t1", 1, 1, day(2025, 8, 25));
        odd.quantity = -5;
        repo.insert(&odd).await.unwrap();

        let fetched = repo.fetch_all().await.unwrap();
        assert_eq!(fetched[0].quantity, -5);
    }
}
