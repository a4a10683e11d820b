//! # Sales Record Repository
//!
//! Database operations for raw per-transaction sales records.
//!
//! ## Interaction Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sales Record Flow                                    │
//! │                                                                         │
//! │  1. INGEST                                                             │
//! │     └── insert_raw() → normalize (coerce defaults) → insert_many()     │
//! │                                                                         │
//! │  2. FETCH (request/response, never streaming)                          │
//! │     └── fetch(filter) → complete Vec<SalesRecord> in one call          │
//! │         The reducers only ever see fully-materialized collections;    │
//! │         there is no pagination or incremental consumption.            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use pharma_core::{RawSalesRecord, SalesRecord};

use chrono::NaiveDate;

/// Optional filters applied at the storage boundary before reduction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFilter {
    /// Restrict to one branch.
    pub branch_id: Option<i64>,
    /// Inclusive calendar-day range (start, end).
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

const SELECT_RECORDS: &str = "SELECT id, branch_id, date, product_id, product_name, category, \
     inventory_level, quantity_sold, \
     price_per_unit_cents AS price_per_unit, \
     cash_received_cents AS cash_received, \
     expiration_date \
     FROM sales_records";

/// Repository for sales-record database operations.
#[derive(Debug, Clone)]
pub struct SalesRecordRepository {
    pool: SqlitePool,
}

impl SalesRecordRepository {
    /// Creates a new SalesRecordRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesRecordRepository { pool }
    }

    /// Fetches the record set matching the filter, ordered by date then
    /// insertion order.
    ///
    /// ## Why Ordered?
    /// The last-seen inventory snapshot (and top-seller tie-breaking) depend
    /// on a stable iteration order; date + insertion order reproduces the
    /// order records were observed in.
    pub async fn fetch(&self, filter: &RecordFilter) -> DbResult<Vec<SalesRecord>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_RECORDS);
        query.push(" WHERE 1 = 1");

        if let Some(branch) = filter.branch_id {
            query.push(" AND branch_id = ").push_bind(branch);
        }
        if let Some((start, end)) = filter.date_range {
            query.push(" AND date >= ").push_bind(start);
            query.push(" AND date <= ").push_bind(end);
        }
        query.push(" ORDER BY date, rowid");

        let records = query
            .build_query_as::<SalesRecord>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = records.len(), "Fetched sales records");
        Ok(records)
    }

    /// Inserts a single sales record.
    pub async fn insert(&self, record: &SalesRecord) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO sales_records ( \
                 id, branch_id, date, product_id, product_name, category, \
                 inventory_level, quantity_sold, price_per_unit_cents, \
                 cash_received_cents, expiration_date \
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&record.id)
        .bind(record.branch_id)
        .bind(record.date)
        .bind(&record.product_id)
        .bind(&record.product_name)
        .bind(record.category)
        .bind(record.inventory_level)
        .bind(record.quantity_sold)
        .bind(record.price_per_unit)
        .bind(record.cash_received)
        .bind(record.expiration_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a batch of records inside one transaction.
    ///
    /// ## Returns
    /// The number of records written. All-or-nothing: a failure rolls the
    /// whole batch back.
    pub async fn insert_many(&self, records: &[SalesRecord]) -> DbResult<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for record in records {
            sqlx::query(
                "INSERT INTO sales_records ( \
                     id, branch_id, date, product_id, product_name, category, \
                     inventory_level, quantity_sold, price_per_unit_cents, \
                     cash_received_cents, expiration_date \
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )
            .bind(&record.id)
            .bind(record.branch_id)
            .bind(record.date)
            .bind(&record.product_id)
            .bind(&record.product_name)
            .bind(record.category)
            .bind(record.inventory_level)
            .bind(record.quantity_sold)
            .bind(record.price_per_unit)
            .bind(record.cash_received)
            .bind(record.expiration_date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(count = records.len(), "Inserted sales records");
        Ok(records.len())
    }

    /// Normalizes loosely-typed boundary records and inserts them.
    ///
    /// Malformed optional fields coerce per the documented defaulting
    /// rules; a record with no usable transaction date rejects the whole
    /// batch (nothing partial is written).
    pub async fn insert_raw(&self, raw: Vec<RawSalesRecord>) -> DbResult<usize> {
        let records = raw
            .into_iter()
            .map(RawSalesRecord::normalize)
            .collect::<Result<Vec<_>, _>>()?;

        self.insert_many(&records).await
    }

    /// Counts stored sales records.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales_records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
