//! # Daily KPI Summary Repository
//!
//! Persistence and query surface for the denormalized daily summaries the
//! roll-up produces.
//!
//! ## Write/Read Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Daily Summary Access                                 │
//! │                                                                         │
//! │  WRITE (roll-up job only)                                              │
//! │     └── replace_all() ── one transaction: DELETE all, reinsert all     │
//! │         Re-running the roll-up reproduces the table exactly;           │
//! │         summaries are never mutated field-by-field.                    │
//! │                                                                         │
//! │  READ (query service)                                                  │
//! │     ├── get_daily_kpis(branch?, start?, end?)                          │
//! │     ├── get_kpi_trends(branch?, now)  ── date >= now - 7 days          │
//! │     └── get_kpi_alerts(branch?)       ── stockout days only           │
//! │         All reads return date-ascending Vecs; no pagination.          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `top_sellers` and `inventory_levels_top_sellers` columns hold JSON
//! text; rows are mapped by hand because of them.

use chrono::{Duration, NaiveDate};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use pharma_core::kpi::{InventoryLevelView, TopSellerView};
use pharma_core::rollup::DailyKpiSummary;
use pharma_core::{Money, TREND_WINDOW_DAYS};

const SELECT_SUMMARIES: &str = "SELECT id, branch_id, date, total_stockouts, total_near_expiries, \
     top_sellers, total_rx_volume, total_sales_value_cents, \
     cash_discrepancy_cents, inventory_levels_top_sellers, description \
     FROM daily_kpis";

/// Repository for daily-summary database operations.
#[derive(Debug, Clone)]
pub struct DailyKpiRepository {
    pool: SqlitePool,
}

impl DailyKpiRepository {
    /// Creates a new DailyKpiRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DailyKpiRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Write path (roll-up job)
    // -------------------------------------------------------------------------

    /// Replaces the entire summary table with the given summaries, in one
    /// transaction.
    ///
    /// Delete-all-then-reinsert keeps a full roll-up run idempotent: no
    /// stale partition survives, and a mid-run failure rolls back to the
    /// previous complete table.
    pub async fn replace_all(&self, summaries: &[DailyKpiSummary]) -> DbResult<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("DELETE FROM daily_kpis")
            .execute(&mut *tx)
            .await?;

        for summary in summaries {
            let top_sellers = serde_json::to_string(&summary.top_sellers)?;
            let inventory = serde_json::to_string(&summary.inventory_levels_top_sellers)?;

            sqlx::query(
                "INSERT INTO daily_kpis ( \
                     id, branch_id, date, total_stockouts, total_near_expiries, \
                     top_sellers, total_rx_volume, total_sales_value_cents, \
                     cash_discrepancy_cents, inventory_levels_top_sellers, description \
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )
            .bind(&summary.id)
            .bind(summary.branch_id)
            .bind(summary.date)
            .bind(summary.total_stockouts)
            .bind(summary.total_near_expiries)
            .bind(top_sellers)
            .bind(summary.total_rx_volume)
            .bind(summary.total_sales_value)
            .bind(summary.cash_discrepancy)
            .bind(inventory)
            .bind(&summary.description)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = summaries.len(), "Replaced daily KPI summaries");
        Ok(summaries.len())
    }

    // -------------------------------------------------------------------------
    // Read path (query service)
    // -------------------------------------------------------------------------

    /// Fetches summaries, optionally filtered by branch and an inclusive
    /// date range. Date-ascending.
    pub async fn get_daily_kpis(
        &self,
        branch_id: Option<i64>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> DbResult<Vec<DailyKpiSummary>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_SUMMARIES);
        query.push(" WHERE 1 = 1");

        if let Some(branch) = branch_id {
            query.push(" AND branch_id = ").push_bind(branch);
        }
        if let Some(start) = start {
            query.push(" AND date >= ").push_bind(start);
        }
        if let Some(end) = end {
            query.push(" AND date <= ").push_bind(end);
        }
        query.push(" ORDER BY date ASC");

        let rows = query.build().fetch_all(&self.pool).await?;
        let summaries = rows
            .iter()
            .map(summary_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        debug!(count = summaries.len(), "Fetched daily KPI summaries");
        Ok(summaries)
    }

    /// Fetches the trend window: every summary dated on or after
    /// `now - `[`TREND_WINDOW_DAYS`]. Date-ascending.
    ///
    /// Only a lower bound applies - a summary dated after `now` (backfill
    /// of late-arriving records, clock skew at ingest) still belongs to
    /// the feed. `now` is injected by the caller so trend queries stay
    /// reproducible in tests and backfills.
    pub async fn get_kpi_trends(
        &self,
        branch_id: Option<i64>,
        now: NaiveDate,
    ) -> DbResult<Vec<DailyKpiSummary>> {
        let cutoff = now - Duration::days(TREND_WINDOW_DAYS);
        self.get_daily_kpis(branch_id, Some(cutoff), None).await
    }

    /// Fetches summaries with at least one stock-out, date-ascending.
    ///
    /// This is the alert feed: a day appears exactly when something sold
    /// against zero inventory.
    pub async fn get_kpi_alerts(&self, branch_id: Option<i64>) -> DbResult<Vec<DailyKpiSummary>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_SUMMARIES);
        query.push(" WHERE total_stockouts > 0");

        if let Some(branch) = branch_id {
            query.push(" AND branch_id = ").push_bind(branch);
        }
        query.push(" ORDER BY date ASC");

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(summary_from_row).collect()
    }

    /// Counts stored summaries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM daily_kpis")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Maps a daily_kpis row, decoding the two JSON view columns.
fn summary_from_row(row: &SqliteRow) -> DbResult<DailyKpiSummary> {
    let top_sellers_json: String = row.try_get("top_sellers")?;
    let inventory_json: String = row.try_get("inventory_levels_top_sellers")?;

    let top_sellers: Vec<TopSellerView> = serde_json::from_str(&top_sellers_json)?;
    let inventory_levels_top_sellers: Vec<InventoryLevelView> =
        serde_json::from_str(&inventory_json)?;

    Ok(DailyKpiSummary {
        id: row.try_get("id")?,
        branch_id: row.try_get("branch_id")?,
        date: row.try_get("date")?,
        total_stockouts: row.try_get("total_stockouts")?,
        total_near_expiries: row.try_get("total_near_expiries")?,
        top_sellers,
        total_rx_volume: row.try_get("total_rx_volume")?,
        total_sales_value: Money::from_cents(row.try_get("total_sales_value_cents")?),
        cash_discrepancy: Money::from_cents(row.try_get("cash_discrepancy_cents")?),
        inventory_levels_top_sellers,
        description: row.try_get("description")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn summary(id: &str, branch: Option<i64>, date: NaiveDate, stockouts: i64) -> DailyKpiSummary {
        DailyKpiSummary {
            id: id.to_string(),
            branch_id: branch,
            date,
            total_stockouts: stockouts,
            total_near_expiries: 2,
            top_sellers: vec![TopSellerView {
                product_id: "P001".to_string(),
                product_name: "Amoxicillin 250mg".to_string(),
                total_sales_value: Money::from_cents(12500),
            }],
            total_rx_volume: 5,
            total_sales_value: Money::from_cents(21000),
            cash_discrepancy: Money::from_cents(1000),
            inventory_levels_top_sellers: vec![InventoryLevelView {
                product_id: "P001".to_string(),
                product_name: "Amoxicillin 250mg".to_string(),
                initial_inventory: 50,
                quantity_sold_total: 10,
                current_inventory: 40,
            }],
            description: "Daily KPI report for 2025-08-25.".to_string(),
        }
    }

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_replace_all_roundtrips_json_columns() {
        let db = test_db().await;
        let repo = db.daily_kpis();

        let original = summary("s1", Some(1), day(2025, 8, 25), 1);
        repo.replace_all(std::slice::from_ref(&original)).await.unwrap();

        let fetched = repo.get_daily_kpis(None, None, None).await.unwrap();
        assert_eq!(fetched, vec![original]);
    }

    #[tokio::test]
    async fn test_replace_all_discards_previous_table() {
        let db = test_db().await;
        let repo = db.daily_kpis();

        repo.replace_all(&[summary("old", Some(1), day(2025, 8, 24), 0)])
            .await
            .unwrap();
        repo.replace_all(&[summary("new", Some(1), day(2025, 8, 25), 0)])
            .await
            .unwrap();

        let fetched = repo.get_daily_kpis(None, None, None).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "new");
    }

    #[tokio::test]
    async fn test_get_daily_kpis_filters_and_orders() {
        let db = test_db().await;
        let repo = db.daily_kpis();

        repo.replace_all(&[
            summary("b1-late", Some(1), day(2025, 8, 27), 0),
            summary("b1-early", Some(1), day(2025, 8, 25), 0),
            summary("b2", Some(2), day(2025, 8, 26), 0),
            summary("branchless", None, day(2025, 8, 26), 0),
        ])
        .await
        .unwrap();

        let fetched = repo
            .get_daily_kpis(Some(1), Some(day(2025, 8, 25)), Some(day(2025, 8, 27)))
            .await
            .unwrap();
        let ids: Vec<&str> = fetched.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b1-early", "b1-late"]);
    }

    #[tokio::test]
    async fn test_trends_lower_bound_is_seven_days_before_now() {
        let db = test_db().await;
        let repo = db.daily_kpis();
        let now = day(2025, 8, 29);

        repo.replace_all(&[
            summary("cutoff-edge", Some(1), day(2025, 8, 22), 0), // now - 7
            summary("recent", Some(1), day(2025, 8, 28), 0),
            summary("stale", Some(1), day(2025, 8, 21), 0),
        ])
        .await
        .unwrap();

        let fetched = repo.get_kpi_trends(Some(1), now).await.unwrap();
        let ids: Vec<&str> = fetched.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["cutoff-edge", "recent"]);
    }

    #[tokio::test]
    async fn test_trends_keep_summaries_dated_after_now() {
        let db = test_db().await;
        let repo = db.daily_kpis();
        let now = day(2025, 8, 29);

        // Backfilled rows can legitimately carry dates past the injected
        // "now"; the feed has no upper bound.
        repo.replace_all(&[
            summary("recent", Some(1), day(2025, 8, 28), 0),
            summary("ahead", Some(1), day(2025, 9, 1), 0),
        ])
        .await
        .unwrap();

        let fetched = repo.get_kpi_trends(Some(1), now).await.unwrap();
        let ids: Vec<&str> = fetched.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["recent", "ahead"]);
    }

    #[tokio::test]
    async fn test_alerts_only_stockout_days() {
        let db = test_db().await;
        let repo = db.daily_kpis();

        repo.replace_all(&[
            summary("quiet", Some(1), day(2025, 8, 25), 0),
            summary("alert", Some(1), day(2025, 8, 26), 2),
        ])
        .await
        .unwrap();

        let fetched = repo.get_kpi_alerts(None).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, "alert");
    }

    #[tokio::test]
    async fn test_unique_partition_index_rejects_duplicates() {
        let db = test_db().await;
        let repo = db.daily_kpis();

        let result = repo
            .replace_all(&[
                summary("a", Some(1), day(2025, 8, 25), 0),
                summary("b", Some(1), day(2025, 8, 25), 0),
            ])
            .await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
