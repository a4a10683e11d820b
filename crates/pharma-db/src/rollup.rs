//! # Daily Roll-up (I/O Half)
//!
//! Orchestrates the batch roll-up: fetch the full record history, hand it
//! to the pure partitioning/summary logic in `pharma_core::rollup`, then
//! replace the summary table with the fresh result.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Roll-up Job                                        │
//! │                                                                         │
//! │  records().fetch(all) ──► pharma_core::rollup::roll_up()               │
//! │                                    │                                    │
//! │                                    ▼                                    │
//! │            daily_kpis().replace_all()  (one transaction)               │
//! │                                                                         │
//! │  Exactly one roll-up runs at a time. The job assumes exclusive         │
//! │  write access to daily_kpis; readers keep seeing the previous          │
//! │  complete table until the replace transaction commits.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::record::RecordFilter;

/// Runs the full daily roll-up against the given database.
///
/// ## Returns
/// The number of (branch, day) summaries written.
///
/// Re-running against unchanged records reproduces the same summary table
/// (ids excepted).
pub async fn run_daily_rollup(db: &Database) -> DbResult<usize> {
    info!("Starting daily KPI roll-up");

    let records = db.records().fetch(&RecordFilter::default()).await?;
    info!(records = records.len(), "Fetched sales record history");

    let summaries = pharma_core::rollup::roll_up(records);
    let written = db.daily_kpis().replace_all(&summaries).await?;

    info!(summaries = written, "Daily KPI roll-up complete");
    Ok(written)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::DbConfig;
    use chrono::NaiveDate;
    use pharma_core::{Category, Money, SalesRecord};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, branch: Option<i64>, date: NaiveDate, inventory: i64) -> SalesRecord {
        SalesRecord {
            id: id.to_string(),
            branch_id: branch,
            date,
            product_id: "P001".to_string(),
            product_name: "Paracetamol 500mg".to_string(),
            category: Category::Otc,
            inventory_level: inventory,
            quantity_sold: 4,
            price_per_unit: Money::from_cents(500),
            cash_received: Money::from_cents(2000),
            expiration_date: None,
        }
    }

    #[tokio::test]
    async fn test_rollup_writes_one_summary_per_partition() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.records()
            .insert_many(&[
                record("r1", Some(1), day(2025, 8, 24), 10),
                record("r2", Some(1), day(2025, 8, 25), 10),
                record("r3", Some(2), day(2025, 8, 25), 0),
                record("r4", None, day(2025, 8, 25), 10),
            ])
            .await
            .unwrap();

        let written = run_daily_rollup(&db).await.unwrap();
        assert_eq!(written, 4);

        let alerts = db.daily_kpis().get_kpi_alerts(None).await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].branch_id, Some(2));
    }

    #[tokio::test]
    async fn test_rollup_rerun_is_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.records()
            .insert_many(&[
                record("r1", Some(1), day(2025, 8, 24), 10),
                record("r2", Some(2), day(2025, 8, 25), 10),
            ])
            .await
            .unwrap();

        run_daily_rollup(&db).await.unwrap();
        let mut first = db.daily_kpis().get_daily_kpis(None, None, None).await.unwrap();

        run_daily_rollup(&db).await.unwrap();
        let mut second = db.daily_kpis().get_daily_kpis(None, None, None).await.unwrap();

        assert_eq!(db.daily_kpis().count().await.unwrap(), 2);
        for summary in first.iter_mut().chain(second.iter_mut()) {
            summary.id = String::new();
        }
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_rollup_over_empty_history() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let written = run_daily_rollup(&db).await.unwrap();
        assert_eq!(written, 0);
        assert_eq!(db.daily_kpis().count().await.unwrap(), 0);
    }
}
