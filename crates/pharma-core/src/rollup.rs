//! # Daily Roll-up (Pure Half)
//!
//! Partitions historical sales records by (branch, day) and turns each
//! partition into one denormalized [`DailyKpiSummary`].
//!
//! ## Process
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Daily Roll-up                                      │
//! │                                                                         │
//! │  full record history                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  partition_by_branch_day()                                             │
//! │       │                                                                 │
//! │       ├── (branch 1, 2025-08-24) ──► build_daily_summary()             │
//! │       ├── (branch 1, 2025-08-25) ──► build_daily_summary()             │
//! │       ├── (branch 2, 2025-08-25) ──► build_daily_summary()             │
//! │       └── (no branch, 2025-08-25) ─► build_daily_summary()             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<DailyKpiSummary> ──► pharma-db replace_all (delete + reinsert)    │
//! │                                                                         │
//! │  Partitions are independent: summaries may be built concurrently.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//! Each partition's near-expiry count is evaluated against the partition's
//! own date, not the wall clock, so re-running the roll-up months later
//! reproduces the same summaries.

use std::collections::BTreeMap;
use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kpi::{self, InventoryLevelView, TopSellerView};
use crate::money::Money;
use crate::types::SalesRecord;
use crate::{DEFAULT_NEAR_EXPIRY_DAYS, ROLLUP_TOP_SELLERS};

// =============================================================================
// Daily KPI Summary
// =============================================================================

/// The one persisted KPI artifact: a denormalized snapshot of every KPI
/// view for one (branch, day) partition.
///
/// ## Lifecycle
/// Created (or wholly replaced) only by the roll-up process; read-only to
/// the query service; never mutated field-by-field. Recomputing a key
/// overwrites its previous summary - the roll-up persists with
/// delete-all-then-reinsert semantics, so a full re-run is idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyKpiSummary {
    /// Unique identifier (UUID v4), fresh on every roll-up run.
    pub id: String,

    /// Partition branch; `None` for single-branch (branchless) records.
    pub branch_id: Option<i64>,

    /// Partition day.
    pub date: NaiveDate,

    /// Count of stock-out events on this day.
    pub total_stockouts: i64,

    /// Count of records within the near-expiry horizon of this day.
    pub total_near_expiries: i64,

    /// Top sellers of the day, ranked by sales value.
    pub top_sellers: Vec<TopSellerView>,

    /// Units of prescription product sold.
    pub total_rx_volume: i64,

    /// Day sales total.
    pub total_sales_value: Money,

    /// `total_sales_value - total_cash_received` for the day.
    /// Positive = till shortfall; same sign convention as the live
    /// cash-reconciliation reducer.
    pub cash_discrepancy: Money,

    /// Inventory positions, restricted to the day's top sellers.
    pub inventory_levels_top_sellers: Vec<InventoryLevelView>,

    /// Human-readable one-line report for dashboards and alerts.
    pub description: String,
}

// =============================================================================
// Partitioning
// =============================================================================

/// Groups records by (branch, day).
///
/// Branchless records form their own `(None, date)` partitions, so a
/// single-branch deployment rolls up without fabricating a branch id.
/// Within each partition the input order is preserved - the last-seen
/// inventory snapshot depends on it.
pub fn partition_by_branch_day(
    records: Vec<SalesRecord>,
) -> BTreeMap<(Option<i64>, NaiveDate), Vec<SalesRecord>> {
    let mut partitions: BTreeMap<(Option<i64>, NaiveDate), Vec<SalesRecord>> = BTreeMap::new();
    for record in records {
        partitions
            .entry((record.branch_id, record.date))
            .or_default()
            .push(record);
    }
    partitions
}

// =============================================================================
// Summary Construction
// =============================================================================

/// Builds one summary for a (branch, day) partition.
///
/// Invokes the KPI reducers over the partition: stock-outs, near-expiries
/// with the partition date as "today", top sellers capped at
/// [`ROLLUP_TOP_SELLERS`], Rx volume, sales total, cash reconciliation,
/// and inventory levels restricted to the day's top-seller products.
pub fn build_daily_summary(
    branch_id: Option<i64>,
    date: NaiveDate,
    records: &[SalesRecord],
) -> DailyKpiSummary {
    let stockouts = kpi::stock_outs(records);
    let near_expiries = kpi::near_expiries(records, date, DEFAULT_NEAR_EXPIRY_DAYS);
    let top_sellers = kpi::top_sellers(records, ROLLUP_TOP_SELLERS);
    let total_rx_volume = kpi::rx_volume(records);
    let reconciliation = kpi::cash_reconciliation(records);

    let top_ids: HashSet<&str> = top_sellers.iter().map(|t| t.product_id.as_str()).collect();
    let inventory_levels_top_sellers = kpi::inventory_levels(records)
        .into_iter()
        .filter(|level| top_ids.contains(level.product_id.as_str()))
        .collect();

    let description = format!(
        "Daily KPI report for {}. Total sales: {}, Rx volume: {} units, \
         Stockouts: {} products, Near expiries: {} products.",
        date.format("%Y-%m-%d"),
        reconciliation.total_sales_value,
        total_rx_volume,
        stockouts.len(),
        near_expiries.len(),
    );

    DailyKpiSummary {
        id: Uuid::new_v4().to_string(),
        branch_id,
        date,
        total_stockouts: stockouts.len() as i64,
        total_near_expiries: near_expiries.len() as i64,
        top_sellers,
        total_rx_volume,
        total_sales_value: reconciliation.total_sales_value,
        cash_discrepancy: reconciliation.discrepancy,
        inventory_levels_top_sellers,
        description,
    }
}

/// Rolls the full record history up into one summary per (branch, day).
pub fn roll_up(records: Vec<SalesRecord>) -> Vec<DailyKpiSummary> {
    partition_by_branch_day(records)
        .into_iter()
        .map(|((branch_id, date), partition)| build_daily_summary(branch_id, date, &partition))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        branch: Option<i64>,
        date: NaiveDate,
        product: &str,
        category: Category,
        inventory: i64,
        qty: i64,
        price_cents: i64,
        cash_cents: i64,
    ) -> SalesRecord {
        SalesRecord {
            id: format!("test-{product}"),
            branch_id: branch,
            date,
            product_id: product.to_string(),
            product_name: format!("{product} name"),
            category,
            inventory_level: inventory,
            quantity_sold: qty,
            price_per_unit: Money::from_cents(price_cents),
            cash_received: Money::from_cents(cash_cents),
            expiration_date: None,
        }
    }

    #[test]
    fn test_partitioning_by_branch_and_day() {
        let d1 = day(2025, 8, 24);
        let d2 = day(2025, 8, 25);
        let records = vec![
            record(Some(1), d1, "A", Category::Otc, 10, 1, 100, 100),
            record(Some(1), d2, "A", Category::Otc, 10, 1, 100, 100),
            record(Some(2), d2, "A", Category::Otc, 10, 1, 100, 100),
            record(None, d2, "A", Category::Otc, 10, 1, 100, 100),
            record(Some(1), d1, "B", Category::Otc, 10, 1, 100, 100),
        ];

        let partitions = partition_by_branch_day(records);
        assert_eq!(partitions.len(), 4);
        assert_eq!(partitions[&(Some(1), d1)].len(), 2);
        assert_eq!(partitions[&(Some(1), d2)].len(), 1);
        assert_eq!(partitions[&(Some(2), d2)].len(), 1);
        assert_eq!(partitions[&(None, d2)].len(), 1);
    }

    #[test]
    fn test_partition_preserves_input_order() {
        let d = day(2025, 8, 25);
        let mut first = record(Some(1), d, "A", Category::Otc, 100, 10, 100, 0);
        first.id = "first".to_string();
        let mut second = record(Some(1), d, "A", Category::Otc, 90, 5, 100, 0);
        second.id = "second".to_string();

        let partitions = partition_by_branch_day(vec![first, second]);
        let partition = &partitions[&(Some(1), d)];
        assert_eq!(partition[0].id, "first");
        assert_eq!(partition[1].id, "second");
    }

    #[test]
    fn test_summary_fields() {
        let d = day(2025, 8, 25);
        let records = vec![
            record(Some(1), d, "P001", Category::Otc, 100, 10, 1000, 10000), // $100
            record(Some(1), d, "P002", Category::Rx, 50, 5, 2000, 9000),     // $100, cash $90
            record(Some(1), d, "P003", Category::Otc, 0, 2, 500, 1000),      // stock-out, $10
        ];

        let summary = build_daily_summary(Some(1), d, &records);

        assert_eq!(summary.branch_id, Some(1));
        assert_eq!(summary.date, d);
        assert_eq!(summary.total_stockouts, 1);
        assert_eq!(summary.total_rx_volume, 5);
        assert_eq!(summary.total_sales_value, Money::from_cents(21000));
        // sales $210.00 vs cash $200.00 → short $10.00
        assert_eq!(summary.cash_discrepancy, Money::from_cents(1000));
        assert_eq!(summary.top_sellers.len(), 3);
        assert_eq!(summary.top_sellers[0].product_id, "P001");
        assert_eq!(
            summary.description,
            "Daily KPI report for 2025-08-25. Total sales: $210.00, Rx volume: 5 units, \
             Stockouts: 1 products, Near expiries: 0 products."
        );
    }

    #[test]
    fn test_summary_caps_top_sellers_at_three() {
        let d = day(2025, 8, 25);
        let records: Vec<SalesRecord> = (0..5)
            .map(|i| {
                record(
                    Some(1),
                    d,
                    &format!("P{i}"),
                    Category::Otc,
                    10,
                    i + 1,
                    1000,
                    0,
                )
            })
            .collect();

        let summary = build_daily_summary(Some(1), d, &records);
        assert_eq!(summary.top_sellers.len(), 3);
        // Ranked by value: P4 (5 units) first
        assert_eq!(summary.top_sellers[0].product_id, "P4");
    }

    #[test]
    fn test_summary_inventory_restricted_to_top_sellers() {
        let d = day(2025, 8, 25);
        let records = vec![
            record(Some(1), d, "BIG1", Category::Otc, 50, 30, 1000, 0),
            record(Some(1), d, "BIG2", Category::Otc, 50, 20, 1000, 0),
            record(Some(1), d, "BIG3", Category::Otc, 50, 10, 1000, 0),
            record(Some(1), d, "SMALL", Category::Otc, 50, 1, 100, 0),
        ];

        let summary = build_daily_summary(Some(1), d, &records);
        let ids: Vec<&str> = summary
            .inventory_levels_top_sellers
            .iter()
            .map(|l| l.product_id.as_str())
            .collect();

        assert_eq!(ids, vec!["BIG1", "BIG2", "BIG3"]);
    }

    #[test]
    fn test_summary_near_expiry_uses_partition_date() {
        let d = day(2025, 8, 25);
        let mut expiring = record(Some(1), d, "P001", Category::Otc, 10, 1, 100, 100);
        expiring.expiration_date = Some(day(2025, 9, 10)); // 16 days after partition day
        let mut distant = record(Some(1), d, "P002", Category::Otc, 10, 1, 100, 100);
        distant.expiration_date = Some(day(2026, 3, 1));

        let summary = build_daily_summary(Some(1), d, &[expiring, distant]);
        assert_eq!(summary.total_near_expiries, 1);
    }

    #[test]
    fn test_roll_up_one_summary_per_partition() {
        let d1 = day(2025, 8, 24);
        let d2 = day(2025, 8, 25);
        let records = vec![
            record(Some(1), d1, "A", Category::Otc, 10, 1, 100, 100),
            record(Some(1), d2, "A", Category::Otc, 10, 1, 100, 100),
            record(Some(2), d2, "A", Category::Otc, 10, 1, 100, 100),
        ];

        let summaries = roll_up(records);
        assert_eq!(summaries.len(), 3);

        // BTreeMap iteration gives (branch, date) ascending with None first
        assert_eq!(summaries[0].branch_id, Some(1));
        assert_eq!(summaries[0].date, d1);
        assert_eq!(summaries[2].branch_id, Some(2));
    }

    #[test]
    fn test_roll_up_deterministic_apart_from_ids() {
        let d = day(2025, 8, 25);
        let records = vec![
            record(Some(1), d, "P001", Category::Rx, 100, 10, 1000, 10000),
            record(Some(2), d, "P002", Category::Otc, 0, 2, 500, 1000),
        ];

        let mut a = roll_up(records.clone());
        let mut b = roll_up(records);
        for summary in a.iter_mut().chain(b.iter_mut()) {
            summary.id = String::new();
        }
        assert_eq!(a, b);
    }
}
