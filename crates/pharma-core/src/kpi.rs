//! # KPI Reducers
//!
//! Independent pure functions, each consuming a collection of sales records
//! and producing one KPI view.
//!
//! ## Reducer Catalogue
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          KPI Reducers                                   │
//! │                                                                         │
//! │  records ──► stock_outs          ──► Vec<StockOutView>                 │
//! │  records ──► near_expiries       ──► Vec<NearExpiryView>   (needs     │
//! │  records ──► top_sellers         ──► Vec<TopSellerView>     explicit  │
//! │  records ──► rx_volume           ──► i64                    "today")  │
//! │  records ──► total_sales_value   ──► Money                            │
//! │  records ──► cash_reconciliation ──► CashReconciliationView           │
//! │  records ──► inventory_levels    ──► Vec<InventoryLevelView>          │
//! │  records ──► stock_status        ──► Vec<StockStatusView>             │
//! │                                                                         │
//! │  Every reducer is TOTAL: it accepts any record set and never fails.    │
//! │  Pre-filtering by branch or date happens at the storage boundary.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//! The only time-dependent reducer is [`near_expiries`], and it takes the
//! evaluation date as an explicit parameter instead of reading the wall
//! clock. Callers that want "today" resolve it once at the boundary.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Category, SalesRecord};

// =============================================================================
// View Types
// =============================================================================

/// One stock-out event: a sale recorded against zero on-hand inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockOutView {
    pub date: NaiveDate,
    pub product_id: String,
    pub product_name: String,
    /// Units sold while the shelf read empty.
    pub quantity_sold_during_stock_out: i64,
}

/// One product batch expiring within the requested horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearExpiryView {
    pub date: NaiveDate,
    pub product_id: String,
    pub product_name: String,
    pub expiration_date: NaiveDate,
    /// Whole days between the evaluation date and expiry (0 = expires today).
    pub days_to_expiry: i64,
}

/// One entry in the top-sellers ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSellerView {
    pub product_id: String,
    pub product_name: String,
    /// Sum of `quantity_sold * price_per_unit` across the product's records.
    pub total_sales_value: Money,
}

/// Computed sales value versus recorded cash intake.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashReconciliationView {
    pub total_sales_value: Money,
    pub total_cash_received: Money,
    /// `total_sales_value - total_cash_received`.
    /// Positive = the till is short; negative = the till holds excess cash.
    /// This sign convention is used everywhere, including persisted
    /// summaries.
    pub discrepancy: Money,
}

/// Per-product inventory position derived from the record set.
///
/// This is the *last-seen snapshot* approximation: `initial_inventory` is
/// taken from the last record encountered for the product, not from a
/// chronological ledger. A true point-in-time ledger would be a separate
/// reducer, not a change to this one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryLevelView {
    pub product_id: String,
    pub product_name: String,
    /// `inventory_level` of the last-encountered record for this product.
    pub initial_inventory: i64,
    /// Sum of `quantity_sold` across the product's records.
    pub quantity_sold_total: i64,
    /// `initial_inventory - quantity_sold_total`. May go negative, which
    /// signals over-selling relative to the recorded snapshot.
    pub current_inventory: i64,
}

/// Stocking classification for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    Overstocked,
    Understocked,
    Optimal,
    /// Inventory on hand but zero recorded sales.
    OverstockedNoSales,
    /// Neither inventory nor sales.
    NoStockNoSales,
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StockStatus::Overstocked => "Overstocked",
            StockStatus::Understocked => "Understocked",
            StockStatus::Optimal => "Optimal",
            StockStatus::OverstockedNoSales => "Overstocked (No Sales)",
            StockStatus::NoStockNoSales => "No Stock, No Sales",
        };
        f.write_str(label)
    }
}

/// One product's stocking classification, built atop [`inventory_levels`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockStatusView {
    pub product_id: String,
    pub product_name: String,
    pub current_inventory: i64,
    pub quantity_sold_total: i64,
    pub status: StockStatus,
}

// =============================================================================
// Reducers
// =============================================================================

/// Collects stock-out events from the record set.
///
/// A record qualifies when `inventory_level == 0 && quantity_sold > 0`.
/// One entry per qualifying record - a product stocking out on two dates
/// yields two entries. Input order is preserved.
pub fn stock_outs(records: &[SalesRecord]) -> Vec<StockOutView> {
    records
        .iter()
        .filter(|r| r.is_stock_out())
        .map(|r| StockOutView {
            date: r.date,
            product_id: r.product_id.clone(),
            product_name: r.product_name.clone(),
            quantity_sold_during_stock_out: r.quantity_sold,
        })
        .collect()
}

/// Collects records whose batch expires within `threshold_days` of `today`.
///
/// Inclusion condition: `0 <= expiration_date - today <= threshold_days`.
/// Already-expired batches are excluded; a batch expiring today is included
/// with `days_to_expiry == 0`. Records without an expiration date are
/// skipped.
///
/// `today` is an explicit parameter so results are reproducible: the live
/// query surface passes the wall-clock date, the daily roll-up passes each
/// partition's own date.
pub fn near_expiries(
    records: &[SalesRecord],
    today: NaiveDate,
    threshold_days: i64,
) -> Vec<NearExpiryView> {
    records
        .iter()
        .filter_map(|r| {
            let expiration_date = r.expiration_date?;
            let days_to_expiry = (expiration_date - today).num_days();
            if (0..=threshold_days).contains(&days_to_expiry) {
                Some(NearExpiryView {
                    date: r.date,
                    product_id: r.product_id.clone(),
                    product_name: r.product_name.clone(),
                    expiration_date,
                    days_to_expiry,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Ranks products by total sales value and returns the top `top_n`.
///
/// The live query surface passes [`crate::DEFAULT_TOP_SELLERS`]; the daily
/// roll-up passes [`crate::ROLLUP_TOP_SELLERS`].
///
/// ## Ordering
/// Descending by summed `quantity_sold * price_per_unit`. Ties break by
/// first-encountered order: the accumulation walks the input once and the
/// final sort is stable over that insertion order.
///
/// ## Name Resolution
/// The display name comes from the first record carrying the product id;
/// when no record names the product it falls back to `"Unknown"`.
pub fn top_sellers(records: &[SalesRecord], top_n: usize) -> Vec<TopSellerView> {
    let mut totals: HashMap<&str, Money> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();
    let mut names: HashMap<&str, &str> = HashMap::new();

    for record in records {
        let id = record.product_id.as_str();
        let entry = totals.entry(id).or_insert_with(|| {
            first_seen.push(id);
            Money::zero()
        });
        *entry += record.sales_value();
        names.entry(id).or_insert(record.product_name.as_str());
    }

    // Stable sort over first-seen order keeps ties deterministic.
    let mut ranked: Vec<&str> = first_seen;
    ranked.sort_by(|a, b| totals[b].cmp(&totals[a]));

    ranked
        .into_iter()
        .take(top_n)
        .map(|id| TopSellerView {
            product_id: id.to_string(),
            product_name: names.get(id).copied().unwrap_or("Unknown").to_string(),
            total_sales_value: totals[id],
        })
        .collect()
}

/// Total prescription volume: sum of `quantity_sold` over Rx records.
pub fn rx_volume(records: &[SalesRecord]) -> i64 {
    records
        .iter()
        .filter(|r| r.category == Category::Rx)
        .map(|r| r.quantity_sold)
        .sum()
}

/// Total sales value: sum of `quantity_sold * price_per_unit` over all
/// records.
pub fn total_sales_value(records: &[SalesRecord]) -> Money {
    records.iter().map(|r| r.sales_value()).sum()
}

/// Compares computed sales value against recorded cash intake.
///
/// `discrepancy = total_sales_value - total_cash_received`; a positive
/// discrepancy means the till came up short.
pub fn cash_reconciliation(records: &[SalesRecord]) -> CashReconciliationView {
    let total_sales_value = total_sales_value(records);
    let total_cash_received = records.iter().map(|r| r.cash_received).sum();

    CashReconciliationView {
        total_sales_value,
        total_cash_received,
        discrepancy: total_sales_value - total_cash_received,
    }
}

/// Derives per-product inventory positions (last-seen snapshot variant).
///
/// For each product, `initial_inventory` is the `inventory_level` of the
/// **last-encountered** record in iteration order, `quantity_sold_total`
/// sums the whole group, and `current_inventory` is their difference.
/// Negative current inventory is valid output - it flags over-selling
/// relative to the recorded snapshot.
///
/// Output is in first-encountered product order.
pub fn inventory_levels(records: &[SalesRecord]) -> Vec<InventoryLevelView> {
    let mut positions: HashMap<&str, (i64, i64, &str)> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for record in records {
        let id = record.product_id.as_str();
        let entry = positions.entry(id).or_insert_with(|| {
            first_seen.push(id);
            (0, 0, record.product_name.as_str())
        });
        // Last record observed for a product wins the snapshot.
        entry.0 = record.inventory_level;
        entry.1 += record.quantity_sold;
    }

    first_seen
        .into_iter()
        .map(|id| {
            let (initial_inventory, quantity_sold_total, name) = positions[id];
            InventoryLevelView {
                product_id: id.to_string(),
                product_name: name.to_string(),
                initial_inventory,
                quantity_sold_total,
                current_inventory: initial_inventory - quantity_sold_total,
            }
        })
        .collect()
}

/// Classifies each product's stocking position.
///
/// Built atop [`inventory_levels`]. With sales recorded, a product is
/// overstocked when current inventory exceeds `overstock_mult` times units
/// sold, understocked when below `understock_mult` times units sold, and
/// optimal in between. Without sales the classification collapses to
/// "inventory but no sales" vs "nothing at all".
pub fn stock_status(
    records: &[SalesRecord],
    overstock_mult: f64,
    understock_mult: f64,
) -> Vec<StockStatusView> {
    inventory_levels(records)
        .into_iter()
        .map(|level| {
            let status = if level.quantity_sold_total > 0 {
                let sold = level.quantity_sold_total as f64;
                let current = level.current_inventory as f64;
                if current > overstock_mult * sold {
                    StockStatus::Overstocked
                } else if current < understock_mult * sold {
                    StockStatus::Understocked
                } else {
                    StockStatus::Optimal
                }
            } else if level.current_inventory > 0 {
                StockStatus::OverstockedNoSales
            } else {
                StockStatus::NoStockNoSales
            };

            StockStatusView {
                product_id: level.product_id,
                product_name: level.product_name,
                current_inventory: level.current_inventory,
                quantity_sold_total: level.quantity_sold_total,
                status,
            }
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
