//! # Branch Aggregator
//!
//! Three independent group-by-branch reductions over the same record set,
//! composed into one comparison view.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Branch Comparison                                   │
//! │                                                                         │
//! │              ┌──► sales_by_branch           {branch → Money}           │
//! │   records ───┼──► inventory_turns_by_branch {branch → f64}             │
//! │              └──► service_level_by_branch   {branch → f64}             │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                      BranchComparison                                   │
//! │                                                                         │
//! │  Records lacking a branch_id are excluded from ALL three reductions.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The turns and service-level formulas use deliberate proxies (sales value
//! for COGS, summed snapshots for average inventory); they rank branches
//! against each other rather than matching accounting definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::SalesRecord;

// =============================================================================
// View Type
// =============================================================================

/// Side-by-side branch KPIs.
///
/// BTreeMaps keep branch ordering deterministic for serialization and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchComparison {
    pub sales_by_branch: BTreeMap<i64, Money>,
    pub inventory_turns_by_branch: BTreeMap<i64, f64>,
    pub service_level_by_branch: BTreeMap<i64, f64>,
}

// =============================================================================
// Reducers
// =============================================================================

/// Sum of `quantity_sold * price_per_unit` per branch.
pub fn sales_by_branch(records: &[SalesRecord]) -> BTreeMap<i64, Money> {
    let mut sales: BTreeMap<i64, Money> = BTreeMap::new();
    for record in records {
        if let Some(branch) = record.branch_id {
            *sales.entry(branch).or_insert_with(Money::zero) += record.sales_value();
        }
    }
    sales
}

/// Inventory turnover per branch: `cogs / avg_inventory`.
///
/// `cogs` is the branch sales sum (proxy for cost of goods sold) and
/// `avg_inventory` the branch sum of inventory snapshots (proxy for average
/// inventory). Zero inventory yields a turnover of 0 rather than a
/// division error.
pub fn inventory_turns_by_branch(records: &[SalesRecord]) -> BTreeMap<i64, f64> {
    let mut cogs: BTreeMap<i64, Money> = BTreeMap::new();
    let mut inventory: BTreeMap<i64, i64> = BTreeMap::new();

    for record in records {
        if let Some(branch) = record.branch_id {
            *cogs.entry(branch).or_insert_with(Money::zero) += record.sales_value();
            *inventory.entry(branch).or_insert(0) += record.inventory_level;
        }
    }

    cogs.into_iter()
        .map(|(branch, sales)| {
            let avg_inventory = inventory.get(&branch).copied().unwrap_or(0);
            let turnover = if avg_inventory == 0 {
                0.0
            } else {
                sales.major_units_f64() / avg_inventory as f64
            };
            (branch, turnover)
        })
        .collect()
}

/// Service level per branch:
/// `(total_units_ordered - stocked_out_units) / total_units_ordered`.
///
/// `stocked_out_units` counts `quantity_sold` on stock-out-qualifying
/// records only. A branch with zero ordered units scores a perfect 1.0 by
/// convention - no demand means no demand went unmet.
pub fn service_level_by_branch(records: &[SalesRecord]) -> BTreeMap<i64, f64> {
    let mut ordered: BTreeMap<i64, i64> = BTreeMap::new();
    let mut stocked_out: BTreeMap<i64, i64> = BTreeMap::new();

    for record in records {
        if let Some(branch) = record.branch_id {
            *ordered.entry(branch).or_insert(0) += record.quantity_sold;
            if record.is_stock_out() {
                *stocked_out.entry(branch).or_insert(0) += record.quantity_sold;
            }
        }
    }

    ordered
        .into_iter()
        .map(|(branch, total)| {
            let level = if total == 0 {
                1.0
            } else {
                let missed = stocked_out.get(&branch).copied().unwrap_or(0);
                (total - missed) as f64 / total as f64
            };
            (branch, level)
        })
        .collect()
}

/// Composes the three per-branch reductions into one comparison view.
pub fn compare_branches(records: &[SalesRecord]) -> BranchComparison {
    BranchComparison {
        sales_by_branch: sales_by_branch(records),
        inventory_turns_by_branch: inventory_turns_by_branch(records),
        service_level_by_branch: service_level_by_branch(records),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
