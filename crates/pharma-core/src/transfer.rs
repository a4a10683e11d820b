//! # Transfer Aggregator
//!
//! Reduces the inter-branch transfer log into per-branch net flows.
//!
//! ## Conservation Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Inter-Branch Transfers                                │
//! │                                                                         │
//! │   Branch 1 ──► 40 units @ $1.25 ──► Branch 2                           │
//! │                                                                         │
//! │   volume:  {1: -40, 2: +40}        sum = 0                             │
//! │   value:   {1: -$50, 2: +$50}      sum = $0                            │
//! │                                                                         │
//! │   Every transfer debits the sender exactly what it credits the         │
//! │   receiver, so totals over all branches always conserve - barring      │
//! │   logs whose endpoints were never populated.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No validation happens here: `from_branch == to_branch` nets to zero on
//! that branch, and negative quantities flow through the sums unchanged.
//! The log is taken as recorded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::TransferRecord;

// =============================================================================
// View Type
// =============================================================================

/// Net transfer flows per branch, by unit count and by moved value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSummary {
    pub transfer_volume_by_branch: BTreeMap<i64, i64>,
    pub transfer_value_by_branch: BTreeMap<i64, Money>,
}

// =============================================================================
// Reducers
// =============================================================================

/// Net units moved per branch: each transfer subtracts its quantity from
/// the sender's running total and adds it to the receiver's.
pub fn transfer_volume_by_branch(transfers: &[TransferRecord]) -> BTreeMap<i64, i64> {
    let mut volume: BTreeMap<i64, i64> = BTreeMap::new();
    for transfer in transfers {
        *volume.entry(transfer.from_branch).or_insert(0) -= transfer.quantity;
        *volume.entry(transfer.to_branch).or_insert(0) += transfer.quantity;
    }
    volume
}

/// Net value moved per branch - identical structure to the volume
/// reduction, using `quantity * cost` as the moved amount.
pub fn transfer_value_by_branch(transfers: &[TransferRecord]) -> BTreeMap<i64, Money> {
    let mut value: BTreeMap<i64, Money> = BTreeMap::new();
    for transfer in transfers {
        let moved = transfer.moved_value();
        *value.entry(transfer.from_branch).or_insert_with(Money::zero) -= moved;
        *value.entry(transfer.to_branch).or_insert_with(Money::zero) += moved;
    }
    value
}

/// Composes both reductions into one summary view.
pub fn summarize_transfers(transfers: &[TransferRecord]) -> TransferSummary {
    TransferSummary {
        transfer_volume_by_branch: transfer_volume_by_branch(transfers),
        transfer_value_by_branch: transfer_value_by_branch(transfers),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn transfer(from: i64, to: i64, quantity: i64, cost_cents: i64) -> TransferRecord {
        TransferRecord {
            id: "test".to_string(),
            from_branch: from,
            to_branch: to,
            product_id: "P001".to_string(),
            quantity,
            cost: Money::from_cents(cost_cents),
            date: NaiveDate::from_ymd_opt(2025, 8, 25).unwrap(),
        }
    }

    #[test]
    fn test_volume_nets_sender_and_receiver() {
        let log = vec![transfer(1, 2, 40, 125), transfer(2, 3, 10, 125)];
        let volume = transfer_volume_by_branch(&log);

        assert_eq!(volume[&1], -40);
        assert_eq!(volume[&2], 30);
        assert_eq!(volume[&3], 10);
    }

    #[test]
    fn test_volume_conserves_total_units() {
        let log = vec![
            transfer(1, 2, 40, 125),
            transfer(3, 1, 7, 200),
            transfer(2, 3, 15, 50),
        ];
        let total: i64 = transfer_volume_by_branch(&log).values().sum();
        assert_eq!(total, 0);
    }

    #[test]
    fn test_value_conserves_and_scales_by_cost() {
        let log = vec![transfer(1, 2, 40, 125)]; // 40 × $1.25 = $50.00
        let value = transfer_value_by_branch(&log);

        assert_eq!(value[&1], Money::from_cents(-5000));
        assert_eq!(value[&2], Money::from_cents(5000));

        let total: Money = value.values().copied().sum();
        assert!(total.is_zero());
    }

    #[test]
    fn test_unsanitized_input_flows_through() {
        // Negative quantity and self-transfer are recorded as-is
        let log = vec![transfer(1, 2, -5, 100), transfer(3, 3, 10, 100)];
        let volume = transfer_volume_by_branch(&log);

        assert_eq!(volume[&1], 5);
        assert_eq!(volume[&2], -5);
        assert_eq!(volume[&3], 0);
    }

    #[test]
    fn test_summary_composes_both_views() {
        let log = vec![transfer(1, 2, 40, 125)];
        let summary = summarize_transfers(&log);

        assert_eq!(summary.transfer_volume_by_branch.len(), 2);
        assert_eq!(summary.transfer_value_by_branch.len(), 2);
    }

    #[test]
    fn test_empty_log() {
        let summary = summarize_transfers(&[]);
        assert!(summary.transfer_volume_by_branch.is_empty());
        assert!(summary.transfer_value_by_branch.is_empty());
    }
}
