//! # Record Model
//!
//! The normalized sales-transaction shape all reducers consume, plus the
//! loosely-typed boundary shape it is built from.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Record Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐   normalize()   ┌──────────────────┐             │
//! │  │  RawSalesRecord  │ ──────────────► │   SalesRecord    │             │
//! │  │  ──────────────  │   (defaulting)  │   ────────────   │             │
//! │  │  all Optional    │                 │   fully typed    │             │
//! │  │  dates as String │                 │   Money cents    │             │
//! │  │  money as f64    │                 │   NaiveDate      │             │
//! │  └──────────────────┘                 └──────────────────┘             │
//! │                                                                         │
//! │  ┌──────────────────┐                 ┌──────────────────┐             │
//! │  │    Category      │                 │  TransferRecord  │             │
//! │  │  Otc | Rx |      │                 │  from → to       │             │
//! │  │  Unknown         │                 │  qty × cost      │             │
//! │  └──────────────────┘                 └──────────────────┘             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Default-Substitution Rules
//! Normalization never rejects a record for a malformed *optional* field;
//! each field has a documented fallback:
//!
//! | field            | absent/malformed becomes       |
//! |------------------|--------------------------------|
//! | `branch_id`      | `None` (single-branch mode)    |
//! | `product_id`     | `""`                           |
//! | `product_name`   | `"Unknown"`                    |
//! | `category`       | `Category::Unknown`            |
//! | `inventory_level`| `0`                            |
//! | `quantity_sold`  | `0`                            |
//! | `price_per_unit` | `$0.00`                        |
//! | `cash_received`  | `$0.00`                        |
//! | `expiration_date`| `None` (skipped by near-expiry)|
//!
//! The transaction `date` is the one field with no sane default: a record
//! that cannot be placed on a calendar day cannot be partitioned, so
//! normalization fails with [`CoreError`] instead.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Category
// =============================================================================

/// Product category: prescription vs. over-the-counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Over-the-counter product.
    Otc,
    /// Prescription product.
    Rx,
    /// Category absent or unrecognized in the source record.
    Unknown,
}

impl Category {
    /// Parses a category label case-insensitively.
    ///
    /// Anything that is not "OTC" or "Rx" maps to [`Category::Unknown`]
    /// rather than failing - categorical coercion per the defaulting rules.
    pub fn parse_lossy(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "otc" => Category::Otc,
            "rx" => Category::Rx,
            _ => Category::Unknown,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Unknown
    }
}

// =============================================================================
// Sales Record
// =============================================================================

/// One product-per-day-per-branch sales transaction.
///
/// Records are independent: no record references another, and every KPI is
/// purely a function of the record set. `inventory_level` is a snapshot at
/// the time of the record, NOT a running ledger - the last record observed
/// for a product wins (see [`crate::kpi::inventory_levels`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SalesRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Branch this transaction belongs to. Absent in single-branch mode;
    /// branchless records are excluded from per-branch aggregations.
    pub branch_id: Option<i64>,

    /// Calendar day of the transaction (time-of-day discarded).
    pub date: NaiveDate,

    /// Business product identifier (e.g. "P001").
    pub product_id: String,

    /// Display name, resolved into views for reporting.
    pub product_name: String,

    /// OTC vs prescription.
    pub category: Category,

    /// On-hand inventory at the time of this record (snapshot semantics).
    pub inventory_level: i64,

    /// Units sold in this transaction. Non-negative in well-formed data.
    pub quantity_sold: i64,

    /// Unit price in cents.
    pub price_per_unit: Money,

    /// Cash actually taken at the till. May diverge from
    /// `quantity_sold * price_per_unit` - that divergence is exactly what
    /// cash reconciliation surfaces.
    pub cash_received: Money,

    /// Expiration date of the batch this unit belongs to, when known.
    pub expiration_date: Option<NaiveDate>,
}

impl SalesRecord {
    /// The sales value of this record: `quantity_sold * price_per_unit`.
    #[inline]
    pub fn sales_value(&self) -> Money {
        self.price_per_unit.multiply_quantity(self.quantity_sold)
    }

    /// Whether this record is a stock-out event: a sale recorded against
    /// zero on-hand inventory.
    #[inline]
    pub fn is_stock_out(&self) -> bool {
        self.inventory_level == 0 && self.quantity_sold > 0
    }
}

// =============================================================================
// Raw Sales Record
// =============================================================================

/// The loosely-typed boundary shape of a sales record, as it arrives from
/// external collaborators (JSON bodies, CSV loads).
///
/// Every field is optional; dates are strings that may carry a time suffix
/// (`"2025-08-25T00:00:00"`); money is float major units. Use
/// [`RawSalesRecord::normalize`] to obtain the typed [`SalesRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSalesRecord {
    #[serde(default)]
    pub branch_id: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub inventory_level: Option<i64>,
    #[serde(default)]
    pub quantity_sold: Option<i64>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    #[serde(default)]
    pub cash_received: Option<f64>,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

impl RawSalesRecord {
    /// Applies the default-substitution rules and produces a typed record
    /// with a fresh UUID.
    ///
    /// ## Errors
    /// Only when the transaction `date` is missing or unparseable; every
    /// other field coerces per the module-level table.
    pub fn normalize(self) -> CoreResult<SalesRecord> {
        let date = match self.date {
            None => return Err(CoreError::MissingDate),
            Some(raw) => parse_loose_date(&raw).ok_or(CoreError::InvalidDate { value: raw })?,
        };

        // Expiration coerces to None: a record with a garbled batch date is
        // still a valid sale, it just can't appear in near-expiry views.
        let expiration_date = self.expiration_date.as_deref().and_then(parse_loose_date);

        Ok(SalesRecord {
            id: Uuid::new_v4().to_string(),
            branch_id: self.branch_id,
            date,
            product_id: self.product_id.unwrap_or_default(),
            product_name: self.product_name.unwrap_or_else(|| "Unknown".to_string()),
            category: self
                .category
                .as_deref()
                .map(Category::parse_lossy)
                .unwrap_or_default(),
            inventory_level: self.inventory_level.unwrap_or(0),
            quantity_sold: self.quantity_sold.unwrap_or(0),
            price_per_unit: Money::from_major_units_f64(self.price_per_unit.unwrap_or(0.0)),
            cash_received: Money::from_major_units_f64(self.cash_received.unwrap_or(0.0)),
            expiration_date,
        })
    }
}

/// Parses an ISO calendar date, tolerating a trailing time component.
///
/// Source feeds serialize dates both as `"2025-08-25"` and as
/// `"2025-08-25T00:00:00"`; grouping only ever needs the day.
fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let day_part = raw.split('T').next().unwrap_or(raw).trim();
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}

// =============================================================================
// Transfer Record
// =============================================================================

/// One inter-branch stock transfer.
///
/// The transfer log is append-only and never rewritten. No validation is
/// performed on endpoints or quantities - the aggregators must not assume
/// sanitized input (a negative quantity simply flows through the sums).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransferRecord {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Sending branch.
    pub from_branch: i64,

    /// Receiving branch.
    pub to_branch: i64,

    /// Product being moved.
    pub product_id: String,

    /// Units moved.
    pub quantity: i64,

    /// Per-unit cost in cents.
    pub cost: Money,

    /// Calendar day of the transfer.
    pub date: NaiveDate,
}

impl TransferRecord {
    /// The value moved by this transfer: `quantity * cost`.
    #[inline]
    pub fn moved_value(&self) -> Money {
        self.cost.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_date() -> RawSalesRecord {
        RawSalesRecord {
            date: Some("2025-08-25".to_string()),
            ..RawSalesRecord::default()
        }
    }

    #[test]
    fn test_category_parse_lossy() {
        assert_eq!(Category::parse_lossy("OTC"), Category::Otc);
        assert_eq!(Category::parse_lossy("otc"), Category::Otc);
        assert_eq!(Category::parse_lossy("Rx"), Category::Rx);
        assert_eq!(Category::parse_lossy(" rx "), Category::Rx);
        assert_eq!(Category::parse_lossy("homeopathy"), Category::Unknown);
        assert_eq!(Category::parse_lossy(""), Category::Unknown);
    }

    #[test]
    fn test_normalize_applies_defaults() {
        let record = raw_with_date().normalize().unwrap();

        assert_eq!(record.branch_id, None);
        assert_eq!(record.product_id, "");
        assert_eq!(record.product_name, "Unknown");
        assert_eq!(record.category, Category::Unknown);
        assert_eq!(record.inventory_level, 0);
        assert_eq!(record.quantity_sold, 0);
        assert!(record.price_per_unit.is_zero());
        assert!(record.cash_received.is_zero());
        assert_eq!(record.expiration_date, None);
        assert!(!record.id.is_empty());
    }

    #[test]
    fn test_normalize_converts_money_to_cents() {
        let raw = RawSalesRecord {
            price_per_unit: Some(15.50),
            cash_received: Some(155.00),
            quantity_sold: Some(10),
            ..raw_with_date()
        };
        let record = raw.normalize().unwrap();

        assert_eq!(record.price_per_unit.cents(), 1550);
        assert_eq!(record.cash_received.cents(), 15500);
        assert_eq!(record.sales_value().cents(), 15500);
    }

    #[test]
    fn test_normalize_missing_date_fails() {
        let err = RawSalesRecord::default().normalize().unwrap_err();
        assert!(matches!(err, CoreError::MissingDate));
    }

    #[test]
    fn test_normalize_invalid_date_fails() {
        let raw = RawSalesRecord {
            date: Some("yesterday".to_string()),
            ..RawSalesRecord::default()
        };
        let err = raw.normalize().unwrap_err();
        assert!(matches!(err, CoreError::InvalidDate { .. }));
    }

    #[test]
    fn test_normalize_tolerates_time_suffix() {
        let raw = RawSalesRecord {
            date: Some("2025-08-25T13:45:00".to_string()),
            expiration_date: Some("2026-01-01T00:00:00".to_string()),
            ..RawSalesRecord::default()
        };
        let record = raw.normalize().unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 8, 25).unwrap());
        assert_eq!(
            record.expiration_date,
            Some(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap())
        );
    }

    #[test]
    fn test_normalize_garbled_expiration_coerces_to_none() {
        let raw = RawSalesRecord {
            expiration_date: Some("soon".to_string()),
            ..raw_with_date()
        };
        assert_eq!(raw.normalize().unwrap().expiration_date, None);
    }

    #[test]
    fn test_stock_out_predicate() {
        let mut record = raw_with_date().normalize().unwrap();
        assert!(!record.is_stock_out()); // qty 0

        record.quantity_sold = 2;
        assert!(record.is_stock_out()); // inv 0, qty > 0

        record.inventory_level = 5;
        assert!(!record.is_stock_out());
    }

    #[test]
    fn test_transfer_moved_value() {
        let transfer = TransferRecord {
            id: "t1".to_string(),
            from_branch: 1,
            to_branch: 2,
            product_id: "P001".to_string(),
            quantity: 40,
            cost: Money::from_cents(125),
            date: NaiveDate::from_ymd_opt(2025, 8, 25).unwrap(),
        };
        assert_eq!(transfer.moved_value().cents(), 5000);
    }
}
