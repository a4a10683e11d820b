//! # pharma-core: Pure KPI Logic for the Pharmacy KPI Engine
//!
//! This crate is the **heart** of the system. It turns an unordered
//! collection of per-transaction sales records into derived KPI views,
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pharmacy KPI Data Flow                               │
//! │                                                                         │
//! │  Sales records (document store) ──► fetch ──► in-memory Vec            │
//! │                                        │                                │
//! │  ┌─────────────────────────────────────▼───────────────────────────┐   │
//! │  │               ★ pharma-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐      │   │
//! │  │   │  types   │  │   kpi    │  │  branch  │  │ transfer │      │   │
//! │  │   │ Records  │  │ Reducers │  │ Compare  │  │ Net flow │      │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────┘      │   │
//! │  │                      ┌──────────┐                              │   │
//! │  │                      │  rollup  │  one summary per             │   │
//! │  │                      │          │  (branch, day)               │   │
//! │  │                      └──────────┘                              │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO WALL CLOCK • PURE FUNCTIONS        │   │
//! │  └─────────────────────────────────┬───────────────────────────────┘   │
//! │                                    │                                    │
//! │                   KPI views ───────┴──► persisted daily summaries      │
//! │                   (live queries)        (pharma-db roll-up job)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Record model (SalesRecord, TransferRecord, normalization)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`kpi`] - The KPI reducers (stock-outs, near-expiries, top sellers, ...)
//! - [`branch`] - Per-branch comparison aggregations
//! - [`transfer`] - Inter-branch transfer aggregations
//! - [`rollup`] - Daily (branch, day) partitioning and summary construction
//! - [`error`] - Normalization error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every reducer is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Time**: "today" is always a parameter, never a wall-clock read
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pharma_core::kpi;
//! use pharma_core::money::Money;
//! use pharma_core::types::{Category, SalesRecord};
//!
//! let records = vec![SalesRecord {
//!     id: "r1".into(),
//!     branch_id: Some(1),
//!     date: NaiveDate::from_ymd_opt(2025, 8, 25).unwrap(),
//!     product_id: "P001".into(),
//!     product_name: "Paracetamol 500mg".into(),
//!     category: Category::Otc,
//!     inventory_level: 100,
//!     quantity_sold: 10,
//!     price_per_unit: Money::from_cents(1000),
//!     cash_received: Money::from_cents(10000),
//!     expiration_date: None,
//! }];
//!
//! assert_eq!(kpi::total_sales_value(&records), Money::from_cents(10000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod branch;
pub mod error;
pub mod kpi;
pub mod money;
pub mod rollup;
pub mod transfer;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use pharma_core::Money` instead of
// `use pharma_core::money::Money`

pub use error::{CoreError, CoreResult};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default near-expiry horizon in days.
///
/// ## Business Reason
/// Pharmacy practice treats stock expiring within a month as actionable
/// (discount, return to supplier, or pull from shelf). Callers can pass a
/// different horizon to [`kpi::near_expiries`].
pub const DEFAULT_NEAR_EXPIRY_DAYS: i64 = 30;

/// Default number of products returned by the live top-sellers view.
pub const DEFAULT_TOP_SELLERS: usize = 5;

/// Number of top sellers captured in each persisted daily summary.
///
/// ## Why Smaller Than The Live Default?
/// Daily summaries are denormalized snapshots kept for every (branch, day)
/// partition; three entries per partition is what the reporting surface
/// consumes.
pub const ROLLUP_TOP_SELLERS: usize = 3;

/// Default overstock multiplier for [`kpi::stock_status`].
/// A product is overstocked when current inventory exceeds 1.5x units sold.
pub const DEFAULT_OVERSTOCK_MULT: f64 = 1.5;

/// Default understock multiplier for [`kpi::stock_status`].
/// A product is understocked when current inventory is below 0.5x units sold.
pub const DEFAULT_UNDERSTOCK_MULT: f64 = 0.5;

/// Trend window used by the query service, in days.
pub const TREND_WINDOW_DAYS: i64 = 7;
