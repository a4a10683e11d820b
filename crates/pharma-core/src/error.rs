//! # Error Types
//!
//! Normalization errors for pharma-core.
//!
//! ## Why So Small?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pharma-core errors (this file)                                        │
//! │  └── CoreError        - Record normalization failures only             │
//! │                                                                         │
//! │  pharma-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  The KPI reducers themselves are TOTAL functions: malformed optional   │
//! │  fields are coerced to zero/unknown at normalization, so reduction     │
//! │  never fails. The only thing coercion cannot invent is the transaction │
//! │  date - a record with no usable date cannot be partitioned.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Record normalization errors.
///
/// Raised by [`crate::types::RawSalesRecord::normalize`] when a record is
/// missing the one field coercion cannot default.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The transaction date is absent.
    #[error("sales record is missing its transaction date")]
    MissingDate,

    /// The transaction date is present but unparseable.
    #[error("sales record has an invalid transaction date: '{value}'")]
    InvalidDate { value: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
