//! # pharma-db: Database Layer for the Pharmacy KPI Engine
//!
//! This crate provides storage for sales records, the transfer log and the
//! persisted daily KPI summaries. It uses SQLite for local storage with
//! sqlx for async operations, and owns the roll-up job's I/O half.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Pharmacy KPI Data Flow                               │
//! │                                                                         │
//! │  Ingest (raw records) / Query service / Roll-up job                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     pharma-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (record.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ RecordRepo    │    │ 001_initial  │  │   │
//! │  │   │ Connection    │◄───│ TransferRepo  │    │   _schema    │  │   │
//! │  │   │ Management    │    │ DailyKpiRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │              │                                                  │   │
//! │  │              ▼                                                  │   │
//! │  │   rollup::run_daily_rollup ──► pharma_core::rollup (pure)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (./pharmacy.db, WAL mode)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (record, transfer, summary)
//! - [`rollup`] - The batch roll-up job (fetch, reduce, replace)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pharma_db::{run_daily_rollup, Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let config = DbConfig::new("path/to/pharmacy.db");
//! let db = Database::new(config).await?;
//!
//! // Recompute all daily summaries
//! let written = run_daily_rollup(&db).await?;
//!
//! // Query the persisted summaries
//! let alerts = db.daily_kpis().get_kpi_alerts(None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod rollup;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use rollup::run_daily_rollup;

// Repository re-exports for convenience
pub use repository::record::{RecordFilter, SalesRecordRepository};
pub use repository::summary::DailyKpiRepository;
pub use repository::transfer::TransferRepository;
