//! # Repository Module
//!
//! Database repository implementations for the pharmacy KPI store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Roll-up job / API collaborator                                        │
//! │       │                                                                 │
//! │       │  db.records().fetch(&filter)                                   │
//! │       ▼                                                                 │
//! │  SalesRecordRepository                                                 │
//! │  ├── fetch(&self, filter)                                              │
//! │  ├── insert_many(&self, records)                                       │
//! │  └── insert_raw(&self, raw)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • SQL is isolated in one place                                        │
//! │  • The core stays pure - it only ever sees in-memory Vecs              │
//! │  • Easy to test against an in-memory database                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`record::SalesRecordRepository`] - Sales record fetch/insert
//! - [`transfer::TransferRepository`] - Append-only transfer log
//! - [`summary::DailyKpiRepository`] - Persisted roll-up summaries + queries

pub mod record;
pub mod summary;
pub mod transfer;
