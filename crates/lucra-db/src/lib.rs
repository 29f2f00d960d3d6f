//! # lucra-db: History Store for Lucra
//!
//! SQLite-backed storage for the two event logs the projection engine reads:
//! confirmed sales and ad spend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Lucra Data Flow                                │
//! │                                                                         │
//! │  ProjectionService (lucra-engine)                                      │
//! │       │  HistoryStore::fetch_confirmed_sales / fetch_ad_spend           │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     lucra-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories   │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │◄───│ TransactionRepo │   │  (embedded)  │  │   │
//! │  │   │  SqlitePool   │    │ AdSpendRepo     │   │ 001_history  │  │   │
//! │  │   └───────────────┘    └─────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (lucra.db)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Transaction and ad spend repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lucra_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./lucra.db")).await?;
//! let sales = db.transactions().confirmed_since("acc_1", since).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::ad_spend::AdSpendRepository;
pub use repository::transaction::TransactionRepository;
