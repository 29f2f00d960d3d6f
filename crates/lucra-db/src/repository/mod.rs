//! # Repository Module
//!
//! Read and append access to the history tables.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  lucra-engine HistoryStore                                             │
//! │       │                                                                 │
//! │       │  db.transactions().confirmed_since("acc_1", since)             │
//! │       ▼                                                                 │
//! │  TransactionRepository                AdSpendRepository                │
//! │  ├── confirmed_since(account, since)  ├── since(account, since)        │
//! │  ├── insert(account, record)          ├── insert(account, record, ..)  │
//! │  ├── set_status(id, status)           └── count(account)               │
//! │  └── count(account)                                                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`TransactionRepository`](transaction::TransactionRepository) - Sales transactions
//! - [`AdSpendRepository`](ad_spend::AdSpendRepository) - Advertising spend

pub mod ad_spend;
pub mod transaction;
