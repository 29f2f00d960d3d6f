//! # lucra-core: Pure Projection Math for Lucra
//!
//! This crate is the **heart** of the financial projection engine. It turns a
//! snapshot of confirmed sales and ad spend into forecasts and scores, as
//! pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Lucra Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Invoking layer (REST controller)                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        lucra-engine: ProjectionService + ProjectionCache        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lucra-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   average ─┐                                                    │   │
//! │  │   variance ├──► projection ──► cashflow                         │   │
//! │  │   trend    │                                                    │   │
//! │  │   season. ─┘    health (own 90-day lookback)                    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cents `Money` and decimal rounding
//! - [`types`] - Records, periods, results
//! - [`window`] - Trailing windows and per-day buckets
//! - [`average`] - Moving average over active days
//! - [`variance`] - Daily variation, confidence, consistency
//! - [`trend`] - Week-over-week momentum
//! - [`seasonality`] - Weekday multipliers (fixed and observed)
//! - [`projection`] - Three-scenario sales forecast
//! - [`cashflow`] - Expenses, net profit, ROI
//! - [`health`] - Composite health score
//! - [`validation`] - Request validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use lucra_core::projection::project_sales;
//! use lucra_core::{Money, ProjectionPeriod, TransactionRecord};
//!
//! let as_of = Utc.with_ymd_and_hms(2024, 7, 1, 21, 0, 0).unwrap();
//! let sales: Vec<_> = (0..45)
//!     .map(|d| TransactionRecord::confirmed("s", Money::from_cents(50_000), as_of - Duration::days(d)))
//!     .collect();
//!
//! let forecast = project_sales(&sales, ProjectionPeriod::Month, as_of).unwrap();
//! assert!(forecast.scenarios.is_ordered());
//! assert_eq!(forecast.confidence, 100.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod average;
pub mod cashflow;
pub mod error;
pub mod health;
pub mod money;
pub mod projection;
pub mod seasonality;
pub mod trend;
pub mod types;
pub mod validation;
pub mod variance;
pub mod window;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use projection::{MIN_HISTORY_DAYS, SalesForecast};
pub use types::*;
