//! # lucra-engine: Projection Service for Lucra
//!
//! Connects the pure math of `lucra-core` to an account's stored history and
//! to a result cache.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Lucra Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Invoking layer (REST controller, forecast CLI)      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lucra-engine (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ProjectionService ──► ProjectionCache ──► dyn Cache           │   │
//! │  │          │                                  (memory / redis)    │   │
//! │  │          └──────────► dyn HistoryStore                          │   │
//! │  └──────────────┬──────────────────────────────┬───────────────────┘   │
//! │                 │                              │                        │
//! │  ┌──────────────▼─────────────┐  ┌─────────────▼───────────────────┐   │
//! │  │   lucra-core (math)        │  │   lucra-db (SQLite history)     │   │
//! │  └────────────────────────────┘  └─────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lucra_engine::{EngineConfig, InvalidationEvent, ProjectionService};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = EngineConfig::load(None)?;
//! let service = ProjectionService::from_config(&config).await?;
//!
//! let forecast = service.calculate_sales_projection("acc_1", 30).await?;
//! println!("realistic: {}", forecast.realistic);
//!
//! service.invalidate_cache("acc_1", InvalidationEvent::NewSale).await?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod projection_cache;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cache::{Cache, DisabledCache, MemoryCache, RedisCache};
pub use config::EngineConfig;
pub use error::{CacheError, EngineError, EngineResult, StoreError};
pub use events::InvalidationEvent;
pub use projection_cache::{CacheKey, CachePolicy, ProjectionCache};
pub use service::ProjectionService;
pub use store::{HistoryStore, InMemoryHistoryStore};
