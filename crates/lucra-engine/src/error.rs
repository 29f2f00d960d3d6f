//! # Engine Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  StoreError  ── history store I/O failed ──────► EngineError (returned) │
//! │  CoreError   ── not enough history ────────────► EngineError (returned) │
//! │  ValidationError ── bad account / period ──────► EngineError (returned) │
//! │                                                                         │
//! │  CacheError  ── cache backend failed ──► logged at warn, swallowed      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use lucra_core::{CoreError, ValidationError};
use lucra_db::DbError;
use thiserror::Error;

// =============================================================================
// Collaborator Errors
// =============================================================================

/// The history store could not answer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history store unavailable: {0}")]
    Unavailable(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// A cache backend failed. Never returned from the service.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Backend unreachable or returned an error.
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

// =============================================================================
// Engine Error
// =============================================================================

/// Everything a projection call can fail with.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The projection could not be computed (e.g. insufficient history).
    #[error(transparent)]
    Core(CoreError),

    /// The request was rejected before touching the store.
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The history store failed. Not retried here.
    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => EngineError::Validation(v),
            other => EngineError::Core(other),
        }
    }
}

impl EngineError {
    /// True for the "not enough data" outcome the invoking layer maps to a
    /// client-visible response.
    pub fn is_insufficient_history(&self) -> bool {
        matches!(self, EngineError::Core(CoreError::InsufficientHistory { .. }))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_validation_is_flattened() {
        let err: EngineError = CoreError::Validation(ValidationError::Required {
            field: "account_id".to_string(),
        })
        .into();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_insufficient_history_passthrough() {
        let err: EngineError = CoreError::InsufficientHistory {
            days_covered: 12,
            required: 30,
        }
        .into();
        assert!(err.is_insufficient_history());
        assert_eq!(
            err.to_string(),
            "Insufficient history: 12 days of sales, at least 30 required"
        );
    }

    #[test]
    fn test_db_error_becomes_store_unavailable() {
        let err: EngineError = StoreError::from(DbError::PoolExhausted).into();
        assert!(matches!(err, EngineError::StoreUnavailable(_)));
        assert!(!err.is_insufficient_history());
    }
}
