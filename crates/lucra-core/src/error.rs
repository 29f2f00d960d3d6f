//! # Error Types
//!
//! Domain-specific error types for lucra-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lucra-core errors (this file)                                         │
//! │  ├── CoreError        - Projection cannot be computed                  │
//! │  └── ValidationError  - Request rejected before any I/O                │
//! │                                                                         │
//! │  lucra-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  lucra-engine errors                                                   │
//! │  └── EngineError      - What the invoking layer sees                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → "not enough data"   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Projection errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Not enough distinct days of confirmed sales to project from.
    ///
    /// ## When This Occurs
    /// - The account has no confirmed sales in the lookback window
    /// - Sales exist but cover fewer than `required` calendar days
    ///
    /// Always surfaced to the caller; never replaced by an estimate.
    #[error("Insufficient history: {days_covered} days of sales, at least {required} required")]
    InsufficientHistory { days_covered: u32, required: u32 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., characters not allowed in a cache key).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
