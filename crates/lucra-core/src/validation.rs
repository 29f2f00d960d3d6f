//! # Validation Module
//!
//! Request validation, run before any store or cache access.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Invoking layer (REST controller)                             │
//! │  └── Authentication, account ownership                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── account id shape (it is also a cache key segment)                 │
//! │  └── period ∈ {7, 30, 90, 180, 365}                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Projection math                                              │
//! │  └── history sufficiency (InsufficientHistory)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lucra_core::validation::{validate_account_id, validate_period};
//!
//! validate_account_id("acc_8f2c").unwrap();
//! assert!(validate_period(30).is_ok());
//! assert!(validate_period(14).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::ProjectionPeriod;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted account id.
pub const MAX_ACCOUNT_ID_LEN: usize = 64;

/// Validates an account id.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Only letters, digits, hyphens, underscores
///
/// The id is embedded in cache keys, so `:` and `*` must never appear.
///
/// ```rust
/// use lucra_core::validation::validate_account_id;
///
/// assert!(validate_account_id("7d0c2b1e-aaaa-4bbb-8ccc-000000000001").is_ok());
/// assert!(validate_account_id("").is_err());
/// assert!(validate_account_id("acc:*").is_err());
/// ```
pub fn validate_account_id(account_id: &str) -> ValidationResult<()> {
    if account_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "account_id".to_string(),
        });
    }

    if account_id.len() > MAX_ACCOUNT_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "account_id".to_string(),
            max: MAX_ACCOUNT_ID_LEN,
        });
    }

    if !account_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "account_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a projection horizon given in days.
pub fn validate_period(days: u32) -> ValidationResult<ProjectionPeriod> {
    ProjectionPeriod::try_from(days)
}

// =============================================================================
// Unit Tests
// =============================================================================
