//! # Error Types
//!
//! Domain-specific error types for offert-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  offert-core errors (this file)                                        │
//! │  ├── CoreError        - Estimate editing failures                      │
//! │  └── ValidationError  - Form input validation failures                 │
//! │                                                                         │
//! │  offert-transfer errors (separate crate)                               │
//! │  └── TransferError    - Import/export failures                         │
//! │                                                                         │
//! │  NOTE: the pricing engine itself has no error type. Missing or         │
//! │  malformed numbers are coerced to zero and cap overruns are reported   │
//! │  as warnings on the totals, never as errors.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while editing an estimate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No line item with the given id.
    #[error("Line item not found: {0}")]
    ItemNotFound(String),

    /// No addon with the given id.
    #[error("Addon not found: {0}")]
    AddonNotFound(String),

    /// The estimate has reached its maximum row count.
    #[error("Estimate cannot have more than {max} line items")]
    TooManyItems { max: usize },

    /// ROT/RUT was requested on a row that is not labor.
    ///
    /// ## When This Occurs
    /// ```text
    /// Material row "Gipsskiva 13mm"
    ///      │
    ///      ▼
    /// User ticks "ROT"
    ///      │
    ///      ▼
    /// NotEligible { item_id, deduction: "ROT" }
    ///      │
    ///      ▼
    /// UI shows: "Endast arbetskostnad ger ROT-avdrag"
    /// ```
    #[error("Line item {item_id} is not labor and cannot be {deduction}-eligible")]
    NotEligible {
        item_id: String,
        deduction: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the form layer before values reach an estimate. The pricing
/// engine never raises these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: String,
        max: String,
    },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NotEligible {
            item_id: "row-7".to_string(),
            deduction: "ROT",
        };
        assert_eq!(
            err.to_string(),
            "Line item row-7 is not labor and cannot be ROT-eligible"
        );

        let err = CoreError::TooManyItems { max: 500 };
        assert_eq!(err.to_string(), "Estimate cannot have more than 500 line items");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "rot_percent".to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        };
        assert_eq!(err.to_string(), "rot_percent must be between 0 and 100");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Negative {
            field: "unit_price".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
