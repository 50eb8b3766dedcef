//! # Error Types
//!
//! Domain-specific error types for quill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  quill-core errors (this file)                                         │
//! │  ├── CoreError        - Lifecycle and conversion rule violations       │
//! │  └── ValidationError  - Caller-side input validation failures          │
//! │                                                                         │
//! │  quill-automation errors (separate crate)                              │
//! │  └── AutomationError  - Collaborator failures, config, wraps CoreError │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AutomationError → UI toast        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The money engine and status derivation never return errors: they are
//! total functions. Errors only come from explicit rule checks.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations in the document lifecycle.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored status change that the lifecycle does not allow.
    ///
    /// ## When This Occurs
    /// - Re-opening an accepted quote as a draft
    /// - Delivering a cancelled order
    #[error("Cannot move {kind} from {from} to {to}")]
    InvalidTransition {
        kind: &'static str,
        from: String,
        to: String,
    },

    /// A document is not in the status its conversion requires.
    ///
    /// ## User Workflow
    /// ```text
    /// "Create order" on quote Q-17 (status: sent)
    ///      │
    ///      ▼
    /// NotConvertible { kind: "quote", status: "sent", required: "accepted" }
    ///      │
    ///      ▼
    /// UI shows: "Quote Q-17 must be accepted before it can be converted"
    /// ```
    #[error("{kind} {id} is {status}, must be {required} before it can be converted")]
    NotConvertible {
        kind: &'static str,
        id: String,
        status: String,
        required: String,
    },

    /// Converting a document with no lines.
    #[error("{kind} {id} has no line items")]
    EmptyDocument { kind: &'static str, id: String },

    /// A status string that matches no known status.
    #[error("Unknown {kind} status: '{value}'")]
    UnknownStatus { kind: &'static str, value: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Produced only by the opt-in validators in [`crate::validation`]; the money
/// engine itself never validates.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// NaN or infinity in a numeric field.
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A payment that would push the paid sum above the invoice total.
    #[error("Payment of {amount_minor} exceeds outstanding balance {balance_minor}")]
    Overpayment {
        amount_minor: i64,
        balance_minor: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::NotConvertible {
            kind: "quote",
            id: "Q-17".to_string(),
            status: "sent".to_string(),
            required: "accepted".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "quote Q-17 is sent, must be accepted before it can be converted"
        );

        let err = CoreError::InvalidTransition {
            kind: "order",
            from: "cancelled".to_string(),
            to: "delivered".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot move order from cancelled to delivered");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "discount_pct".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "discount_pct must be between 0 and 100");

        let err = ValidationError::Overpayment {
            amount_minor: 500,
            balance_minor: 200,
        };
        assert_eq!(err.to_string(), "Payment of 500 exceeds outstanding balance 200");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let err: CoreError = ValidationError::Required {
            field: "description".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
