//! # Validation Module
//!
//! Opt-in input validators for callers that accept user input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Line-item editor (front-end)                                 │
//! │  ├── Basic format checks, immediate feedback                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called explicitly by the caller)                │
//! │  ├── Ranges, finiteness, payment totals                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Money engine                                                  │
//! │  └── Does NOT validate. Garbage in, deterministic garbage out.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing in the engine calls these functions. Historical documents with
//! out-of-range values must still compute the same totals they always did.
//!
//! ## Usage
//! ```rust
//! use quill_core::line_item::LineItem;
//! use quill_core::validation::validate_line_item;
//!
//! let line = LineItem::new("Consulting", 1.5, 120000).with_tax_rate(25.0);
//! assert!(validate_line_item(&line).is_ok());
//!
//! let bad = LineItem::new("Consulting", 1.0, 1000).with_discount(150.0);
//! assert!(validate_line_item(&bad).is_err());
//! ```

use crate::error::ValidationError;
use crate::line_item::LineItem;

pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an optional SKU: 1-50 chars of letters, digits, `-` and `_`.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a line description: required, at most 500 characters.
pub fn validate_description(description: &str) -> ValidationResult<()> {
    let description = description.trim();

    if description.is_empty() {
        return Err(ValidationError::Required {
            field: "description".to_string(),
        });
    }

    if description.chars().count() > 500 {
        return Err(ValidationError::TooLong {
            field: "description".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates an ISO 4217 currency code: three ASCII uppercase letters.
///
/// ## Example
/// ```rust
/// use quill_core::validation::validate_currency_code;
///
/// assert!(validate_currency_code("SEK").is_ok());
/// assert!(validate_currency_code("sek").is_err());
/// assert!(validate_currency_code("KRONA").is_err());
/// ```
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: "must be a three-letter ISO 4217 code".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity: finite and not negative. Fractions are fine.
pub fn validate_quantity(qty: f64) -> ValidationResult<()> {
    if !qty.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "qty".to_string(),
        });
    }

    if qty < 0.0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "qty".to_string(),
        });
    }

    Ok(())
}

/// Validates a unit price in minor units. Zero is allowed (free items).
pub fn validate_unit_minor(unit_minor: i64) -> ValidationResult<()> {
    if unit_minor < 0 {
        return Err(ValidationError::MustBeNonNegative {
            field: "unit_minor".to_string(),
        });
    }

    Ok(())
}

/// Validates a percentage field: finite and within `[0, 100]`.
pub fn validate_percentage(field: &str, pct: f64) -> ValidationResult<()> {
    if !pct.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }

    Ok(())
}

/// Runs every line-item check, stopping at the first failure.
pub fn validate_line_item(line: &LineItem) -> ValidationResult<()> {
    validate_description(&line.description)?;
    if let Some(ref sku) = line.sku {
        validate_sku(sku)?;
    }
    validate_quantity(line.qty)?;
    validate_unit_minor(line.unit_minor)?;
    validate_percentage("discount_pct", line.discount_pct)?;
    validate_percentage("tax_rate_pct", line.tax_rate_pct)?;
    Ok(())
}

// =============================================================================
// Payment Validators
// =============================================================================

/// Validates a payment amount: must be positive.
pub fn validate_payment_amount(amount_minor: i64) -> ValidationResult<()> {
    if amount_minor <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Checks that a new payment keeps the paid sum at or below the total.
///
/// ## User Workflow
/// ```text
/// Register payment: 5000
///      │
///      ▼
/// validate_payment_total(total=10000, paid=7000, 5000) ← THIS FUNCTION
///      │
///      ├── amount <= 0?             → "payment amount must be positive"
///      ├── paid + amount > total?   → Overpayment { balance: 3000 }
///      └── OK → append payment
/// ```
pub fn validate_payment_total(
    total_minor: i64,
    paid_minor: i64,
    amount_minor: i64,
) -> ValidationResult<()> {
    validate_payment_amount(amount_minor)?;

    let balance_minor = total_minor.saturating_sub(paid_minor).max(0);
    if amount_minor > balance_minor {
        return Err(ValidationError::Overpayment {
            amount_minor,
            balance_minor,
        });
    }

    Ok(())
}

// =============================================================================
// Identifier Validators
// =============================================================================

/// Validates a UUID string.
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}
