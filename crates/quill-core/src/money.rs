//! # Money Module
//!
//! The money engine: a `Money` type in minor currency units and the
//! line-total computation shared by quotes, orders, invoices and PDF payloads.
//!
//! ## Why Minor Units?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing major units in floating point drifts:                          │
//! │    0.1 + 0.2 = 0.30000000000000004                                      │
//! │                                                                         │
//! │  OUR SOLUTION: every stored and summed amount is an integer number of   │
//! │  minor units (öre, cents). Floating point only appears INSIDE a single  │
//! │  stage of the line computation and is rounded away immediately.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Computation Pipeline
//! ```text
//!   qty × unit_minor ──round──► pre_disc
//!                                  │
//!          × (1 - discount%/100) ──round──► after_disc
//!                                              │
//!                    × tax%/100 ──round──► tax │
//!                                          │   │
//!                                          ▼   ▼
//!                                total = after_disc + tax
//! ```
//!
//! ## Rounding Policy
//! Round-half-up to the nearest minor unit at EACH stage, never only at the
//! end. Stored totals were produced this way and reconciliation depends on
//! reproducing them exactly, so this policy is fixed.
//!
//! ## Usage
//! ```rust
//! use quill_core::money::{compute_line_totals, Money};
//! use quill_core::types::Percent;
//!
//! let totals = compute_line_totals(
//!     2.0,
//!     Money::from_minor(10000),
//!     Percent::from_pct(10.0),
//!     Percent::from_pct(25.0),
//! );
//! assert_eq!(totals.pre_disc_minor, 20000);
//! assert_eq!(totals.after_disc_minor, 18000);
//! assert_eq!(totals.tax_minor, 4500);
//! assert_eq!(totals.total_minor, 22500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percent;
use crate::MINOR_UNITS_PER_MAJOR;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit of its document currency.
///
/// Money carries no currency of its own; the parent document's `currency`
/// field decides what the unit means. Every supported currency is assumed to
/// have two decimal places.
///
/// ## Where Money is Used
/// ```text
/// LineItem.unit_minor ──► LineTotals ──► DocumentTotals ──► PDF payload
///                                               │
/// Payment.amount_minor ──► paid_minor ──► InvoiceSnapshot ──► derived status
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // 10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from a major-unit amount, rounding half up.
    ///
    /// Equivalent to [`to_minor`] wrapped in `Money`.
    #[inline]
    pub fn from_major(major: f64) -> Self {
        Money(to_minor(major))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion (truncated toward zero).
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1099).major(), 10);
    /// assert_eq!(Money::from_minor(-550).major(), -5);
    /// ```
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_UNITS_PER_MAJOR
    }

    /// Returns the minor-unit remainder, always 0-99.
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_UNITS_PER_MAJOR).abs()
    }

    /// Returns the value as a major-unit float. Display and export only.
    #[inline]
    pub fn to_major(&self) -> f64 {
        from_minor(self.0)
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies by a (possibly fractional) quantity, rounding half up.
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::money::Money;
    ///
    /// let unit = Money::from_minor(999);
    /// assert_eq!(unit.multiply_quantity(2.5).minor(), 2498); // 2497.5 rounds up
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: f64) -> Money {
        Money(round_half_up(qty * self.0 as f64))
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::money::Money;
    /// use quill_core::types::Percent;
    ///
    /// let subtotal = Money::from_minor(10000);
    /// let discounted = subtotal.apply_discount(Percent::from_pct(10.0));
    /// assert_eq!(discounted.minor(), 9000);
    /// ```
    #[inline]
    pub fn apply_discount(&self, discount: Percent) -> Money {
        Money(round_half_up(self.0 as f64 * (1.0 - discount.pct() / 100.0)))
    }

    /// Calculates tax on this amount at the given rate.
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::money::Money;
    /// use quill_core::types::Percent;
    ///
    /// let base = Money::from_minor(1000);
    /// // 1000 × 8.25% = 82.5 → 83
    /// assert_eq!(base.calculate_tax(Percent::from_pct(8.25)).minor(), 83);
    /// ```
    #[inline]
    pub fn calculate_tax(&self, rate: Percent) -> Money {
        Money(round_half_up(self.0 as f64 * rate.pct() / 100.0))
    }
}

// =============================================================================
// Conversions
// =============================================================================

/// Rounds half up (toward positive infinity) to the nearest integer.
///
/// `2.5 → 3`, `-2.5 → -2`, `0.49999999999999994 → 0`.
/// Non-finite input saturates the same way an `as i64` cast does
/// (`NaN → 0`), which keeps the engine total over garbage input.
#[inline]
pub fn round_half_up(value: f64) -> i64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

/// Converts a major-unit amount to minor units: `round(major × 100)`.
///
/// ## Example
/// ```rust
/// use quill_core::money::to_minor;
///
/// assert_eq!(to_minor(10.99), 1099);
/// assert_eq!(to_minor(0.005), 1); // half rounds up
/// ```
#[inline]
pub fn to_minor(major: f64) -> i64 {
    round_half_up(major * MINOR_UNITS_PER_MAJOR as f64)
}

/// Converts minor units to a major-unit float: `minor / 100`.
#[inline]
pub fn from_minor(minor: i64) -> f64 {
    minor as f64 / MINOR_UNITS_PER_MAJOR as f64
}

// =============================================================================
// Line Totals
// =============================================================================

/// Canonical money breakdown for one line item.
///
/// Derived, never stored: recomputed on every read from the line's fields.
///
/// ## Invariants
/// - `total_minor == after_disc_minor + tax_minor`, saturating at the `i64`
///   bounds
/// - `after_disc_minor <= pre_disc_minor` for inputs in the valid range,
///   with equality when the discount is zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineTotals {
    /// `round(qty × unit_minor)`.
    pub pre_disc_minor: i64,
    /// Pre-discount amount with the line discount applied.
    pub after_disc_minor: i64,
    /// Tax on the discounted amount.
    pub tax_minor: i64,
    /// `after_disc_minor + tax_minor`, saturating.
    pub total_minor: i64,
}

impl LineTotals {
    /// Discount amount taken off this line.
    #[inline]
    pub const fn discount_minor(&self) -> i64 {
        self.pre_disc_minor.saturating_sub(self.after_disc_minor)
    }

    #[inline]
    pub const fn total(&self) -> Money {
        Money::from_minor(self.total_minor)
    }
}

/// Computes the money breakdown of a single line.
///
/// Pure and deterministic: identical inputs always produce identical output.
/// Never panics. Every stage saturates at the `i64` bounds instead of
/// overflowing.
/// Inputs are NOT validated. Negative quantities or prices and percentages
/// outside `[0, 100]` produce deterministic but meaningless output; callers
/// that accept user input should run [`crate::validation::validate_line_item`]
/// first.
///
/// ## User Workflow
/// ```text
/// Line: 2.5 × 99.90, 10% off, 25% VAT
///      │
///      ▼
/// compute_line_totals ← THIS FUNCTION
///      │
///      ├── pre_disc   = round(2.5 × 9990)      = 24975
///      ├── after_disc = round(24975 × 0.9)     = 22478
///      ├── tax        = round(22478 × 25 / 100) = 5620
///      └── total      = 22478 + 5620           = 28098
/// ```
pub fn compute_line_totals(
    qty: f64,
    unit: Money,
    discount: Percent,
    tax_rate: Percent,
) -> LineTotals {
    let pre_disc = unit.multiply_quantity(qty);
    let after_disc = pre_disc.apply_discount(discount);
    let tax = after_disc.calculate_tax(tax_rate);

    LineTotals {
        pre_disc_minor: pre_disc.minor(),
        after_disc_minor: after_disc.minor(),
        tax_minor: tax.minor(),
        total_minor: (after_disc + tax).minor(),
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `12.34` rendering for logs and debugging. Use
/// [`crate::format::format_money_minor`] for anything a user sees.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
