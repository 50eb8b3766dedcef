//! # Line Items
//!
//! Line items and document-level aggregation on top of the money engine.
//!
//! ## Aggregation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lines[0].totals() ─┐                                                   │
//! │  lines[1].totals() ─┼──► Σ after_disc = subtotal                        │
//! │  lines[n].totals() ─┘    Σ tax        = tax                             │
//! │                          Σ total      = grand total                     │
//! │                                                                         │
//! │  No cross-line rounding correction: per-line rounding differences are  │
//! │  allowed to accumulate, matching stored document totals.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are ALWAYS re-derived from the lines. Stored aggregates are never
//! trusted, which is what lets PDF payloads and UI tables agree.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::{compute_line_totals, LineTotals, Money};
use crate::types::Percent;

// =============================================================================
// Line Item
// =============================================================================

/// One priced line on a quote, order or invoice.
///
/// The `id` is immutable; every other field changes through
/// [`LineItem::apply_patch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub sku: Option<String>,
    /// Quantity, may be fractional (2.5 hours).
    pub qty: f64,
    /// Unit price in minor units.
    pub unit_minor: i64,
    #[serde(default)]
    pub discount_pct: f64,
    #[serde(default)]
    pub tax_rate_pct: f64,
}

impl LineItem {
    /// Creates a line with a fresh id, no discount and no tax.
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::line_item::LineItem;
    ///
    /// let line = LineItem::new("Consulting hours", 2.0, 10000)
    ///     .with_discount(10.0)
    ///     .with_tax_rate(25.0);
    /// assert_eq!(line.totals().total_minor, 22500);
    /// ```
    pub fn new(description: impl Into<String>, qty: f64, unit_minor: i64) -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            sku: None,
            qty,
            unit_minor,
            discount_pct: 0.0,
            tax_rate_pct: 0.0,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_discount(mut self, discount_pct: f64) -> Self {
        self.discount_pct = discount_pct;
        self
    }

    pub fn with_tax_rate(mut self, tax_rate_pct: f64) -> Self {
        self.tax_rate_pct = tax_rate_pct;
        self
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_minor(self.unit_minor)
    }

    #[inline]
    pub fn discount(&self) -> Percent {
        Percent::from_pct(self.discount_pct)
    }

    #[inline]
    pub fn tax_rate(&self) -> Percent {
        Percent::from_pct(self.tax_rate_pct)
    }

    /// Computes this line's money breakdown.
    pub fn totals(&self) -> LineTotals {
        compute_line_totals(self.qty, self.unit_price(), self.discount(), self.tax_rate())
    }

    /// Applies a partial update. Fields left as `None` are unchanged.
    ///
    /// An empty `sku` in the patch clears the SKU.
    pub fn apply_patch(&mut self, patch: &LineItemPatch) {
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        if let Some(ref sku) = patch.sku {
            self.sku = if sku.trim().is_empty() {
                None
            } else {
                Some(sku.clone())
            };
        }
        if let Some(qty) = patch.qty {
            self.qty = qty;
        }
        if let Some(unit_minor) = patch.unit_minor {
            self.unit_minor = unit_minor;
        }
        if let Some(discount_pct) = patch.discount_pct {
            self.discount_pct = discount_pct;
        }
        if let Some(tax_rate_pct) = patch.tax_rate_pct {
            self.tax_rate_pct = tax_rate_pct;
        }
    }

    /// Copies this line under a new id, for document conversion.
    pub fn duplicate(&self) -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            ..self.clone()
        }
    }
}

/// Partial update for a [`LineItem`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemPatch {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub qty: Option<f64>,
    #[serde(default)]
    pub unit_minor: Option<i64>,
    #[serde(default)]
    pub discount_pct: Option<f64>,
    #[serde(default)]
    pub tax_rate_pct: Option<f64>,
}

// =============================================================================
// Document Totals
// =============================================================================

/// Tax collected at one rate, for tax summaries on PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxBand {
    pub rate_pct: f64,
    /// Sum of discounted line amounts taxed at this rate.
    pub base_minor: i64,
    pub tax_minor: i64,
}

/// Aggregate totals of a document, re-derived from its lines.
///
/// ## Invariants
/// - `subtotal_minor == pre_discount_minor - discount_minor`
/// - `total_minor == subtotal_minor + tax_minor`
/// - `tax_bands` tax sums to `tax_minor`
///
/// Sums saturate at the `i64` bounds, where the equalities stop holding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DocumentTotals {
    pub line_count: usize,
    /// Σ pre-discount amounts.
    pub pre_discount_minor: i64,
    /// Σ line discounts.
    pub discount_minor: i64,
    /// Σ after-discount amounts.
    pub subtotal_minor: i64,
    pub tax_minor: i64,
    pub total_minor: i64,
    /// One band per distinct tax rate, in first-seen line order.
    pub tax_bands: Vec<TaxBand>,
}

impl DocumentTotals {
    /// Aggregates the totals of `lines`.
    ///
    /// ## Example
    /// ```rust
    /// use quill_core::line_item::{DocumentTotals, LineItem};
    ///
    /// let lines = vec![
    ///     LineItem::new("Licence", 1.0, 50000).with_tax_rate(25.0),
    ///     LineItem::new("Training", 3.0, 1500).with_tax_rate(6.0),
    /// ];
    /// let totals = DocumentTotals::from_lines(&lines);
    /// assert_eq!(totals.subtotal_minor, 54500);
    /// assert_eq!(totals.tax_minor, 12500 + 270);
    /// assert_eq!(totals.total_minor, 54500 + 12770);
    /// assert_eq!(totals.tax_bands.len(), 2);
    /// ```
    pub fn from_lines(lines: &[LineItem]) -> Self {
        let mut totals = DocumentTotals::default();

        for line in lines {
            let line_totals = line.totals();
            totals.add_line(line.tax_rate_pct, &line_totals);
        }

        totals
    }

    fn add_line(&mut self, rate_pct: f64, line: &LineTotals) {
        self.line_count += 1;
        self.pre_discount_minor = self.pre_discount_minor.saturating_add(line.pre_disc_minor);
        self.discount_minor = self.discount_minor.saturating_add(line.discount_minor());
        self.subtotal_minor = self.subtotal_minor.saturating_add(line.after_disc_minor);
        self.tax_minor = self.tax_minor.saturating_add(line.tax_minor);
        self.total_minor = self.total_minor.saturating_add(line.total_minor);

        match self.tax_bands.iter_mut().find(|band| band.rate_pct == rate_pct) {
            Some(band) => {
                band.base_minor = band.base_minor.saturating_add(line.after_disc_minor);
                band.tax_minor = band.tax_minor.saturating_add(line.tax_minor);
            }
            None => self.tax_bands.push(TaxBand {
                rate_pct,
                base_minor: line.after_disc_minor,
                tax_minor: line.tax_minor,
            }),
        }
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_minor(self.subtotal_minor)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_minor(self.tax_minor)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_minor)
    }

    pub fn is_empty(&self) -> bool {
        self.line_count == 0
    }
}

// =============================================================================
// Sales Document
// =============================================================================

/// Anything that carries priced lines in one currency.
///
/// Implemented by quotes, orders, invoices and conversion drafts so every
/// consumer computes totals the same way.
pub trait SalesDocument {
    fn currency(&self) -> &str;

    fn lines(&self) -> &[LineItem];

    fn totals(&self) -> DocumentTotals {
        DocumentTotals::from_lines(self.lines())
    }

    /// Per-line breakdown in line order.
    fn line_totals(&self) -> Vec<LineTotals> {
        self.lines().iter().map(LineItem::totals).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
