//! # Domain Types
//!
//! Core domain types shared by the money engine, the status rules and the
//! automation layer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Quote       │──►│     Order       │──►│    Invoice      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  QuoteStatus    │   │  OrderStatus    │   │  stored status  │       │
//! │  │  (stored)       │   │  (stored)       │   │  + DERIVED one  │       │
//! │  │  lines[]        │   │  lines[]        │   │  lines[]        │       │
//! │  └────────▲────────┘   └────────▲────────┘   └────────▲────────┘       │
//! │           │                     │                     │                │
//! │  ┌────────┴─────────────────────┴─────┐      ┌────────┴────────┐       │
//! │  │              Deal                  │      │    Payment      │       │
//! │  │  stage change → automation         │      │  append-only    │       │
//! │  └────────────────────────────────────┘      └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names are snake_case to match the persistence layer's columns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::CoreError;
use crate::line_item::{LineItem, SalesDocument};
use crate::money::Money;

// =============================================================================
// Percent
// =============================================================================

/// A percentage, nominally in `[0, 100]` (`25.0` = 25%).
///
/// Stored as a float because discounts and tax rates may be fractional
/// (12.5%). Values are never clamped here; see [`crate::validation`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct Percent(f64);

impl Percent {
    #[inline]
    pub const fn from_pct(pct: f64) -> Self {
        Percent(pct)
    }

    /// Creates a percentage from basis points (`825` = 8.25%).
    #[inline]
    pub fn from_bps(bps: u32) -> Self {
        Percent(bps as f64 / 100.0)
    }

    #[inline]
    pub const fn pct(&self) -> f64 {
        self.0
    }

    /// The percentage as a fraction (`25%` → `0.25`).
    #[inline]
    pub fn fraction(&self) -> f64 {
        self.0 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Percent(0.0)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }
}

impl Default for Percent {
    fn default() -> Self {
        Percent::zero()
    }
}

// =============================================================================
// Quote Status
// =============================================================================

/// Stored status of a quote. Transition rules live in [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// Being edited, not yet sent to the customer.
    #[default]
    Draft,
    /// Sent and awaiting a decision.
    Sent,
    /// Accepted by the customer; may be converted to an order.
    Accepted,
    /// Declined by the customer.
    Rejected,
    /// Validity date passed without a decision.
    Expired,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 5] = [
        QuoteStatus::Draft,
        QuoteStatus::Sent,
        QuoteStatus::Accepted,
        QuoteStatus::Rejected,
        QuoteStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(QuoteStatus::Draft),
            "sent" => Ok(QuoteStatus::Sent),
            "accepted" => Ok(QuoteStatus::Accepted),
            "rejected" | "declined" => Ok(QuoteStatus::Rejected),
            "expired" => Ok(QuoteStatus::Expired),
            other => Err(CoreError::UnknownStatus {
                kind: "quote",
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Stored status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Draft,
    /// Confirmed with the customer, work or shipping in progress.
    Confirmed,
    /// Delivered; may be converted to an invoice.
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Draft,
        OrderStatus::Confirmed,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(OrderStatus::Draft),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            other => Err(CoreError::UnknownStatus {
                kind: "order",
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Invoice Status
// =============================================================================

/// Display status of an invoice.
///
/// Only `Draft` and `Sent` carry information when stored; `Paid`, `Partial`
/// and `Overdue` are derived from payments by
/// [`crate::invoice_status::derive_invoice_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Partial,
    Overdue,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Partial,
        InvoiceStatus::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(InvoiceStatus::Draft),
            "sent" => Ok(InvoiceStatus::Sent),
            "paid" => Ok(InvoiceStatus::Paid),
            "partial" | "partially_paid" => Ok(InvoiceStatus::Partial),
            "overdue" => Ok(InvoiceStatus::Overdue),
            other => Err(CoreError::UnknownStatus {
                kind: "invoice",
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// Payment
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Card,
    Cash,
    Other,
}

/// A payment registered against an invoice. Append-only.
///
/// Keeping the sum of payments at or below the invoice total is the
/// caller's job; see [`crate::validation::validate_payment_total`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Payment {
    pub id: String,
    pub invoice_id: String,
    pub amount_minor: i64,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub method: PaymentMethod,
    /// Bank reference, card authorization code, etc.
    #[serde(default)]
    pub reference: Option<String>,
}

impl Payment {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_minor(self.amount_minor)
    }
}

/// Sums the payments that belong to `invoice_id`.
pub fn paid_minor_for(invoice_id: &str, payments: &[Payment]) -> i64 {
    payments
        .iter()
        .filter(|p| p.invoice_id == invoice_id)
        .fold(0i64, |acc, p| acc.saturating_add(p.amount_minor))
}

// =============================================================================
// Deal
// =============================================================================

/// A sales opportunity moving through pipeline stages.
///
/// Only the fields the automation layer reads are modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Deal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub contact_id: Option<String>,
    pub currency: String,
    #[serde(default)]
    pub expected_value_minor: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Display name of the current pipeline stage.
    pub stage: String,
}

impl Deal {
    /// Returns the attached company, treating a blank id as missing.
    pub fn company(&self) -> Option<&str> {
        self.company_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

// =============================================================================
// Documents
// =============================================================================

/// A price quote sent to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub id: String,
    /// Human-readable number, e.g. `Q-2026-0042`.
    pub number: String,
    #[serde(default)]
    pub deal_id: Option<String>,
    pub company_id: String,
    #[serde(default)]
    pub contact_id: Option<String>,
    pub currency: String,
    pub status: QuoteStatus,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<NaiveDate>,
    #[serde(default)]
    pub lines: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A confirmed customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub number: String,
    /// The quote this order was converted from, if any.
    #[serde(default)]
    pub quote_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    pub company_id: String,
    #[serde(default)]
    pub contact_id: Option<String>,
    pub currency: String,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub lines: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// An invoice. `status` is the STORED value; the status shown to users is
/// derived from payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    pub number: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    pub company_id: String,
    #[serde(default)]
    pub contact_id: Option<String>,
    pub currency: String,
    pub status: InvoiceStatus,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub lines: Vec<LineItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl SalesDocument for Quote {
    fn currency(&self) -> &str {
        &self.currency
    }

    fn lines(&self) -> &[LineItem] {
        &self.lines
    }
}

impl SalesDocument for Order {
    fn currency(&self) -> &str {
        &self.currency
    }

    fn lines(&self) -> &[LineItem] {
        &self.lines
    }
}

impl SalesDocument for Invoice {
    fn currency(&self) -> &str {
        &self.currency
    }

    fn lines(&self) -> &[LineItem] {
        &self.lines
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_from_bps() {
        let rate = Percent::from_bps(825);
        assert!((rate.pct() - 8.25).abs() < 1e-9);
        assert!((rate.fraction() - 0.0825).abs() < 1e-9);
        assert!(Percent::default().is_zero());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Accepted".parse::<QuoteStatus>().unwrap(), QuoteStatus::Accepted);
        assert_eq!("declined".parse::<QuoteStatus>().unwrap(), QuoteStatus::Rejected);
        assert_eq!("canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert_eq!(" overdue ".parse::<InvoiceStatus>().unwrap(), InvoiceStatus::Overdue);
        assert!("archived".parse::<InvoiceStatus>().is_err());
    }

    #[test]
    fn test_status_round_trips_through_as_str() {
        for status in InvoiceStatus::ALL {
            assert_eq!(status.as_str().parse::<InvoiceStatus>().unwrap(), status);
        }
        for status in QuoteStatus::ALL {
            assert_eq!(status.to_string().parse::<QuoteStatus>().unwrap(), status);
        }
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_serde_is_snake_case() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
        let status: InvoiceStatus = serde_json::from_str("\"partial\"").unwrap();
        assert_eq!(status, InvoiceStatus::Partial);
    }

    #[test]
    fn test_paid_minor_only_counts_matching_invoice() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let payment = |invoice_id: &str, amount_minor| Payment {
            id: format!("pay-{}-{}", invoice_id, amount_minor),
            invoice_id: invoice_id.to_string(),
            amount_minor,
            date,
            method: PaymentMethod::BankTransfer,
            reference: None,
        };
        let payments = vec![payment("inv-1", 3000), payment("inv-2", 9999), payment("inv-1", 2000)];

        assert_eq!(paid_minor_for("inv-1", &payments), 5000);
        assert_eq!(paid_minor_for("inv-3", &payments), 0);
    }

    #[test]
    fn test_deal_blank_company_is_missing() {
        let mut deal = Deal {
            id: "deal-1".into(),
            title: "Fleet renewal".into(),
            company_id: Some("  ".into()),
            contact_id: None,
            currency: "SEK".into(),
            expected_value_minor: None,
            notes: None,
            stage: "Lead".into(),
        };
        assert_eq!(deal.company(), None);

        deal.company_id = Some("co-7".into());
        assert_eq!(deal.company(), Some("co-7"));
    }
}
