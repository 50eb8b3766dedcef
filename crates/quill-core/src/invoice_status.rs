//! # Invoice Status Derivation
//!
//! Computes the single authoritative display status of an invoice from its
//! payment state, overriding whatever stale value is stored.
//!
//! ## Decision Table
//! ```text
//! ┌─────┬──────────┬──────────────────────────────────────────┬───────────┐
//! │ #   │ rule     │ predicate                                │ status    │
//! ├─────┼──────────┼──────────────────────────────────────────┼───────────┤
//! │ 1   │ paid     │ balance == 0 && total > 0                │ paid      │
//! │ 2   │ overdue  │ due_date < today && balance > 0          │ overdue   │
//! │ 3   │ partial  │ paid > 0 && balance > 0                  │ partial   │
//! │ -   │ fallback │ (no rule matched)                        │ draft|sent│
//! └─────┴──────────┴──────────────────────────────────────────┴───────────┘
//!   First match wins. Payments decide paid/overdue/partial; the stored
//!   status only tells draft from sent, which payments cannot.
//! ```
//!
//! Badges and status-count filters MUST both go through
//! [`derive_invoice_status`] so the numbers on a filter chip always match
//! the badges in the list below it. [`StatusCounts::tally`] and
//! [`filter_by_status`] do exactly that.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::line_item::SalesDocument;
use crate::types::{paid_minor_for, Invoice, InvoiceStatus, Payment};

// =============================================================================
// Invoice Snapshot
// =============================================================================

/// The inputs of status derivation, and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceSnapshot {
    pub total_minor: i64,
    pub paid_minor: i64,
    /// Outstanding amount, never negative.
    pub balance_minor: i64,
    #[ts(as = "Option<String>")]
    pub due_date: Option<NaiveDate>,
    pub stored_status: InvoiceStatus,
}

impl InvoiceSnapshot {
    /// Builds a snapshot, computing `balance = max(total - paid, 0)`.
    ///
    /// Overpayment is clamped to a zero balance so an overpaid invoice
    /// still reads as paid.
    pub fn new(
        total_minor: i64,
        paid_minor: i64,
        due_date: Option<NaiveDate>,
        stored_status: InvoiceStatus,
    ) -> Self {
        InvoiceSnapshot {
            total_minor,
            paid_minor,
            balance_minor: total_minor.saturating_sub(paid_minor).max(0),
            due_date,
            stored_status,
        }
    }

    /// Builds a snapshot from an invoice and its payments.
    ///
    /// The total is re-derived from the invoice lines and only payments
    /// whose `invoice_id` matches are counted.
    pub fn from_invoice(invoice: &Invoice, payments: &[Payment]) -> Self {
        let total_minor = invoice.totals().total_minor;
        let paid_minor = paid_minor_for(&invoice.id, payments);
        Self::new(total_minor, paid_minor, invoice.due_date, invoice.status)
    }
}

// =============================================================================
// Rules
// =============================================================================

/// One row of the decision table.
#[derive(Debug, Clone, Copy)]
pub struct StatusRule {
    pub name: &'static str,
    pub status: InvoiceStatus,
    pub applies: fn(&InvoiceSnapshot, NaiveDate) -> bool,
}

/// Settled in full.
pub fn is_paid(invoice: &InvoiceSnapshot, _today: NaiveDate) -> bool {
    invoice.balance_minor == 0 && invoice.total_minor > 0
}

/// Past due with money still outstanding. The due date itself is not late.
pub fn is_overdue(invoice: &InvoiceSnapshot, today: NaiveDate) -> bool {
    invoice.balance_minor > 0 && invoice.due_date.is_some_and(|due| due < today)
}

/// Something paid, something outstanding.
pub fn is_partial(invoice: &InvoiceSnapshot, _today: NaiveDate) -> bool {
    invoice.paid_minor > 0 && invoice.balance_minor > 0
}

/// The decision table, in priority order.
pub static STATUS_RULES: [StatusRule; 3] = [
    StatusRule {
        name: "paid",
        status: InvoiceStatus::Paid,
        applies: is_paid,
    },
    StatusRule {
        name: "overdue",
        status: InvoiceStatus::Overdue,
        applies: is_overdue,
    },
    StatusRule {
        name: "partial",
        status: InvoiceStatus::Partial,
        applies: is_partial,
    },
];

/// Returns the first rule that matches, or `None` when the stored status
/// stands.
pub fn matching_rule(invoice: &InvoiceSnapshot, today: NaiveDate) -> Option<&'static StatusRule> {
    STATUS_RULES.iter().find(|rule| (rule.applies)(invoice, today))
}

/// Derives the display status of an invoice as of `today`.
///
/// Total over every snapshot: always returns one of the five statuses and
/// never panics.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use quill_core::invoice_status::{derive_invoice_status, InvoiceSnapshot};
/// use quill_core::types::InvoiceStatus;
///
/// let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
/// let due = NaiveDate::from_ymd_opt(2026, 5, 31);
///
/// let invoice = InvoiceSnapshot::new(10000, 3000, due, InvoiceStatus::Sent);
/// assert_eq!(derive_invoice_status(&invoice, today), InvoiceStatus::Partial);
/// ```
pub fn derive_invoice_status(invoice: &InvoiceSnapshot, today: NaiveDate) -> InvoiceStatus {
    matching_rule(invoice, today)
        .map(|rule| rule.status)
        .unwrap_or_else(|| fallback_status(invoice.stored_status))
}

/// A stored paid/partial/overdue is stale once no rule backs it up.
fn fallback_status(stored: InvoiceStatus) -> InvoiceStatus {
    match stored {
        InvoiceStatus::Draft => InvoiceStatus::Draft,
        _ => InvoiceStatus::Sent,
    }
}

/// [`derive_invoice_status`] against a UTC timestamp.
///
/// Due dates are calendar days, so `now` is reduced to its UTC date first:
/// an invoice due on 2026-06-15 becomes overdue at 2026-06-16T00:00Z, not
/// at any time during the 15th.
pub fn derive_invoice_status_at(invoice: &InvoiceSnapshot, now: DateTime<Utc>) -> InvoiceStatus {
    derive_invoice_status(invoice, now.date_naive())
}

// =============================================================================
// Status Counts
// =============================================================================

/// Number of invoices per derived status, for filter chips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusCounts {
    pub draft: usize,
    pub sent: usize,
    pub paid: usize,
    pub partial: usize,
    pub overdue: usize,
}

impl StatusCounts {
    /// Counts snapshots by derived status.
    pub fn tally<'a, I>(invoices: I, today: NaiveDate) -> Self
    where
        I: IntoIterator<Item = &'a InvoiceSnapshot>,
    {
        let mut counts = StatusCounts::default();
        for invoice in invoices {
            counts.increment(derive_invoice_status(invoice, today));
        }
        counts
    }

    fn increment(&mut self, status: InvoiceStatus) {
        match status {
            InvoiceStatus::Draft => self.draft += 1,
            InvoiceStatus::Sent => self.sent += 1,
            InvoiceStatus::Paid => self.paid += 1,
            InvoiceStatus::Partial => self.partial += 1,
            InvoiceStatus::Overdue => self.overdue += 1,
        }
    }

    pub fn get(&self, status: InvoiceStatus) -> usize {
        match status {
            InvoiceStatus::Draft => self.draft,
            InvoiceStatus::Sent => self.sent,
            InvoiceStatus::Paid => self.paid,
            InvoiceStatus::Partial => self.partial,
            InvoiceStatus::Overdue => self.overdue,
        }
    }

    pub fn total(&self) -> usize {
        self.draft + self.sent + self.paid + self.partial + self.overdue
    }
}

/// Keeps the items whose derived status equals `status`.
pub fn filter_by_status<'a, T, F>(
    items: &'a [T],
    status: InvoiceStatus,
    today: NaiveDate,
    snapshot_of: F,
) -> Vec<&'a T>
where
    F: Fn(&T) -> InvoiceSnapshot,
{
    items
        .iter()
        .filter(|item| derive_invoice_status(&snapshot_of(*item), today) == status)
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
