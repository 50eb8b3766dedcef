//! # Document Lifecycle
//!
//! Stored-status transitions for quotes and orders. Transitions only move
//! forward; a document never returns to an earlier status.
//!
//! ```text
//!   Quote:   draft ──► sent ──┬──► accepted
//!              │              ├──► rejected
//!              │              └──► expired
//!              └──────────────────► expired
//!
//!   Order:   draft ──► confirmed ──► delivered
//!              │           │
//!              └───────────┴──────► cancelled
//!
//!   Invoice: draft ──► sent   (paid/partial/overdue are derived, never set)
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Invoice, InvoiceStatus, Order, OrderStatus, Quote, QuoteStatus};

impl QuoteStatus {
    /// Returns true if a quote in this status may move to `next`.
    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Draft, Expired) | (Sent, Accepted) | (Sent, Rejected) | (Sent, Expired)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QuoteStatus::Accepted | QuoteStatus::Rejected | QuoteStatus::Expired
        )
    }
}

impl OrderStatus {
    /// Returns true if an order in this status may move to `next`.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Draft, Confirmed) | (Draft, Cancelled) | (Confirmed, Delivered) | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Quote {
    /// Moves the quote to `next`, rejecting backward or skipping moves.
    ///
    /// ## Example
    /// ```rust,ignore
    /// quote.transition(QuoteStatus::Sent)?;
    /// quote.transition(QuoteStatus::Accepted)?;
    /// assert!(quote.transition(QuoteStatus::Draft).is_err());
    /// ```
    pub fn transition(&mut self, next: QuoteStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                kind: "quote",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

impl Order {
    pub fn transition(&mut self, next: OrderStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                kind: "order",
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}

impl Invoice {
    /// Marks a draft invoice as sent.
    ///
    /// Only the draft → sent step is stored; everything after it is
    /// derived from payments.
    pub fn mark_sent(&mut self) -> CoreResult<()> {
        if self.status != InvoiceStatus::Draft {
            return Err(CoreError::InvalidTransition {
                kind: "invoice",
                from: self.status.to_string(),
                to: InvoiceStatus::Sent.to_string(),
            });
        }
        self.status = InvoiceStatus::Sent;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn quote(status: QuoteStatus) -> Quote {
        Quote {
            id: "q-1".into(),
            number: "Q-1".into(),
            deal_id: None,
            company_id: "co-1".into(),
            contact_id: None,
            currency: "EUR".into(),
            status,
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            valid_until: None,
            lines: Vec::new(),
            notes: None,
        }
    }

    fn order(status: OrderStatus) -> Order {
        Order {
            id: "o-1".into(),
            number: "O-1".into(),
            quote_id: None,
            deal_id: None,
            company_id: "co-1".into(),
            contact_id: None,
            currency: "EUR".into(),
            status,
            order_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            delivery_date: None,
            lines: Vec::new(),
            notes: None,
        }
    }

    #[test]
    fn test_quote_happy_path() {
        let mut q = quote(QuoteStatus::Draft);
        q.transition(QuoteStatus::Sent).unwrap();
        q.transition(QuoteStatus::Accepted).unwrap();
        assert_eq!(q.status, QuoteStatus::Accepted);
        assert!(q.status.is_terminal());
    }

    #[test]
    fn test_quote_cannot_skip_or_go_back() {
        let mut q = quote(QuoteStatus::Draft);
        assert!(q.transition(QuoteStatus::Accepted).is_err());
        assert_eq!(q.status, QuoteStatus::Draft);

        let mut q = quote(QuoteStatus::Accepted);
        let err = q.transition(QuoteStatus::Draft).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { kind: "quote", .. }));
    }

    #[test]
    fn test_terminal_statuses_have_no_exits() {
        for from in QuoteStatus::ALL.into_iter().filter(QuoteStatus::is_terminal) {
            for to in QuoteStatus::ALL {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
        for from in OrderStatus::ALL.into_iter().filter(OrderStatus::is_terminal) {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_no_self_transitions() {
        for s in QuoteStatus::ALL {
            assert!(!s.can_transition_to(s));
        }
        for s in OrderStatus::ALL {
            assert!(!s.can_transition_to(s));
        }
    }

    #[test]
    fn test_order_lifecycle() {
        let mut o = order(OrderStatus::Draft);
        o.transition(OrderStatus::Confirmed).unwrap();
        o.transition(OrderStatus::Delivered).unwrap();
        assert!(o.transition(OrderStatus::Cancelled).is_err());

        let mut o = order(OrderStatus::Confirmed);
        o.transition(OrderStatus::Cancelled).unwrap();
        assert!(o.transition(OrderStatus::Delivered).is_err());
    }

    #[test]
    fn test_invoice_mark_sent_once() {
        let mut invoice = Invoice {
            id: "i-1".into(),
            number: "I-1".into(),
            order_id: None,
            deal_id: None,
            company_id: "co-1".into(),
            contact_id: None,
            currency: "EUR".into(),
            status: InvoiceStatus::Draft,
            issue_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            due_date: None,
            lines: Vec::new(),
            notes: None,
        };
        invoice.mark_sent().unwrap();
        assert_eq!(invoice.status, InvoiceStatus::Sent);
        assert!(invoice.mark_sent().is_err());
    }
}
