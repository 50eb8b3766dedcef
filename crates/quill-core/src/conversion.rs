//! # Document Conversion
//!
//! Pure builders for the follow-on document of each pipeline step:
//!
//! ```text
//!   Quote (accepted) ──order_draft_from_quote──► OrderDraft
//!   Order (delivered) ──invoice_draft_from_order──► InvoiceDraft
//! ```
//!
//! Drafts carry no id or number; the persistence layer assigns those when
//! the draft is created. Lines are copied under fresh ids so the new
//! document owns them.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::line_item::{LineItem, SalesDocument};
use crate::types::{Order, OrderStatus, Quote, QuoteStatus};

/// An order about to be created from an accepted quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDraft {
    pub quote_id: String,
    pub deal_id: Option<String>,
    pub company_id: String,
    pub contact_id: Option<String>,
    pub currency: String,
    #[ts(as = "String")]
    pub order_date: NaiveDate,
    pub lines: Vec<LineItem>,
    pub notes: Option<String>,
}

/// An invoice about to be created from a delivered order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceDraft {
    pub order_id: String,
    pub deal_id: Option<String>,
    pub company_id: String,
    pub contact_id: Option<String>,
    pub currency: String,
    #[ts(as = "String")]
    pub issue_date: NaiveDate,
    #[ts(as = "String")]
    pub due_date: NaiveDate,
    pub lines: Vec<LineItem>,
    pub notes: Option<String>,
}

impl SalesDocument for OrderDraft {
    fn currency(&self) -> &str {
        &self.currency
    }

    fn lines(&self) -> &[LineItem] {
        &self.lines
    }
}

impl SalesDocument for InvoiceDraft {
    fn currency(&self) -> &str {
        &self.currency
    }

    fn lines(&self) -> &[LineItem] {
        &self.lines
    }
}

/// Builds the order for an accepted quote.
///
/// ## Errors
/// - [`CoreError::NotConvertible`] unless the quote is `accepted`
/// - [`CoreError::EmptyDocument`] if the quote has no lines
pub fn order_draft_from_quote(quote: &Quote, order_date: NaiveDate) -> CoreResult<OrderDraft> {
    if quote.status != QuoteStatus::Accepted {
        return Err(CoreError::NotConvertible {
            kind: "quote",
            id: quote.number.clone(),
            status: quote.status.to_string(),
            required: QuoteStatus::Accepted.to_string(),
        });
    }
    if quote.lines.is_empty() {
        return Err(CoreError::EmptyDocument {
            kind: "quote",
            id: quote.number.clone(),
        });
    }

    Ok(OrderDraft {
        quote_id: quote.id.clone(),
        deal_id: quote.deal_id.clone(),
        company_id: quote.company_id.clone(),
        contact_id: quote.contact_id.clone(),
        currency: quote.currency.clone(),
        order_date,
        lines: quote.lines.iter().map(LineItem::duplicate).collect(),
        notes: quote.notes.clone(),
    })
}

/// Builds the invoice for a delivered order, due `payment_terms_days`
/// after `issue_date`.
///
/// ## Errors
/// - [`CoreError::NotConvertible`] unless the order is `delivered`
/// - [`CoreError::EmptyDocument`] if the order has no lines
pub fn invoice_draft_from_order(
    order: &Order,
    issue_date: NaiveDate,
    payment_terms_days: u32,
) -> CoreResult<InvoiceDraft> {
    if order.status != OrderStatus::Delivered {
        return Err(CoreError::NotConvertible {
            kind: "order",
            id: order.number.clone(),
            status: order.status.to_string(),
            required: OrderStatus::Delivered.to_string(),
        });
    }
    if order.lines.is_empty() {
        return Err(CoreError::EmptyDocument {
            kind: "order",
            id: order.number.clone(),
        });
    }

    let due_date = issue_date
        .checked_add_days(Days::new(u64::from(payment_terms_days)))
        .unwrap_or(NaiveDate::MAX);

    Ok(InvoiceDraft {
        order_id: order.id.clone(),
        deal_id: order.deal_id.clone(),
        company_id: order.company_id.clone(),
        contact_id: order.contact_id.clone(),
        currency: order.currency.clone(),
        issue_date,
        due_date,
        lines: order.lines.iter().map(LineItem::duplicate).collect(),
        notes: order.notes.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn accepted_quote() -> Quote {
        Quote {
            id: "q-9".into(),
            number: "Q-2026-0009".into(),
            deal_id: Some("deal-3".into()),
            company_id: "co-1".into(),
            contact_id: Some("ct-4".into()),
            currency: "SEK".into(),
            status: QuoteStatus::Accepted,
            issue_date: date(2026, 2, 1),
            valid_until: Some(date(2026, 3, 1)),
            lines: vec![
                LineItem::new("Install", 1.0, 250000).with_tax_rate(25.0),
                LineItem::new("Support", 12.0, 9900).with_discount(5.0).with_tax_rate(25.0),
            ],
            notes: Some("Net 30".into()),
        }
    }

    #[test]
    fn test_order_from_accepted_quote() {
        let quote = accepted_quote();
        let draft = order_draft_from_quote(&quote, date(2026, 2, 10)).unwrap();

        assert_eq!(draft.quote_id, "q-9");
        assert_eq!(draft.deal_id.as_deref(), Some("deal-3"));
        assert_eq!(draft.currency, "SEK");
        assert_eq!(draft.lines.len(), 2);
        assert_ne!(draft.lines[0].id, quote.lines[0].id);
        assert_eq!(draft.totals(), quote.totals());
    }

    #[test]
    fn test_order_requires_accepted_quote() {
        let mut quote = accepted_quote();
        quote.status = QuoteStatus::Sent;
        let err = order_draft_from_quote(&quote, date(2026, 2, 10)).unwrap_err();
        assert!(matches!(err, CoreError::NotConvertible { kind: "quote", .. }));
    }

    #[test]
    fn test_empty_quote_is_not_converted() {
        let mut quote = accepted_quote();
        quote.lines.clear();
        let err = order_draft_from_quote(&quote, date(2026, 2, 10)).unwrap_err();
        assert!(matches!(err, CoreError::EmptyDocument { .. }));
    }

    #[test]
    fn test_invoice_from_delivered_order() {
        let quote = accepted_quote();
        let draft = order_draft_from_quote(&quote, date(2026, 2, 10)).unwrap();
        let order = Order {
            id: "o-5".into(),
            number: "O-2026-0005".into(),
            quote_id: Some(draft.quote_id.clone()),
            deal_id: draft.deal_id.clone(),
            company_id: draft.company_id.clone(),
            contact_id: draft.contact_id.clone(),
            currency: draft.currency.clone(),
            status: OrderStatus::Delivered,
            order_date: draft.order_date,
            delivery_date: Some(date(2026, 2, 20)),
            lines: draft.lines.clone(),
            notes: None,
        };

        let invoice = invoice_draft_from_order(&order, date(2026, 2, 21), 30).unwrap();
        assert_eq!(invoice.order_id, "o-5");
        assert_eq!(invoice.due_date, date(2026, 3, 23));
        assert_eq!(invoice.totals().total_minor, quote.totals().total_minor);
    }

    #[test]
    fn test_invoice_requires_delivered_order() {
        let order = Order {
            id: "o-6".into(),
            number: "O-6".into(),
            quote_id: None,
            deal_id: None,
            company_id: "co-1".into(),
            contact_id: None,
            currency: "SEK".into(),
            status: OrderStatus::Confirmed,
            order_date: date(2026, 2, 1),
            delivery_date: None,
            lines: vec![LineItem::new("Box", 1.0, 100)],
            notes: None,
        };
        let err = invoice_draft_from_order(&order, date(2026, 2, 2), 30).unwrap_err();
        assert_eq!(
            err.to_string(),
            "order O-6 is confirmed, must be delivered before it can be converted"
        );
    }
}
