//! # Automation Triggers
//!
//! The value objects that flow through the automation engine:
//!
//! ```text
//!   Deal stage change ──► AutomationTrigger { kind, key, request }
//!                               │
//!                               ▼  (consumed exactly once)
//!                 DocumentCreator::create(request)
//!                               │
//!                               ▼
//!                 ActivityEntry { type, deal_id, meta }
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use quill_core::conversion::{InvoiceDraft, OrderDraft};
use quill_core::Deal;

// =============================================================================
// Automation Kind
// =============================================================================

/// The document an automation creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationKind {
    Quote,
    Order,
    Invoice,
}

impl AutomationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutomationKind::Quote => "quote",
            AutomationKind::Order => "order",
            AutomationKind::Invoice => "invoice",
        }
    }
}

impl fmt::Display for AutomationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Creation Requests
// =============================================================================

/// Pre-filled fields for a quote or order created from a deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealDocumentRequest {
    pub deal_id: String,
    pub company_id: String,
    pub contact_id: Option<String>,
    pub currency: String,
    pub expected_value_minor: Option<i64>,
    pub title: String,
    pub notes: Option<String>,
    pub tax_pct: f64,
    pub date: NaiveDate,
}

impl DealDocumentRequest {
    /// Builds the request for a deal that has a company attached.
    pub fn from_deal(deal: &Deal, company_id: &str, tax_pct: f64, date: NaiveDate) -> Self {
        DealDocumentRequest {
            deal_id: deal.id.clone(),
            company_id: company_id.to_string(),
            contact_id: deal.contact_id.clone(),
            currency: deal.currency.clone(),
            expected_value_minor: deal.expected_value_minor,
            title: deal.title.clone(),
            notes: deal.notes.clone(),
            tax_pct,
            date,
        }
    }
}

/// What the document creator is asked to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CreationRequest {
    /// Quote pre-filled from a deal that reached a proposal stage.
    QuoteFromDeal(DealDocumentRequest),
    /// Order pre-filled from a deal that reached a won stage.
    OrderFromDeal(DealDocumentRequest),
    /// Order copied from an accepted quote.
    OrderFromQuote(OrderDraft),
    /// Invoice copied from a delivered order.
    InvoiceFromOrder(InvoiceDraft),
}

impl CreationRequest {
    pub fn kind(&self) -> AutomationKind {
        match self {
            CreationRequest::QuoteFromDeal(_) => AutomationKind::Quote,
            CreationRequest::OrderFromDeal(_) | CreationRequest::OrderFromQuote(_) => {
                AutomationKind::Order
            }
            CreationRequest::InvoiceFromOrder(_) => AutomationKind::Invoice,
        }
    }

    /// The deal the new document belongs to, when known.
    pub fn deal_id(&self) -> Option<&str> {
        match self {
            CreationRequest::QuoteFromDeal(req) | CreationRequest::OrderFromDeal(req) => {
                Some(&req.deal_id)
            }
            CreationRequest::OrderFromQuote(draft) => draft.deal_id.as_deref(),
            CreationRequest::InvoiceFromOrder(draft) => draft.deal_id.as_deref(),
        }
    }
}

/// A document the creator reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedDocument {
    pub kind: AutomationKind,
    pub id: String,
    pub number: Option<String>,
}

// =============================================================================
// Trigger
// =============================================================================

/// A fired automation waiting for its creation flow to finish.
///
/// Not `Clone`: completing or cancelling consumes it, so each trigger is
/// resolved once.
#[derive(Debug, PartialEq, Serialize)]
pub struct AutomationTrigger {
    pub kind: AutomationKind,
    /// Deal id for stage changes, quote/order id for conversions.
    pub subject_id: String,
    pub key: String,
    pub request: CreationRequest,
    pub fired_at: DateTime<Utc>,
}

// =============================================================================
// Activity Log
// =============================================================================

/// Ids recorded with an activity. Only the created document's id is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub deal_id: Option<String>,
    pub meta: ActivityMeta,
}

impl ActivityEntry {
    /// `quote_created` / `order_created` / `invoice_created` for a new document.
    pub fn document_created(deal_id: Option<&str>, document: &CreatedDocument) -> Self {
        let mut meta = ActivityMeta::default();
        match document.kind {
            AutomationKind::Quote => meta.quote_id = Some(document.id.clone()),
            AutomationKind::Order => meta.order_id = Some(document.id.clone()),
            AutomationKind::Invoice => meta.invoice_id = Some(document.id.clone()),
        }
        ActivityEntry {
            activity_type: format!("{}_created", document.kind),
            deal_id: deal_id.map(str::to_string),
            meta,
        }
    }
}

// =============================================================================
// Notices
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeSeverity {
    Info,
    Error,
}

/// A user-facing, non-fatal message (rendered as a toast by the UI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn missing_company(kind: AutomationKind, deal_title: &str) -> Self {
        Notice {
            severity: NoticeSeverity::Error,
            title: "Company required".to_string(),
            description: format!(
                "Attach a company to \"{}\" before a {} can be created.",
                deal_title, kind
            ),
        }
    }
}
