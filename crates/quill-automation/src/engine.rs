//! # Automation Engine
//!
//! Decides whether a pipeline event should create a follow-on document, and
//! resolves the resulting trigger once the creation flow finishes.
//!
//! ## Stage Change Decision
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  on_stage_change(deal, "Won")                                           │
//! │        │                                                                │
//! │        ├── automation disabled / stage not mapped ──► NoAutomation      │
//! │        ├── deal has no company ─────────────────────► MissingCompany    │
//! │        │                                  (notice, nothing recorded)    │
//! │        ├── same deal fired < debounce ago ──────────► Suppressed        │
//! │        ├── key still inside its window ─────────────► Suppressed        │
//! │        └── mark key, remember fire time ────────────► Triggered         │
//! │                                                                         │
//! │  Triggered ──► caller shows the creation flow                           │
//! │        ├── complete(trigger) ok  → activity logged, key cleared         │
//! │        ├── complete(trigger) err → error returned, key stays set        │
//! │        └── cancel(trigger)       → key cleared, nothing created         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The debounce guard is independent of key state: it absorbs duplicate
//! event dispatches even after a key was cleared by a fast completion.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use quill_core::conversion::{invoice_draft_from_order, order_draft_from_quote};
use quill_core::{Deal, Order, OrderStatus, Quote, QuoteStatus};

use crate::clock::Clock;
use crate::collaborators::{ActivityLogger, DocumentCreator};
use crate::config::{AutomationConfig, AutomationSettings, DocumentSettings};
use crate::error::{AutomationError, AutomationResult};
use crate::idempotency::{automation_key, IdempotencyStore};
use crate::stage::{StageIntent, StageMapping};
use crate::trigger::{
    ActivityEntry, AutomationKind, AutomationTrigger, CreatedDocument, CreationRequest,
    DealDocumentRequest, Notice,
};

/// Why a recognised event did not fire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressReason {
    /// The same subject fired less than the debounce interval ago.
    Debounced,
    /// The key is still inside its idempotency window.
    Duplicate { key: String },
}

#[derive(Debug, PartialEq)]
pub enum AutomationOutcome {
    /// The event does not map to any automation.
    NoAutomation,
    /// A company must be attached first. Nothing was recorded.
    MissingCompany(Notice),
    Suppressed(SuppressReason),
    Triggered(AutomationTrigger),
}

impl AutomationOutcome {
    pub fn is_triggered(&self) -> bool {
        matches!(self, AutomationOutcome::Triggered(_))
    }

    pub fn into_trigger(self) -> Option<AutomationTrigger> {
        match self {
            AutomationOutcome::Triggered(trigger) => Some(trigger),
            _ => None,
        }
    }
}

pub struct AutomationEngine<S, C> {
    store: S,
    clock: C,
    stages: StageMapping,
    settings: AutomationSettings,
    documents: DocumentSettings,
    /// Last fire time per subject id, for the debounce guard.
    last_fired: HashMap<String, DateTime<Utc>>,
}

impl<S: IdempotencyStore, C: Clock> AutomationEngine<S, C> {
    pub fn new(store: S, clock: C, config: &AutomationConfig) -> Self {
        AutomationEngine {
            store,
            clock,
            stages: StageMapping::from_settings(&config.stages),
            settings: config.automation.clone(),
            documents: config.documents.clone(),
            last_fired: HashMap::new(),
        }
    }

    /// Replaces the stage mapping built from configuration.
    pub fn with_stages(mut self, stages: StageMapping) -> Self {
        self.stages = stages;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stages(&self) -> &StageMapping {
        &self.stages
    }

    fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Handles a deal moving to `to_stage`.
    pub fn on_stage_change(&mut self, deal: &Deal, to_stage: &str) -> AutomationOutcome {
        if !self.settings.enabled {
            return AutomationOutcome::NoAutomation;
        }

        let Some(intent) = self.stages.classify(to_stage) else {
            debug!(deal_id = %deal.id, stage = to_stage, "Stage has no automation");
            return AutomationOutcome::NoAutomation;
        };
        let kind = intent.kind();

        let Some(company_id) = deal.company() else {
            warn!(deal_id = %deal.id, %kind, "Deal has no company, automation aborted");
            return AutomationOutcome::MissingCompany(Notice::missing_company(kind, &deal.title));
        };

        let request = DealDocumentRequest::from_deal(
            deal,
            company_id,
            self.documents.default_tax_pct,
            self.today(),
        );
        let request = match intent {
            StageIntent::CreateQuote => CreationRequest::QuoteFromDeal(request),
            StageIntent::CreateOrder => CreationRequest::OrderFromDeal(request),
        };

        self.fire(&deal.id, request)
    }

    /// Handles a stored quote status change. Only `accepted` fires.
    ///
    /// ## Errors
    /// [`quill_core::CoreError::EmptyDocument`] if the accepted quote has no lines.
    pub fn on_quote_status_change(&mut self, quote: &Quote) -> AutomationResult<AutomationOutcome> {
        if !self.settings.enabled || quote.status != QuoteStatus::Accepted {
            return Ok(AutomationOutcome::NoAutomation);
        }
        if quote.company_id.trim().is_empty() {
            return Ok(AutomationOutcome::MissingCompany(Notice::missing_company(
                AutomationKind::Order,
                &quote.number,
            )));
        }

        let draft = order_draft_from_quote(quote, self.today())?;
        Ok(self.fire(&quote.id, CreationRequest::OrderFromQuote(draft)))
    }

    /// Handles a stored order status change. Only `delivered` fires.
    pub fn on_order_status_change(&mut self, order: &Order) -> AutomationResult<AutomationOutcome> {
        if !self.settings.enabled || order.status != OrderStatus::Delivered {
            return Ok(AutomationOutcome::NoAutomation);
        }
        if order.company_id.trim().is_empty() {
            return Ok(AutomationOutcome::MissingCompany(Notice::missing_company(
                AutomationKind::Invoice,
                &order.number,
            )));
        }

        let draft =
            invoice_draft_from_order(order, self.today(), self.documents.payment_terms_days)?;
        Ok(self.fire(&order.id, CreationRequest::InvoiceFromOrder(draft)))
    }

    fn fire(&mut self, subject_id: &str, request: CreationRequest) -> AutomationOutcome {
        let now = self.clock.now();
        let debounce = self.settings.debounce();

        if let Some(last) = self.last_fired.get(subject_id) {
            if now - *last < debounce {
                debug!(subject_id, "Automation debounced");
                return AutomationOutcome::Suppressed(SuppressReason::Debounced);
            }
        }

        let kind = request.kind();
        let key = automation_key(kind, subject_id);
        let window = self.settings.idempotency_window();

        if self.store.is_idempotent(&key, window) {
            debug!(%key, "Automation already pending");
            return AutomationOutcome::Suppressed(SuppressReason::Duplicate { key });
        }

        self.store.mark_idempotent(&key, window);
        self.store.purge_expired();
        self.last_fired.retain(|_, at| now - *at < debounce);
        self.last_fired.insert(subject_id.to_string(), now);

        info!(%kind, subject_id, %key, "Automation triggered");
        AutomationOutcome::Triggered(AutomationTrigger {
            kind,
            subject_id: subject_id.to_string(),
            key,
            request,
            fired_at: now,
        })
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Runs the creation for `trigger`.
    ///
    /// On success the activity is logged and the key is cleared. An activity
    /// log failure is only logged. On creation failure the key stays set
    /// until its window lapses or [`clear`](Self::clear) is called.
    pub async fn complete<D, A>(
        &mut self,
        trigger: AutomationTrigger,
        creator: &D,
        activity: &A,
    ) -> AutomationResult<CreatedDocument>
    where
        D: DocumentCreator + ?Sized,
        A: ActivityLogger + ?Sized,
    {
        let document = match creator.create(&trigger.request).await {
            Ok(document) => document,
            Err(source) => {
                warn!(key = %trigger.key, error = %source, "Automated creation failed");
                return Err(AutomationError::CreationFailed {
                    kind: trigger.kind,
                    key: trigger.key,
                    source,
                });
            }
        };

        let entry = ActivityEntry::document_created(trigger.request.deal_id(), &document);
        if let Err(e) = activity.record(&entry).await {
            warn!(document_id = %document.id, error = %e, "Failed to record activity");
        }

        self.store.clear_idempotent(&trigger.key);
        info!(kind = %document.kind, document_id = %document.id, "Automation completed");
        Ok(document)
    }

    /// Drops `trigger` without creating anything. An immediate retry for the
    /// same subject is allowed.
    pub fn cancel(&mut self, trigger: AutomationTrigger) {
        self.store.clear_idempotent(&trigger.key);
        self.last_fired.remove(&trigger.subject_id);
        debug!(key = %trigger.key, "Automation cancelled");
    }

    /// Clears a key left set by a failed creation.
    pub fn clear(&mut self, key: &str) {
        self.store.clear_idempotent(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::collaborators::{InMemoryActivityLog, InMemoryDocumentCreator};
    use crate::idempotency::InMemoryIdempotencyStore;
    use chrono::{Duration, TimeZone};
    use quill_core::LineItem;

    type TestEngine = AutomationEngine<InMemoryIdempotencyStore<ManualClock>, ManualClock>;

    fn engine() -> (ManualClock, TestEngine) {
        engine_with(AutomationConfig::default())
    }

    fn engine_with(config: AutomationConfig) -> (ManualClock, TestEngine) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap());
        let store = InMemoryIdempotencyStore::new(clock.clone());
        (clock.clone(), AutomationEngine::new(store, clock, &config))
    }

    fn deal(company: Option<&str>) -> Deal {
        Deal {
            id: "deal-1".into(),
            title: "Fleet renewal".into(),
            company_id: company.map(str::to_string),
            contact_id: Some("ct-9".into()),
            currency: "SEK".into(),
            expected_value_minor: Some(4_500_000),
            notes: Some("Three-year term".into()),
            stage: "Negotiation".into(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_proposal_without_company_aborts() {
        let (_, mut engine) = engine();

        let outcome = engine.on_stage_change(&deal(None), "Proposal");
        match outcome {
            AutomationOutcome::MissingCompany(notice) => {
                assert!(notice.description.contains("Fleet renewal"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(engine.store().is_empty());

        // blank ids count as missing
        let outcome = engine.on_stage_change(&deal(Some("  ")), "Proposal");
        assert!(matches!(outcome, AutomationOutcome::MissingCompany(_)));
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_won_twice_within_a_second_is_debounced() {
        let (clock, mut engine) = engine();
        let deal = deal(Some("co-1"));

        assert!(engine.on_stage_change(&deal, "Won").is_triggered());
        clock.advance(Duration::milliseconds(400));
        assert_eq!(
            engine.on_stage_change(&deal, "Won"),
            AutomationOutcome::Suppressed(SuppressReason::Debounced)
        );
    }

    #[test]
    fn test_debounce_applies_across_kinds() {
        let (clock, mut engine) = engine();
        let deal = deal(Some("co-1"));

        assert!(engine.on_stage_change(&deal, "Proposal").is_triggered());
        clock.advance(Duration::milliseconds(999));
        assert_eq!(
            engine.on_stage_change(&deal, "Won"),
            AutomationOutcome::Suppressed(SuppressReason::Debounced)
        );
    }

    #[test]
    fn test_pending_key_suppresses_until_window_lapses() {
        let (clock, mut engine) = engine();
        let deal = deal(Some("co-1"));

        let trigger = engine.on_stage_change(&deal, "Won").into_trigger().unwrap();
        assert_eq!(trigger.key, "order:deal-1");

        clock.advance(Duration::seconds(2));
        assert_eq!(
            engine.on_stage_change(&deal, "closed-won"),
            AutomationOutcome::Suppressed(SuppressReason::Duplicate {
                key: "order:deal-1".into()
            })
        );

        clock.advance(Duration::seconds(28));
        assert!(engine.on_stage_change(&deal, "Won").is_triggered());
    }

    #[test]
    fn test_abandoned_trigger_is_purged_on_next_fire() {
        let (clock, mut engine) = engine();

        let abandoned = engine.on_stage_change(&deal(Some("co-1")), "Won");
        assert!(abandoned.is_triggered());
        assert_eq!(engine.store().len(), 1);

        clock.advance(Duration::seconds(31));
        let other = Deal {
            id: "deal-2".into(),
            ..deal(Some("co-2"))
        };
        assert!(engine.on_stage_change(&other, "Won").is_triggered());

        assert_eq!(engine.store().len(), 1);
        assert!(engine.store().record("order:deal-1").is_none());
        assert!(engine.store().record("order:deal-2").is_some());
    }

    #[test]
    fn test_unmapped_stage_and_disabled_config() {
        let (_, mut engine) = engine();
        assert_eq!(
            engine.on_stage_change(&deal(Some("co-1")), "Qualification"),
            AutomationOutcome::NoAutomation
        );

        let mut config = AutomationConfig::default();
        config.automation.enabled = false;
        let (_, mut engine) = engine_with(config);
        assert_eq!(
            engine.on_stage_change(&deal(Some("co-1")), "Won"),
            AutomationOutcome::NoAutomation
        );
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_request_is_prefilled_from_deal() {
        let mut config = AutomationConfig::default();
        config.documents.default_tax_pct = 12.0;
        config.stages.quote = vec!["Pitch".into()];
        let (_, mut engine) = engine_with(config);

        let trigger = engine
            .on_stage_change(&deal(Some("co-1")), "pitch")
            .into_trigger()
            .unwrap();
        assert_eq!(trigger.kind, AutomationKind::Quote);
        match trigger.request {
            CreationRequest::QuoteFromDeal(req) => {
                assert_eq!(req.deal_id, "deal-1");
                assert_eq!(req.company_id, "co-1");
                assert_eq!(req.contact_id.as_deref(), Some("ct-9"));
                assert_eq!(req.expected_value_minor, Some(4_500_000));
                assert_eq!(req.tax_pct, 12.0);
                assert_eq!(req.date, date(2026, 3, 2));
            }
            other => panic!("unexpected request: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_logs_activity_and_clears_key() {
        let (clock, mut engine) = engine();
        let creator = InMemoryDocumentCreator::new();
        let log = InMemoryActivityLog::new();
        let deal = deal(Some("co-1"));

        let trigger = engine.on_stage_change(&deal, "Proposal").into_trigger().unwrap();
        let document = engine.complete(trigger, &creator, &log).await.unwrap();

        assert_eq!(document.kind, AutomationKind::Quote);
        assert!(engine.store().is_empty());

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].activity_type, "quote_created");
        assert_eq!(entries[0].deal_id.as_deref(), Some("deal-1"));
        assert_eq!(entries[0].meta.quote_id.as_deref(), Some(document.id.as_str()));

        // key is gone, only the debounce guard remains
        clock.advance(Duration::milliseconds(1_000));
        assert!(engine.on_stage_change(&deal, "Proposal").is_triggered());
    }

    #[tokio::test]
    async fn test_failed_creation_keeps_key_until_cleared() {
        let (clock, mut engine) = engine();
        let creator = InMemoryDocumentCreator::new();
        creator.set_fail_on_create(true);
        let log = InMemoryActivityLog::new();
        let deal = deal(Some("co-1"));

        let trigger = engine.on_stage_change(&deal, "Won").into_trigger().unwrap();
        let err = engine.complete(trigger, &creator, &log).await.unwrap_err();
        assert_eq!(err.pending_key(), Some("order:deal-1"));
        assert!(log.entries().is_empty());

        clock.advance(Duration::seconds(5));
        assert!(matches!(
            engine.on_stage_change(&deal, "Won"),
            AutomationOutcome::Suppressed(SuppressReason::Duplicate { .. })
        ));

        engine.clear("order:deal-1");
        assert!(engine.on_stage_change(&deal, "Won").is_triggered());
    }

    #[tokio::test]
    async fn test_activity_failure_does_not_fail_completion() {
        let (_, mut engine) = engine();
        let creator = InMemoryDocumentCreator::new();
        let log = InMemoryActivityLog::new();
        log.set_fail_on_record(true);

        let trigger = engine
            .on_stage_change(&deal(Some("co-1")), "Won")
            .into_trigger()
            .unwrap();
        let document = engine.complete(trigger, &creator, &log).await.unwrap();

        assert_eq!(document.kind, AutomationKind::Order);
        assert_eq!(creator.created_count(), 1);
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_cancel_permits_immediate_retry() {
        let (_, mut engine) = engine();
        let deal = deal(Some("co-1"));

        let trigger = engine.on_stage_change(&deal, "Won").into_trigger().unwrap();
        engine.cancel(trigger);
        assert!(engine.store().is_empty());
        assert!(engine.on_stage_change(&deal, "Won").is_triggered());
    }

    fn quote(status: QuoteStatus) -> Quote {
        Quote {
            id: "q-1".into(),
            number: "Q-2026-0001".into(),
            deal_id: Some("deal-1".into()),
            company_id: "co-1".into(),
            contact_id: None,
            currency: "SEK".into(),
            status,
            issue_date: date(2026, 2, 20),
            valid_until: None,
            lines: vec![LineItem::new("Install", 1.0, 250_000).with_tax_rate(25.0)],
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_accepted_quote_creates_order() {
        let (_, mut engine) = engine();
        let creator = InMemoryDocumentCreator::new();
        let log = InMemoryActivityLog::new();

        let outcome = engine
            .on_quote_status_change(&quote(QuoteStatus::Sent))
            .unwrap();
        assert_eq!(outcome, AutomationOutcome::NoAutomation);

        let trigger = engine
            .on_quote_status_change(&quote(QuoteStatus::Accepted))
            .unwrap()
            .into_trigger()
            .unwrap();
        assert_eq!(trigger.key, "order:q-1");
        assert!(matches!(trigger.request, CreationRequest::OrderFromQuote(_)));

        engine.complete(trigger, &creator, &log).await.unwrap();
        let entries = log.entries();
        assert_eq!(entries[0].activity_type, "order_created");
        assert_eq!(entries[0].deal_id.as_deref(), Some("deal-1"));
    }

    #[test]
    fn test_accepted_quote_without_lines_is_an_error() {
        let (_, mut engine) = engine();
        let mut quote = quote(QuoteStatus::Accepted);
        quote.lines.clear();

        let err = engine.on_quote_status_change(&quote).unwrap_err();
        assert!(matches!(err, AutomationError::Core(_)));
        assert!(engine.store().is_empty());
    }

    #[test]
    fn test_delivered_order_creates_invoice() {
        let mut config = AutomationConfig::default();
        config.documents.payment_terms_days = 14;
        let (_, mut engine) = engine_with(config);

        let order = Order {
            id: "o-1".into(),
            number: "O-2026-0001".into(),
            quote_id: Some("q-1".into()),
            deal_id: Some("deal-1".into()),
            company_id: "co-1".into(),
            contact_id: None,
            currency: "SEK".into(),
            status: OrderStatus::Delivered,
            order_date: date(2026, 2, 21),
            delivery_date: Some(date(2026, 3, 1)),
            lines: vec![LineItem::new("Install", 1.0, 250_000).with_tax_rate(25.0)],
            notes: None,
        };

        let trigger = engine
            .on_order_status_change(&order)
            .unwrap()
            .into_trigger()
            .unwrap();
        assert_eq!(trigger.kind, AutomationKind::Invoice);
        match trigger.request {
            CreationRequest::InvoiceFromOrder(draft) => {
                assert_eq!(draft.issue_date, date(2026, 3, 2));
                assert_eq!(draft.due_date, date(2026, 3, 16));
            }
            other => panic!("unexpected request: {:?}", other),
        }

        let mut confirmed = order.clone();
        confirmed.id = "o-2".into();
        confirmed.status = OrderStatus::Confirmed;
        assert_eq!(
            engine.on_order_status_change(&confirmed).unwrap(),
            AutomationOutcome::NoAutomation
        );
    }
}
