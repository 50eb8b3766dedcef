//! # quill-automation: Pipeline Automation for Quill CRM
//!
//! Turns pipeline events into "create the next document" triggers, exactly
//! once per logical event.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   deal stage → "Proposal" ──┐                                           │
//! │   deal stage → "Won"      ──┤                                           │
//! │   quote      → accepted   ──┼──► AutomationEngine ──► AutomationTrigger │
//! │   order      → delivered  ──┘        │                      │           │
//! │                                      │                      ▼           │
//! │                        ┌─────────────┴──────────┐   DocumentCreator     │
//! │                        │ StageMapping           │   ActivityLogger      │
//! │                        │ IdempotencyStore + TTL │                       │
//! │                        │ 1 s debounce           │                       │
//! │                        └────────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`engine`] - `AutomationEngine`, outcomes, complete / cancel
//! - [`idempotency`] - `automation_key`, `IdempotencyStore`, in-memory store
//! - [`stage`] - stage-name normalization and classification
//! - [`trigger`] - triggers, creation requests, activity entries, notices
//! - [`collaborators`] - `DocumentCreator`, `ActivityLogger`
//! - [`clock`] - `Clock`, `SystemClock`, `ManualClock`
//! - [`config`] - `AutomationConfig` (TOML + env)
//! - [`error`] - `AutomationError`
//!
//! ## Example Usage
//!
//! ```rust
//! use quill_automation::clock::SystemClock;
//! use quill_automation::config::AutomationConfig;
//! use quill_automation::engine::{AutomationEngine, AutomationOutcome};
//! use quill_automation::idempotency::InMemoryIdempotencyStore;
//! use quill_core::Deal;
//!
//! let config = AutomationConfig::default();
//! let store = InMemoryIdempotencyStore::new(SystemClock);
//! let mut engine = AutomationEngine::new(store, SystemClock, &config);
//!
//! let deal = Deal {
//!     id: "deal-1".into(),
//!     title: "Fleet renewal".into(),
//!     company_id: None,
//!     contact_id: None,
//!     currency: "SEK".into(),
//!     expected_value_minor: None,
//!     notes: None,
//!     stage: "Negotiation".into(),
//! };
//!
//! // no company attached: the user is told, nothing is recorded
//! let outcome = engine.on_stage_change(&deal, "Proposal");
//! assert!(matches!(outcome, AutomationOutcome::MissingCompany(_)));
//! ```

pub mod clock;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod idempotency;
pub mod stage;
pub mod trigger;

pub use clock::{Clock, ManualClock, SystemClock};
pub use collaborators::{ActivityLogger, DocumentCreator};
pub use config::AutomationConfig;
pub use engine::{AutomationEngine, AutomationOutcome, SuppressReason};
pub use error::{AutomationError, AutomationResult, CollaboratorError};
pub use idempotency::{automation_key, IdempotencyStore, InMemoryIdempotencyStore};
pub use trigger::{AutomationKind, AutomationTrigger, CreationRequest};
