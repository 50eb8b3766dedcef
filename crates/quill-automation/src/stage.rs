//! # Stage Classification
//!
//! Maps pipeline stage names to the document a stage change should create.
//!
//! ```text
//!   "Proposal"        ─normalize─► "proposal"     ─► CreateQuote
//!   "Closed-Won"      ─normalize─► "closed won"   ─► CreateOrder
//!   "Qualification"   ─normalize─► "qualification"─► (none)
//! ```
//!
//! Pipelines are user-named and often localized, so the mapping ships with
//! English, Swedish, Norwegian and German defaults and accepts extra names
//! from configuration.

use std::collections::HashMap;
use tracing::warn;

use crate::config::StageSettings;
use crate::trigger::AutomationKind;

/// Proposal-like stage names.
pub const DEFAULT_QUOTE_STAGES: &[&str] = &[
    // en
    "proposal",
    "proposal sent",
    "quote",
    "quote sent",
    "quotation",
    // sv
    "offert",
    "offert skickad",
    "förslag",
    // no
    "tilbud",
    "tilbud sendt",
    // de
    "angebot",
    "angebot gesendet",
];

/// Won-like stage names.
pub const DEFAULT_ORDER_STAGES: &[&str] = &[
    // en
    "won",
    "closed won",
    "deal won",
    // sv
    "vunnen",
    "vunnen affär",
    "affär vunnen",
    // no
    "vunnet",
    // de
    "gewonnen",
    "abgeschlossen gewonnen",
];

/// What a stage change asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageIntent {
    CreateQuote,
    CreateOrder,
}

impl StageIntent {
    pub fn kind(&self) -> AutomationKind {
        match self {
            StageIntent::CreateQuote => AutomationKind::Quote,
            StageIntent::CreateOrder => AutomationKind::Order,
        }
    }
}

/// Normalized stage name → intent.
#[derive(Debug, Clone, Default)]
pub struct StageMapping {
    entries: HashMap<String, StageIntent>,
}

impl StageMapping {
    /// A mapping with no stages; nothing classifies.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut mapping = Self::empty();
        for stage in DEFAULT_QUOTE_STAGES {
            mapping.insert(stage, StageIntent::CreateQuote);
        }
        for stage in DEFAULT_ORDER_STAGES {
            mapping.insert(stage, StageIntent::CreateOrder);
        }
        mapping
    }

    /// Defaults plus the configured extra names.
    pub fn from_settings(settings: &StageSettings) -> Self {
        let mut mapping = Self::with_defaults();
        for stage in &settings.quote {
            mapping.insert(stage, StageIntent::CreateQuote);
        }
        for stage in &settings.order {
            mapping.insert(stage, StageIntent::CreateOrder);
        }
        mapping
    }

    /// Adds or replaces a stage name. Blank names are ignored.
    pub fn insert(&mut self, stage: &str, intent: StageIntent) {
        let key = normalize_stage(stage);
        if key.is_empty() {
            return;
        }
        if let Some(previous) = self.entries.insert(key.clone(), intent) {
            if previous != intent {
                warn!(stage = %key, ?previous, ?intent, "Stage mapping overridden");
            }
        }
    }

    /// Classifies a destination stage name.
    ///
    /// ## Example
    /// ```rust
    /// use quill_automation::stage::{StageIntent, StageMapping};
    ///
    /// let stages = StageMapping::with_defaults();
    /// assert_eq!(stages.classify("  PROPOSAL "), Some(StageIntent::CreateQuote));
    /// assert_eq!(stages.classify("closed_won"), Some(StageIntent::CreateOrder));
    /// assert_eq!(stages.classify("Lead"), None);
    /// ```
    pub fn classify(&self, stage: &str) -> Option<StageIntent> {
        self.entries.get(&normalize_stage(stage)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercases, treats `-` and `_` as spaces and collapses whitespace.
pub fn normalize_stage(stage: &str) -> String {
    stage
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_stage() {
        assert_eq!(normalize_stage("  Closed   Won "), "closed won");
        assert_eq!(normalize_stage("Closed-Won"), "closed won");
        assert_eq!(normalize_stage("OFFERT_SKICKAD"), "offert skickad");
        assert_eq!(normalize_stage("   "), "");
    }

    #[test]
    fn test_default_synonyms() {
        let stages = StageMapping::with_defaults();
        for name in ["Proposal", "Offert", "Tilbud", "Angebot", "Förslag"] {
            assert_eq!(stages.classify(name), Some(StageIntent::CreateQuote), "{name}");
        }
        for name in ["Won", "Vunnen", "Vunnet", "Gewonnen", "Deal won"] {
            assert_eq!(stages.classify(name), Some(StageIntent::CreateOrder), "{name}");
        }
        assert_eq!(stages.classify("Negotiation"), None);
        assert_eq!(stages.classify("Lost"), None);
    }

    #[test]
    fn test_configured_extras() {
        let settings = StageSettings {
            quote: vec!["Pitch Delivered".into()],
            order: vec!["Signed".into(), "  ".into()],
        };
        let stages = StageMapping::from_settings(&settings);
        assert_eq!(stages.classify("pitch delivered"), Some(StageIntent::CreateQuote));
        assert_eq!(stages.classify("SIGNED"), Some(StageIntent::CreateOrder));
        assert_eq!(
            stages.len(),
            DEFAULT_QUOTE_STAGES.len() + DEFAULT_ORDER_STAGES.len() + 2
        );
    }

    #[test]
    fn test_empty_mapping() {
        assert!(StageMapping::empty().classify("won").is_none());
        assert_eq!(StageIntent::CreateOrder.kind(), AutomationKind::Order);
    }
}
