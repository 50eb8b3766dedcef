//! Collaborator traits for the outside world, with in-memory implementations
//! for testing and local tooling.
//!
//! The engine never persists documents itself: it hands a
//! [`CreationRequest`] to a [`DocumentCreator`] and records the outcome
//! through an [`ActivityLogger`].

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::CollaboratorError;
use crate::trigger::{ActivityEntry, CreatedDocument, CreationRequest};

/// Creates quotes, orders and invoices.
#[async_trait]
pub trait DocumentCreator: Send + Sync {
    async fn create(&self, request: &CreationRequest) -> Result<CreatedDocument, CollaboratorError>;
}

/// Appends entries to a deal's activity timeline.
#[async_trait]
pub trait ActivityLogger: Send + Sync {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), CollaboratorError>;
}

// =============================================================================
// In-Memory Document Creator
// =============================================================================

#[derive(Debug, Default)]
struct InMemoryDocumentState {
    created: Vec<(CreationRequest, CreatedDocument)>,
    next_id: u32,
    fail_on_create: bool,
}

/// In-memory document creator. Ids are `<kind>-<n>`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentCreator {
    state: Arc<RwLock<InMemoryDocumentState>>,
}

impl InMemoryDocumentCreator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `create` call fail until reset.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_create = fail;
    }

    pub fn created_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .created
            .len()
    }

    /// Requests that were accepted, oldest first.
    pub fn requests(&self) -> Vec<CreationRequest> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .created
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }
}

#[async_trait]
impl DocumentCreator for InMemoryDocumentCreator {
    async fn create(&self, request: &CreationRequest) -> Result<CreatedDocument, CollaboratorError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_create {
            return Err(CollaboratorError::new("document store unavailable"));
        }

        state.next_id += 1;
        let kind = request.kind();
        let document = CreatedDocument {
            kind,
            id: format!("{}-{}", kind, state.next_id),
            number: Some(format!(
                "{}-{:04}",
                kind.as_str().chars().next().unwrap_or('D').to_ascii_uppercase(),
                state.next_id
            )),
        };
        state.created.push((request.clone(), document.clone()));

        Ok(document)
    }
}

// =============================================================================
// In-Memory Activity Log
// =============================================================================

#[derive(Debug, Default)]
struct InMemoryActivityState {
    entries: Vec<ActivityEntry>,
    fail_on_record: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    state: Arc<RwLock<InMemoryActivityState>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_on_record(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_record = fail;
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clone()
    }
}

#[async_trait]
impl ActivityLogger for InMemoryActivityLog {
    async fn record(&self, entry: &ActivityEntry) -> Result<(), CollaboratorError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.fail_on_record {
            return Err(CollaboratorError::new("activity log unavailable"));
        }

        state.entries.push(entry.clone());
        Ok(())
    }
}
