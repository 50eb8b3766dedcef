//! # Automation Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Automation Error Categories                          │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │  Collaborators  │  │     Domain              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  CreationFailed │  │  Core (quill-core)      │ │
//! │  │  ConfigLoad/Save│  │                 │  │                         │ │
//! │  │  Io / Toml      │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Suppressed automations (debounce, duplicate key, missing company) are
//! NOT errors: they are ordinary outcomes, see
//! [`crate::engine::AutomationOutcome`].

use quill_core::CoreError;
use thiserror::Error;

use crate::trigger::AutomationKind;

/// Result type alias for automation operations.
pub type AutomationResult<T> = Result<T, AutomationError>;

/// Failure reported by a collaborator (document store, activity log).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CollaboratorError {
    pub message: String,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        CollaboratorError {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AutomationError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid automation configuration.
    #[error("Invalid automation configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    /// The document creator rejected a request. The idempotency key stays
    /// set until its window lapses or the caller clears it.
    #[error("Failed to create {kind} for key {key}: {source}")]
    CreationFailed {
        kind: AutomationKind,
        key: String,
        #[source]
        source: CollaboratorError,
    },

    // =========================================================================
    // Domain Errors
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // IO
    // =========================================================================
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for AutomationError {
    fn from(err: std::io::Error) -> Self {
        AutomationError::Io(err.to_string())
    }
}

impl From<toml::de::Error> for AutomationError {
    fn from(err: toml::de::Error) -> Self {
        AutomationError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for AutomationError {
    fn from(err: toml::ser::Error) -> Self {
        AutomationError::ConfigSaveFailed(err.to_string())
    }
}

impl AutomationError {
    /// Returns true for configuration problems.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AutomationError::InvalidConfig(_)
                | AutomationError::ConfigLoadFailed(_)
                | AutomationError::ConfigSaveFailed(_)
        )
    }

    /// Returns the idempotency key left set by a failed creation, if any.
    pub fn pending_key(&self) -> Option<&str> {
        match self {
            AutomationError::CreationFailed { key, .. } => Some(key),
            _ => None,
        }
    }
}
