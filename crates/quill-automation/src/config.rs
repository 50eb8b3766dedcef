//! # Automation Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     QUILL_IDEMPOTENCY_WINDOW_MS=30000                                  │
//! │     QUILL_AUTOMATION_ENABLED=false                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/quill-crm/automation.toml (Linux)                        │
//! │     ~/Library/Application Support/com.quill.crm/automation.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # automation.toml
//! [automation]
//! enabled = true
//! idempotency_window_ms = 30000
//! debounce_ms = 1000
//!
//! [documents]
//! default_tax_pct = 25.0
//! payment_terms_days = 30
//!
//! [stages]
//! quote = ["Pitch delivered"]
//! order = ["Signed"]
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{AutomationError, AutomationResult};
use crate::stage::normalize_stage;

// =============================================================================
// Automation Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationSettings {
    /// Master switch. When off, stage changes never fire.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// How long a fired automation suppresses the same key (milliseconds).
    #[serde(default = "default_idempotency_window")]
    pub idempotency_window_ms: u64,

    /// Minimum gap between two automations for the same subject (milliseconds).
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_idempotency_window() -> u64 {
    30_000
}

fn default_debounce() -> u64 {
    1_000
}

impl Default for AutomationSettings {
    fn default() -> Self {
        AutomationSettings {
            enabled: true,
            idempotency_window_ms: default_idempotency_window(),
            debounce_ms: default_debounce(),
        }
    }
}

impl AutomationSettings {
    pub fn idempotency_window(&self) -> Duration {
        millis(self.idempotency_window_ms)
    }

    pub fn debounce(&self) -> Duration {
        millis(self.debounce_ms)
    }
}

fn millis(ms: u64) -> Duration {
    i64::try_from(ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .unwrap_or(Duration::MAX)
}

// =============================================================================
// Document Defaults
// =============================================================================

/// Defaults applied to documents created by automation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSettings {
    /// Tax rate pre-filled on quotes/orders created from a deal.
    #[serde(default = "default_tax_pct")]
    pub default_tax_pct: f64,

    /// Days between invoice issue date and due date.
    #[serde(default = "default_payment_terms")]
    pub payment_terms_days: u32,
}

fn default_tax_pct() -> f64 {
    25.0
}

fn default_payment_terms() -> u32 {
    30
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            default_tax_pct: default_tax_pct(),
            payment_terms_days: default_payment_terms(),
        }
    }
}

// =============================================================================
// Stage Names
// =============================================================================

/// Extra stage names on top of the built-in synonyms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSettings {
    #[serde(default)]
    pub quote: Vec<String>,

    #[serde(default)]
    pub order: Vec<String>,
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default)]
    pub automation: AutomationSettings,

    #[serde(default)]
    pub documents: DocumentSettings,

    #[serde(default)]
    pub stages: StageSettings,
}

impl AutomationConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (automation.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AutomationResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading automation config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load automation config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> AutomationResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AutomationError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Automation config saved");
        Ok(())
    }

    pub fn validate(&self) -> AutomationResult<()> {
        if self.automation.idempotency_window_ms == 0 {
            return Err(AutomationError::InvalidConfig(
                "idempotency_window_ms must be greater than 0".into(),
            ));
        }

        let tax = self.documents.default_tax_pct;
        if !tax.is_finite() || !(0.0..=100.0).contains(&tax) {
            return Err(AutomationError::InvalidConfig(format!(
                "default_tax_pct must be within 0..=100, got: {}",
                tax
            )));
        }

        let quote: HashSet<String> = self.stages.quote.iter().map(|s| normalize_stage(s)).collect();
        if let Some(clash) = self
            .stages
            .order
            .iter()
            .map(|s| normalize_stage(s))
            .find(|s| !s.is_empty() && quote.contains(s))
        {
            return Err(AutomationError::InvalidConfig(format!(
                "stage '{}' is listed as both a quote and an order stage",
                clash
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `QUILL_*` overrides from `lookup`. Unparseable values are
    /// logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(enabled) = lookup("QUILL_AUTOMATION_ENABLED") {
            match enabled.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.automation.enabled = true,
                "0" | "false" | "no" | "off" => self.automation.enabled = false,
                _ => warn!(value = %enabled, "Unknown QUILL_AUTOMATION_ENABLED value"),
            }
        }

        if let Some(window) = lookup("QUILL_IDEMPOTENCY_WINDOW_MS") {
            match window.trim().parse::<u64>() {
                Ok(ms) => {
                    debug!(ms, "Overriding idempotency window from environment");
                    self.automation.idempotency_window_ms = ms;
                }
                Err(_) => warn!(value = %window, "Invalid QUILL_IDEMPOTENCY_WINDOW_MS"),
            }
        }

        if let Some(debounce) = lookup("QUILL_DEBOUNCE_MS") {
            match debounce.trim().parse::<u64>() {
                Ok(ms) => self.automation.debounce_ms = ms,
                Err(_) => warn!(value = %debounce, "Invalid QUILL_DEBOUNCE_MS"),
            }
        }

        if let Some(tax) = lookup("QUILL_DEFAULT_TAX_PCT") {
            match tax.trim().parse::<f64>() {
                Ok(pct) => self.documents.default_tax_pct = pct,
                Err(_) => warn!(value = %tax, "Invalid QUILL_DEFAULT_TAX_PCT"),
            }
        }

        if let Some(days) = lookup("QUILL_PAYMENT_TERMS_DAYS") {
            match days.trim().parse::<u32>() {
                Ok(d) => self.documents.payment_terms_days = d,
                Err(_) => warn!(value = %days, "Invalid QUILL_PAYMENT_TERMS_DAYS"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "quill", "crm")
            .map(|dirs| dirs.config_dir().join("automation.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AutomationConfig::default();
        assert!(config.automation.enabled);
        assert_eq!(config.automation.idempotency_window(), Duration::seconds(30));
        assert_eq!(config.automation.debounce(), Duration::seconds(1));
        assert_eq!(config.documents.payment_terms_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AutomationConfig = toml::from_str(
            r#"
            [automation]
            debounce_ms = 250

            [stages]
            order = ["Signed"]
            "#,
        )
        .unwrap();
        assert_eq!(config.automation.debounce_ms, 250);
        assert_eq!(config.automation.idempotency_window_ms, 30_000);
        assert_eq!(config.documents.default_tax_pct, 25.0);
        assert_eq!(config.stages.order, vec!["Signed".to_string()]);
        assert!(config.stages.quote.is_empty());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AutomationConfig::default();

        config.automation.idempotency_window_ms = 0;
        assert!(config.validate().is_err());
        config.automation.idempotency_window_ms = 1;

        config.documents.default_tax_pct = 120.0;
        assert!(config.validate().is_err());
        config.documents.default_tax_pct = 12.0;

        config.stages.quote = vec!["Signed".into()];
        config.stages.order = vec!["signed ".into()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("signed"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("QUILL_AUTOMATION_ENABLED", "off"),
            ("QUILL_IDEMPOTENCY_WINDOW_MS", "5000"),
            ("QUILL_DEBOUNCE_MS", "not-a-number"),
            ("QUILL_PAYMENT_TERMS_DAYS", "14"),
        ]
        .into_iter()
        .collect();

        let mut config = AutomationConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert!(!config.automation.enabled);
        assert_eq!(config.automation.idempotency_window_ms, 5000);
        assert_eq!(config.automation.debounce_ms, 1000);
        assert_eq!(config.documents.payment_terms_days, 14);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "quill-automation-{}.toml",
            std::process::id()
        ));

        let mut config = AutomationConfig::default();
        config.documents.default_tax_pct = 12.0;
        config.stages.quote = vec!["Pitch".into()];
        config.save(Some(path.clone())).unwrap();

        let loaded: AutomationConfig =
            toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_file(&path).unwrap();
    }
}
