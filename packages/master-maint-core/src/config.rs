//! Editor configuration.
//!
//! Supports TOML config files and defaults.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::record::{RecordId, Tab, TabId};

/// Prompt shown when leaving a tab with unsaved edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Dialog title
    pub title: String,
    /// Dialog body
    pub message: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            title: "未保存の変更".to_string(),
            message: "変更内容が保存されていません。保存せずに移動しますか？".to_string(),
        }
    }
}

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tabs in display order (default: tabA..tabD)
    pub tabs: Vec<Tab>,
    /// Tab active at startup (default: first tab)
    pub initial_tab: Option<TabId>,
    /// Lowest id handed out to new records (default: 1)
    pub min_bootstrap_id: RecordId,
    /// Unsaved-changes prompt
    pub unsaved_prompt: PromptConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tabs: vec![
                Tab::new("tabA", "A"),
                Tab::new("tabB", "B"),
                Tab::new("tabC", "C"),
                Tab::new("tabD", "D"),
            ],
            initial_tab: None,
            min_bootstrap_id: 1,
            unsaved_prompt: PromptConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| EditorError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| EditorError::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the tab set is non-empty and unique and that the initial
    /// tab, if set, is one of them.
    pub fn validate(&self) -> Result<()> {
        if self.tabs.is_empty() {
            return Err(EditorError::Config("at least one tab is required".to_string()));
        }

        let mut seen = HashSet::new();
        for tab in &self.tabs {
            if !seen.insert(tab.id.as_str()) {
                return Err(EditorError::Config(format!("duplicate tab id '{}'", tab.id)));
            }
        }

        if let Some(initial) = &self.initial_tab {
            if !seen.contains(initial.as_str()) {
                return Err(EditorError::Config(format!(
                    "initial tab '{}' is not a configured tab",
                    initial
                )));
            }
        }

        Ok(())
    }

    /// Returns the tab active at startup.
    pub fn initial_tab(&self) -> Result<&Tab> {
        match &self.initial_tab {
            Some(id) => self.tab(id),
            None => self
                .tabs
                .first()
                .ok_or_else(|| EditorError::Config("at least one tab is required".to_string())),
        }
    }

    /// Looks up a configured tab by id.
    pub fn tab(&self, id: &TabId) -> Result<&Tab> {
        self.tabs
            .iter()
            .find(|tab| &tab.id == id)
            .ok_or_else(|| EditorError::UnknownTab { tab: id.clone() })
    }
}
