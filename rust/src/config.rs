//! Configuration types for the scheduling engine.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Wait-like label terms that make a `cook` step passive.
pub const DEFAULT_PASSIVE_KEYWORDS: [&str; 10] = [
    "rest",
    "chill",
    "marinate",
    "simmer",
    "bake",
    "roast",
    "proof",
    "soak",
    "refrigerate",
    "freeze",
];

/// Configuration for ingestion, scheduling and batch execution.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Case-insensitive label substrings marking a `cook` step as hands-off.
    pub passive_keywords: Vec<String>,
    /// Maximum characters kept when a missing label is derived from `raw_text`.
    pub label_max_chars: usize,
    /// When true, an overlap relaxation never pulls a step before its own
    /// dependencies finish (dependencies the step mutually overlaps with excepted).
    pub strict_overlap: bool,
    /// Schedule the recipes of a batch on the rayon thread pool.
    pub parallel_batch: bool,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            passive_keywords: DEFAULT_PASSIVE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            label_max_chars: 60,
            strict_overlap: true,
            parallel_batch: true,
            verbosity: 0,
        }
    }
}

impl ScheduleConfig {
    /// Parse a JSON config document; missing keys take their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(text)?;
        config.normalize();
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Whether a label names a wait-like activity.
    pub fn is_passive_label(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.passive_keywords
            .iter()
            .any(|keyword| label.contains(keyword.as_str()))
    }

    fn normalize(&mut self) {
        self.passive_keywords = self
            .passive_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self.label_max_chars = self.label_max_chars.max(1);
    }
}
