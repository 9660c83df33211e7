//! Language table mapping display names to opus-mt language codes

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::core::errors::{Result, TranslationError};

static CODE_PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

/// Compiled once per process
fn code_pattern() -> Result<&'static Regex> {
    CODE_PATTERN
        .get_or_init(|| Regex::new(r"^[a-z]{2,3}$"))
        .as_ref()
        .map_err(|e| TranslationError::ConfigError {
            message: e.to_string(),
        })
}

/// Built-in table: display name, opus-mt code
const DEFAULT_LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("French", "fr"),
    ("German", "de"),
    ("Spanish", "es"),
    ("Italian", "it"),
    ("Dutch", "nl"),
    ("Portuguese", "pt"),
    ("Russian", "ru"),
    ("Chinese", "zh"),
    ("Japanese", "ja"),
    ("Arabic", "ar"),
    ("Turkish", "tr"),
    ("Korean", "ko"),
    ("Hindi", "hi"),
];

const DEFAULT_SOURCE: &str = "English";
const DEFAULT_TARGET: &str = "French";

/// A single selectable language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LanguageEntry {
    /// Human-readable name shown in the dropdowns
    pub name: String,
    /// Code interpolated into the model identifier
    pub code: String,
}

/// Ordered, immutable name-to-code table.
///
/// The first entry named "English" (or the first entry) is the default source
/// and "French" (or the second entry) the default target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageTable {
    entries: Vec<LanguageEntry>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_LANGUAGES
                .iter()
                .map(|(name, code)| LanguageEntry {
                    name: name.to_string(),
                    code: code.to_string(),
                })
                .collect(),
        }
    }
}

impl LanguageTable {
    /// Build a table from explicit entries, validating them
    pub fn from_entries(entries: Vec<LanguageEntry>) -> Result<Self> {
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Resolve a display name to its code
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.code.as_str())
    }

    /// Resolve a display name, failing with `UnknownLanguage`
    pub fn code_for(&self, name: &str) -> Result<&str> {
        self.lookup(name)
            .ok_or_else(|| TranslationError::UnknownLanguage {
                name: name.to_string(),
            })
    }

    /// Reverse lookup: display name for a code
    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.name.as_str())
    }

    /// Display names in table order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// All entries in table order
    pub fn entries(&self) -> &[LanguageEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Default source selection for the form
    pub fn default_source(&self) -> &str {
        self.preferred(DEFAULT_SOURCE, 0)
    }

    /// Default target selection for the form
    pub fn default_target(&self) -> &str {
        self.preferred(DEFAULT_TARGET, 1)
    }

    fn preferred(&self, name: &str, fallback: usize) -> &str {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .or_else(|| self.entries.get(fallback))
            .or_else(|| self.entries.first())
            .map(|e| e.name.as_str())
            .unwrap_or_default()
    }

    /// Every ordered pair of distinct codes
    pub fn ordered_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs = Vec::with_capacity(self.len() * self.len().saturating_sub(1));
        for source in &self.entries {
            for target in &self.entries {
                if source.code != target.code {
                    pairs.push((source.code.as_str(), target.code.as_str()));
                }
            }
        }
        pairs
    }

    /// Check names are unique and codes look like ISO-639 codes
    pub fn validate(&self) -> Result<()> {
        if self.entries.len() < 2 {
            return Err(TranslationError::ConfigError {
                message: "language table needs at least two languages".to_string(),
            });
        }

        let code_pattern = code_pattern()?;

        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.name.trim().is_empty() {
                return Err(TranslationError::ConfigError {
                    message: format!("empty language name for code '{}'", entry.code),
                });
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(TranslationError::ConfigError {
                    message: format!("duplicate language name '{}'", entry.name),
                });
            }
            if !code_pattern.is_match(&entry.code) {
                return Err(TranslationError::ConfigError {
                    message: format!("invalid language code '{}' for {}", entry.code, entry.name),
                });
            }
        }

        Ok(())
    }
}
