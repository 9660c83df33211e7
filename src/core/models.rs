//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hub organisation and model family every identifier is built from
pub const MODEL_FAMILY: &str = "Helsinki-NLP/opus-mt";

/// Ordered (source, target) pair of language codes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Same language on both sides
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }

    /// Hub identifier, e.g. `Helsinki-NLP/opus-mt-en-fr`
    pub fn model_id(&self) -> String {
        format!("{}-{}-{}", MODEL_FAMILY, self.source, self.target)
    }

    /// Bare repository name, e.g. `opus-mt-en-fr`
    pub fn repo_name(&self) -> String {
        format!("opus-mt-{}-{}", self.source, self.target)
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.source, self.target)
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub pair: LanguagePair,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            pair: LanguagePair::new(source_lang, target_lang),
        }
    }
}

/// Translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translation: String,
    pub pair: LanguagePair,
    /// Model that produced the text; `None` when no model was involved
    pub model_used: Option<String>,
    pub elapsed_ms: u64,
}

impl TranslationResult {
    /// Result that bypassed the model (identity pair or blank input)
    pub fn passthrough(text: impl Into<String>, pair: LanguagePair) -> Self {
        Self {
            translation: text.into(),
            pair,
            model_used: None,
            elapsed_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_id_interpolation() {
        let pair = LanguagePair::new("en", "fr");
        assert_eq!(pair.model_id(), "Helsinki-NLP/opus-mt-en-fr");
        assert_eq!(pair.repo_name(), "opus-mt-en-fr");
        assert_eq!(pair.to_string(), "en->fr");
    }

    #[test]
    fn test_model_id_does_not_validate_codes() {
        let pair = LanguagePair::new("not a code", "??");
        assert_eq!(pair.model_id(), "Helsinki-NLP/opus-mt-not a code-??");
    }

    #[test]
    fn test_identity() {
        assert!(LanguagePair::new("de", "de").is_identity());
        assert!(!LanguagePair::new("de", "en").is_identity());
    }
}
