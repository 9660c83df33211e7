//! Model loading for Helsinki-NLP opus-mt Marian models

use rust_bert::pipelines::common::ModelType;
use rust_bert::pipelines::translation::{Language, TranslationConfig, TranslationModel};
use rust_bert::resources::RemoteResource;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::config::{DeviceChoice, TranslatorConfig};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::LanguagePair;

/// Converted libtorch weights.
///
/// Only repos that publish this file can be loaded. A repo with PyTorch or
/// safetensors weights alone reports as unavailable.
pub const WEIGHTS_FILE: &str = "rust_model.ot";
const CONFIG_FILE: &str = "config.json";
const VOCAB_FILE: &str = "vocab.json";
const SPM_FILE: &str = "source.spm";

/// A loaded (model, tokenizer) pair able to translate one text
pub trait ModelHandle: Send {
    /// Hub identifier the handle was loaded from
    fn model_id(&self) -> &str;

    /// Tokenize, generate and decode a single input
    fn generate(&self, text: &str) -> Result<String>;
}

/// Fetches a model handle for a language pair.
///
/// Implementations block: callers run them off the async runtime.
pub trait ModelLoader: Send + Sync {
    /// Load the model for `pair`, or fail with `ModelUnavailable`
    fn load(&self, pair: &LanguagePair) -> Result<Box<dyn ModelHandle>>;
}

/// Hub URL of one file inside an opus-mt repository
pub fn resource_url(hub_base: &str, pair: &LanguagePair, file: &str) -> String {
    format!("{}/{}/resolve/main/{}", hub_base, pair.model_id(), file)
}

/// rust-bert language for an opus-mt code, when one exists
pub fn marian_language(code: &str) -> Option<Language> {
    let language = match code {
        "en" => Language::English,
        "fr" => Language::French,
        "de" => Language::German,
        "es" => Language::Spanish,
        "it" => Language::Italian,
        "nl" => Language::Dutch,
        "pt" => Language::Portuguese,
        "ru" => Language::Russian,
        "zh" => Language::ChineseMandarin,
        "ja" => Language::Japanese,
        "ar" => Language::Arabic,
        "tr" => Language::Turkish,
        "ko" => Language::Korean,
        "hi" => Language::Hindi,
        "sv" => Language::Swedish,
        "fi" => Language::Finnish,
        "da" => Language::Danish,
        "pl" => Language::Polish,
        "uk" => Language::Ukrainian,
        "cs" => Language::Czech,
        "he" => Language::Hebrew,
        "el" => Language::Greek,
        "ro" => Language::Romanian,
        "hu" => Language::Hungarian,
        "vi" => Language::Vietnamese,
        "id" => Language::Indonesian,
        _ => return None,
    };
    Some(language)
}

/// Loads Marian models from the hub through rust-bert's remote resources
#[derive(Debug, Clone)]
pub struct MarianLoader {
    hub_base: String,
    device: DeviceChoice,
    num_beams: Option<i64>,
    max_length: Option<i64>,
}

impl MarianLoader {
    pub fn new(hub_base: impl Into<String>, device: DeviceChoice) -> Self {
        Self {
            hub_base: hub_base.into(),
            device,
            num_beams: None,
            max_length: None,
        }
    }

    /// Build from translator configuration
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self {
            hub_base: config.hub_base().to_string(),
            device: config.device,
            num_beams: config.num_beams,
            max_length: config.max_length,
        }
    }

    fn remote(&self, pair: &LanguagePair, file: &str, kind: &str) -> RemoteResource {
        RemoteResource::new(
            &resource_url(&self.hub_base, pair, file),
            &format!("{}/{}", pair.repo_name(), kind),
        )
    }

    fn translation_config(&self, pair: &LanguagePair) -> TranslationConfig {
        let source_languages: Vec<Language> = marian_language(&pair.source).into_iter().collect();
        let target_languages: Vec<Language> = marian_language(&pair.target).into_iter().collect();

        let mut config = TranslationConfig::new(
            ModelType::Marian,
            self.remote(pair, WEIGHTS_FILE, "model"),
            self.remote(pair, CONFIG_FILE, "config"),
            self.remote(pair, VOCAB_FILE, "vocab"),
            Some(self.remote(pair, SPM_FILE, "spiece")),
            source_languages,
            target_languages,
            self.device.to_device(),
        );

        if let Some(num_beams) = self.num_beams {
            config.num_beams = num_beams;
        }
        if let Some(max_length) = self.max_length {
            config.max_length = Some(max_length);
        }

        config
    }
}

impl ModelLoader for MarianLoader {
    fn load(&self, pair: &LanguagePair) -> Result<Box<dyn ModelHandle>> {
        let model_id = pair.model_id();
        let start = Instant::now();
        debug!("Loading {} on {}", model_id, self.device);

        let model = TranslationModel::new(self.translation_config(pair)).map_err(|e| {
            warn!("Model {} unavailable: {}", model_id, e);
            TranslationError::ModelUnavailable {
                model_id: model_id.clone(),
                reason: e.to_string(),
            }
        })?;

        info!("Loaded {} in {:?}", model_id, start.elapsed());

        Ok(Box::new(MarianHandle { model_id, model }))
    }
}

/// Marian model plus its SentencePiece tokenizer
struct MarianHandle {
    model_id: String,
    model: TranslationModel,
}

impl ModelHandle for MarianHandle {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn generate(&self, text: &str) -> Result<String> {
        let outputs = self
            .model
            .translate(&[text], None, None)
            .map_err(|e| TranslationError::Generation {
                model_id: self.model_id.clone(),
                message: e.to_string(),
            })?;

        outputs
            .into_iter()
            .next()
            .ok_or_else(|| TranslationError::Generation {
                model_id: self.model_id.clone(),
                message: "model returned no sequence".to_string(),
            })
    }
}
