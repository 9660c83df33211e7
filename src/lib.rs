//! opus-mt translator - Helsinki-NLP MarianMT translation as a library, CLI and web form
//!
//! This library maps language pairs to pretrained opus-mt models, runs them through
//! rust-bert, and serves the result over a small HTTP UI.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    client::AsyncTranslator,
    config::{DeviceChoice, TranslatorConfig},
    errors::{TranslationError, MODEL_UNAVAILABLE_MESSAGE},
    languages::{LanguageEntry, LanguageTable},
    loader::{MarianLoader, ModelHandle, ModelLoader},
    models::{LanguagePair, TranslationRequest, TranslationResult},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
