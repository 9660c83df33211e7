//! Async translation client running blocking model work off the runtime

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::languages::LanguageTable;
use crate::core::loader::{MarianLoader, ModelHandle, ModelLoader};
use crate::core::models::{LanguagePair, TranslationRequest, TranslationResult};

type SharedHandle = Arc<Mutex<Box<dyn ModelHandle>>>;
type HandleCache = Arc<Mutex<HashMap<LanguagePair, SharedHandle>>>;

/// Async translation client.
///
/// Every call loads the pair's model afresh unless `cache_models` is set.
#[derive(Clone)]
pub struct AsyncTranslator {
    loader: Arc<dyn ModelLoader>,
    config: Arc<TranslatorConfig>,
    cache: Option<HandleCache>,
}

impl fmt::Debug for AsyncTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTranslator")
            .field("config", &self.config)
            .field("cache_models", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl AsyncTranslator {
    /// Create a translator backed by Marian models from the hub
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        let loader = Arc::new(MarianLoader::from_config(&config));
        Self::with_loader(config, loader)
    }

    /// Create a translator with a custom model loader
    pub fn with_loader(config: TranslatorConfig, loader: Arc<dyn ModelLoader>) -> Result<Self> {
        config.validate()?;

        let cache = if config.cache_models {
            warn!("Model caching enabled: loaded models stay in memory");
            Some(Arc::new(Mutex::new(HashMap::new())))
        } else {
            None
        };

        Ok(Self {
            loader,
            config: Arc::new(config),
            cache,
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        Self::new(TranslatorConfig::from_env()?)
    }

    /// Active configuration
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Language table used to resolve names
    pub fn languages(&self) -> &LanguageTable {
        &self.config.languages
    }

    /// Translate text between two language names, as picked in the form.
    ///
    /// Identical selections return the text untouched without loading a model.
    pub async fn translate_selection(
        &self,
        text: &str,
        source_name: &str,
        target_name: &str,
    ) -> Result<TranslationResult> {
        let languages = self.languages();

        if source_name == target_name {
            let code = languages.lookup(source_name).unwrap_or(source_name);
            debug!("Identity selection {}, skipping model", source_name);
            return Ok(TranslationResult::passthrough(
                text,
                LanguagePair::new(code, code),
            ));
        }

        let source = languages.code_for(source_name)?;
        let target = languages.code_for(target_name)?;

        self.translate(&TranslationRequest::new(text, source, target))
            .await
    }

    /// Translate a single request between language codes
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        if request.text.trim().is_empty() {
            debug!("Blank input for {}, skipping model", request.pair);
            return Ok(TranslationResult::passthrough("", request.pair.clone()));
        }

        let start = Instant::now();
        let loader = Arc::clone(&self.loader);
        let cache = self.cache.clone();
        let pair = request.pair.clone();
        let text = request.text.clone();

        let (model_id, translation) = tokio::task::spawn_blocking(move || {
            let handle = acquire_handle(loader.as_ref(), cache.as_ref(), &pair)?;
            let handle = handle.lock().map_err(|_| TranslationError::Generation {
                model_id: pair.model_id(),
                message: "model lock poisoned".to_string(),
            })?;
            let translation = handle.generate(&text)?;
            Ok::<_, TranslationError>((handle.model_id().to_string(), translation))
        })
        .await??;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(
            "Translated {} chars {} with {} in {}ms",
            request.text.chars().count(),
            request.pair,
            model_id,
            elapsed_ms
        );

        Ok(TranslationResult {
            translation,
            pair: request.pair.clone(),
            model_used: Some(model_id),
            elapsed_ms,
        })
    }

    /// Pairs whose models are currently held in memory
    pub fn cached_pairs(&self) -> Result<Vec<LanguagePair>> {
        match &self.cache {
            Some(cache) => Ok(lock_cache(cache)?.keys().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }
}

/// Fetch a handle from the cache or load a fresh one
fn acquire_handle(
    loader: &dyn ModelLoader,
    cache: Option<&HandleCache>,
    pair: &LanguagePair,
) -> Result<SharedHandle> {
    let Some(cache) = cache else {
        return Ok(Arc::new(Mutex::new(loader.load(pair)?)));
    };

    if let Some(handle) = lock_cache(cache)?.get(pair) {
        debug!("Reusing cached model for {}", pair);
        return Ok(Arc::clone(handle));
    }

    // Load outside the lock; a racing load of the same pair keeps the first insert.
    let fresh = Arc::new(Mutex::new(loader.load(pair)?));
    let mut cache = lock_cache(cache)?;
    Ok(Arc::clone(cache.entry(pair.clone()).or_insert(fresh)))
}

fn lock_cache(
    cache: &HandleCache,
) -> Result<std::sync::MutexGuard<'_, HashMap<LanguagePair, SharedHandle>>> {
    cache
        .lock()
        .map_err(|_| TranslationError::InternalError("model cache lock poisoned".to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Loader that reverses text and counts loads
    #[derive(Default)]
    pub(crate) struct FakeLoader {
        pub loads: AtomicUsize,
        pub generations: Arc<AtomicUsize>,
    }

    struct FakeHandle {
        model_id: String,
        instance: usize,
        generations: Arc<AtomicUsize>,
    }

    impl ModelHandle for FakeHandle {
        fn model_id(&self) -> &str {
            &self.model_id
        }

        fn generate(&self, text: &str) -> Result<String> {
            self.generations.fetch_add(1, Ordering::SeqCst);
            let reversed: String = text.chars().rev().collect();
            Ok(format!("{}#{}", reversed, self.instance))
        }
    }

    impl ModelLoader for FakeLoader {
        fn load(&self, pair: &LanguagePair) -> Result<Box<dyn ModelHandle>> {
            if pair.source == "ko" && pair.target == "hi" {
                return Err(TranslationError::ModelUnavailable {
                    model_id: pair.model_id(),
                    reason: "404 Not Found".to_string(),
                });
            }
            let instance = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(Box::new(FakeHandle {
                model_id: pair.model_id(),
                instance,
                generations: Arc::clone(&self.generations),
            }))
        }
    }

    fn translator(cache_models: bool) -> (AsyncTranslator, Arc<FakeLoader>) {
        let loader = Arc::new(FakeLoader::default());
        let config = TranslatorConfig {
            cache_models,
            ..Default::default()
        };
        let translator = AsyncTranslator::with_loader(config, loader.clone()).unwrap();
        (translator, loader)
    }

    #[tokio::test]
    async fn test_identity_selection_skips_model() {
        let (translator, loader) = translator(false);

        for name in translator.languages().names() {
            let result = translator
                .translate_selection("Hello, world!", name, name)
                .await
                .unwrap();
            assert_eq!(result.translation, "Hello, world!");
            assert!(result.model_used.is_none());
        }

        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_identity_selection_skips_name_validation() {
        let (translator, _) = translator(false);
        let result = translator
            .translate_selection("same", "Elvish", "Elvish")
            .await
            .unwrap();
        assert_eq!(result.translation, "same");
    }

    #[tokio::test]
    async fn test_translate_selection_resolves_codes() {
        let (translator, loader) = translator(false);
        let result = translator
            .translate_selection("Hello", "English", "French")
            .await
            .unwrap();

        assert_eq!(result.translation, "olleH#1");
        assert_eq!(result.pair, LanguagePair::new("en", "fr"));
        assert_eq!(result.model_used.as_deref(), Some("Helsinki-NLP/opus-mt-en-fr"));
        assert_eq!(loader.generations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_language_name() {
        let (translator, loader) = translator(false);
        let err = translator
            .translate_selection("Hello", "English", "Klingon")
            .await
            .unwrap_err();

        assert!(matches!(err, TranslationError::UnknownLanguage { name } if name == "Klingon"));
        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unavailable_pair() {
        let (translator, _) = translator(false);
        let err = translator
            .translate_selection("Hello", "Korean", "Hindi")
            .await
            .unwrap_err();

        assert!(err.is_unavailable());
        assert_eq!(err.to_string(), "Model not available for this language pair.");
    }

    #[tokio::test]
    async fn test_every_call_loads_a_new_model() {
        let (translator, loader) = translator(false);
        let request = TranslationRequest::new("abc", "en", "de");

        let first = translator.translate(&request).await.unwrap();
        let second = translator.translate(&request).await.unwrap();

        assert_eq!(first.translation, "cba#1");
        assert_eq!(second.translation, "cba#2");
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert!(translator.cached_pairs().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cache_reuses_models_per_pair() {
        let (translator, loader) = translator(true);

        let en_de = TranslationRequest::new("abc", "en", "de");
        let de_en = TranslationRequest::new("abc", "de", "en");

        translator.translate(&en_de).await.unwrap();
        let again = translator.translate(&en_de).await.unwrap();
        translator.translate(&de_en).await.unwrap();

        assert_eq!(again.translation, "cba#1");
        assert_eq!(loader.loads.load(Ordering::SeqCst), 2);
        assert_eq!(translator.cached_pairs().unwrap().len(), 2);
    }

    #[test]
    fn test_cache_created_only_when_enabled() {
        let (cached, _) = translator(true);
        assert!(cached.cache.is_some());

        let (uncached, _) = translator(false);
        assert!(uncached.cache.is_none());
    }

    #[test]
    fn test_poisoned_cache_is_reported() {
        let (translator, _) = translator(true);
        let cache = Arc::clone(translator.cache.as_ref().unwrap());

        let _ = std::thread::spawn(move || {
            let _guard = cache.lock().unwrap();
            panic!("poison the cache lock");
        })
        .join();

        let err = translator.cached_pairs().unwrap_err();
        assert!(matches!(err, TranslationError::InternalError(_)));
    }

    #[tokio::test]
    async fn test_blank_input_does_not_load() {
        let (translator, loader) = translator(false);

        for text in ["", "   ", "\n"] {
            let result = translator
                .translate(&TranslationRequest::new(text, "en", "fr"))
                .await
                .unwrap();
            assert_eq!(result.translation, "");
        }

        assert_eq!(loader.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TranslatorConfig {
            hub_url: String::new(),
            ..Default::default()
        };
        let result = AsyncTranslator::with_loader(config, Arc::new(FakeLoader::default()));
        assert!(result.is_err());
    }
}
