//! Configuration management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::core::errors::{Result, TranslationError};
use crate::core::languages::LanguageTable;

/// Prefix for environment overrides, e.g. `OPUS_TRANSLATOR__DEVICE=cpu`
const ENV_PREFIX: &str = "OPUS_TRANSLATOR";

const DEFAULT_HUB_URL: &str = "https://huggingface.co";

/// Where to place model weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceChoice {
    /// CUDA when available, CPU otherwise
    Auto,
    Cpu,
    Cuda,
}

impl fmt::Display for DeviceChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceChoice::Auto => write!(f, "auto"),
            DeviceChoice::Cpu => write!(f, "cpu"),
            DeviceChoice::Cuda => write!(f, "cuda"),
        }
    }
}

impl DeviceChoice {
    /// Resolve to a libtorch device
    pub fn to_device(self) -> tch::Device {
        match self {
            DeviceChoice::Auto => tch::Device::cuda_if_available(),
            DeviceChoice::Cpu => tch::Device::Cpu,
            DeviceChoice::Cuda => tch::Device::Cuda(0),
        }
    }
}

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Base URL of the model hub
    pub hub_url: String,
    pub device: DeviceChoice,
    /// Keep loaded models between calls instead of reloading every time
    pub cache_models: bool,
    /// Beam size override; library default when unset
    pub num_beams: Option<i64>,
    /// Maximum generated length override; library default when unset
    pub max_length: Option<i64>,
    /// Timeout for hub probe requests
    pub probe_timeout_ms: u64,
    pub languages: LanguageTable,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            hub_url: DEFAULT_HUB_URL.to_string(),
            device: DeviceChoice::Auto,
            cache_models: false,
            num_beams: None,
            max_length: None,
            probe_timeout_ms: 10000,
            languages: LanguageTable::default(),
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from defaults and environment variables
    pub fn from_env() -> Result<Self> {
        Self::load(None::<&Path>)
    }

    /// Load configuration: defaults, then an optional file, then environment.
    ///
    /// The file format follows its extension (toml, json, yaml).
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default())?;
        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            let path = path.as_ref();
            if !path.exists() {
                return Err(TranslationError::ConfigError {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.hub_url.trim().is_empty() {
            return Err(TranslationError::ConfigError {
                message: "hub_url is required".to_string(),
            });
        }

        if let Some(beams) = self.num_beams {
            if beams < 1 {
                return Err(TranslationError::ConfigError {
                    message: "num_beams must be at least 1".to_string(),
                });
            }
        }

        if let Some(max_length) = self.max_length {
            if max_length < 1 {
                return Err(TranslationError::ConfigError {
                    message: "max_length must be greater than 0".to_string(),
                });
            }
        }

        // tch builds Marian weights on Cuda(0) with panicking constructors
        if self.device == DeviceChoice::Cuda && !tch::Cuda::is_available() {
            return Err(TranslationError::ConfigError {
                message: "device is cuda but no CUDA device is available".to_string(),
            });
        }

        self.languages.validate()
    }

    /// Hub URL without a trailing slash
    pub fn hub_base(&self) -> &str {
        self.hub_url.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    /// Tests that read the process environment while loading
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    const ENV_OVERRIDES: [(&str, &str); 4] = [
        ("OPUS_TRANSLATOR__CACHE_MODELS", "true"),
        ("OPUS_TRANSLATOR__NUM_BEAMS", "5"),
        ("OPUS_TRANSLATOR__HUB_URL", "http://mirror.local"),
        ("OPUS_TRANSLATOR__DEVICE", "cpu"),
    ];

    fn set_overrides() {
        for (key, value) in ENV_OVERRIDES {
            std::env::set_var(key, value);
        }
    }

    fn clear_overrides() {
        for (key, _) in ENV_OVERRIDES {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = TranslatorConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.cache_models);
        assert_eq!(config.device, DeviceChoice::Auto);
        assert_eq!(config.languages.len(), 14);
    }

    #[test]
    fn test_config_validation_rejects_bad_values() {
        let config = TranslatorConfig {
            hub_url: "".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TranslatorConfig {
            num_beams: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = TranslatorConfig {
            max_length: Some(-4),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cuda_requires_a_device() {
        let config = TranslatorConfig {
            device: DeviceChoice::Cuda,
            ..Default::default()
        };
        assert_eq!(config.validate().is_ok(), tch::Cuda::is_available());

        let config = TranslatorConfig {
            device: DeviceChoice::Cpu,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cache_models_is_valid() {
        let config = TranslatorConfig {
            cache_models: true,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_hub_base_trims_slash() {
        let config = TranslatorConfig {
            hub_url: "https://mirror.example.com/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.hub_base(), "https://mirror.example.com");
    }

    #[test]
    fn test_load_from_toml_file() {
        let _guard = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
device = "cpu"
cache_models = true
num_beams = 4

[[languages]]
name = "English"
code = "en"

[[languages]]
name = "Swedish"
code = "sv"
"#
        )
        .unwrap();

        let config = TranslatorConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.device, DeviceChoice::Cpu);
        assert!(config.cache_models);
        assert_eq!(config.num_beams, Some(4));
        assert_eq!(config.max_length, None);
        assert_eq!(config.languages.len(), 2);
        assert_eq!(config.languages.lookup("Swedish"), Some("sv"));
        assert_eq!(config.hub_url, "https://huggingface.co");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let _guard = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let result = TranslatorConfig::load(Some(dir.path().join("nope.toml")));
        assert!(matches!(result, Err(TranslationError::ConfigError { .. })));
    }

    #[test]
    fn test_save_and_reload_json() {
        let _guard = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = TranslatorConfig {
            device: DeviceChoice::Cpu,
            max_length: Some(128),
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        let loaded = TranslatorConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.device, DeviceChoice::Cpu);
        assert_eq!(loaded.max_length, Some(128));
        assert_eq!(loaded.languages, config.languages);
    }

    #[test]
    fn test_env_overrides_defaults() {
        let _guard = env_lock();
        set_overrides();
        let result = TranslatorConfig::from_env();
        clear_overrides();

        let config = result.unwrap();
        assert!(config.cache_models);
        assert_eq!(config.num_beams, Some(5));
        assert_eq!(config.hub_url, "http://mirror.local");
        assert_eq!(config.device, DeviceChoice::Cpu);
        assert_eq!(config.languages.len(), 14);
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "num_beams = 2\nmax_length = 64\ncache_models = false").unwrap();

        set_overrides();
        let result = TranslatorConfig::load(Some(file.path()));
        clear_overrides();

        let config = result.unwrap();
        assert_eq!(config.num_beams, Some(5));
        assert!(config.cache_models);
        assert_eq!(config.max_length, Some(64));
    }
}
