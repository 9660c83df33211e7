//! Hub availability checks for language pairs

use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use crate::core::config::TranslatorConfig;
use crate::core::errors::Result;
use crate::core::loader::{resource_url, WEIGHTS_FILE};
use crate::core::models::LanguagePair;

/// Availability of one pair on the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairStatus {
    /// Weights file is published
    Published,
    /// Repository or weights file does not exist
    Missing,
    /// Hub could not be asked (network, server error)
    Unknown(String),
}

/// Map a HEAD response status to an availability verdict
pub fn classify_status(status: StatusCode) -> PairStatus {
    if status.is_success() {
        PairStatus::Published
    } else if status.is_client_error() {
        PairStatus::Missing
    } else {
        PairStatus::Unknown(format!("HTTP {}", status.as_u16()))
    }
}

/// Sends HEAD requests for model weights
#[derive(Debug, Clone)]
pub struct HubProbe {
    client: reqwest::Client,
    hub_base: String,
}

impl HubProbe {
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.probe_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            hub_base: config.hub_base().to_string(),
        })
    }

    /// Check whether the pair's weights are downloadable
    pub async fn check(&self, pair: &LanguagePair) -> PairStatus {
        let url = resource_url(&self.hub_base, pair, WEIGHTS_FILE);
        debug!("HEAD {}", url);

        match self.client.head(&url).send().await {
            Ok(response) => classify_status(response.status()),
            Err(e) => PairStatus::Unknown(e.to_string()),
        }
    }
}
