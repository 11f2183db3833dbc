//! Provider configuration.
//!
//! Credentials resolve exactly once, when a config is built, and surface as
//! [`ProviderError::Configuration`] there rather than failing deep inside a
//! request.

use crate::error::ProviderError;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBED_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_KEY_VAR: &str = "OPENAI_API_KEY";
const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Explicit configuration handed to provider clients at construction.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub base_url: String,
    pub embed_model: String,
    pub completion_model: String,
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "empty provider API key".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            completion_model: DEFAULT_COMPLETION_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Resolve configuration from the environment (`OPENAI_API_KEY`,
    /// optionally `OPENAI_BASE_URL`).
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = env::var(API_KEY_VAR).map_err(|_| {
            ProviderError::Configuration(format!("{API_KEY_VAR} is not set"))
        })?;

        let mut config = Self::new(api_key)?;
        if let Ok(base_url) = env::var(BASE_URL_VAR) {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_embed_model(mut self, model: impl Into<String>) -> Self {
        self.embed_model = model.into();
        self
    }

    #[must_use]
    pub fn with_completion_model(mut self, model: impl Into<String>) -> Self {
        self.completion_model = model.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
