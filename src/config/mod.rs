//! Configuration system (layered: code > env > settings file > defaults).

pub mod settings;

pub use settings::{DemoTiming, Settings};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::ParleyError;

/// Environment variables that carry provider API keys.
const KEY_ENV_VARS: &[(&str, &str)] = &[("ANTHROPIC_API_KEY", "anthropic")];

/// Environment variables that override provider base URLs.
const BASE_URL_ENV_VARS: &[(&str, &str)] = &[("ANTHROPIC_BASE_URL", "anthropic")];

/// Credential and endpoint configuration shared by every provider.
///
/// Cloning is cheap; clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct ParleyConfig {
    api_keys: Arc<RwLock<HashMap<String, String>>>,
    base_urls: Arc<RwLock<HashMap<String, String>>>,
}

impl fmt::Debug for ParleyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let providers: Vec<String> = self
            .api_keys
            .read()
            .map(|keys| keys.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("ParleyConfig")
            .field("api_keys", &providers)
            .field("base_urls", &self.base_urls)
            .finish()
    }
}

impl ParleyConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables (`ANTHROPIC_API_KEY`, `ANTHROPIC_BASE_URL`).
    ///
    /// A `.env` file in the working directory is read first when present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let config = Self::new();

        for (env_var, provider) in KEY_ENV_VARS {
            if let Ok(key) = std::env::var(env_var) {
                if !key.trim().is_empty() {
                    config.set_api_key(provider, key);
                }
            }
        }

        for (env_var, provider) in BASE_URL_ENV_VARS {
            if let Ok(url) = std::env::var(env_var) {
                config.set_base_url(provider, url);
            }
        }

        config
    }

    pub fn set_api_key(&self, provider: &str, key: String) {
        if let Ok(mut keys) = self.api_keys.write() {
            keys.insert(provider.to_string(), key);
        }
    }

    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        self.api_keys.read().ok()?.get(provider).cloned()
    }

    /// Resolve an API key or fail with the variable the user should set.
    pub fn require_api_key(&self, provider: &str) -> Result<String, ParleyError> {
        self.get_api_key(provider).ok_or_else(|| {
            let env_var = KEY_ENV_VARS
                .iter()
                .find(|(_, p)| *p == provider)
                .map(|(var, _)| (*var).to_string())
                .unwrap_or_else(|| format!("{}_API_KEY", provider.to_uppercase()));
            ParleyError::MissingCredential {
                provider: provider.to_string(),
                env_var,
            }
        })
    }

    pub fn set_base_url(&self, provider: &str, url: String) {
        if let Ok(mut urls) = self.base_urls.write() {
            urls.insert(provider.to_string(), url);
        }
    }

    pub fn get_base_url(&self, provider: &str) -> Option<String> {
        self.base_urls.read().ok()?.get(provider).cloned()
    }

    pub fn has_credentials(&self, provider: &str) -> bool {
        self.get_api_key(provider).is_some()
    }
}
