//! Model definitions and selection.

pub mod anthropic;
pub mod capabilities;

pub use capabilities::ModelCapabilities;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParleyError;

use self::anthropic::AnthropicModel;

/// Top-level language model enum, dispatching to provider-specific variants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "provider", content = "model")]
pub enum LanguageModel {
    Anthropic(AnthropicModel),
    /// Model for a provider this crate has no transport for.
    Custom { provider: String, model_id: String },
}

impl LanguageModel {
    /// Get the model's API identifier string.
    pub fn model_id(&self) -> &str {
        match self {
            Self::Anthropic(m) => m.as_str(),
            Self::Custom { model_id, .. } => model_id,
        }
    }

    /// Get the provider name.
    pub fn provider_name(&self) -> &str {
        match self {
            Self::Anthropic(_) => "anthropic",
            Self::Custom { provider, .. } => provider,
        }
    }

    /// Get capabilities for this model.
    pub fn capabilities(&self) -> ModelCapabilities {
        match self {
            Self::Anthropic(m) => m.capabilities(),
            Self::Custom { .. } => ModelCapabilities::default(),
        }
    }
}

impl FromStr for LanguageModel {
    type Err = ParleyError;

    /// Parse `provider:model_id`; a bare model id is treated as Anthropic.
    ///
    /// Examples: `anthropic:claude-sonnet-4-20250514`, `claude-3-5-sonnet-20241022`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (provider, model_id) = s.split_once(':').unwrap_or(("anthropic", s));
        if model_id.is_empty() {
            return Err(ParleyError::InvalidArgument(format!(
                "Invalid model selector '{s}': expected 'provider:model_id'"
            )));
        }

        match provider {
            "anthropic" | "claude" => {
                let m = AnthropicModel::from_str(model_id)
                    .unwrap_or_else(|_| AnthropicModel::Custom(model_id.to_string()));
                Ok(Self::Anthropic(m))
            }
            other => Ok(Self::Custom {
                provider: other.to_string(),
                model_id: model_id.to_string(),
            }),
        }
    }
}

impl fmt::Display for LanguageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_name(), self.model_id())
    }
}
