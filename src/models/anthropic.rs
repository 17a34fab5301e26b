//! Anthropic model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::capabilities::ModelCapabilities;

/// Anthropic models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum AnthropicModel {
    #[strum(serialize = "claude-opus-4-5-20251101")]
    ClaudeOpus45,
    #[strum(serialize = "claude-sonnet-4-5-20250929")]
    ClaudeSonnet45,
    #[strum(serialize = "claude-sonnet-4-20250514")]
    ClaudeSonnet4,
    #[strum(serialize = "claude-3-5-sonnet-20241022")]
    Claude35Sonnet,
    #[strum(serialize = "claude-3-5-haiku-20241022")]
    Claude35Haiku,
    /// Custom/unknown Anthropic model by ID.
    #[strum(default)]
    Custom(String),
}

impl AnthropicModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::ClaudeOpus45 => "claude-opus-4-5-20251101",
            Self::ClaudeSonnet45 => "claude-sonnet-4-5-20250929",
            Self::ClaudeSonnet4 => "claude-sonnet-4-20250514",
            Self::Claude35Sonnet => "claude-3-5-sonnet-20241022",
            Self::Claude35Haiku => "claude-3-5-haiku-20241022",
            Self::Custom(s) => s,
        }
    }

    pub fn capabilities(&self) -> ModelCapabilities {
        let max_output = match self {
            Self::ClaudeOpus45 | Self::ClaudeSonnet45 | Self::ClaudeSonnet4 => 16_384,
            Self::Claude35Sonnet | Self::Claude35Haiku | Self::Custom(_) => 8_192,
        };
        ModelCapabilities {
            max_output_tokens: Some(max_output),
            ..ModelCapabilities::full(200_000)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn known_ids_parse_to_named_variants() {
        assert_eq!(
            AnthropicModel::from_str("claude-sonnet-4-20250514").unwrap(),
            AnthropicModel::ClaudeSonnet4
        );
    }

    #[test]
    fn unknown_ids_fall_back_to_custom() {
        let model = AnthropicModel::from_str("claude-next").unwrap();
        assert_eq!(model, AnthropicModel::Custom("claude-next".into()));
        assert_eq!(model.as_str(), "claude-next");
        assert_eq!(model.capabilities().max_output_tokens, Some(8_192));
    }
}
