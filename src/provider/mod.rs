//! Model provider trait and the Anthropic implementation.

pub mod anthropic;
pub mod http;

use async_trait::async_trait;

use crate::config::ParleyConfig;
use crate::error::ParleyError;
use crate::models::{ModelCapabilities, LanguageModel};
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "anthropic").
    fn provider_name(&self) -> &str;
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    fn capabilities(&self) -> &ModelCapabilities;

    /// Generate one assistant turn (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, ParleyError>;
}

/// Create a provider for the given model, using the provided config.
pub fn create_provider(
    model: &LanguageModel,
    config: &ParleyConfig,
) -> Result<Box<dyn ModelProvider>, ParleyError> {
    match model {
        LanguageModel::Anthropic(m) => {
            let api_key = config.require_api_key("anthropic")?;
            Ok(Box::new(anthropic::AnthropicProvider::new(
                m.clone(),
                api_key,
                config.get_base_url("anthropic"),
            )))
        }
        LanguageModel::Custom { provider, .. } => Err(ParleyError::ModelNotFound(format!(
            "No built-in provider for '{provider}'. Use an anthropic:<model> selector."
        ))),
    }
}
