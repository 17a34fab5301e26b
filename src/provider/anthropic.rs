//! Anthropic Messages API provider.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::ParleyError;
use crate::models::anthropic::AnthropicModel;
use crate::models::capabilities::ModelCapabilities;
use crate::types::*;

use super::http::{anthropic_headers, shared_client, status_to_error};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
const FALLBACK_MAX_TOKENS: u32 = 4096;

pub struct AnthropicProvider {
    model: AnthropicModel,
    api_key: String,
    base_url: String,
    capabilities: ModelCapabilities,
}

impl AnthropicProvider {
    pub fn new(model: AnthropicModel, api_key: String, base_url: Option<String>) -> Self {
        let capabilities = model.capabilities();
        Self {
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
            capabilities,
        }
    }

    fn build_request_body(&self, request: &ProviderRequest) -> Value {
        let mut system_parts = Vec::new();
        let mut messages: Vec<Value> = Vec::new();

        for msg in &request.messages {
            let (role, content) = match msg.role {
                Role::System => {
                    system_parts.push(msg.text());
                    continue;
                }
                Role::User => ("user", user_blocks(&msg.content)),
                Role::Assistant => ("assistant", assistant_blocks(&msg.content)),
                Role::Tool => ("user", tool_result_blocks(&msg.content)),
            };
            if content.is_empty() {
                continue;
            }
            push_merged(&mut messages, role, content);
        }

        let max_tokens = request
            .settings
            .max_tokens
            .or(self.capabilities.max_output_tokens)
            .unwrap_or(FALLBACK_MAX_TOKENS);

        let mut body = Map::new();
        body.insert("model".into(), self.model.as_str().into());
        body.insert("messages".into(), Value::Array(messages));
        body.insert("max_tokens".into(), max_tokens.into());

        if !system_parts.is_empty() {
            body.insert("system".into(), system_parts.join("\n").into());
        }
        if let Some(temp) = request.settings.temperature {
            body.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            body.insert("top_p".into(), top_p.into());
        }
        if let Some(top_k) = request.settings.top_k {
            body.insert("top_k".into(), top_k.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            body.insert("stop_sequences".into(), json!(stops));
        }

        let tools = request.tools.as_deref().unwrap_or_default();
        let tools_disabled = matches!(request.settings.tool_choice, Some(ToolChoice::None));
        if !tools.is_empty() && !tools_disabled {
            let tool_defs: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.parameters,
                    })
                })
                .collect();
            body.insert("tools".into(), tool_defs.into());

            match request.settings.tool_choice {
                Some(ToolChoice::Auto) => {
                    body.insert("tool_choice".into(), json!({"type": "auto"}));
                }
                Some(ToolChoice::Required) => {
                    body.insert("tool_choice".into(), json!({"type": "any"}));
                }
                Some(ToolChoice::Function(ref name)) => {
                    body.insert("tool_choice".into(), json!({"type": "tool", "name": name}));
                }
                Some(ToolChoice::None) | None => {}
            }
        }

        Value::Object(body)
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    fn model_id(&self) -> &str {
        self.model.as_str()
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ParleyError> {
        let body = self.build_request_body(request);
        let url = format!("{}/messages", self.base_url);

        debug!(
            model = self.model.as_str(),
            messages = request.messages.len(),
            "Anthropic generate_text"
        );

        let resp = shared_client()
            .post(&url)
            .headers(anthropic_headers(&self.api_key, API_VERSION))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: AnthropicResponse = resp.json().await?;
        Ok(data.into_provider_response())
    }
}

fn push_merged(messages: &mut Vec<Value>, role: &str, mut content: Vec<Value>) {
    if let Some(last) = messages.last_mut() {
        if last["role"] == role {
            if let Some(existing) = last["content"].as_array_mut() {
                existing.append(&mut content);
                return;
            }
        }
    }
    messages.push(json!({ "role": role, "content": content }));
}

fn user_blocks(parts: &[ContentPart]) -> Vec<Value> {
    parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } if !text.is_empty() => {
                Some(json!({"type": "text", "text": text}))
            }
            _ => None,
        })
        .collect()
}

fn assistant_blocks(parts: &[ContentPart]) -> Vec<Value> {
    parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } if !text.is_empty() => {
                Some(json!({"type": "text", "text": text}))
            }
            ContentPart::ToolCall(tc) => Some(json!({
                "type": "tool_use",
                "id": tc.id,
                "name": tc.name,
                "input": tool_input(&tc.arguments),
            })),
            _ => None,
        })
        .collect()
}

fn tool_result_blocks(parts: &[ContentPart]) -> Vec<Value> {
    parts
        .iter()
        .filter_map(|part| match part {
            ContentPart::ToolResult(tr) => Some(json!({
                "type": "tool_result",
                "tool_use_id": tr.tool_call_id,
                "content": tool_result_text(&tr.result),
                "is_error": tr.is_error,
            })),
            _ => None,
        })
        .collect()
}

/// `tool_use.input` must be an object.
fn tool_input(arguments: &Value) -> Value {
    match arguments {
        Value::Object(_) => arguments.clone(),
        _ => json!({}),
    }
}

fn tool_result_text(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
    usage: AnthropicUsage,
}

impl AnthropicResponse {
    fn into_provider_response(self) -> ProviderResponse {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in self.content {
            match block.r#type.as_str() {
                "text" => {
                    if let Some(t) = block.text {
                        text.push_str(&t);
                    }
                }
                "tool_use" => {
                    if let (Some(id), Some(name)) = (block.id, block.name) {
                        tool_calls.push(AgentToolCall {
                            id,
                            name,
                            arguments: block.input.unwrap_or_else(|| json!({})),
                        });
                    }
                }
                _ => {}
            }
        }

        let finish_reason = match self.stop_reason.as_deref() {
            Some("end_turn") | Some("stop_sequence") => Some(FinishReason::Stop),
            Some("max_tokens") => Some(FinishReason::Length),
            Some("tool_use") => Some(FinishReason::ToolCalls),
            Some("refusal") => Some(FinishReason::ContentFilter),
            _ => None,
        };

        ProviderResponse {
            text,
            usage: Usage {
                input_tokens: self.usage.input_tokens,
                output_tokens: self.usage.output_tokens,
                total_tokens: self.usage.input_tokens + self.usage.output_tokens,
                cache_read_tokens: self.usage.cache_read_input_tokens,
                cache_creation_tokens: self.usage.cache_creation_input_tokens,
            },
            tool_calls,
            finish_reason,
        }
    }
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<Value>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
    #[serde(default)]
    cache_read_input_tokens: Option<u32>,
    #[serde(default)]
    cache_creation_input_tokens: Option<u32>,
}
