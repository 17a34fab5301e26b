//! Shared test helpers: scripted providers.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use parley::error::ParleyError;
use parley::models::ModelCapabilities;
use parley::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use parley::types::*;

enum Scripted {
    Reply(ProviderResponse),
    Fail { status: u16, message: String },
}

fn usage(input: u32, output: u32) -> Usage {
    Usage {
        input_tokens: input,
        output_tokens: output,
        total_tokens: input + output,
        ..Default::default()
    }
}

/// A provider that replays queued responses and records every request.
///
/// Once the queue is empty it answers "Mock response".
pub struct MockProvider {
    model_id: String,
    capabilities: ModelCapabilities,
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            capabilities: ModelCapabilities::full(200_000),
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn shared(model_id: &str) -> Arc<Self> {
        Arc::new(Self::new(model_id))
    }

    /// Queue a plain text answer.
    pub fn queue_response(&self, text: &str) -> &Self {
        self.push(Scripted::Reply(ProviderResponse {
            text: text.to_string(),
            usage: usage(10, 20),
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        }))
    }

    /// Queue a turn that calls one tool.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) -> &Self {
        self.queue_tool_calls(&[(id, name, args)])
    }

    /// Queue a turn that calls several tools at once.
    pub fn queue_tool_calls(&self, calls: &[(&str, &str, serde_json::Value)]) -> &Self {
        self.push(Scripted::Reply(ProviderResponse {
            text: String::new(),
            usage: usage(10, 5),
            tool_calls: calls
                .iter()
                .map(|(id, name, args)| AgentToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    arguments: args.clone(),
                })
                .collect(),
            finish_reason: Some(FinishReason::ToolCalls),
        }))
    }

    /// Queue an API failure.
    pub fn queue_error(&self, status: u16, message: &str) -> &Self {
        self.push(Scripted::Fail {
            status,
            message: message.to_string(),
        })
    }

    fn push(&self, entry: Scripted) -> &Self {
        self.script.lock().unwrap().push_back(entry);
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ParleyError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Reply(response)) => Ok(response),
            Some(Scripted::Fail { status, message }) => Err(ParleyError::api(status, message)),
            None => Ok(ProviderResponse {
                text: "Mock response".to_string(),
                usage: Usage::default(),
                tool_calls: vec![],
                finish_reason: Some(FinishReason::Stop),
            }),
        }
    }
}

/// Routes each request to a per-agent [`MockProvider`], picked by the
/// "You are Agent <id>" line of the conversation's first user turn.
pub struct AgentRouter {
    agents: HashMap<String, Arc<MockProvider>>,
    capabilities: ModelCapabilities,
}

impl AgentRouter {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            agents: ids
                .iter()
                .map(|id| (id.to_string(), MockProvider::shared(&format!("mock-{id}"))))
                .collect(),
            capabilities: ModelCapabilities::full(200_000),
        }
    }

    pub fn agent(&self, id: &str) -> Arc<MockProvider> {
        Arc::clone(&self.agents[id])
    }

    fn route(&self, request: &ProviderRequest) -> Option<&Arc<MockProvider>> {
        let opening = request
            .messages
            .iter()
            .find(|m| m.role == Role::User)?
            .text();
        self.agents
            .iter()
            .find(|(id, _)| opening.contains(&format!("You are Agent {id}.")))
            .map(|(_, provider)| provider)
    }
}

#[async_trait]
impl ModelProvider for AgentRouter {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        "mock-router"
    }

    fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ParleyError> {
        match self.route(request) {
            Some(provider) => provider.generate_text(request).await,
            None => Err(ParleyError::InvalidArgument(
                "request does not belong to a known agent".into(),
            )),
        }
    }
}

/// Every tool result sent to the model in `request`, in order.
pub fn tool_results(request: &ProviderRequest) -> Vec<AgentToolResult> {
    request
        .messages
        .iter()
        .flat_map(|m| m.content.iter())
        .filter_map(|part| match part {
            ContentPart::ToolResult(result) => Some(result.clone()),
            _ => None,
        })
        .collect()
}
