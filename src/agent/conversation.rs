//! Conversation state and the model/tool loop.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ParleyError;
use crate::provider::ProviderRequest;
use crate::tools::arguments::ToolArguments;
use crate::tools::tool::ToolExecutionContext;
use crate::tools::validation::validate_arguments;
use crate::types::*;

use super::agent::Agent;

/// Something that happened while a conversation was running.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversationEvent {
    AssistantText {
        agent: String,
        text: String,
    },
    ToolCallStarted {
        agent: String,
        call: AgentToolCall,
    },
    ToolResult {
        agent: String,
        tool_name: String,
        result: AgentToolResult,
    },
    Finished {
        agent: String,
        reason: FinishReason,
    },
}

/// Receiver for [`ConversationEvent`]s. Called inline from the run loop.
pub type EventSink = Arc<dyn Fn(&ConversationEvent) + Send + Sync>;

/// Summary of one [`Conversation::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Text of the last assistant turn.
    pub text: String,
    pub finish_reason: FinishReason,
    /// Number of model calls made.
    pub iterations: usize,
    pub tool_calls: usize,
    pub usage: Usage,
}

/// A running dialogue between a user and one [`Agent`].
pub struct Conversation {
    agent: Agent,
    messages: Vec<ModelMessage>,
    usage: Usage,
    sink: Option<EventSink>,
}

impl Conversation {
    pub fn new(agent: Agent) -> Self {
        Self {
            agent,
            messages: Vec::new(),
            usage: Usage::default(),
            sink: None,
        }
    }

    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Append a user turn. Nothing is sent until [`run`](Self::run).
    pub fn send_message(&mut self, text: impl Into<String>) {
        self.messages.push(ModelMessage::user(text));
    }

    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Token usage accumulated over every run so far.
    pub fn usage(&self) -> Usage {
        self.usage
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Text of the most recent assistant turn, if any.
    pub fn last_assistant_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
            .map(ModelMessage::text)
    }

    /// Drive the model until it answers without calling tools.
    ///
    /// Tool calls are executed in the order the model issued them and their
    /// results fed back. Provider failures abort the run; tool failures do
    /// not. Hitting the agent's iteration cap ends the run with
    /// [`FinishReason::Length`].
    pub async fn run(&mut self) -> Result<RunOutcome, ParleyError> {
        let tool_defs = self.agent.tool_definitions();
        let tools = (!tool_defs.is_empty()).then_some(tool_defs);
        let max_iterations = self.agent.max_iterations();

        let mut run_usage = Usage::default();
        let mut tool_call_count = 0;
        let mut last_text = String::new();

        for iteration in 1..=max_iterations {
            let request = ProviderRequest {
                messages: self.request_messages(),
                settings: self.agent.settings().clone(),
                tools: tools.clone(),
            };

            debug!(agent = self.agent.name(), iteration, "calling provider");
            let response = self.agent.provider().generate_text(&request).await?;
            run_usage.merge(&response.usage);
            self.usage.merge(&response.usage);

            if !response.text.is_empty() {
                last_text = response.text.clone();
                self.emit(ConversationEvent::AssistantText {
                    agent: self.agent.name().to_string(),
                    text: response.text.clone(),
                });
            }

            if response.tool_calls.is_empty() {
                if !response.text.is_empty() {
                    self.messages.push(ModelMessage::assistant(&response.text));
                }
                let reason = response.finish_reason.unwrap_or(FinishReason::Stop);
                return Ok(self.finish(reason, last_text, iteration, tool_call_count, run_usage));
            }

            self.messages.push(ModelMessage::assistant_with_tool_calls(
                &response.text,
                &response.tool_calls,
            ));

            let mut results = Vec::with_capacity(response.tool_calls.len());
            for call in &response.tool_calls {
                tool_call_count += 1;
                self.emit(ConversationEvent::ToolCallStarted {
                    agent: self.agent.name().to_string(),
                    call: call.clone(),
                });
                let result = self.execute_tool_call(call).await;
                self.emit(ConversationEvent::ToolResult {
                    agent: self.agent.name().to_string(),
                    tool_name: call.name.clone(),
                    result: result.clone(),
                });
                results.push(result);
            }
            self.messages.push(ModelMessage::tool_results(results));
        }

        warn!(
            agent = self.agent.name(),
            max_iterations, "iteration limit reached before the model finished"
        );
        Ok(self.finish(
            FinishReason::Length,
            last_text,
            max_iterations,
            tool_call_count,
            run_usage,
        ))
    }

    fn request_messages(&self) -> Vec<ModelMessage> {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        if let Some(prompt) = self.agent.system_prompt() {
            messages.push(ModelMessage::system(prompt));
        }
        messages.extend(self.messages.iter().cloned());
        messages
    }

    async fn execute_tool_call(&self, call: &AgentToolCall) -> AgentToolResult {
        let error_result = |message: String| AgentToolResult {
            tool_call_id: call.id.clone(),
            result: json!({ "error": message }),
            is_error: true,
        };

        let Some(tool) = self.agent.tool(&call.name) else {
            warn!(agent = self.agent.name(), tool = %call.name, "model requested unknown tool");
            return error_result(format!("Tool '{}' not found", call.name));
        };

        if let Err(reason) = validate_arguments(&call.arguments, &tool.parameters().schema) {
            warn!(tool = %call.name, %reason, "rejected tool arguments");
            return error_result(format!("Invalid arguments for '{}': {reason}", call.name));
        }

        let ctx = ToolExecutionContext {
            tool_call_id: Some(call.id.clone()),
            tool_name: Some(call.name.clone()),
            working_dir: self.agent.working_dir().map(Path::to_path_buf),
        };
        let args = ToolArguments::new(call.arguments.clone());

        match tool.execute(&args, &ctx).await {
            Ok(value) => AgentToolResult {
                tool_call_id: call.id.clone(),
                result: value,
                is_error: false,
            },
            Err(e) => {
                warn!(tool = %call.name, error = %e, "tool execution failed");
                error_result(e.to_string())
            }
        }
    }

    fn finish(
        &self,
        reason: FinishReason,
        text: String,
        iterations: usize,
        tool_calls: usize,
        usage: Usage,
    ) -> RunOutcome {
        info!(
            agent = self.agent.name(),
            %reason,
            iterations,
            tool_calls,
            output_tokens = usage.output_tokens,
            "conversation run finished"
        );
        self.emit(ConversationEvent::Finished {
            agent: self.agent.name().to_string(),
            reason,
        });
        RunOutcome {
            text,
            finish_reason: reason,
            iterations,
            tool_calls,
            usage,
        }
    }

    fn emit(&self, event: ConversationEvent) {
        if let Some(sink) = &self.sink {
            sink(&event);
        }
    }
}
