//! Agent definition: a model paired with a prompt and a toolset.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::provider::{ModelProvider, ToolDefinition};
use crate::tools::tool::Tool;
use crate::tools::definition_of;
use crate::types::GenerationSettings;

use super::conversation::Conversation;

/// Default cap on model calls per [`Conversation::run`].
pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// An LLM paired with a system prompt, tools and generation settings.
///
/// Agents are cheap to clone; the provider and tools are shared.
#[derive(Clone)]
pub struct Agent {
    name: String,
    provider: Arc<dyn ModelProvider>,
    system_prompt: Option<String>,
    tools: Vec<Arc<dyn Tool>>,
    settings: GenerationSettings,
    working_dir: Option<PathBuf>,
    max_iterations: usize,
}

impl Agent {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            name: "agent".to_string(),
            provider,
            system_prompt: None,
            tools: Vec::new(),
            settings: GenerationSettings::default(),
            working_dir: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Display name used in events and log lines.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Add a tool. A tool with the same name replaces the earlier one.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(tool);
        self
    }

    pub fn with_tools(self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        tools.into_iter().fold(self, Agent::with_tool)
    }

    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Values below one are raised to one.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &dyn ModelProvider {
        self.provider.as_ref()
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    /// Look up a tool by the name the model uses.
    pub fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| definition_of(t.as_ref())).collect()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Start an empty conversation with this agent.
    pub fn start_conversation(self) -> Conversation {
        Conversation::new(self)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tools: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.provider.model_id())
            .field("tools", &tools)
            .field("working_dir", &self.working_dir)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}
