//! Tool system for function calling.

pub mod arguments;
pub mod builtin;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::{AgentToolParameters, ToolAnnotations};
pub use validation::validate_arguments;

use crate::provider::ToolDefinition;

/// Convert a tool into the definition sent to the provider.
pub fn definition_of(tool: &dyn Tool) -> ToolDefinition {
    ToolDefinition {
        name: tool.name().to_string(),
        description: tool.description().to_string(),
        parameters: tool.parameters().schema.clone(),
    }
}
