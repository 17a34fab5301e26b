//! Model capabilities descriptor.

use serde::{Deserialize, Serialize};

/// Describes what a model can do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelCapabilities {
    pub supports_tools: bool,
    pub supports_system_messages: bool,
    pub context_length: usize,
    pub max_output_tokens: Option<u32>,
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self {
            supports_tools: false,
            supports_system_messages: true,
            context_length: 4096,
            max_output_tokens: None,
        }
    }
}

impl ModelCapabilities {
    /// Tool-capable model with the given context window.
    pub fn full(context_length: usize) -> Self {
        Self {
            supports_tools: true,
            supports_system_messages: true,
            context_length,
            max_output_tokens: None,
        }
    }
}
