//! Convenience re-exports for common use.

pub use crate::agent::{default_agent, Agent, Conversation, ConversationEvent, RunOutcome};
pub use crate::config::{ParleyConfig, Settings};
pub use crate::error::{ParleyError, Result};
pub use crate::messaging::{Envelope, MailboxRegistry, MessagingTools, ToolNaming};
pub use crate::models::LanguageModel;
pub use crate::provider::{create_provider, ModelProvider};
pub use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolArguments};
pub use crate::types::{FinishReason, GenerationSettings, ModelMessage, Role, Usage};
