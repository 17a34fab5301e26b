//! Agents and the conversation loop that drives them.

#[allow(clippy::module_inception)]
pub mod agent;
pub mod conversation;
pub mod presets;

pub use agent::Agent;
pub use conversation::{Conversation, ConversationEvent, EventSink, RunOutcome};
pub use presets::default_agent;
