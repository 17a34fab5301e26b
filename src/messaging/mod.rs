//! Inter-agent messaging: per-agent mailboxes and the tools that use them.
//!
//! A [`MailboxRegistry`] is shared by every agent taking part in a demo.
//! Each agent gets a [`MessagingTools`] bound to its own identity, which
//! produces a send tool (push into another agent's mailbox) and a receive
//! tool (drain its own mailbox, waiting up to a timeout).

pub mod mailbox;
pub mod tools;

pub use mailbox::{Envelope, Mailbox, MailboxRegistry};
pub use tools::{
    format_delivery, validate_agent_id, MessagingTools, ReceiveMessagesObservation,
    SendMessageObservation, ToolNaming,
};
