//! Parley: tool-using LLM agents that talk to each other.
//!
//! The crate bundles a small agent kernel (an Anthropic provider, a tool
//! trait with stock filesystem and shell tools, and a conversation loop)
//! with an inter-agent messaging layer built on per-agent mailboxes.
//! The `parley` binary runs scripted demos on top of both.
//!
//! ```no_run
//! use std::sync::Arc;
//! use parley::agent::default_agent;
//! use parley::config::ParleyConfig;
//! use parley::messaging::{MailboxRegistry, MessagingTools};
//! use parley::models::LanguageModel;
//! use parley::provider::create_provider;
//!
//! # async fn example() -> parley::error::Result<()> {
//! let model: LanguageModel = "anthropic:claude-sonnet-4-20250514".parse()?;
//! let provider = Arc::from(create_provider(&model, &ParleyConfig::from_env())?);
//!
//! let registry = MailboxRegistry::new();
//! let messaging = MessagingTools::new("Alice", registry.clone())?;
//! let agent = default_agent(provider, ".")
//!     .with_name("Alice")
//!     .with_tools(messaging.tools());
//!
//! let mut conversation = agent.start_conversation();
//! conversation.send_message("Say hello to Bob.");
//! conversation.run().await?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod demo;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;
