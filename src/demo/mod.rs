//! Scripted demonstrations of agents at work.
//!
//! Every demo needs a [`DemoContext`]: the provider, the resolved
//! [`Settings`] and the directory the agents' tools operate in.

pub mod console;
pub mod hello_world;
pub mod inter_agent;

use std::path::PathBuf;
use std::sync::Arc;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::agent::{default_agent, Agent};
use crate::config::{ParleyConfig, Settings};
use crate::error::ParleyError;
use crate::models::LanguageModel;
use crate::provider::{create_provider, ModelProvider};
use crate::types::GenerationSettings;

pub use console::{console_sink, describe_event};
pub use hello_world::HelloWorldReport;
pub use inter_agent::{DeliveryMode, InterAgentOptions, InterAgentReport};

/// The demos the `parley` binary can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum DemoKind {
    HelloWorld,
    InterAgent,
    SimpleCommunication,
}

impl DemoKind {
    pub fn description(self) -> &'static str {
        match self {
            Self::HelloWorld => {
                "One agent with stock tools writes and runs hello_world.py, then documents it"
            }
            Self::InterAgent => {
                "Alice and Bob run in parallel and talk through send/receive mailbox tools"
            }
            Self::SimpleCommunication => {
                "Alice and Bob talk with a single send tool; replies are delivered between steps"
            }
        }
    }
}

/// Listing printed by `parley list`.
pub fn render_catalog() -> String {
    let width = DemoKind::iter()
        .map(|kind| <&'static str>::from(kind).len())
        .max()
        .unwrap_or(0);
    let mut out = String::from("Available demos:\n");
    for kind in DemoKind::iter() {
        let name: &'static str = kind.into();
        out.push_str(&format!("  {name:<width$}  {}\n", kind.description()));
    }
    out
}

/// A line of `=` used to frame demo sections.
pub(crate) fn rule(width: usize) -> String {
    "=".repeat(width)
}

/// Everything a demo needs to build agents.
#[derive(Clone)]
pub struct DemoContext {
    provider: Arc<dyn ModelProvider>,
    settings: Settings,
    working_dir: PathBuf,
}

impl DemoContext {
    /// Resolve the configured model into a live provider.
    pub fn from_config(
        config: &ParleyConfig,
        settings: Settings,
        working_dir: PathBuf,
    ) -> Result<Self, ParleyError> {
        let model: LanguageModel = settings.model.parse()?;
        let provider = create_provider(&model, config)?;
        Ok(Self::with_provider(Arc::from(provider), settings, working_dir))
    }

    pub fn with_provider(
        provider: Arc<dyn ModelProvider>,
        settings: Settings,
        working_dir: PathBuf,
    ) -> Self {
        Self {
            provider,
            settings,
            working_dir,
        }
    }

    pub fn provider(&self) -> Arc<dyn ModelProvider> {
        Arc::clone(&self.provider)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn working_dir(&self) -> &PathBuf {
        &self.working_dir
    }

    fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            max_tokens: self.settings.max_tokens,
            ..GenerationSettings::default()
        }
    }

    /// The default agent with every stock tool.
    pub fn stock_agent(&self, name: &str) -> Agent {
        default_agent(self.provider(), self.working_dir.clone())
            .with_name(name)
            .with_settings(self.generation_settings())
            .with_max_iterations(self.settings.max_iterations)
    }

    /// An agent with no tools; the caller adds what it needs.
    pub fn bare_agent(&self, name: &str, system_prompt: &str) -> Agent {
        Agent::new(self.provider())
            .with_name(name)
            .with_system_prompt(system_prompt)
            .with_settings(self.generation_settings())
            .with_working_dir(self.working_dir.clone())
            .with_max_iterations(self.settings.max_iterations)
    }
}
