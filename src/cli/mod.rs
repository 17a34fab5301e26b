//! Command-line interface of the `parley` binary.

pub mod errors;

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::{DemoTiming, Settings};
use crate::error::ParleyError;

/// Parley: demos of tool-using agents that talk to each other.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about = "Run agent demos against the Anthropic API")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Model to use (provider:model, e.g. anthropic:claude-sonnet-4-20250514)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Settings file (defaults to ./parley.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory the agents' tools work in (defaults to the current directory)
    #[arg(long, global = true)]
    pub working_dir: Option<PathBuf>,

    /// Maximum model calls per conversation run
    #[arg(long, global = true)]
    pub max_iterations: Option<usize>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available demos
    List,
    /// One agent creates and runs hello_world.py
    HelloWorld(HelloWorldArgs),
    /// Two agents talking through send/receive tools
    InterAgent(ConversationArgs),
    /// Two agents talking with a send tool and direct delivery
    SimpleCommunication(ConversationArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct HelloWorldArgs {
    /// Start with a date/time and directory listing request instead
    #[arg(long)]
    pub quick: bool,
}

/// Pacing overrides for the two-agent demos.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct ConversationArgs {
    /// Follow-up steps per agent after the opening prompt
    #[arg(long)]
    pub steps: Option<usize>,

    /// Seconds Alice runs before Bob starts
    #[arg(long, value_name = "SECS")]
    pub head_start: Option<u64>,

    /// Seconds to pause between steps
    #[arg(long, value_name = "SECS")]
    pub step_pause: Option<u64>,

    /// Default wait of the receive tool, in seconds
    #[arg(long, value_name = "SECS")]
    pub receive_timeout: Option<u64>,
}

impl ConversationArgs {
    pub fn apply(&self, timing: &mut DemoTiming) {
        if let Some(steps) = self.steps {
            timing.conversation_steps = steps;
        }
        if let Some(secs) = self.head_start {
            timing.head_start_secs = secs;
        }
        if let Some(secs) = self.step_pause {
            timing.step_pause_secs = secs;
        }
        if let Some(secs) = self.receive_timeout {
            timing.receive_timeout_secs = secs;
        }
    }
}

impl GlobalArgs {
    /// Settings file, then `PARLEY_MODEL`, then these flags.
    pub fn resolve_settings(&self) -> Result<Settings, ParleyError> {
        let base = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::discover()?,
        };
        Ok(self.apply_overrides(base.apply_env()))
    }

    fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(model) = &self.model {
            settings.model = model.clone();
        }
        if let Some(max) = self.max_iterations {
            settings.max_iterations = max;
        }
        settings
    }

    /// The working directory, which must already exist.
    pub fn resolve_working_dir(&self) -> Result<PathBuf, ParleyError> {
        let dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        if !dir.is_dir() {
            return Err(ParleyError::Configuration(format!(
                "working directory {} does not exist",
                dir.display()
            )));
        }
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["parley", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
        assert_eq!(cli.global.verbose, 0);
    }

    #[test]
    fn parse_hello_world_quick_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "parley",
            "hello-world",
            "--quick",
            "-m",
            "anthropic:claude-3-5-sonnet-20241022",
            "-vv",
        ])
        .unwrap();

        match cli.command {
            Commands::HelloWorld(args) => assert!(args.quick),
            other => panic!("expected HelloWorld, got {other:?}"),
        }
        assert_eq!(
            cli.global.model.as_deref(),
            Some("anthropic:claude-3-5-sonnet-20241022")
        );
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn parse_inter_agent_pacing() {
        let cli = Cli::try_parse_from([
            "parley",
            "inter-agent",
            "--steps",
            "2",
            "--head-start",
            "0",
            "--step-pause",
            "1",
        ])
        .unwrap();

        let Commands::InterAgent(args) = cli.command else {
            panic!("expected InterAgent");
        };
        let mut timing = DemoTiming::default();
        args.apply(&mut timing);
        assert_eq!(
            timing,
            DemoTiming {
                conversation_steps: 2,
                head_start_secs: 0,
                step_pause_secs: 1,
                receive_timeout_secs: 5,
            }
        );
    }

    #[test]
    fn parse_simple_communication_defaults() {
        let cli = Cli::try_parse_from(["parley", "simple-communication"]).unwrap();
        let Commands::SimpleCommunication(args) = cli.command else {
            panic!("expected SimpleCommunication");
        };
        assert_eq!(args, ConversationArgs::default());
    }

    #[test]
    fn missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["parley"]).is_err());
    }

    #[test]
    fn flags_override_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parley.toml");
        std::fs::write(&path, "model = \"anthropic:from-file\"\nmax_iterations = 5\n").unwrap();
        let args = GlobalArgs {
            config: Some(path),
            max_iterations: Some(9),
            ..GlobalArgs::default()
        };

        let settings = args.apply_overrides(Settings::load(args.config.as_ref().unwrap()).unwrap());

        assert_eq!(settings.model, "anthropic:from-file");
        assert_eq!(settings.max_iterations, 9);
    }

    #[test]
    fn missing_working_dir_is_configuration_error() {
        let args = GlobalArgs {
            working_dir: Some(PathBuf::from("/definitely/not/here/parley")),
            ..GlobalArgs::default()
        };
        assert!(matches!(
            args.resolve_working_dir(),
            Err(ParleyError::Configuration(_))
        ));
    }
}
