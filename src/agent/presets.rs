//! Ready-made agents.

use std::path::PathBuf;
use std::sync::Arc;

use crate::provider::ModelProvider;
use crate::tools::builtin;

use super::agent::Agent;

const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a capable software assistant working from a command line. \
You can run shell commands, read and write files, list directories and search \
file contents with the tools provided. Work inside the current working \
directory unless asked otherwise. Prefer doing the task with your tools over \
describing how it could be done, and keep your replies short.";

/// The stock command-line agent: every builtin tool, anchored at `working_dir`.
///
/// Callers append extra tools with [`Agent::with_tool`].
pub fn default_agent(provider: Arc<dyn ModelProvider>, working_dir: impl Into<PathBuf>) -> Agent {
    let working_dir = working_dir.into();
    let prompt = format!(
        "{DEFAULT_SYSTEM_PROMPT}\n\nCurrent working directory: {}",
        working_dir.display()
    );
    Agent::new(provider)
        .with_system_prompt(prompt)
        .with_tools(builtin::all_tools())
        .with_working_dir(working_dir)
}
