//! TOML settings file for demo runs.
//!
//! ```toml
//! model = "anthropic:claude-sonnet-4-20250514"
//! max_iterations = 20
//!
//! [demo]
//! conversation_steps = 4
//! head_start_secs = 3
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ParleyError;

pub const DEFAULT_MODEL: &str = "anthropic:claude-sonnet-4-20250514";
pub const SETTINGS_FILE_NAME: &str = "parley.toml";

/// Settings shared by every demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Model selector in `provider:model` form.
    pub model: String,
    pub max_tokens: Option<u32>,
    /// Upper bound on model calls per `Conversation::run`.
    pub max_iterations: usize,
    /// Label attached to log lines for this run.
    pub service_id: Option<String>,
    pub demo: DemoTiming,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: None,
            max_iterations: 20,
            service_id: None,
            demo: DemoTiming::default(),
        }
    }
}

/// Pacing of the two-agent demos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoTiming {
    pub conversation_steps: usize,
    pub head_start_secs: u64,
    pub step_pause_secs: u64,
    /// Default wait of the receive tool when the model omits `timeout`.
    pub receive_timeout_secs: u64,
}

impl Default for DemoTiming {
    fn default() -> Self {
        Self {
            conversation_steps: 4,
            head_start_secs: 3,
            step_pause_secs: 2,
            receive_timeout_secs: 5,
        }
    }
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, ParleyError> {
        toml::from_str(raw)
            .map_err(|e| ParleyError::Configuration(format!("invalid settings: {e}")))
    }

    /// Load settings from an explicit file.
    pub fn load(path: &Path) -> Result<Self, ParleyError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ParleyError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded settings file");
        Self::from_toml_str(&raw)
    }

    /// Load `./parley.toml`, then the per-user config file, else defaults.
    pub fn discover() -> Result<Self, ParleyError> {
        for candidate in Self::candidate_paths() {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(SETTINGS_FILE_NAME)];
        if let Some(dirs) = directories::ProjectDirs::from("dev", "parley", "parley") {
            paths.push(dirs.config_dir().join(SETTINGS_FILE_NAME));
        }
        paths
    }

    /// Apply `PARLEY_MODEL` when set.
    pub fn apply_env(mut self) -> Self {
        if let Ok(model) = std::env::var("PARLEY_MODEL") {
            if !model.trim().is_empty() {
                self.model = model;
            }
        }
        self
    }
}
