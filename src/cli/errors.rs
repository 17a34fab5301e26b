//! User-facing error formatting.

use crate::error::{ErrorCategory, ParleyError};

/// Map a [`ParleyError`] to a message with actionable guidance.
pub fn format_error_help(err: &ParleyError) -> String {
    match err {
        ParleyError::MissingCredential { env_var, .. } => format!(
            "{env_var} environment variable is not set. Export it or add it to a .env file:\n  \
             export {env_var}='your-api-key-here'"
        ),
        ParleyError::Authentication(msg) => {
            format!("Authentication failed: {msg}. Check that ANTHROPIC_API_KEY is valid.")
        }
        ParleyError::Configuration(msg) => {
            format!("Configuration error: {msg}. Check parley.toml or the command-line flags.")
        }
        ParleyError::ModelNotFound(msg) => {
            format!("{msg} Pass --model anthropic:<model-id> or set PARLEY_MODEL.")
        }
        other if other.category() == ErrorCategory::RateLimit => {
            format!(
                "{other}. The API is throttling requests; \
                 wait a moment and run the demo again."
            )
        }
        other => other.to_string(),
    }
}
