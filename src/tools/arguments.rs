//! Typed access to tool call arguments.

use crate::error::ParleyError;

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, ParleyError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| ParleyError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an integer argument, as leniently as [`get_i64_opt`](Self::get_i64_opt).
    pub fn get_i64(&self, key: &str) -> Result<i64, ParleyError> {
        self.get_i64_opt(key)
            .ok_or_else(|| ParleyError::InvalidArgument(format!("Missing integer argument: {key}")))
    }

    /// Optional integer. Models sometimes send whole numbers as floats or
    /// strings, so `5.0` and `"5"` are accepted too.
    pub fn get_i64_opt(&self, key: &str) -> Option<i64> {
        match self.value.get(key)? {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
