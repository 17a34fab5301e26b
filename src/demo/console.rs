//! Terminal rendering of conversation events.

use std::sync::Arc;

use crate::agent::{ConversationEvent, EventSink};

const PREVIEW_CHARS: usize = 200;

fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// One-line rendering of an event, or `None` for events not worth showing.
pub fn describe_event(event: &ConversationEvent) -> Option<String> {
    match event {
        ConversationEvent::AssistantText { agent, text } => {
            Some(format!("💬 [{agent}] {}", text.trim()))
        }
        ConversationEvent::ToolCallStarted { agent, call } => Some(format!(
            "⚡ [{agent}] {} {}",
            call.name,
            preview(&call.arguments.to_string())
        )),
        ConversationEvent::ToolResult { agent, result, .. } => {
            let body = match &result.result {
                serde_json::Value::String(s) => preview(s),
                other => preview(&other.to_string()),
            };
            let mark = if result.is_error { "❌" } else { "✅" };
            Some(format!("  {mark} [{agent}] {body}"))
        }
        ConversationEvent::Finished { .. } => None,
    }
}

/// Sink that prints every event to stdout.
pub fn console_sink() -> EventSink {
    Arc::new(|event: &ConversationEvent| {
        if let Some(line) = describe_event(event) {
            println!("{line}");
        }
    })
}
