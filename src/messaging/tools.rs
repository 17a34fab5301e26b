//! Send and receive tools bound to one agent identity.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ParleyError;
use crate::tools::{AgentTool, AgentToolParameters, Tool, ToolAnnotations};

use super::mailbox::{Envelope, MailboxRegistry};

/// Longest wait the receive tool accepts, in seconds.
pub const MAX_RECEIVE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(5);

fn agent_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]{1,40}$").expect("agent id validation regex must compile")
    })
}

/// Identities end up inside tool names, so they are restricted to
/// characters every provider accepts there.
pub fn validate_agent_id(id: &str) -> Result<(), ParleyError> {
    if agent_id_pattern().is_match(id) {
        Ok(())
    } else {
        Err(ParleyError::InvalidArgument(format!(
            "agent id '{id}' must be 1-40 characters of letters, digits, '_' or '-'"
        )))
    }
}

/// How messaging tools are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolNaming {
    /// `send_message_<id>` / `receive_messages_<id>`.
    #[default]
    Scoped,
    /// `send_message` / `receive_messages`.
    Plain,
}

/// What the send tool reports back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageObservation {
    pub success: bool,
    pub message: String,
    pub recipient: String,
    pub sender: String,
}

/// What the receive tool reports back to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveMessagesObservation {
    pub success: bool,
    pub messages: Vec<String>,
    pub count: usize,
    pub recipient: String,
    pub message: String,
}

impl ReceiveMessagesObservation {
    fn from_batch(recipient: &str, batch: &[Envelope]) -> Self {
        let messages: Vec<String> = batch.iter().map(Envelope::to_string).collect();
        let message = if messages.is_empty() {
            "No messages received".to_string()
        } else {
            bulleted(&format!("Received {} message(s):", messages.len()), &messages)
        };
        Self {
            success: true,
            count: messages.len(),
            messages,
            recipient: recipient.to_string(),
            message,
        }
    }
}

fn bulleted(header: &str, lines: &[String]) -> String {
    let mut out = header.to_string();
    for line in lines {
        out.push_str("\n• ");
        out.push_str(line);
    }
    out
}

/// Text injected as a user turn when messages are handed to an agent
/// directly instead of through the receive tool.
pub fn format_delivery(batch: &[Envelope]) -> String {
    let lines: Vec<String> = batch.iter().map(Envelope::to_string).collect();
    bulleted(
        &format!("You have received {} message(s):", lines.len()),
        &lines,
    )
}

/// Factory for the messaging tools of one agent.
#[derive(Debug, Clone)]
pub struct MessagingTools {
    agent_id: String,
    registry: MailboxRegistry,
    naming: ToolNaming,
    default_timeout: Duration,
}

impl MessagingTools {
    /// Bind tools to `agent_id`, creating its mailbox.
    pub fn new(
        agent_id: impl Into<String>,
        registry: MailboxRegistry,
    ) -> Result<Self, ParleyError> {
        let agent_id = agent_id.into();
        validate_agent_id(&agent_id)?;
        registry.mailbox(&agent_id);
        Ok(Self {
            agent_id,
            registry,
            naming: ToolNaming::default(),
            default_timeout: DEFAULT_RECEIVE_TIMEOUT,
        })
    }

    pub fn with_naming(mut self, naming: ToolNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Wait used when the model calls receive without a `timeout`.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout.min(Duration::from_secs(MAX_RECEIVE_TIMEOUT_SECS));
        self
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub fn send_tool_name(&self) -> String {
        match self.naming {
            ToolNaming::Scoped => format!("send_message_{}", self.agent_id),
            ToolNaming::Plain => "send_message".to_string(),
        }
    }

    pub fn receive_tool_name(&self) -> String {
        match self.naming {
            ToolNaming::Scoped => format!("receive_messages_{}", self.agent_id),
            ToolNaming::Plain => "receive_messages".to_string(),
        }
    }

    pub fn send_tool(&self) -> Arc<dyn Tool> {
        let sender = self.agent_id.clone();
        let registry = self.registry.clone();
        let annotations = ToolAnnotations {
            title: Some(format!("Send Message ({})", self.agent_id)),
            read_only_hint: false,
            destructive_hint: false,
            idempotent_hint: false,
            open_world_hint: true,
        };

        Arc::new(
            AgentTool::new(
                self.send_tool_name(),
                "Send a message to another agent. \
                 Use this to communicate with other agents in the system.",
                AgentToolParameters::object()
                    .string("recipient_id", "The ID of the recipient agent", true)
                    .string("message", "The message to send", true)
                    .build(),
                move |args, _ctx| {
                    let sender = sender.clone();
                    let registry = registry.clone();
                    async move {
                        let recipient = args.get_str("recipient_id")?.trim();
                        let text = args.get_str("message")?;
                        validate_agent_id(recipient)?;

                        registry.send(&sender, recipient, text);
                        info!(from = %sender, to = recipient, "message sent");

                        let observation = SendMessageObservation {
                            success: true,
                            message: format!("Message sent to {recipient}: {text}"),
                            recipient: recipient.to_string(),
                            sender,
                        };
                        Ok(serde_json::to_value(observation)?)
                    }
                },
            )
            .with_annotations(annotations),
        )
    }

    pub fn receive_tool(&self) -> Arc<dyn Tool> {
        let owner = self.agent_id.clone();
        let registry = self.registry.clone();
        let default_secs = self.default_timeout.as_secs() as i64;
        let annotations = ToolAnnotations {
            title: Some(format!("Receive Messages ({})", self.agent_id)),
            read_only_hint: true,
            destructive_hint: false,
            idempotent_hint: false,
            open_world_hint: true,
        };

        Arc::new(
            AgentTool::new(
                self.receive_tool_name(),
                "Check for incoming messages from other agents. \
                 Use this to see if other agents have sent you any messages.",
                AgentToolParameters::object()
                    .integer(
                        "timeout",
                        format!(
                            "Seconds to wait for messages \
                             (default {default_secs}, max {MAX_RECEIVE_TIMEOUT_SECS})"
                        ),
                        false,
                    )
                    .build(),
                move |args, _ctx| {
                    let owner = owner.clone();
                    let mailbox = registry.mailbox(&owner);
                    async move {
                        let secs = args
                            .get_i64_opt("timeout")
                            .unwrap_or(default_secs)
                            .clamp(0, MAX_RECEIVE_TIMEOUT_SECS as i64) as u64;
                        debug!(agent = %owner, secs, "waiting for messages");

                        let batch = mailbox.recv_timeout(Duration::from_secs(secs)).await;
                        if !batch.is_empty() {
                            info!(agent = %owner, count = batch.len(), "messages received");
                        }

                        let observation = ReceiveMessagesObservation::from_batch(&owner, &batch);
                        Ok(serde_json::to_value(observation)?)
                    }
                },
            )
            .with_annotations(annotations),
        )
    }

    /// Both tools, send first.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![self.send_tool(), self.receive_tool()]
    }

    /// Drain this agent's mailbox for direct delivery.
    ///
    /// Returns `None` when nothing is waiting.
    pub fn take_pending(&self) -> Option<String> {
        let batch = self.registry.mailbox(&self.agent_id).try_recv_all();
        (!batch.is_empty()).then(|| format_delivery(&batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolArguments, ToolExecutionContext};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args(value: serde_json::Value) -> ToolArguments {
        ToolArguments::new(value)
    }

    #[test]
    fn agent_ids_are_checked() {
        for ok in ["Alice", "bob_2", "agent-x", &"a".repeat(40)] {
            assert!(validate_agent_id(ok).is_ok(), "{ok}");
        }
        for bad in ["", "has space", "dot.name", "émile", &"a".repeat(41)] {
            assert!(validate_agent_id(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn new_rejects_bad_id_and_creates_mailbox() {
        let registry = MailboxRegistry::new();
        assert!(MessagingTools::new("not valid", registry.clone()).is_err());

        MessagingTools::new("Alice", registry.clone()).unwrap();
        assert!(registry.contains("Alice"));
    }

    #[test]
    fn tool_names_follow_naming_mode() {
        let registry = MailboxRegistry::new();
        let scoped = MessagingTools::new("Alice", registry.clone()).unwrap();
        assert_eq!(scoped.send_tool_name(), "send_message_Alice");
        assert_eq!(scoped.receive_tool_name(), "receive_messages_Alice");

        let plain = scoped.with_naming(ToolNaming::Plain);
        let names: Vec<String> = plain.tools().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, vec!["send_message", "receive_messages"]);
    }

    #[test]
    fn annotations_mark_receive_read_only() {
        let tools = MessagingTools::new("Bob", MailboxRegistry::new()).unwrap();

        let send = tools.send_tool();
        let receive = tools.receive_tool();

        let send_hints = send.annotations().unwrap();
        assert!(!send_hints.read_only_hint);
        assert!(send_hints.open_world_hint);
        assert_eq!(send_hints.title.as_deref(), Some("Send Message (Bob)"));
        assert!(receive.annotations().unwrap().read_only_hint);
    }

    #[tokio::test]
    async fn send_queues_tagged_message_for_recipient() {
        let registry = MailboxRegistry::new();
        let alice = MessagingTools::new("Alice", registry.clone()).unwrap();

        let result = alice
            .send_tool()
            .execute(
                &args(json!({"recipient_id": "Bob", "message": "Hi Bob!"})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap();

        let observation: SendMessageObservation = serde_json::from_value(result).unwrap();
        assert_eq!(
            observation,
            SendMessageObservation {
                success: true,
                message: "Message sent to Bob: Hi Bob!".into(),
                recipient: "Bob".into(),
                sender: "Alice".into(),
            }
        );
        let queued = registry.mailbox("Bob").try_recv_all();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].to_string(), "[From Alice]: Hi Bob!");
    }

    #[tokio::test]
    async fn sending_to_self_is_allowed() {
        let registry = MailboxRegistry::new();
        let alice = MessagingTools::new("Alice", registry.clone()).unwrap();

        alice
            .send_tool()
            .execute(
                &args(json!({"recipient_id": "Alice", "message": "note to self"})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(registry.mailbox("Alice").len(), 1);
    }

    #[tokio::test]
    async fn send_rejects_malformed_recipient() {
        let alice = MessagingTools::new("Alice", MailboxRegistry::new()).unwrap();

        let err = alice
            .send_tool()
            .execute(
                &args(json!({"recipient_id": "Bob Smith", "message": "hi"})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ParleyError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn receive_returns_all_queued_messages() {
        let registry = MailboxRegistry::new();
        let bob = MessagingTools::new("Bob", registry.clone()).unwrap();
        registry.send("Alice", "Bob", "one");
        registry.send("Alice", "Bob", "two");

        let result = bob
            .receive_tool()
            .execute(&args(json!({"timeout": 1})), &ToolExecutionContext::default())
            .await
            .unwrap();

        let observation: ReceiveMessagesObservation = serde_json::from_value(result).unwrap();
        assert_eq!(observation.count, 2);
        assert_eq!(
            observation.messages,
            vec!["[From Alice]: one", "[From Alice]: two"]
        );
        assert_eq!(
            observation.message,
            "Received 2 message(s):\n• [From Alice]: one\n• [From Alice]: two"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn receive_uses_default_timeout_when_omitted() {
        let bob = MessagingTools::new("Bob", MailboxRegistry::new())
            .unwrap()
            .with_default_timeout(Duration::from_secs(2));
        let started = tokio::time::Instant::now();

        let result = bob
            .receive_tool()
            .execute(&args(json!({})), &ToolExecutionContext::default())
            .await
            .unwrap();

        assert_eq!(result["count"], 0);
        assert_eq!(result["message"], "No messages received");
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn receive_clamps_timeout() {
        let bob = MessagingTools::new("Bob", MailboxRegistry::new()).unwrap();
        let started = tokio::time::Instant::now();

        bob.receive_tool()
            .execute(&args(json!({"timeout": 3600})), &ToolExecutionContext::default())
            .await
            .unwrap();
        assert_eq!(started.elapsed(), Duration::from_secs(MAX_RECEIVE_TIMEOUT_SECS));

        let started = tokio::time::Instant::now();
        bob.receive_tool()
            .execute(&args(json!({"timeout": -4})), &ToolExecutionContext::default())
            .await
            .unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[test]
    fn direct_delivery_drains_and_formats_mailbox() {
        let registry = MailboxRegistry::new();
        let bob = MessagingTools::new("Bob", registry.clone()).unwrap();
        assert_eq!(bob.take_pending(), None);

        registry.send("Alice", "Bob", "Hello Bob");
        registry.send("Alice", "Bob", "Still there?");

        assert_eq!(
            bob.take_pending().as_deref(),
            Some(
                "You have received 2 message(s):\n\
                 • [From Alice]: Hello Bob\n\
                 • [From Alice]: Still there?"
            )
        );
        assert!(registry.mailbox("Bob").is_empty());
    }
}
