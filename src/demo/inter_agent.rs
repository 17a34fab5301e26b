//! Two agents, two concurrent conversations, one shared set of mailboxes.
//!
//! Alice opens the conversation and Bob waits for her. Each agent runs in
//! its own tokio task: an opening prompt, then a fixed number of steps in
//! which it is asked to pick up messages from the other and reply. Alice
//! starts first so her opening message is waiting when Bob begins.
//!
//! Messages reach an agent in one of two ways (see [`DeliveryMode`]).

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info, info_span, Instrument};

use crate::agent::{Agent, EventSink};
use crate::config::DemoTiming;
use crate::error::ParleyError;
use crate::messaging::{Envelope, MailboxRegistry, MessagingTools, ToolNaming};
use crate::types::Usage;

use super::{rule, DemoContext};

pub const ALICE: &str = "Alice";
pub const BOB: &str = "Bob";

const DIRECT_SYSTEM_PROMPT: &str = "You are one of two agents collaborating through a messaging \
tool. Messages from the other agent are delivered to you as user turns. Keep replies friendly \
and concise.";

/// How messages reach an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Agents poll with a receive tool (`receive_messages_<id>`).
    ReceiveTool,
    /// The runner drains the mailbox between steps and hands the messages
    /// over as a user turn. Agents only have a plain `send_message` tool.
    Direct,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterAgentOptions {
    pub steps: usize,
    pub head_start: Duration,
    pub step_pause: Duration,
    pub receive_timeout: Duration,
    pub mode: DeliveryMode,
}

impl InterAgentOptions {
    pub fn from_timing(timing: &DemoTiming, mode: DeliveryMode) -> Self {
        Self {
            steps: timing.conversation_steps,
            head_start: Duration::from_secs(timing.head_start_secs),
            step_pause: Duration::from_secs(timing.step_pause_secs),
            receive_timeout: Duration::from_secs(timing.receive_timeout_secs),
            mode,
        }
    }

    fn title(&self) -> &'static str {
        match self.mode {
            DeliveryMode::ReceiveTool => "Inter-Agent Communication Demo",
            DeliveryMode::Direct => "Simple Agent Communication Demo",
        }
    }
}

/// Per-agent totals.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRun {
    pub id: String,
    /// Conversation runs completed (opening prompt plus steps).
    pub runs: usize,
    pub tool_calls: usize,
    pub usage: Usage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentFailure {
    pub id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterAgentReport {
    pub agents: Vec<AgentRun>,
    pub failures: Vec<AgentFailure>,
    /// Messages nobody picked up, per mailbox, sorted by identity.
    pub unread: Vec<(String, Vec<Envelope>)>,
}

impl InterAgentReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Participant {
    id: &'static str,
    other: &'static str,
    initiates: bool,
}

impl Participant {
    fn opening_prompt(&self, tools: &MessagingTools, mode: DeliveryMode) -> String {
        let Self { id, other, .. } = self;
        let mut prompt = match mode {
            DeliveryMode::ReceiveTool => format!(
                "Hello! You are Agent {id}. You have been given special tools to communicate with Agent {other}:\n\
                 - Use '{send}' to send messages to {other} (set recipient_id to \"{other}\")\n\
                 - Use '{recv}' to check for messages from {other}\n\n",
                send = tools.send_tool_name(),
                recv = tools.receive_tool_name(),
            ),
            DeliveryMode::Direct => format!(
                "Hello! You are Agent {id}. You have been given a special tool to communicate with Agent {other}:\n\
                 - Use '{send}' to send messages to {other} (set recipient_id to \"{other}\")\n\n",
                send = tools.send_tool_name(),
            ),
        };
        if self.initiates {
            prompt.push_str(&format!(
                "Your task is to start a collaborative conversation with {other} about planning a simple Python project. \
                 Begin by introducing yourself and asking {other} what kind of project they'd like to work on together."
            ));
        } else {
            prompt.push_str(&format!(
                "Your task is to collaborate with {other} on planning a Python project. Wait for {other} to contact you first, \
                 then engage in a friendly conversation about what kind of project you could build together. \
                 You're particularly interested in data analysis and visualization projects."
            ));
        }
        prompt
    }

    fn step_prompt(&self, tools: &MessagingTools, mode: DeliveryMode) -> String {
        let other = self.other;
        match mode {
            DeliveryMode::ReceiveTool => format!(
                "Please check for any messages from {other} using your {recv} tool, \
                 and if you receive any, respond appropriately using your {send} tool.",
                recv = tools.receive_tool_name(),
                send = tools.send_tool_name(),
            ),
            DeliveryMode::Direct => {
                let nudge = format!(
                    "Please continue your conversation with {other}. If you want to send a message, \
                     use the {send} tool with recipient_id set to '{other}'.",
                    send = tools.send_tool_name(),
                );
                match tools.take_pending() {
                    Some(delivery) => format!("{delivery}\n\n{nudge}"),
                    None => nudge,
                }
            }
        }
    }
}

fn build_agent(
    ctx: &DemoContext,
    participant: &Participant,
    tools: &MessagingTools,
    mode: DeliveryMode,
) -> Agent {
    match mode {
        DeliveryMode::ReceiveTool => ctx.stock_agent(participant.id).with_tools(tools.tools()),
        DeliveryMode::Direct => ctx
            .bare_agent(participant.id, DIRECT_SYSTEM_PROMPT)
            .with_tool(tools.send_tool()),
    }
}

async fn converse(
    participant: Participant,
    agent: Agent,
    tools: MessagingTools,
    options: InterAgentOptions,
    sink: Option<EventSink>,
) -> Result<AgentRun, ParleyError> {
    let id = participant.id;
    println!("\n🤖 Starting conversation for Agent {id}");
    println!("{}", rule(50));

    let mut conversation = agent.start_conversation();
    if let Some(sink) = sink {
        conversation = conversation.with_event_sink(sink);
    }
    let mut report = AgentRun {
        id: id.to_string(),
        runs: 0,
        tool_calls: 0,
        usage: Usage::default(),
    };

    conversation.send_message(participant.opening_prompt(&tools, options.mode));
    let outcome = conversation.run().await?;
    report.runs += 1;
    report.tool_calls += outcome.tool_calls;

    for step in 1..=options.steps {
        println!("\n📨 Agent {id} - Step {step}: Checking for messages and responding...");
        conversation.send_message(participant.step_prompt(&tools, options.mode));
        let outcome = conversation.run().await?;
        report.runs += 1;
        report.tool_calls += outcome.tool_calls;
        info!(step, tool_calls = outcome.tool_calls, "step finished");

        tokio::time::sleep(options.step_pause).await;
    }

    report.usage = conversation.usage();
    println!("✅ Agent {id} conversation completed");
    Ok(report)
}

fn spawn_participant(
    ctx: &DemoContext,
    registry: &MailboxRegistry,
    participant: Participant,
    options: &InterAgentOptions,
    sink: Option<EventSink>,
) -> Result<JoinHandle<Result<AgentRun, ParleyError>>, ParleyError> {
    let naming = match options.mode {
        DeliveryMode::ReceiveTool => ToolNaming::Scoped,
        DeliveryMode::Direct => ToolNaming::Plain,
    };
    let tools = MessagingTools::new(participant.id, registry.clone())?
        .with_naming(naming)
        .with_default_timeout(options.receive_timeout);
    let agent = build_agent(ctx, &participant, &tools, options.mode);
    let span = info_span!("agent", id = participant.id);

    Ok(tokio::spawn(
        converse(participant, agent, tools, options.clone(), sink).instrument(span),
    ))
}

/// Run both agents to completion and report what is left in the mailboxes.
///
/// A failing agent does not stop the other one; failures are collected in
/// the report.
pub async fn run(
    ctx: &DemoContext,
    options: InterAgentOptions,
    sink: Option<EventSink>,
) -> Result<InterAgentReport, ParleyError> {
    println!("🚀 Setting up {}", options.title());
    println!("{}", rule(60));

    let registry = MailboxRegistry::new();
    println!("👥 Creating Agent {ALICE} and Agent {BOB}...");

    let alice = Participant {
        id: ALICE,
        other: BOB,
        initiates: true,
    };
    let bob = Participant {
        id: BOB,
        other: ALICE,
        initiates: false,
    };

    println!("\n🎭 Starting parallel conversations...");
    let alice_task = spawn_participant(ctx, &registry, alice, &options, sink.clone())?;
    tokio::time::sleep(options.head_start).await;
    let bob_task = spawn_participant(ctx, &registry, bob, &options, sink)?;

    let mut agents = Vec::new();
    let mut failures = Vec::new();
    for (id, task) in [(ALICE, alice_task), (BOB, bob_task)] {
        let outcome = match task.await {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(join_error) => Err(format!("worker task aborted: {join_error}")),
        };
        match outcome {
            Ok(run) => agents.push(run),
            Err(error) => {
                error!(agent = id, %error, "agent conversation failed");
                failures.push(AgentFailure {
                    id: id.to_string(),
                    error,
                });
            }
        }
    }

    let report = InterAgentReport {
        agents,
        failures,
        unread: registry.drain_all(),
    };

    println!("\n{}", rule(60));
    println!("🎉 {} Completed!", options.title());
    println!("\n📊 Final Message Queue Status:");
    print!("{}", render_unread(&report.unread));
    Ok(report)
}

/// Mailbox summary printed at the end of a run.
pub fn render_unread(unread: &[(String, Vec<Envelope>)]) -> String {
    let mut out = String::new();
    for (id, messages) in unread {
        if messages.is_empty() {
            out.push_str(&format!("📭 {id} has no unread messages\n"));
            continue;
        }
        out.push_str(&format!("📬 {id} has {} unread messages:\n", messages.len()));
        for message in messages {
            out.push_str(&format!("   • {message}\n"));
        }
    }
    out
}
