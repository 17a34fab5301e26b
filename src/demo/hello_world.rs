//! Single-agent demo: a linear, scripted conversation.

use tracing::info;

use crate::agent::{EventSink, RunOutcome};
use crate::error::ParleyError;
use crate::types::Usage;

use super::{rule, DemoContext};

const CREATE_HELLO_WORLD: &str = "Hello! Please create a simple Python file called 'hello_world.py' \
that prints 'Hello, World from Parley!' and then run it to show me the output.";

const WRITE_README: &str =
    "Great! Now please create a simple README.md file that explains what this hello world example does.";

const DATE_AND_FILES: &str = "Hello! Please tell me what the current date and time is, \
and also show me what files are in the current directory.";

const THEN_CREATE_HELLO_WORLD: &str = "Great! Now please create a simple Python file called \
'hello_world.py' that prints 'Hello, World from Parley!' and then run it to show me the output.";

/// The user turns sent, in order.
pub fn script(quick: bool) -> [&'static str; 2] {
    if quick {
        [DATE_AND_FILES, THEN_CREATE_HELLO_WORLD]
    } else {
        [CREATE_HELLO_WORLD, WRITE_README]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HelloWorldReport {
    pub runs: Vec<RunOutcome>,
    pub usage: Usage,
}

/// Send each scripted message and run the conversation after each one.
pub async fn run(
    ctx: &DemoContext,
    quick: bool,
    sink: Option<EventSink>,
) -> Result<HelloWorldReport, ParleyError> {
    println!("🤖 Setting up agent with {}...", ctx.provider().model_id());
    let agent = ctx.stock_agent("assistant");
    println!("✅ Agent created successfully!");

    let mut conversation = agent.start_conversation();
    if let Some(sink) = sink {
        conversation = conversation.with_event_sink(sink);
    }

    let mut runs = Vec::new();
    for (index, message) in script(quick).into_iter().enumerate() {
        if index == 0 {
            println!("\n🚀 Starting conversation...");
        } else {
            println!("\n🔄 Continuing conversation...");
        }
        println!("{}", rule(60));

        conversation.send_message(message);
        let outcome = conversation.run().await?;
        info!(step = index + 1, reason = %outcome.finish_reason, "hello-world step done");
        runs.push(outcome);

        println!("{}", rule(60));
        println!("✨ Conversation step {} completed!", index + 1);
    }

    println!(
        "\n🎉 All done! Check the files that were created in {}.",
        ctx.working_dir().display()
    );
    Ok(HelloWorldReport {
        runs,
        usage: conversation.usage(),
    })
}
