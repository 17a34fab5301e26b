//! The single-agent demo against a scripted provider.

mod common;

use pretty_assertions::assert_eq;
use serde_json::json;

use common::{tool_results, MockProvider};
use parley::config::Settings;
use parley::demo::{hello_world, DemoContext};
use parley::types::Role;

#[tokio::test]
async fn hello_world_demo_writes_files_in_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockProvider::shared("mock");
    provider
        .queue_tool_call(
            "t1",
            "write_file",
            json!({"path": "hello_world.py", "content": "print('Hello, World from Parley!')\n"}),
        )
        .queue_tool_call("t2", "read_file", json!({"path": "hello_world.py"}))
        .queue_response("Created hello_world.py.")
        .queue_tool_call(
            "t3",
            "write_file",
            json!({"path": "README.md", "content": "# Hello World\n"}),
        )
        .queue_response("Added a README.");

    let ctx = DemoContext::with_provider(
        provider.clone(),
        Settings::default(),
        dir.path().to_path_buf(),
    );
    let report = hello_world::run(&ctx, false, None).await.unwrap();

    assert_eq!(report.runs.len(), 2);
    assert_eq!(report.runs[0].text, "Created hello_world.py.");
    assert_eq!(report.runs[0].tool_calls, 2);
    assert_eq!(report.runs[1].text, "Added a README.");
    assert!(dir.path().join("hello_world.py").is_file());
    assert!(dir.path().join("README.md").is_file());

    let requests = provider.requests();
    let read_back = &tool_results(&requests[2])[1];
    assert_eq!(read_back.tool_call_id, "t2");
    assert!(!read_back.is_error);
    assert!(read_back
        .result
        .to_string()
        .contains("Hello, World from Parley!"));

    let user_turns: Vec<String> = requests
        .last()
        .unwrap()
        .messages
        .iter()
        .filter(|m| m.role == Role::User)
        .map(|m| m.text())
        .collect();
    assert_eq!(user_turns, hello_world::script(false).to_vec());
}

#[tokio::test]
async fn quick_script_asks_about_the_directory_first() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MockProvider::shared("mock");
    provider
        .queue_tool_call("t1", "list_directory", json!({}))
        .queue_response("The directory is empty.");

    let ctx = DemoContext::with_provider(
        provider.clone(),
        Settings::default(),
        dir.path().to_path_buf(),
    );
    let report = hello_world::run(&ctx, true, None).await.unwrap();

    assert_eq!(report.runs.len(), 2);
    // The queue ran dry, so the second step gets the fallback reply.
    assert_eq!(report.runs[1].text, "Mock response");
    let first_user = provider.requests()[0]
        .messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| m.text())
        .unwrap();
    assert!(first_user.contains("current date and time"));
}
