//! Stock tools given to every demo agent.
//!
//! `shell`, `read_file`, `write_file`, `list_directory` and `grep` operate on
//! the local machine. Relative paths and commands are anchored at the
//! agent's working directory (see [`ToolExecutionContext::working_dir`]).
//! Nothing here is sandboxed.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::process::Command;
use tracing::debug;

use crate::error::ParleyError;
use crate::tools::tool::{AgentTool, Tool, ToolExecutionContext};
use crate::tools::types::AgentToolParameters;

const SHELL_OUTPUT_MAX_BYTES: usize = 32_768;
const READ_FILE_MAX_BYTES: usize = 65_536;
const GREP_OUTPUT_MAX_BYTES: usize = 32_768;
const SHELL_TIMEOUT: Duration = Duration::from_secs(30);
const TRUNCATION_NOTE: &str = "\n... (truncated)";

fn truncate_utf8(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut cutoff = max_bytes;
    while cutoff > 0 && !s.is_char_boundary(cutoff) {
        cutoff -= 1;
    }
    &s[..cutoff]
}

/// Cap `text` at `max_bytes`, appending a note when anything was dropped.
fn capped(text: String, max_bytes: usize) -> (String, bool) {
    if text.len() <= max_bytes {
        return (text, false);
    }
    let mut out = truncate_utf8(&text, max_bytes).to_string();
    out.push_str(TRUNCATION_NOTE);
    (out, true)
}

fn command_in(program: &str, ctx: &ToolExecutionContext) -> Command {
    let mut cmd = Command::new(program);
    if let Some(dir) = &ctx.working_dir {
        cmd.current_dir(dir);
    }
    cmd.kill_on_drop(true);
    cmd
}

/// `shell`: run a command through `sh -c`, stdout and stderr combined.
pub fn shell_tool() -> Arc<dyn Tool> {
    shell_tool_with_timeout(SHELL_TIMEOUT)
}

fn shell_tool_with_timeout(limit: Duration) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "shell",
        "Execute a shell command in the working directory and return its output",
        AgentToolParameters::object()
            .string("command", "The shell command to execute", true)
            .build(),
        move |args, ctx: ToolExecutionContext| async move {
            let command = args.get_str("command")?;
            debug!(command, "shell tool");

            let output = tokio::time::timeout(
                limit,
                command_in("sh", &ctx).arg("-c").arg(command).output(),
            )
            .await
            .map_err(|_| ParleyError::Timeout(limit.as_millis() as u64))?
            .map_err(|e| ParleyError::tool("shell", e.to_string()))?;

            let combined = format!(
                "{}{}",
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
            let (text, truncated) = capped(combined, SHELL_OUTPUT_MAX_BYTES);

            Ok(json!({
                "exit_code": output.status.code(),
                "output": text,
                "truncated": truncated,
            }))
        },
    ))
}

/// `read_file`: UTF-8 contents, capped at 64 KiB.
pub fn read_file_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "read_file",
        "Read a file's contents as UTF-8 text",
        AgentToolParameters::object()
            .string("path", "Path to the file to read", true)
            .build(),
        |args, ctx: ToolExecutionContext| async move {
            let path = args.get_str("path")?;
            let resolved = ctx.resolve_path(path);

            let content = tokio::fs::read_to_string(&resolved)
                .await
                .map_err(|e| ParleyError::tool("read_file", format!("{path}: {e}")))?;

            let bytes = content.len();
            let (content, truncated) = capped(content, READ_FILE_MAX_BYTES);

            Ok(json!({
                "content": content,
                "bytes": bytes,
                "truncated": truncated,
            }))
        },
    ))
}

/// `write_file`: create or overwrite a file, making parent directories.
pub fn write_file_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "write_file",
        "Write content to a file, creating parent directories if needed",
        AgentToolParameters::object()
            .string("path", "Path to the file to write", true)
            .string("content", "Content to write to the file", true)
            .build(),
        |args, ctx: ToolExecutionContext| async move {
            let path = args.get_str("path")?;
            let content = args.get_str("content")?;
            let resolved = ctx.resolve_path(path);

            if let Some(parent) = resolved.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ParleyError::tool(
                        "write_file",
                        format!("failed to create directories for {path}: {e}"),
                    )
                })?;
            }

            tokio::fs::write(&resolved, content)
                .await
                .map_err(|e| ParleyError::tool("write_file", format!("{path}: {e}")))?;

            Ok(json!({
                "success": true,
                "path": resolved.display().to_string(),
                "bytes_written": content.len(),
            }))
        },
    ))
}

async fn directory_entries(dir: &Path) -> std::io::Result<Vec<serde_json::Value>> {
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let metadata = entry.metadata().await?;
        let kind = if metadata.is_dir() {
            "dir"
        } else if metadata.is_file() {
            "file"
        } else {
            "other"
        };
        entries.push((
            entry.file_name().to_string_lossy().into_owned(),
            kind,
            metadata.len(),
        ));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries
        .into_iter()
        .map(|(name, kind, size)| json!({ "name": name, "type": kind, "size": size }))
        .collect())
}

/// `list_directory`: sorted entries with `name`, `type` and `size`.
pub fn list_directory_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "list_directory",
        "List files and directories in a given path (defaults to the working directory)",
        AgentToolParameters::object()
            .string("path", "Path to the directory to list (defaults to '.')", false)
            .build(),
        |args, ctx: ToolExecutionContext| async move {
            let path = args.get_str_opt("path").unwrap_or(".");
            let entries = directory_entries(&ctx.resolve_path(path))
                .await
                .map_err(|e| ParleyError::tool("list_directory", format!("{path}: {e}")))?;

            Ok(json!({
                "path": path,
                "count": entries.len(),
                "entries": entries,
            }))
        },
    ))
}

/// `grep`: `grep -rn` over a file or directory.
pub fn grep_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "grep",
        "Search for a pattern in files using grep",
        AgentToolParameters::object()
            .string("pattern", "The pattern to search for", true)
            .string("path", "Directory or file to search in (defaults to '.')", false)
            .build(),
        |args, ctx: ToolExecutionContext| async move {
            let pattern = args.get_str("pattern")?;
            let path = args.get_str_opt("path").unwrap_or(".");

            let output = command_in("grep", &ctx)
                .arg("-rn")
                .arg("--")
                .arg(pattern)
                .arg(path)
                .output()
                .await
                .map_err(|e| ParleyError::tool("grep", e.to_string()))?;

            let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
            text.push_str(&String::from_utf8_lossy(&output.stderr));
            let (text, truncated) = capped(text, GREP_OUTPUT_MAX_BYTES);

            Ok(json!({
                "exit_code": output.status.code(),
                "output": text,
                "truncated": truncated,
            }))
        },
    ))
}

/// Every stock tool, in the order they are offered to the model.
pub fn all_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        shell_tool(),
        read_file_tool(),
        write_file_tool(),
        list_directory_tool(),
        grep_tool(),
    ]
}
