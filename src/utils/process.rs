//! Helpers for invoking external tools (Poppler, ocrmypdf).

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Output};

use thiserror::Error;

/// Failure running an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("External tool not found: {0}")]
    NotFound(String),

    #[error("{tool} failed: {message}")]
    Failed { tool: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Locate a binary in PATH (or accept it as-is when given as a path).
pub fn check_binary(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Handle command output, extracting stdout on success.
pub fn handle_cmd_output(result: io::Result<Output>, tool: &str) -> Result<String, ToolError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                Err(ToolError::Failed {
                    tool: tool.to_string(),
                    message: failure_message(&output),
                })
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ToolError::NotFound(tool.to_string())),
        Err(e) => Err(ToolError::Io(e)),
    }
}

/// Check command status, returning the captured stderr on failure.
pub fn check_cmd_status(result: io::Result<Output>, tool: &str) -> Result<(), ToolError> {
    handle_cmd_output(result, tool).map(|_| ())
}

/// Best description of why a tool exited unsuccessfully.
fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        describe_status(output.status)
    } else {
        stderr.to_string()
    }
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exited with status {}", code),
        None => "terminated by signal".to_string(),
    }
}
