//! Shared utility functions.
//!
//! - `process`: running external command-line tools and locating them in PATH

mod process;

pub use process::{check_binary, check_cmd_status, handle_cmd_output, ToolError};
