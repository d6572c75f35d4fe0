//! Error types for wadf
//!
//! Uses `thiserror` for library errors. Each variant family matches one kind
//! of failure a deployment can hit; the orchestrator decides which ones abort
//! the run and which ones only skip a unit of work.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wadf operations
pub type WadfResult<T> = Result<T, WadfError>;

/// Main error type for wadf operations
#[derive(Error, Debug)]
pub enum WadfError {
    /// Invalid option, unknown modifier, unknown driver type and friends
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Macros that never received a concrete value
    #[error("unresolved macros: {}", .macros.join(", "))]
    Unresolved { macros: Vec<String> },

    /// A macro is set to the `**` sentinel or needs input nobody can give
    #[error("the option '{name}' needs to be configured{}", notes_suffix(.notes))]
    RequiredInput { name: String, notes: String },

    /// An external command exited unsuccessfully
    #[error("{tool} failed ({status}){}", output_suffix(.output))]
    ExternalTool {
        tool: String,
        status: String,
        output: String,
    },

    /// A working copy has local modifications and must not be touched
    #[error("working copy at {path} has local modifications")]
    DirtyWorkingCopy { path: PathBuf },

    /// IO error with the path that caused it
    #[error("IO error on {path}: {source}")]
    IoPath {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WadfError {
    pub fn config(message: impl Into<String>) -> Self {
        WadfError::Config {
            message: message.into(),
        }
    }

    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WadfError::IoPath {
            path: path.into(),
            source,
        }
    }

    pub fn tool(tool: impl Into<String>, status: Option<i32>, output: impl Into<String>) -> Self {
        WadfError::ExternalTool {
            tool: tool.into(),
            status: match status {
                Some(code) => format!("exit code {}", code),
                None => "terminated by signal".to_string(),
            },
            output: output.into(),
        }
    }

    /// Errors that must stop the whole run rather than one step of it
    pub fn is_fatal(&self) -> bool {
        !matches!(self, WadfError::DirtyWorkingCopy { .. })
    }
}

fn notes_suffix(notes: &str) -> String {
    if notes.is_empty() {
        String::new()
    } else {
        format!(" (notes: {})", notes)
    }
}

fn output_suffix(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{}", trimmed)
    }
}
