//! Input Prompter Port
//!
//! Values configured as `%%` have to be typed in by the operator.

use crate::error::WadfResult;

/// A single value the operator is asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    /// Macro the answer is stored under
    pub name: String,
    /// Full prompt text
    pub message: String,
    /// Read without echo
    pub secret: bool,
}

/// Trait for asking the operator for values.
///
/// Implementations can be:
/// - `TerminalPrompter`: reads from the terminal
/// - `NonInteractivePrompter`: never answers, so the deployment stops
pub trait InputPrompter {
    /// `Ok(None)` means no answer can be obtained
    fn prompt(&self, request: &InputRequest) -> WadfResult<Option<String>>;
}
