//! Operator prompts for `%%` values

use dialoguer::{Input, Password};
use is_terminal::IsTerminal;

use crate::domain::ports::{InputPrompter, InputRequest};
use crate::error::{WadfError, WadfResult};

fn prompt_error(e: dialoguer::Error) -> WadfError {
    WadfError::Io(std::io::Error::other(e.to_string()))
}

/// Reads answers from the terminal; secret values are not echoed
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl InputPrompter for TerminalPrompter {
    fn prompt(&self, request: &InputRequest) -> WadfResult<Option<String>> {
        if !std::io::stdin().is_terminal() {
            return Ok(None);
        }
        let answer = if request.secret {
            Password::new()
                .with_prompt(&request.message)
                .allow_empty_password(true)
                .interact()
                .map_err(prompt_error)?
        } else {
            Input::<String>::new()
                .with_prompt(&request.message)
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_error)?
        };
        Ok(Some(answer))
    }
}

/// Never answers; used with `--non-interactive`
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractivePrompter;

impl InputPrompter for NonInteractivePrompter {
    fn prompt(&self, _request: &InputRequest) -> WadfResult<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_interactive_never_answers() {
        let request = InputRequest {
            name: "db1_pass".to_string(),
            message: "Password".to_string(),
            secret: true,
        };
        assert_eq!(NonInteractivePrompter.prompt(&request).unwrap(), None);
    }
}
