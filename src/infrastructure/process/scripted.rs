//! Scripted `CommandRunner` for unit tests

use std::sync::Mutex;

use crate::domain::ports::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::WadfResult;

/// Answers commands by rendered-prefix match; unmatched commands succeed
/// with empty output
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    responses: Vec<(String, CommandOutput)>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.responses.push((prefix.to_string(), output));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.specs().iter().map(ToString::to_string).collect()
    }

    pub(crate) fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn respond(&self, spec: &CommandSpec) -> CommandOutput {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }
        let rendered = spec.to_string();
        self.responses
            .iter()
            .find(|(prefix, _)| rendered.starts_with(prefix.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_else(|| CommandOutput::ok(""))
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, spec: &CommandSpec) -> WadfResult<CommandOutput> {
        Ok(self.respond(spec))
    }

    fn run_attached(&self, spec: &CommandSpec) -> WadfResult<Option<i32>> {
        Ok(self.respond(spec).status)
    }
}
