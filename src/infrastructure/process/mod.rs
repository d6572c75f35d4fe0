//! External process execution
//!
//! `SystemCommandRunner` is the only place in the crate that spawns
//! processes. Everything else builds a `CommandSpec` and goes through the
//! `CommandRunner` port, so tests can script the outcome instead.

use std::fs::File;
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use crate::domain::ports::{CommandOutput, CommandRunner, CommandSpec};
use crate::error::{WadfError, WadfResult};

/// Runs commands on the local machine with `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }

    fn build(&self, spec: &CommandSpec) -> WadfResult<Command> {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(dir) = &spec.cwd {
            command.current_dir(dir);
        }
        for (key, value) in &spec.env {
            command.env(key, value);
        }
        match &spec.stdin_file {
            Some(path) => {
                let file = File::open(path).map_err(|e| WadfError::io_at(path, e))?;
                command.stdin(Stdio::from(file));
            }
            None => {
                command.stdin(Stdio::null());
            }
        }
        Ok(command)
    }

    fn spawn_error(spec: &CommandSpec, err: std::io::Error) -> WadfError {
        WadfError::tool(spec.label(), None, format!("could not start '{}': {}", spec.program, err))
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, spec: &CommandSpec) -> WadfResult<CommandOutput> {
        debug!("Running: {}", spec);
        let output = self
            .build(spec)?
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Self::spawn_error(spec, e))?;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        trace!(status = ?result.status, "{}", result.combined().trim_end());
        Ok(result)
    }

    fn run_attached(&self, spec: &CommandSpec) -> WadfResult<Option<i32>> {
        debug!("Running (attached): {}", spec);
        let mut command = self.build(spec)?;
        if spec.stdin_file.is_none() {
            command.stdin(Stdio::inherit());
        }
        let status = command
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| Self::spawn_error(spec, e))?;
        Ok(status.code())
    }
}


#[cfg(test)]
pub(crate) mod scripted;
