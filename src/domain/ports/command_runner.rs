//! Command Runner Port
//!
//! Every external tool (git, svn, mysql, pear, crontab, hook scripts) is
//! reached through this trait so the orchestration logic can be exercised
//! with scripted runners.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{WadfError, WadfResult};

/// An external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    /// File fed to the command's stdin
    pub stdin_file: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            stdin_file: None,
        }
    }

    /// `sh -c <script>`, for user-configured command lines
    pub fn shell(script: impl Into<String>) -> Self {
        Self::new("sh").arg("-c").arg(script)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.to_string_lossy().into_owned())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin_from(mut self, file: impl Into<PathBuf>) -> Self {
        self.stdin_file = Some(file.into());
        self
    }

    /// Short name for error messages, e.g. `git clone`
    pub fn label(&self) -> String {
        match self.args.first() {
            Some(first) if !first.starts_with('-') => format!("{} {}", self.program, first),
            _ => self.program.clone(),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) || arg.is_empty() {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` if killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }

    pub fn stdout_lines(&self) -> impl Iterator<Item = &str> {
        self.stdout.lines()
    }

    pub fn first_line(&self) -> Option<&str> {
        self.stdout.lines().next().map(str::trim).filter(|l| !l.is_empty())
    }
}

pub trait CommandRunner {
    /// Run to completion, capturing output
    fn run(&self, command: &CommandSpec) -> WadfResult<CommandOutput>;

    /// Run with the terminal attached (hook scripts); returns the exit code
    fn run_attached(&self, command: &CommandSpec) -> WadfResult<Option<i32>>;

    /// Run and turn a non-zero exit into [`WadfError::ExternalTool`]
    fn run_checked(&self, command: &CommandSpec) -> WadfResult<CommandOutput> {
        let output = self.run(command)?;
        if output.success() {
            Ok(output)
        } else {
            Err(WadfError::tool(command.label(), output.status, output.combined()))
        }
    }
}
