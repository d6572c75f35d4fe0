//! Test environment builder for isolated wadf runs.
//!
//! Every `TestEnv` has its own master config, home directory (through
//! `WADF_TEST_HOME`) and a deployment root that `deploy_path` points into.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use wadf::{ConfigLoader, LoaderOptions};

/// Result of running the wadf binary
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

pub struct TestEnv {
    pub root: TempDir,
}

impl TestEnv {
    /// Empty environment; call `master_config` before loading anything
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        std::fs::create_dir_all(root.path().join("home")).expect("Failed to create home");
        std::fs::create_dir_all(root.path().join("srv")).expect("Failed to create srv");
        Self { root }
    }

    /// Environment whose master config deploys `<root>/srv/<instance>`
    /// without version control, plus `extra` config lines in `globals`
    pub fn local(extra: &str) -> Self {
        let env = Self::new();
        env.master_config(&format!(
            "[globals]\nvc_type = none\ninstance = @appref@\ndeploy_path = {}/@instance@\nlocal_config = @deploy_path@/wadf.conf\n{}",
            env.path("srv").display(),
            extra
        ));
        env
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.path().join(relative)
    }

    pub fn master_config_path(&self) -> PathBuf {
        self.path("wadf.conf")
    }

    pub fn master_config(&self, content: &str) {
        self.write("wadf.conf", content);
    }

    /// Deployment directory of `instance`
    pub fn app_dir(&self, instance: &str) -> PathBuf {
        self.path("srv").join(instance)
    }

    /// Write a file below the environment root, creating parents
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let full = self.path(relative);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&full, content).expect("Failed to write file");
        full
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    pub fn loader(&self) -> ConfigLoader {
        self.loader_with(&[])
    }

    pub fn loader_with(&self, overrides: &[(&str, &str)]) -> ConfigLoader {
        ConfigLoader::new(
            LoaderOptions::default()
                .with_master_config(self.master_config_path())
                .with_user_config(Some(self.path("home/.wadf/config")))
                .with_cwd(self.root.path())
                .with_overrides(overrides.iter().map(|(k, v)| (k.to_string(), v.to_string()))),
        )
    }

    /// Run the wadf binary against this environment
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_from(self.root.path(), args)
    }

    pub fn run_from(&self, cwd: &Path, args: &[&str]) -> TestResult {
        let output = Command::new(env!("CARGO_BIN_EXE_wadf"))
            .current_dir(cwd)
            .args(args)
            .env("WADF_MASTER_CONFIG", self.master_config_path())
            .env("WADF_TEST_HOME", self.path("home"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute wadf");

        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
