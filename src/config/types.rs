//! Loader options

use std::path::PathBuf;

use crate::infrastructure::fs::user_config_path;

/// Master config location when nothing else is given
pub const DEFAULT_MASTER_CONFIG: &str = "/etc/wadf/wadf.conf";

/// Environment variable naming the master config
pub const MASTER_CONFIG_ENV: &str = "WADF_MASTER_CONFIG";

/// Where configuration comes from for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    pub master_config: PathBuf,
    /// Per-user config; `None` skips it
    pub user_config: Option<PathBuf>,
    /// Caller-supplied macros, highest precedence, in command-line order
    pub overrides: Vec<(String, String)>,
    /// Value of the `cwd` macro; the process directory when unset
    pub cwd: Option<PathBuf>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            master_config: PathBuf::from(DEFAULT_MASTER_CONFIG),
            user_config: None,
            overrides: Vec::new(),
            cwd: None,
        }
    }
}

impl LoaderOptions {
    /// Defaults plus `WADF_MASTER_CONFIG` and `~/.wadf/config`
    pub fn from_env() -> Self {
        let master_config = std::env::var(MASTER_CONFIG_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MASTER_CONFIG));
        Self {
            master_config,
            user_config: user_config_path(),
            ..Self::default()
        }
    }

    pub fn with_master_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.master_config = path.into();
        self
    }

    pub fn with_user_config(mut self, path: Option<PathBuf>) -> Self {
        self.user_config = path;
        self
    }

    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((name.into(), value.into()));
        self
    }

    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.overrides.extend(overrides);
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Last override of `name`
    pub fn override_value(&self, name: &str) -> Option<&str> {
        self.overrides
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
