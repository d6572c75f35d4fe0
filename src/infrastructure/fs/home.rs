//! Home directory resolution with test isolation support.
//!
//! `dirs::home_dir()` ignores `HOME` on some platforms, so tests point
//! `WADF_TEST_HOME` at a temporary directory instead.

use std::path::PathBuf;

/// Environment variable for test isolation of home directory.
pub const WADF_TEST_HOME_VAR: &str = "WADF_TEST_HOME";

/// Home directory used for `$HOME/.wadf/config` and the `home` macro.
///
/// `WADF_TEST_HOME` first, then `dirs::home_dir()`, then `HOME`.
pub fn wadf_home_dir() -> Option<PathBuf> {
    std::env::var(WADF_TEST_HOME_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .or_else(|| std::env::var("HOME").ok().map(PathBuf::from))
}

/// `~/.wadf/config`
pub fn user_config_path() -> Option<PathBuf> {
    wadf_home_dir().map(|h| h.join(".wadf").join("config"))
}
