//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `process/` - `SystemCommandRunner` (`std::process::Command`)
//! - `vc/` - version control drivers and their registry
//! - `config/` - INI and instance file formats
//! - `database/` - database server adapters
//! - `fs/` - home directory lookup and file walking
//! - `pear` - PEAR package manager
//! - `prompt` - operator input

pub mod config;
pub mod database;
pub mod fs;
pub mod pear;
pub mod process;
pub mod prompt;
pub mod vc;

// Re-export for convenience
pub use database::MysqlCli;
pub use pear::{PearManager, PearSettings};
pub use process::SystemCommandRunner;
pub use prompt::{NonInteractivePrompter, TerminalPrompter};
pub use vc::{GitDriver, SvnDriver, VcDriverRegistry, VcLocation};
