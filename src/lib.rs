//! wadf - web application deployment framework
//!
//! Checks a web application out of version control, renders its
//! `.template` files from layered macro configuration, and sets up what it
//! needs around it: dependencies, databases, webserver vhost, hosts entries,
//! crontab and hook scripts.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    DeployOptions, DeployReport, DeployUseCase, MacroEntry, QueryUseCase, ResolvedText,
    UndeployOptions, UndeployReport,
};
pub use config::{ConfigLoader, LoaderOptions};
pub use domain::services::MacroEngine;
pub use domain::value_objects::RevisionSpec;
pub use error::{WadfError, WadfResult};
pub use infrastructure::{NonInteractivePrompter, SystemCommandRunner, TerminalPrompter};
