//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod command_runner;
pub mod database;
pub mod deploy_events;
pub mod prompter;
pub mod vc_driver;

pub use command_runner::{CommandOutput, CommandRunner, CommandSpec};
pub use database::{DatabaseAdmin, DbAccount, DbConnection};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink, TracingEventSink};
pub use prompter::{InputPrompter, InputRequest};
pub use vc_driver::{DependencyLine, DependencySyntax, VcDriver};
