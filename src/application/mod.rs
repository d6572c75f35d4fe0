//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - Deploy and undeploy an application instance
//! - `QueryUseCase` - Tags, deployed instances, resolved macro values

pub mod deploy;
pub mod query;

pub use deploy::{DeployOptions, DeployReport, DeployUseCase, UndeployOptions, UndeployReport};
pub use query::{MacroEntry, QueryUseCase, ResolvedText};
