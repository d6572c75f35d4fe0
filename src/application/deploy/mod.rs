//! Deploy Module
//!
//! Orchestrates the deployment and undeployment of one application
//! instance.
//!
//! ## Structure
//!
//! - `options` - What the caller asks for (`DeployOptions`, `UndeployOptions`)
//! - `result` - What a run did (`DeployReport`, `UndeployReport`)
//! - `use_case` - Step sequencing (`DeployUseCase`)
//! - `steps/` - One module per step
//!
//! ## Usage
//!
//! ```ignore
//! use wadf::application::deploy::{DeployOptions, DeployUseCase};
//!
//! let use_case = DeployUseCase::new(loader, runner);
//! let report = use_case.deploy("shop", &DeployOptions::default())?;
//! ```

mod options;
mod result;
mod steps;
mod use_case;

pub use options::{DeployOptions, UndeployOptions};
pub use result::{DeployReport, UndeployReport};
pub use steps::vhost::list_deployed;
pub use use_case::DeployUseCase;
