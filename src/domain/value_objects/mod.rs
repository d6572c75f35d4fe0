//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod dependency;
mod macro_ref;
mod revision;
mod vc_info;

pub use dependency::{Dependency, GitDependency, PearDependency, SvnDependency};
pub use macro_ref::{MacroRef, Modifier};
pub use revision::{RevType, RevisionSpec, HEAD, LATEST_TAG};
pub use vc_info::{VcIdentifier, VcInfo};
