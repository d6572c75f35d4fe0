//! Version Control Driver Port
//!
//! One implementation per version-control system. The orchestrator only
//! sees this trait; drivers are picked by name from a registry.

use std::path::{Path, PathBuf};

use crate::domain::value_objects::{Dependency, RevisionSpec, VcInfo};
use crate::error::WadfResult;

pub trait VcDriver {
    /// Registry name, e.g. `Git`
    fn name(&self) -> &'static str;

    /// Create a fresh working copy at `dest`, which must not exist
    fn checkout(&self, revision: &RevisionSpec, dest: &Path) -> WadfResult<()>;

    /// Move the existing working copy at `dest` to `revision`
    fn switch_ver(&self, revision: &RevisionSpec, dest: &Path) -> WadfResult<()>;

    /// Tags of the application, in repository order
    fn list_tags(&self) -> WadfResult<Vec<String>>;

    /// Human-readable description of `revision`, for logging
    fn label(&self, revision: &RevisionSpec) -> String;

    /// State of the working copy at `dir`; `None` if it is not one of ours
    fn read_vc_info(&self, dir: &Path) -> WadfResult<Option<VcInfo>>;

    /// Parse the driver-specific part of a dependency-tags line
    fn parse_dependency(&self, line: &str) -> Option<Dependency>;

    /// Check out or update a dependency under `deploy_dir`.
    ///
    /// Returns the path it now lives at, or `None` if it was skipped
    /// (local modifications, or a directory that belongs to something else).
    fn install_dependency(&self, dependency: &Dependency, deploy_dir: &Path)
        -> WadfResult<Option<PathBuf>>;

    /// Metadata entries (`.git`, `.svn`) that file listings must skip
    fn files_to_ignore(&self) -> &'static [&'static str];
}

/// Outcome of parsing one dependency-tags line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyLine {
    Parsed(Dependency),
    /// The type is known but the rest of the line is not valid for it
    Malformed,
    UnknownType,
}

/// Lookup of VC dependency parsers by type name
pub trait DependencySyntax {
    fn parse_vc_line(&self, type_name: &str, rest: &str) -> DependencyLine;
}
