//! Version control drivers
//!
//! - `GitDriver` - `git` command line
//! - `SvnDriver` - `svn` command line
//! - `VcDriverRegistry` - explicit name -> driver table, built once per run

mod git;
mod svn;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{CommandRunner, DependencyLine, DependencySyntax, VcDriver};
use crate::domain::value_objects::Dependency;
use crate::error::{WadfError, WadfResult};

pub use git::GitDriver;
pub use svn::SvnDriver;

/// `vc_type` value that disables version control integration
pub const VC_TYPE_NONE: &str = "none";

/// Where the application lives in version control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcLocation {
    /// `vc_base` macro
    pub base: String,
    pub appref: String,
}

impl VcLocation {
    pub fn new(base: impl Into<String>, appref: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            appref: appref.into(),
        }
    }
}

type BuildFn = fn(Arc<dyn CommandRunner>, VcLocation) -> Box<dyn VcDriver>;
type ParseFn = fn(&str) -> Option<Dependency>;

fn build_git(runner: Arc<dyn CommandRunner>, location: VcLocation) -> Box<dyn VcDriver> {
    Box::new(GitDriver::new(runner, location))
}

fn build_svn(runner: Arc<dyn CommandRunner>, location: VcLocation) -> Box<dyn VcDriver> {
    Box::new(SvnDriver::new(runner, location))
}

/// One registered driver
pub struct VcDriverEntry {
    pub name: &'static str,
    pub files_to_ignore: &'static [&'static str],
    build: BuildFn,
    parse: ParseFn,
}

/// Table of available drivers, looked up case-insensitively by name
pub struct VcDriverRegistry {
    runner: Arc<dyn CommandRunner>,
    entries: Vec<VcDriverEntry>,
}

impl VcDriverRegistry {
    /// Registry with every driver this crate ships
    pub fn standard(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            entries: vec![
                VcDriverEntry {
                    name: GitDriver::NAME,
                    files_to_ignore: GitDriver::IGNORED,
                    build: build_git,
                    parse: GitDriver::parse_dependency_line,
                },
                VcDriverEntry {
                    name: SvnDriver::NAME,
                    files_to_ignore: SvnDriver::IGNORED,
                    build: build_svn,
                    parse: SvnDriver::parse_dependency_line,
                },
            ],
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&VcDriverEntry> {
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.name).collect()
    }

    /// Build the driver named by `vc_type`.
    ///
    /// `None`, empty and `none` disable version control; any other unknown
    /// name is a configuration error.
    pub fn select(
        &self,
        vc_type: Option<&str>,
        location: VcLocation,
    ) -> WadfResult<Option<Box<dyn VcDriver>>> {
        let vc_type = match vc_type.map(str::trim) {
            None | Some("") => return Ok(None),
            Some(t) if t.eq_ignore_ascii_case(VC_TYPE_NONE) => return Ok(None),
            Some(t) => t,
        };
        match self.lookup(vc_type) {
            Some(entry) => Ok(Some((entry.build)(Arc::clone(&self.runner), location))),
            None => Err(WadfError::config(format!(
                "Version control plugin '{}' is not supported (available: {})",
                vc_type,
                self.names().join(", ")
            ))),
        }
    }

    /// Driver able to install `dependency`, if it is a VC dependency
    pub fn driver_for(
        &self,
        dependency: &Dependency,
        location: VcLocation,
    ) -> Option<Box<dyn VcDriver>> {
        self.lookup(dependency.type_name())
            .map(|entry| (entry.build)(Arc::clone(&self.runner), location))
    }

    /// Metadata names of every registered driver
    pub fn all_ignored_files(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = Vec::new();
        for entry in &self.entries {
            for name in entry.files_to_ignore {
                if !names.contains(name) {
                    names.push(name);
                }
            }
        }
        names
    }
}

impl DependencySyntax for VcDriverRegistry {
    fn parse_vc_line(&self, type_name: &str, rest: &str) -> DependencyLine {
        match self.lookup(type_name) {
            None => DependencyLine::UnknownType,
            Some(entry) => match (entry.parse)(rest) {
                Some(dep) => DependencyLine::Parsed(dep),
                None => DependencyLine::Malformed,
            },
        }
    }
}

/// What is currently at a dependency's target path
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TargetState {
    Absent,
    /// Exists but is not a working copy of this driver
    Foreign,
    /// `dirty` is set by local edits and by untracked files alike; files the
    /// VC tool ignores never count. Both drivers use this rule, for
    /// dependency installs and for `VcInfo::modifications`.
    WorkingCopy { url: String, dirty: bool },
}

/// Log why a dependency target is left alone; `true` if it may be touched
pub(crate) fn target_is_usable(
    state: &TargetState,
    driver: &str,
    url: &str,
    path: &Path,
) -> bool {
    match state {
        TargetState::Absent => true,
        TargetState::Foreign => {
            warn!(
                "Cannot deploy {} dependency {}; {} already exists but is not a working copy",
                driver,
                url,
                path.display()
            );
            false
        }
        TargetState::WorkingCopy { dirty: true, .. } => {
            let err = WadfError::DirtyWorkingCopy {
                path: path.to_path_buf(),
            };
            warn!("Cannot deploy {} dependency {}: {}", driver, url, err);
            false
        }
        TargetState::WorkingCopy { dirty: false, .. } => true,
    }
}

/// Move `dir` aside to `<dir>.wadf-backup-<timestamp>` and return the new path
pub(crate) fn backup_dir(dir: &Path) -> WadfResult<PathBuf> {
    let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
    let mut name = dir.as_os_str().to_os_string();
    name.push(format!(".wadf-backup-{}", stamp));
    let backup = PathBuf::from(name);
    fs::rename(dir, &backup).map_err(|e| WadfError::io_at(dir, e))?;
    info!("Moved {} to {}", dir.display(), backup.display());
    Ok(backup)
}
