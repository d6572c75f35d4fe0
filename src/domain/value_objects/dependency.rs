//! Dependency declarations from a dependency-tags file
//!
//! One variant per dependency source. VC variants are produced by the
//! matching driver's line parser; `Pear` is handled by the tags-file parser
//! itself.

use std::fmt;
use std::path::PathBuf;

use super::revision::RevisionSpec;

/// A PEAR package pinned to a version (`channel/Package-1.2.3`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PearDependency {
    /// Package name including its channel prefix
    pub name: String,
    pub version: String,
}

impl PearDependency {
    /// Split `channel/Package-1.2.3` at the first `-`
    pub fn parse(text: &str) -> Option<Self> {
        let (name, version) = text.trim().split_once('-')?;
        if name.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            version: version.to_string(),
        })
    }

    /// `name-version`, the form package managers accept
    pub fn spec(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }
}

/// A Git repository checked out into the deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitDependency {
    pub url: String,
    pub revision: RevisionSpec,
    /// Relative to the deployment directory
    pub dest_path: PathBuf,
}

/// A Subversion URL checked out into the deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvnDependency {
    pub url: String,
    pub revision: String,
    /// Relative to the deployment directory
    pub dest_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dependency {
    Pear(PearDependency),
    Git(GitDependency),
    Svn(SvnDependency),
}

impl Dependency {
    /// Identifier of the dependency type, as written in a tags file
    pub fn type_name(&self) -> &'static str {
        match self {
            Dependency::Pear(_) => "PEAR",
            Dependency::Git(_) => "Git",
            Dependency::Svn(_) => "SVN",
        }
    }

    pub fn dest_path(&self) -> Option<&PathBuf> {
        match self {
            Dependency::Pear(_) => None,
            Dependency::Git(d) => Some(&d.dest_path),
            Dependency::Svn(d) => Some(&d.dest_path),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Pear(d) => write!(f, "PEAR:{}", d.spec()),
            Dependency::Git(d) => write!(f, "Git:{} ({}) -> {}", d.url, d.revision, d.dest_path.display()),
            Dependency::Svn(d) => write!(f, "SVN:{}@{} -> {}", d.url, d.revision, d.dest_path.display()),
        }
    }
}
