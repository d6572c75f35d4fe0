//! Deploy Result
//!
//! What a deploy or undeploy run did, for the summary printed at the end.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::entities::UnresolvedMacro;

/// Result of a deploy run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeployReport {
    pub instance: String,
    pub deploy_path: PathBuf,
    /// Identifier stored in `deploy_version`
    pub deploy_version: String,
    /// Output files written from templates
    pub rendered: Vec<PathBuf>,
    /// Dependencies left alone (local modifications, foreign directories)
    pub skipped_dependencies: Vec<String>,
    pub database_deployed: bool,
    /// Vhost config written, if any
    pub vhost_config: Option<PathBuf>,
    pub scheduled_jobs_deployed: bool,
    /// Files removed by `post_deploy_cleanup_files`
    pub cleaned_up: Vec<PathBuf>,
    /// Macros that never got a value, with where they were used
    pub unresolved: Vec<UnresolvedMacro>,
}

impl DeployReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty() && self.skipped_dependencies.is_empty()
    }
}

/// Result of an undeploy run
#[derive(Debug, Clone, Default, Serialize)]
pub struct UndeployReport {
    pub instance: String,
    pub deploy_path: PathBuf,
    pub database_removed: bool,
}
