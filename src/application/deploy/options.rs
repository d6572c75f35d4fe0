//! Deploy Options
//!
//! What the caller asks for on top of the loaded configuration.

use crate::domain::value_objects::RevisionSpec;

/// Options for a deploy run
#[derive(Debug, Clone)]
pub struct DeployOptions {
    /// Revision to check out; `tag/LATEST` is replaced by the newest tag
    pub revision: RevisionSpec,
    /// Create, grant and load the databases the templates refer to
    pub deploy_database: bool,
    /// Hook scripts see `DEPLOY_VERBOSITY=1`, and PEAR runs with `-v`
    pub verbose_hooks: bool,
    /// Macros forced on the command line, recorded in the instance file
    pub cmdline_macros: Vec<(String, String)>,
}

impl DeployOptions {
    pub fn new(revision: RevisionSpec) -> Self {
        Self {
            revision,
            deploy_database: false,
            verbose_hooks: false,
            cmdline_macros: Vec::new(),
        }
    }

    pub fn with_database(mut self, deploy_database: bool) -> Self {
        self.deploy_database = deploy_database;
        self
    }

    pub fn with_verbose_hooks(mut self, verbose: bool) -> Self {
        self.verbose_hooks = verbose;
        self
    }

    pub fn with_cmdline_macros(mut self, macros: Vec<(String, String)>) -> Self {
        self.cmdline_macros = macros;
        self
    }

    /// `DEPLOY_VERBOSITY` value for hook scripts
    pub fn hook_verbosity(&self) -> &'static str {
        if self.verbose_hooks {
            "1"
        } else {
            "0"
        }
    }
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self::new(RevisionSpec::trunk())
    }
}

/// Options for an undeploy run
#[derive(Debug, Clone, Default)]
pub struct UndeployOptions {
    /// Also revoke, drop or empty the databases
    pub remove_database: bool,
}

impl UndeployOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(mut self, remove_database: bool) -> Self {
        self.remove_database = remove_database;
        self
    }
}
