//! Scripts run around a deployment: kickstart, post-deploy, webserver
//! restart, and removal of files the application asks to clean up

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace, warn};

use crate::application::deploy::options::DeployOptions;
use crate::application::deploy::use_case::DeployUseCase;
use crate::domain::ports::CommandSpec;
use crate::domain::services::MacroEngine;
use crate::error::{WadfError, WadfResult};

const FORCE_REMOVE: char = '+';

impl DeployUseCase {
    /// Run `kickstart_script` from its own directory
    pub(crate) fn run_kickstart(
        &self,
        engine: &mut MacroEngine,
        options: &DeployOptions,
    ) -> WadfResult<()> {
        let Some(script) = engine.get("kickstart_script")? else {
            self.skip("kickstart", "kickstart_script not set");
            return Ok(());
        };
        let script = PathBuf::from(script);
        if !script.is_file() {
            debug!("Kickstart script {} does not exist; nothing to do.", script.display());
            self.skip("kickstart", "script not found");
            return Ok(());
        }

        let script = fs::canonicalize(&script).unwrap_or(script);
        info!("Running kickstart script {}...", script.display());
        let mut spec = CommandSpec::new(script.to_string_lossy())
            .env("DEPLOY_INITDB", if options.deploy_database { "1" } else { "0" })
            .env("DEPLOY_VERBOSITY", options.hook_verbosity());
        if let Some(parent) = script.parent().filter(|p| !p.as_os_str().is_empty()) {
            spec = spec.current_dir(parent);
        }
        self.run_hook("kickstart script", &spec)
    }

    pub(crate) fn post_deploy(
        &self,
        engine: &mut MacroEngine,
        options: &DeployOptions,
    ) -> WadfResult<()> {
        let Some(cmd) = engine.get("post_deploy_script")? else {
            return Ok(());
        };
        info!("Running post-deploy script \"{}\"...", cmd);
        let spec = CommandSpec::shell(cmd).env("DEPLOY_VERBOSITY", options.hook_verbosity());
        self.run_hook("post-deploy script", &spec)
    }

    pub(crate) fn restart_webserver(&self, engine: &mut MacroEngine) -> WadfResult<()> {
        let Some(cmd) = engine.get("webserver_restart_cmd")? else {
            self.skip("restart", "webserver_restart_cmd not set");
            return Ok(());
        };
        info!("Restarting webserver...");
        self.run_hook("webserver restart", &CommandSpec::shell(cmd))
    }

    /// Remove the files listed in `post_deploy_cleanup_files`; returns the
    /// files removed
    pub(crate) fn cleanup_files(
        &self,
        engine: &mut MacroEngine,
        dir: &Path,
    ) -> WadfResult<Vec<PathBuf>> {
        let Some(files) = engine.get("post_deploy_cleanup_files")? else {
            return Ok(Vec::new());
        };
        debug!("Cleaning up special files...");
        trace!("Files to clean up are {}", files);

        let mut removed = Vec::new();
        for entry in files.split_whitespace() {
            let (name, force) = match entry.strip_prefix(FORCE_REMOVE) {
                Some(rest) => (rest, true),
                None => (entry, false),
            };
            if name.is_empty() {
                continue;
            }
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            let template = dir.join(format!("{}.template", name));
            if force || template.is_file() {
                debug!("  Removing {}", path.display());
                fs::remove_file(&path).map_err(|e| WadfError::io_at(&path, e))?;
                removed.push(path);
            }
        }
        Ok(removed)
    }

    /// Hooks run with the terminal attached; a failure is only a warning
    fn run_hook(&self, what: &str, spec: &CommandSpec) -> WadfResult<()> {
        info!("---------- OUTPUT BELOW IS FROM {}, NOT WADF ----------", what.to_uppercase());
        let status = self.runner.run_attached(spec)?;
        info!("---------- END OF {} OUTPUT ----------", what.to_uppercase());
        match status {
            Some(0) => Ok(()),
            Some(code) => {
                warn!("The {} exited with status {}", what, code);
                Ok(())
            }
            None => {
                warn!("The {} was terminated by a signal", what);
                Ok(())
            }
        }
    }
}
