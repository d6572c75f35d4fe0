//! Crontab deployment
//!
//! The instance's jobs live in one marker-bounded block of the user's
//! crontab. The new crontab is written to a temporary file and installed
//! with `crontab <file>`.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::application::deploy::use_case::{instance_name, DeployUseCase};
use crate::domain::ports::CommandSpec;
use crate::domain::services::crontab;
use crate::domain::services::MacroEngine;
use crate::error::{WadfError, WadfResult};

const CRONTAB: &str = "crontab";

impl DeployUseCase {
    /// Install the jobs from the `crontab` file; returns whether anything
    /// was deployed
    pub(crate) fn deploy_scheduled_jobs(&self, engine: &mut MacroEngine) -> WadfResult<bool> {
        let Some(file) = engine.get("crontab")?.map(PathBuf::from) else {
            self.skip("scheduled jobs", "crontab not set");
            return Ok(false);
        };
        if !file.is_file() {
            self.skip("scheduled jobs", "crontab file not found");
            return Ok(false);
        }

        info!("Deploying scheduled jobs from {}...", file.display());
        let instance = instance_name(engine)?;
        let entries = fs::read_to_string(&file).map_err(|e| WadfError::io_at(&file, e))?;
        let current = self.current_crontab()?;
        match &current {
            None => info!("Deploying new crontab"),
            Some(text) if text.contains(&crontab::begin_marker(&instance)) => {
                info!("Found {} in existing crontab, replacing", instance)
            }
            Some(_) => debug!("Could not find {} in existing crontab", instance),
        }

        let merged = crontab::merge(current.as_deref(), &instance, &entries);
        self.install_crontab(&merged)?;
        Ok(true)
    }

    /// Remove the instance's block whether or not `crontab` is still set;
    /// failures only warn
    pub(crate) fn undeploy_scheduled_jobs(&self, engine: &mut MacroEngine) -> WadfResult<()> {
        let instance = instance_name(engine)?;
        let current = match self.current_crontab() {
            Ok(Some(current)) => current,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!("Could not read crontab: {}", e);
                return Ok(());
            }
        };
        match crontab::remove(&current, &instance) {
            Some(updated) => {
                info!("Removing scheduled jobs for {} in existing crontab", instance);
                if let Err(e) = self.install_crontab(&updated) {
                    warn!("Could not remove scheduled jobs for {}: {}", instance, e);
                }
                Ok(())
            }
            None => {
                debug!("No scheduled jobs to remove for {}", instance);
                Ok(())
            }
        }
    }

    /// `crontab -l`, or `None` when the user has no crontab
    fn current_crontab(&self) -> WadfResult<Option<String>> {
        let out = self.runner.run(&CommandSpec::new(CRONTAB).arg("-l"))?;
        let text = out.combined();
        if !out.success() || crontab::is_missing_crontab(&text) {
            return Ok(None);
        }
        Ok(Some(out.stdout))
    }

    fn install_crontab(&self, contents: &str) -> WadfResult<()> {
        let mut file = tempfile::Builder::new()
            .prefix("wadfcron")
            .tempfile()
            .map_err(WadfError::Io)?;
        file.write_all(contents.as_bytes())
            .map_err(|e| WadfError::io_at(file.path(), e))?;
        file.flush().map_err(|e| WadfError::io_at(file.path(), e))?;
        self.runner
            .run_checked(&CommandSpec::new(CRONTAB).path_arg(file.path()))?;
        Ok(())
    }
}
