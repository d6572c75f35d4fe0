//! Webserver virtual host configuration

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};

use crate::application::deploy::use_case::{instance_name, DeployUseCase};
use crate::domain::services::vhost_config::{self, DeployedInstance, VhostExtras};
use crate::domain::services::MacroEngine;
use crate::error::{WadfError, WadfResult};

const CONFIG_EXTENSION: &str = "conf";

impl DeployUseCase {
    /// Write `<vhost_config_path>/<instance>.conf` from the application's
    /// vhost template; returns the file written
    pub(crate) fn deploy_vhost(
        &self,
        engine: &mut MacroEngine,
        dir: &Path,
    ) -> WadfResult<Option<PathBuf>> {
        let template = engine.get_or_empty("vhost_config_template")?;
        let source = dir.join(&template);
        if template.is_empty() || !source.is_file() {
            info!(
                "No webserver configuration to deploy (looked for {})",
                source.display()
            );
            self.skip("vhost", "no vhost config template");
            return Ok(None);
        }

        info!("Deploying webserver configuration...");
        let dest = vhost_file(engine)?;
        if let Some(parent) = dest.parent() {
            if !parent.exists() {
                info!("Creating webserver config file path {}...", parent.display());
                fs::create_dir_all(parent).map_err(|e| WadfError::io_at(parent, e))?;
            }
        }
        trace!("Copying {} to {}", source.display(), dest.display());

        let config = fs::read_to_string(&source).map_err(|e| WadfError::io_at(&source, e))?;
        let deploy_version = engine
            .get("deploy_version")?
            .unwrap_or_else(|| "unknown".to_string());
        let extras = VhostExtras {
            prepend: engine.get("vhost_config_prepend")?,
            append: engine.get("vhost_config_append")?,
        };

        let rendered = vhost_config::render(&config, dir, &deploy_version, &extras);
        fs::write(&dest, rendered).map_err(|e| WadfError::io_at(&dest, e))?;
        Ok(Some(dest))
    }

    pub(crate) fn undeploy_vhost(&self, engine: &mut MacroEngine) -> WadfResult<()> {
        if engine.get("vhost_config_path")?.is_none() {
            debug!("No vhost_config_path set; no vhost config to remove");
            return Ok(());
        }
        let dest = vhost_file(engine)?;
        debug!("Removing vhost config {}", dest.display());
        match fs::remove_file(&dest) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WadfError::io_at(dest, e)),
        }
    }
}

fn vhost_file(engine: &mut MacroEngine) -> WadfResult<PathBuf> {
    let path = engine
        .get("vhost_config_path")?
        .ok_or_else(|| WadfError::config("The vhost_config_path option is not set"))?;
    let instance = instance_name(engine)?;
    Ok(Path::new(&path).join(format!("{}.{}", instance, CONFIG_EXTENSION)))
}

/// Every instance with a vhost config under `vhost_dir`, by file name
pub fn list_deployed(vhost_dir: &Path) -> WadfResult<Vec<DeployedInstance>> {
    let entries = match fs::read_dir(vhost_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(WadfError::io_at(vhost_dir, e)),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == CONFIG_EXTENSION))
        .collect();
    files.sort();

    let mut deployed = Vec::new();
    for file in files {
        let Some(instance) = file.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let contents = fs::read_to_string(&file).map_err(|e| WadfError::io_at(&file, e))?;
        if let Some(found) = vhost_config::inspect(instance, &contents) {
            deployed.push(found);
        }
    }
    Ok(deployed)
}
