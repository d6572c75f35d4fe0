//! Working copy checkout and template discovery

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::application::deploy::use_case::{instance_name, DeployUseCase};
use crate::domain::ports::VcDriver;
use crate::domain::services::extract_references;
use crate::domain::services::MacroEngine;
use crate::domain::value_objects::{RevisionSpec, VcIdentifier};
use crate::error::{WadfError, WadfResult};
use crate::infrastructure::config::{InstanceFile, INSTANCE_FILE_NAME};
use crate::infrastructure::fs::walk_files;

pub(crate) const TEMPLATE_SUFFIX: &str = ".template";

impl DeployUseCase {
    /// Bring `dir` to `revision`, record the instance and return the
    /// resulting `deploy_version`
    pub(crate) fn checkout(
        &self,
        engine: &mut MacroEngine,
        driver: Option<&dyn VcDriver>,
        revision: &RevisionSpec,
        dir: &Path,
        cmdline_macros: &[(String, String)],
    ) -> WadfResult<String> {
        let identifier = match driver {
            Some(driver) => {
                if driver.read_vc_info(dir)?.is_some() {
                    info!("Switching {} to {}...", dir.display(), driver.label(revision));
                    self.remove_generated_files(dir)?;
                    driver.switch_ver(revision, dir)?;
                } else {
                    if dir.exists() {
                        info!("Removing {}...", dir.display());
                        fs::remove_dir_all(dir).map_err(|e| WadfError::io_at(dir, e))?;
                    }
                    if let Some(parent) = dir.parent() {
                        fs::create_dir_all(parent).map_err(|e| WadfError::io_at(parent, e))?;
                    }
                    info!("Checking out {} to {}...", driver.label(revision), dir.display());
                    driver.checkout(revision, dir)?;
                }
                driver
                    .read_vc_info(dir)?
                    .map(|vc| vc.identifier())
                    .unwrap_or_else(VcIdentifier::unknown)
            }
            None => {
                if !dir.is_dir() {
                    return Err(WadfError::config(format!(
                        "Version control is disabled and {} does not exist",
                        dir.display()
                    )));
                }
                debug!("Version control disabled; deploying {} as is", dir.display());
                VcIdentifier::unknown()
            }
        };

        let instance = instance_name(engine)?;
        InstanceFile::write(&dir.join(INSTANCE_FILE_NAME), &instance, cmdline_macros)?;

        let version = identifier.to_string();
        debug!("deploy_version = {}", version);
        engine.append([("deploy_version", version.as_str())])?;
        Ok(version)
    }

    /// Every `.template` file under `dir`
    pub(crate) fn template_files(&self, dir: &Path) -> WadfResult<Vec<PathBuf>> {
        Ok(walk_files(dir, &self.ignored_names())?
            .into_iter()
            .filter(|p| is_template(p))
            .collect())
    }

    /// Macro references used by the templates under `dir`
    pub(crate) fn template_references(&self, dir: &Path) -> WadfResult<Vec<String>> {
        let mut references: Vec<String> = Vec::new();
        for template in self.template_files(dir)? {
            let bytes = fs::read(&template).map_err(|e| WadfError::io_at(&template, e))?;
            for reference in extract_references(&String::from_utf8_lossy(&bytes)) {
                if !references.contains(&reference) {
                    references.push(reference);
                }
            }
        }
        Ok(references)
    }

    fn remove_generated_files(&self, dir: &Path) -> WadfResult<()> {
        for template in self.template_files(dir)? {
            let output = output_path(&template);
            match fs::remove_file(&output) {
                Ok(()) => debug!("Removed generated file {}", output.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(WadfError::io_at(output, e)),
            }
        }
        Ok(())
    }
}

pub(crate) fn is_template(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() > TEMPLATE_SUFFIX.len() && n.ends_with(TEMPLATE_SUFFIX))
}

/// `foo.conf.template` -> `foo.conf`
pub(crate) fn output_path(template: &Path) -> PathBuf {
    let text = template.to_string_lossy();
    PathBuf::from(text.strip_suffix(TEMPLATE_SUFFIX).unwrap_or(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_output_strips_suffix() {
        assert_eq!(
            output_path(Path::new("/srv/app/config.php.template")),
            PathBuf::from("/srv/app/config.php")
        );
        assert!(is_template(Path::new("/srv/.htaccess.template")));
        assert!(!is_template(Path::new("/srv/.template")));
        assert!(!is_template(Path::new("/srv/template.txt")));
    }
}
