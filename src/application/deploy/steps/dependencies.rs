//! Dependency installation: PEAR packages and VC checkouts

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::application::deploy::use_case::DeployUseCase;
use crate::domain::ports::DeployEvent;
use crate::domain::services::dependency_tags::parse_dependency_tags;
use crate::domain::services::MacroEngine;
use crate::domain::value_objects::{Dependency, PearDependency};
use crate::error::{WadfError, WadfResult};
use crate::infrastructure::pear::{find_local_packages, BugWorkaround};
use crate::infrastructure::{PearManager, PearSettings};

const PACKAGE_XML: &str = "package.xml";

/// What the dependency pass decided to install
#[derive(Debug, Default)]
struct DependencyPlan {
    force_install: Vec<PearDependency>,
    local_packages: Vec<PathBuf>,
    from_packagexml: bool,
    skipped: Vec<String>,
}

impl DependencyPlan {
    fn needs_pear(&self) -> bool {
        self.from_packagexml || !self.force_install.is_empty() || !self.local_packages.is_empty()
    }
}

impl DeployUseCase {
    /// Install everything the application depends on; returns the
    /// dependencies that were skipped
    pub(crate) fn deploy_dependencies(
        &self,
        engine: &mut MacroEngine,
        dir: &Path,
        verbose: bool,
    ) -> WadfResult<Vec<String>> {
        let settings = pear_settings(engine, verbose)?;
        let mut pear = PearManager::new(self.runner.clone(), settings);
        let mut standalone: Option<bool> = None;
        let mut plan = DependencyPlan::default();
        let site_package = dir.join(PACKAGE_XML);

        match self.dependency_tags_file(engine, dir)? {
            Some(tags_file) => {
                // The site package.xml is registered without dependencies so
                // the tagged versions do not clash with its requirements
                if site_package.is_file() {
                    let is_standalone = pear.setup()?;
                    pear.install_site_package_for_tracking(dir, is_standalone)?;
                    standalone = Some(is_standalone);
                }
                info!(
                    "Force-installing tagged versions of dependencies from {}...",
                    tags_file.display()
                );
                match fs::read_to_string(&tags_file) {
                    Ok(contents) => {
                        for dependency in parse_dependency_tags(&contents, &self.registry) {
                            self.plan_dependency(engine, dir, dependency, &mut plan)?;
                        }
                    }
                    Err(e) => warn!(
                        "Could not open dependency tag file {}: {}",
                        tags_file.display(),
                        e
                    ),
                }
            }
            None => plan.from_packagexml = site_package.is_file(),
        }

        let package_dirs = engine.get_or_empty("dep_pear_local_package_dirs")?;
        for package in find_local_packages(dir, &package_dirs, &self.ignored_names())? {
            if !plan.local_packages.contains(&package) {
                plan.local_packages.push(package);
            }
        }

        let deploy_path = engine.get_or_empty("deploy_path")?;
        if plan.needs_pear() && standalone.is_none() {
            standalone = Some(pear.setup()?);
        }
        let Some(standalone) = standalone else {
            debug!("No PEAR dependencies to install");
            engine.append([("application_dir", deploy_path.as_str())])?;
            return Ok(plan.skipped);
        };

        pear.install_local_packages(&plan.local_packages)?;
        pear.force_install(&plan.force_install)?;
        if plan.from_packagexml {
            pear.install_from_packagexml(dir, standalone)?;
        }
        pear.cleanup(standalone)?;
        engine.append(pear.macros(&deploy_path)?)?;
        Ok(plan.skipped)
    }

    /// Remove a standalone PEAR installation made for this deployment
    pub(crate) fn undeploy_dependencies(&self, engine: &mut MacroEngine, dir: &Path) -> WadfResult<()> {
        if !dir.join(PACKAGE_XML).is_file() {
            self.skip("dependencies", "no package.xml");
            return Ok(());
        }
        let settings = pear_settings(engine, false)?;
        PearManager::remove_standalone(&settings)
    }

    fn dependency_tags_file(&self, engine: &mut MacroEngine, dir: &Path) -> WadfResult<Option<PathBuf>> {
        let Some(name) = engine.get("dep_tags_file")? else {
            return Ok(None);
        };
        let path = dir.join(name);
        if path.is_file() {
            Ok(Some(path))
        } else {
            debug!("Dependency tag file {} not found", path.display());
            Ok(None)
        }
    }

    fn plan_dependency(
        &self,
        engine: &mut MacroEngine,
        dir: &Path,
        dependency: Dependency,
        plan: &mut DependencyPlan,
    ) -> WadfResult<()> {
        let dependency = match dependency {
            Dependency::Pear(pear) => {
                plan.force_install.push(pear);
                return Ok(());
            }
            other => other,
        };

        let Some(driver) = self.registry.driver_for(&dependency, self.location(engine)?) else {
            warn!("Unrecognised dependency type '{}'", dependency.type_name());
            return Ok(());
        };

        let installed = match driver.install_dependency(&dependency, dir) {
            Ok(installed) => installed,
            Err(e @ (WadfError::ExternalTool { .. } | WadfError::DirtyWorkingCopy { .. })) => {
                warn!("Could not install {}: {}", dependency, e);
                self.skip_dependency(&dependency, e.to_string(), plan);
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        match installed {
            Some(path) => {
                let package = path.join(PACKAGE_XML);
                if package.is_file() {
                    debug!("Marking {} as a PEAR package to install...", package.display());
                    plan.local_packages.push(package);
                }
            }
            None => self.skip_dependency(
                &dependency,
                "local modifications or unrelated directory in the way",
                plan,
            ),
        }
        Ok(())
    }

    fn skip_dependency(&self, dependency: &Dependency, reason: impl Into<String>, plan: &mut DependencyPlan) {
        let name = dependency.to_string();
        self.events.on_event(DeployEvent::DependencySkipped {
            dependency: name.clone(),
            reason: reason.into(),
        });
        plan.skipped.push(name);
    }
}

/// The `dep_pear_*` options
pub(crate) fn pear_settings(engine: &mut MacroEngine, verbose: bool) -> WadfResult<PearSettings> {
    let list = |value: String| -> Vec<String> {
        value.split_whitespace().map(str::to_string).collect()
    };
    Ok(PearSettings {
        deploy_path: engine.get("dep_pear_deploy_path")?.map(PathBuf::from),
        config_file: engine.get("dep_pear_config_file")?.map(PathBuf::from),
        restrict_version: engine.get("dep_pear_restrict_version")?,
        base_channel: engine.get("dep_pear_base_channel")?,
        logout_after_deploy: engine.get("dep_pear_base_channel_logout_after_deploy")?.as_deref()
            == Some("1"),
        base_roles: list(engine.get_or_empty("dep_pear_base_roles")?),
        preferred_stability: engine.get("dep_pear_preferred_stability")?,
        workarounds: BugWorkaround::parse_list(&engine.get_or_empty("dep_pear_bug_workarounds")?)?,
        deploy_docs: engine.flag("dep_pear_deploy_docs")?,
        clear_cache: engine.flag("dep_pear_clear_cache")?,
        opts_as_macros: list(engine.get_or_empty("dep_pear_opts_as_macros")?),
        application_dir: engine.get_or_empty("application_dir")?,
        verbose,
    })
}
