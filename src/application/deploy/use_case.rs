//! Deploy Use Case
//!
//! Orchestrates a deployment:
//! 1. Check out or switch the working copy, record the instance
//! 2. Re-read the application config, force-resolve numbered entity macros
//! 3. Ask for input the configuration marks as required
//! 4. Install dependencies, render templates
//! 5. Database, vhost, DNS, kickstart, crontab, hooks, webserver restart
//!
//! Undeploy runs the reversible steps backwards and removes the deployment
//! directory. The individual steps live in `steps/`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use super::options::{DeployOptions, UndeployOptions};
use super::result::{DeployReport, UndeployReport};
use super::steps::dns::DnsMode;
use crate::config::ConfigLoader;
use crate::domain::ports::{
    CommandRunner, DatabaseAdmin, DeployEvent, DeployEventSink, InputPrompter, NoopEventSink,
    VcDriver,
};
use crate::domain::services::entity_enumeration::{entity_macros_to_resolve, NumberedEntities};
use crate::domain::services::version_sort::latest_version;
use crate::domain::services::MacroEngine;
use crate::domain::value_objects::RevisionSpec;
use crate::error::{WadfError, WadfResult};
use crate::infrastructure::config::INSTANCE_FILE_NAME;
use crate::infrastructure::config::InstanceFile;
use crate::infrastructure::fs::remove_dir_quietly;
use crate::infrastructure::{MysqlCli, NonInteractivePrompter, VcDriverRegistry, VcLocation};

/// Deploy use case - owns the collaborators every step needs
pub struct DeployUseCase {
    pub(super) loader: ConfigLoader,
    pub(super) runner: Arc<dyn CommandRunner>,
    pub(super) registry: VcDriverRegistry,
    pub(super) database: Box<dyn DatabaseAdmin>,
    pub(super) prompter: Box<dyn InputPrompter>,
    pub(super) events: Arc<dyn DeployEventSink>,
}

impl DeployUseCase {
    /// Use case with the standard drivers, the `mysql` client and no prompting
    pub fn new(loader: ConfigLoader, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            loader,
            registry: VcDriverRegistry::standard(Arc::clone(&runner)),
            database: Box::new(MysqlCli::new(Arc::clone(&runner))),
            prompter: Box::new(NonInteractivePrompter),
            events: Arc::new(NoopEventSink),
            runner,
        }
    }

    pub fn with_prompter(mut self, prompter: Box<dyn InputPrompter>) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn with_database(mut self, database: Box<dyn DatabaseAdmin>) -> Self {
        self.database = database;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn loader(&self) -> &ConfigLoader {
        &self.loader
    }

    pub fn registry(&self) -> &VcDriverRegistry {
        &self.registry
    }

    /// Load every configuration layer for `appref`
    pub fn load(&self, appref: &str) -> WadfResult<MacroEngine> {
        self.loader.load(appref)
    }

    /// The driver selected by `vc_type`; `None` when version control is off
    pub fn driver(&self, engine: &mut MacroEngine) -> WadfResult<Option<Box<dyn VcDriver>>> {
        let vc_type = engine.get("vc_type")?;
        let location = self.location(engine)?;
        self.registry.select(vc_type.as_deref(), location)
    }

    /// Deploy `appref` from scratch: load its configuration, then run
    /// every step
    pub fn deploy(&self, appref: &str, options: &DeployOptions) -> WadfResult<DeployReport> {
        let mut engine = self.load(appref)?;
        self.deploy_with(&mut engine, options)
    }

    /// Run the deploy steps against an already loaded engine
    pub fn deploy_with(
        &self,
        engine: &mut MacroEngine,
        options: &DeployOptions,
    ) -> WadfResult<DeployReport> {
        let dir = deploy_dir(engine)?;
        let driver = self.driver(engine)?;
        let revision = resolve_revision(driver.as_deref(), &options.revision)?;

        self.step("checkout");
        let deploy_version = self.checkout(
            engine,
            driver.as_deref(),
            &revision,
            &dir,
            &options.cmdline_macros,
        )?;

        // The checkout may have brought the application config with it
        self.loader.reload_local_config(engine)?;

        let references = self.template_references(&dir)?;
        for name in entity_macros_to_resolve(&references, options.deploy_database) {
            engine.force_resolve(&name)?;
        }

        self.step("input");
        let answers = self.check_options_requiring_input(engine)?;
        InstanceFile::append(&dir.join(INSTANCE_FILE_NAME), &answers)?;

        self.step("dependencies");
        let skipped_dependencies = self.deploy_dependencies(engine, &dir, options.verbose_hooks)?;

        self.step("templates");
        let rendered = self.process_templates(engine, &dir)?;

        // Dependencies can add templates of their own
        let entities = NumberedEntities::from_references(&self.template_references(&dir)?);

        if options.deploy_database {
            self.step("database");
            self.deploy_database(engine, &dir, &entities)?;
        }

        self.step("vhost");
        let vhost_config = self.deploy_vhost(engine, &dir)?;

        self.step("dns");
        self.deploy_dns(engine, &entities, DnsMode::Deploy)?;

        self.step("kickstart");
        self.run_kickstart(engine, options)?;

        self.step("scheduled jobs");
        let scheduled_jobs_deployed = self.deploy_scheduled_jobs(engine)?;

        self.step("post-deploy");
        self.post_deploy(engine, options)?;
        let cleaned_up = self.cleanup_files(engine, &dir)?;

        self.step("restart");
        self.restart_webserver(engine)?;

        let unresolved = engine.unresolved().records().to_vec();
        self.events.on_event(DeployEvent::Completed {
            unresolved_count: unresolved.len(),
        });

        Ok(DeployReport {
            instance: instance_name(engine)?,
            deploy_path: dir,
            deploy_version,
            rendered,
            skipped_dependencies,
            database_deployed: options.deploy_database,
            vhost_config,
            scheduled_jobs_deployed,
            cleaned_up,
            unresolved,
        })
    }

    /// Remove the deployment of `appref`
    pub fn undeploy(&self, appref: &str, options: &UndeployOptions) -> WadfResult<UndeployReport> {
        let mut engine = self.load(appref)?;
        self.undeploy_with(&mut engine, options)
    }

    /// Undo what a deploy set up. Missing pieces are logged, not fatal.
    pub fn undeploy_with(
        &self,
        engine: &mut MacroEngine,
        options: &UndeployOptions,
    ) -> WadfResult<UndeployReport> {
        let dir = deploy_dir(engine)?;
        let entities = NumberedEntities::from_references(&self.template_references(&dir)?);

        if options.remove_database {
            self.step("database");
            self.undeploy_database(engine, &entities)?;
        }

        self.step("scheduled jobs");
        self.undeploy_scheduled_jobs(engine)?;

        self.step("dns");
        self.deploy_dns(engine, &entities, DnsMode::Undeploy)?;

        self.step("vhost");
        self.undeploy_vhost(engine)?;

        self.step("dependencies");
        self.undeploy_dependencies(engine, &dir)?;

        self.step("restart");
        self.restart_webserver(engine)?;

        info!("Removing directory {}...", dir.display());
        remove_dir_quietly(&dir);

        Ok(UndeployReport {
            instance: instance_name(engine)?,
            deploy_path: dir,
            database_removed: options.remove_database,
        })
    }

    pub(super) fn step(&self, step: &'static str) {
        self.events.on_event(DeployEvent::StepStarted { step });
    }

    pub(super) fn skip(&self, step: &'static str, reason: impl Into<String>) {
        self.events.on_event(DeployEvent::StepSkipped {
            step,
            reason: reason.into(),
        });
    }

    pub(super) fn location(&self, engine: &mut MacroEngine) -> WadfResult<VcLocation> {
        Ok(VcLocation::new(
            engine.get_or_empty("vc_base")?,
            engine.get_or_empty("appref")?,
        ))
    }

    /// VC metadata names every file listing skips
    pub(super) fn ignored_names(&self) -> Vec<&'static str> {
        self.registry.all_ignored_files()
    }
}

/// `deploy_path`, which every step works in
pub(super) fn deploy_dir(engine: &mut MacroEngine) -> WadfResult<PathBuf> {
    engine
        .get("deploy_path")?
        .map(PathBuf::from)
        .ok_or_else(|| WadfError::config("The deploy_path option is not set"))
}

/// `instance`, falling back to the application reference
pub(super) fn instance_name(engine: &mut MacroEngine) -> WadfResult<String> {
    match engine.get("instance")? {
        Some(instance) => Ok(instance),
        None => engine
            .get("appref")?
            .ok_or_else(|| WadfError::config("Neither instance nor appref is set")),
    }
}

/// Swap `tag/LATEST` for the newest tag the driver knows
pub(super) fn resolve_revision(
    driver: Option<&dyn VcDriver>,
    revision: &RevisionSpec,
) -> WadfResult<RevisionSpec> {
    if !revision.is_latest_tag() {
        return Ok(revision.clone());
    }
    let driver = driver
        .ok_or_else(|| WadfError::config("tag/LATEST needs a version control driver"))?;
    let tags = driver.list_tags()?;
    let latest = latest_version(&tags)
        .ok_or_else(|| WadfError::config("No tags found; cannot pick the latest"))?;
    info!("Latest tag is {}", latest);
    Ok(RevisionSpec::tag(latest.clone()))
}

/// Whether `path` sits inside `dir`
pub(super) fn relative_to<'a>(path: &'a Path, dir: &Path) -> Option<&'a Path> {
    path.strip_prefix(dir).ok()
}
