//! Layered configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::types::LoaderOptions;
use crate::domain::services::MacroEngine;
use crate::error::WadfResult;
use crate::infrastructure::config::{IniFile, InstanceFile, GLOBALS_SECTION, INSTANCE_FILE_NAME};
use crate::infrastructure::fs::wadf_home_dir;

/// Builds the macro engine for one application
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Load every configuration layer for `appref` and resolve the result
    pub fn load(&self, appref: &str) -> WadfResult<MacroEngine> {
        let appref = appref.strip_suffix('/').unwrap_or(appref);
        let profile_override = self.options.override_value("profile");

        let mut engine = MacroEngine::new();
        engine.append(internal_macros(self.options.cwd.as_deref()))?;
        engine.append([(
            "master_config",
            self.options.master_config.to_string_lossy().into_owned(),
        )])?;
        engine.append([("appref", appref)])?;
        engine.resolve_all()?;

        if self.options.master_config.is_file() {
            read_config_file(&mut engine, &self.options.master_config, profile_override)?;
        } else {
            warn!(
                "Master config {} not found; continuing without it",
                self.options.master_config.display()
            );
        }

        if let Some(user) = self.options.user_config.as_deref().filter(|p| p.is_file()) {
            read_config_file(&mut engine, user, profile_override)?;
        }

        // The application config usually lives under deploy_path, which in
        // turn usually depends on instance
        for name in ["deploy_path", "instance"] {
            if let Some(value) = self.options.override_value(name) {
                engine.append([(name, value)])?;
            }
        }
        self.read_local_config(&mut engine, profile_override)?;
        self.apply_instance_layers(&mut engine)?;
        Ok(engine)
    }

    /// Read the application config again, e.g. after a checkout brought it
    /// in. The instance file and overrides are re-applied on top so they
    /// keep their precedence.
    pub fn reload_local_config(&self, engine: &mut MacroEngine) -> WadfResult<()> {
        self.read_local_config(engine, self.options.override_value("profile"))?;
        self.apply_instance_layers(engine)
    }

    fn apply_instance_layers(&self, engine: &mut MacroEngine) -> WadfResult<()> {
        if let Some(deploy_path) = engine.get("deploy_path")? {
            let path = Path::new(&deploy_path).join(INSTANCE_FILE_NAME);
            if let Some(instance) = InstanceFile::read(&path)? {
                debug!("Reading instance file {}", path.display());
                engine.append(instance.definitions())?;
            }
        }

        engine.append(self.options.overrides.iter().cloned())?;
        engine.resolve_all()?;
        Ok(())
    }

    fn read_local_config(&self, engine: &mut MacroEngine, profile_override: Option<&str>) -> WadfResult<()> {
        let Some(file) = engine.get("local_config")? else {
            debug!("No 'local_config' option set; not looking for app config file...");
            return Ok(());
        };
        let path = PathBuf::from(&file);
        if path.is_file() {
            debug!("Loading configs from {}", path.display());
            read_config_file(engine, &path, profile_override)
        } else {
            debug!("Application config {} not found", path.display());
            Ok(())
        }
    }
}

/// Append `globals`, then the active profile section, of one config file.
///
/// The profile is the override if given, else the resolved `profile`
/// macro, else `profile` from this file's own `globals`.
pub fn read_config_file(
    engine: &mut MacroEngine,
    path: &Path,
    profile_override: Option<&str>,
) -> WadfResult<()> {
    let ini = IniFile::load(path)?;
    if !ini.globals().is_empty() {
        debug!("Setting global configuration options from file {}", path.display());
        engine.append(ini.globals().iter().cloned())?;
    }
    engine.resolve_all()?;

    let profile = match profile_override {
        Some(p) => Some(p.to_string()),
        None => engine
            .get("profile")?
            .or_else(|| ini.get(GLOBALS_SECTION, "profile").map(str::to_string)),
    };

    match profile.as_deref().and_then(|p| ini.section(p).map(|s| (p, s))) {
        Some((name, entries)) => {
            debug!("File {}: using profile section '{}'", path.display(), name);
            engine.append(entries.iter().cloned())?;
        }
        None => debug!(
            "File {}: no profile section '{}'",
            path.display(),
            profile.as_deref().unwrap_or("")
        ),
    }
    Ok(())
}

/// `hostname`, `cwd`, `user` and `home`, as far as they can be found
pub fn internal_macros(cwd: Option<&Path>) -> Vec<(String, String)> {
    let mut macros = Vec::new();

    let hostname = env_value("HOSTNAME")
        .or_else(|| {
            std::fs::read_to_string("/etc/hostname")
                .ok()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
        })
        .unwrap_or_else(|| "localhost".to_string());
    macros.push(("hostname".to_string(), hostname));

    let cwd = cwd
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok());
    if let Some(cwd) = cwd {
        macros.push(("cwd".to_string(), cwd.to_string_lossy().into_owned()));
    }

    let user = ["USER", "USERNAME", "LOGNAME"]
        .into_iter()
        .find_map(env_value)
        .unwrap_or_else(|| "UNKNOWN".to_string());
    macros.push(("user".to_string(), user));

    if let Some(home) = wadf_home_dir() {
        macros.push(("home".to_string(), home.to_string_lossy().into_owned()));
    }
    macros
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
