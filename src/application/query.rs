//! Read-only queries: tags, deployed instances, macro values

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::domain::entities::UnresolvedMacro;
use crate::domain::ports::CommandRunner;
use crate::domain::services::version_sort::sort_versions;
use crate::domain::services::vhost_config::DeployedInstance;
use crate::error::{WadfError, WadfResult};
use crate::infrastructure::{VcDriverRegistry, VcLocation};

use super::deploy::list_deployed;

/// One resolved macro, as dumped by `macros`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MacroEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ResolvedText {
    pub text: String,
    pub unresolved: Vec<UnresolvedMacro>,
}

pub struct QueryUseCase {
    loader: ConfigLoader,
    registry: VcDriverRegistry,
}

impl QueryUseCase {
    pub fn new(loader: ConfigLoader, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            loader,
            registry: VcDriverRegistry::standard(runner),
        }
    }

    /// Tags of `appref`, oldest first
    pub fn list_tags(&self, appref: &str) -> WadfResult<Vec<String>> {
        let mut engine = self.loader.load(appref)?;
        let vc_type = engine.get("vc_type")?;
        let location = VcLocation::new(engine.get_or_empty("vc_base")?, engine.get_or_empty("appref")?);
        let driver = self
            .registry
            .select(vc_type.as_deref(), location)?
            .ok_or_else(|| WadfError::config(format!("No version control configured for {}", appref)))?;

        let mut tags = driver.list_tags()?;
        sort_versions(&mut tags);
        Ok(tags)
    }

    /// Instances with a vhost config under the configured `vhost_config_path`
    pub fn list_deployed(&self) -> WadfResult<Vec<DeployedInstance>> {
        let mut engine = self.loader.load("")?;
        let dir = engine
            .get("vhost_config_path")?
            .map(PathBuf::from)
            .ok_or_else(|| WadfError::config("The vhost_config_path option is not set"))?;
        list_deployed(&dir)
    }

    /// Resolve `text` in the configuration of `appref`.
    ///
    /// Text without any `@` is taken as a single macro reference, so both
    /// `db1_host` and `host=@db1_host@` work.
    pub fn resolve(&self, appref: &str, text: &str) -> WadfResult<ResolvedText> {
        let mut engine = self.loader.load(appref)?;
        let text = if text.contains('@') {
            engine.resolve_string(text, Some("command line"))?
        } else {
            engine.resolve_string(&format!("@{}@", text), Some("command line"))?
        };
        Ok(ResolvedText {
            text,
            unresolved: engine.unresolved().records().to_vec(),
        })
    }

    /// Every resolved value of `appref`, in definition order
    pub fn macros(&self, appref: &str) -> WadfResult<Vec<MacroEntry>> {
        let engine = self.loader.load(appref)?;
        Ok(engine
            .values()
            .iter()
            .map(|(name, value)| MacroEntry {
                name: name.to_string(),
                value: value.to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoaderOptions;
    use crate::domain::ports::CommandOutput;
    use crate::infrastructure::process::scripted::ScriptedRunner;
    use std::fs;
    use tempfile::tempdir;

    fn query(master: &str, runner: ScriptedRunner) -> (tempfile::TempDir, QueryUseCase) {
        let dir = tempdir().unwrap();
        let conf = dir.path().join("wadf.conf");
        fs::write(&conf, master).unwrap();
        let loader = ConfigLoader::new(
            LoaderOptions::default()
                .with_master_config(conf)
                .with_user_config(None),
        );
        (dir, QueryUseCase::new(loader, Arc::new(runner)))
    }

    #[test]
    fn resolve_accepts_bare_names_and_text() {
        let (_dir, query) = query(
            "[globals]\ndb_host = db.local\ndb_name = @appref@_live\n",
            ScriptedRunner::new(),
        );
        assert_eq!(query.resolve("shop", "db1_name").unwrap().text, "shop_live");

        let out = query.resolve("shop", "host=@db2_host@ x=@nope@").unwrap();
        assert_eq!(out.text, "host=db.local x=@nope@");
        assert_eq!(out.unresolved.len(), 1);
        assert_eq!(out.unresolved[0].context.as_deref(), Some("command line"));
    }

    #[test]
    fn macros_lists_resolved_values() {
        let (_dir, query) = query("[globals]\ninstance = @appref@-dev\n", ScriptedRunner::new());
        let macros = query.macros("shop").unwrap();
        let instance = macros.iter().find(|m| m.name == "instance").unwrap();
        assert_eq!(instance.value, "shop-dev");
    }

    #[test]
    fn list_tags_sorts_versions() {
        let sha = "0123456789abcdef0123456789abcdef01234567";
        let listing = format!("{sha}\trefs/tags/1.10\n{sha}\trefs/tags/1.9\n{sha}\trefs/tags/1.10b\n");
        let runner = ScriptedRunner::new().on("git ls-remote", CommandOutput::ok(listing));
        let (_dir, query) = query(
            "[globals]\nvc_type = git\nvc_base = https://git.example.com\n",
            runner,
        );
        assert_eq!(query.list_tags("shop").unwrap(), vec!["1.9", "1.10b", "1.10"]);
    }

    #[test]
    fn list_tags_needs_version_control() {
        let (_dir, query) = query("[globals]\nvc_type = none\n", ScriptedRunner::new());
        assert!(query.list_tags("shop").is_err());
    }

    #[test]
    fn list_deployed_needs_vhost_path() {
        let (_dir, query) = query("[globals]\n", ScriptedRunner::new());
        assert!(matches!(query.list_deployed(), Err(WadfError::Config { .. })));
    }
}
