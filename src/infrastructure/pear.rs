//! PEAR package manager integration
//!
//! Drives the `pear` command line for a deployment: an optional standalone
//! PEAR installation, base channel and role setup, dependency installs with
//! workarounds for two known installer bugs, and cleanup afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, trace, warn};

use crate::domain::ports::{CommandOutput, CommandRunner, CommandSpec};
use crate::domain::services::version_sort::{compare_versions, sort_versions};
use crate::domain::value_objects::PearDependency;
use crate::error::{WadfError, WadfResult};
use crate::infrastructure::fs::{remove_dir_quietly, walk_files};

static CHANNEL_LOGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+):(.+)@(.+)$").expect("channel login regex is valid"));

static DUPLICATE_PACKAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Duplicate package channel://([^/]+/[^-]+)-(.+) found")
        .expect("duplicate package regex is valid")
});

static WRONGLY_UPGRADED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([^/]+/.+) requires package "([^/]+/.+)" \(version <= (.+)\), downloaded version is (.+)$"#)
        .expect("wrongly upgraded regex is valid")
});

static WARNING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)WARNING: (.*)").expect("warning regex is valid"));

static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\.+done:|Starting to download|downloading|channel "pear.php.net" has updated its protocols"#)
        .expect("noise regex is valid")
});

static LIST_CHANNEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:INSTALLED PACKAGES, )?CHANNEL ([^:\s]+):").expect("list channel regex is valid")
});

/// Nested workaround runs stop here
const MAX_WORKAROUND_DEPTH: usize = 3;

/// Installer bug workarounds selectable through `dep_pear_bug_workarounds`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BugWorkaround {
    /// PEAR bug #13425: the same package required at several versions
    DuplicatePackage,
    /// PEAR bug #13427: a package upgraded past a `<max>` constraint
    WronglyUpgraded,
}

impl BugWorkaround {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "bug13425" => Some(BugWorkaround::DuplicatePackage),
            "bug13427" => Some(BugWorkaround::WronglyUpgraded),
            _ => None,
        }
    }

    /// Comma-separated list; any unknown entry is a configuration error
    pub fn parse_list(value: &str) -> WadfResult<Vec<Self>> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Self::parse(s).ok_or_else(|| {
                    WadfError::config(format!("Invalid value in dep_pear_bug_workarounds: '{}'", s))
                })
            })
            .collect()
    }
}

/// `dep_pear_*` options, resolved
#[derive(Debug, Clone, Default)]
pub struct PearSettings {
    /// `dep_pear_deploy_path`; set means a standalone installation
    pub deploy_path: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub restrict_version: Option<String>,
    /// `dep_pear_base_channel`, possibly `user:pass@channel`
    pub base_channel: Option<String>,
    pub logout_after_deploy: bool,
    pub base_roles: Vec<String>,
    pub preferred_stability: Option<String>,
    pub workarounds: Vec<BugWorkaround>,
    pub deploy_docs: bool,
    pub clear_cache: bool,
    pub opts_as_macros: Vec<String>,
    /// Current `application_dir` macro
    pub application_dir: String,
    /// Pass `-v` to pear
    pub verbose: bool,
}

impl PearSettings {
    pub fn is_standalone(&self) -> bool {
        self.deploy_path.is_some()
    }

    /// Base channel name without any `user:pass@` prefix
    pub fn base_channel_name(&self) -> Option<String> {
        let channel = self.base_channel.as_deref()?;
        Some(match CHANNEL_LOGIN.captures(channel) {
            Some(c) => c[3].to_string(),
            None => channel.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct RunMode {
    fail_on_error: bool,
    workarounds: bool,
}

impl RunMode {
    const FATAL: RunMode = RunMode {
        fail_on_error: true,
        workarounds: false,
    };
    const LENIENT: RunMode = RunMode {
        fail_on_error: false,
        workarounds: false,
    };
    const FATAL_WITH_WORKAROUNDS: RunMode = RunMode {
        fail_on_error: true,
        workarounds: true,
    };
    const LENIENT_WITH_WORKAROUNDS: RunMode = RunMode {
        fail_on_error: false,
        workarounds: true,
    };
}

/// What one pear run printed, sorted by kind
#[derive(Debug, Default)]
struct PearReport {
    duplicates: BTreeMap<String, Vec<String>>,
    /// package -> (installed version, version to downgrade to, dependent)
    wrongly_upgraded: BTreeMap<String, (String, String, String)>,
}

pub struct PearManager {
    runner: Arc<dyn CommandRunner>,
    settings: PearSettings,
    /// `bin_dir` of the system installation, looked up once
    system_bin_dir: Option<String>,
}

impl PearManager {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: PearSettings) -> Self {
        Self {
            runner,
            settings,
            system_bin_dir: None,
        }
    }

    pub fn settings(&self) -> &PearSettings {
        &self.settings
    }

    fn system_pear(&self) -> CommandSpec {
        let spec = CommandSpec::new("pear");
        if self.settings.verbose {
            spec.arg("-v")
        } else {
            spec
        }
    }

    /// The pear binary for this deployment, with its config file if standalone
    fn pear(&self) -> CommandSpec {
        let verbose = |spec: CommandSpec| {
            if self.settings.verbose {
                spec.arg("-v")
            } else {
                spec
            }
        };
        match (&self.settings.deploy_path, &self.settings.config_file) {
            (Some(root), Some(config)) if root.join("pear").is_file() => {
                verbose(CommandSpec::new(root.join("pear").to_string_lossy()))
                    .arg("-c")
                    .path_arg(config)
            }
            (Some(_), _) => self.system_pear(),
            (None, _) => match &self.system_bin_dir {
                Some(bin) => verbose(CommandSpec::new(format!("{}/pear", bin))),
                None => self.system_pear(),
            },
        }
    }

    fn pear_with<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = self.pear();
        if let Some(state) = &self.settings.preferred_stability {
            spec = spec.arg("-d").arg(format!("preferred_state={}", state));
        }
        spec.args(args)
    }

    fn run(&self, args: Vec<String>, mode: RunMode) -> WadfResult<CommandOutput> {
        self.run_spec(self.pear_with(args.clone()), &args, mode, 0)
    }

    fn run_spec(
        &self,
        spec: CommandSpec,
        args: &[String],
        mode: RunMode,
        depth: usize,
    ) -> WadfResult<CommandOutput> {
        debug!("Running: {}", spec);
        let mut out = self.runner.run(&spec)?;
        let report = self.log_output(&out, mode.workarounds);

        if mode.workarounds && depth < MAX_WORKAROUND_DEPTH {
            let workarounds = &self.settings.workarounds;
            if workarounds.contains(&BugWorkaround::DuplicatePackage) && !report.duplicates.is_empty()
            {
                self.fix_duplicates(&report.duplicates, depth)?;
                info!("Re-running PEAR deployment with newly-installed dependencies...");
                let retry = RunMode {
                    workarounds: false,
                    ..mode
                };
                out = self.run_spec(spec.clone(), args, retry, depth + 1)?;
            }
            if workarounds.contains(&BugWorkaround::WronglyUpgraded) {
                for (pkg, (installed, downgrade_to, dependent)) in &report.wrongly_upgraded {
                    warn!(
                        "{}-{} was installed, but {} requires version <= {} (possible cause: PEAR bug #13427); force-installing {}-{}",
                        pkg, installed, dependent, downgrade_to, pkg, downgrade_to
                    );
                    self.run_spec(
                        self.pear_with(["upgrade".to_string(), "-f".to_string(), format!("{}-{}", pkg, downgrade_to)]),
                        args,
                        RunMode::LENIENT_WITH_WORKAROUNDS,
                        depth + 1,
                    )?;
                }
            }
        }

        if mode.fail_on_error && !out.success() {
            return Err(WadfError::tool(
                format!("pear {}", args.join(" ")),
                out.status,
                out.combined(),
            ));
        }
        Ok(out)
    }

    fn fix_duplicates(&self, duplicates: &BTreeMap<String, Vec<String>>, depth: usize) -> WadfResult<()> {
        for (pkg, versions) in duplicates {
            let mut versions = versions.clone();
            sort_versions(&mut versions);
            let Some(picked) = versions.first() else {
                continue;
            };
            warn!(
                "Multiple PEAR dependencies on a specific version of {} ({}) - probable cause is PEAR bug #13425",
                pkg,
                versions.join(", ")
            );
            match self.installed_version(pkg)? {
                Some(installed) if compare_versions(picked, &installed).is_le() => {
                    info!("Not installing {}-{}; {}-{} is already installed", pkg, picked, pkg, installed);
                }
                _ => {
                    warn!("Force-installing {}-{}", pkg, picked);
                    let args = vec!["upgrade".to_string(), "-f".to_string(), format!("{}-{}", pkg, picked)];
                    self.run_spec(
                        self.pear_with(args.clone()),
                        &args,
                        RunMode::FATAL_WITH_WORKAROUNDS,
                        depth + 1,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn log_output(&self, out: &CommandOutput, workarounds: bool) -> PearReport {
        let mut report = PearReport::default();
        for line in out.combined().lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(w) = WARNING_LINE.captures(line) {
                if line.contains("failed to download") || line.contains("has updated its protocols") {
                    trace!("\t{}", line);
                    continue;
                }
                let text = &w[1];
                if text.contains("deprecated") {
                    debug!("Deprecated: {}", text);
                } else if let Some(m) = WRONGLY_UPGRADED.captures(text).filter(|_| workarounds) {
                    report
                        .wrongly_upgraded
                        .insert(m[2].to_string(), (m[4].to_string(), m[3].to_string(), m[1].to_string()));
                } else {
                    warn!("PEAR: {}", text);
                }
            } else if let Some(m) = DUPLICATE_PACKAGE.captures(line).filter(|_| workarounds) {
                report
                    .duplicates
                    .entry(m[1].to_string())
                    .or_default()
                    .push(m[2].to_string());
            } else if NOISE.is_match(line) {
                trace!("\t{}", line);
            } else {
                debug!("\t{}", line);
            }
        }
        report
    }

    /// Installed packages as `channel/Package` -> version, from `pear list -a`
    pub fn installed_packages(&self) -> WadfResult<BTreeMap<String, String>> {
        let out = self.runner.run(&self.pear().args(["list", "-a"]))?;
        Ok(parse_package_list(&out.stdout))
    }

    fn installed_version(&self, pkg: &str) -> WadfResult<Option<String>> {
        Ok(self.installed_packages()?.get(pkg).cloned())
    }

    /// Prepare the PEAR installation; returns whether it is standalone
    pub fn setup(&mut self) -> WadfResult<bool> {
        let standalone = match &self.settings.deploy_path {
            Some(root) => {
                let config = self
                    .settings
                    .config_file
                    .clone()
                    .ok_or_else(|| WadfError::config("No dep_pear_config_file option specified"))?;
                if !config.exists() {
                    self.create_standalone(root, &config)?;
                }
                true
            }
            None => {
                let out = self
                    .runner
                    .run_checked(&self.system_pear().args(["config-get", "bin_dir"]))?;
                let bin = out.first_line().unwrap_or("/usr/bin").to_string();
                debug!("Using existing PEAR installation in {}", bin);
                self.system_bin_dir = Some(bin);
                false
            }
        };

        self.configure_base_channel()?;
        self.install_base_roles()?;
        if standalone {
            self.configure_roles()?;
        }
        Ok(standalone)
    }

    fn create_standalone(&self, root: &Path, config: &Path) -> WadfResult<()> {
        info!(
            "PEAR dependencies found; creating a PEAR installation in {} (config file is {})...",
            root.display(),
            config.display()
        );
        let dir = |sub: &str| {
            if sub.is_empty() {
                root.to_string_lossy().into_owned()
            } else {
                root.join(sub).to_string_lossy().into_owned()
            }
        };
        let mut spec = self.system_pear().arg("-c").path_arg(config);
        for (key, sub) in [
            ("php_dir", "php"),
            ("data_dir", "data"),
            ("ext_dir", "ext"),
            ("doc_dir", "docs"),
            ("test_dir", "tests"),
            ("cache_dir", "cache"),
            ("download_dir", "downloads"),
            ("temp_dir", "temp"),
            ("bin_dir", ""),
        ] {
            spec = spec.arg("-d").arg(format!("{}={}", key, dir(sub)));
        }
        let args = vec!["-s".to_string()];
        self.run_spec(spec.arg("-s"), &args, RunMode::FATAL, 0)?;

        let package = match &self.settings.restrict_version {
            Some(v) => format!("pear.php.net/PEAR-{}", v),
            None => "pear.php.net/PEAR".to_string(),
        };
        let args = vec!["install".to_string(), "--onlyreqdeps".to_string(), package];
        let spec = self
            .system_pear()
            .arg("-c")
            .path_arg(config)
            .args(args.clone());
        self.run_spec(spec, &args, RunMode::FATAL, 0)?;
        self.run(vec!["channel-update".into(), "pear".into()], RunMode::LENIENT)?;
        Ok(())
    }

    fn configure_base_channel(&self) -> WadfResult<()> {
        let Some(base) = self.settings.base_channel.as_deref() else {
            return Ok(());
        };
        let channel = self
            .settings
            .base_channel_name()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| WadfError::config("dep_pear_base_channel option is empty"))?;

        let known = self.run(vec!["channel-info".into(), channel.clone()], RunMode::LENIENT)?;
        if !known.success() {
            info!("Discovering PEAR channel {}...", channel);
            self.run(vec!["channel-discover".into(), base.to_string()], RunMode::LENIENT)?;
            self.run(vec!["channel-update".into(), channel.clone()], RunMode::LENIENT)?;
            if let Some(c) = CHANNEL_LOGIN.captures(base) {
                debug!("Logged into PEAR channel {} as user {}", channel, &c[1]);
            }
        } else if self.settings.logout_after_deploy {
            self.runner
                .run_attached(&self.pear().arg("login").arg(&channel))?;
        }
        Ok(())
    }

    fn install_base_roles(&self) -> WadfResult<()> {
        for package in &self.settings.base_roles {
            let listed = self.runner.run(&self.pear().arg("list").arg(package))?;
            if !listed.success() {
                debug!("Installing base role package {}...", package);
                self.run(
                    vec!["install".into(), "--soft".into(), "--onlyreqdeps".into(), package.clone()],
                    RunMode::FATAL,
                )?;
            }
        }
        Ok(())
    }

    fn configure_roles(&self) -> WadfResult<()> {
        let value = self.settings.application_dir.clone();
        debug!("Setting application_dir = {}", value);
        let mut args = vec!["config-set".to_string()];
        if let Some(channel) = self.settings.base_channel_name() {
            args.push("-c".to_string());
            args.push(channel);
        }
        args.push("application_dir".to_string());
        args.push(value);
        self.run(args, RunMode::FATAL)?;
        Ok(())
    }

    fn application_dir_args(&self, standalone: bool) -> Vec<String> {
        if standalone {
            Vec::new()
        } else {
            vec![
                "-d".to_string(),
                format!("application_dir={}", self.settings.application_dir),
            ]
        }
    }

    /// Register the site's own package.xml without dependencies, so tagged
    /// dependencies can be forced in afterwards
    pub fn install_site_package_for_tracking(&self, site_dir: &Path, standalone: bool) -> WadfResult<()> {
        info!("Installing site package.xml for dependency tracking...");
        let mut args = self.application_dir_args(standalone);
        args.extend([
            "upgrade".to_string(),
            "--nodeps".to_string(),
            "--force".to_string(),
            site_dir.join("package.xml").to_string_lossy().into_owned(),
        ]);
        self.run(args, RunMode::FATAL)?;
        Ok(())
    }

    /// Install the site package.xml with its required dependencies
    pub fn install_from_packagexml(&self, site_dir: &Path, standalone: bool) -> WadfResult<()> {
        info!("Installing PEAR dependencies...");
        let mut args = self.application_dir_args(standalone);
        args.extend([
            "upgrade".to_string(),
            "--onlyreqdeps".to_string(),
            "-f".to_string(),
            site_dir.join("package.xml").to_string_lossy().into_owned(),
        ]);
        self.run(args, RunMode::FATAL_WITH_WORKAROUNDS)?;
        Ok(())
    }

    /// Install package.xml files found inside the deployment
    pub fn install_local_packages(&self, packages: &[PathBuf]) -> WadfResult<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let paths: Vec<String> = packages
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        info!("Installing local PEAR packages {}...", paths.join(" "));

        let mut args = vec!["upgrade".to_string(), "--nodeps".to_string(), "--force".to_string()];
        args.extend(paths.iter().cloned());
        self.run(args, RunMode::LENIENT)?;

        // One at a time, so a channel release never wins over a local package
        for path in paths {
            self.run(
                vec!["upgrade".into(), "--onlyreqdeps".into(), "-f".into(), path],
                RunMode::FATAL_WITH_WORKAROUNDS,
            )?;
        }
        Ok(())
    }

    /// Force-install pinned packages that are not installed at that version
    pub fn force_install(&self, deps: &[PearDependency]) -> WadfResult<Vec<String>> {
        if deps.is_empty() {
            return Ok(Vec::new());
        }
        let installed = self.installed_packages()?;
        let wanted: Vec<String> = deps
            .iter()
            .filter(|d| installed.get(&d.name) != Some(&d.version))
            .map(PearDependency::spec)
            .collect();
        if wanted.is_empty() {
            debug!("All tagged PEAR dependencies already installed");
            return Ok(wanted);
        }
        debug!("Force-installing {}", wanted.join(" "));
        let mut args = vec!["upgrade".to_string(), "--force".to_string(), "--nodeps".to_string()];
        args.extend(wanted.iter().cloned());
        self.run(args, RunMode::LENIENT)?;
        Ok(wanted)
    }

    fn config_get(&self, name: &str, channel: Option<&str>) -> WadfResult<Option<String>> {
        let mut spec = self.pear().arg("config-get");
        if let Some(c) = channel {
            spec = spec.arg("-c").arg(c);
        }
        let out = self.runner.run(&spec.arg(name))?;
        Ok(out
            .first_line()
            .filter(|_| out.success())
            .map(str::to_string))
    }

    /// Remove downloads and docs, clear the cache, log out of the base channel
    pub fn cleanup(&self, standalone: bool) -> WadfResult<()> {
        if let Some(dir) = self.config_get("download_dir", None)? {
            debug!("Cleaning up PEAR temporary download files from {}...", dir);
            remove_dir_quietly(Path::new(&dir));
        }
        if standalone && !self.settings.deploy_docs {
            if let Some(dir) = self.config_get("doc_dir", None)? {
                debug!("Cleaning up PEAR document directory {}...", dir);
                remove_dir_quietly(Path::new(&dir));
            }
        }
        if self.settings.clear_cache {
            debug!("Clearing PEAR cache...");
            self.runner.run(&self.pear().arg("clear-cache"))?;
        }
        if self.settings.logout_after_deploy {
            if let Some(channel) = self.settings.base_channel_name() {
                debug!("Logging out of PEAR channel {}...", channel);
                let default_channel = self.config_get("default_channel", None)?;
                self.run(
                    vec!["-d".into(), format!("default_channel={}", channel), "logout".into()],
                    RunMode::FATAL,
                )?;
                if let Some(previous) = default_channel {
                    self.run(
                        vec!["config-set".into(), "default_channel".into(), previous],
                        RunMode::LENIENT,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// `application_dir` plus every option listed in `dep_pear_opts_as_macros`
    pub fn macros(&self, deploy_path: &str) -> WadfResult<Vec<(String, String)>> {
        let mut defs = vec![("application_dir".to_string(), deploy_path.to_string())];
        let channel = self.settings.base_channel_name();
        for name in &self.settings.opts_as_macros {
            if let Some(value) = self.config_get(name, channel.as_deref())? {
                defs.push((name.clone(), value));
            }
        }
        Ok(defs)
    }

    /// Delete a standalone installation and its config file
    pub fn remove_standalone(settings: &PearSettings) -> WadfResult<()> {
        let Some(root) = &settings.deploy_path else {
            return Ok(());
        };
        if let Some(config) = &settings.config_file {
            debug!("Removing PEAR config file {}...", config.display());
            match fs::remove_file(config) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(WadfError::io_at(config, e)),
            }
        }
        debug!("Removing PEAR installation at {}...", root.display());
        remove_dir_quietly(root);
        Ok(())
    }
}

/// Parse `pear list -a` output into `channel/Package` -> version
pub fn parse_package_list(output: &str) -> BTreeMap<String, String> {
    let mut packages = BTreeMap::new();
    let mut channel: Option<String> = None;
    for line in output.lines() {
        let line = line.trim();
        if let Some(c) = LIST_CHANNEL.captures(line) {
            channel = Some(c[1].to_ascii_lowercase());
            continue;
        }
        let Some(channel) = channel.as_deref() else {
            continue;
        };
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2
            || fields[0] == "PACKAGE"
            || fields[0].starts_with('=')
            || fields[0].starts_with('(')
        {
            continue;
        }
        packages.insert(format!("{}/{}", channel, fields[0]), fields[1].to_string());
    }
    packages
}

/// `package.xml`/`package2.xml` files under the comma-separated
/// `dep_pear_local_package_dirs`, relative to `site_dir`
pub fn find_local_packages(
    site_dir: &Path,
    package_dirs: &str,
    skip_names: &[&str],
) -> WadfResult<Vec<PathBuf>> {
    let mut found: Vec<PathBuf> = Vec::new();
    for dir in package_dirs.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        let root = site_dir.join(dir);
        debug!("Looking for local PEAR packages in {}...", root.display());
        for file in walk_files(&root, skip_names)? {
            let is_package = file
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n == "package.xml" || n == "package2.xml");
            if is_package && !found.contains(&file) {
                debug!("Marking {} as a PEAR package to install...", file.display());
                found.push(file);
            }
        }
    }
    Ok(found)
}
