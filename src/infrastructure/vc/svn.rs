//! Subversion driver
//!
//! Uses the standard `trunk` / `branches/<name>` / `tags/<name>` layout
//! under `<vc_base>/<appref>`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use super::{backup_dir, target_is_usable, TargetState, VcLocation};
use crate::domain::ports::{CommandRunner, CommandSpec, VcDriver};
use crate::domain::value_objects::{Dependency, RevType, RevisionSpec, SvnDependency, VcInfo};
use crate::error::{WadfError, WadfResult};

static DEPENDENCY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)@(\d+|HEAD)\s+(\S.*)$").expect("svn dependency regex is valid")
});

static MODIFIED_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[MADRC!~?]").expect("svn status regex is valid"));

static LAYOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/(?:(trunk)|tags/([^/]+)|branches/([^/]+))/?$").expect("svn layout regex is valid")
});

/// `url` without its trailing `trunk`, `tags/<name>` or `branches/<name>`
fn project_root(url: &str) -> &str {
    let url = url.trim_end_matches('/');
    match LAYOUT.find(url) {
        Some(m) => &url[..m.start()],
        None => url,
    }
}

pub struct SvnDriver {
    runner: Arc<dyn CommandRunner>,
    location: VcLocation,
}

impl SvnDriver {
    pub const NAME: &'static str = "SVN";
    pub const IGNORED: &'static [&'static str] = &[".svn"];

    pub fn new(runner: Arc<dyn CommandRunner>, location: VcLocation) -> Self {
        Self { runner, location }
    }

    fn app_url(&self) -> String {
        format!(
            "{}/{}",
            self.location.base.trim_end_matches('/'),
            self.location.appref.trim_matches('/')
        )
    }

    /// Repository URL for a logical revision
    pub fn url_for(&self, revision: &RevisionSpec) -> WadfResult<String> {
        let suffix = match revision.rev_type {
            RevType::Trunk => "trunk".to_string(),
            RevType::Branch => format!("branches/{}", revision.name()),
            RevType::Tag => format!("tags/{}", revision.name()),
            RevType::Unknown => {
                return Err(WadfError::config("Cannot map an unknown revision to a path"))
            }
        };
        Ok(format!("{}/{}", self.app_url(), suffix))
    }

    /// Parse `<url>@<rev> <dest>`
    pub fn parse_dependency_line(line: &str) -> Option<Dependency> {
        let caps = DEPENDENCY_LINE.captures(line.trim())?;
        let dest = caps[3].trim().trim_start_matches('/');
        if dest.is_empty() {
            return None;
        }
        Some(Dependency::Svn(SvnDependency {
            url: caps[1].to_string(),
            revision: caps[2].to_string(),
            dest_path: PathBuf::from(dest),
        }))
    }

    fn svn(&self) -> CommandSpec {
        CommandSpec::new("svn").arg("--non-interactive")
    }

    fn checkout_url(&self, url: &str, raw: &str, dest: &Path) -> WadfResult<()> {
        self.runner
            .run_checked(&self.svn().args(["checkout", "-r", raw, url]).path_arg(dest))?;
        Ok(())
    }

    fn switch_url(&self, url: &str, raw: &str, dest: &Path) -> WadfResult<()> {
        self.runner
            .run_checked(&self.svn().args(["switch", "-r", raw, url]).path_arg(dest))?;
        Ok(())
    }

    /// `URL` and `Last Changed Rev` from `svn info`
    fn info(&self, dir: &Path) -> WadfResult<Option<(String, String)>> {
        let out = self.runner.run(&self.svn().arg("info").path_arg(dir))?;
        if !out.success() {
            return Ok(None);
        }
        let mut url = None;
        let mut rev = None;
        for line in out.stdout_lines() {
            if let Some(v) = line.strip_prefix("URL: ") {
                url = Some(v.trim().to_string());
            } else if let Some(v) = line.strip_prefix("Last Changed Rev: ") {
                rev = Some(v.trim().to_string());
            }
        }
        Ok(url.zip(rev))
    }

    fn is_dirty(&self, dir: &Path) -> WadfResult<bool> {
        let out = self
            .runner
            .run_checked(&self.svn().arg("status").path_arg(dir))?;
        let modified = out.stdout_lines().any(|l| MODIFIED_ENTRY.is_match(l));
        Ok(modified)
    }

    fn probe(&self, path: &Path) -> WadfResult<TargetState> {
        if !path.exists() {
            return Ok(TargetState::Absent);
        }
        if !path.join(".svn").is_dir() {
            return Ok(TargetState::Foreign);
        }
        match self.info(path)? {
            Some((url, _)) => Ok(TargetState::WorkingCopy {
                url,
                dirty: self.is_dirty(path)?,
            }),
            None => Ok(TargetState::Foreign),
        }
    }

    fn install_svn(&self, dep: &SvnDependency, deploy_dir: &Path) -> WadfResult<Option<PathBuf>> {
        let path = deploy_dir.join(&dep.dest_path);
        let state = self.probe(&path)?;
        if !target_is_usable(&state, Self::NAME, &dep.url, &path) {
            return Ok(None);
        }
        match state {
            TargetState::WorkingCopy { url, .. } if project_root(&url) != project_root(&dep.url) => {
                warn!(
                    "Cannot deploy SVN dependency {}; {} is a working copy of {}",
                    dep.url,
                    path.display(),
                    url
                );
                return Ok(None);
            }
            TargetState::WorkingCopy { .. } => {
                info!("Switching SVN dependency {} at {}", dep.url, path.display());
                self.switch_url(&dep.url, &dep.revision, &path)?;
            }
            _ => {
                info!("Checking out SVN dependency {} to {}", dep.url, path.display());
                self.checkout_url(&dep.url, &dep.revision, &path)?;
            }
        }
        Ok(Some(path))
    }
}

impl VcDriver for SvnDriver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn checkout(&self, revision: &RevisionSpec, dest: &Path) -> WadfResult<()> {
        revision.validate()?;
        self.checkout_url(&self.url_for(revision)?, &revision.raw, dest)
    }

    fn switch_ver(&self, revision: &RevisionSpec, dest: &Path) -> WadfResult<()> {
        revision.validate()?;
        let target = self.url_for(revision)?;
        match self.info(dest)? {
            Some((url, _)) if url == target => {
                self.runner.run_checked(
                    &self
                        .svn()
                        .args(["update", "-r", revision.raw.as_str()])
                        .path_arg(dest),
                )?;
                Ok(())
            }
            Some(_) => self.switch_url(&target, &revision.raw, dest),
            None => {
                backup_dir(dest)?;
                self.checkout_url(&target, &revision.raw, dest)
            }
        }
    }

    fn list_tags(&self) -> WadfResult<Vec<String>> {
        let url = format!("{}/tags", self.app_url());
        let out = self.runner.run(&self.svn().arg("list").arg(&url))?;
        if !out.success() {
            return Err(WadfError::tool(
                "svn list",
                out.status,
                format!("Error when listing tags at {} - perhaps there aren't any?", url),
            ));
        }
        Ok(out
            .stdout_lines()
            .filter_map(|l| l.trim().strip_suffix('/'))
            .map(str::to_string)
            .collect())
    }

    fn label(&self, revision: &RevisionSpec) -> String {
        let url = self
            .url_for(revision)
            .unwrap_or_else(|_| format!("{}/?", self.app_url()));
        format!("{} rev {}", url, revision.raw)
    }

    fn read_vc_info(&self, dir: &Path) -> WadfResult<Option<VcInfo>> {
        if !dir.join(".svn").is_dir() {
            return Ok(None);
        }
        let Some((url, rev_raw)) = self.info(dir)? else {
            return Ok(None);
        };

        let (rev_type, rev_translated) = match LAYOUT.captures(&url) {
            Some(c) if c.get(1).is_some() => (RevType::Trunk, None),
            Some(c) => match (c.get(2), c.get(3)) {
                (Some(tag), _) => (RevType::Tag, Some(tag.as_str().to_string())),
                (None, Some(branch)) => (RevType::Branch, Some(branch.as_str().to_string())),
                _ => (RevType::Unknown, None),
            },
            None => (RevType::Unknown, None),
        };

        let info = VcInfo {
            url,
            rev_raw,
            rev_type,
            rev_translated,
            modifications: self.is_dirty(dir)?,
        };
        debug!(?info, "read svn working copy state");
        Ok(Some(info))
    }

    fn parse_dependency(&self, line: &str) -> Option<Dependency> {
        Self::parse_dependency_line(line)
    }

    fn install_dependency(
        &self,
        dependency: &Dependency,
        deploy_dir: &Path,
    ) -> WadfResult<Option<PathBuf>> {
        match dependency {
            Dependency::Svn(dep) => self.install_svn(dep, deploy_dir),
            other => Err(WadfError::config(format!(
                "Dependency {} is not an SVN dependency",
                other
            ))),
        }
    }

    fn files_to_ignore(&self) -> &'static [&'static str] {
        Self::IGNORED
    }
}
