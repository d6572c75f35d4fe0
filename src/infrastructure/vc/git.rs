//! Git driver
//!
//! Repositories live at `<vc_base><appref>.git`. Trunk is the `master`
//! branch; tags are checked out detached as `tags/<name>`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info, warn};

use super::{backup_dir, target_is_usable, TargetState, VcLocation};
use crate::domain::ports::{CommandOutput, CommandRunner, CommandSpec, VcDriver};
use crate::domain::value_objects::{
    Dependency, GitDependency, RevType, RevisionSpec, VcInfo, HEAD,
};
use crate::error::{WadfError, WadfResult};

const TRUNK_BRANCH: &str = "master";

static LS_REMOTE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]{40})\s+refs/tags/(.*?)(\^\{\})?$").expect("ls-remote regex is valid")
});

static DEPENDENCY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)(?:\|(branch|tag)\|(.*?)(?:\|(.*?))?)?\s(.*)$")
        .expect("git dependency regex is valid")
});

pub struct GitDriver {
    runner: Arc<dyn CommandRunner>,
    location: VcLocation,
}

impl GitDriver {
    pub const NAME: &'static str = "Git";
    pub const IGNORED: &'static [&'static str] = &[".git"];

    pub fn new(runner: Arc<dyn CommandRunner>, location: VcLocation) -> Self {
        Self { runner, location }
    }

    pub fn repo_url(&self) -> String {
        format!("{}{}.git", self.location.base, self.location.appref)
    }

    /// Parse `<url>[|branch|<name>[|<raw>]] <dest>` or `<url>[|tag|<name>] <dest>`
    pub fn parse_dependency_line(line: &str) -> Option<Dependency> {
        let caps = DEPENDENCY_LINE.captures(line.trim())?;
        let group = |i: usize| caps.get(i).map(|m| m.as_str()).filter(|s| !s.is_empty());

        let url = group(1)?;
        let revision = match (group(2), group(3), group(4)) {
            (None, None, None) => RevisionSpec::trunk(),
            (Some("branch"), Some(TRUNK_BRANCH), _) => RevisionSpec::trunk(),
            (Some("branch"), Some(name), _) => RevisionSpec::branch(name),
            (Some("tag"), Some(name), _) => RevisionSpec::tag(name),
            _ => return None,
        };
        let revision = revision.at(group(4).unwrap_or(HEAD));
        revision.validate().ok()?;

        let dest = group(5)?.trim().trim_start_matches('/');
        if dest.is_empty() {
            return None;
        }
        Some(Dependency::Git(GitDependency {
            url: url.to_string(),
            revision,
            dest_path: PathBuf::from(dest),
        }))
    }

    fn git(&self, dir: Option<&Path>) -> CommandSpec {
        let spec = CommandSpec::new("git");
        match dir {
            Some(d) => spec.current_dir(d),
            None => spec,
        }
    }

    fn run_in(&self, dir: &Path, args: &[&str]) -> WadfResult<CommandOutput> {
        self.runner.run_checked(&self.git(Some(dir)).args(args.iter().copied()))
    }

    fn clone_into(&self, url: &str, dest: &Path) -> WadfResult<()> {
        self.runner
            .run_checked(&self.git(None).arg("clone").arg(url).path_arg(dest))?;
        Ok(())
    }

    /// Point the working copy at `dest` to `revision`
    fn move_to(&self, revision: &RevisionSpec, dest: &Path) -> WadfResult<()> {
        match (revision.rev_type, revision.is_head()) {
            (RevType::Trunk, true) => {
                self.run_in(dest, &["checkout", TRUNK_BRANCH])?;
                self.fast_forward(dest, TRUNK_BRANCH)
            }
            (RevType::Branch, true) => {
                self.run_in(dest, &["checkout", revision.name()])?;
                self.fast_forward(dest, revision.name())
            }
            (RevType::Trunk, false) | (RevType::Branch, false) => {
                self.run_in(dest, &["checkout", "--detach", &revision.raw])?;
                Ok(())
            }
            (RevType::Tag, _) => {
                let tag = format!("tags/{}", revision.name());
                self.run_in(dest, &["checkout", &tag])?;
                Ok(())
            }
            (RevType::Unknown, _) => Err(WadfError::config("Bad revision type: unknown")),
        }
    }

    fn fast_forward(&self, dest: &Path, branch: &str) -> WadfResult<()> {
        let upstream = format!("origin/{}", branch);
        self.run_in(dest, &["merge", "--ff-only", &upstream])?;
        Ok(())
    }

    fn fetch(&self, dest: &Path) -> WadfResult<()> {
        self.run_in(dest, &["fetch", "--tags", "origin"])?;
        Ok(())
    }

    fn origin_url(&self, dir: &Path) -> WadfResult<String> {
        let out = self.runner.run(
            &self
                .git(Some(dir))
                .args(["config", "--get", "remote.origin.url"]),
        )?;
        Ok(out.first_line().unwrap_or("").to_string())
    }

    fn is_dirty(&self, dir: &Path) -> WadfResult<bool> {
        let out = self.run_in(dir, &["status", "--porcelain"])?;
        let dirty = out.stdout_lines().any(|l| !l.trim().is_empty());
        Ok(dirty)
    }

    fn probe(&self, path: &Path) -> WadfResult<TargetState> {
        if !path.exists() {
            return Ok(TargetState::Absent);
        }
        if !path.join(".git").is_dir() {
            return Ok(TargetState::Foreign);
        }
        Ok(TargetState::WorkingCopy {
            url: self.origin_url(path)?,
            dirty: self.is_dirty(path)?,
        })
    }

    fn install_git(&self, dep: &GitDependency, deploy_dir: &Path) -> WadfResult<Option<PathBuf>> {
        let path = deploy_dir.join(&dep.dest_path);
        let state = self.probe(&path)?;
        if !target_is_usable(&state, Self::NAME, &dep.url, &path) {
            return Ok(None);
        }
        match state {
            TargetState::WorkingCopy { url, .. } if url != dep.url => {
                warn!(
                    "Cannot deploy Git dependency {}; {} is a working copy of {}",
                    dep.url,
                    path.display(),
                    url
                );
                Ok(None)
            }
            TargetState::WorkingCopy { .. } => {
                info!("Deploying Git dependency {} to existing working copy {}", dep.url, path.display());
                self.fetch(&path)?;
                self.move_to(&dep.revision, &path)?;
                Ok(Some(path))
            }
            _ => {
                info!("Deploying Git dependency {} to {}", dep.url, path.display());
                self.clone_into(&dep.url, &path)?;
                self.move_to(&dep.revision, &path)?;
                Ok(Some(path))
            }
        }
    }
}

impl VcDriver for GitDriver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn checkout(&self, revision: &RevisionSpec, dest: &Path) -> WadfResult<()> {
        revision.validate()?;
        self.clone_into(&self.repo_url(), dest)?;
        self.move_to(revision, dest)
    }

    fn switch_ver(&self, revision: &RevisionSpec, dest: &Path) -> WadfResult<()> {
        revision.validate()?;
        let origin = self.origin_url(dest)?;
        if origin != self.repo_url() {
            info!(
                "Working copy at {} tracks {} instead of {}; checking out afresh",
                dest.display(),
                if origin.is_empty() { "nothing" } else { origin.as_str() },
                self.repo_url()
            );
            backup_dir(dest)?;
            return self.checkout(revision, dest);
        }
        self.fetch(dest)?;
        self.move_to(revision, dest)
    }

    fn list_tags(&self) -> WadfResult<Vec<String>> {
        let url = self.repo_url();
        let out = self
            .runner
            .run(&self.git(None).args(["ls-remote", "--tags"]).arg(&url))?;
        if !out.success() {
            return Err(WadfError::tool(
                "git ls-remote",
                out.status,
                format!("Error when listing tags of {} - perhaps there aren't any?", url),
            ));
        }

        let mut tags: Vec<String> = Vec::new();
        for line in out.stdout_lines() {
            if let Some(caps) = LS_REMOTE_TAG.captures(line.trim()) {
                let tag = caps[2].to_string();
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
        Ok(tags)
    }

    fn label(&self, revision: &RevisionSpec) -> String {
        let what = match revision.rev_type {
            RevType::Trunk => format!("branch {}", TRUNK_BRANCH),
            RevType::Branch => format!("branch {}", revision.name()),
            RevType::Tag => format!("tag {}", revision.name()),
            RevType::Unknown => "unknown revision".to_string(),
        };
        let at = if revision.is_head() {
            "at HEAD".to_string()
        } else {
            format!("at commit {}", revision.raw)
        };
        format!("{} {} {}", self.repo_url(), what, at)
    }

    fn read_vc_info(&self, dir: &Path) -> WadfResult<Option<VcInfo>> {
        if !dir.join(".git").is_dir() {
            return Ok(None);
        }

        let branches = self.runner.run(&self.git(Some(dir)).arg("branch"))?;
        if !branches.success() {
            return Ok(None);
        }
        let Some(current) = branches
            .stdout_lines()
            .find_map(|l| l.strip_prefix("* "))
            .map(str::trim)
        else {
            return Ok(None);
        };

        let (rev_type, rev_translated) = if current == TRUNK_BRANCH {
            (RevType::Trunk, None)
        } else if current.starts_with('(') {
            let describe = self.runner.run(
                &self
                    .git(Some(dir))
                    .args(["describe", "--exact-match", "--tags", "HEAD"]),
            )?;
            match describe.first_line() {
                Some(tag) if describe.success() => (RevType::Tag, Some(tag.to_string())),
                _ => (RevType::Unknown, None),
            }
        } else {
            (RevType::Branch, Some(current.to_string()))
        };

        let log = self.runner.run(
            &self
                .git(Some(dir))
                .args(["log", "--pretty=oneline", "--abbrev-commit", "-n", "1"]),
        )?;
        let Some(rev_raw) = log
            .first_line()
            .and_then(|l| l.split_whitespace().next())
            .filter(|_| log.success())
        else {
            return Ok(None);
        };

        let info = VcInfo {
            url: self.origin_url(dir)?,
            rev_raw: rev_raw.to_string(),
            rev_type,
            rev_translated,
            modifications: self.is_dirty(dir)?,
        };
        debug!(?info, "read git working copy state");
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
            Dependency::Git(dep) => self.install_git(dep, deploy_dir),
            other => Err(WadfError::config(format!(
                "Dependency {} is not a Git dependency",
                other
            ))),
        }
    }

    fn files_to_ignore(&self) -> &'static [&'static str] {
        Self::IGNORED
    }
}
