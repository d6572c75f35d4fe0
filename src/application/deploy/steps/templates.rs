//! Template rendering
//!
//! Every `name.template` under the deployment directory is rendered to
//! `name`, keeping the template's permissions.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::checkout::output_path;
use crate::application::deploy::use_case::{relative_to, DeployUseCase};
use crate::domain::ports::DeployEvent;
use crate::domain::services::MacroEngine;
use crate::error::{WadfError, WadfResult};

/// Mask applied to generated files unless `generated_files_writeable` is on
#[cfg(unix)]
const READ_ONLY_MASK: u32 = 0o100555;

impl DeployUseCase {
    /// Render all templates not under `template_exclude_paths`; returns the
    /// files written
    pub(crate) fn process_templates(
        &self,
        engine: &mut MacroEngine,
        dir: &Path,
    ) -> WadfResult<Vec<PathBuf>> {
        let excluded = exclude_paths(&engine.get_or_empty("template_exclude_paths")?);
        let writable = engine.resolve("generated_files_writeable")?;
        let read_only = writable.trim().is_empty() || writable.trim() == "0";

        let mut rendered = Vec::new();
        for template in self.template_files(dir)? {
            let relative = relative_to(&template, dir).unwrap_or(&template);
            if let Some(prefix) = excluded
                .iter()
                .find(|p| relative.to_string_lossy().starts_with(p.as_str()))
            {
                debug!(
                    "Excluding file {} from templating (matches excluded path '{}')",
                    template.display(),
                    prefix
                );
                continue;
            }

            let bytes = fs::read(&template).map_err(|e| WadfError::io_at(&template, e))?;
            let context = format!("file:{}", template.display());
            let content = engine.resolve_string(&String::from_utf8_lossy(&bytes), Some(&context))?;

            let output = output_path(&template);
            write_output(&template, &output, &content, read_only)?;
            self.events.on_event(DeployEvent::TemplateRendered {
                path: output.display().to_string(),
            });
            rendered.push(output);
        }
        Ok(rendered)
    }
}

fn exclude_paths(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(unix)]
fn write_output(template: &Path, output: &Path, content: &str, read_only: bool) -> WadfResult<()> {
    use std::os::unix::fs::PermissionsExt;

    if output.exists() {
        fs::set_permissions(output, fs::Permissions::from_mode(0o600))
            .map_err(|e| WadfError::io_at(output, e))?;
    }
    fs::write(output, content).map_err(|e| WadfError::io_at(output, e))?;

    let source_mode = fs::metadata(template)
        .map_err(|e| WadfError::io_at(template, e))?
        .permissions()
        .mode();
    let mode = if read_only {
        source_mode & READ_ONLY_MASK
    } else {
        source_mode
    };
    fs::set_permissions(output, fs::Permissions::from_mode(mode))
        .map_err(|e| WadfError::io_at(output, e))
}

#[cfg(not(unix))]
fn write_output(template: &Path, output: &Path, content: &str, read_only: bool) -> WadfResult<()> {
    if output.exists() {
        let mut perms = fs::metadata(output)
            .map_err(|e| WadfError::io_at(output, e))?
            .permissions();
        perms.set_readonly(false);
        fs::set_permissions(output, perms).map_err(|e| WadfError::io_at(output, e))?;
    }
    fs::write(output, content).map_err(|e| WadfError::io_at(output, e))?;
    let mut perms = fs::metadata(template)
        .map_err(|e| WadfError::io_at(template, e))?
        .permissions();
    if read_only {
        perms.set_readonly(true);
    }
    fs::set_permissions(output, perms).map_err(|e| WadfError::io_at(output, e))
}
