use wadf::domain::entities::UnresolvedMacro;
use wadf::{DeployReport, UndeployReport};

use crate::ui::text::{paint, Tone};

pub fn render_deploy_summary(
    report: &DeployReport,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let tone = if report.is_complete() {
        Tone::Success
    } else {
        Tone::Warning
    };
    let mut out = format!(
        "{} Deployed {} ({}) to {}\n",
        paint(tone.icon(supports_unicode), tone, supports_color),
        report.instance,
        report.deploy_version,
        report.deploy_path.display()
    );

    let mut stat = |label: &str, value: String| {
        out.push_str(&format!("  {:<18}{}\n", label, value));
    };
    stat("templates", report.rendered.len().to_string());
    if let Some(vhost) = &report.vhost_config {
        stat("vhost config", vhost.display().to_string());
    }
    if report.database_deployed {
        stat("database", "deployed".to_string());
    }
    if report.scheduled_jobs_deployed {
        stat("scheduled jobs", "installed".to_string());
    }
    if !report.cleaned_up.is_empty() {
        stat("cleaned up", report.cleaned_up.len().to_string());
    }

    for dependency in &report.skipped_dependencies {
        out.push_str(&format!(
            "{} Skipped dependency {}\n",
            paint(Tone::Warning.icon(supports_unicode), Tone::Warning, supports_color),
            dependency
        ));
    }
    out.push_str(&render_unresolved(&report.unresolved, supports_color, supports_unicode));
    out
}

pub fn render_undeploy_summary(
    report: &UndeployReport,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let mut out = format!(
        "{} Undeployed {} from {}\n",
        paint(Tone::Success.icon(supports_unicode), Tone::Success, supports_color),
        report.instance,
        report.deploy_path.display()
    );
    if report.database_removed {
        out.push_str("  databases removed\n");
    }
    out
}

/// Macros that never got a value, with where they were used
pub fn render_unresolved(
    unresolved: &[UnresolvedMacro],
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    if unresolved.is_empty() {
        return String::new();
    }
    let mut out = format!(
        "{} {} unresolved macro(s):\n",
        paint(Tone::Warning.icon(supports_unicode), Tone::Warning, supports_color),
        unresolved.len()
    );
    for record in unresolved {
        match &record.context {
            Some(context) => out.push_str(&format!(
                "  @{}@ {}\n",
                record.name,
                paint(&format!("in {}", context), Tone::Dim, supports_color)
            )),
            None => out.push_str(&format!("  @{}@\n", record.name)),
        }
    }
    out
}
