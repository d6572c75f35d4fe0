use wadf::domain::services::vhost_config::DeployedInstance;
use wadf::MacroEntry;

use crate::ui::text::{paint, Tone};

/// One block per instance: working copy, version, then its virtual hosts
pub fn render_deployed(instances: &[DeployedInstance], supports_color: bool) -> String {
    if instances.is_empty() {
        return "No deployed instances found\n".to_string();
    }
    let mut out = String::new();
    for instance in instances {
        out.push_str(&format!(
            "{} {}\n",
            instance.instance,
            paint(&format!("({})", instance.deploy_version), Tone::Dim, supports_color)
        ));
        out.push_str(&format!("  working copy: {}\n", instance.working_dir));
        for vhost in &instance.vhosts {
            out.push_str(&format!("  {} on {}", vhost.hostname, vhost.interface));
            if let Some(description) = &vhost.description {
                out.push_str(&format!(" - {}", description));
            }
            out.push('\n');
        }
    }
    out
}

pub fn render_macros(macros: &[MacroEntry]) -> String {
    let width = macros.iter().map(|m| m.name.len()).max().unwrap_or(0);
    macros
        .iter()
        .map(|m| format!("{:<width$} = {}\n", m.name, m.value, width = width))
        .collect()
}
