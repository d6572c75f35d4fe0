use wadf::WadfError;

use crate::ui::terminal::{detect_capabilities, TerminalCapabilities};
use crate::ui::text::{paint, wrap, Tone};

const INDENT: &str = "  ";

pub fn format_error(err: &anyhow::Error) -> String {
    format_error_with(err, &detect_capabilities())
}

fn format_error_with(err: &anyhow::Error, caps: &TerminalCapabilities) -> String {
    let width = usize::from(caps.width);
    let label = format!("{} ", Tone::Error.icon(caps.supports_unicode));
    let mut out = paint(&label, Tone::Error, caps.supports_color);
    out.push_str(&wrap(&err.to_string(), width.saturating_sub(label.len()), INDENT));
    out.push('\n');

    if let Some(hint) = err.downcast_ref::<WadfError>().and_then(hint_for) {
        let hint = wrap(&hint, width, INDENT);
        out.push_str(INDENT);
        out.push_str(&paint(&hint, Tone::Dim, caps.supports_color));
        out.push('\n');
    }
    out
}

fn hint_for(err: &WadfError) -> Option<String> {
    match err {
        WadfError::RequiredInput { name, .. } => Some(format!(
            "Set {} in the application config, or pass -D {}=<value>.",
            name, name
        )),
        WadfError::ExternalTool { .. } => {
            Some("Run again with -vv to see the commands wadf runs.".to_string())
        }
        WadfError::DirtyWorkingCopy { path } => Some(format!(
            "Commit or revert the changes in {} first.",
            path.display()
        )),
        _ => None,
    }
}

pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let output = serde_json::json!({
            "event": "error",
            "message": err.to_string(),
        });
        let _ = crate::ui::json::emit(output);
        return;
    }
    eprint!("{}", format_error(err));
}
