//! Options that need a value from the operator
//!
//! A value starting with `**` must be configured before deploying; a value
//! starting with `%%` is asked for at deploy time. Anything after the marker
//! is a note for the operator.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error};

use crate::application::deploy::use_case::DeployUseCase;
use crate::domain::ports::{DeployEvent, InputRequest};
use crate::domain::services::{MacroEngine, INPUT_PREFIX, REQUIRED_PREFIX};
use crate::error::{WadfError, WadfResult};

static DB_PASSWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^db(\d+)_(deploy_)?pass$").expect("db password regex is valid")
});

impl DeployUseCase {
    /// Check every known option for `**` and `%%` markers.
    ///
    /// Answers go into the engine as they are given, so later prompts see
    /// them; the full list is returned for the instance file.
    pub(crate) fn check_options_requiring_input(
        &self,
        engine: &mut MacroEngine,
    ) -> WadfResult<Vec<(String, String)>> {
        let mut answers: Vec<(String, String)> = Vec::new();

        for name in engine.known_names() {
            if engine.fallbacks().is_base_name(&name) {
                continue;
            }
            let value = engine.resolve(&name)?;

            if let Some(notes) = value.strip_prefix(REQUIRED_PREFIX) {
                let notes = notes.trim().to_string();
                error!("The macro '{}' is set to '**', indicating that it needs to be configured.", name);
                return Err(WadfError::RequiredInput { name, notes });
            }

            let Some(notes) = value.strip_prefix(INPUT_PREFIX) else {
                continue;
            };
            let notes = notes.trim().to_string();
            let request = InputRequest {
                message: prompt_message(engine, &name, &notes)?,
                secret: is_secret(&name),
                name: name.clone(),
            };
            self.events
                .on_event(DeployEvent::InputRequested { name: name.clone() });

            let Some(answer) = self.prompter.prompt(&request)? else {
                return Err(WadfError::RequiredInput { name, notes });
            };
            let answer = answer.trim().to_string();
            debug!("Got a value for {}", name);
            engine.append([(name.as_str(), answer.as_str())])?;
            answers.push((name, answer));
        }
        Ok(answers)
    }
}

fn prompt_message(engine: &mut MacroEngine, name: &str, notes: &str) -> WadfResult<String> {
    let mut message = match DB_PASSWORD.captures(name) {
        Some(caps) => {
            let num = &caps[1];
            let db = engine.resolve(&format!("db{}_name", num))?;
            let host = engine.resolve(&format!("db{}_host", num))?;
            if caps.get(2).is_some() {
                let user = engine.resolve(&format!("db{}_deploy_user", num))?;
                format!(
                    "Please enter the database password for deployment (to deploy/undeploy database {} on {}, as user '{}')",
                    db, host, user
                )
            } else {
                let user = engine.resolve(&format!("db{}_user", num))?;
                format!(
                    "Please enter the database password (for database {} on {}, connecting as user '{}')",
                    db, host, user
                )
            }
        }
        None => format!("Please enter the value for the config option '{}'", name),
    };
    if !notes.is_empty() {
        message.push_str("\nNotes: ");
        message.push_str(notes);
    }
    Ok(message)
}

/// Read without echo
fn is_secret(name: &str) -> bool {
    name.ends_with("_pass") || name.to_ascii_lowercase().contains("password")
}
