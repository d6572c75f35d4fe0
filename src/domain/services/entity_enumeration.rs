//! Numbered entity enumeration
//!
//! Templates refer to databases and virtual hosts by number (`db2_name`,
//! `vhost1_name`). These helpers find which numbers are in use.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::value_objects::MacroRef;

static NUMBERED_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(db|vhost)(\d+)_").expect("entity regex is valid"));

/// Entity numbers in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberedEntities {
    pub databases: Vec<String>,
    pub vhosts: Vec<String>,
}

impl NumberedEntities {
    /// Collect entity numbers from macro references (modifiers ignored)
    pub fn from_references<S: AsRef<str>>(references: &[S]) -> Self {
        let mut found = Self::default();
        for reference in references {
            let name = MacroRef::parse(reference.as_ref()).name;
            if let Some(caps) = NUMBERED_ENTITY.captures(&name) {
                let list = if &caps[1] == "db" {
                    &mut found.databases
                } else {
                    &mut found.vhosts
                };
                let number = caps[2].to_string();
                if !list.contains(&number) {
                    list.push(number);
                }
            }
        }
        found
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty() && self.vhosts.is_empty()
    }
}

/// Whether `name` is a numbered entity macro such as `db1_host`
pub fn is_numbered_entity_macro(name: &str) -> bool {
    NUMBERED_ENTITY.is_match(name)
}

/// The macros to force-resolve for a set of template references: every
/// numbered entity macro plus the deployment macros each database implies.
pub fn entity_macros_to_resolve<S: AsRef<str>>(
    references: &[S],
    deploying_database: bool,
) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: String| {
        if !names.contains(&name) {
            names.push(name);
        }
    };

    for reference in references {
        let name = MacroRef::parse(reference.as_ref()).name;
        let Some(caps) = NUMBERED_ENTITY.captures(&name) else {
            continue;
        };
        let kind = caps[1].to_string();
        let num = caps[2].to_string();
        push(name.clone());
        if kind == "db" {
            push(format!("db{}_deploy", num));
            push(format!("db{}_deploy_user", num));
            if deploying_database {
                push(format!("db{}_deploy_pass", num));
                push(format!("db{}_user_host", num));
            }
        }
    }
    names
}
