//! Fallback rules for numbered entities
//!
//! `db2_host` falls back to `db_host` with `db_number` set to `2`;
//! `vhost1_name` falls back to `vhost_name` with `vhost_number` empty, since
//! entity #1 is the default one.

use std::collections::HashMap;

use regex::Regex;

use crate::domain::entities::ValueStack;

/// One `pattern -> base macro` rule; the pattern captures the entity number
#[derive(Debug, Clone)]
pub struct FallbackRule {
    pattern: Regex,
    base: &'static str,
}

impl FallbackRule {
    fn new(pattern: &str, base: &'static str) -> Self {
        Self {
            pattern: Regex::new(&format!("^{}$", pattern)).expect("fallback regex is valid"),
            base,
        }
    }

    pub fn base(&self) -> &'static str {
        self.base
    }
}

/// Result of matching a macro name against the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackMatch {
    pub base: &'static str,
    /// `db_number` or `vhost_number`
    pub number_macro: &'static str,
    /// Empty for entity #1
    pub number: String,
}

#[derive(Debug, Clone)]
pub struct FallbackTable {
    rules: Vec<FallbackRule>,
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl FallbackTable {
    /// The built-in table, checked in this order
    pub fn standard() -> Self {
        let rules = [
            (r"vhost(\d+)_name", "vhost_name"),
            (r"vhost(\d+)_interface", "vhost_interface"),
            (r"vhost(\d+)_config_template", "vhost_config_template"),
            (r"vhost(\d+)_config_prepend", "vhost_config_prepend"),
            (r"vhost(\d+)_config_append", "vhost_config_append"),
            (r"db(\d+)_type", "db_type"),
            (r"db(\d+)_name", "db_name"),
            (r"db(\d+)_host", "db_host"),
            (r"db(\d+)_user", "db_user"),
            (r"db(\d+)_user_host", "db_user_host"),
            (r"db(\d+)_pass", "db_pass"),
            (r"db(\d+)_schema", "db_schema"),
            (r"db(\d+)_deploy", "db_deploy"),
            (r"db(\d+)_deploy_user", "db_deploy_user"),
            (r"db(\d+)_deploy_pass", "db_deploy_pass"),
        ]
        .into_iter()
        .map(|(pattern, base)| FallbackRule::new(pattern, base))
        .collect();
        Self { rules }
    }

    /// First rule matching `name`, in table order
    pub fn find(&self, name: &str) -> Option<FallbackMatch> {
        self.rules.iter().find_map(|rule| {
            let caps = rule.pattern.captures(name)?;
            let digits = &caps[1];
            let number = if digits.parse::<u64>().ok() == Some(1) {
                String::new()
            } else {
                digits.to_string()
            };
            let number_macro = if rule.base.starts_with("db") {
                "db_number"
            } else {
                "vhost_number"
            };
            Some(FallbackMatch {
                base: rule.base,
                number_macro,
                number,
            })
        })
    }

    /// Names that only act as fallbacks (`db_host`, `vhost_name`, ...)
    pub fn base_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(FallbackRule::base)
    }

    pub fn is_base_name(&self, name: &str) -> bool {
        self.base_names().any(|b| b == name)
    }
}

/// A borrowed value stack with local entries layered on top.
///
/// Used while resolving a fallback: the entity number and anything memoized
/// during that resolution live in the overlay and disappear with it.
pub struct OverlayStack<'a> {
    base: &'a dyn ValueStack,
    overlay: HashMap<String, String>,
}

impl<'a> OverlayStack<'a> {
    pub fn new(base: &'a dyn ValueStack) -> Self {
        Self {
            base,
            overlay: HashMap::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.overlay.insert(name.to_string(), value.into());
        self
    }
}

impl ValueStack for OverlayStack<'_> {
    fn lookup(&self, name: &str) -> Option<&str> {
        match self.overlay.get(name) {
            Some(v) => Some(v.as_str()),
            None => self.base.lookup(name),
        }
    }

    fn memoize(&mut self, name: &str, value: &str) {
        self.overlay.insert(name.to_string(), value.to_string());
    }
}
