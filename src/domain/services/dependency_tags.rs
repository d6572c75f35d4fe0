//! Dependency-tags file parsing
//!
//! One dependency per line, `<type>:<details>`. `#` and `;` start comment
//! lines. `PEAR` details are `channel/Package-version`; every other type is
//! handed to the version-control driver registered under that name.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::domain::ports::{DependencyLine, DependencySyntax};
use crate::domain::value_objects::{Dependency, PearDependency};

static TAG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z0-9]{2,10}):(.+)$").expect("tag line regex is valid"));

pub const PEAR_TYPE: &str = "PEAR";

/// Parse a whole tags file; bad lines are logged and skipped
pub fn parse_dependency_tags(contents: &str, syntax: &dyn DependencySyntax) -> Vec<Dependency> {
    let mut deps = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let Some(caps) = TAG_LINE.captures(line) else {
            warn!("Unknown dependency syntax in dep tags file - line was '{}'", line);
            continue;
        };
        let (type_name, rest) = (&caps[1], &caps[2]);

        if type_name == PEAR_TYPE {
            match PearDependency::parse(rest) {
                Some(dep) => deps.push(Dependency::Pear(dep)),
                None => warn!("Unknown dependency syntax in '{}'", rest),
            }
            continue;
        }

        match syntax.parse_vc_line(type_name, rest) {
            DependencyLine::Parsed(dep) => deps.push(dep),
            DependencyLine::Malformed => warn!("Unknown dependency syntax in '{}'", rest),
            DependencyLine::UnknownType => warn!(
                "Unknown dependency type '{}' in dep tags file - line was '{}'",
                type_name, line
            ),
        }
    }
    deps
}
