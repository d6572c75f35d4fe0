//! Revision locators
//!
//! A logical revision (`trunk`, `branch/<name>`, `tag/<name>`) plus a raw
//! changeset id, and the version-string parsing used on the command line.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{WadfError, WadfResult};

/// The raw revision meaning "newest"
pub const HEAD: &str = "HEAD";

/// Tag name that selects the newest tag
pub const LATEST_TAG: &str = "LATEST";

static VERSION_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(trunk|tag|branch)(/(.+))?$").expect("version string regex is valid")
});

/// Kind of logical revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RevType {
    Trunk,
    Branch,
    Tag,
    Unknown,
}

impl fmt::Display for RevType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RevType::Trunk => "trunk",
            RevType::Branch => "branch",
            RevType::Tag => "tag",
            RevType::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Where a working copy should point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionSpec {
    pub rev_type: RevType,
    /// Branch or tag name; `None` for trunk
    pub translated: Option<String>,
    /// Changeset id, or [`HEAD`]
    pub raw: String,
}

impl RevisionSpec {
    pub fn trunk() -> Self {
        Self {
            rev_type: RevType::Trunk,
            translated: None,
            raw: HEAD.to_string(),
        }
    }

    pub fn branch(name: impl Into<String>) -> Self {
        Self {
            rev_type: RevType::Branch,
            translated: Some(name.into()),
            raw: HEAD.to_string(),
        }
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            rev_type: RevType::Tag,
            translated: Some(name.into()),
            raw: HEAD.to_string(),
        }
    }

    pub fn at(mut self, raw: impl Into<String>) -> Self {
        self.raw = raw.into();
        self
    }

    pub fn is_head(&self) -> bool {
        self.raw == HEAD
    }

    /// Branch or tag name, or an empty string for trunk
    pub fn name(&self) -> &str {
        self.translated.as_deref().unwrap_or("")
    }

    pub fn is_latest_tag(&self) -> bool {
        self.rev_type == RevType::Tag && self.translated.as_deref() == Some(LATEST_TAG)
    }

    /// Reject combinations no driver can check out
    pub fn validate(&self) -> WadfResult<()> {
        match self.rev_type {
            RevType::Tag if !self.is_head() => Err(WadfError::config(format!(
                "Raw revision '{}' cannot be combined with tag '{}'; tags are immutable",
                self.raw,
                self.name()
            ))),
            RevType::Branch | RevType::Tag if self.name().is_empty() => Err(WadfError::config(
                format!("Missing {} name", self.rev_type),
            )),
            RevType::Unknown => Err(WadfError::config("Cannot check out an unknown revision type")),
            _ => Ok(()),
        }
    }

    /// Parse `trunk`, `branch/<name>`, `tag/<name>` with a raw revision.
    ///
    /// `tag/LATEST` is returned as-is; the caller swaps in the newest tag.
    pub fn parse(text: &str, raw: &str) -> WadfResult<Self> {
        let caps = VERSION_STRING
            .captures(text)
            .ok_or_else(|| WadfError::config(format!("Could not parse revision type '{}'", text)))?;
        let name = caps.get(3).map(|m| m.as_str().trim().to_string());

        let spec = match &caps[1] {
            "trunk" => {
                if caps.get(2).is_some() {
                    return Err(WadfError::config("trunk does not take a parameter"));
                }
                RevisionSpec::trunk()
            }
            "tag" => {
                if raw != HEAD {
                    return Err(WadfError::config(
                        "Don't pass a revision number when deploying from a tag",
                    ));
                }
                match name {
                    Some(n) if !n.is_empty() => RevisionSpec::tag(n),
                    _ => return Err(WadfError::config("Missing tag number")),
                }
            }
            _ => match name {
                Some(n) if !n.is_empty() => RevisionSpec::branch(n),
                _ => return Err(WadfError::config("Missing branch name")),
            },
        };
        Ok(spec.at(raw))
    }
}

impl fmt::Display for RevisionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rev_type {
            RevType::Trunk => write!(f, "trunk")?,
            other => write!(f, "{}/{}", other, self.name())?,
        }
        if !self.is_head() {
            write!(f, "@{}", self.raw)?;
        }
        Ok(())
    }
}
