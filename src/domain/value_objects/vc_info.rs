//! Live version-control state of a working copy

use std::fmt;

use super::revision::RevType;

/// What a working copy currently points at
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VcInfo {
    pub url: String,
    pub rev_raw: String,
    pub rev_type: RevType,
    pub rev_translated: Option<String>,
    pub modifications: bool,
}

impl VcInfo {
    pub fn identifier(&self) -> VcIdentifier {
        VcIdentifier::new(
            self.rev_type,
            self.rev_translated.as_deref(),
            &self.rev_raw,
            self.modifications,
        )
    }
}

/// Version string recorded as `deploy_version` after a checkout.
///
/// `DEVTR:<raw>` for trunk, `DEVBR/<branch>:<raw>` for branches, the tag
/// name for tags, `unknown` otherwise; dirty copies get a suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VcIdentifier(String);

impl VcIdentifier {
    pub fn new(
        rev_type: RevType,
        translated: Option<&str>,
        raw: &str,
        modifications: bool,
    ) -> Self {
        let mut id = match rev_type {
            RevType::Trunk => format!("DEVTR:{}", raw),
            RevType::Branch => format!("DEVBR/{}:{}", translated.unwrap_or(""), raw),
            RevType::Tag => translated.unwrap_or("").to_string(),
            RevType::Unknown => "unknown".to_string(),
        };
        if modifications {
            id.push_str(" (with modifications)");
        }
        Self(id)
    }

    pub fn unknown() -> Self {
        Self::new(RevType::Unknown, None, "", false)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VcIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers() {
        assert_eq!(VcIdentifier::new(RevType::Trunk, None, "1234", false).as_str(), "DEVTR:1234");
        assert_eq!(
            VcIdentifier::new(RevType::Branch, Some("feature"), "a1b2c3d", false).as_str(),
            "DEVBR/feature:a1b2c3d"
        );
        assert_eq!(VcIdentifier::new(RevType::Tag, Some("2.0.1"), "99", false).as_str(), "2.0.1");
        assert_eq!(VcIdentifier::unknown().as_str(), "unknown");
    }

    #[test]
    fn modifications_suffix() {
        let info = VcInfo {
            url: "https://svn.example.com/app/trunk".to_string(),
            rev_raw: "77".to_string(),
            rev_type: RevType::Trunk,
            rev_translated: None,
            modifications: true,
        };
        assert_eq!(info.identifier().as_str(), "DEVTR:77 (with modifications)");
    }
}
