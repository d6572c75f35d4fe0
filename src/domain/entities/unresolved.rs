//! Unresolved macro records
//!
//! Collected during a run so every missing value can be reported together.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

/// A macro that resolved to its own sentinel, and where that happened
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnresolvedMacro {
    pub name: String,
    /// e.g. `file:/srv/app/config.php.template`; `None` for config resolution
    pub context: Option<String>,
}

impl UnresolvedMacro {
    /// Deduplication key: hash of context followed by macro name
    pub fn key(&self) -> String {
        record_key(self.context.as_deref(), &self.name)
    }
}

fn record_key(context: Option<&str>, name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(context.unwrap_or("").as_bytes());
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Append-only, deduplicated list of unresolved records
#[derive(Debug, Clone, Default)]
pub struct UnresolvedMacros {
    records: Vec<UnresolvedMacro>,
    seen: HashSet<String>,
}

impl UnresolvedMacros {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure; returns false if this (context, macro) pair was
    /// already known
    pub fn record(&mut self, name: &str, context: Option<&str>) -> bool {
        if !self.seen.insert(record_key(context, name)) {
            return false;
        }
        self.records.push(UnresolvedMacro {
            name: name.to_string(),
            context: context.map(str::to_string),
        });
        true
    }

    pub fn records(&self) -> &[UnresolvedMacro] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
