//! Macro reference value object
//!
//! A reference as written inside `@...@`: an optional `modifier:` prefix
//! followed by the bare macro name.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{WadfError, WadfResult};

static MODIFIER_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+):(.+)$").expect("modifier regex is valid"));

static RAND_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+)_(-?\d+)$").expect("rand regex is valid"));

/// Transformation applied to a resolved value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Replace the appref separator with `-`
    Hyphen,
    /// Replace the appref separator with `/`
    Slash,
    /// Replace the appref separator with `_`
    Underscore,
    /// `rand:LOW_HIGH`, a fresh random integer on every lookup
    Rand,
}

impl Modifier {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "hyphen" => Some(Modifier::Hyphen),
            "slash" => Some(Modifier::Slash),
            "underscore" => Some(Modifier::Underscore),
            "rand" => Some(Modifier::Rand),
            _ => None,
        }
    }

    /// Replacement for the separator; `None` for `rand`
    pub fn replacement(self) -> Option<&'static str> {
        match self {
            Modifier::Hyphen => Some("-"),
            Modifier::Slash => Some("/"),
            Modifier::Underscore => Some("_"),
            Modifier::Rand => None,
        }
    }
}

/// A parsed `[modifier:]name` reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroRef {
    /// Modifier text as written; validated only when it is applied
    pub modifier: Option<String>,
    pub name: String,
}

impl MacroRef {
    pub fn parse(reference: &str) -> Self {
        match MODIFIER_SPLIT.captures(reference) {
            Some(caps) => Self {
                modifier: Some(caps[1].to_string()),
                name: caps[2].to_string(),
            },
            None => Self {
                modifier: None,
                name: reference.to_string(),
            },
        }
    }

    pub fn is_rand(&self) -> bool {
        self.modifier.as_deref() == Some("rand")
    }

    /// Inclusive bounds of a `rand:LOW_HIGH` reference, low first
    pub fn rand_range(&self) -> WadfResult<(i64, i64)> {
        let caps = RAND_RANGE.captures(&self.name).ok_or_else(|| {
            WadfError::config(format!(
                "Invalid arguments to rand modifier: '{}' (expected <int>_<int>)",
                self.name
            ))
        })?;
        let parse = |s: &str| {
            s.parse::<i64>().map_err(|_| {
                WadfError::config(format!("rand bound '{}' is out of range", s))
            })
        };
        let low = parse(&caps[1])?;
        let high = parse(&caps[2])?;
        Ok(if low <= high { (low, high) } else { (high, low) })
    }
}
