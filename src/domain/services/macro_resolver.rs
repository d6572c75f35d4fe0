//! Macro resolution
//!
//! Expands `@name@` and `@modifier:name@` references against a value stack,
//! falling back from numbered entity macros (`db2_host`) to their base
//! (`db_host`). A reference that cannot be resolved is left in place as its
//! own sentinel and recorded for the end-of-run report.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use tracing::trace;

use super::fallback::{FallbackTable, OverlayStack};
use crate::domain::entities::{
    is_sentinel, sentinel, MacroStore, MacroValues, UnresolvedMacros, ValueStack,
};
use crate::domain::value_objects::{MacroRef, Modifier};
use crate::error::{WadfError, WadfResult};

static MACRO_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(([a-z]+:)?-?([a-z0-9_]{3,50}))@").expect("macro reference regex is valid")
});

/// Upper bound on substitution passes over one string or the whole map
const MAX_PASSES: usize = 100;

/// Upper bound on nested fallback resolutions
const MAX_FALLBACK_DEPTH: usize = 32;

/// Prefix of a value that must be configured by a human
pub const REQUIRED_PREFIX: &str = "**";

/// Prefix of a value that must be entered interactively
pub const INPUT_PREFIX: &str = "%%";

/// Unique reference tokens in `text` (modifier prefix included), first-seen order
pub fn extract_references(text: &str) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for caps in MACRO_REFERENCE.captures_iter(text) {
        let token = &caps[1];
        if !refs.iter().any(|r| r == token) {
            refs.push(token.to_string());
        }
    }
    refs
}

/// Stateful part of macro resolution: the fallback table and the record of
/// everything that failed to resolve
#[derive(Debug, Default)]
pub struct MacroResolver {
    fallbacks: FallbackTable,
    unresolved: UnresolvedMacros,
    depth: usize,
}

impl MacroResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fallbacks(fallbacks: FallbackTable) -> Self {
        Self {
            fallbacks,
            ..Self::default()
        }
    }

    pub fn fallbacks(&self) -> &FallbackTable {
        &self.fallbacks
    }

    pub fn unresolved(&self) -> &UnresolvedMacros {
        &self.unresolved
    }

    /// Resolve one reference such as `db1_host` or `hyphen:appref`.
    ///
    /// Returns the sentinel `@reference@` when nothing matches.
    pub fn resolve_single(
        &mut self,
        reference: &str,
        stack: &mut dyn ValueStack,
    ) -> WadfResult<String> {
        let parsed = MacroRef::parse(reference);

        if parsed.is_rand() {
            let (low, high) = parsed.rand_range()?;
            return Ok(rand::thread_rng().gen_range(low..=high).to_string());
        }

        let resolved = match stack.lookup(&parsed.name) {
            Some(value) => Some(value.to_string()),
            None => self.resolve_fallback(&parsed.name, stack)?,
        };

        let Some(resolved) = resolved else {
            trace!(reference, "macro not resolved");
            return Ok(sentinel(reference));
        };

        let output = match parsed.modifier.as_deref() {
            None => resolved.clone(),
            Some(name) => {
                let modifier = Modifier::parse(name).ok_or_else(|| {
                    WadfError::config(format!("Unknown macro modifier '{}' in @{}@", name, reference))
                })?;
                self.apply_modifier(modifier, &resolved, stack)?
            }
        };

        stack.memoize(&parsed.name, &resolved);
        trace!(reference, value = %output, "resolved macro");
        Ok(output)
    }

    /// Value of a numbered macro (`db2_host`) taken from its base (`db_host`).
    ///
    /// `None` when no rule matches or the base is unset. The caller then
    /// keeps the numbered sentinel, so an unresolved record names `db2_host`,
    /// never the base.
    fn resolve_fallback(
        &mut self,
        name: &str,
        stack: &mut dyn ValueStack,
    ) -> WadfResult<Option<String>> {
        let Some(fallback) = self.fallbacks.find(name) else {
            return Ok(None);
        };
        if self.depth >= MAX_FALLBACK_DEPTH {
            return Err(WadfError::config(format!(
                "Fallback resolution of '{}' does not converge",
                name
            )));
        }

        if stack.lookup(fallback.base).is_none() {
            return Ok(None);
        }

        trace!(name, base = fallback.base, number = %fallback.number, "using fallback");
        let mut forked =
            OverlayStack::new(&*stack).with(fallback.number_macro, fallback.number.as_str());
        self.depth += 1;
        let result = self.expand(&sentinel(fallback.base), &mut forked, None);
        self.depth -= 1;
        result.map(Some)
    }

    fn apply_modifier(
        &mut self,
        modifier: Modifier,
        value: &str,
        stack: &mut dyn ValueStack,
    ) -> WadfResult<String> {
        let Some(replacement) = modifier.replacement() else {
            return Ok(value.to_string());
        };
        let separator = self.resolve_single("appref_separator", stack)?;
        if separator.is_empty() {
            return Ok(value.to_string());
        }
        Ok(value.replace(&separator, replacement))
    }

    /// Substitute references until the text stops changing; no `%%` guard
    fn expand(
        &mut self,
        text: &str,
        stack: &mut dyn ValueStack,
        context: Option<&str>,
    ) -> WadfResult<String> {
        let mut current = text.to_string();
        for _ in 0..MAX_PASSES {
            let before = current.clone();
            for reference in extract_references(&before) {
                let value = self.resolve_single(&reference, stack)?;
                if is_sentinel(&value, &reference) {
                    self.unresolved.record(&reference, context);
                } else {
                    current = current.replace(&sentinel(&reference), &value);
                }
            }
            if current == before {
                return Ok(current);
            }
        }
        Err(WadfError::config(format!(
            "Macro expansion of '{}' does not converge (circular reference?)",
            truncate(text, 60)
        )))
    }

    /// Resolve every reference in `text`.
    ///
    /// If the whole result starts with `%%` the original text is returned so
    /// the caller can prompt for the value instead of embedding the marker.
    pub fn resolve_string(
        &mut self,
        text: &str,
        stack: &mut dyn ValueStack,
        context: Option<&str>,
    ) -> WadfResult<String> {
        let resolved = self.expand(text, stack, context)?;
        if resolved.starts_with(INPUT_PREFIX) {
            return Ok(text.to_string());
        }
        Ok(resolved)
    }

    /// Rebuild the store's value map from its definitions and iterate to a
    /// fixed point.
    ///
    /// A definition whose value refers to its own name gets the previously
    /// seeded value substituted once.
    pub fn resolve_all(&mut self, store: &mut MacroStore) -> WadfResult<()> {
        let mut values = MacroValues::new();
        for def in store.definitions() {
            let own = sentinel(&def.name);
            let value = if def.value.contains(&own) {
                let prior = values.get(&def.name).unwrap_or("").to_string();
                def.value.replace(&own, &prior)
            } else {
                def.value.clone()
            };
            values.insert(&def.name, value);
        }

        for _ in 0..MAX_PASSES {
            let mut changed = false;
            for name in values.names() {
                let current = values.get(&name).unwrap_or("").to_string();
                let resolved = self.resolve_string(&current, &mut values, None)?;
                if resolved != current {
                    values.insert(&name, resolved);
                    changed = true;
                }
            }
            if !changed {
                store.replace_values(values);
                return Ok(());
            }
        }
        Err(WadfError::config(
            "Macro values do not reach a fixed point (circular reference?)",
        ))
    }
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
