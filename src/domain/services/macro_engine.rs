//! Macro Engine
//!
//! The macro store and resolver together: the single owner of all macro
//! state for one deployment run. Config loading appends to it, every other
//! component reads through it.

use tracing::debug;

use super::fallback::FallbackTable;
use super::macro_resolver::MacroResolver;
use crate::domain::entities::{
    is_sentinel, MacroDefinition, MacroStore, MacroValues, UnresolvedMacros,
};
use crate::error::WadfResult;

#[derive(Debug, Default)]
pub struct MacroEngine {
    store: MacroStore,
    resolver: MacroResolver,
    /// Names resolved on demand that have no definition of their own
    forced: Vec<String>,
}

impl MacroEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine from definitions and resolve it
    pub fn with_definitions<I, K, V>(defs: I) -> WadfResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut engine = Self::new();
        engine.append(defs)?;
        engine.resolve_all()?;
        Ok(engine)
    }

    /// Append definitions with the highest precedence.
    ///
    /// Once values have been resolved, every append rebuilds them.
    pub fn append<I, K, V>(&mut self, defs: I) -> WadfResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let defs: Vec<MacroDefinition> = defs
            .into_iter()
            .map(|(k, v)| MacroDefinition::new(k, v))
            .collect();
        if defs.is_empty() {
            return Ok(());
        }
        self.store.push_definitions(defs);
        if self.store.has_values() {
            self.resolve_all()?;
        }
        Ok(())
    }

    /// Append definitions with the lowest precedence.
    pub fn append_at_front<I, K, V>(&mut self, defs: I) -> WadfResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let defs: Vec<MacroDefinition> = defs
            .into_iter()
            .map(|(k, v)| MacroDefinition::new(k, v))
            .collect();
        if defs.is_empty() {
            return Ok(());
        }
        self.store.prepend_definitions(defs);
        if self.store.has_values() {
            self.resolve_all()?;
        }
        Ok(())
    }

    pub fn resolve_all(&mut self) -> WadfResult<&MacroValues> {
        self.resolver.resolve_all(&mut self.store)?;
        debug!(count = self.store.values().len(), "resolved macro values");
        Ok(self.store.values())
    }

    /// Resolve a single reference (`name` or `modifier:name`)
    pub fn resolve(&mut self, reference: &str) -> WadfResult<String> {
        self.resolver
            .resolve_single(reference, self.store.values_mut())
    }

    /// Resolve all references inside `text`; `context` labels unresolved records
    pub fn resolve_string(&mut self, text: &str, context: Option<&str>) -> WadfResult<String> {
        self.resolver
            .resolve_string(text, self.store.values_mut(), context)
    }

    /// Resolve `name` and keep it in the set of names checked for input
    pub fn force_resolve(&mut self, name: &str) -> WadfResult<String> {
        if !self.forced.iter().any(|n| n == name) {
            self.forced.push(name.to_string());
        }
        self.resolve(name)
    }

    /// The value of `name`, or `None` when it is empty or unresolved
    pub fn get(&mut self, name: &str) -> WadfResult<Option<String>> {
        let value = self.resolve(name)?;
        if value.is_empty() || is_sentinel(&value, name) {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }

    /// The value of `name`, or an empty string when unset
    pub fn get_or_empty(&mut self, name: &str) -> WadfResult<String> {
        Ok(self.get(name)?.unwrap_or_default())
    }

    /// Whether `name` is set to something other than empty or `0`
    pub fn flag(&mut self, name: &str) -> WadfResult<bool> {
        Ok(matches!(self.get(name)?, Some(v) if v.trim() != "0"))
    }

    /// Every name with a value or forced resolution, in first-seen order
    pub fn known_names(&self) -> Vec<String> {
        let mut names = self.store.values().names();
        for name in &self.forced {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn values(&self) -> &MacroValues {
        self.store.values()
    }

    pub fn definitions(&self) -> &[MacroDefinition] {
        self.store.definitions()
    }

    pub fn fallbacks(&self) -> &FallbackTable {
        self.resolver.fallbacks()
    }

    pub fn unresolved(&self) -> &UnresolvedMacros {
        self.resolver.unresolved()
    }
}
