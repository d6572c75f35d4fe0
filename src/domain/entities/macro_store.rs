//! Macro Store Entity
//!
//! The ordered list of macro definitions for one deployment run plus the
//! value map derived from it. Definitions are never removed: a later
//! definition of the same name wins, but every definition is kept so the
//! value map can be rebuilt from scratch.

use std::collections::HashMap;

/// A single `name = value` definition, in the order it was appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: String,
    pub value: String,
}

impl MacroDefinition {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Sentinel text for a macro that could not be resolved: `@name@`
pub fn sentinel(name: &str) -> String {
    format!("@{}@", name)
}

/// Whether `value` is the unresolved sentinel for `name`
pub fn is_sentinel(value: &str, name: &str) -> bool {
    value.len() == name.len() + 2
        && value.starts_with('@')
        && value.ends_with('@')
        && &value[1..value.len() - 1] == name
}

/// Anything a macro reference can be looked up in and memoized into.
///
/// Implemented by the store's own value map and by the overlay used while
/// resolving fallbacks.
pub trait ValueStack {
    fn lookup(&self, name: &str) -> Option<&str>;
    fn memoize(&mut self, name: &str, value: &str);
}

/// Insertion-ordered map of macro name to current value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroValues {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl MacroValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Set a value, keeping the original position of an existing name
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 = value,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), value));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }
}

impl ValueStack for MacroValues {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name)
    }

    fn memoize(&mut self, name: &str, value: &str) {
        self.insert(name, value);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MacroValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = MacroValues::new();
        for (k, v) in iter {
            let k: String = k.into();
            values.insert(&k, v);
        }
        values
    }
}

/// Ordered definitions plus the value map derived from them
#[derive(Debug, Clone, Default)]
pub struct MacroStore {
    definitions: Vec<MacroDefinition>,
    values: MacroValues,
    resolved: bool,
}

impl MacroStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add definitions at the end (highest precedence)
    pub fn push_definitions<I>(&mut self, defs: I)
    where
        I: IntoIterator<Item = MacroDefinition>,
    {
        self.definitions.extend(defs);
    }

    /// Add definitions at the front (lowest precedence), keeping their order
    pub fn prepend_definitions<I>(&mut self, defs: I)
    where
        I: IntoIterator<Item = MacroDefinition>,
    {
        let mut front: Vec<MacroDefinition> = defs.into_iter().collect();
        front.append(&mut self.definitions);
        self.definitions = front;
    }

    pub fn definitions(&self) -> &[MacroDefinition] {
        &self.definitions
    }

    /// The most recent definition of `name`, unresolved
    pub fn latest_definition(&self, name: &str) -> Option<&str> {
        self.definitions
            .iter()
            .rev()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    pub fn values(&self) -> &MacroValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut MacroValues {
        &mut self.values
    }

    /// A value map exists once the store has been resolved at least once,
    /// even when it came out empty
    pub fn has_values(&self) -> bool {
        self.resolved
    }

    pub fn replace_values(&mut self, values: MacroValues) {
        self.values = values;
        self.resolved = true;
    }
}
