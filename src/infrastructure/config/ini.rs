//! INI reader
//!
//! `[section]` headers, `key = value` entries, `;`/`#` comment lines.
//! Entries before the first header belong to `globals`. Unquoted boolean
//! words are normalised: `on`/`true`/`yes` become `1`, and
//! `off`/`false`/`no`/`none`/`null` become the empty string.

use std::fs;
use std::path::Path;

use crate::error::{WadfError, WadfResult};

pub const GLOBALS_SECTION: &str = "globals";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniFile {
    /// Sections in file order; a repeated header continues the same section
    sections: Vec<(String, Vec<(String, String)>)>,
}

impl IniFile {
    pub fn load(path: &Path) -> WadfResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| WadfError::io_at(path, e))?;
        Self::parse(&content).map_err(|e| match e {
            WadfError::Config { message } => {
                WadfError::config(format!("{}: {}", path.display(), message))
            }
            other => other,
        })
    }

    pub fn parse(content: &str) -> WadfResult<Self> {
        let mut ini = IniFile::default();
        let mut current = GLOBALS_SECTION.to_string();

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(rest) = line.strip_prefix('[') {
                let name = rest
                    .strip_suffix(']')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        WadfError::config(format!("line {}: bad section header '{}'", idx + 1, line))
                    })?;
                current = name.to_string();
                ini.section_mut(&current);
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(WadfError::config(format!(
                    "line {}: expected 'name = value', got '{}'",
                    idx + 1,
                    line
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(WadfError::config(format!("line {}: missing name", idx + 1)));
            }
            ini.section_mut(&current)
                .push((key.to_string(), parse_value(value.trim())));
        }
        Ok(ini)
    }

    fn section_mut(&mut self, name: &str) -> &mut Vec<(String, String)> {
        let pos = match self.sections.iter().position(|(n, _)| n == name) {
            Some(pos) => pos,
            None => {
                self.sections.push((name.to_string(), Vec::new()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[pos].1
    }

    /// Entries of `name` in file order, `None` if the section is absent
    pub fn section(&self, name: &str) -> Option<&[(String, String)]> {
        self.sections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn globals(&self) -> &[(String, String)] {
        self.section(GLOBALS_SECTION).unwrap_or(&[])
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Last value of `key` in `section`
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(n, _)| n.as_str())
    }
}

fn parse_value(value: &str) -> String {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_string();
        }
    }
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => "1".to_string(),
        "off" | "false" | "no" | "none" | "null" => String::new(),
        _ => value.to_string(),
    }
}
