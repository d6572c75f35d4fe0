//! Instance file
//!
//! `<deploy_path>/.wadf-instance` records what a deployment directory is:
//! the first line names the instance (read back as `appref`), every other
//! line is a `name = value` macro that was forced on the command line or
//! typed in at a prompt.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{WadfError, WadfResult};

pub const INSTANCE_FILE_NAME: &str = ".wadf-instance";

static ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\S+)\s*=\s*(.*)$").expect("instance entry regex is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceFile {
    /// First line
    pub appref: String,
    pub macros: Vec<(String, String)>,
}

impl InstanceFile {
    pub fn parse(content: &str) -> Self {
        let mut lines = content.lines();
        let appref = lines.next().unwrap_or("").trim().to_string();
        let macros = lines
            .filter_map(|line| {
                ENTRY
                    .captures(line)
                    .map(|c| (c[1].to_string(), c[2].trim().to_string()))
            })
            .collect();
        Self { appref, macros }
    }

    /// Read the instance file at `path`, `None` if there is none
    pub fn read(path: &Path) -> WadfResult<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|e| WadfError::io_at(path, e))?;
        Ok(Some(Self::parse(&content)))
    }

    /// Macro definitions in precedence order, `appref` first
    pub fn definitions(&self) -> Vec<(String, String)> {
        let mut defs = vec![("appref".to_string(), self.appref.clone())];
        defs.extend(self.macros.iter().cloned());
        defs
    }

    /// Write a fresh instance file, or rewrite the first line of an existing
    /// one. Command-line macros other than `instance` are appended unless
    /// the same line is already in the file.
    pub fn write(path: &Path, instance: &str, cmdline: &[(String, String)]) -> WadfResult<()> {
        let existing = if path.is_file() {
            fs::read_to_string(path).map_err(|e| WadfError::io_at(path, e))?
        } else {
            String::new()
        };

        let mut lines: Vec<String> = vec![instance.to_string()];
        lines.extend(existing.lines().skip(1).map(str::to_string));
        for (name, value) in cmdline {
            if name == "instance" {
                continue;
            }
            let line = format!("{} = {}", name, value);
            if !lines.iter().skip(1).any(|l| l.trim() == line) {
                lines.push(line);
            }
        }

        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(path, content).map_err(|e| WadfError::io_at(path, e))
    }

    /// Append operator answers as `name = value` lines
    pub fn append(path: &Path, entries: &[(String, String)]) -> WadfResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let needs_newline = fs::read_to_string(path)
            .map(|c| !c.is_empty() && !c.ends_with('\n'))
            .unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| WadfError::io_at(path, e))?;
        let mut text = String::new();
        if needs_newline {
            text.push('\n');
        }
        for (name, value) in entries {
            text.push_str(&format!("{} = {}\n", name, value));
        }
        file.write_all(text.as_bytes())
            .map_err(|e| WadfError::io_at(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parse_first_line_is_appref() {
        let file = InstanceFile::parse("shop-dev\ndb1_name = shop_dev\nnot an entry\nvhost1_name=shop.local\n");
        assert_eq!(file.appref, "shop-dev");
        assert_eq!(
            file.macros,
            pairs(&[("db1_name", "shop_dev"), ("vhost1_name", "shop.local")])
        );
        assert_eq!(file.definitions()[0], ("appref".to_string(), "shop-dev".to_string()));
    }

    #[test]
    fn read_missing_file_is_none() {
        let dir = tempdir().unwrap();
        assert_eq!(InstanceFile::read(&dir.path().join(INSTANCE_FILE_NAME)).unwrap(), None);
    }

    #[test]
    fn write_replaces_first_line_and_keeps_the_rest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(INSTANCE_FILE_NAME);
        fs::write(&path, "old-name\ndb1_pass = secret\n").unwrap();

        InstanceFile::write(
            &path,
            "shop-dev",
            &pairs(&[("instance", "shop-dev"), ("db1_pass", "secret"), ("profile", "dev")]),
        )
        .unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "shop-dev\ndb1_pass = secret\nprofile = dev\n"
        );
    }

    #[test]
    fn append_adds_answers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(INSTANCE_FILE_NAME);
        fs::write(&path, "shop-dev").unwrap();

        InstanceFile::append(&path, &pairs(&[("db1_deploy_pass", "hunter2")])).unwrap();

        let read = InstanceFile::read(&path).unwrap().unwrap();
        assert_eq!(read.appref, "shop-dev");
        assert_eq!(read.macros, pairs(&[("db1_deploy_pass", "hunter2")]));
    }
}
