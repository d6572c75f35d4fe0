//! Hosts file editing
//!
//! Virtual host names are made resolvable locally by adding them to the
//! system hosts file next to the configured IP address.

use crate::error::{WadfError, WadfResult};

/// Layout of the lines we add
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostsFormat {
    /// `ip<TAB>base_host<TAB>host`
    WithBaseHost,
    /// `ip<TAB>host`
    HostOnly,
}

impl HostsFormat {
    /// From the `deploy_dns_hosts_file_format` option; unset means format 1
    pub fn from_option(value: Option<&str>) -> WadfResult<Self> {
        match value.map(str::trim) {
            None | Some("") | Some("1") => Ok(HostsFormat::WithBaseHost),
            Some("2") => Ok(HostsFormat::HostOnly),
            Some(other) => Err(WadfError::config(format!(
                "Unknown value '{}' for deploy_dns_hosts_file_format option",
                other
            ))),
        }
    }
}

fn host_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace().skip(1)
}

/// Add every host not already listed on a line starting with `ip`.
///
/// New lines go after the last line for `ip`, or at the end of the file
/// if there is none.
pub fn add_hosts(contents: &str, ip: &str, hosts: &[String], format: HostsFormat) -> String {
    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();

    let mut existing: Vec<String> = Vec::new();
    let mut base_host: Option<String> = None;
    let mut last_ip_line: Option<usize> = None;
    for (i, line) in lines.iter().enumerate() {
        if line.starts_with(ip) {
            for host in host_fields(line) {
                if base_host.is_none() {
                    base_host = Some(host.to_string());
                }
                existing.push(host.to_string());
            }
            last_ip_line = Some(i);
        }
    }

    let mut insert_at = last_ip_line.map_or(lines.len(), |i| i + 1);
    for host in hosts {
        if existing.contains(host) {
            continue;
        }
        let line = match (format, base_host.as_deref()) {
            (HostsFormat::WithBaseHost, Some(base)) => format!("{}\t{}\t{}", ip, base, host),
            _ => format!("{}\t{}", ip, host),
        };
        lines.insert(insert_at, line);
        insert_at += 1;
        existing.push(host.clone());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Drop lines whose last host name is one of `hosts`
pub fn remove_hosts(contents: &str, hosts: &[String]) -> String {
    let mut out = String::with_capacity(contents.len());
    for line in contents.lines() {
        let trimmed = line.trim_start();
        let is_entry = !trimmed.starts_with('#') && trimmed.split_whitespace().count() >= 2;
        let last = trimmed.split_whitespace().last().unwrap_or("");
        if is_entry && hosts.iter().any(|h| h == last) {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
