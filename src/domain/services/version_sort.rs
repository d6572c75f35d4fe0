//! Version ordering for tag lists
//!
//! Natural ordering (`1.10` after `1.9`), except that a version with a
//! trailing letter suffix (`1.2b`, `1.2beta`) sorts before its bare base
//! (`1.2`).

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

static SUFFIXED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+\d)([a-z]+)$").expect("suffix regex is valid"));

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Number(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;
    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != digit => {
                out.push(chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(digit) = in_digits {
        out.push(chunk(&s[start..], digit));
    }
    out
}

fn chunk(s: &str, digit: bool) -> Chunk<'_> {
    if digit {
        Chunk::Number(s)
    } else {
        Chunk::Text(s)
    }
}

fn cmp_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Natural string comparison: digit runs compare numerically
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (ca, cb) = (chunks(a), chunks(b));
    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Chunk::Number(x), Chunk::Number(y)) => cmp_numbers(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ca.len().cmp(&cb.len())
}

fn split_suffix(version: &str) -> (&str, Option<&str>) {
    match SUFFIXED.captures(version) {
        Some(caps) => {
            let base = caps.get(1).map_or(version, |m| m.as_str());
            let suffix = caps.get(2).map(|m| m.as_str());
            (base, suffix)
        }
        None => (version, None),
    }
}

/// Compare two versions; suffixed pre-releases sort before their base
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (base_a, suffix_a) = split_suffix(a);
    let (base_b, suffix_b) = split_suffix(b);
    match natural_cmp(base_a, base_b) {
        Ordering::Equal => match (suffix_a, suffix_b) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(x), Some(y)) => natural_cmp(x, y),
        },
        other => other,
    }
}

pub fn sort_versions(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(a, b));
}

/// Newest version in the list
pub fn latest_version(versions: &[String]) -> Option<&String> {
    versions.iter().max_by(|a, b| compare_versions(a, b))
}
