//! Crontab fragments
//!
//! Each deployed instance owns one block in the user's crontab, bounded by
//! begin/end marker comments. Redeploying replaces the block in place.

use regex::{NoExpand, Regex};

const MARKER_TAIL: &str = " - DO NOT REMOVE THIS";

pub fn begin_marker(instance: &str) -> String {
    format!("# wadf-deployment-begin: {}{}", instance, MARKER_TAIL)
}

pub fn end_marker(instance: &str) -> String {
    format!("# wadf-deployment-end: {}{}", instance, MARKER_TAIL)
}

/// The marker-bounded block for `instance`
pub fn fragment(instance: &str, entries: &str) -> String {
    format!(
        "{}\n{}\n{}",
        begin_marker(instance),
        entries.trim(),
        end_marker(instance)
    )
}

fn fragment_regex(instance: &str) -> Regex {
    let pattern = format!(
        r"(?s){}\n.*?{}",
        regex::escape(&begin_marker(instance)),
        regex::escape(&end_marker(instance))
    );
    Regex::new(&pattern).expect("escaped marker regex is valid")
}

/// Whether `crontab -l` output means the user has no crontab yet
pub fn is_missing_crontab(output: &str) -> bool {
    let trimmed = output.trim();
    trimmed.is_empty() || trimmed.to_ascii_lowercase().starts_with("no crontab for")
}

/// New crontab text with the instance's block added or replaced.
///
/// `current` is `None` when the user has no crontab.
pub fn merge(current: Option<&str>, instance: &str, entries: &str) -> String {
    let block = fragment(instance, entries);
    let Some(current) = current.filter(|c| !is_missing_crontab(c)) else {
        return format!("{}\n", block);
    };

    let mut current = current.to_string();
    if !current.ends_with('\n') {
        current.push('\n');
    }

    let re = fragment_regex(instance);
    if re.is_match(&current) {
        re.replace(&current, NoExpand(&block)).into_owned()
    } else {
        format!("{}\n{}\n", current, block)
    }
}

/// Crontab text without the instance's block, or `None` if it has none
pub fn remove(current: &str, instance: &str) -> Option<String> {
    let re = fragment_regex(instance);
    if !re.is_match(current) {
        return None;
    }
    Some(re.replace_all(current, "").into_owned())
}
