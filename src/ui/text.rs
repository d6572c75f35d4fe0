//! Colored and wrapped text for terminal output

use crossterm::style::Stylize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::ui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
    Dim,
}

impl Tone {
    pub fn icon(self, supports_unicode: bool) -> &'static str {
        match (supports_unicode, self) {
            (true, Tone::Success) => theme::icons::SUCCESS,
            (true, Tone::Error) => theme::icons::ERROR,
            (true, Tone::Warning) => theme::icons::WARNING,
            (true, Tone::Dim) => theme::icons::BULLET,
            (false, Tone::Success) => theme::icons_ascii::SUCCESS,
            (false, Tone::Error) => theme::icons_ascii::ERROR,
            (false, Tone::Warning) => theme::icons_ascii::WARNING,
            (false, Tone::Dim) => theme::icons_ascii::BULLET,
        }
    }
}

/// `text` in the color for `tone`, or unchanged without color support
pub fn paint(text: &str, tone: Tone, supports_color: bool) -> String {
    if !supports_color {
        return text.to_string();
    }
    let color = match tone {
        Tone::Success => theme::colors::SUCCESS,
        Tone::Error => theme::colors::ERROR,
        Tone::Warning => theme::colors::WARNING,
        Tone::Dim => theme::colors::DIM,
    };
    format!("{}", text.with(color))
}

/// Word-wrap `text` to `width` display columns, keeping existing line breaks.
///
/// Every line after the first gets `indent`. Words wider than the line are
/// split by character.
pub fn wrap(text: &str, width: usize, indent: &str) -> String {
    let indent_width = UnicodeWidthStr::width(indent);
    let width = width.max(indent_width + 10);
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;
        let prefix = |done: usize| if done == 0 { 0 } else { indent_width };

        for word in paragraph.split(' ') {
            let word_width = UnicodeWidthStr::width(word);
            let room = width - prefix(lines.len());
            if line_width > 0 && line_width + 1 + word_width > room {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if line_width > 0 {
                line.push(' ');
                line_width += 1;
            }
            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                let room = width - prefix(lines.len());
                if line_width + w > room && line_width > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(c);
                line_width += w;
            }
        }
        lines.push(line);
    }

    lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 || l.is_empty() {
                l.clone()
            } else {
                format!("{}{}", indent, l)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_without_color_is_plain() {
        assert_eq!(paint("ok", Tone::Success, false), "ok");
        assert!(paint("no", Tone::Error, true).contains("\u{1b}["));
    }

    #[test]
    fn wrap_breaks_on_words() {
        let text = "the option db1_pass needs to be configured before deploying";
        let wrapped = wrap(text, 20, "  ");
        for line in wrapped.lines() {
            assert!(UnicodeWidthStr::width(line) <= 20, "{line:?}");
        }
        assert!(wrapped.starts_with("the option db1_pass\n  "));
        assert_eq!(wrapped.replace("\n  ", " "), text);
    }

    #[test]
    fn wrap_counts_wide_characters() {
        let wrapped = wrap("部署 部署 部署 部署 部署 部署", 12, "");
        assert!(wrapped.lines().all(|l| UnicodeWidthStr::width(l) <= 12));
    }

    #[test]
    fn wrap_keeps_line_breaks() {
        assert_eq!(wrap("a\nb", 80, "  "), "a\n  b");
    }
}
