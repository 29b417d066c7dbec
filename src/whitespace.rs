//! WhitespaceEngine (§4.1, component C1): pure, stateless comparison of two
//! strings under a whitespace mode.
//!
//! Every function here is a pure function of its arguments — no shared
//! state, safe to call from any number of worker threads at once (§5).

use crate::config::WhitespaceMode;
use crate::model::WhitespaceIssue;

/// Extensions whose contents are whitespace-significant (§4.1 `LanguageAware`).
const WHITESPACE_SIGNIFICANT: &[&str] = &["py", "yaml", "yml", "jade", "haml", "coffee"];

/// Extensions for which leading/trailing whitespace is safe to ignore.
const WHITESPACE_INSIGNIFICANT: &[&str] = &[
    "cs", "vb", "java", "kt", "c", "cpp", "h", "rs", "go", "ts", "js", "swift",
];

/// Resolve `LanguageAware` to a concrete mode for `path`, per the §4.1 table.
/// Also used directly by callers (e.g. `WhitespaceAnalyzer`) that need to
/// know whether a language is whitespace-significant.
#[must_use]
pub fn effective_mode(mode: WhitespaceMode, path: &str) -> WhitespaceMode {
    if mode != WhitespaceMode::LanguageAware {
        return mode;
    }
    let is_makefile = path
        .rsplit('/')
        .next()
        .is_some_and(|name| name.eq_ignore_ascii_case("makefile"));
    if is_makefile {
        return WhitespaceMode::Exact;
    }
    let ext = extension(path);
    if WHITESPACE_SIGNIFICANT.contains(&ext.as_str()) {
        WhitespaceMode::Exact
    } else if WHITESPACE_INSIGNIFICANT.contains(&ext.as_str()) {
        WhitespaceMode::IgnoreLeadingTrailing
    } else {
        WhitespaceMode::Exact
    }
}

/// `true` if, under `LanguageAware`, `path`'s language treats whitespace as
/// insignificant — the only case `WhitespaceAnalyzer` (§4.5) is allowed to
/// downgrade impact to `FormattingOnly`.
#[must_use]
pub fn is_whitespace_insignificant(path: &str) -> bool {
    effective_mode(WhitespaceMode::LanguageAware, path) == WhitespaceMode::IgnoreLeadingTrailing
}

fn extension(path: &str) -> String {
    path.rsplit('/')
        .next()
        .unwrap_or(path)
        .rsplit_once('.')
        .map_or_else(String::new, |(_, ext)| ext.to_ascii_lowercase())
}

fn normalize_line(line: &str, mode: WhitespaceMode) -> String {
    match mode {
        WhitespaceMode::Exact | WhitespaceMode::LanguageAware => line.to_string(),
        WhitespaceMode::IgnoreLeadingTrailing => line.trim().to_string(),
        WhitespaceMode::IgnoreAll => line.chars().filter(|c| !c.is_whitespace()).collect(),
    }
}

fn normalize(text: &str, mode: WhitespaceMode, path: &str) -> String {
    let mode = effective_mode(mode, path);
    match mode {
        WhitespaceMode::Exact => text.to_string(),
        _ => text
            .split('\n')
            .map(|line| normalize_line(line.trim_end_matches('\r'), mode))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// `equal(old, new, mode, path)` (§4.1). Case-sensitive. Under `Exact`,
/// `\r\n` vs `\n` is a difference; every other mode treats them as equal.
#[must_use]
pub fn equal(old: &str, new: &str, mode: WhitespaceMode, path: &str) -> bool {
    let effective = effective_mode(mode, path);
    if effective == WhitespaceMode::Exact {
        return old == new;
    }
    normalize(old, mode, path) == normalize(new, mode, path)
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_end();
    let end = trimmed
        .char_indices()
        .find(|&(_, c)| !c.is_whitespace())
        .map_or(trimmed.len(), |(i, _)| i);
    &trimmed[..end]
}

fn line_ending(text: &str) -> &'static str {
    if text.ends_with("\r\n") {
        "\r\n"
    } else if text.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// `classify(old, new, mode, path)` (§4.1). Only meaningful when `old` and
/// `new` are already known to differ (byte-for-byte) but are equal once
/// normalized under `mode` — i.e. the difference is whitespace-only.
#[must_use]
pub fn classify(old: &str, new: &str, mode: WhitespaceMode, path: &str) -> WhitespaceIssue {
    let mut issues = WhitespaceIssue::empty();

    if line_ending(old) != line_ending(new) {
        issues |= WhitespaceIssue::LINE_ENDING_CHANGED;
    }

    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();

    for (old_line, new_line) in old_lines.iter().zip(new_lines.iter()) {
        let old_lead = leading_whitespace(old_line);
        let new_lead = leading_whitespace(new_line);

        if old_lead.chars().count() != new_lead.chars().count() {
            issues |= WhitespaceIssue::INDENTATION_CHANGED;
        }
        if (old_lead.contains('\t') && old_lead.contains(' '))
            || (new_lead.contains('\t') && new_lead.contains(' '))
        {
            issues |= WhitespaceIssue::MIXED_TABS_SPACES;
        }

        let old_trailing = old_line.trim_end_matches('\r').len() != old_line.trim_end().len();
        let new_trailing = new_line.trim_end_matches('\r').len() != new_line.trim_end().len();
        if old_trailing != new_trailing {
            issues |= WhitespaceIssue::TRAILING_WHITESPACE;
        }
    }

    let _ = mode;
    let _ = path;
    issues
}
