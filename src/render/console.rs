//! Console text renderer: a terse, indented tree view for terminal output.
//!
//! Color is opt-in (`color: bool`) and implemented with raw ANSI escapes
//! rather than a dependency — the `colored` crate lives in `semdiff-cli`,
//! which decides terminal/`NO_COLOR` policy; this module stays usable from
//! a context with no TTY at all.

use crate::model::{Change, ChangeKind, DiffResult, FileStatus, Impact, MultiFileResult};

const RESET: &str = "\x1b[0m";

fn color_for(impact: Impact) -> &'static str {
    match impact {
        Impact::BreakingPublicApi => "\x1b[31m",   // red
        Impact::BreakingInternalApi => "\x1b[33m", // yellow
        Impact::NonBreaking => "\x1b[32m",         // green
        Impact::FormattingOnly => "\x1b[90m",      // bright black
    }
}

fn symbol(kind: ChangeKind) -> char {
    match kind {
        ChangeKind::Added => '+',
        ChangeKind::Removed => '-',
        ChangeKind::Modified => '~',
        ChangeKind::Moved => '>',
        ChangeKind::Renamed => '#',
    }
}

fn render_change(change: &Change, depth: usize, color: bool, out: &mut String) {
    let indent = "  ".repeat(depth);
    let line = format!(
        "{indent}{sym} {kind} {name} [{impact}]",
        sym = symbol(change.kind),
        kind = change.node_kind,
        name = change.name,
        impact = change.impact.as_str(),
    );
    if color {
        out.push_str(color_for(change.impact));
        out.push_str(&line);
        out.push_str(RESET);
    } else {
        out.push_str(&line);
    }
    out.push('\n');
    for caveat in &change.caveats {
        out.push_str(&format!("{indent}  ! {caveat}\n"));
    }
    for child in &change.children {
        render_change(child, depth + 1, color, out);
    }
}

/// Render a single [`DiffResult`] as an indented console tree.
#[must_use]
pub fn render_single(result: &DiffResult, color: bool) -> String {
    let mut out = format!("{} -> {}\n", result.old_path, result.new_path);
    for change in &result.changes {
        render_change(change, 1, color, &mut out);
    }
    if result.changes.is_empty() {
        out.push_str("  (no changes)\n");
    }
    out
}

/// Render a [`MultiFileResult`] as one console tree per file, in the
/// driver's deterministic order, followed by a one-line summary.
#[must_use]
pub fn render_multi(result: &MultiFileResult, color: bool) -> String {
    let mut out = String::new();
    for entry in &result.files {
        match &entry.outcome {
            FileStatus::Ok { result } => out.push_str(&render_single(result, color)),
            FileStatus::Error { message } => {
                out.push_str(&format!("{}: error: {}\n", entry.new_path, message));
            }
        }
    }
    out.push_str(&format!(
        "\n{} files, {} changes ({} breaking-public, {} breaking-internal, {} non-breaking, {} formatting-only)\n",
        result.files.len(),
        result.summary.total_changes,
        result.summary.breaking_public_api,
        result.summary.breaking_internal_api,
        result.summary.non_breaking,
        result.summary.formatting_only,
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::NodeKind;
    use crate::model::{ComparisonMode, Visibility};

    #[test]
    fn empty_diff_reports_no_changes() {
        let result = DiffResult::new(
            ComparisonMode::Direct,
            "a.cs",
            "a.cs",
            vec![],
            vec![],
            chrono::Utc::now(),
        );
        let text = render_single(&result, false);
        assert!(text.contains("(no changes)"));
    }

    #[test]
    fn color_mode_wraps_lines_in_ansi_codes() {
        let change = Change::leaf(
            ChangeKind::Added,
            NodeKind::Method,
            "Multiply",
            None,
            None,
            None,
            None,
            Impact::NonBreaking,
            Visibility::Public,
        );
        let result = DiffResult::new(
            ComparisonMode::Direct,
            "a.cs",
            "b.cs",
            vec![],
            vec![change],
            chrono::Utc::now(),
        );
        let text = render_single(&result, true);
        assert!(text.contains("\x1b["));
        assert!(text.contains(RESET));
    }
}
