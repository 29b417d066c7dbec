//! Unified-diff-style text renderer: a `---`/`+++` header per file followed
//! by `@@` hunks synthesized from the `Change` tree's spans, for consumers
//! that expect patch-like output rather than a JSON tree.

use crate::model::{Change, ChangeKind, DiffResult, FileStatus, MultiFileResult};

fn hunk_header(change: &Change) -> String {
    let old = change
        .old_location
        .map_or_else(|| "0,0".to_string(), |s| format!("{},{}", s.start_line, s.end_line - s.start_line + 1));
    let new = change
        .new_location
        .map_or_else(|| "0,0".to_string(), |s| format!("{},{}", s.start_line, s.end_line - s.start_line + 1));
    format!("@@ -{old} +{new} @@ {} {}", change.node_kind, change.name)
}

fn render_change(change: &Change, out: &mut String) {
    out.push_str(&hunk_header(change));
    out.push('\n');
    match change.kind {
        ChangeKind::Removed => {
            if let Some(content) = &change.old_content {
                for line in content.lines() {
                    out.push_str("-");
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        ChangeKind::Added => {
            if let Some(content) = &change.new_content {
                for line in content.lines() {
                    out.push('+');
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        ChangeKind::Modified | ChangeKind::Renamed | ChangeKind::Moved => {
            if let Some(content) = &change.old_content {
                for line in content.lines() {
                    out.push('-');
                    out.push_str(line);
                    out.push('\n');
                }
            }
            if let Some(content) = &change.new_content {
                for line in content.lines() {
                    out.push('+');
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
    }
    for child in &change.children {
        render_change(child, out);
    }
}

/// Render a single [`DiffResult`] as unified-diff-style text.
#[must_use]
pub fn render_single(result: &DiffResult) -> String {
    let mut out = format!("--- {}\n+++ {}\n", result.old_path, result.new_path);
    for change in &result.changes {
        render_change(change, &mut out);
    }
    out
}

/// Render a [`MultiFileResult`] by concatenating each file's unified-diff
/// text in the driver's deterministic `files` order.
#[must_use]
pub fn render_multi(result: &MultiFileResult) -> String {
    let mut out = String::new();
    for entry in &result.files {
        match &entry.outcome {
            FileStatus::Ok { result } => out.push_str(&render_single(result)),
            FileStatus::Error { message } => {
                out.push_str(&format!(
                    "--- {}\n+++ {}\n! error: {}\n",
                    entry.old_path.as_deref().unwrap_or(&entry.new_path),
                    entry.new_path,
                    message
                ));
            }
        }
    }
    out
}
