//! Read-only renderers over [`crate::model::DiffResult`] /
//! [`crate::model::MultiFileResult`] (§6 "Result rendering").
//!
//! Renderers never re-derive `impact`/`caveats`/`whitespace_issues` — they
//! only read what `TreeDiffer`/`ImpactClassifier`/`WhitespaceAnalyzer`
//! already computed.

pub mod console;
pub mod html;
pub mod inline_html;
pub mod json;
pub mod unified;

use crate::model::MultiFileResult;

/// §6 "Exit-code contract for driver programs": `0` no changes, `1`
/// changes present, `2` error. Callers that special-case only `0` as
/// success and treat every other code as a hard failure are reproducing
/// "the source bug fixed in Sprint 4" — `1` is a normal, successful run.
#[must_use]
pub const fn exit_code_for_summary(total_changes: usize) -> i32 {
    if total_changes == 0 {
        0
    } else {
        1
    }
}

/// Same contract, read directly off a [`MultiFileResult`].
#[must_use]
pub const fn exit_code(result: &MultiFileResult) -> i32 {
    exit_code_for_summary(result.summary.total_changes)
}
