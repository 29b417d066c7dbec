//! WhitespaceAnalyzer (§4.5, component C5): the post-pass that fills in
//! `Change::whitespace_issues` and, only for whitespace-insignificant
//! languages, downgrades impact to `FormattingOnly`.

use crate::config::WhitespaceMode;
use crate::model::Change;
use crate::whitespace;

/// Annotate `change` with whitespace issues, invoked by `TreeDiffer` for any
/// leaf whose body differs only under the active whitespace mode.
///
/// Downgrading impact to `FormattingOnly` is only legal when `path`'s
/// language is whitespace-insignificant (§4.1's `LanguageAware` table); for
/// whitespace-significant languages (`.py`, `.yaml`, …) the impact computed
/// by `ImpactClassifier` is preserved untouched.
pub fn annotate(change: &mut Change, path: &str, mode: WhitespaceMode) {
    let (Some(old), Some(new)) = (change.old_content.as_deref(), change.new_content.as_deref())
    else {
        return;
    };
    if old == new {
        return;
    }

    let issues = whitespace::classify(old, new, mode, path);
    if issues.is_empty() {
        return;
    }

    if whitespace::is_whitespace_insignificant(path) {
        change.downgrade_to_formatting(issues);
    } else {
        change.whitespace_issues |= issues;
    }
}
