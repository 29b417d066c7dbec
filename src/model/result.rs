use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Change;

/// Aggregate counts over a [`DiffResult`]'s change tree (§3 "Stats").
///
/// `total_changes` counts every node in the tree (via
/// [`Change::count_including_self`]), not just top-level entries, so it
/// always agrees with `flatten().len()` — the §8 "stats consistency"
/// property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_changes: usize,
    pub breaking_public_api: usize,
    pub breaking_internal_api: usize,
    pub non_breaking: usize,
    pub formatting_only: usize,
}

impl Stats {
    /// Compute stats from a top-level change list by walking every node
    /// (not just the roots).
    #[must_use]
    pub fn compute(changes: &[Change]) -> Self {
        let mut stats = Self::default();
        for change in changes {
            for node in change.flatten() {
                stats.total_changes += 1;
                match node.impact {
                    super::Impact::BreakingPublicApi => stats.breaking_public_api += 1,
                    super::Impact::BreakingInternalApi => stats.breaking_internal_api += 1,
                    super::Impact::NonBreaking => stats.non_breaking += 1,
                    super::Impact::FormattingOnly => stats.formatting_only += 1,
                }
            }
        }
        stats
    }
}

/// How a [`DiffResult`] was produced (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    /// A direct two-file comparison.
    Direct,
    /// One of many files compared as part of a folder walk.
    Folder,
    /// One of many files compared as part of a VCS ref range.
    RefRange,
}

/// The result of comparing exactly one pair of files (§3 "DiffResult").
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiffResult {
    pub mode: ComparisonMode,
    pub old_path: String,
    pub new_path: String,
    pub profiles: Vec<String>,
    pub changes: Vec<Change>,
    pub stats: Stats,
    pub generated_at: DateTime<Utc>,
}

impl DiffResult {
    #[must_use]
    pub fn new(
        mode: ComparisonMode,
        old_path: impl Into<String>,
        new_path: impl Into<String>,
        profiles: Vec<String>,
        changes: Vec<Change>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let stats = Stats::compute(&changes);
        Self {
            mode,
            old_path: old_path.into(),
            new_path: new_path.into(),
            profiles,
            changes,
            stats,
            generated_at,
        }
    }

    /// Non-canonical flattened view across every top-level change.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Change> {
        self.changes.iter().flat_map(Change::flatten).collect()
    }
}

/// Per-path outcome within a [`MultiFileResult`] (§3 "FileEntry", §7).
///
/// Distinct from [`ChangeStatus`]: this is whether the diff *ran*
/// successfully, not what it found.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum FileStatus {
    /// The file diffed cleanly; `result` holds the per-file [`DiffResult`].
    Ok { result: Box<DiffResult> },
    /// The file could not be diffed; the run continues for other files
    /// (§7 "per-file errors are recorded, not fatal").
    Error { message: String },
}

/// What happened to a path between the old and new side of a
/// [`MultiFileResult`] (§3 "FileEntry" — `status: Added|Removed|Modified|Renamed`).
///
/// Folder mode derives this from blob presence on each side and never
/// produces `Renamed` (a folder walk has no rename signal); ref-range mode
/// maps it straight from [`crate::capability::RefChangeStatus`]. `Unchanged`
/// is this crate's own extension for a pair present on both sides with an
/// empty change tree (§8 scenario 6: "`B.cs` (Unchanged, may be elided)").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeStatus {
    Added,
    Removed,
    Modified,
    Renamed,
    Unchanged,
}

/// One file's entry in a [`MultiFileResult`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileEntry {
    pub new_path: String,
    pub old_path: Option<String>,
    pub status: ChangeStatus,
    #[serde(flatten)]
    pub outcome: FileStatus,
}

/// Per-file outcome counts, the other half of §4.7 "Aggregation"
/// (`{files_added, files_removed, files_modified, files_errored}`) — read
/// straight off each entry's [`ChangeStatus`] rather than re-derived from
/// path/stats heuristics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounts {
    pub files_added: usize,
    pub files_removed: usize,
    pub files_modified: usize,
    pub files_unchanged: usize,
    pub files_errored: usize,
}

/// The result of a multi-file run (§3 "MultiFileResult", §4.7).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MultiFileResult {
    pub comparison_mode: ComparisonMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_root: Option<String>,
    /// Final ordering is deterministic by `new_path` (§4.7).
    pub files: Vec<FileEntry>,
    pub summary: Stats,
    pub file_counts: FileCounts,
    pub generated_at: DateTime<Utc>,
}

impl MultiFileResult {
    #[must_use]
    pub fn summarize(mut files: Vec<FileEntry>, mode: ComparisonMode) -> Self {
        files.sort_by(|a, b| a.new_path.cmp(&b.new_path));
        let mut summary = Stats::default();
        let mut file_counts = FileCounts::default();
        for entry in &files {
            match &entry.outcome {
                FileStatus::Ok { result } => {
                    summary.total_changes += result.stats.total_changes;
                    summary.breaking_public_api += result.stats.breaking_public_api;
                    summary.breaking_internal_api += result.stats.breaking_internal_api;
                    summary.non_breaking += result.stats.non_breaking;
                    summary.formatting_only += result.stats.formatting_only;
                }
                FileStatus::Error { .. } => {}
            }
            match (&entry.outcome, entry.status) {
                (FileStatus::Error { .. }, _) => file_counts.files_errored += 1,
                (FileStatus::Ok { .. }, ChangeStatus::Added) => file_counts.files_added += 1,
                (FileStatus::Ok { .. }, ChangeStatus::Removed) => file_counts.files_removed += 1,
                (FileStatus::Ok { .. }, ChangeStatus::Modified | ChangeStatus::Renamed) => {
                    file_counts.files_modified += 1;
                }
                (FileStatus::Ok { .. }, ChangeStatus::Unchanged) => file_counts.files_unchanged += 1,
            }
        }
        Self {
            comparison_mode: mode,
            ref_range: None,
            old_root: None,
            new_root: None,
            files,
            summary,
            file_counts,
            generated_at: Utc::now(),
        }
    }
}
