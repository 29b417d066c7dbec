//! MultiFileDriver (§4.7, component C7): builds the work set for a folder
//! walk or VCS ref-range comparison and dispatches it bounded-parallel.
//!
//! Mirrors the teacher's own approach to "per-file work is CPU-bound and
//! self-contained" (§5): `rayon`'s scoped thread pool gives bounded
//! parallelism for free, and per-file cancellation/timeout is layered on
//! top with a channel rather than anything exotic.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rayon::ThreadPoolBuilder;

use crate::capability::{Parser, RefChangeStatus, RefResolver};
use crate::config::SemdiffConfig;
use crate::differ::{self, DiffOptions};
use crate::error::{ConfigError, DiffError};
use crate::filter::FilterEngine;
use crate::impact;
use crate::model::{ChangeStatus, ComparisonMode, DiffResult, FileEntry, FileStatus, MultiFileResult};

/// One independent unit of work: a file pair to diff, or an added/removed
/// singleton (§4.7 "Pairs missing on one side become `Added`/`Removed`").
struct WorkItem {
    old_path: Option<String>,
    new_path: Option<String>,
    old_blob: Option<Vec<u8>>,
    new_blob: Option<Vec<u8>>,
    /// Added/Removed/Modified/Renamed, known up front from the work-set
    /// builder (blob presence in folder mode, `RefChangeStatus` in
    /// ref-range mode) — independent of whether the diff itself finds any
    /// changes.
    status: ChangeStatus,
}

impl WorkItem {
    fn display_new_path(&self) -> String {
        self.new_path
            .clone()
            .or_else(|| self.old_path.clone())
            .unwrap_or_default()
    }
}

/// Shared cancellation flag handed to [`MultiFileDriver::run`] callers so a
/// CLI can wire Ctrl-C or a `--timeout` into it (§5 "Cancellation").
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Builds and dispatches the multi-file work set (§4.7).
pub struct MultiFileDriver<'a> {
    config: &'a SemdiffConfig,
    parser: &'a (dyn Parser + Sync),
    filter: FilterEngine,
}

impl<'a> MultiFileDriver<'a> {
    /// Construct a driver, compiling `config`'s include/exclude globs.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the configured glob patterns don't compile.
    pub fn new(config: &'a SemdiffConfig, parser: &'a (dyn Parser + Sync)) -> Result<Self, ConfigError> {
        let filter = FilterEngine::compile(&config.driver.include_globs, &config.driver.exclude_globs)?;
        Ok(Self { config, parser, filter })
    }

    /// Folder mode (§4.7 "Folder mode"): walk `old_dir`/`new_dir`, pairing
    /// by relative path, then dispatch.
    ///
    /// # Errors
    /// Returns [`DiffError::Cancelled`] if `token` fired before dispatch
    /// began; per-file errors are recorded on individual [`FileEntry`]s
    /// instead of failing the whole run.
    pub fn diff_folders(
        &self,
        old_dir: &Path,
        new_dir: &Path,
        token: &CancellationToken,
    ) -> Result<MultiFileResult, DiffError> {
        let items = build_folder_work_set(old_dir, new_dir, self.config.driver.recursive, &self.filter)?;
        let files = self.dispatch(items, token)?;
        Ok(MultiFileResult::summarize(files, ComparisonMode::Folder))
    }

    /// Ref-range mode (§4.7 "Ref-range mode"): resolve `range` via
    /// `resolver` and dispatch the resulting changed paths.
    ///
    /// # Errors
    /// Returns [`DiffError::RefResolution`] (fatal) if `range` is malformed
    /// or the resolver fails outright; [`DiffError::Cancelled`] if `token`
    /// fired before dispatch began.
    pub fn diff_ref_range(
        &self,
        root: &Path,
        range: &str,
        resolver: &(dyn RefResolver + Sync),
        token: &CancellationToken,
    ) -> Result<MultiFileResult, DiffError> {
        reject_triple_dot(range)?;
        let changes = resolver
            .resolve(root, range)
            .map_err(|err| DiffError::RefResolution {
                detail: err.to_string(),
            })?;
        let items = build_ref_range_work_set(changes, &self.filter);
        let files = self.dispatch(items, token)?;
        let mut result = MultiFileResult::summarize(files, ComparisonMode::RefRange);
        result.ref_range = Some(range.to_string());
        Ok(result)
    }

    fn dispatch(&self, items: Vec<WorkItem>, token: &CancellationToken) -> Result<Vec<FileEntry>, DiffError> {
        if token.is_cancelled() {
            return Err(DiffError::Cancelled);
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.effective_concurrency())
            .build()
            .map_err(|err| DiffError::RefResolution {
                detail: format!("failed to build worker pool: {err}"),
            })?;

        let timeout = Duration::from_millis(self.config.driver.per_file_timeout_ms);
        let entries: Vec<FileEntry> = pool.install(|| {
            use rayon::prelude::*;
            items
                .into_par_iter()
                .map(|item| {
                    if token.is_cancelled() {
                        return file_entry_for_error(&item, "cancelled");
                    }
                    self.diff_one(item, timeout)
                })
                .collect()
        });

        if token.is_cancelled() {
            return Err(DiffError::Cancelled);
        }

        Ok(entries)
    }

    fn diff_one(&self, item: WorkItem, timeout: Duration) -> FileEntry {
        let new_path = item.display_new_path();
        let old_path = item.old_path.clone();
        let status = item.status;

        match run_with_timeout(timeout, || self.diff_blobs(&item)) {
            Some(Ok(result)) => FileEntry {
                new_path,
                old_path,
                status: observed_status(status, &result),
                outcome: FileStatus::Ok {
                    result: Box::new(result),
                },
            },
            Some(Err(err)) => FileEntry {
                new_path,
                old_path,
                status,
                outcome: FileStatus::Error {
                    message: err.to_string(),
                },
            },
            None => FileEntry {
                new_path: new_path.clone(),
                old_path,
                status,
                outcome: FileStatus::Error {
                    message: DiffError::Timeout {
                        path: new_path,
                        timeout_ms: timeout.as_millis() as u64,
                    }
                    .to_string(),
                },
            },
        }
    }

    #[tracing::instrument(skip(self, item), fields(path = %item.display_new_path()))]
    fn diff_blobs(&self, item: &WorkItem) -> Result<DiffResult, DiffError> {
        let path = item.display_new_path();
        let hint = language_hint(&path);
        tracing::debug!(%hint, "diffing file pair");

        let old_text = item
            .old_blob
            .as_deref()
            .map(|bytes| decode(bytes, &path))
            .transpose()?
            .unwrap_or_default();
        let new_text = item
            .new_blob
            .as_deref()
            .map(|bytes| decode(bytes, &path))
            .transpose()?
            .unwrap_or_default();

        let mode = match (item.old_blob.is_some(), item.new_blob.is_some()) {
            (true, true) => ComparisonMode::Direct,
            _ => ComparisonMode::Folder,
        };

        let old_tree = self
            .parser
            .parse(&old_text, &hint)
            .map_err(|err| DiffError::Parse {
                path: path.clone(),
                detail: err.to_string(),
            })?;
        let new_tree = self
            .parser
            .parse(&new_text, &hint)
            .map_err(|err| DiffError::Parse {
                path: path.clone(),
                detail: err.to_string(),
            })?;

        let opts = DiffOptions::new(self.config, &path);
        let changes = differ::diff(old_tree.root(), new_tree.root(), &opts);
        let changes = impact::filter_changes(changes, &self.config.impact);

        Ok(DiffResult::new(
            mode,
            item.old_path.clone().unwrap_or_default(),
            item.new_path.clone().unwrap_or_default(),
            self.config.profiles.build_profiles.clone(),
            changes,
            chrono::Utc::now(),
        ))
    }
}

fn decode(bytes: &[u8], path: &str) -> Result<String, DiffError> {
    String::from_utf8(bytes.to_vec()).map_err(|err| DiffError::Input {
        path: path.to_string(),
        detail: format!("not valid UTF-8: {err}"),
    })
}

fn language_hint(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

fn reject_triple_dot(range: &str) -> Result<(), DiffError> {
    if range.contains("...") {
        return Err(DiffError::RefResolution {
            detail: ConfigError::TripleDotRefRange {
                range: range.to_string(),
            }
            .to_string(),
        });
    }
    if !range.contains("..") {
        return Err(DiffError::RefResolution {
            detail: ConfigError::InvalidRefRange {
                range: range.to_string(),
            }
            .to_string(),
        });
    }
    Ok(())
}

fn file_entry_for_error(item: &WorkItem, message: &str) -> FileEntry {
    FileEntry {
        new_path: item.display_new_path(),
        old_path: item.old_path.clone(),
        status: item.status,
        outcome: FileStatus::Error {
            message: message.to_string(),
        },
    }
}

/// A `Modified`/`Renamed` work item whose diff turned up no changes (after
/// impact filtering) is reported as `Unchanged` instead — `Added`/`Removed`
/// stay as-is regardless, since a file's mere presence on only one side is
/// the status, independent of whether the differ had anything to say about
/// its contents.
fn observed_status(status: ChangeStatus, result: &DiffResult) -> ChangeStatus {
    match status {
        ChangeStatus::Modified | ChangeStatus::Renamed if result.stats.total_changes == 0 => {
            ChangeStatus::Unchanged
        }
        other => other,
    }
}

/// Run `f` on a dedicated thread, returning `None` if it doesn't finish
/// within `timeout` (§5 "Timeouts"). The thread is detached on timeout —
/// its result is discarded, matching §5's "in-flight tasks run to
/// completion... and their results are discarded" for the cancellation case,
/// applied here per-file.
fn run_with_timeout<T, F>(timeout: Duration, f: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(timeout).ok()
}

fn build_folder_work_set(
    old_dir: &Path,
    new_dir: &Path,
    recursive: bool,
    filter: &FilterEngine,
) -> Result<Vec<WorkItem>, DiffError> {
    let old_files = walk(old_dir, recursive)?;
    let new_files = walk(new_dir, recursive)?;

    let mut items = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for rel in old_files.iter().chain(new_files.iter()) {
        if !seen.insert(rel.clone()) {
            continue;
        }
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        if !filter.matches(&rel_str) {
            continue;
        }

        let old_path = old_dir.join(rel);
        let new_path = new_dir.join(rel);
        let old_blob = std::fs::read(&old_path).ok();
        let new_blob = std::fs::read(&new_path).ok();

        // No rename detection in a folder walk (§4.7): a path present on
        // only one side is Added/Removed, on both it's Modified (possibly
        // downgraded to Unchanged once diffed, see `observed_status`).
        let status = match (old_blob.is_some(), new_blob.is_some()) {
            (false, true) => ChangeStatus::Added,
            (true, false) => ChangeStatus::Removed,
            _ => ChangeStatus::Modified,
        };

        items.push(WorkItem {
            old_path: old_blob.is_some().then(|| rel_str.clone()),
            new_path: new_blob.is_some().then(|| rel_str.clone()),
            old_blob,
            new_blob,
            status,
        });
    }

    Ok(items)
}

fn walk(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, DiffError> {
    let mut out = Vec::new();
    walk_into(root, root, recursive, &mut out).map_err(|err| DiffError::Input {
        path: root.display().to_string(),
        detail: err.to_string(),
    })?;
    Ok(out)
}

fn walk_into(root: &Path, dir: &Path, recursive: bool, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                walk_into(root, &path, recursive, out)?;
            }
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_path_buf());
        }
    }
    Ok(())
}

fn build_ref_range_work_set(
    changes: Vec<crate::capability::RefChange>,
    filter: &FilterEngine,
) -> Vec<WorkItem> {
    changes
        .into_iter()
        .filter(|change| filter.matches(&change.path))
        .map(|change| {
            let old_path = change.old_path.clone().or_else(|| match change.status {
                RefChangeStatus::Added => None,
                _ => Some(change.path.clone()),
            });
            WorkItem {
                old_path,
                new_path: Some(change.path),
                old_blob: change.old_blob,
                new_blob: change.new_blob,
                status: ref_change_status(change.status),
            }
        })
        .collect()
}

/// Map the VCS capability's change vocabulary onto the model's (§3
/// "FileEntry" — `status: Added|Removed|Modified|Renamed`).
const fn ref_change_status(status: RefChangeStatus) -> ChangeStatus {
    match status {
        RefChangeStatus::Added => ChangeStatus::Added,
        RefChangeStatus::Removed => ChangeStatus::Removed,
        RefChangeStatus::Modified => ChangeStatus::Modified,
        RefChangeStatus::Renamed => ChangeStatus::Renamed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triple_dot_range_is_rejected() {
        let err = reject_triple_dot("main...feature").unwrap_err();
        assert!(err.to_string().contains("old..new") || err.to_string().contains("..."));
    }

    #[test]
    fn missing_double_dot_is_rejected() {
        assert!(reject_triple_dot("main").is_err());
    }

    #[test]
    fn valid_range_passes() {
        assert!(reject_triple_dot("main..feature").is_ok());
    }

    #[test]
    fn cancellation_token_round_trips() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn run_with_timeout_returns_none_when_exceeded() {
        let result = run_with_timeout(Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(200));
            42
        });
        assert!(result.is_none());
    }

    #[test]
    fn run_with_timeout_returns_some_when_fast() {
        let result = run_with_timeout(Duration::from_millis(200), || 42);
        assert_eq!(result, Some(42));
    }
}
