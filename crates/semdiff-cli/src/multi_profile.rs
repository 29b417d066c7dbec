//! Glue that drives one full comparison per `--profile` and coalesces the
//! resulting change trees with [`semdiff::profiles::merge`] (§4.8). This
//! lives in the CLI rather than the core crate because "run N times and
//! merge" is an orchestration policy, not part of the diff algorithm
//! itself — the core only knows how to merge trees it's handed.

use std::collections::BTreeMap;

use semdiff::model::{
    Change, ChangeStatus, ComparisonMode, DiffResult, FileEntry, FileStatus, MultiFileResult,
};
use semdiff::profiles;

/// When only one (possibly anonymous) profile ran, return its result as-is
/// rather than routing it through [`profiles::merge`] — that would tag
/// every change with whatever placeholder profile name the caller used for
/// a no-`--profile` run.
#[must_use]
pub fn merge_single(tagged: Vec<(String, DiffResult)>) -> DiffResult {
    if let [(_, only)] = tagged.as_slice() {
        return only.clone();
    }

    let mode = tagged.first().map_or(ComparisonMode::Direct, |(_, r)| r.mode);
    let old_path = tagged.first().map_or_else(String::new, |(_, r)| r.old_path.clone());
    let new_path = tagged.first().map_or_else(String::new, |(_, r)| r.new_path.clone());
    let generated_at = tagged.first().map_or_else(chrono::Utc::now, |(_, r)| r.generated_at);

    let per_profile: Vec<(String, Vec<Change>)> = tagged
        .into_iter()
        .map(|(profile, result)| (profile, result.changes))
        .collect();
    let profiles_used: Vec<String> = per_profile.iter().map(|(p, _)| p.clone()).collect();
    let merged = profiles::merge(per_profile);

    DiffResult::new(mode, old_path, new_path, profiles_used, merged, generated_at)
}

/// See [`merge_single`] for why a single tagged run skips the merge path.
#[must_use]
pub fn merge_multi(tagged: Vec<(String, MultiFileResult)>) -> MultiFileResult {
    if let [(_, only)] = tagged.as_slice() {
        return only.clone();
    }

    let Some((_, first)) = tagged.first() else {
        return MultiFileResult::summarize(Vec::new(), ComparisonMode::Folder);
    };
    let comparison_mode = first.comparison_mode;
    let ref_range = first.ref_range.clone();
    let old_root = first.old_root.clone();
    let new_root = first.new_root.clone();

    // new_path -> (old_path, change-status, per-profile change lists, any error message)
    let mut by_path: BTreeMap<
        String,
        (Option<String>, ChangeStatus, Vec<(String, Vec<Change>)>, Option<String>),
    > = BTreeMap::new();

    for (profile, result) in &tagged {
        for entry in &result.files {
            let slot = by_path
                .entry(entry.new_path.clone())
                .or_insert_with(|| (entry.old_path.clone(), entry.status, Vec::new(), None));
            match &entry.outcome {
                FileStatus::Ok { result } => slot.2.push((profile.clone(), result.changes.clone())),
                FileStatus::Error { message } => {
                    slot.3.get_or_insert_with(|| message.clone());
                }
            }
        }
    }

    let files: Vec<FileEntry> = by_path
        .into_iter()
        .map(|(new_path, (old_path, status, per_profile, error))| {
            if let Some(message) = error {
                return FileEntry {
                    new_path,
                    old_path,
                    status,
                    outcome: FileStatus::Error { message },
                };
            }
            let profiles_used: Vec<String> = per_profile.iter().map(|(p, _)| p.clone()).collect();
            let merged = profiles::merge(per_profile);
            let result = DiffResult::new(
                comparison_mode,
                old_path.clone().unwrap_or_default(),
                new_path.clone(),
                profiles_used,
                merged,
                chrono::Utc::now(),
            );
            FileEntry {
                new_path,
                old_path,
                status,
                outcome: FileStatus::Ok { result: Box::new(result) },
            }
        })
        .collect();

    let mut merged = MultiFileResult::summarize(files, comparison_mode);
    merged.ref_range = ref_range;
    merged.old_root = old_root;
    merged.new_root = new_root;
    merged
}
