//! `old..new` range parsing, ref resolution, and the tree-to-tree diff
//! that turns a resolved range into [`RefChange`]s.

use gix::bstr::ByteSlice;
use gix::object::tree::diff::Change;

use semdiff::capability::{RefChange, RefChangeStatus, RefError};

/// Split `range` into its old and new sides. The core already rejects
/// triple-dot (`...`) ranges before a resolver ever sees them (§4 driver);
/// this only guards against a resolver being handed something malformed
/// directly (e.g. by a future caller that skips the driver).
pub(crate) fn split(range: &str) -> Result<(String, String), RefError> {
    let Some((old, new)) = range.split_once("..") else {
        return Err(RefError::InvalidRange { range: range.to_string() });
    };
    if old.is_empty() || new.is_empty() || new.starts_with('.') {
        return Err(RefError::InvalidRange { range: range.to_string() });
    }
    Ok((old.to_string(), new.to_string()))
}

pub(crate) fn resolve_tree<'repo>(
    repo: &'repo gix::Repository,
    spec: &str,
) -> Result<gix::Tree<'repo>, RefError> {
    let id = repo
        .rev_parse_single(spec)
        .map_err(|_| RefError::UnknownRef { reference: spec.to_string() })?;
    id.object()
        .and_then(|object| object.peel_to_tree())
        .map_err(|_| RefError::UnknownRef { reference: spec.to_string() })
}

pub(crate) fn diff(
    repo: &gix::Repository,
    old: &gix::Tree<'_>,
    new: &gix::Tree<'_>,
) -> Result<Vec<RefChange>, RefError> {
    let mut changes = Vec::new();

    old.changes()
        .map_err(|err| RefError::InvalidRange { range: err.to_string() })?
        .for_each_to_obtain_tree(new, |change| {
            record_change(repo, &change, &mut changes);
            Ok::<_, std::convert::Infallible>(gix::object::tree::diff::Action::Continue)
        })
        .map_err(|err| RefError::InvalidRange { range: err.to_string() })?;

    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(changes)
}

fn read_blob(repo: &gix::Repository, id: gix::Id<'_>) -> Option<Vec<u8>> {
    repo.find_object(id.detach()).ok().map(|obj| obj.data.clone())
}

fn record_change(repo: &gix::Repository, change: &Change<'_, '_, '_>, out: &mut Vec<RefChange>) {
    match change {
        Change::Addition { location, id, .. } => out.push(RefChange {
            path: location.to_str_lossy().into_owned(),
            old_path: None,
            status: RefChangeStatus::Added,
            old_blob: None,
            new_blob: read_blob(repo, *id),
        }),
        Change::Deletion { location, id, .. } => out.push(RefChange {
            path: location.to_str_lossy().into_owned(),
            old_path: None,
            status: RefChangeStatus::Removed,
            old_blob: read_blob(repo, *id),
            new_blob: None,
        }),
        Change::Modification { location, previous_id, id, .. } => out.push(RefChange {
            path: location.to_str_lossy().into_owned(),
            old_path: None,
            status: RefChangeStatus::Modified,
            old_blob: read_blob(repo, *previous_id),
            new_blob: read_blob(repo, *id),
        }),
        Change::Rewrite { source_location, location, source_id, id, .. } => out.push(RefChange {
            path: location.to_str_lossy().into_owned(),
            old_path: Some(source_location.to_str_lossy().into_owned()),
            status: RefChangeStatus::Renamed,
            old_blob: read_blob(repo, *source_id),
            new_blob: read_blob(repo, *id),
        }),
    }
}
