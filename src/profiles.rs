//! Multi-profile merge (§4.8): coalesce per-build-profile change trees into
//! one tree where each `Change` lists every profile it appeared in.

use std::collections::BTreeMap;

use crate::capability::Span;
use crate::model::Change;

/// Identity key for coalescing changes across profiles (§4.8): `(kind,
/// name, new_location)`. `Change` carries no node signature of its own
/// (only `old_content`/`new_content`, the node's body text) — folding body
/// text into the key would make two profiles' views of the same logical
/// node fail to coalesce whenever per-profile compilation made their
/// bodies differ, which is exactly the case this merge exists to handle.
/// Name plus location is what the differ already uses to identify a node
/// within one tree, so it's what identifies the same node across trees too.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
struct MergeKey {
    kind: crate::model::ChangeKind,
    name: String,
    new_location: Option<(u32, u32, u32, u32)>,
}

fn span_key(span: Option<Span>) -> Option<(u32, u32, u32, u32)> {
    span.map(|s| (s.start_line, s.end_line, s.start_col, s.end_col))
}

fn merge_key(change: &Change) -> MergeKey {
    MergeKey {
        kind: change.kind,
        name: change.name.clone(),
        new_location: span_key(change.new_location),
    }
}

/// Merge one profile's change tree into the accumulator, tagging every node
/// (recursively) with `profile`.
fn merge_profile(acc: &mut BTreeMap<MergeKey, Change>, profile: &str, changes: Vec<Change>) {
    for mut change in changes {
        tag_profile_recursive(&mut change, profile);
        let key = merge_key(&change);
        acc.entry(key)
            .and_modify(|existing| coalesce(existing, &change))
            .or_insert(change);
    }
}

fn tag_profile_recursive(change: &mut Change, profile: &str) {
    if !change.applicable_profiles.iter().any(|p| p == profile) {
        change.applicable_profiles.push(profile.to_string());
    }
    for child in &mut change.children {
        tag_profile_recursive(child, profile);
    }
}

fn coalesce(existing: &mut Change, incoming: &Change) {
    for profile in &incoming.applicable_profiles {
        if !existing.applicable_profiles.iter().any(|p| p == profile) {
            existing.applicable_profiles.push(profile.clone());
        }
    }
    // Children are merged by the same identity key, recursively, so a node
    // present in every profile ends up with the full union at every depth.
    let mut child_acc: BTreeMap<MergeKey, Change> = BTreeMap::new();
    for child in existing.children.drain(..).chain(incoming.children.iter().cloned()) {
        let key = merge_key(&child);
        child_acc
            .entry(key)
            .and_modify(|slot| coalesce(slot, &child))
            .or_insert(child);
    }
    existing.children = child_acc.into_values().collect();
}

/// Merge `per_profile` change trees, where each entry is `(profile_name,
/// changes_for_that_profile)`, into one change tree annotated with the set
/// of profiles each node is `applicable_profiles` in.
///
/// A single profile is returned unmodified (still tagged), so callers don't
/// need to special-case the no-merge path.
#[must_use]
pub fn merge(per_profile: Vec<(String, Vec<Change>)>) -> Vec<Change> {
    let mut acc: BTreeMap<MergeKey, Change> = BTreeMap::new();
    for (profile, changes) in per_profile {
        merge_profile(&mut acc, &profile, changes);
    }
    acc.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::NodeKind;
    use crate::model::{ChangeKind, Impact, Visibility};

    fn change(name: &str, span: Span) -> Change {
        Change::leaf(
            ChangeKind::Modified,
            NodeKind::Method,
            name,
            Some(span),
            Some(span),
            None,
            None,
            Impact::NonBreaking,
            Visibility::Public,
        )
    }

    #[test]
    fn same_node_across_profiles_gets_union_of_profiles() {
        let span = Span::new(1, 2, 0, 0);
        let debug = vec![change("Foo", span)];
        let release = vec![change("Foo", span)];
        let merged = merge(vec![
            ("debug".to_string(), debug),
            ("release".to_string(), release),
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].applicable_profiles.len(), 2);
    }

    #[test]
    fn profile_specific_node_keeps_single_profile() {
        let span_a = Span::new(1, 2, 0, 0);
        let span_b = Span::new(3, 4, 0, 0);
        let debug = vec![change("Foo", span_a)];
        let release = vec![change("Bar", span_b)];
        let merged = merge(vec![
            ("debug".to_string(), debug),
            ("release".to_string(), release),
        ]);
        assert_eq!(merged.len(), 2);
        assert!(merged
            .iter()
            .find(|c| c.name == "Foo")
            .unwrap()
            .applicable_profiles
            == vec!["debug".to_string()]);
    }
}
