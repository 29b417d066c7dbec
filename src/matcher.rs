//! NodeMatcher (§4.3, component C3): pairs up the children of one parent
//! node across the old and new tree.
//!
//! The three-stage algorithm (exact identity, then signature-based rename
//! detection, then similarity scoring) mirrors the item-matching pass the
//! teacher's AST merge performs over top-level declarations before
//! building an edit script — here the "edit script" is the `Change` tree
//! `TreeDiffer` builds from the pairs this module produces.

use std::collections::HashMap;

use crate::capability::{Node, NodeKind};

/// Output of matching one parent's `old_children` against `new_children`
/// (§4.3).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchResult {
    /// `(old_index, new_index)` pairs, in the order they were resolved.
    pub pairs: Vec<(usize, usize)>,
    pub old_only: Vec<usize>,
    pub new_only: Vec<usize>,
}

/// Pairs annotated with whether the match came from signature-only
/// comparison (i.e. is a rename candidate) or from similarity scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchOrigin {
    ExactIdentity,
    SignatureRename,
    Similarity,
}

/// A resolved pair plus how it was found, needed by `TreeDiffer` to decide
/// between `Renamed`/`Modified`/`Moved` (§4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchedPair {
    pub old_index: usize,
    pub new_index: usize,
    pub origin: MatchOrigin,
}

fn identity_key(node: &dyn Node) -> (NodeKind, &str, &str) {
    (node.kind(), node.identifier().unwrap_or(""), node.signature())
}

/// Run the full §4.3 algorithm.
#[must_use]
pub fn match_children(
    old_children: &[&dyn Node],
    new_children: &[&dyn Node],
    similarity_threshold: f64,
) -> (MatchResult, Vec<MatchedPair>) {
    let mut result = MatchResult::default();
    let mut matched_pairs = Vec::new();

    let mut old_remaining: Vec<usize> = (0..old_children.len()).collect();
    let mut new_remaining: Vec<usize> = (0..new_children.len()).collect();

    // Stage 1: exact identity, keyed by (kind, name, signature). Ties broken
    // by closest old-position to new-position.
    let mut by_key: HashMap<(NodeKind, &str, &str), Vec<usize>> = HashMap::new();
    for &new_idx in &new_remaining {
        by_key
            .entry(identity_key(new_children[new_idx]))
            .or_default()
            .push(new_idx);
    }

    let mut consumed_new = vec![false; new_children.len()];
    old_remaining.retain(|&old_idx| {
        let key = identity_key(old_children[old_idx]);
        let Some(candidates) = by_key.get_mut(&key) else {
            return true;
        };
        candidates.retain(|&n| !consumed_new[n]);
        if candidates.is_empty() {
            return true;
        }
        let best = *candidates
            .iter()
            .min_by_key(|&&n| n.abs_diff(old_idx))
            .expect("non-empty");
        consumed_new[best] = true;
        result.pairs.push((old_idx, best));
        matched_pairs.push(MatchedPair {
            old_index: old_idx,
            new_index: best,
            origin: MatchOrigin::ExactIdentity,
        });
        false
    });
    new_remaining.retain(|&n| !consumed_new[n]);

    // Stage 2: signature-based rename detection for Method/Property/Field.
    let mut consumed_new2 = vec![false; new_children.len()];
    old_remaining.retain(|&old_idx| {
        let old_node = old_children[old_idx];
        if !old_node.kind().has_signature() || old_node.signature().is_empty() {
            return true;
        }
        let found = new_remaining.iter().find(|&&new_idx| {
            !consumed_new2[new_idx]
                && new_children[new_idx].kind() == old_node.kind()
                && !new_children[new_idx].signature().is_empty()
                && new_children[new_idx].signature() == old_node.signature()
        });
        if let Some(&new_idx) = found {
            consumed_new2[new_idx] = true;
            result.pairs.push((old_idx, new_idx));
            matched_pairs.push(MatchedPair {
                old_index: old_idx,
                new_index: new_idx,
                origin: MatchOrigin::SignatureRename,
            });
            false
        } else {
            true
        }
    });
    new_remaining.retain(|&n| !consumed_new2[n]);

    // Stage 3: similarity scoring, same kind, greedy highest-first,
    // tie-broken by positional distance.
    let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
    for &old_idx in &old_remaining {
        let old_node = old_children[old_idx];
        for &new_idx in &new_remaining {
            let new_node = new_children[new_idx];
            if old_node.kind() != new_node.kind() {
                continue;
            }
            let score = similarity(old_node, new_node);
            if score >= similarity_threshold {
                candidates.push((old_idx, new_idx, score));
            }
        }
    }
    candidates.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.abs_diff(a.1).cmp(&b.0.abs_diff(b.1)))
    });

    let mut old_used = vec![false; old_children.len()];
    let mut new_used = vec![false; new_children.len()];
    for (old_idx, new_idx, _) in candidates {
        if old_used[old_idx] || new_used[new_idx] {
            continue;
        }
        old_used[old_idx] = true;
        new_used[new_idx] = true;
        result.pairs.push((old_idx, new_idx));
        matched_pairs.push(MatchedPair {
            old_index: old_idx,
            new_index: new_idx,
            origin: MatchOrigin::Similarity,
        });
    }

    result.old_only = old_remaining
        .into_iter()
        .filter(|&i| !old_used[i])
        .collect();
    result.new_only = new_remaining
        .into_iter()
        .filter(|&i| !new_used[i])
        .collect();

    (result, matched_pairs)
}

/// Similarity score in `[0, 1]` over content hashes, child count, and a
/// normalised token bag (§4.3 step 3). Content-hash equality short-circuits
/// to `1.0`; otherwise the score blends child-count closeness and token
/// overlap.
#[tracing::instrument(level = "trace", skip_all)]
fn similarity(old: &dyn Node, new: &dyn Node) -> f64 {
    if old.content_hash() == new.content_hash() {
        return 1.0;
    }

    let old_children = old.children();
    let new_children = new.children();
    let child_count_score = {
        let max = old_children.len().max(new_children.len()).max(1) as f64;
        let diff = old_children.len().abs_diff(new_children.len()) as f64;
        1.0 - (diff / max)
    };

    let token_score = token_overlap(old.body_text().unwrap_or_default(), new.body_text().unwrap_or_default());

    0.4 * child_count_score + 0.6 * token_score
}

fn token_overlap(old: &str, new: &str) -> f64 {
    let old_tokens: std::collections::HashSet<&str> = old.split_whitespace().collect();
    let new_tokens: std::collections::HashSet<&str> = new.split_whitespace().collect();
    if old_tokens.is_empty() && new_tokens.is_empty() {
        return 1.0;
    }
    let intersection = old_tokens.intersection(&new_tokens).count() as f64;
    let union = old_tokens.union(&new_tokens).count().max(1) as f64;
    intersection / union
}
