//! The `RefResolver` capability for `semdiff`: resolves a `old..new`
//! ref-range against a git repository and enumerates the changed blobs,
//! backed by [gix](https://github.com/GitoxideLabs/gitoxide).
//!
//! This mirrors the delegation shape of the teacher's own git abstraction —
//! a thin struct wrapping `gix::Repository`, with the actual work living in
//! free functions in a sibling module rather than inherent methods.

mod range;

use std::path::Path;

use semdiff::capability::{RefChange, RefError, RefResolver};

/// The `RefResolver` implementation `semdiff-cli` wires into the core for
/// `--ref-range` comparisons.
#[derive(Default)]
pub struct GixRefResolver;

impl GixRefResolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RefResolver for GixRefResolver {
    fn resolve(&self, root: &Path, range: &str) -> Result<Vec<RefChange>, RefError> {
        let (old_spec, new_spec) = range::split(range)?;

        let repo = gix::open(root).map_err(|_| RefError::NotARepository {
            path: root.display().to_string(),
        })?;

        let old_tree = range::resolve_tree(&repo, &old_spec)?;
        let new_tree = range::resolve_tree(&repo, &new_spec)?;
        range::diff(&repo, &old_tree, &new_tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_range_with_no_double_dot() {
        let resolver = GixRefResolver::new();
        let err = resolver.resolve(Path::new("."), "HEAD").unwrap_err();
        assert!(matches!(err, RefError::InvalidRange { .. }));
    }

    #[test]
    fn rejects_a_range_missing_the_new_side() {
        let resolver = GixRefResolver::new();
        let err = resolver.resolve(Path::new("."), "main..").unwrap_err();
        assert!(matches!(err, RefError::InvalidRange { .. }));
    }
}
