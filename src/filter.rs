//! FilterEngine (§4.6, component C6): compiles include/exclude glob lists
//! into a composite matcher, exclusion-wins, case-insensitive by default.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;

/// A compiled include/exclude filter (§4.6).
pub struct FilterEngine {
    include: GlobSet,
    include_empty: bool,
    exclude: GlobSet,
}

impl FilterEngine {
    /// Compile `include` and `exclude` glob pattern lists.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidGlob`] for any pattern using syntax the
    /// compiler doesn't support (e.g. brace expansion `{a,b}`), naming the
    /// first offending pattern.
    pub fn compile(include: &[String], exclude: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            include: build_glob_set(include)?,
            include_empty: include.is_empty(),
            exclude: build_glob_set(exclude)?,
        })
    }

    /// `true` if `path` (relative to the comparison root, `/`-separated)
    /// should be included.
    ///
    /// Exclusion wins: an exclude match always drops the file, regardless
    /// of any include match. An empty include set means "include all".
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let normalized = normalize(path);
        if self.exclude.is_match(&normalized) {
            return false;
        }
        self.include_empty || self.include.is_match(&normalized)
    }
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    reject_unsupported_syntax(patterns)?;
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::builder(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                detail: err.to_string(),
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|err| ConfigError::InvalidGlob {
        pattern: patterns.join(", "),
        detail: err.to_string(),
    })
}

/// `globset` silently treats `{`/`}` as literal characters rather than
/// rejecting them, but §4.6 requires brace expansion to be a hard
/// `ConfigError` rather than a silently-literal (and therefore
/// never-matching) pattern.
fn reject_unsupported_syntax(patterns: &[String]) -> Result<(), ConfigError> {
    for pattern in patterns {
        if pattern.contains('{') || pattern.contains('}') {
            return Err(ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                detail: "brace expansion is not supported".to_string(),
            });
        }
    }
    Ok(())
}
