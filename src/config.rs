//! Typed configuration surface (§6 "Configuration options").
//!
//! `SemdiffConfig` is parsed from TOML with `#[serde(deny_unknown_fields)]`
//! so a typo in a config file is a loud [`ConfigError`], not a silently
//! ignored field. Every field has a default so a bare `[whitespace]`
//! section (or no file at all) is valid.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// §4.1 whitespace comparison modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum WhitespaceMode {
    Exact,
    IgnoreLeadingTrailing,
    IgnoreAll,
    #[default]
    LanguageAware,
}

impl fmt::Display for WhitespaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exact => "exact",
            Self::IgnoreLeadingTrailing => "ignore-leading-trailing",
            Self::IgnoreAll => "ignore-all",
            Self::LanguageAware => "language-aware",
        };
        f.write_str(s)
    }
}

/// §6 `impact_filter`: which impact tiers a renderer should keep.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ImpactFilter {
    BreakingPublic,
    BreakingInternal,
    NonBreaking,
    #[default]
    All,
}

impl fmt::Display for ImpactFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BreakingPublic => "breaking-public",
            Self::BreakingInternal => "breaking-internal",
            Self::NonBreaking => "non-breaking",
            Self::All => "all",
        };
        f.write_str(s)
    }
}

/// WhitespaceEngine settings (§4.1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WhitespaceSettings {
    pub mode: WhitespaceMode,
}

impl Default for WhitespaceSettings {
    fn default() -> Self {
        Self {
            mode: WhitespaceMode::LanguageAware,
        }
    }
}

/// Rendering/filtering settings over the computed change tree (§6).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ImpactSettings {
    pub filter: ImpactFilter,
    pub include_non_impactful: bool,
    pub include_formatting: bool,
}

impl Default for ImpactSettings {
    fn default() -> Self {
        Self {
            filter: ImpactFilter::All,
            include_non_impactful: true,
            include_formatting: false,
        }
    }
}

/// NodeMatcher thresholds (§4.3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MatcherSettings {
    /// Minimum similarity score, in `[0.0, 1.0]`, for an unmatched old/new
    /// pair to be classified `Renamed` rather than `Removed` + `Added`.
    pub similarity_threshold: f64,
    /// Minimum sibling-index delta for a matched pair to be reported as
    /// `Moved` rather than `Modified` in place.
    pub move_threshold: u32,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            move_threshold: 1,
        }
    }
}

/// MultiFileDriver settings (§4.7, §5).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DriverSettings {
    /// `0` means "use the logical CPU count" (§5).
    pub concurrency_limit: usize,
    pub per_file_timeout_ms: u64,
    pub recursive: bool,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            concurrency_limit: 0,
            per_file_timeout_ms: 60_000,
            recursive: true,
            include_globs: Vec::new(),
            exclude_globs: Vec::new(),
        }
    }
}

/// Build-profile settings for the §4.8 multi-profile merge. `spec.md` leaves
/// open how profiles are supplied; this crate exposes them as a plain list
/// here and the CLI collects them via a repeatable `--profile` flag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct ProfileSettings {
    pub build_profiles: Vec<String>,
}

/// The full configuration surface (§6 "Configuration options").
///
/// Parsed from TOML with `toml::from_str`; every sub-struct has
/// `#[serde(default)]` so a partial file (or none at all, via
/// [`SemdiffConfig::default`]) is valid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct SemdiffConfig {
    pub whitespace: WhitespaceSettings,
    pub impact: ImpactSettings,
    pub matcher: MatcherSettings,
    pub driver: DriverSettings,
    pub profiles: ProfileSettings,
}

impl SemdiffConfig {
    /// Parse from TOML text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Malformed`] on invalid TOML or an unknown
    /// field, and a specific structured variant for any value that is
    /// syntactically valid TOML but semantically out of range (see
    /// [`SemdiffConfig::validate`]).
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the numeric options that TOML's type system can't constrain on
    /// its own (§6: `similarity_threshold ∈ [0,1]`, `move_threshold`
    /// positive, `per_file_timeout_ms` positive).
    ///
    /// # Errors
    /// Returns [`ConfigError::OutOfRange`] for the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.matcher.similarity_threshold) {
            return Err(ConfigError::OutOfRange {
                option: "matcher.similarity_threshold".into(),
                value: self.matcher.similarity_threshold.to_string(),
            });
        }
        if self.matcher.move_threshold == 0 {
            return Err(ConfigError::OutOfRange {
                option: "matcher.move_threshold".into(),
                value: "0".into(),
            });
        }
        if self.driver.per_file_timeout_ms == 0 {
            return Err(ConfigError::OutOfRange {
                option: "driver.per_file_timeout_ms".into(),
                value: "0".into(),
            });
        }
        Ok(())
    }

    /// Resolve `concurrency_limit`, substituting the logical CPU count for
    /// the sentinel `0` (§5 "sized to the logical CPU count").
    #[must_use]
    pub fn effective_concurrency(&self) -> usize {
        if self.driver.concurrency_limit == 0 {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        } else {
            self.driver.concurrency_limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SemdiffConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_similarity_threshold() {
        let mut config = SemdiffConfig::default();
        config.matcher.similarity_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_zero_move_threshold() {
        let mut config = SemdiffConfig::default();
        config.matcher.move_threshold = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = SemdiffConfig::from_toml("bogus_top_level_field = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn parses_partial_file_with_defaults() {
        let config = SemdiffConfig::from_toml(
            r#"
            [whitespace]
            mode = "exact"
            "#,
        )
        .unwrap();
        assert_eq!(config.whitespace.mode, WhitespaceMode::Exact);
        assert_eq!(config.impact.filter, ImpactFilter::All);
    }

    #[test]
    fn effective_concurrency_defaults_to_cpu_count() {
        let config = SemdiffConfig::default();
        assert!(config.effective_concurrency() >= 1);
    }
}
