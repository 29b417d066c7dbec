//! Error taxonomy for semdiff (§7).
//!
//! [`ConfigError`] is always fatal — it means the run cannot start at all
//! (bad glob syntax, an unsupported whitespace mode, a malformed ref range).
//! [`DiffError`] covers everything that can go wrong comparing one pair of
//! files or driving a multi-file run; most of its variants are recorded
//! per-file ([`crate::model::FileEntry`]) rather than aborting the whole run
//! — only [`DiffError::RefResolution`] and [`DiffError::Cancelled`] are
//! fatal for the run as a whole (§7).

use std::fmt;

/// Fatal configuration failures (§7 "ConfigError").
#[derive(Debug)]
pub enum ConfigError {
    /// An include/exclude glob pattern used syntax `FilterEngine` does not
    /// support (e.g. brace expansion).
    InvalidGlob {
        /// The pattern that failed to compile.
        pattern: String,
        /// The underlying compiler's complaint.
        detail: String,
    },

    /// A ref range was not of the form `old..new`.
    InvalidRefRange {
        /// The raw range string.
        range: String,
    },

    /// `old...new` (triple-dot, merge-base form) was given; only `old..new`
    /// is supported (§4.7).
    TripleDotRefRange {
        /// The raw range string.
        range: String,
    },

    /// A numeric option was outside its valid range (e.g. a similarity
    /// threshold outside `0.0..=1.0`).
    OutOfRange {
        /// The option name.
        option: String,
        /// The value that was rejected.
        value: String,
    },

    /// The configuration file contained a field this version doesn't
    /// recognize, or was not valid TOML.
    Malformed {
        /// Human-readable detail, typically the underlying parser error.
        detail: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGlob { pattern, detail } => {
                write!(
                    f,
                    "invalid glob pattern {pattern:?}: {detail}\nTo fix: remove unsupported syntax (brace expansion like `{{a,b}}` is not supported) or quote the pattern correctly."
                )
            }
            Self::InvalidRefRange { range } => {
                write!(
                    f,
                    "invalid ref range {range:?}\nTo fix: use the form `old..new`, e.g. `main..feature-branch`."
                )
            }
            Self::TripleDotRefRange { range } => {
                write!(
                    f,
                    "ref range {range:?} uses `...` (merge-base form), which is not supported\nTo fix: use `old..new` instead of `old...new`."
                )
            }
            Self::OutOfRange { option, value } => {
                write!(f, "option {option} has an out-of-range value: {value}")
            }
            Self::Malformed { detail } => write!(f, "malformed configuration: {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Malformed {
            detail: err.to_string(),
        }
    }
}

/// Errors that can occur diffing one file pair or driving a multi-file run
/// (§7).
#[derive(Debug)]
pub enum DiffError {
    /// The old or new file could not be read.
    Input {
        /// The path that could not be read.
        path: String,
        /// The underlying I/O error, as text (kept `Clone`-friendly rather
        /// than wrapping `io::Error`, which isn't `Clone`).
        detail: String,
    },

    /// The `Parser` capability rejected the file outright.
    Parse {
        /// The path that failed to parse.
        path: String,
        /// The parser's complaint.
        detail: String,
    },

    /// A per-file comparison exceeded `per_file_timeout_ms`.
    Timeout {
        /// The path that timed out.
        path: String,
        /// The configured timeout, for the error message.
        timeout_ms: u64,
    },

    /// A fatal failure resolving a VCS ref range; aborts the whole run.
    RefResolution {
        /// Human-readable detail, typically the `RefError`'s `Display`.
        detail: String,
    },

    /// The whole run was cancelled (e.g. by a `--timeout` or Ctrl-C in the
    /// CLI); distinct from a single file timing out.
    Cancelled,
}

impl fmt::Display for DiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input { path, detail } => write!(f, "cannot read {path}: {detail}"),
            Self::Parse { path, detail } => write!(f, "cannot parse {path}: {detail}"),
            Self::Timeout { path, timeout_ms } => {
                write!(f, "{path} exceeded the {timeout_ms}ms per-file timeout")
            }
            Self::RefResolution { detail } => write!(f, "ref resolution failed: {detail}"),
            Self::Cancelled => write!(f, "run cancelled"),
        }
    }
}

impl std::error::Error for DiffError {}

impl DiffError {
    /// `true` for variants that should be recorded against a single
    /// [`crate::model::FileEntry`] rather than aborting the whole run (§7).
    #[must_use]
    pub const fn is_per_file(&self) -> bool {
        matches!(self, Self::Input { .. } | Self::Parse { .. } | Self::Timeout { .. })
    }
}
