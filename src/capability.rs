//! External collaborator contracts (§6): the `Parser` and `RefResolver`
//! capabilities this crate consumes but does not implement.
//!
//! Concrete implementations live in sibling crates (`semdiff-parse`,
//! `semdiff-vcs`) so that the core never depends on a specific parsing
//! library or version-control backend. Both traits are object-safe so a
//! caller can hold `&dyn Parser` / `&dyn RefResolver`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Visibility;

// ---------------------------------------------------------------------------
// Source tree node interface (§3 "Source tree (external)")
// ---------------------------------------------------------------------------

/// Structural kind of a node in a parsed source tree.
///
/// This is the closed vocabulary the differ reasons about; a `Parser`
/// implementation maps whatever its grammar calls things onto this set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Namespace,
    Class,
    Interface,
    Struct,
    Record,
    Enum,
    Method,
    Property,
    Field,
    Statement,
    Other,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Namespace => "namespace",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::Record => "record",
            Self::Enum => "enum",
            Self::Method => "method",
            Self::Property => "property",
            Self::Field => "field",
            Self::Statement => "statement",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

impl NodeKind {
    /// Kinds for which the differ compares `signature` strings (§4.3 step 2).
    #[must_use]
    pub const fn has_signature(self) -> bool {
        matches!(self, Self::Method | Self::Property | Self::Field)
    }
}

/// A 1-based, inclusive text span, as reported by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub end_line: u32,
    pub start_col: u32,
    pub end_col: u32,
}

impl Span {
    /// Construct a span, asserting the §3 span-sanity invariant
    /// (`start_line <= end_line`, `start_line >= 1`) in debug builds only —
    /// callers that receive malformed spans from a parser should treat the
    /// file as a [`crate::error::DiffError::ParseAnomaly`], not panic.
    #[must_use]
    pub const fn new(start_line: u32, end_line: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start_line,
            end_line,
            start_col,
            end_col,
        }
    }

    /// `true` if `self`'s lines and columns lie within `other`'s (§3 Containment).
    #[must_use]
    pub const fn is_contained_in(&self, other: &Self) -> bool {
        let start_ok = self.start_line > other.start_line
            || (self.start_line == other.start_line && self.start_col >= other.start_col);
        let end_ok = self.end_line < other.end_line
            || (self.end_line == other.end_line && self.end_col <= other.end_col);
        self.start_line >= other.start_line && self.end_line <= other.end_line && start_ok && end_ok
    }

    /// `true` if `self` and `other` share no lines/columns.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        !(self.end_line < other.start_line
            || other.end_line < self.start_line
            || (self.end_line == other.start_line && self.end_col < other.start_col)
            || (other.end_line == self.start_line && other.end_col < self.start_col))
    }

    /// §3 span-sanity: `start_line <= end_line`, `start_line >= 1`.
    #[must_use]
    pub const fn is_sane(&self) -> bool {
        self.start_line >= 1 && self.start_line <= self.end_line
    }
}

/// A single node in a parsed source tree, as the differ sees it.
///
/// Implementations wrap whatever concrete parse-tree type the `Parser`
/// returns (a tree-sitter node, a hand-rolled AST node, …); this trait is
/// the only surface the core touches.
pub trait Node {
    /// The structural kind of this node.
    fn kind(&self) -> NodeKind;

    /// The node's identifier, if it has one (namespaces, types, members).
    fn identifier(&self) -> Option<&str>;

    /// Canonical signature string for Method/Property/Field; empty for
    /// anything else. Used for rename detection (§4.3 step 2).
    fn signature(&self) -> &str;

    /// Declared visibility, or `Unknown` if the parser can't tell.
    fn visibility(&self) -> Visibility;

    /// The node's text span in its owning file.
    fn span(&self) -> Span;

    /// A deterministic content hash (implementation-chosen) used for the
    /// fast-path equality check in §4.4.
    fn content_hash(&self) -> u64;

    /// Ordered immediate children. The differ extracts only the *immediate*
    /// structural children at each level (§4.4 step 1) — never flattens
    /// the whole subtree itself.
    fn children(&self) -> Vec<&dyn Node>;

    /// Raw source text of this node's body, for leaf comparisons (§4.4 step 6)
    /// and for `include_content` rendering. `None` when the parser doesn't
    /// retain body text for this node kind.
    fn body_text(&self) -> Option<&str>;
}

/// A parsed source tree, rooted at a synthetic file-level node.
pub trait Tree {
    /// The root node. Its own span may be absent for a synthetic root.
    fn root(&self) -> &dyn Node;

    /// Deterministic hash of the whole tree, used for the §4.4 fast path
    /// ("if `hash(old_root) == hash(new_root)`, return `[]` immediately").
    fn root_hash(&self) -> u64;
}

// ---------------------------------------------------------------------------
// Parser capability
// ---------------------------------------------------------------------------

/// Failure to produce a [`Tree`] from source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The language hint was not recognized by this parser.
    UnsupportedLanguage {
        /// The file extension or language tag that was rejected.
        hint: String,
    },
    /// The parser ran but could not build a usable tree (e.g. the grammar
    /// rejected the input outright rather than producing error nodes).
    Malformed {
        /// Human-readable detail.
        detail: String,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedLanguage { hint } => {
                write!(f, "unsupported language hint: {hint:?}")
            }
            Self::Malformed { detail } => write!(f, "parse failed: {detail}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// The parsing capability the core assumes (§6).
///
/// `semdiff` never parses text itself; implementations wrap an existing
/// parser (tree-sitter, a hand-rolled scanner, …) and hand back something
/// implementing [`Tree`].
pub trait Parser {
    /// Parse `text`, using `language_hint` (typically a file extension like
    /// `"cs"` or `"vb"`, without the dot) to pick a grammar.
    ///
    /// # Errors
    /// Returns [`ParseError`] if the hint is unrecognized or the text could
    /// not be parsed at all.
    fn parse(&self, text: &str, language_hint: &str) -> Result<Box<dyn Tree>, ParseError>;
}

// ---------------------------------------------------------------------------
// RefResolver capability
// ---------------------------------------------------------------------------

/// Per-path change status as reported by a [`RefResolver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefChangeStatus {
    Added,
    Removed,
    Modified,
    Renamed,
}

/// One changed path between the two ends of a ref range.
#[derive(Clone, Debug)]
pub struct RefChange {
    /// Path relative to the repository root.
    pub path: String,
    /// Previous path, when `status` is `Renamed`.
    pub old_path: Option<String>,
    pub status: RefChangeStatus,
    pub old_blob: Option<Vec<u8>>,
    pub new_blob: Option<Vec<u8>>,
}

/// Failure from a [`RefResolver`] (§6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefError {
    /// The range string was not of the form `old..new` (or used `old...new`,
    /// which FilterEngine/driver callers must reject before dispatch).
    InvalidRange {
        /// The raw range string that failed to parse.
        range: String,
    },
    /// Neither endpoint of the range resolved to a known revision.
    UnknownRef {
        /// The ref expression that did not resolve.
        reference: String,
    },
    /// The root path is not inside a version-control working copy.
    NotARepository {
        /// The path that was checked.
        path: String,
    },
}

impl fmt::Display for RefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRange { range } => write!(f, "invalid ref range {range:?}"),
            Self::UnknownRef { reference } => write!(f, "unknown ref {reference:?}"),
            Self::NotARepository { path } => write!(f, "not a repository: {path}"),
        }
    }
}

impl std::error::Error for RefError {}

/// The version-control capability the core assumes for ref-range comparisons
/// (§6, §4.7 "Ref-range mode").
pub trait RefResolver {
    /// Resolve `range` (`old..new`) rooted at `root`, returning every
    /// changed path with its status and blob contents.
    ///
    /// # Errors
    /// Returns [`RefError`] if `range` is malformed or does not resolve.
    fn resolve(&self, root: &std::path::Path, range: &str) -> Result<Vec<RefChange>, RefError>;
}
