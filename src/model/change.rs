use serde::{Deserialize, Serialize};

use crate::capability::{NodeKind, Span};

/// What happened to a node between the old and new tree (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
    Moved,
    Renamed,
}

impl ChangeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Moved => "moved",
            Self::Renamed => "renamed",
        }
    }
}

/// Declared visibility of a changed node, as reported by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
    #[default]
    Unknown,
}

impl Visibility {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::Private => "private",
            Self::Unknown => "unknown",
        }
    }
}

/// Impact classification (§4.2). `ImpactClassifier` is the only component
/// allowed to construct one of these from scratch; `WhitespaceAnalyzer`
/// (§4.5) is the only component allowed to downgrade an existing one to
/// `FormattingOnly`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Impact {
    BreakingPublicApi,
    BreakingInternalApi,
    NonBreaking,
    FormattingOnly,
}

impl Impact {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BreakingPublicApi => "breaking-public-api",
            Self::BreakingInternalApi => "breaking-internal-api",
            Self::NonBreaking => "non-breaking",
            Self::FormattingOnly => "formatting-only",
        }
    }

    /// Coherence ordering used by the §4.4 "coherence upgrade" step: a
    /// parent's impact must be at least as severe as its most severe child.
    #[must_use]
    pub const fn severity(self) -> u8 {
        match self {
            Self::FormattingOnly => 0,
            Self::NonBreaking => 1,
            Self::BreakingInternalApi => 2,
            Self::BreakingPublicApi => 3,
        }
    }

    #[must_use]
    pub fn max(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

bitflags::bitflags! {
    /// Whitespace-related caveats attached by `WhitespaceAnalyzer` (§4.5).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct WhitespaceIssue: u8 {
        const INDENTATION_CHANGED = 0b0001;
        const MIXED_TABS_SPACES   = 0b0010;
        const TRAILING_WHITESPACE = 0b0100;
        const LINE_ENDING_CHANGED = 0b1000;
    }
}

/// A node in the hierarchical change tree (§3 "Change").
///
/// `Change` is frozen at construction: every invariant-bearing field
/// (`impact`, `children`) is set once by [`Change::leaf`] /
/// [`Change::with_children`] and the only further mutation allowed is the
/// narrowly-scoped downgrade exposed by [`Change::downgrade_to_formatting`]
/// and the caveat/profile accumulation used while merging (§4.8).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Change {
    pub kind: ChangeKind,
    pub node_kind: NodeKind,
    pub name: String,
    pub old_location: Option<Span>,
    pub new_location: Option<Span>,
    pub old_content: Option<String>,
    pub new_content: Option<String>,
    pub impact: Impact,
    pub visibility: Visibility,
    pub applicable_profiles: Vec<String>,
    pub whitespace_issues: WhitespaceIssue,
    pub caveats: Vec<String>,
    pub children: Vec<Change>,
}

impl Change {
    /// Build a leaf change (no children) with no whitespace issues or
    /// caveats yet attached — those are filled in by later passes.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn leaf(
        kind: ChangeKind,
        node_kind: NodeKind,
        name: impl Into<String>,
        old_location: Option<Span>,
        new_location: Option<Span>,
        old_content: Option<String>,
        new_content: Option<String>,
        impact: Impact,
        visibility: Visibility,
    ) -> Self {
        Self {
            kind,
            node_kind,
            name: name.into(),
            old_location,
            new_location,
            old_content,
            new_content,
            impact,
            visibility,
            applicable_profiles: Vec::new(),
            whitespace_issues: WhitespaceIssue::empty(),
            caveats: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Build a `Modified` change from a node whose children also changed,
    /// applying the §4.4 coherence upgrade: `impact` becomes at least as
    /// severe as the most severe child impact.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        let child_max = children
            .iter()
            .map(|c| c.impact)
            .fold(Impact::FormattingOnly, Impact::max);
        self.impact = self.impact.max(child_max);
        self.children = children;
        self
    }

    /// The only route by which an already-built `Change`'s impact may be
    /// lowered, used exclusively by `WhitespaceAnalyzer` (§4.5) and only
    /// when the owning language is whitespace-insignificant.
    pub fn downgrade_to_formatting(&mut self, issue: WhitespaceIssue) {
        self.whitespace_issues |= issue;
        self.impact = Impact::FormattingOnly;
    }

    pub fn add_caveat(&mut self, caveat: impl Into<String>) {
        self.caveats.push(caveat.into());
    }

    /// Depth-first count of this node plus every descendant, used for
    /// `Stats::total_changes` (§3 "Stats").
    #[must_use]
    pub fn count_including_self(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Self::count_including_self)
            .sum::<usize>()
    }

    /// Non-canonical flattened view (§3): depth-first pre-order list of
    /// `self` and every descendant. Exists for renderers that want a flat
    /// list; the hierarchical tree remains the source of truth.
    #[must_use]
    pub fn flatten(&self) -> Vec<&Self> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }

    /// `true` if `self`'s reported location does not overlap any sibling's,
    /// part of the §8 no-duplicate-reporting property check.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self.new_location.as_ref(), other.new_location.as_ref()) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => match (self.old_location.as_ref(), other.old_location.as_ref()) {
                (Some(a), Some(b)) => a.overlaps(b),
                _ => false,
            },
        }
    }
}
