//! The result model (§3): the hierarchical [`Change`] tree and the
//! containers ([`DiffResult`], [`MultiFileResult`]) that hold it.
//!
//! Everything here is plain data — construction goes through
//! [`Change::leaf`]/[`Change::with_children`] rather than public field
//! mutation, so that the no-duplicate and containment invariants can be
//! checked once at construction time instead of re-verified by every caller.

mod change;
mod result;

pub use change::{Change, ChangeKind, Impact, Visibility, WhitespaceIssue};
pub use result::{
    ChangeStatus, ComparisonMode, DiffResult, FileCounts, FileEntry, FileStatus, MultiFileResult,
    Stats,
};
