//! semdiff — structural semantic diff over parsed source trees.
//!
//! This crate is the core: it does not parse source text and it does not
//! talk to a version-control system. It consumes a [`Tree`](capability::Tree)
//! produced by some [`Parser`](capability::Parser) and produces a
//! hierarchical [`model::Change`] tree annotated with impact, visibility,
//! and whitespace-issue metadata. Multi-file orchestration ([`driver`])
//! additionally consumes a [`RefResolver`](capability::RefResolver) for
//! ref-range comparisons.
//!
//! # Crate layout
//!
//! - [`model`] — the shared result types: [`model::Change`], [`model::DiffResult`],
//!   [`model::MultiFileResult`].
//! - [`capability`] — the `Parser` and `RefResolver` traits external crates
//!   implement (see `semdiff-parse` and `semdiff-vcs`).
//! - [`whitespace`] — the whitespace comparator (C1).
//! - [`impact`] — the impact classifier (C2).
//! - [`matcher`] — sibling-list matching by identity/signature/similarity (C3).
//! - [`differ`] — the recursive structural differ (C4).
//! - [`whitespace_analyzer`] — the post-pass that fills in whitespace issues (C5).
//! - [`filter`] — glob include/exclude compilation and matching (C6).
//! - [`driver`] — the multi-file work-set builder and bounded-parallel dispatcher (C7).
//! - [`profiles`] — per-build-profile change-tree merging (C8).
//! - [`render`] — read-only renderers over [`model::DiffResult`] / [`model::MultiFileResult`].
//! - [`config`] — [`config::SemdiffConfig`], the typed configuration surface.
//! - [`error`] — [`error::DiffError`] and [`error::ConfigError`].

pub mod capability;
pub mod config;
pub mod differ;
pub mod driver;
pub mod error;
pub mod filter;
pub mod impact;
pub mod matcher;
pub mod model;
pub mod profiles;
pub mod render;
pub mod whitespace;
pub mod whitespace_analyzer;

pub use capability::{Parser, RefResolver, Tree};
pub use config::SemdiffConfig;
pub use error::DiffError;
pub use model::{Change, DiffResult, MultiFileResult};
