//! Machine-readable JSON schema (§6): `{ schema_tag, metadata, summary,
//! files: [...] }`, with the `Change` tree kept hierarchical — flat
//! emission is forbidden by the spec; [`flatten_view`] exists only as an
//! additional, explicitly non-canonical, convenience field for legacy
//! consumers.

use serde::Serialize;
use serde_json::Value;

use crate::model::{Change, DiffResult, FileStatus, MultiFileResult};

const SCHEMA_TAG: &str = "semdiff/v1";

#[derive(Serialize)]
struct Metadata<'a> {
    version: &'static str,
    generated_at: chrono::DateTime<chrono::Utc>,
    mode: crate::model::ComparisonMode,
    profiles: &'a [String],
}

#[derive(Serialize)]
struct MachineReadableDocument<'a> {
    schema_tag: &'static str,
    metadata: Metadata<'a>,
    summary: &'a crate::model::Stats,
    file_counts: &'a crate::model::FileCounts,
    files: &'a [crate::model::FileEntry],
}

/// The distinct build profiles actually reported across `result`'s files,
/// in first-seen order. Each per-file `DiffResult` already carries the
/// profiles used to produce it (§4.8); this just deduplicates across files
/// for the document-level `metadata.profiles` field.
fn profiles_used(result: &MultiFileResult) -> Vec<String> {
    let mut seen = Vec::new();
    for entry in &result.files {
        if let FileStatus::Ok { result } = &entry.outcome {
            for profile in &result.profiles {
                if !seen.contains(profile) {
                    seen.push(profile.clone());
                }
            }
        }
    }
    seen
}

/// Render a [`MultiFileResult`] as the §6 machine-readable document.
///
/// # Panics
/// Never panics in practice: every field is a plain, already-validated
/// value; `serde_json::to_string_pretty` only fails on non-finite floats or
/// non-string map keys, neither of which this schema contains.
#[must_use]
pub fn render_multi_file(result: &MultiFileResult) -> String {
    let profiles = profiles_used(result);
    let doc = MachineReadableDocument {
        schema_tag: SCHEMA_TAG,
        metadata: Metadata {
            version: env!("CARGO_PKG_VERSION"),
            generated_at: result.generated_at,
            mode: result.comparison_mode,
            profiles: &profiles,
        },
        summary: &result.summary,
        file_counts: &result.file_counts,
        files: &result.files,
    };
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
}

/// Render a single [`DiffResult`] using the same schema, for single-file
/// invocations that never go through [`MultiFileResult`].
#[must_use]
pub fn render_single_file(result: &DiffResult) -> String {
    #[derive(Serialize)]
    struct SingleFileDocument<'a> {
        schema_tag: &'static str,
        metadata: Metadata<'a>,
        summary: &'a crate::model::Stats,
        changes: &'a [Change],
    }

    let doc = SingleFileDocument {
        schema_tag: SCHEMA_TAG,
        metadata: Metadata {
            version: env!("CARGO_PKG_VERSION"),
            generated_at: result.generated_at,
            mode: result.mode,
            profiles: &result.profiles,
        },
        summary: &result.stats,
        changes: &result.changes,
    };
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
}

/// `flatten(changes)` (§6): a pre-order sequence view, explicitly a
/// *view* — never the canonical form — for legacy consumers that expect a
/// flat list.
#[must_use]
pub fn flatten_view(changes: &[Change]) -> Value {
    let flat: Vec<&Change> = changes.iter().flat_map(Change::flatten).collect();
    serde_json::to_value(flat).unwrap_or(Value::Null)
}
