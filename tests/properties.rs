//! Property-based tests over the core model invariants and the full
//! parser -> differ pipeline, using randomly generated inputs.
//!
//! Coverage:
//! - coherence: a parent's impact is never less severe than its most severe child
//! - stats consistency: `Stats::compute` totals always agree with `flatten().len()`
//! - flatten/count agreement: `count_including_self` matches `flatten().len()`
//! - identical-input fast path: diffing a source against itself is always empty
//! - determinism: diffing the same two sources twice yields identical trees
//! - sibling containment: no two changes reported under one parent overlap
//! - whitespace-mode monotonicity: `Exact` never reports a less severe impact
//!   than `IgnoreAll` for a whitespace-only edit
//! - glob precedence: an exclude glob always wins over a matching include glob

use std::collections::HashSet;

use proptest::prelude::*;

use semdiff::capability::{NodeKind, Span};
use semdiff::config::{SemdiffConfig, WhitespaceMode};
use semdiff::differ::{self, DiffOptions};
use semdiff::filter::FilterEngine;
use semdiff::model::{Change, ChangeKind, Stats, Visibility};
use semdiff::Parser as ParserCapability;
use semdiff_parse::SemdiffParser;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_impact() -> impl Strategy<Value = semdiff::model::Impact> {
    prop_oneof![
        Just(semdiff::model::Impact::BreakingPublicApi),
        Just(semdiff::model::Impact::BreakingInternalApi),
        Just(semdiff::model::Impact::NonBreaking),
        Just(semdiff::model::Impact::FormattingOnly),
    ]
}

fn leaf_with_impact(impact: semdiff::model::Impact) -> Change {
    Change::leaf(
        ChangeKind::Modified,
        NodeKind::Method,
        "Leaf",
        Some(Span::new(1, 1, 0, 0)),
        Some(Span::new(1, 1, 0, 0)),
        None,
        None,
        impact,
        Visibility::Public,
    )
}

/// Generate a `Change` tree up to `depth` levels deep. Every node's own
/// `impact` is random; `with_children` then applies the coherence upgrade
/// on top, which is exactly the invariant under test.
fn arb_change_tree(depth: u32) -> impl Strategy<Value = Change> {
    let leaf = arb_impact().prop_map(leaf_with_impact);

    leaf.prop_recursive(depth, 30, 3, |inner| {
        (arb_impact(), prop::collection::vec(inner, 0..3)).prop_map(|(impact, children)| {
            leaf_with_impact(impact).with_children(children)
        })
    })
}

fn coherent(change: &Change) -> bool {
    change
        .children
        .iter()
        .all(|child| child.impact.severity() <= change.impact.severity() && coherent(child))
}

fn arb_method_name() -> impl Strategy<Value = String> {
    "[A-Z][a-zA-Z0-9]{1,6}"
}

/// 1-5 distinctly-named methods, each returning a small integer literal.
fn arb_methods() -> impl Strategy<Value = Vec<(String, i32)>> {
    prop::collection::vec((arb_method_name(), 0..100i32), 1..6usize).prop_map(|methods| {
        let mut seen = HashSet::new();
        methods
            .into_iter()
            .filter(|(name, _)| seen.insert(name.clone()))
            .collect()
    })
}

fn class_source(class_name: &str, methods: &[(String, i32)]) -> String {
    let mut source = format!("public class {class_name} {{\n");
    for (name, value) in methods {
        source.push_str(&format!(
            "    public int {name}() {{ return {value}; }}\n"
        ));
    }
    source.push_str("}\n");
    source
}

fn diff_source(old: &str, new: &str, config: &SemdiffConfig) -> Vec<Change> {
    let parser = SemdiffParser::new();
    let old_tree = parser.parse(old, "cs").expect("old source parses");
    let new_tree = parser.parse(new, "cs").expect("new source parses");
    let opts = DiffOptions::new(config, "Widget.cs");
    differ::diff(old_tree.root(), new_tree.root(), &opts)
}

// ---------------------------------------------------------------------------
// Model-level properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn coherence_parent_matches_or_exceeds_child_severity(tree in arb_change_tree(4)) {
        prop_assert!(coherent(&tree));
    }

    #[test]
    fn stats_total_matches_flattened_count(tree in arb_change_tree(4)) {
        let changes = vec![tree];
        let stats = Stats::compute(&changes);
        let flattened: usize = changes.iter().map(|c| c.flatten().len()).sum();
        prop_assert_eq!(stats.total_changes, flattened);
        prop_assert_eq!(
            stats.breaking_public_api
                + stats.breaking_internal_api
                + stats.non_breaking
                + stats.formatting_only,
            stats.total_changes
        );
    }

    #[test]
    fn count_including_self_matches_flatten_len(tree in arb_change_tree(4)) {
        prop_assert_eq!(tree.count_including_self(), tree.flatten().len());
    }
}

// ---------------------------------------------------------------------------
// Differ pipeline properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn identical_source_diffs_to_empty(methods in arb_methods()) {
        let source = class_source("Widget", &methods);
        let config = SemdiffConfig::default();
        let changes = diff_source(&source, &source, &config);
        prop_assert!(changes.is_empty());
    }

    #[test]
    fn diffing_is_deterministic(old_methods in arb_methods(), new_methods in arb_methods()) {
        let old = class_source("Widget", &old_methods);
        let new = class_source("Widget", &new_methods);
        let config = SemdiffConfig::default();

        let first = diff_source(&old, &new, &config);
        let second = diff_source(&old, &new, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn sibling_changes_never_overlap(old_methods in arb_methods(), new_methods in arb_methods()) {
        let old = class_source("Widget", &old_methods);
        let new = class_source("Widget", &new_methods);
        let config = SemdiffConfig::default();
        let changes = diff_source(&old, &new, &config);

        for parent in &changes {
            let siblings = &parent.children;
            for i in 0..siblings.len() {
                for j in (i + 1)..siblings.len() {
                    prop_assert!(!siblings[i].overlaps(&siblings[j]));
                }
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Same body, differing only by the indentation of one inner statement:
    /// `Exact` mode must never classify this more leniently than `IgnoreAll`.
    #[test]
    fn exact_mode_is_at_least_as_severe_as_ignore_all(
        old_indent in 1..6usize,
        new_indent in 1..6usize,
    ) {
        prop_assume!(old_indent != new_indent);

        let body = |indent: usize| {
            format!(
                "public class Widget {{\n    public int Go() {{\n{}return 1;\n    }}\n}}\n",
                " ".repeat(indent)
            )
        };
        let old = body(old_indent);
        let new = body(new_indent);

        let mut exact_config = SemdiffConfig::default();
        exact_config.whitespace.mode = WhitespaceMode::Exact;
        let mut ignore_config = SemdiffConfig::default();
        ignore_config.whitespace.mode = WhitespaceMode::IgnoreAll;

        let exact_changes = diff_source(&old, &new, &exact_config);
        let ignore_changes = diff_source(&old, &new, &ignore_config);

        let severity_of = |changes: &[Change]| {
            changes
                .first()
                .and_then(|class_change| class_change.children.first())
                .map_or(0, |method_change| method_change.impact.severity())
        };

        prop_assert!(severity_of(&exact_changes) >= severity_of(&ignore_changes));
    }
}

// ---------------------------------------------------------------------------
// FilterEngine properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn exclude_always_wins_over_a_matching_include(
        extension in prop_oneof![Just("cs"), Just("vb"), Just("txt")],
        under_excluded_dir in any::<bool>(),
    ) {
        let path = if under_excluded_dir {
            format!("src/Generated/File.{extension}")
        } else {
            format!("src/File.{extension}")
        };

        let engine = FilterEngine::compile(
            &[format!("**/*.{extension}")],
            &["**/Generated/**".to_string()],
        )
        .unwrap();

        if under_excluded_dir {
            prop_assert!(!engine.matches(&path));
        } else {
            prop_assert!(engine.matches(&path));
        }
    }
}
