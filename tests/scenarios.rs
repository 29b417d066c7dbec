//! End-to-end scenarios driving the full parser → differ → whitespace
//! analyzer pipeline over realistic C#/VB-like source pairs.
//!
//! Coverage:
//! - a class gaining methods (straightforward `Added` children)
//! - a method's parameter list changing (signature-based modification)
//! - whitespace-only indentation changes under each whitespace mode
//! - an identical large file (fast-path short-circuit)
//! - a renamed class matched by structural similarity
//! - a folder comparison with include/exclude filtering

use semdiff::config::{SemdiffConfig, WhitespaceMode};
use semdiff::differ::{self, DiffOptions};
use semdiff::driver::{CancellationToken, MultiFileDriver};
use semdiff::model::{ChangeKind, FileStatus, Impact};
use semdiff::Parser as ParserCapability;
use semdiff_parse::SemdiffParser;

fn diff_cs(old: &str, new: &str, config: &SemdiffConfig) -> Vec<semdiff::Change> {
    let parser = SemdiffParser::new();
    let old_tree = parser.parse(old, "cs").expect("old parses");
    let new_tree = parser.parse(new, "cs").expect("new parses");
    let opts = DiffOptions::new(config, "Calculator.cs");
    differ::diff(old_tree.root(), new_tree.root(), &opts)
}

// ---------------------------------------------------------------------------
// Calculator: a class gains methods
// ---------------------------------------------------------------------------

#[test]
fn calculator_gains_a_method() {
    let old = "public class Calculator {\n    public int Add(int a, int b) { return a + b; }\n}\n";
    let new = "public class Calculator {\n    public int Add(int a, int b) { return a + b; }\n    public int Subtract(int a, int b) { return a - b; }\n}\n";

    let config = SemdiffConfig::default();
    let changes = diff_cs(old, new, &config);

    assert_eq!(changes.len(), 1, "only the class should be reported, not also its children");
    let class_change = &changes[0];
    assert_eq!(class_change.kind, ChangeKind::Modified);
    assert_eq!(class_change.children.len(), 1);
    let added = &class_change.children[0];
    assert_eq!(added.kind, ChangeKind::Added);
    assert_eq!(added.name, "Subtract");
    assert_eq!(added.impact, Impact::NonBreaking);
}

// ---------------------------------------------------------------------------
// Parameter rename: a public method's signature changes
// ---------------------------------------------------------------------------

#[test]
fn public_method_parameter_rename_is_breaking() {
    let old = "public class Calculator {\n    public int Add(int first, int second) { return first + second; }\n}\n";
    let new = "public class Calculator {\n    public int Add(int x, int y) { return x + y; }\n}\n";

    let config = SemdiffConfig::default();
    let changes = diff_cs(old, new, &config);

    let method_change = &changes[0].children[0];
    assert_eq!(method_change.kind, ChangeKind::Modified);
    assert_eq!(method_change.name, "Add");
    assert_eq!(method_change.impact, Impact::BreakingPublicApi);
}

#[test]
fn internal_method_gaining_a_parameter_is_internal_breaking() {
    // No visibility modifier defaults to `Internal`, and adding a
    // parameter changes the signature's token count, so this is a real
    // `signature_changed`, not a parameter rename.
    let old = "public class Calculator {\n    int Helper(int first) { return first; }\n}\n";
    let new = "public class Calculator {\n    int Helper(int first, int extra) { return first + extra; }\n}\n";

    let config = SemdiffConfig::default();
    let changes = diff_cs(old, new, &config);

    let method_change = &changes[0].children[0];
    assert_eq!(method_change.impact, Impact::BreakingInternalApi);
}

#[test]
fn renamed_method_with_unchanged_signature_is_matched_as_rename_not_remove_and_add() {
    let old = "public class Calculator {\n    public int Add(int a, int b) { return a + b; }\n}\n";
    let new = "public class Calculator {\n    public int Sum(int a, int b) { return a + b; }\n}\n";

    let config = SemdiffConfig::default();
    let changes = diff_cs(old, new, &config);

    let method_change = &changes[0].children[0];
    assert_eq!(
        method_change.kind,
        ChangeKind::Renamed,
        "same return type and parameter list, only the name changed, should match by signature"
    );
    assert_eq!(method_change.name, "Sum");
}

// ---------------------------------------------------------------------------
// Whitespace-only indentation change across modes
// ---------------------------------------------------------------------------

#[test]
fn indentation_only_change_is_formatting_only_under_ignore_all() {
    let old = "public class Foo {\n    public int Bar() {\n        return 1;\n    }\n}\n";
    let new = "public class Foo {\n    public int Bar() {\n                return 1;\n    }\n}\n";

    let mut config = SemdiffConfig::default();
    config.whitespace.mode = WhitespaceMode::IgnoreAll;
    let changes = diff_cs(old, new, &config);

    assert!(!changes.is_empty());
    let method_change = &changes[0].children[0];
    assert_eq!(method_change.impact, Impact::FormattingOnly);
}

#[test]
fn indentation_only_change_is_reported_as_non_formatting_under_exact_mode() {
    let old = "public class Foo {\n    public int Bar() {\n        return 1;\n    }\n}\n";
    let new = "public class Foo {\n    public int Bar() {\n                return 1;\n    }\n}\n";

    let mut config = SemdiffConfig::default();
    config.whitespace.mode = WhitespaceMode::Exact;
    let changes = diff_cs(old, new, &config);

    let method_change = &changes[0].children[0];
    assert_ne!(
        method_change.impact,
        Impact::FormattingOnly,
        "exact mode must not silently ignore indentation changes"
    );
}

#[test]
fn indentation_only_change_yields_zero_changes_by_default_after_impact_filtering() {
    let old = "public class Foo {\n    public int Bar() {\n        return 1;\n    }\n}\n";
    let new = "public class Foo {\n    public int Bar() {\n                return 1;\n    }\n}\n";

    let config = SemdiffConfig::default();
    let changes = diff_cs(old, new, &config);
    let changes = semdiff::impact::filter_changes(changes, &config.impact);

    assert!(
        changes.is_empty(),
        "a whitespace-only edit must produce zero changes under the default impact settings, got {changes:?}"
    );
}

// ---------------------------------------------------------------------------
// Identical large file: fast-path short-circuit
// ---------------------------------------------------------------------------

#[test]
fn identical_large_file_produces_no_changes() {
    let mut source = String::from("public class Big {\n");
    for i in 0..500 {
        source.push_str(&format!("    public int Method{i}() {{ return {i}; }}\n"));
    }
    source.push_str("}\n");

    let config = SemdiffConfig::default();
    let changes = diff_cs(&source, &source, &config);

    assert!(changes.is_empty());
}

// ---------------------------------------------------------------------------
// Renamed class, matched by structural similarity
// ---------------------------------------------------------------------------

#[test]
fn renamed_class_is_matched_by_similarity_not_reported_as_remove_add() {
    let old = "public class Widget {\n    public int GetSize() { return 1; }\n    public string GetName() { return \"x\"; }\n    public bool IsActive() { return true; }\n}\n";
    let new = "public class Gadget {\n    public int GetSize() { return 1; }\n    public string GetName() { return \"x\"; }\n    public bool IsActive() { return true; }\n}\n";

    let config = SemdiffConfig::default();
    let changes = diff_cs(old, new, &config);

    assert_eq!(changes.len(), 1, "a high-similarity class body should match as one Renamed change");
    assert_eq!(changes[0].kind, ChangeKind::Renamed);
    assert_eq!(changes[0].name, "Gadget");
}

#[test]
fn low_similarity_classes_are_reported_as_remove_and_add() {
    let old = "public class Widget {\n    public int GetSize() { return 1; }\n}\n";
    let new = "public class TotallyDifferent {\n    public string Describe() { return \"nope\"; }\n    public bool Flag() { return false; }\n}\n";

    let config = SemdiffConfig::default();
    let changes = diff_cs(old, new, &config);

    let kinds: Vec<ChangeKind> = changes.iter().map(|c| c.kind).collect();
    assert!(kinds.contains(&ChangeKind::Removed));
    assert!(kinds.contains(&ChangeKind::Added));
}

// ---------------------------------------------------------------------------
// Folder diff with include/exclude filtering
// ---------------------------------------------------------------------------

#[test]
fn folder_diff_honors_include_and_exclude_globs() {
    let old_dir = tempfile::tempdir().expect("tempdir");
    let new_dir = tempfile::tempdir().expect("tempdir");

    std::fs::write(
        old_dir.path().join("Foo.cs"),
        "public class Foo {\n    public int A() { return 1; }\n}\n",
    )
    .unwrap();
    std::fs::write(
        new_dir.path().join("Foo.cs"),
        "public class Foo {\n    public int A() { return 1; }\n    public int B() { return 2; }\n}\n",
    )
    .unwrap();

    std::fs::create_dir_all(old_dir.path().join("Generated")).unwrap();
    std::fs::create_dir_all(new_dir.path().join("Generated")).unwrap();
    std::fs::write(
        old_dir.path().join("Generated/Ignored.cs"),
        "public class Ignored {\n    public int X() { return 1; }\n}\n",
    )
    .unwrap();
    std::fs::write(
        new_dir.path().join("Generated/Ignored.cs"),
        "public class Ignored {\n    public int X() { return 2; }\n}\n",
    )
    .unwrap();

    std::fs::write(old_dir.path().join("readme.txt"), "hello\n").unwrap();
    std::fs::write(new_dir.path().join("readme.txt"), "goodbye\n").unwrap();

    let mut config = SemdiffConfig::default();
    config.driver.include_globs = vec!["**/*.cs".to_string()];
    config.driver.exclude_globs = vec!["**/Generated/**".to_string()];

    let parser = SemdiffParser::new();
    let driver = MultiFileDriver::new(&config, &parser).expect("driver builds");
    let token = CancellationToken::new();
    let result = driver
        .diff_folders(old_dir.path(), new_dir.path(), &token)
        .expect("folder diff succeeds");

    let paths: Vec<&str> = result.files.iter().map(|f| f.new_path.as_str()).collect();
    assert_eq!(paths, vec!["Foo.cs"], "readme.txt and Generated/Ignored.cs must be filtered out");

    let FileStatus::Ok { result: foo_result } = &result.files[0].outcome else {
        panic!("Foo.cs should have diffed cleanly");
    };
    assert_eq!(foo_result.stats.total_changes, 1);
}
