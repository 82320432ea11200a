//! Integration tests for report loading
//!
//! Fixtures under `tests/fixtures` are real-shaped Gradle `dependencies`
//! output. All tests run against the in-memory store.

use gradlegraph_core::{
    Artifact, ConfigurationKind, DependsOn, DiagnosticCode, Location, ResolutionKind,
    ResolutionSettings, TypeMapping,
};
use gradlegraph_engine::{DependencyLoader, LoadError, TreeParser};
use gradlegraph_parse::{GrammarIssue, ParseError};
use gradlegraph_store::{GraphCounts, GraphStore, MemoryStore, StoreError};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture(name)).unwrap()
}

fn node<'a>(store: &'a MemoryStore, artifact_id: &str) -> &'a Artifact {
    store
        .nodes()
        .find(|n| n.artifact_id == artifact_id)
        .unwrap_or_else(|| panic!("no node named {}", artifact_id))
}

fn edge<'a>(store: &'a MemoryStore, from: &str, to: &str) -> &'a DependsOn {
    let (from, to) = (node(store, from).id, node(store, to).id);
    store
        .edges()
        .find(|e| e.dependant == from && e.dependee == to)
        .unwrap_or_else(|| panic!("no edge {} -> {}", from, to))
}

fn load(store: &mut MemoryStore, parser: &TreeParser, name: &str) {
    parser.parse_str(store, name, &read_fixture(name)).unwrap();
}

// =============================================================================
// Single Report Tests
// =============================================================================

#[test]
fn test_end_to_end_scenario() {
    let parser = TreeParser::default();
    let mut store = MemoryStore::new();

    let stats = parser
        .parse_str(&mut store, "simple.txt", &read_fixture("simple.txt"))
        .unwrap();
    assert_eq!(stats.tree_lines, 2);
    assert_eq!(store.counts().unwrap(), GraphCounts { nodes: 3, edges: 2 });

    let app = node(&store, "app");
    assert!(app.artifact_type.is_project());
    assert_eq!(app.coordinate(), "PROJECT:app");
    assert_eq!(node(&store, "bar").coordinate(), "com.foo:bar");
    assert_eq!(node(&store, "baz").coordinate(), "com.foo:baz");

    let bar = edge(&store, "app", "bar");
    assert_eq!(bar.specified_version.as_deref(), Some("1.0"));
    assert_eq!(bar.resolved_version, None);

    let baz = edge(&store, "app", "baz");
    assert_eq!(baz.specified_version.as_deref(), Some("2.0"));
    assert_eq!(baz.name, "2.0");

    for e in [bar, baz] {
        assert_eq!(e.configurations.iter().copied().collect::<Vec<_>>(), vec![ConfigurationKind::Compile]);
        assert_eq!(e.resolution_kinds.iter().copied().collect::<Vec<_>>(), vec![ResolutionKind::Normal]);
        assert_eq!(e.sources.iter().cloned().collect::<Vec<_>>(), vec!["app".to_string()]);
    }
}

#[test]
fn test_realistic_report() {
    let parser = TreeParser::default();
    let mut store = MemoryStore::new();

    let stats = parser
        .parse_str(&mut store, "app.txt", &read_fixture("app.txt"))
        .unwrap();

    assert_eq!(stats.roots, 1);
    assert_eq!(stats.tree_lines, 11);
    assert_eq!(stats.skipped_lines, 1);
    assert_eq!(store.counts().unwrap(), GraphCounts { nodes: 10, edges: 9 });

    assert_eq!(node(&store, "core").artifact_type.as_str(), "INTERNAL");
    assert_eq!(node(&store, "spring-web").artifact_type.as_str(), "SPRING");
    assert_eq!(node(&store, "commons-lang3").artifact_type.as_str(), "APACHE");
    assert_eq!(node(&store, "snakeyaml").artifact_type.as_str(), "EXTERNAL");

    // depth 3 hangs off the depth 2 sibling, not the root
    edge(&store, "spring-boot-starter", "snakeyaml");
    edge(&store, "junit", "hamcrest-core");
}

#[test]
fn test_parsing_twice_is_idempotent() {
    let parser = TreeParser::default();
    let mut store = MemoryStore::new();

    load(&mut store, &parser, "app.txt");
    let first = store.snapshot();

    load(&mut store, &parser, "app.txt");

    assert_eq!(store.counts().unwrap(), GraphCounts { nodes: 10, edges: 9 });
    assert_eq!(store.snapshot(), first);
}

#[test]
fn test_accumulation_across_configurations_and_sources() {
    let parser = TreeParser::default();
    let mut store = MemoryStore::new();

    load(&mut store, &parser, "app.txt");
    let before = edge(&store, "core", "commons-lang3").clone();
    assert_eq!(
        before.configurations.iter().copied().collect::<Vec<_>>(),
        vec![ConfigurationKind::Compile, ConfigurationKind::Runtime]
    );

    load(&mut store, &parser, "core.txt");
    let after = edge(&store, "core", "commons-lang3");

    assert_eq!(after.id, before.id);
    assert!(after.configurations.is_superset(&before.configurations));
    assert_eq!(
        after.sources.iter().cloned().collect::<Vec<_>>(),
        vec!["app".to_string(), "core".to_string()]
    );
    assert_eq!(store.counts().unwrap(), GraphCounts { nodes: 10, edges: 9 });
}

// =============================================================================
// Project Promotion Tests
// =============================================================================

#[test]
fn test_referenced_project_is_promoted() {
    let parser = TreeParser::default();
    let mut store = MemoryStore::new();

    load(&mut store, &parser, "app.txt");
    let internal_id = node(&store, "core").id;

    load(&mut store, &parser, "core.txt");
    let core = node(&store, "core");

    assert_eq!(core.id, internal_id);
    assert!(core.artifact_type.is_project());
    assert!(core.has_label("PROJECT"));
    assert!(!core.has_label("INTERNAL"));
    assert_eq!(core.group_id.as_deref(), Some("com.datasite"));
    assert_eq!(store.nodes().filter(|n| n.artifact_id == "core").count(), 1);
}

#[test]
fn test_project_declared_before_reference() {
    let parser = TreeParser::default();
    let mut store = MemoryStore::new();

    load(&mut store, &parser, "core.txt");
    assert_eq!(node(&store, "core").group_id, None);

    load(&mut store, &parser, "app.txt");
    let core = node(&store, "core");

    assert!(core.artifact_type.is_project());
    assert_eq!(core.group_id.as_deref(), Some("com.datasite"));
    assert_eq!(store.counts().unwrap(), GraphCounts { nodes: 10, edges: 9 });
}

// =============================================================================
// Resolution Gating Tests
// =============================================================================

#[test]
fn test_enabled_marker_adds_edge() {
    let parser = TreeParser::with_mapping(TypeMapping::builtin(), ResolutionSettings::all_enabled());
    let mut store = MemoryStore::new();

    let stats = parser
        .parse_str(&mut store, "app.txt", &read_fixture("app.txt"))
        .unwrap();

    assert_eq!(stats.tree_lines, 12);
    assert_eq!(stats.skipped_lines, 0);
    assert_eq!(store.counts().unwrap(), GraphCounts { nodes: 10, edges: 10 });

    let omitted = edge(&store, "app", "commons-lang3");
    assert_eq!(omitted.name, "3.11 -> 3.12.0");
    assert!(omitted.resolution_kinds.contains(&ResolutionKind::Omitted));
}

#[test]
fn test_disabled_marker_leaves_neighbours_alone() {
    let parser = TreeParser::default();
    let with_marker = "\
Root project 'app'
compileClasspath - Compile classpath for source set 'main'.
+--- g:before:1
+--- g:constrained:1 (c)
\\--- g:after:1
";
    let without_marker = "\
Root project 'app'
compileClasspath - Compile classpath for source set 'main'.
+--- g:before:1
\\--- g:after:1
";

    let mut gated = MemoryStore::new();
    parser.parse_str(&mut gated, "gated.txt", with_marker).unwrap();
    let mut plain = MemoryStore::new();
    parser.parse_str(&mut plain, "plain.txt", without_marker).unwrap();

    assert_eq!(gated.snapshot(), plain.snapshot());
}

// =============================================================================
// Rollback Tests
// =============================================================================

#[test]
fn test_store_failure_mid_file_rolls_back() {
    // root, then create node + create edge + update edge for line 3
    let mut store = MemoryStore::new().with_write_limit(4);
    let parser = TreeParser::default();

    let failure = parser
        .parse_str(&mut store, "simple.txt", &read_fixture("simple.txt"))
        .unwrap_err();

    assert!(matches!(failure.error, LoadError::Store(StoreError::Backend(_))));
    assert_eq!(failure.line, Some(4));
    assert_eq!(store.counts().unwrap(), GraphCounts::default());
    assert!(!store.in_transaction());
}

#[test]
fn test_grammar_error_keeps_earlier_files() {
    let parser = TreeParser::default();
    let mut store = MemoryStore::new();

    load(&mut store, &parser, "app.txt");
    let before = store.snapshot();

    let failure = parser
        .parse_str(&mut store, "broken.txt", &read_fixture("broken.txt"))
        .unwrap_err();

    assert!(matches!(
        failure.error,
        LoadError::Parse(ParseError::Grammar {
            line: 4,
            issue: GrammarIssue::FieldCount { found: 5 },
            ..
        })
    ));
    assert_eq!(store.snapshot(), before);
}

// =============================================================================
// Batch Loading Tests
// =============================================================================

fn batch_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    for name in ["app.txt", "broken.txt", "core.txt"] {
        std::fs::copy(fixture(name), temp.path().join(name)).unwrap();
    }
    temp
}

#[test]
fn test_directory_batch_continues_after_failure() {
    let temp = batch_dir();
    let loader = DependencyLoader::default();
    let mut store = MemoryStore::new();

    let report = loader.load_path(&mut store, temp.path()).unwrap();

    assert_eq!(report.summary.files_total, 3);
    assert_eq!(report.summary.files_loaded, 2);
    assert_eq!(report.summary.files_failed, 1);
    assert_eq!(report.summary.nodes, 10);
    assert_eq!(report.summary.edges, 9);
    assert!(report.has_failures());

    let statuses: Vec<_> = report
        .files
        .iter()
        .map(|f| (Path::new(&f.path).file_name().unwrap().to_string_lossy().into_owned(), f.is_loaded()))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("app.txt".to_string(), true),
            ("broken.txt".to_string(), false),
            ("core.txt".to_string(), true),
        ]
    );

    let diagnostics: Vec<_> = report.diagnostics().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::GrammarError);
    assert_eq!(diagnostics[0].location.as_ref().and_then(|l| l.line), Some(4));

    for file in &report.files {
        assert_eq!(file.sha256.as_ref().map(String::len), Some(64));
    }
}

#[test]
fn test_failed_commit_rolls_back_and_batch_continues() {
    let temp = batch_dir();
    let mut store = MemoryStore::new().with_failing_commit();

    let report = DependencyLoader::default().load_path(&mut store, temp.path()).unwrap();

    assert!(!store.in_transaction());
    assert_eq!(report.summary.files_loaded, 1);
    assert_eq!(report.summary.files_failed, 2);
    assert!(report.files[2].is_loaded());

    let app = report.files[0].diagnostic.as_ref().unwrap();
    assert_eq!(app.code, DiagnosticCode::StoreError);

    // only core.txt survives
    assert_eq!(store.counts().unwrap(), GraphCounts { nodes: 2, edges: 1 });
    assert!(store.nodes().all(|n| n.artifact_id != "app"));
}

#[test]
fn test_invalid_utf8_report_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("corrupt.txt");
    let mut bytes = read_fixture("simple.txt").replace("com.foo:bar", "com.foo:ba_r").into_bytes();
    let pos = bytes.iter().position(|&b| b == b'_').unwrap();
    bytes[pos] = 0xFF;
    std::fs::write(&path, &bytes).unwrap();

    let mut store = MemoryStore::new();
    let report = DependencyLoader::default().load_path(&mut store, &path).unwrap();

    assert_eq!(report.summary.files_loaded, 0);
    assert_eq!(report.summary.files_failed, 1);
    assert_eq!(report.files[0].sha256.as_ref().map(String::len), Some(64));

    let diag = report.files[0].diagnostic.as_ref().unwrap();
    assert_eq!(diag.code, DiagnosticCode::IoError);
    assert_eq!(store.counts().unwrap(), GraphCounts::default());
}

#[test]
fn test_purge_before_batch() {
    let temp = batch_dir();
    let mut store = MemoryStore::new();
    TreeParser::default()
        .parse_str(&mut store, "simple.txt", &read_fixture("simple.txt"))
        .unwrap();

    let report = DependencyLoader::default()
        .load_path(&mut store, &temp.path().join("core.txt"))
        .unwrap();

    // only core and commons-lang3 remain
    assert_eq!(report.summary.nodes, 2);
    assert!(store.nodes().all(|n| n.artifact_id != "bar"));
}

#[test]
fn test_no_purge_keeps_existing_graph() {
    let temp = batch_dir();
    let mut store = MemoryStore::new();
    TreeParser::default()
        .parse_str(&mut store, "simple.txt", &read_fixture("simple.txt"))
        .unwrap();

    let report = DependencyLoader::default()
        .with_purge(false)
        .load_path(&mut store, &temp.path().join("core.txt"))
        .unwrap();

    assert_eq!(report.summary.nodes, 5);
    assert_eq!(report.summary.edges, 3);
}

#[test]
fn test_missing_path_fails_batch() {
    let temp = TempDir::new().unwrap();
    let mut store = MemoryStore::new();

    let err = DependencyLoader::default()
        .load_path(&mut store, &temp.path().join("nope"))
        .unwrap_err();

    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn test_report_serializes_failure_location() {
    let temp = batch_dir();
    let mut store = MemoryStore::new();

    let report = DependencyLoader::default().load_path(&mut store, temp.path()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["summary"]["files_failed"], 1);
    assert_eq!(json["files"][1]["status"], "failed");
    assert_eq!(json["files"][1]["diagnostic"]["code"], "GRAMMAR_ERROR");
    assert_eq!(json["files"][1]["diagnostic"]["location"]["line"], 4);

    let location = report.files[1].diagnostic.as_ref().and_then(|d| d.location.clone());
    assert_eq!(location, Some(Location::with_line(report.files[1].path.clone(), 4)));
}

#[test]
fn test_loader_works_through_trait_object() {
    let temp = batch_dir();
    let mut store = MemoryStore::new();
    let dyn_store: &mut dyn GraphStore = &mut store;

    let report = DependencyLoader::default()
        .load_path(dyn_store, &temp.path().join("app.txt"))
        .unwrap();

    assert_eq!(report.summary.files_loaded, 1);
    assert_eq!(report.summary.tree_lines, 11);
}
