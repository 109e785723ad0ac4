//
// completion_integration.rs
//
// End-to-end tests of the completion pipeline over on-disk fixtures:
// open a document, resolve its imports from a temp directory, and check
// the candidate set the handler returns.
//

use std::fs;
use std::path::Path;

use tower_lsp::lsp_types::{CompletionItemKind, Position, Url};

use magpie::handlers;
use magpie::state::WorldState;

fn open(state: &WorldState, path: &Path, text: &str) -> Url {
    let uri = Url::from_file_path(path).unwrap();
    state.documents.open(uri.clone(), text.to_string(), Some(1));
    uri
}

fn labels(outcome: &handlers::CompletionOutcome) -> Vec<&str> {
    outcome.items.iter().map(|i| i.label.as_str()).collect()
}

#[test]
fn completion_includes_local_and_both_imported_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.py"), "def beta():\n    pass\n").unwrap();
    fs::write(dir.path().join("b.py"), "class Gamma:\n    pass\n").unwrap();

    let state = WorldState::new();
    let text = "import a\nimport b\nalpha = 1\nresult = ";
    let uri = open(&state, &dir.path().join("main.py"), text);

    let outcome = handlers::completion(&state, &uri, Position::new(3, 9)).unwrap();
    assert!(outcome.warnings.is_empty());

    let labels = labels(&outcome);
    for expected in ["alpha", "beta", "Gamma"] {
        assert!(labels.contains(&expected), "missing {expected} in {labels:?}");
    }
}

#[test]
fn one_warning_per_missing_import_and_local_symbols_survive() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("real.py"), "present = 1\n").unwrap();

    let state = WorldState::new();
    let text = "import ghost\nimport real\nimport phantom\nlocal = 1\nv = ";
    let uri = open(&state, &dir.path().join("main.py"), text);

    let outcome = handlers::completion(&state, &uri, Position::new(4, 4)).unwrap();
    assert_eq!(outcome.warnings.len(), 2, "got {:?}", outcome.warnings);
    assert!(outcome.warnings[0].contains("ghost"));
    assert!(outcome.warnings[1].contains("phantom"));

    let labels = labels(&outcome);
    assert!(labels.contains(&"local"), "got {labels:?}");
    assert!(labels.contains(&"present"), "got {labels:?}");
    assert!(!outcome.items.is_empty());
}

#[test]
fn completion_is_idempotent_for_identical_inputs() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("util.py"), "def foo():\n    pass\n").unwrap();

    let state = WorldState::new();
    let text = "import util\nx = 1\ny = ";
    let uri = open(&state, &dir.path().join("main.py"), text);

    let first = handlers::completion(&state, &uri, Position::new(2, 4)).unwrap();
    let second = handlers::completion(&state, &uri, Position::new(2, 4)).unwrap();
    assert_eq!(first.items, second.items);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn empty_document_offers_only_top_level_start_tokens() {
    let state = WorldState::new();
    let uri = Url::parse("file:///tmp/empty.py").unwrap();
    state.documents.open(uri.clone(), String::new(), Some(1));

    let outcome = handlers::completion(&state, &uri, Position::new(0, 0)).unwrap();
    let labels = labels(&outcome);
    assert!(labels.contains(&"import"), "got {labels:?}");
    assert!(labels.contains(&"def"), "got {labels:?}");
    assert!(
        outcome
            .items
            .iter()
            .all(|i| i.kind == Some(CompletionItemKind::KEYWORD)),
        "empty document must have zero semantic candidates"
    );
}

#[test]
fn incomplete_assignment_suggests_imported_and_local_names() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("util.py"), "def foo():\n    pass\n").unwrap();

    let state = WorldState::new();
    let text = "import util\nx = 1\ny = ";
    let uri = open(&state, &dir.path().join("main.py"), text);

    let outcome = handlers::completion(&state, &uri, Position::new(2, 4)).unwrap();
    let labels = labels(&outcome);
    for expected in ["x", "y", "foo"] {
        assert!(labels.contains(&expected), "missing {expected} in {labels:?}");
    }

    // Display kinds reflect the declaration, not the filter.
    let foo = outcome.items.iter().find(|i| i.label == "foo").unwrap();
    assert_eq!(foo.kind, Some(CompletionItemKind::FUNCTION));
}

#[test]
fn duplicate_declarations_yield_a_single_candidate() {
    let state = WorldState::new();
    let uri = Url::parse("file:///tmp/dups.py").unwrap();
    state.documents.open(
        uri.clone(),
        "x = 1\nx = 2\nx = 3\ny = ".to_string(),
        Some(1),
    );

    let outcome = handlers::completion(&state, &uri, Position::new(3, 4)).unwrap();
    let count = outcome.items.iter().filter(|i| i.label == "x").count();
    assert_eq!(count, 1);
}
