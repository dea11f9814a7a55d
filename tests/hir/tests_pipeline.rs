//! Document pipeline tests: binding, crash containment, versions.

use std::sync::Arc;
use std::thread;

use crate::helpers::fixtures::uri;
use crate::helpers::frontends::{CountingFrontend, PanickingFrontend, Stage};
use rstest::rstest;
use terse::hir::{BindError, BindState, Severity, Workspace, codes, has_errors};

// =============================================================================
// BINDING
// =============================================================================

#[test]
fn test_clean_source_binds_exactly_once_per_update() {
    let frontend = Arc::new(CountingFrontend::default());
    let ws = Workspace::with_frontend(frontend.clone());
    let doc = uri("a");

    ws.open(doc.clone(), "class A { let x: int }", 1);
    assert_eq!(frontend.binds(), 1);

    ws.update(&doc, "class A { let x: int }\nclass B extends A {}", 2);
    assert_eq!(frontend.binds(), 2);

    ws.update(&doc, "fn f() -> int { return 1 }", 3);
    assert_eq!(frontend.binds(), 3);

    let snapshot = ws.snapshot();
    let Some(current) = snapshot.document(&doc) else {
        panic!("document missing");
    };
    assert!(current.bind_state.is_bound());
    assert_eq!(current.version, 3);
}

#[test]
fn test_malformed_source_skips_binding() {
    let frontend = Arc::new(CountingFrontend::default());
    let ws = Workspace::with_frontend(frontend.clone());
    let doc = uri("a");

    let diagnostics = ws.open(doc.clone(), "class A {\n fn broken( {\n}", 1);
    assert!(!diagnostics.is_empty());
    assert!(has_errors(&diagnostics));
    assert_eq!(frontend.binds(), 0);

    let snapshot = ws.snapshot();
    let Some(current) = snapshot.document(&doc) else {
        panic!("document missing");
    };
    assert!(current.module().is_some(), "AST should survive syntax errors");
    assert!(current.bound().is_none());
    assert!(matches!(current.bind_state, BindState::Failed { errors } if errors > 0));
}

#[test]
fn test_lexical_errors_still_produce_ast() {
    let ws = Workspace::new();
    let doc = uri("a");
    let diagnostics = ws.open(doc.clone(), "class A { let s = \"unterminated\n}\nclass B {}", 1);
    assert!(
        diagnostics
            .iter()
            .any(|d| d.code.as_deref() == Some(codes::LEXICAL_ERROR))
    );
    let snapshot = ws.snapshot();
    let module = snapshot.document(&doc).and_then(|d| d.module());
    assert!(module.is_some_and(|m| m.find_declaration("B").is_some()));
}

#[test]
fn test_duplicate_declarations_are_warnings_only() {
    let ws = Workspace::new();
    let doc = uri("a");
    let diagnostics = ws.open(doc.clone(), "class A {}\nclass A {}", 1);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert!(ws.snapshot().document(&doc).is_some_and(|d| d.bind_state.is_bound()));
}

#[test]
fn test_cyclic_inheritance_degrades_binding() {
    let ws = Workspace::new();
    let doc = uri("a");
    ws.open(doc.clone(), "class A extends B {}\nclass B extends A {}", 1);
    let snapshot = ws.snapshot();
    let Some(current) = snapshot.document(&doc) else {
        panic!("document missing");
    };
    assert!(matches!(
        &current.bind_state,
        BindState::Degraded(BindError::CyclicInheritance { .. })
    ));
    assert!(current.module().is_some());
}

// =============================================================================
// CRASH CONTAINMENT
// =============================================================================

#[rstest]
#[case(Stage::Tokenize)]
#[case(Stage::Parse)]
fn test_frontend_panic_becomes_internal_error(#[case] stage: Stage) {
    let ws = Workspace::with_frontend(Arc::new(PanickingFrontend(stage)));
    let doc = uri("a");
    let diagnostics = ws.open(doc.clone(), "class A {}", 1);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code.as_deref(), Some(codes::INTERNAL_ERROR));
    assert_eq!(diagnostics[0].severity, Severity::Error);

    let snapshot = ws.snapshot();
    assert!(snapshot.document(&doc).is_some_and(|d| d.module().is_none()));
}

#[test]
fn test_binder_panic_never_escapes() {
    let ws = Workspace::with_frontend(Arc::new(PanickingFrontend(Stage::Bind)));
    let doc = uri("a");
    let diagnostics = ws.open(doc.clone(), "class A {}", 1);
    assert!(diagnostics.is_empty());

    let snapshot = ws.snapshot();
    let Some(current) = snapshot.document(&doc) else {
        panic!("document missing");
    };
    assert!(current.module().is_some());
    assert!(matches!(
        &current.bind_state,
        BindState::Degraded(BindError::Panicked(msg)) if msg.contains("binder exploded")
    ));
}

// =============================================================================
// VERSIONS AND CONCURRENCY
// =============================================================================

#[test]
fn test_stale_update_keeps_newer_snapshot() {
    let ws = Workspace::new();
    let doc = uri("a");
    ws.open(doc.clone(), "class New {}", 5);
    ws.update(&doc, "class {", 4);

    let snapshot = ws.snapshot();
    let Some(current) = snapshot.document(&doc) else {
        panic!("document missing");
    };
    assert_eq!(current.version, 5);
    assert!(current.diagnostics.is_empty());
    assert_eq!(&*current.text, "class New {}");
}

#[test]
fn test_snapshot_is_unaffected_by_later_updates() {
    let ws = Workspace::new();
    let doc = uri("a");
    ws.open(doc.clone(), "class Old {}", 1);
    let before = ws.snapshot();
    ws.update(&doc, "class New {}", 2);

    assert!(before.find_declaration("Old").is_some());
    assert!(before.find_declaration("New").is_none());
    assert!(ws.snapshot().find_declaration("New").is_some());
}

#[test]
fn test_concurrent_updates_to_different_documents() {
    let ws = Arc::new(Workspace::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let ws = ws.clone();
            thread::spawn(move || {
                let doc = uri(&format!("doc{i}"));
                for version in 1..=20 {
                    let text = format!("class C{i}_{version} {{ let x: int }}");
                    ws.update(&doc, &text, version);
                    let _ = ws.snapshot().public_declarations().len();
                }
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().is_ok());
    }

    let snapshot = ws.snapshot();
    assert_eq!(snapshot.documents().len(), 8);
    for i in 0..8 {
        assert!(snapshot.find_declaration(&format!("C{i}_20")).is_some());
    }
}

#[test]
fn test_concurrent_updates_to_one_document_are_serialized() {
    let ws = Arc::new(Workspace::new());
    let doc = uri("shared");
    ws.open(doc.clone(), "", 0);
    let handles: Vec<_> = (1..=16)
        .map(|version| {
            let ws = ws.clone();
            let doc = doc.clone();
            thread::spawn(move || {
                ws.update(&doc, &format!("class V{version} {{}}"), version);
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().is_ok());
    }

    // Whatever order the writers ran in, text and AST belong to one version.
    let snapshot = ws.snapshot();
    let Some(current) = snapshot.document(&doc) else {
        panic!("document missing");
    };
    let expected = format!("V{}", current.version);
    assert!(current.text.contains(&expected));
    assert!(current.module().is_some_and(|m| m.find_declaration(&expected).is_some()));
}
