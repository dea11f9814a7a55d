//! Scope visibility tests through the public resolver API.

use crate::helpers::fixtures::{uri, with_cursor};
use rstest::rstest;
use terse::hir::{TypeResolver, VariableOrigin, Workspace};

/// Names visible at the marker, with their resolved types.
fn visible(marked: &str) -> Vec<(String, Option<String>)> {
    let (text, offset) = with_cursor(marked);
    let ws = Workspace::new();
    let doc = uri("scope");
    ws.open(doc.clone(), &text, 1);
    let snapshot = ws.snapshot();
    let Some(resolver) = TypeResolver::new(&snapshot, &doc) else {
        panic!("document missing");
    };
    let scope = resolver.scope_at(offset);
    scope
        .variables(offset)
        .iter()
        .map(|var| {
            let ty = resolver.variable_type(var, &scope, 0);
            (var.name.to_string(), ty.map(|t| t.to_string()))
        })
        .collect()
}

fn names(marked: &str) -> Vec<String> {
    visible(marked).into_iter().map(|(name, _)| name).collect()
}

// =============================================================================
// EXCLUSION
// =============================================================================

#[rstest]
#[case("fn f() {\n let a = 1\n $0\n let b = 2\n}", &["a"])]
#[case("fn f() {\n $0let a = 1\n}", &[])]
#[case("fn f() {\n let a = 1\n if true {\n  let b = 2\n }\n $0\n}", &["a"])]
#[case("fn f() {\n if true {\n  let inThen = 1\n  $0\n } else {\n  let inElse = 2\n }\
        \n}", &["inThen"])]
#[case("fn f() {\n if true {\n  let inThen = 1\n } else if false {\n  let inMiddle = 2\n  $0\
        \n } else {\n  let inElse = 3\n }\n}", &["inMiddle"])]
#[case("fn f() {\n while true {\n  let w = 1\n  $0\n }\n}", &["w"])]
#[case("fn f() {\n {\n  let inner = 1\n }\n $0\n}", &[])]
fn test_visibility(#[case] marked: &str, #[case] expected: &[&str]) {
    assert_eq!(names(marked), expected);
}

#[test]
fn test_pattern_names_do_not_leak_into_sibling_case() {
    let source = "fn f(x: object) {\n match x {\n  Some(found) => { }\n  _ => { $0 }\n }\n}";
    assert!(names(source).is_empty());
}

#[test]
fn test_variables_of_other_functions_are_invisible() {
    let source = "fn first() {\n let a = 1\n}\nfn second() {\n let b = 2\n $0\n}";
    assert_eq!(names(source), vec!["b"]);
}

// =============================================================================
// TYPES OF BINDINGS
// =============================================================================

#[test]
fn test_loop_binding_types() {
    let source = "fn f(items: List<string>, map: Dict<string, double>) {\n for i in 0..3 {\
                  \n  for item in items {\n   for (k, v) in map { $0 }\n  }\n }\n}";
    let vars = visible(source);
    let types: Vec<(&str, Option<&str>)> = vars
        .iter()
        .map(|(name, ty)| (name.as_str(), ty.as_deref()))
        .collect();
    assert_eq!(
        types,
        vec![
            ("i", Some("int")),
            ("item", Some("string")),
            ("k", Some("string")),
            ("v", Some("double")),
        ]
    );
}

#[test]
fn test_catch_binding_types() {
    let vars = visible("fn f() {\n try { } catch e: IOError { $0 }\n}");
    assert_eq!(vars, vec![("e".to_string(), Some("IOError".to_string()))]);
    let vars = visible("fn f() {\n try { } catch e { $0 }\n}");
    assert_eq!(vars, vec![("e".to_string(), Some("Exception".to_string()))]);
}

#[test]
fn test_declared_type_wins_over_initializer() {
    let vars = visible("fn f() {\n let n: double = 1\n $0\n}");
    assert_eq!(vars, vec![("n".to_string(), Some("double".to_string()))]);
}

#[test]
fn test_origins() {
    let (text, offset) = with_cursor("fn f(m: Dict<int, int>) {\n for (k, v) in m {\
                                      \n  let g = |x| x\n  $0\n }\n}");
    let ws = Workspace::new();
    let doc = uri("scope");
    ws.open(doc.clone(), &text, 1);
    let snapshot = ws.snapshot();
    let Some(resolver) = TypeResolver::new(&snapshot, &doc) else {
        panic!("document missing");
    };
    let origins: Vec<VariableOrigin> = resolver
        .scope_at(offset)
        .variables(offset)
        .iter()
        .map(|v| v.origin)
        .collect();
    assert_eq!(
        origins,
        vec![
            VariableOrigin::DictKey,
            VariableOrigin::DictValue,
            VariableOrigin::Binding
        ]
    );
}
