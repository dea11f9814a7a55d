//! Find references tests for the IDE layer.

use crate::helpers::fixtures::{host_at, uri, with_cursor};
use terse::ide::Reference;

fn texts<'a>(source: &'a str, refs: &[&Reference]) -> Vec<&'a str> {
    refs.iter().map(|r| &source[r.span.range]).collect()
}

#[test]
fn test_references_across_documents() {
    let x = "class Foo {\n fn Bar() -> int { return 1 }\n}";
    let marked = "fn run(f: Fo$0o) -> Foo {\n return new Foo()\n}";
    let (host, y, offset) = host_at("y", marked, &[("x", x)]);

    let with_decl = host.analysis().find_references(&y, offset, true);
    assert_eq!(with_decl.len(), 4);
    assert!(with_decl.include_declaration);
    let in_x: Vec<&Reference> = with_decl.references.iter().filter(|r| r.uri == uri("x")).collect();
    assert_eq!(in_x.len(), 1);
    assert!(in_x[0].is_definition);
    assert_eq!(texts(x, &in_x), vec!["Foo"]);

    let without_decl = host.analysis().find_references(&y, offset, false);
    assert_eq!(without_decl.len(), 3);
    assert!(without_decl.references.iter().all(|r| r.uri == y && !r.is_definition));
}

#[test]
fn test_references_ordered_by_document_then_position() {
    let a = "class Item {}";
    let others = [("a", a), ("b", "fn g(i: Item) {}")];
    let (host, c, offset) = host_at("c", "fn f(i: It$0em, j: Item) {}", &others);
    let result = host.analysis().find_references(&c, offset, true);
    let order: Vec<(String, u32)> = result
        .references
        .iter()
        .map(|r| (r.uri.to_string(), r.span.col))
        .collect();
    assert_eq!(
        order,
        vec![
            (uri("a").to_string(), 6),
            (uri("b").to_string(), 8),
            (uri("c").to_string(), 8),
            (uri("c").to_string(), 17),
        ]
    );
}

#[test]
fn test_local_references_stay_in_callable() {
    let marked = "fn a() {\n let n$0 = 1\n let m = n * 2\n}\nfn b() {\n let n = 3\n}";
    let (host, main, offset) = host_at("main", marked, &[("other", "fn c() { let n = 4 }")]);
    let result = host.analysis().find_references(&main, offset, true);
    let (text, _) = with_cursor(marked);
    let refs: Vec<&Reference> = result.references.iter().collect();
    assert_eq!(refs.len(), 2);
    assert!(refs.iter().all(|r| r.uri == main && r.span.line < 4));
    assert_eq!(texts(&text, &refs), vec!["n", "n"]);
}

#[test]
fn test_lambda_parameter_references_stay_in_initializer() {
    let marked = "class C { let g = |q| q$0 + 1 }\nfn h(q: int) { q }";
    let (host, main, offset) = host_at("main", marked, &[]);
    let result = host.analysis().find_references(&main, offset, true);
    let (text, _) = with_cursor(marked);
    let refs: Vec<&Reference> = result.references.iter().collect();
    assert_eq!(refs.len(), 2);
    assert!(refs.iter().all(|r| r.span.line == 0));
    assert_eq!(texts(&text, &refs), vec!["q", "q"]);
    assert!(refs[0].is_definition);
}

#[test]
fn test_same_name_members_match_by_name() {
    let marked = "class A { let size: int }\nclass B { let size: int }\nfn f(a: A, b: B) -> int {\
                  \n return a.si$0ze + b.size\n}";
    let (host, main, offset) = host_at("main", marked, &[]);
    let result = host.analysis().find_references(&main, offset, true);
    assert_eq!(result.len(), 4);
    assert_eq!(result.references.iter().filter(|r| r.is_definition).count(), 2);
}

#[test]
fn test_references_cover_every_statement_kind() {
    let marked = "fn f(v$0: List<int>) -> int {\n if v.Count > 0 { return v[0] }\n for x in v { }\
                  \n while v.Count > 1 { v.Remove(0) }\n try { throw v } catch e { }\n match v {\
                  \n  [first] if v.Count == 1 => { return first }\n  _ => { }\n }\n let g = |y| v\
                  \n return v.Count\n}";
    let (host, main, offset) = host_at("main", marked, &[]);
    let result = host.analysis().find_references(&main, offset, true);
    assert_eq!(result.len(), 11);
}

#[test]
fn test_no_references_outside_identifiers() {
    let (host, main, offset) = host_at("main", "class Foo {}\n/// Fo$0o docs\nclass Bar {}", &[]);
    assert!(host.analysis().find_references(&main, offset, true).is_empty());
    let (host, main, offset) = host_at("main", "class Foo {}  $0  ", &[]);
    assert!(host.analysis().find_references(&main, offset, true).is_empty());
}
