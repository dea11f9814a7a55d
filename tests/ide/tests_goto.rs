//! Go to definition tests for the IDE layer.

use crate::helpers::fixtures::{PEOPLE, host_at, uri, with_cursor};
use terse::base::TextSize;
use terse::syntax::SymbolKind;

// =============================================================================
// GOTO DEFINITION - CROSS FILE
// =============================================================================

#[test]
fn test_goto_class_in_other_document() {
    let x = "class Foo {\n fn Bar() -> int { return 1 }\n}";
    let (host, y, offset) = host_at("y", "fn run() {\n let f = new Fo$0o()\n}", &[("x", x)]);
    let analysis = host.analysis();

    let result = analysis.goto_definition(&y, offset);
    assert_eq!(result.targets.len(), 1);
    let target = &result.targets[0];
    assert_eq!(target.uri, uri("x"));
    assert_eq!(target.name, "Foo");
    assert_eq!(target.kind, SymbolKind::Class);
    assert_eq!(&x[target.span.range], "Foo");
}

#[test]
fn test_goto_method_in_other_document() {
    let x = "class Foo {\n fn Bar() -> int { return 1 }\n}";
    let (host, y, offset) = host_at(
        "y",
        "fn run() -> int {\n let f = new Foo()\n return f.Ba$0r()\n}",
        &[("x", x)],
    );
    let result = host.analysis().goto_definition(&y, offset);
    let Some(target) = result.targets.first() else {
        panic!("no target for Bar");
    };
    assert_eq!(target.uri, uri("x"));
    assert_eq!(target.kind, SymbolKind::Method);
    assert_eq!(target.span.line, 1);
    assert_eq!(&x[target.span.range], "Bar");
}

#[test]
fn test_goto_inherited_member_in_other_document() {
    let (host, main, offset) = host_at(
        "main",
        "fn f(e: Employee) -> int {\n return e.friends[0].i$0d\n}",
        &[("people", PEOPLE)],
    );
    let result = host.analysis().goto_definition(&main, offset);
    let Some(target) = result.targets.first() else {
        panic!("no target for id");
    };
    assert_eq!(target.uri, uri("people"));
    assert_eq!(&PEOPLE[target.span.range], "id");
}

#[test]
fn test_local_declaration_shadows_workspace() {
    let other = "class Foo {}";
    let marked = "class Foo {}\nfn f(x: Fo$0o) {}";
    let (host, main, offset) = host_at("main", marked, &[("other", other)]);
    let result = host.analysis().goto_definition(&main, offset);
    assert_eq!(result.targets.first().map(|t| t.uri.clone()), Some(uri("main")));
}

// =============================================================================
// GOTO DEFINITION - LOCAL
// =============================================================================

#[test]
fn test_goto_pattern_binding() {
    let marked = "fn f(x: object) {\n match x {\n  Some(found) => { return fou$0nd }\n }\n}";
    let (host, main, offset) = host_at("main", marked, &[]);
    let result = host.analysis().goto_definition(&main, offset);
    let Some(target) = result.targets.first() else {
        panic!("no target for pattern binding");
    };
    assert_eq!(target.kind, SymbolKind::Local);
    assert_eq!(target.span.line, 2);
}

#[test]
fn test_goto_lambda_parameter_outside_callable() {
    let marked = "enum Weight { Heavy = |w| w$0 * 2 }\nfn f(w: int) { }";
    let (host, main, offset) = host_at("main", marked, &[]);
    let result = host.analysis().goto_definition(&main, offset);
    let Some(target) = result.targets.first() else {
        panic!("no target for lambda parameter");
    };
    let (text, _) = with_cursor(marked);
    assert_eq!(target.kind, SymbolKind::Local);
    let lambda = text.find("|w|").expect("lambda") as u32;
    assert_eq!(target.span.start(), TextSize::new(lambda + 1));
}

#[test]
fn test_goto_enum_member_and_extension() {
    let marked = "enum Color { Red, Green }\nextend Color {\n fn label() -> string { return \"\" }\
                  \n}\nfn f(c: Color) {\n let a = Color.Gre$0en\n}";
    let (host, main, offset) = host_at("main", marked, &[]);
    let analysis = host.analysis();
    let result = analysis.goto_definition(&main, offset);
    assert_eq!(result.targets.first().map(|t| t.kind), Some(SymbolKind::EnumMember));

    let marked = "enum Color { Red, Green }\nextend Color {\n fn label() -> string { return \"\" }\
                  \n}\nfn f(c: Color) {\n let a = c.lab$0el()\n}";
    let (host, main, offset) = host_at("main", marked, &[]);
    let result = host.analysis().goto_definition(&main, offset);
    assert_eq!(result.targets.first().map(|t| t.span.line), Some(2));
}

#[test]
fn test_goto_on_keyword_or_unknown_is_empty() {
    let (host, main, offset) = host_at("main", "fn f() {\n ret$0urn unknown\n}", &[]);
    assert!(host.analysis().goto_definition(&main, offset).is_empty());
    let (host, main, offset) = host_at("main", "fn f() {\n return unkn$0own\n}", &[]);
    assert!(host.analysis().goto_definition(&main, offset).is_empty());
}

#[test]
fn test_goto_tolerates_broken_document() {
    let (host, main, offset) = host_at(
        "main",
        "class Foo {}\nfn f(x: Fo$0o) {\n let y = (\n}",
        &[("other", "class {")],
    );
    let analysis = host.analysis();
    assert!(!analysis.diagnostics(&main).is_empty());
    let result = analysis.goto_definition(&main, offset);
    assert_eq!(result.targets.first().map(|t| t.span.line), Some(0));
}
