//! Hover tests for the IDE layer.

use crate::helpers::fixtures::{PEOPLE, host_at};
use rstest::rstest;
use terse::syntax::SymbolKind;

fn hover_contents(marked: &str) -> Option<String> {
    let (host, main, offset) = host_at("main", marked, &[("people", PEOPLE)]);
    host.analysis().hover(&main, offset).map(|h| h.contents)
}

#[rstest]
#[case("fn f(p: Person) { p.na$0me }", "let name: string")]
#[case("fn f(p: Person) { p.frie$0nds }", "var friends: List<Person>")]
#[case("fn f(p: Person) { p.sco$0res }", "prop scores: Dict<string, int>")]
#[case("fn f(p: Person) { p.be$0st() }", "fn best() -> Person")]
#[case("fn f(e: Employee) { e.i$0d }", "let id: int")]
#[case("fn f(p: Person) { p.friends.Cou$0nt }", "prop Count: int")]
#[case("fn f(p: Person) { p.friends[0].na$0me.Length }", "let name: string")]
#[case("fn f(p$0: Person) { }", "param p: Person")]
fn test_hover_signatures(#[case] marked: &str, #[case] expected: &str) {
    let Some(contents) = hover_contents(marked) else {
        panic!("no hover for {marked:?}");
    };
    assert!(contents.contains(expected), "{contents}");
}

#[test]
fn test_hover_declaration_with_doc() {
    let Some(contents) = hover_contents("fn f(n: Nam$0ed) { }") else {
        panic!("no hover");
    };
    assert!(contents.contains("interface Named"));
    assert!(contents.contains("Anything with an identity."));
}

#[test]
fn test_hover_inferred_locals() {
    let source = "fn f(p: Person) {\n let best = p.best()\n let first = best.friends[0]\
                  \n for (k, v) in first.scores {\n  v$0\n }\n}";
    let (host, main, offset) = host_at("main", source, &[("people", PEOPLE)]);
    let Some(result) = host.analysis().hover(&main, offset) else {
        panic!("no hover");
    };
    assert_eq!(result.kind, SymbolKind::Local);
    assert_eq!(result.ty.map(|t| t.to_string()).as_deref(), Some("int"));
}

#[test]
fn test_hover_lambda_parameter_in_property_initializer() {
    let source = "class C {\n prop score: int = |p: Person| p$0\n}";
    let (host, main, offset) = host_at("main", source, &[("people", PEOPLE)]);
    let Some(result) = host.analysis().hover(&main, offset) else {
        panic!("no hover");
    };
    assert_eq!(result.kind, SymbolKind::Local);
    assert_eq!(result.ty.map(|t| t.to_string()).as_deref(), Some("Person"));
}

#[test]
fn test_hover_span_is_the_identifier() {
    let source = "fn f(p: Person) {\n return p.na$0me\n}";
    let (host, main, offset) = host_at("main", source, &[("people", PEOPLE)]);
    let Some(result) = host.analysis().hover(&main, offset) else {
        panic!("no hover");
    };
    assert_eq!(result.span.line, 1);
    assert_eq!(result.span.col, 10);
    assert_eq!(u32::from(result.span.len()), 4);
}

#[test]
fn test_hover_misses_are_none() {
    assert!(hover_contents("fn f() { unknow$0n }").is_none());
    assert!(hover_contents("fn f(p: Person) { p.mis$0sing }").is_none());
    assert!(hover_contents("fn f() { $0 }").is_none());
}
