//! Type and member resolution tests.

use crate::helpers::fixtures::{PEOPLE, uri, with_cursor};
use rstest::rstest;
use terse::base::TextSize;
use terse::hir::{TypeResolver, Workspace, WorkspaceSnapshot};
use terse::syntax::TypeExpr;

/// Open `marked` as `main` alongside `others`; return the snapshot and cursor.
fn open(marked: &str, others: &[(&str, &str)]) -> (WorkspaceSnapshot, TextSize) {
    let (text, offset) = with_cursor(marked);
    let ws = Workspace::new();
    for (name, source) in others {
        ws.open(uri(name), source, 1);
    }
    ws.open(uri("main"), &text, 1);
    (ws.snapshot(), offset)
}

fn resolve(marked: &str, others: &[(&str, &str)], expr: &str) -> Option<String> {
    let (snapshot, offset) = open(marked, others);
    let resolver = TypeResolver::new(&snapshot, &uri("main"))?;
    resolver.resolve_type(expr, offset).map(|t| t.to_string())
}

// =============================================================================
// CHAINS
// =============================================================================

#[rstest]
#[case("p.best.friends")]
#[case("p.best().name")]
#[case("p.friends[0].scores")]
#[case("p.best().best().id")]
fn test_chain_matches_stepwise_resolution(#[case] chain: &str) {
    let (snapshot, offset) = open("fn f(p: Person) {\n $0\n}", &[("people", PEOPLE)]);
    let Some(resolver) = TypeResolver::new(&snapshot, &uri("main")) else {
        panic!("document missing");
    };

    let whole = resolver.resolve_type(chain, offset);

    let mut parts = chain.split('.');
    let Some(first) = parts.next() else {
        panic!("empty chain");
    };
    let mut current = resolver.resolve_type(first, offset);
    for part in parts {
        let Some(receiver) = current else { break };
        let (name, rest) = part.split_at(part.find(['(', '[']).unwrap_or(part.len()));
        let call = rest.starts_with('(');
        let mut next = resolver.resolve_member(&receiver, name, call);
        if rest.contains('[') {
            next = next.and_then(|ty| terse::hir::builtins::index_type(&ty));
        }
        current = next;
    }

    assert!(whole.is_some());
    assert_eq!(whole, current, "chain {chain}");
}

#[rstest]
#[case("p", Some("Person"))]
#[case("p.name", Some("string"))]
#[case("p.name.Length", Some("int"))]
#[case("p.friends", Some("List<Person>"))]
#[case("p.scores[\"k\"]", Some("int"))]
#[case("p.display()", Some("string"))]
#[case("p.best().friends.Count", Some("int"))]
#[case("e.salary", Some("double"))]
#[case("e.friends[0].id", Some("int"))]
fn test_resolve_chain(#[case] expr: &str, #[case] expected: Option<&str>) {
    let actual = resolve("fn f(p: Person, e: Employee) {\n $0\n}", &[("people", PEOPLE)], expr);
    assert_eq!(actual.as_deref(), expected);
}

#[test]
fn test_unresolved_step_returns_last_resolved_type() {
    let source = "fn f(p: Person) {\n $0\n}";
    assert_eq!(
        resolve(source, &[("people", PEOPLE)], "p.best().missing.deeper").as_deref(),
        Some("Person")
    );
    assert_eq!(resolve(source, &[("people", PEOPLE)], "nothing.at.all"), None);
}

// =============================================================================
// HIERARCHY
// =============================================================================

#[test]
fn test_member_found_through_base_chain() {
    let source = "class A {\n fn ping() -> string { return \"\" }\n}\nclass B extends A {}\
                  \nclass C extends B {}\nfn f(c: C) {\n $0\n}";
    assert_eq!(resolve(source, &[], "c.ping()").as_deref(), Some("string"));
    assert_eq!(resolve(source, &[], "c.ping().Length").as_deref(), Some("int"));
}

#[test]
fn test_member_found_through_base_in_other_document() {
    let base = "class A {\n let tag: string\n}";
    let middle = "class B extends A {}";
    let source = "class C extends B {}\nfn f(c: C) {\n $0\n}";
    assert_eq!(
        resolve(source, &[("a", base), ("b", middle)], "c.tag").as_deref(),
        Some("string")
    );
}

#[test]
fn test_cyclic_hierarchy_terminates() {
    let source = "class A extends B {}\nclass B extends A {}\nfn f(a: A) {\n $0\n}";
    assert_eq!(resolve(source, &[], "a.missing").as_deref(), Some("A"));
}

#[test]
fn test_first_member_in_source_order_wins() {
    let source = "class A {\n fn over() -> int { return 1 }\
                  \n fn over(x: int) -> string { return \"\" }\n}\nfn f(a: A) {\n $0\n}";
    assert_eq!(resolve(source, &[], "a.over()").as_deref(), Some("int"));
}

#[test]
fn test_own_member_shadows_base_member() {
    let source = "class A {\n let v: int\n}\nclass B extends A {\n let v: string\n}\nfn f(b: B) {\
                  \n $0\n}";
    assert_eq!(resolve(source, &[], "b.v").as_deref(), Some("string"));
}

// =============================================================================
// INDEXING
// =============================================================================

#[rstest]
#[case("people[0]", Some("Person"))]
#[case("lookup[\"k\"]", Some("int"))]
#[case("names[1]", Some("string"))]
#[case("text[0]", Some("char"))]
#[case("nested[\"k\"][0]", Some("int"))]
fn test_index_rules(#[case] expr: &str, #[case] expected: Option<&str>) {
    let source = "class Person {}\nfn f(people: List<Person>, lookup: Dict<string, int>, \
                  names: string[], text: string, nested: Dict<string, List<int>>) {\n $0\n}";
    assert_eq!(resolve(source, &[], expr).as_deref(), expected);
}

#[test]
fn test_index_on_type_expressions() {
    use terse::hir::builtins::index_type;
    assert_eq!(
        index_type(&TypeExpr::parse("List<Person>")),
        Some(TypeExpr::named("Person"))
    );
    assert_eq!(
        index_type(&TypeExpr::parse("Dict<string,int>")),
        Some(TypeExpr::named("int"))
    );
    assert_eq!(index_type(&TypeExpr::named("Person")), None);
}

// =============================================================================
// NAMES
// =============================================================================

#[test]
fn test_name_lookup_order() {
    let source = "class Box {\n let value: int\n fn run(value: string) {\n  $0\n }\n}";
    assert_eq!(resolve(source, &[], "value").as_deref(), Some("string"));
    assert_eq!(resolve(source, &[], "this.value").as_deref(), Some("int"));
}

#[test]
fn test_static_access_and_constructor() {
    let source = "enum Color { Red, Green }\nclass Maker {\
                  \n static fn build() -> Maker { return new Maker() }\n}\nfn f() {\n $0\n}";
    assert_eq!(resolve(source, &[], "Color.Red").as_deref(), Some("Color"));
    assert_eq!(resolve(source, &[], "Maker.build()").as_deref(), Some("Maker"));
    assert_eq!(resolve(source, &[], "new Maker()").as_deref(), Some("Maker"));
}

#[test]
fn test_workspace_lookups() {
    let ws = Workspace::new();
    ws.open(uri("x"), "class Foo {\n fn Bar() -> int { return 1 }\n}", 1);
    ws.open(uri("y"), "fn use_it(f: Foo) -> int { return f.Bar() }", 1);
    let snapshot = ws.snapshot();

    let Some(hit) = snapshot.find_declaration("Foo") else {
        panic!("Foo not found");
    };
    assert_eq!(hit.document.uri, uri("x"));

    let Some(member) = snapshot.find_member(&TypeExpr::named("Foo"), "Bar") else {
        panic!("Bar not found");
    };
    assert_eq!(member.document.map(|d| d.uri.clone()), Some(uri("x")));
    assert_eq!(member.ty, Some(TypeExpr::named("int")));

    let names: Vec<String> = snapshot
        .public_declarations()
        .iter()
        .map(|hit| hit.decl.name().name.to_string())
        .collect();
    assert_eq!(names, vec!["Foo", "use_it"]);
}
