//! Rename tests for the IDE layer.

use crate::helpers::fixtures::{host_at, uri, with_cursor};
use rstest::rstest;
use terse::base::Uri;
use terse::ide::{RenameError, TextEdit};

/// Apply `edits` to `text`, last edit first.
fn apply(text: &str, edits: &[TextEdit]) -> String {
    let mut out = text.to_string();
    let mut edits = edits.to_vec();
    edits.sort_by_key(|e| std::cmp::Reverse(e.span.start()));
    for edit in edits {
        let range = std::ops::Range::<usize>::from(edit.span.range);
        out.replace_range(range, &edit.new_text);
    }
    out
}

// =============================================================================
// VALIDATION
// =============================================================================

#[rstest]
#[case("2bad")]
#[case("bad name")]
#[case("bad-name")]
#[case("")]
fn test_rename_rejects_invalid_identifier(#[case] new_name: &str) {
    let (host, main, offset) = host_at("main", "class Fo$0o {}", &[]);
    let result = host.analysis().rename(&main, offset, new_name);
    assert!(
        matches!(result, Err(RenameError::InvalidIdentifier(_))),
        "{new_name:?} gave {result:?}"
    );
}

#[rstest]
#[case("class")]
#[case("match")]
#[case("null")]
fn test_rename_rejects_keyword(#[case] new_name: &str) {
    let (host, main, offset) = host_at("main", "class Fo$0o {}", &[]);
    let result = host.analysis().rename(&main, offset, new_name);
    assert!(matches!(result, Err(RenameError::Keyword(_))));
}

#[test]
fn test_rename_without_symbol() {
    let (host, main, offset) = host_at("main", "class Foo {}\n// Fo$0o in a comment", &[]);
    let result = host.analysis().rename(&main, offset, "Bar");
    assert_eq!(result, Err(RenameError::NoSymbol));
}

// =============================================================================
// EDITS
// =============================================================================

#[test]
fn test_rename_edits_every_occurrence() {
    let marked = "fn f(items: List<int>) -> int {\n let tot$0al = 0\n for x in items {\
                  \n  total = total + x\n }\n return total\n}";
    let (host, main, offset) = host_at("main", marked, &[]);
    let Ok(edits) = host.analysis().rename(&main, offset, "ok_1") else {
        panic!("rename failed");
    };
    let (text, _) = with_cursor(marked);
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[&main].len(), 4);
    assert!(edits[&main].iter().all(|e| e.new_text == "ok_1"));
    assert_eq!(
        apply(&text, &edits[&main]),
        "fn f(items: List<int>) -> int {\n let ok_1 = 0\n for x in items {\n  ok_1 = ok_1 + x\n }\
         \n return ok_1\n}"
    );
}

#[test]
fn test_rename_class_across_documents() {
    let other = "class User extends Person {\n fn clone() -> Person { return new Person() }\n}";
    let marked = "class Per$0son {\n let name: string\n}";
    let (host, main, offset) = host_at("main", marked, &[("other", other)]);
    let Ok(edits) = host.analysis().rename(&main, offset, "Human") else {
        panic!("rename failed");
    };
    let other_uri: Uri = uri("other");
    assert_eq!(edits.len(), 2);
    assert_eq!(
        apply(other, &edits[&other_uri]),
        "class User extends Human {\n fn clone() -> Human { return new Human() }\n}"
    );
    let (text, _) = with_cursor(marked);
    assert_eq!(apply(&text, &edits[&main]), "class Human {\n let name: string\n}");
}

#[test]
fn test_rename_parameter_leaves_other_functions() {
    let marked = "fn a(valu$0e: int) -> int { return value }\
                  \nfn b(value: int) -> int { return value }";
    let (host, main, offset) = host_at("main", marked, &[]);
    let Ok(edits) = host.analysis().rename(&main, offset, "amount") else {
        panic!("rename failed");
    };
    let (text, _) = with_cursor(marked);
    assert_eq!(
        apply(&text, &edits[&main]),
        "fn a(amount: int) -> int { return amount }\nfn b(value: int) -> int { return value }"
    );
}

#[test]
fn test_rename_member_through_access() {
    let marked = "class Account {\n var balance: double\
                  \n fn deposit(x: double) { this.balance = balance + x }\n}\
                  \nfn f(a: Account) -> double { return a.bal$0ance }";
    let (host, main, offset) = host_at("main", marked, &[]);
    let Ok(edits) = host.analysis().rename(&main, offset, "funds") else {
        panic!("rename failed");
    };
    let (text, _) = with_cursor(marked);
    assert_eq!(
        apply(&text, &edits[&main]),
        "class Account {\n var funds: double\n fn deposit(x: double) { this.funds = funds + x }\n}\
         \nfn f(a: Account) -> double { return a.funds }"
    );
}

#[test]
fn test_rename_lambda_parameter_in_field_initializer() {
    let marked = "class C { let g = |q| q$0 + 1 }\nfn h(q: int) { q }";
    let (host, main, offset) = host_at("main", marked, &[]);
    let Ok(edits) = host.analysis().rename(&main, offset, "r") else {
        panic!("rename failed");
    };
    let (text, _) = with_cursor(marked);
    assert_eq!(
        apply(&text, &edits[&main]),
        "class C { let g = |r| r + 1 }\nfn h(q: int) { q }"
    );
}
