//! Code completion tests for the IDE layer.

use crate::helpers::fixtures::{PEOPLE, host_at, uri};
use terse::ide::{AnalysisConfig, CompletionItem, CompletionKind};

fn complete(marked: &str) -> Vec<CompletionItem> {
    let (host, main, offset) = host_at("main", marked, &[("people", PEOPLE)]);
    host.analysis().completions(&main, offset)
}

fn labels(items: &[CompletionItem]) -> Vec<&str> {
    items.iter().map(|i| i.label.as_ref()).collect()
}

// =============================================================================
// MEMBER COMPLETION
// =============================================================================

#[test]
fn test_members_include_hierarchy() {
    let items = complete("fn f(e: Employee) {\n e.$0\n}");
    assert_eq!(
        labels(&items),
        vec!["best", "display", "friends", "id", "name", "salary", "scores"]
    );
}

#[test]
fn test_member_kinds_and_details() {
    let items = complete("fn f(p: Person) {\n p.$0\n}");
    let Some(best) = items.iter().find(|i| i.label.as_ref() == "best") else {
        panic!("best missing");
    };
    assert_eq!(best.kind, CompletionKind::Method);
    assert_eq!(best.detail.as_deref(), Some("fn best() -> Person"));
    let Some(scores) = items.iter().find(|i| i.label.as_ref() == "scores") else {
        panic!("scores missing");
    };
    assert_eq!(scores.kind, CompletionKind::Property);
    assert_eq!(scores.kind.to_lsp(), 10);
}

#[test]
fn test_members_after_chain_and_index() {
    let items = complete("fn f(p: Person) {\n p.friends[0].best().sc$0\n}");
    assert_eq!(labels(&items), vec!["scores"]);
    let items = complete("fn f(p: Person) {\n p.scores.Key$0\n}");
    assert_eq!(labels(&items), vec!["Keys"]);
}

#[test]
fn test_prefix_match_ignores_case() {
    let items = complete("fn f(p: Person) {\n p.NA$0\n}");
    assert_eq!(labels(&items), vec!["name"]);
}

#[test]
fn test_unknown_receiver_gives_nothing() {
    assert!(complete("fn f() {\n nothing.$0\n}").is_empty());
}

// =============================================================================
// SCOPE COMPLETION
// =============================================================================

#[test]
fn test_scope_completion_inside_method() {
    let source = "class Robot extends Person {\n let power: int\n fn step(speed: int) {\
                  \n  let distance = speed * 2\n  $0\n }\n}";
    let items = complete(source);
    let position = |label: &str| {
        items
            .iter()
            .position(|i| i.label.as_ref() == label)
            .unwrap_or_else(|| panic!("{label} missing from {:?}", labels(&items)))
    };
    // Variables, then members (own and inherited), then declarations.
    assert!(position("distance") < position("power"));
    assert!(position("speed") < position("power"));
    assert!(position("power") < position("Robot"));
    assert!(position("name") < position("Robot"));
    assert!(position("Robot") < position("Person"));
    assert!(position("Person") < position("string"));
    assert!(position("string") < position("return"));
}

#[test]
fn test_workspace_declarations_name_their_origin() {
    let items = complete("fn f() {\n Emp$0\n}");
    let Some(employee) = items.first() else {
        panic!("no completions");
    };
    assert_eq!(employee.label.as_ref(), "Employee");
    assert_eq!(employee.kind, CompletionKind::Class);
    let expected = format!("from {}", uri("people"));
    assert_eq!(employee.detail.as_deref(), Some(expected.as_str()));
}

#[test]
fn test_config_limits_sources() {
    let config = AnalysisConfig {
        workspace_completions: false,
        keyword_completions: false,
        max_completions: Some(5),
        ..AnalysisConfig::default()
    };
    let (mut host, main, offset) = host_at("main", "fn f() {\n $0\n}", &[("people", PEOPLE)]);
    host.set_config(config);
    let items = host.analysis().completions(&main, offset);
    assert_eq!(items.len(), 5);
    let labels = labels(&items);
    assert!(!labels.contains(&"Person"));
    assert!(items.iter().all(|i| i.kind != CompletionKind::Keyword));
}

#[test]
fn test_labels_are_unique() {
    let items = complete("class Person {}\nfn f(Person: int) {\n let Person = 1\n $0\n}");
    let mut labels = labels(&items);
    let total = labels.len();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), total);
}
