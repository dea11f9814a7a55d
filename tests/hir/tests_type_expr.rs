//! Type expression parser tests.

use rstest::rstest;
use terse::syntax::TypeExpr;

#[rstest]
#[case("Dict<string,List<int>>", "Dict", &["string", "List<int>"])]
#[case("Dict<string, List<int>>", "Dict", &["string", "List<int>"])]
#[case("Map<A<B, C>, D<E<F, G>>>", "Map", &["A<B, C>", "D<E<F, G>>"])]
#[case("List<Person>", "List", &["Person"])]
#[case("Person[]", "Array", &["Person"])]
#[case("List<int>[]", "Array", &["List<int>"])]
#[case("string", "string", &[])]
#[case("Outer.Inner", "Outer.Inner", &[])]
fn test_parse_type_expression(#[case] text: &str, #[case] base: &str, #[case] args: &[&str]) {
    let ty = TypeExpr::parse(text);
    assert_eq!(ty.base, base);
    assert_eq!(ty.args, args);
}

#[rstest]
#[case("List<int")]
#[case("<int>")]
#[case("Dict<a, b>>")]
#[case("")]
fn test_malformed_types_stay_opaque(#[case] text: &str) {
    let ty = TypeExpr::parse(text);
    assert!(ty.args.is_empty(), "{text:?} parsed as {ty:?}");
}

#[test]
fn test_nested_argument_parses_again() {
    let ty = TypeExpr::parse("Dict<string,List<int>>");
    let Some(value) = ty.arg(1) else {
        panic!("missing second argument");
    };
    assert!(value.is_list());
    assert_eq!(value.arg(0).map(|t| t.base), Some("int".into()));
    assert!(ty.arg(2).is_none());
}

#[test]
fn test_nullable_and_display() {
    let ty = TypeExpr::parse("Person?");
    assert!(ty.nullable);
    assert_eq!(ty.base, "Person");
    assert_eq!(ty.to_string(), "Person?");
    assert_eq!(ty.non_null().to_string(), "Person");
    assert_eq!(TypeExpr::parse("int[]").to_string(), "int[]");
    assert_eq!(TypeExpr::parse("Dict<string,List<int>>").to_string(), "Dict<string, List<int>>");
}
