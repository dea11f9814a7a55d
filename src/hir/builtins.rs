//! Built-in types and their member tables.
//!
//! Containers are recognized by base name under several aliases. Member
//! types may mention the placeholders `T` (element), `K` and `V` (dictionary
//! key and value); they are substituted from the receiver's type arguments.

use smol_str::SmolStr;

use crate::syntax::{MemberRef, TypeExpr};

/// Built-in containers with member tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    String,
    Array,
    List,
    Dict,
}

impl Container {
    pub fn of(ty: &TypeExpr) -> Option<Container> {
        if ty.is_string() {
            Some(Container::String)
        } else if ty.is_array() {
            Some(Container::Array)
        } else if ty.is_list() {
            Some(Container::List)
        } else if ty.is_dict() {
            Some(Container::Dict)
        } else {
            None
        }
    }

    fn members(self) -> &'static [BuiltinMember] {
        match self {
            Container::String => STRING_MEMBERS,
            Container::Array => ARRAY_MEMBERS,
            Container::List => LIST_MEMBERS,
            Container::Dict => DICT_MEMBERS,
        }
    }

    fn placeholders(self) -> &'static [&'static str] {
        match self {
            Container::String => &[],
            Container::Array | Container::List => &["T"],
            Container::Dict => &["K", "V"],
        }
    }
}

struct BuiltinMember {
    name: &'static str,
    ty: &'static str,
    is_method: bool,
}

const fn prop(name: &'static str, ty: &'static str) -> BuiltinMember {
    BuiltinMember {
        name,
        ty,
        is_method: false,
    }
}

const fn method(name: &'static str, ty: &'static str) -> BuiltinMember {
    BuiltinMember {
        name,
        ty,
        is_method: true,
    }
}

const STRING_MEMBERS: &[BuiltinMember] = &[
    prop("Length", "int"),
    method("ToUpper", "string"),
    method("ToLower", "string"),
    method("Trim", "string"),
    method("Substring", "string"),
    method("Replace", "string"),
    method("Contains", "bool"),
    method("StartsWith", "bool"),
    method("EndsWith", "bool"),
    method("IndexOf", "int"),
    method("Split", "string[]"),
    method("ToString", "string"),
];

const ARRAY_MEMBERS: &[BuiltinMember] = &[
    prop("Length", "int"),
    method("Contains", "bool"),
    method("IndexOf", "int"),
    method("First", "T"),
    method("Last", "T"),
    method("ToList", "List<T>"),
];

const LIST_MEMBERS: &[BuiltinMember] = &[
    prop("Count", "int"),
    method("Add", "void"),
    method("Contains", "bool"),
    method("IndexOf", "int"),
    method("Remove", "bool"),
    method("First", "T"),
    method("Last", "T"),
    method("Find", "T"),
    method("ToArray", "T[]"),
    method("Clear", "void"),
    method("Insert", "void"),
    method("Reverse", "void"),
];

const DICT_MEMBERS: &[BuiltinMember] = &[
    prop("Count", "int"),
    prop("Keys", "List<K>"),
    prop("Values", "List<V>"),
    method("ContainsKey", "bool"),
    method("ContainsValue", "bool"),
    method("Remove", "bool"),
    method("TryGetValue", "bool"),
    method("Add", "void"),
    method("Clear", "void"),
];

/// Primitive and container type names offered by completion.
pub const TYPE_NAMES: &[&str] = &[
    "int", "long", "double", "float", "bool", "char", "string", "object", "void", "List", "Dict",
    "Array", "Option", "Result",
];

fn to_member(
    container: Container,
    entry: &BuiltinMember,
    receiver: &TypeExpr,
) -> MemberRef<'static> {
    let params: Vec<SmolStr> = container
        .placeholders()
        .iter()
        .copied()
        .map(SmolStr::new_static)
        .collect();
    MemberRef::Builtin {
        name: entry.name,
        ty: TypeExpr::parse(entry.ty).substitute(&params, &receiver.args),
        is_method: entry.is_method,
    }
}

/// Look up a built-in member of `receiver`.
pub fn member(receiver: &TypeExpr, name: &str) -> Option<MemberRef<'static>> {
    let container = Container::of(receiver)?;
    container
        .members()
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| to_member(container, entry, receiver))
}

/// Every built-in member of `receiver`.
pub fn members(receiver: &TypeExpr) -> Vec<MemberRef<'static>> {
    let Some(container) = Container::of(receiver) else {
        return Vec::new();
    };
    container
        .members()
        .iter()
        .map(|entry| to_member(container, entry, receiver))
        .collect()
}

/// Result of `receiver[index]`: lists and arrays yield their element type,
/// dictionaries their value type, strings a `char`.
pub fn index_type(receiver: &TypeExpr) -> Option<TypeExpr> {
    match Container::of(receiver)? {
        Container::String => Some(TypeExpr::named("char")),
        Container::Array | Container::List => receiver.arg(0),
        Container::Dict => receiver.arg(1),
    }
}

/// Element type seen by `for x in receiver`.
pub fn iteration_type(receiver: &TypeExpr) -> Option<TypeExpr> {
    match Container::of(receiver)? {
        Container::String => Some(TypeExpr::named("char")),
        Container::Array | Container::List => receiver.arg(0),
        Container::Dict => Some(TypeExpr::generic(
            "KeyValuePair",
            receiver.args.iter().take(2).cloned().collect(),
        )),
    }
}

/// `(key, value)` types seen by `for (k, v) in receiver`.
pub fn entry_types(receiver: &TypeExpr) -> (Option<TypeExpr>, Option<TypeExpr>) {
    match Container::of(receiver) {
        Some(Container::Dict) => (receiver.arg(0), receiver.arg(1)),
        Some(Container::Array | Container::List) => (Some(TypeExpr::named("int")), receiver.arg(0)),
        _ => (None, None),
    }
}

/// Is `name` a primitive or built-in container name?
pub fn is_type_name(name: &str) -> bool {
    TYPE_NAMES.contains(&name) || Container::of(&TypeExpr::named(name)).is_some()
}
