//! Type expressions: `Base<A, B>`, `T[]` and `T?` split into base and arguments.
//!
//! Type arguments stay as strings: `Dict<string, List<int>>` parses to base
//! `Dict` with arguments `["string", "List<int>"]`. Callers that need to look
//! inside an argument parse it again with [`TypeExpr::parse`].
//!
//! Parsing never fails. Anything that does not look like a generic or an
//! array becomes an opaque base name.

use std::fmt;

use smol_str::SmolStr;

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TypeExpr {
    pub base: SmolStr,
    pub args: Vec<SmolStr>,
    /// `T?`, kept separately so `base` stays a plain name.
    pub nullable: bool,
}

impl TypeExpr {
    /// A type with no arguments.
    pub fn named(base: impl Into<SmolStr>) -> Self {
        Self {
            base: base.into(),
            args: Vec::new(),
            nullable: false,
        }
    }

    pub fn generic(base: impl Into<SmolStr>, args: Vec<SmolStr>) -> Self {
        Self {
            base: base.into(),
            args,
            nullable: false,
        }
    }

    /// Parse a type string.
    pub fn parse(text: &str) -> Self {
        let mut text = text.trim();
        let mut nullable = false;
        if let Some(stripped) = text.strip_suffix('?') {
            nullable = true;
            text = stripped.trim_end();
        }

        if let Some(inner) = text.strip_suffix("[]") {
            let inner = inner.trim_end();
            if !inner.is_empty() {
                return Self {
                    base: SmolStr::new_static("Array"),
                    args: vec![SmolStr::new(inner)],
                    nullable,
                };
            }
        }

        let (Some(open), true) = (text.find('<'), text.ends_with('>')) else {
            return Self {
                base: SmolStr::new(text),
                args: Vec::new(),
                nullable,
            };
        };

        let base = text[..open].trim();
        let interior = &text[open + 1..text.len() - 1];
        match split_top_level(interior) {
            Some(args) if !base.is_empty() => Self {
                base: SmolStr::new(base),
                args,
                nullable,
            },
            _ => Self {
                base: SmolStr::new(text),
                args: Vec::new(),
                nullable,
            },
        }
    }

    /// Parse the `index`-th type argument.
    pub fn arg(&self, index: usize) -> Option<TypeExpr> {
        self.args.get(index).map(|arg| TypeExpr::parse(arg))
    }

    pub fn is_generic(&self) -> bool {
        !self.args.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.base == "Array"
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self.base.as_str(),
            "List" | "IList" | "IEnumerable" | "ICollection"
        )
    }

    pub fn is_dict(&self) -> bool {
        matches!(self.base.as_str(), "Dict" | "Dictionary" | "IDictionary")
    }

    pub fn is_string(&self) -> bool {
        matches!(self.base.as_str(), "string" | "String")
    }

    /// Components of a tuple type `(A, B)`; `None` for anything else.
    pub fn tuple_elements(&self) -> Option<Vec<TypeExpr>> {
        let inner = self.base.strip_prefix('(')?.strip_suffix(')')?;
        let parts = split_top_level(inner)?;
        Some(parts.iter().map(|p| TypeExpr::parse(p)).collect())
    }

    /// Drop nullability (`T?` → `T`).
    pub fn non_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Replace generic parameters with concrete arguments.
    ///
    /// `params` are the declaring type's parameter names, `args` the receiver's
    /// arguments, matched positionally. Unmatched parameters stay as written.
    pub fn substitute(&self, params: &[SmolStr], args: &[SmolStr]) -> TypeExpr {
        if params.is_empty() || args.is_empty() {
            return self.clone();
        }
        if self.args.is_empty() {
            if let Some(pos) = params.iter().position(|p| *p == self.base) {
                if let Some(arg) = args.get(pos) {
                    let mut replaced = TypeExpr::parse(arg);
                    replaced.nullable |= self.nullable;
                    return replaced;
                }
            }
            return self.clone();
        }
        TypeExpr {
            base: self.base.clone(),
            args: self
                .args
                .iter()
                .map(|arg| SmolStr::new(TypeExpr::parse(arg).substitute(params, args).to_string()))
                .collect(),
            nullable: self.nullable,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.base.as_str(), self.args.as_slice()) {
            ("Array", [element]) => write!(f, "{element}[]")?,
            (base, []) => f.write_str(base)?,
            (base, args) => write!(f, "{base}<{}>", args.join(", "))?,
        }
        if self.nullable {
            f.write_str("?")?;
        }
        Ok(())
    }
}

impl From<&str> for TypeExpr {
    fn from(value: &str) -> Self {
        TypeExpr::parse(value)
    }
}

/// Split on commas that are not nested inside `<>`, `()` or `[]`.
///
/// Returns `None` when the brackets are unbalanced.
fn split_top_level(interior: &str) -> Option<Vec<SmolStr>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, ch) in interior.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(SmolStr::new(interior[start..idx].trim()));
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    let last = interior[start..].trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(SmolStr::new(last));
    }
    Some(parts)
}
