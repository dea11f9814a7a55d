//! Hover information implementation.

use text_size::TextSize;

use super::cursor::{CursorSymbol, symbol_at};
use crate::base::{Span, Uri};
use crate::hir::{NameTarget, TypeResolver, WorkspaceSnapshot};
use crate::syntax::{SymbolKind, TypeExpr};

/// Result of a hover request.
#[derive(Clone, Debug)]
pub struct HoverResult {
    /// The hover content (markdown).
    pub contents: String,
    /// The hovered identifier.
    pub span: Span,
    pub kind: SymbolKind,
    /// Static type of the hovered symbol, when known.
    pub ty: Option<TypeExpr>,
}

/// Get hover information for `offset` in `uri`.
///
/// # Returns
/// Hover information, or `None` if nothing is known about the identifier.
pub fn hover(
    snapshot: &WorkspaceSnapshot,
    uri: &Uri,
    offset: TextSize,
    include_docs: bool,
) -> Option<HoverResult> {
    let resolver = TypeResolver::new(snapshot, uri)?;
    let symbol = symbol_at(&resolver, offset)?;
    let (signature, ty, doc) = describe(&resolver, &symbol);

    let mut contents = String::new();
    contents.push_str("```terse\n");
    contents.push_str(&signature);
    contents.push_str("\n```\n");
    if include_docs {
        if let Some(doc) = doc {
            contents.push_str("\n---\n\n");
            contents.push_str(&doc);
            contents.push('\n');
        }
    }
    if let NameTarget::Member(hit) = &symbol.target {
        contents.push_str("\n*member of* `");
        contents.push_str(&hit.owner);
        contents.push_str("`\n");
    }

    Some(HoverResult {
        contents,
        span: resolver.document().line_index.span(symbol.range),
        kind: symbol.kind(),
        ty,
    })
}

/// Signature line, static type and doc comment of a symbol.
fn describe(
    resolver: &TypeResolver<'_>,
    symbol: &CursorSymbol<'_>,
) -> (String, Option<TypeExpr>, Option<String>) {
    match &symbol.target {
        NameTarget::Parameter(param) => {
            let ty = param.ty.as_ref().map(|t| t.expr.clone());
            (typed("param", &symbol.name, ty.as_ref()), ty, None)
        }
        NameTarget::Variable(var) => {
            let scope = resolver.scope_at(symbol.range.start());
            let ty = resolver.variable_type(var, &scope, 0);
            let keyword = if var.mutable { "var" } else { "let" };
            (typed(keyword, &symbol.name, ty.as_ref()), ty, None)
        }
        NameTarget::Member(hit) => (
            hit.member.signature(),
            hit.ty.clone(),
            hit.member.doc().map(|d| d.to_string()),
        ),
        NameTarget::Declaration(hit) => {
            let ty = match hit.decl.kind() {
                SymbolKind::Function => None,
                _ => Some(TypeExpr::named(hit.decl.name().name.clone())),
            };
            (
                hit.decl.signature(),
                ty,
                hit.decl.doc().map(|d| d.to_string()),
            )
        }
    }
}

fn typed(keyword: &str, name: &str, ty: Option<&TypeExpr>) -> String {
    match ty {
        Some(ty) => format!("{keyword} {name}: {ty}"),
        None => format!("{keyword} {name}"),
    }
}
