//! What the identifier under the cursor refers to.
//!
//! Shared by hover, goto and references. Lookup order: a declaration whose
//! name sits at the cursor, then a member access (`receiver.name`), then a
//! bare name through [`TypeResolver::lookup_name`].

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::text_utils;
use crate::base::{Span, Uri};
use crate::hir::{DeclHit, DocumentSnapshot, MemberHit, NameTarget, TypeResolver};
use crate::parser::SyntaxKind;
use crate::syntax::{MemberRef, SymbolKind};

/// The symbol under the cursor.
#[derive(Debug, Clone)]
pub(crate) struct CursorSymbol<'a> {
    pub name: SmolStr,
    /// The identifier as written at the cursor.
    pub range: TextRange,
    pub target: NameTarget<'a>,
}

/// Where a symbol is declared.
#[derive(Debug, Clone)]
pub(crate) struct Definition {
    pub uri: Uri,
    pub span: Span,
    pub kind: SymbolKind,
}

impl<'a> CursorSymbol<'a> {
    /// Parameters and variables; their occurrences never leave the callable.
    pub fn is_local(&self) -> bool {
        matches!(
            self.target,
            NameTarget::Parameter(_) | NameTarget::Variable(_)
        )
    }

    pub fn kind(&self) -> SymbolKind {
        match &self.target {
            NameTarget::Parameter(_) => SymbolKind::Parameter,
            NameTarget::Variable(_) => SymbolKind::Local,
            NameTarget::Member(hit) => hit.member.kind(),
            NameTarget::Declaration(hit) => hit.decl.kind(),
        }
    }

    /// Declaration site; `None` for built-in members.
    pub fn definition(&self, document: &DocumentSnapshot) -> Option<Definition> {
        let (uri, span) = match &self.target {
            NameTarget::Parameter(param) => (document.uri.clone(), param.name.span),
            NameTarget::Variable(var) => (document.uri.clone(), var.span),
            NameTarget::Member(hit) => (hit.document?.uri.clone(), hit.member.name_span()?),
            NameTarget::Declaration(hit) => (hit.document.uri.clone(), hit.decl.name().span),
        };
        Some(Definition {
            uri,
            span,
            kind: self.kind(),
        })
    }
}

/// Resolve the identifier at `offset` in the resolver's document.
pub(crate) fn symbol_at<'a>(
    resolver: &TypeResolver<'a>,
    offset: TextSize,
) -> Option<CursorSymbol<'a>> {
    let text: &str = &resolver.document().text;
    let (range, name) = text_utils::word_at(text, offset)?;
    if SyntaxKind::is_keyword_text(name) {
        return None;
    }

    let target = match declared_at(resolver, range) {
        Some(target) => target,
        None => match text_utils::dot_before(text, range.start()) {
            Some(dot) => {
                let receiver = text_utils::receiver_before_dot(text, dot)?;
                let ty = resolver.resolve_type(receiver, dot)?;
                tracing::trace!(receiver, %ty, member = name, "member at cursor");
                NameTarget::Member(resolver.snapshot().find_member(&ty, name)?)
            }
            None => resolver.lookup_name(name, range.start())?,
        },
    };

    Some(CursorSymbol {
        name: SmolStr::new(name),
        range,
        target,
    })
}

/// A top-level declaration or member whose name is exactly at `range`.
fn declared_at<'a>(resolver: &TypeResolver<'a>, range: TextRange) -> Option<NameTarget<'a>> {
    let document = resolver.document();
    let module = resolver.module();

    if let Some(decl) = module.declarations().find(|d| d.name().span.range == range) {
        return Some(NameTarget::Declaration(DeclHit { document, decl }));
    }

    let member_hit = |member: MemberRef<'a>, owner: &SmolStr| MemberHit {
        ty: member.declared_type(),
        member,
        document: Some(document),
        owner: owner.clone(),
    };
    let at = |member: &MemberRef<'_>| member.name_span().is_some_and(|s| s.range == range);

    for class in &module.classes {
        if let Some(member) = class.members().find(at) {
            return Some(NameTarget::Member(member_hit(member, &class.name.name)));
        }
    }
    for iface in &module.interfaces {
        if let Some(member) = iface.methods.iter().map(MemberRef::Signature).find(at) {
            return Some(NameTarget::Member(member_hit(member, &iface.name.name)));
        }
    }
    for decl in &module.enums {
        let found = decl
            .members
            .iter()
            .map(|member| MemberRef::EnumMember { owner: decl, member })
            .find(at);
        if let Some(member) = found {
            return Some(NameTarget::Member(member_hit(member, &decl.name.name)));
        }
    }
    for ext in &module.enum_extensions {
        if let Some(member) = ext.methods.iter().map(MemberRef::Method).find(at) {
            return Some(NameTarget::Member(member_hit(member, &ext.target.name)));
        }
    }
    None
}
