//! Completion suggestions implementation.
//!
//! After a `.` the members of the receiver's type are offered. Otherwise the
//! candidates come from, in priority order: visible variables and
//! parameters, members of the enclosing type, declarations of the current
//! document, public declarations of other documents, built-in type names and
//! keywords.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use text_size::TextSize;

use super::analysis::AnalysisConfig;
use super::text_utils;
use crate::base::Uri;
use crate::hir::{MemberHit, TypeResolver, WorkspaceSnapshot, builtins};
use crate::parser::SyntaxKind;
use crate::syntax::{DeclRef, SymbolKind};

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    Variable,
    Field,
    Property,
    Method,
    Function,
    Class,
    Interface,
    Enum,
    EnumMember,
    Event,
    Keyword,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Method => 2,
            CompletionKind::Function => 3,
            CompletionKind::Field => 5,
            CompletionKind::Variable => 6,
            CompletionKind::Class => 7,
            CompletionKind::Interface => 8,
            CompletionKind::Property => 10,
            CompletionKind::Enum => 13,
            CompletionKind::Keyword => 14,
            CompletionKind::EnumMember => 20,
            CompletionKind::Event => 23,
        }
    }
}

impl From<SymbolKind> for CompletionKind {
    fn from(kind: SymbolKind) -> Self {
        match kind {
            SymbolKind::Class => CompletionKind::Class,
            SymbolKind::Interface => CompletionKind::Interface,
            SymbolKind::Enum => CompletionKind::Enum,
            SymbolKind::EnumMember => CompletionKind::EnumMember,
            SymbolKind::Delegate | SymbolKind::Function => CompletionKind::Function,
            SymbolKind::Method | SymbolKind::Constructor => CompletionKind::Method,
            SymbolKind::Field => CompletionKind::Field,
            SymbolKind::Property => CompletionKind::Property,
            SymbolKind::Event => CompletionKind::Event,
            SymbolKind::Parameter | SymbolKind::Local => CompletionKind::Variable,
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// Documentation (shown in popup).
    pub documentation: Option<Arc<str>>,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    /// Create a new completion item.
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            documentation: None,
            sort_priority: 100,
        }
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the documentation.
    pub fn with_documentation(mut self, doc: Option<impl Into<Arc<str>>>) -> Self {
        self.documentation = doc.map(Into::into);
        self
    }

    /// Set the sort priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }

    fn from_member(hit: &MemberHit<'_>, priority: u32) -> Self {
        Self::new(hit.member.name(), hit.member.kind().into())
            .with_detail(hit.member.signature())
            .with_documentation(hit.member.doc().map(|d| d.as_str()))
            .with_priority(priority)
    }

    fn from_decl(decl: &DeclRef<'_>, priority: u32) -> Self {
        Self::new(decl.name().name.as_str(), decl.kind().into())
            .with_detail(decl.signature())
            .with_documentation(decl.doc().map(|d| d.as_str()))
            .with_priority(priority)
    }
}

mod priority {
    pub const VARIABLE: u32 = 10;
    pub const MEMBER: u32 = 20;
    pub const FILE_DECLARATION: u32 = 30;
    pub const WORKSPACE_DECLARATION: u32 = 40;
    pub const BUILTIN_TYPE: u32 = 80;
    pub const KEYWORD: u32 = 90;
}

/// Get completion suggestions at `offset` in `uri`.
///
/// Items are filtered by the partial identifier before the cursor,
/// de-duplicated by label (highest priority wins) and sorted by priority,
/// then label.
pub fn completions(
    snapshot: &WorkspaceSnapshot,
    uri: &Uri,
    offset: TextSize,
    config: &AnalysisConfig,
) -> Vec<CompletionItem> {
    let Some(resolver) = TypeResolver::new(snapshot, uri) else {
        return Vec::new();
    };
    let text: &str = &resolver.document().text;
    let (prefix_start, prefix) = text_utils::prefix_before(text, offset);

    let items = match text_utils::dot_before(text, prefix_start) {
        Some(dot) => member_completions(&resolver, text, dot),
        None => scope_completions(&resolver, uri, offset, config),
    };

    let mut seen = FxHashSet::default();
    let mut items: Vec<CompletionItem> = items
        .into_iter()
        .filter(|item| matches_prefix(&item.label, prefix))
        .collect();
    items.sort_by(|a, b| {
        a.sort_priority
            .cmp(&b.sort_priority)
            .then_with(|| a.label.cmp(&b.label))
    });
    items.retain(|item| seen.insert(item.label.clone()));
    if let Some(max) = config.max_completions {
        items.truncate(max);
    }
    items
}

fn matches_prefix(label: &str, prefix: &str) -> bool {
    prefix.is_empty()
        || label
            .chars()
            .zip(prefix.chars())
            .all(|(l, p)| l.to_lowercase().eq(p.to_lowercase()))
            && label.chars().count() >= prefix.chars().count()
}

fn member_completions(
    resolver: &TypeResolver<'_>,
    text: &str,
    dot: TextSize,
) -> Vec<CompletionItem> {
    let Some(receiver) = text_utils::receiver_before_dot(text, dot) else {
        return Vec::new();
    };
    let Some(ty) = resolver.resolve_type(receiver, dot) else {
        tracing::trace!(receiver, "completion receiver unresolved");
        return Vec::new();
    };
    resolver
        .snapshot()
        .members_of(&ty)
        .iter()
        .map(|hit| CompletionItem::from_member(hit, priority::MEMBER))
        .collect()
}

fn scope_completions(
    resolver: &TypeResolver<'_>,
    uri: &Uri,
    offset: TextSize,
    config: &AnalysisConfig,
) -> Vec<CompletionItem> {
    let mut items = Vec::new();
    let scope = resolver.scope_at(offset);

    // Latest binding first so it wins de-duplication.
    for var in scope.variables(offset).iter().rev() {
        let ty = resolver.variable_type(var, &scope, 0);
        let mut item = CompletionItem::new(var.name.as_str(), CompletionKind::Variable)
            .with_priority(priority::VARIABLE);
        if let Some(ty) = ty {
            item = item.with_detail(ty.to_string());
        }
        items.push(item);
    }
    if let Some(callable) = scope.callable {
        for param in callable.params {
            let mut item = CompletionItem::new(param.name.name.as_str(), CompletionKind::Variable)
                .with_priority(priority::VARIABLE);
            if let Some(ty) = &param.ty {
                item = item.with_detail(ty.text.as_str());
            }
            items.push(item);
        }
    }

    if let Some(this) = scope.this_type() {
        items.extend(
            resolver
                .snapshot()
                .members_of(&this)
                .iter()
                .map(|hit| CompletionItem::from_member(hit, priority::MEMBER)),
        );
    }

    items.extend(
        resolver
            .module()
            .declarations()
            .map(|decl| CompletionItem::from_decl(&decl, priority::FILE_DECLARATION)),
    );

    if config.workspace_completions {
        for hit in resolver.snapshot().public_declarations() {
            if hit.document.uri == *uri {
                continue;
            }
            let item = CompletionItem::from_decl(&hit.decl, priority::WORKSPACE_DECLARATION)
                .with_detail(format!("from {}", hit.document.uri));
            items.push(item);
        }
    }

    items.extend(builtins::TYPE_NAMES.iter().map(|name| {
        CompletionItem::new(*name, CompletionKind::Class)
            .with_detail("built-in type")
            .with_priority(priority::BUILTIN_TYPE)
    }));

    if config.keyword_completions {
        items.extend(SyntaxKind::KEYWORDS.iter().map(|kw| {
            CompletionItem::new(*kw, CompletionKind::Keyword).with_priority(priority::KEYWORD)
        }));
    }
    items
}
