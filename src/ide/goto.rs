//! Go-to-definition implementation.

use smol_str::SmolStr;
use text_size::TextSize;

use super::cursor::symbol_at;
use crate::base::{Span, Uri};
use crate::hir::{TypeResolver, WorkspaceSnapshot};
use crate::syntax::SymbolKind;

/// Result of a go-to-definition request.
#[derive(Clone, Debug)]
pub struct GotoResult {
    /// The targets to jump to.
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    /// Create an empty result (no targets found).
    pub fn empty() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    /// Create a result with a single target.
    pub fn single(target: GotoTarget) -> Self {
        Self {
            targets: vec![target],
        }
    }

    /// Check if any targets were found.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A target location for go-to-definition.
#[derive(Clone, Debug)]
pub struct GotoTarget {
    /// The document containing the target.
    pub uri: Uri,
    /// Span of the declared name.
    pub span: Span,
    /// The symbol kind.
    pub kind: SymbolKind,
    /// The symbol name.
    pub name: SmolStr,
}

/// Find the definition of the symbol at `offset` in `uri`.
///
/// Locals, parameters and pattern bindings jump within the document;
/// members are looked up on the receiver's type (or the enclosing class),
/// other names through the workspace declarations. Built-in members have no
/// source location and yield an empty result.
pub fn goto_definition(snapshot: &WorkspaceSnapshot, uri: &Uri, offset: TextSize) -> GotoResult {
    let Some(resolver) = TypeResolver::new(snapshot, uri) else {
        return GotoResult::empty();
    };
    let Some(symbol) = symbol_at(&resolver, offset) else {
        return GotoResult::empty();
    };
    match symbol.definition(resolver.document()) {
        Some(def) => GotoResult::single(GotoTarget {
            uri: def.uri,
            span: def.span,
            kind: def.kind,
            name: symbol.name,
        }),
        None => GotoResult::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::Workspace;

    fn goto(marked: &str) -> GotoResult {
        let offset = marked.find("$0").expect("cursor marker");
        let ws = Workspace::new();
        let uri = Uri::from("file:///a");
        ws.open(uri.clone(), &marked.replace("$0", ""), 1);
        goto_definition(&ws.snapshot(), &uri, TextSize::new(offset as u32))
    }

    fn target_text(marked: &str) -> Option<(String, SymbolKind)> {
        let text = marked.replace("$0", "");
        let result = goto(marked);
        let target = result.targets.first()?;
        Some((text[target.span.range].to_string(), target.kind))
    }

    #[test]
    fn test_goto_local() {
        let src = "fn f() {\n let count = 1\n return cou$0nt + 1\n}";
        let Some((name, kind)) = target_text(src) else {
            panic!("no target");
        };
        assert_eq!(name, "count");
        assert_eq!(kind, SymbolKind::Local);
        let result = goto(src);
        assert_eq!(result.targets[0].span.line, 1);
    }

    #[test]
    fn test_goto_parameter() {
        let Some((_, kind)) = target_text("fn f(p: int) -> int { return p$0 }") else {
            panic!("no target");
        };
        assert_eq!(kind, SymbolKind::Parameter);
    }

    #[test]
    fn test_goto_member_through_receiver() {
        let src = "class A { let size: int }\nfn f(a: A) { return a.si$0ze }";
        let result = goto(src);
        assert_eq!(result.targets.len(), 1);
        assert_eq!(result.targets[0].kind, SymbolKind::Field);
        assert_eq!(result.targets[0].span.line, 0);
    }

    #[test]
    fn test_goto_enclosing_class_member() {
        let source = "class A { let size: int\n fn get() -> int { return si$0ze } }";
        let Some((name, kind)) = target_text(source) else {
            panic!("no target");
        };
        assert_eq!(name, "size");
        assert_eq!(kind, SymbolKind::Field);
    }

    #[test]
    fn test_goto_builtin_member_is_empty() {
        assert!(goto("fn f(s: string) { s.Len$0gth }").is_empty());
        assert!(goto("fn f() { nothing$0 }").is_empty());
    }
}
