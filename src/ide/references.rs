//! Find references implementation.
//!
//! [`collect_occurrences`] walks a whole module and records every place a
//! bare name occurs, declarations included. Matching is by name: two
//! unrelated symbols that share a name are both reported. For parameters and
//! local variables the search is confined to the enclosing callable, or to
//! the initializer expression a lambda parameter belongs to.

use rayon::prelude::*;
use text_size::{TextRange, TextSize};

use super::cursor::symbol_at;
use crate::base::{Span, Uri};
use crate::hir::{EnclosingScope, TypeResolver, WorkspaceSnapshot};
use crate::syntax::*;

/// One place a name occurs in a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub span: Span,
    pub is_declaration: bool,
}

/// Result of a find-references request.
#[derive(Clone, Debug, Default)]
pub struct ReferenceResult {
    /// All references found, ordered by document then position.
    pub references: Vec<Reference>,
    /// Include the definition in the results.
    pub include_declaration: bool,
}

impl ReferenceResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if any references were found.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Get the number of references.
    pub fn len(&self) -> usize {
        self.references.len()
    }
}

/// A reference to a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    /// The document containing the reference.
    pub uri: Uri,
    pub span: Span,
    /// Whether this is the declaration (vs a use).
    pub is_definition: bool,
}

/// Find all references to the symbol at `offset` in `uri`.
///
/// Returns an empty result when the cursor is not on an occurrence of a
/// known symbol.
pub fn find_references(
    snapshot: &WorkspaceSnapshot,
    uri: &Uri,
    offset: TextSize,
    include_declaration: bool,
) -> ReferenceResult {
    let Some(resolver) = TypeResolver::new(snapshot, uri) else {
        return ReferenceResult::empty();
    };
    let Some(symbol) = symbol_at(&resolver, offset) else {
        return ReferenceResult::empty();
    };

    let references = if symbol.is_local() {
        let scope = EnclosingScope::at(resolver.module(), symbol.range.start());
        let Some(within) = scope.local_range() else {
            return ReferenceResult::empty();
        };
        collect_occurrences(resolver.module(), &symbol.name, Some(within))
            .into_iter()
            .map(|occ| Reference {
                uri: uri.clone(),
                span: occ.span,
                is_definition: occ.is_declaration,
            })
            .collect::<Vec<_>>()
    } else {
        snapshot
            .documents()
            .par_iter()
            .flat_map_iter(|document| {
                let occurrences = document
                    .module()
                    .map(|module| collect_occurrences(module, &symbol.name, None))
                    .unwrap_or_default();
                occurrences.into_iter().map(|occ| Reference {
                    uri: document.uri.clone(),
                    span: occ.span,
                    is_definition: occ.is_declaration,
                })
            })
            .collect()
    };

    // The cursor must sit on one of the occurrences, not in a comment.
    let on_occurrence = references
        .iter()
        .any(|r| r.uri == *uri && r.span.range.contains_range(symbol.range));
    if !on_occurrence {
        return ReferenceResult::empty();
    }

    tracing::debug!(
        name = %symbol.name,
        local = symbol.is_local(),
        count = references.len(),
        "collected references"
    );

    ReferenceResult {
        references: references
            .into_iter()
            .filter(|r| include_declaration || !r.is_definition)
            .collect(),
        include_declaration,
    }
}

/// Every occurrence of `name` in `module`, in source order.
///
/// With `within`, only occurrences inside that range are kept.
pub fn collect_occurrences(
    module: &Module,
    name: &str,
    within: Option<TextRange>,
) -> Vec<Occurrence> {
    let mut collector = Collector {
        name,
        within,
        out: Vec::new(),
    };
    collector.module(module);
    collector.out.sort_by_key(|occ| occ.span.start());
    collector.out.dedup();
    collector.out
}

struct Collector<'n> {
    name: &'n str,
    within: Option<TextRange>,
    out: Vec<Occurrence>,
}

impl Collector<'_> {
    fn record(&mut self, ident: &Ident, is_declaration: bool) {
        if !ident.is(self.name) {
            return;
        }
        if let Some(within) = self.within {
            if !within.contains_range(ident.span.range) {
                return;
            }
        }
        self.out.push(Occurrence {
            span: ident.span,
            is_declaration,
        });
    }

    fn decl(&mut self, ident: &Ident) {
        self.record(ident, true);
    }

    fn use_(&mut self, ident: &Ident) {
        self.record(ident, false);
    }

    fn type_ref(&mut self, ty: Option<&TypeRef>) {
        for name in ty.into_iter().flat_map(|t| &t.names) {
            self.use_(name);
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn module(&mut self, module: &Module) {
        for iface in &module.interfaces {
            self.decl(&iface.name);
            for base in &iface.bases {
                self.type_ref(Some(base));
            }
            for sig in &iface.methods {
                self.decl(&sig.name);
                self.params(&sig.params);
                self.type_ref(sig.return_type.as_ref());
            }
        }
        for class in &module.classes {
            self.class(class);
        }
        for function in &module.functions {
            self.function(function);
        }
        for decl in &module.enums {
            self.decl(&decl.name);
            for member in &decl.members {
                self.decl(&member.name);
                if let Some(value) = &member.value {
                    self.expr(value);
                }
            }
        }
        for delegate in &module.delegates {
            self.decl(&delegate.name);
            self.params(&delegate.params);
            self.type_ref(delegate.return_type.as_ref());
        }
        for ext in &module.enum_extensions {
            self.use_(&ext.target);
            for method in &ext.methods {
                self.function(method);
            }
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        self.decl(&class.name);
        for param in &class.type_params {
            self.decl(param);
        }
        self.type_ref(class.base.as_ref());
        for iface in &class.interfaces {
            self.type_ref(Some(iface));
        }
        for field in &class.fields {
            self.decl(&field.name);
            self.type_ref(field.ty.as_ref());
            if let Some(init) = &field.init {
                self.expr(init);
            }
        }
        for prop in &class.properties {
            self.decl(&prop.name);
            self.type_ref(prop.ty.as_ref());
            if let Some(init) = &prop.init {
                self.expr(init);
            }
        }
        for event in &class.events {
            self.decl(&event.name);
            self.type_ref(event.ty.as_ref());
        }
        for ctor in &class.constructors {
            self.params(&ctor.params);
            self.block(&ctor.body);
        }
        for method in &class.methods {
            self.function(method);
        }
    }

    fn function(&mut self, function: &FunctionDecl) {
        self.decl(&function.name);
        for param in &function.type_params {
            self.decl(param);
        }
        self.params(&function.params);
        self.type_ref(function.return_type.as_ref());
        self.block(&function.body);
    }

    fn params(&mut self, params: &[Param]) {
        for param in params {
            self.decl(&param.name);
            self.type_ref(param.ty.as_ref());
            if let Some(default) = &param.default {
                self.expr(default);
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.stmt(stmt);
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Binding(binding) => {
                self.decl(&binding.name);
                self.type_ref(binding.ty.as_ref());
                if let Some(init) = &binding.init {
                    self.expr(init);
                }
            }
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::Return { value, .. } | Stmt::Throw { value, .. } => {
                if let Some(value) = value {
                    self.expr(value);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) => {}
            Stmt::If(if_stmt) => {
                for branch in &if_stmt.branches {
                    self.expr(&branch.cond);
                    self.block(&branch.body);
                }
                if let Some(else_body) = &if_stmt.else_body {
                    self.block(else_body);
                }
            }
            Stmt::For(for_stmt) => {
                self.decl(&for_stmt.var);
                self.expr(&for_stmt.start);
                self.expr(&for_stmt.end);
                self.block(&for_stmt.body);
            }
            Stmt::Foreach(foreach) => {
                self.decl(&foreach.var);
                self.type_ref(foreach.ty.as_ref());
                self.expr(&foreach.iterable);
                self.block(&foreach.body);
            }
            Stmt::DictForeach(foreach) => {
                self.decl(&foreach.key);
                self.decl(&foreach.value);
                self.expr(&foreach.iterable);
                self.block(&foreach.body);
            }
            Stmt::While { cond, body, .. } => {
                self.expr(cond);
                self.block(body);
            }
            Stmt::Try(try_stmt) => {
                self.block(&try_stmt.body);
                for catch in &try_stmt.catches {
                    if let Some(binding) = &catch.binding {
                        self.decl(binding);
                    }
                    self.type_ref(catch.ty.as_ref());
                    self.block(&catch.body);
                }
                if let Some(finally) = &try_stmt.finally {
                    self.block(finally);
                }
            }
            Stmt::Match(match_stmt) => {
                self.expr(&match_stmt.scrutinee);
                for case in &match_stmt.cases {
                    self.pattern(&case.pattern);
                    if let Some(guard) = &case.guard {
                        self.expr(guard);
                    }
                    self.block(&case.body);
                }
            }
            Stmt::Block(block) => self.block(block),
        }
    }

    // =========================================================================
    // Expressions & patterns
    // =========================================================================

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal { .. } | Expr::This(_) | Expr::Base(_) | Expr::Error(_) => {}
            Expr::Ident(ident) => self.use_(ident),
            Expr::Field { target, member, .. } => {
                self.expr(target);
                self.use_(member);
            }
            Expr::Call { callee, args, .. } => {
                self.expr(callee);
                for arg in args {
                    self.expr(arg);
                }
            }
            Expr::Index { target, index, .. } => {
                self.expr(target);
                self.expr(index);
            }
            Expr::New { ty, args, .. } => {
                self.type_ref(Some(ty));
                for arg in args {
                    self.expr(arg);
                }
            }
            Expr::Unary { operand, .. } => self.expr(operand),
            Expr::Binary { lhs, rhs, .. } => {
                self.expr(lhs);
                self.expr(rhs);
            }
            Expr::Assign { target, value, .. } => {
                self.expr(target);
                self.expr(value);
            }
            Expr::Is { value, ty, .. } => {
                self.expr(value);
                self.type_ref(Some(ty));
            }
            Expr::Lambda { params, body, .. } => {
                self.params(params);
                match body {
                    LambdaBody::Expr(body) => self.expr(body),
                    LambdaBody::Block(block) => self.block(block),
                }
            }
            Expr::List { items, .. } => {
                for item in items {
                    self.expr(item);
                }
            }
            Expr::Paren { inner, .. } => self.expr(inner),
        }
    }

    fn pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Wildcard(_) => {}
            Pattern::Variable(ident) | Pattern::Var(ident) => self.decl(ident),
            Pattern::Literal { text, span } => self.dotted_constant(text, *span),
            Pattern::Some { inner, .. }
            | Pattern::Ok { inner, .. }
            | Pattern::Err { inner, .. } => self.pattern(inner),
            Pattern::Positional { ty, elements, .. } => {
                self.type_ref(ty.as_ref());
                for element in elements {
                    self.pattern(element);
                }
            }
            Pattern::Property { ty, fields, .. } => {
                self.type_ref(ty.as_ref());
                for field in fields {
                    match &field.pattern {
                        Some(inner) => {
                            self.use_(&field.field);
                            self.pattern(inner);
                        }
                        None => self.decl(&field.field),
                    }
                }
            }
            Pattern::List { elements, .. } => {
                for element in elements {
                    self.pattern(element);
                }
            }
        }
    }

    /// Segments of a constant pattern such as `Color.Red`.
    fn dotted_constant(&mut self, text: &str, span: Span) {
        if usize::from(span.len()) != text.len() {
            return;
        }
        let mut offset = 0u32;
        for segment in text.split('.') {
            let start = span.start() + TextSize::new(offset);
            let range = TextRange::at(start, TextSize::new(segment.len() as u32));
            let ident = Ident::new(segment, Span::new(range, span.line, span.col + offset));
            self.use_(&ident);
            offset += segment.len() as u32 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_text;

    fn occurrences(source: &str, name: &str) -> Vec<(String, bool)> {
        let module = parse_text(source).module;
        collect_occurrences(&module, name, None)
            .iter()
            .map(|occ| {
                let text = &source[occ.span.range];
                (text.to_string(), occ.is_declaration)
            })
            .collect()
    }

    #[test]
    fn test_collects_declarations_and_uses() {
        let source = "class Person { let name: string\
                      \n fn rename(name: string) { this.name = name } }\
                      \nfn f(p: Person) { let q = new Person()\n q.name }";
        let found = occurrences(source, "name");
        let decls = found.iter().filter(|(_, d)| *d).count();
        assert_eq!(found.len(), 5);
        assert_eq!(decls, 2);

        let found = occurrences(source, "Person");
        assert_eq!(
            found,
            vec![
                ("Person".to_string(), true),
                ("Person".to_string(), false),
                ("Person".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_walk_reaches_every_statement_kind() {
        let source = r#"
            fn f(items: List<int>, map: Dict<string, int>) {
                if x { x } else if x { x } else { x }
                for i in x..x { x }
                for item in x { x }
                for (k, v) in x { x }
                while x { x }
                try { x } catch e { x } finally { x }
                match x { Some(y) if x => { x } }
                { x }
                let g = |a| x
                return x
            }
        "#;
        assert_eq!(occurrences(source, "x").len(), 23);
    }

    #[test]
    fn test_pattern_names_and_constants() {
        let source = "enum Color { Red }\nfn f(c: Color) {\n match c {\n  Color.Red => { }\
                      \n  Point { x: px, y } => { px }\n }\n}";
        assert_eq!(
            occurrences(source, "Red"),
            vec![("Red".to_string(), true), ("Red".to_string(), false)]
        );
        assert_eq!(
            occurrences(source, "px"),
            vec![("px".to_string(), true), ("px".to_string(), false)]
        );
        assert_eq!(occurrences(source, "y"), vec![("y".to_string(), true)]);
        assert_eq!(occurrences(source, "x"), vec![("x".to_string(), false)]);
    }

    #[test]
    fn test_within_limits_to_range() {
        let source = "fn a() { let v = 1\n v }\nfn b() { let v = 2\n v }";
        let module = parse_text(source).module;
        let range = module.functions[1].span.range;
        let found = collect_occurrences(&module, "v", Some(range));
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|occ| range.contains_range(occ.span.range)));
    }
}
