//! Scope analysis: which names are visible at a cursor offset.
//!
//! Visibility is forward-only and branch-precise: a statement counts only if
//! it starts before the cursor, and of an `if`/`try`/`match` only the branch
//! holding the cursor contributes. Pattern-bound names never leak into
//! sibling cases. Results are recomputed per query.

use smol_str::SmolStr;

use crate::base::{Span, TextRange, TextSize};
use crate::syntax::*;

/// Where a visible name was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableOrigin {
    Binding,
    Loop,
    Foreach,
    Catch,
    Pattern,
    DictKey,
    DictValue,
    Lambda,
}

/// One step from a known value to the value a name is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Element produced by iterating.
    Element,
    DictKey,
    DictValue,
    /// `Some(x)` / nullable unwrap.
    Unwrap,
    OkValue,
    ErrValue,
    /// Element of a list pattern.
    ListItem,
    /// `n`-th positional component.
    Positional(usize),
    Member(SmolStr),
}

/// Where an untyped variable's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceRoot<'a> {
    Expr(&'a Expr),
    Type(TypeExpr),
}

/// Recipe for typing a variable declared without a type: resolve `root` at
/// `offset`, then apply `steps` in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference<'a> {
    pub root: InferenceRoot<'a>,
    pub steps: Vec<Projection>,
    /// Start of the introducing statement, so the variable cannot see itself.
    pub offset: TextSize,
}

/// A name visible at a query offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeVariable<'a> {
    pub name: SmolStr,
    pub declared_type: Option<TypeExpr>,
    pub mutable: bool,
    pub origin: VariableOrigin,
    /// The name at its binding site.
    pub span: Span,
    pub inference: Option<Inference<'a>>,
}

impl<'a> ScopeVariable<'a> {
    fn new(ident: &Ident, origin: VariableOrigin) -> Self {
        Self {
            name: ident.name.clone(),
            declared_type: None,
            mutable: false,
            origin,
            span: ident.span,
            inference: None,
        }
    }

    fn typed(mut self, ty: Option<&TypeRef>) -> Self {
        self.declared_type = ty.map(|t| t.expr.clone());
        self
    }

    fn inferred(
        mut self,
        root: InferenceRoot<'a>,
        steps: Vec<Projection>,
        offset: TextSize,
    ) -> Self {
        if self.declared_type.is_none() {
            self.inference = Some(Inference {
                root,
                steps,
                offset,
            });
        }
        self
    }
}

/// Variables visible at `offset` inside `stmts`, in binding order.
pub fn visible_variables(stmts: &[Stmt], offset: TextSize) -> Vec<ScopeVariable<'_>> {
    let mut out = Vec::new();
    collect_stmts(stmts, offset, &mut out);
    out
}

fn collect_stmts<'a>(stmts: &'a [Stmt], offset: TextSize, out: &mut Vec<ScopeVariable<'a>>) {
    for stmt in stmts {
        if stmt.span().start() >= offset {
            break;
        }
        collect_stmt(stmt, offset, out);
    }
}

fn collect_block<'a>(block: &'a Block, offset: TextSize, out: &mut Vec<ScopeVariable<'a>>) {
    if block.span.contains(offset) {
        collect_stmts(&block.stmts, offset, out);
    }
}

fn collect_stmt<'a>(stmt: &'a Stmt, offset: TextSize, out: &mut Vec<ScopeVariable<'a>>) {
    match stmt {
        Stmt::Binding(binding) => {
            if let Some(init) = &binding.init {
                collect_lambdas(init, offset, out);
            }
            let mut var = ScopeVariable::new(&binding.name, VariableOrigin::Binding)
                .typed(binding.ty.as_ref());
            var.mutable = binding.mutable;
            if let Some(init) = &binding.init {
                var = var.inferred(InferenceRoot::Expr(init), Vec::new(), binding.span.start());
            }
            out.push(var);
        }
        Stmt::Expr(expr) => collect_lambdas(expr, offset, out),
        Stmt::Return { value, .. } | Stmt::Throw { value, .. } => {
            if let Some(value) = value {
                collect_lambdas(value, offset, out);
            }
        }
        Stmt::Break(_) | Stmt::Continue(_) => {}
        Stmt::If(if_stmt) => {
            for branch in &if_stmt.branches {
                if branch.cond.span().contains(offset) {
                    collect_lambdas(&branch.cond, offset, out);
                    return;
                }
                if branch.body.span.contains(offset) {
                    collect_block(&branch.body, offset, out);
                    return;
                }
            }
            if let Some(else_body) = &if_stmt.else_body {
                collect_block(else_body, offset, out);
            }
        }
        Stmt::For(for_stmt) => {
            if !for_stmt.span.contains(offset) {
                return;
            }
            let mut counter = ScopeVariable::new(&for_stmt.var, VariableOrigin::Loop);
            counter.declared_type = Some(TypeExpr::named("int"));
            counter.mutable = true;
            out.push(counter);
            collect_block(&for_stmt.body, offset, out);
        }
        Stmt::Foreach(foreach) => {
            if !foreach.span.contains(offset) {
                return;
            }
            if foreach.iterable.span().contains(offset) {
                collect_lambdas(&foreach.iterable, offset, out);
                return;
            }
            out.push(
                ScopeVariable::new(&foreach.var, VariableOrigin::Foreach)
                    .typed(foreach.ty.as_ref())
                    .inferred(
                        InferenceRoot::Expr(&foreach.iterable),
                        vec![Projection::Element],
                        foreach.span.start(),
                    ),
            );
            collect_block(&foreach.body, offset, out);
        }
        Stmt::DictForeach(foreach) => {
            if !foreach.span.contains(offset) {
                return;
            }
            if foreach.iterable.span().contains(offset) {
                collect_lambdas(&foreach.iterable, offset, out);
                return;
            }
            let start = foreach.span.start();
            out.push(ScopeVariable::new(&foreach.key, VariableOrigin::DictKey).inferred(
                InferenceRoot::Expr(&foreach.iterable),
                vec![Projection::DictKey],
                start,
            ));
            out.push(ScopeVariable::new(&foreach.value, VariableOrigin::DictValue).inferred(
                InferenceRoot::Expr(&foreach.iterable),
                vec![Projection::DictValue],
                start,
            ));
            collect_block(&foreach.body, offset, out);
        }
        Stmt::While { cond, body, .. } => {
            if cond.span().contains(offset) {
                collect_lambdas(cond, offset, out);
            } else {
                collect_block(body, offset, out);
            }
        }
        Stmt::Try(try_stmt) => {
            for catch in &try_stmt.catches {
                if !catch.span.contains(offset) {
                    continue;
                }
                if let Some(binding) = &catch.binding {
                    let mut var = ScopeVariable::new(binding, VariableOrigin::Catch)
                        .typed(catch.ty.as_ref());
                    if var.declared_type.is_none() {
                        var.declared_type = Some(TypeExpr::named("Exception"));
                    }
                    out.push(var);
                }
                collect_block(&catch.body, offset, out);
                return;
            }
            if let Some(finally) = &try_stmt.finally {
                if finally.span.contains(offset) {
                    collect_block(finally, offset, out);
                    return;
                }
            }
            collect_block(&try_stmt.body, offset, out);
        }
        Stmt::Match(match_stmt) => {
            if match_stmt.scrutinee.span().contains(offset) {
                collect_lambdas(&match_stmt.scrutinee, offset, out);
                return;
            }
            let Some(case) = match_stmt.cases.iter().find(|c| c.span.contains(offset)) else {
                return;
            };
            pattern_variables(
                &case.pattern,
                InferenceRoot::Expr(&match_stmt.scrutinee),
                Vec::new(),
                match_stmt.span.start(),
                out,
            );
            if let Some(guard) = &case.guard {
                collect_lambdas(guard, offset, out);
            }
            collect_block(&case.body, offset, out);
        }
        Stmt::Block(block) => collect_block(block, offset, out),
    }
}

/// Every name a pattern binds, recursively unwrapped.
pub fn pattern_variables<'a>(
    pattern: &'a Pattern,
    root: InferenceRoot<'a>,
    steps: Vec<Projection>,
    offset: TextSize,
    out: &mut Vec<ScopeVariable<'a>>,
) {
    let step = |extra: Projection| {
        let mut next = steps.clone();
        next.push(extra);
        next
    };
    match pattern {
        Pattern::Wildcard(_) | Pattern::Literal { .. } => {}
        Pattern::Variable(ident) | Pattern::Var(ident) => {
            out.push(ScopeVariable::new(ident, VariableOrigin::Pattern).inferred(
                root,
                steps,
                offset,
            ));
        }
        Pattern::Some { inner, .. } => {
            pattern_variables(inner, root, step(Projection::Unwrap), offset, out);
        }
        Pattern::Ok { inner, .. } => {
            pattern_variables(inner, root, step(Projection::OkValue), offset, out);
        }
        Pattern::Err { inner, .. } => {
            pattern_variables(inner, root, step(Projection::ErrValue), offset, out);
        }
        Pattern::Positional { ty, elements, .. } => {
            let (root, steps) = retype(ty.as_ref(), root, steps);
            for (idx, element) in elements.iter().enumerate() {
                let mut next = steps.clone();
                next.push(Projection::Positional(idx));
                pattern_variables(element, root.clone(), next, offset, out);
            }
        }
        Pattern::Property { ty, fields, .. } => {
            let (root, steps) = retype(ty.as_ref(), root, steps);
            for field in fields {
                let mut next = steps.clone();
                next.push(Projection::Member(field.field.name.clone()));
                match &field.pattern {
                    Some(inner) => pattern_variables(inner, root.clone(), next, offset, out),
                    None => out.push(
                        ScopeVariable::new(&field.field, VariableOrigin::Pattern).inferred(
                            root.clone(),
                            next,
                            offset,
                        ),
                    ),
                }
            }
        }
        Pattern::List { elements, .. } => {
            for element in elements {
                pattern_variables(element, root.clone(), step(Projection::ListItem), offset, out);
            }
        }
    }
}

/// A typed sub-pattern restarts inference from its written type.
fn retype<'a>(
    ty: Option<&TypeRef>,
    root: InferenceRoot<'a>,
    steps: Vec<Projection>,
) -> (InferenceRoot<'a>, Vec<Projection>) {
    match ty {
        Some(ty) => (InferenceRoot::Type(ty.expr.clone()), Vec::new()),
        None => (root, steps),
    }
}

/// Parameters of lambdas enclosing `offset` within `expr`, outermost first,
/// plus any bindings inside a block-bodied lambda before `offset`.
fn collect_lambdas<'a>(expr: &'a Expr, offset: TextSize, out: &mut Vec<ScopeVariable<'a>>) {
    if !expr.span().contains(offset) {
        return;
    }
    match expr {
        Expr::Lambda { params, body, .. } => {
            for param in params {
                out.push(
                    ScopeVariable::new(&param.name, VariableOrigin::Lambda)
                        .typed(param.ty.as_ref()),
                );
            }
            match body {
                LambdaBody::Expr(body) => collect_lambdas(body, offset, out),
                LambdaBody::Block(block) => collect_block(block, offset, out),
            }
        }
        Expr::Literal { .. } | Expr::Ident(_) | Expr::This(_) | Expr::Base(_) | Expr::Error(_) => {}
        Expr::Field { target, .. } => collect_lambdas(target, offset, out),
        Expr::Call { callee, args, .. } => {
            collect_lambdas(callee, offset, out);
            for arg in args {
                collect_lambdas(arg, offset, out);
            }
        }
        Expr::Index { target, index, .. } => {
            collect_lambdas(target, offset, out);
            collect_lambdas(index, offset, out);
        }
        Expr::New { args, .. } => {
            for arg in args {
                collect_lambdas(arg, offset, out);
            }
        }
        Expr::Unary { operand, .. } => collect_lambdas(operand, offset, out),
        Expr::Binary { lhs, rhs, .. } => {
            collect_lambdas(lhs, offset, out);
            collect_lambdas(rhs, offset, out);
        }
        Expr::Assign { target, value, .. } => {
            collect_lambdas(target, offset, out);
            collect_lambdas(value, offset, out);
        }
        Expr::Is { value, .. } => collect_lambdas(value, offset, out),
        Expr::List { items, .. } => {
            for item in items {
                collect_lambdas(item, offset, out);
            }
        }
        Expr::Paren { inner, .. } => collect_lambdas(inner, offset, out),
    }
}

// ============================================================================
// ENCLOSING CONTEXT
// ============================================================================

/// A function-like body: top-level function, method, constructor or
/// extension method.
#[derive(Debug, Clone, Copy)]
pub struct Callable<'a> {
    pub name: Option<&'a Ident>,
    pub params: &'a [Param],
    pub return_type: Option<&'a TypeRef>,
    pub body: &'a Block,
    pub span: Span,
}

impl<'a> Callable<'a> {
    fn function(f: &'a FunctionDecl) -> Self {
        Self {
            name: Some(&f.name),
            params: &f.params,
            return_type: f.return_type.as_ref(),
            body: &f.body,
            span: f.span,
        }
    }

    fn constructor(c: &'a ConstructorDecl) -> Self {
        Self {
            name: None,
            params: &c.params,
            return_type: None,
            body: &c.body,
            span: c.span,
        }
    }

    pub fn param(&self, name: &str) -> Option<&'a Param> {
        self.params.iter().find(|p| p.name.is(name))
    }
}

/// The declarations surrounding an offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnclosingScope<'a> {
    pub class: Option<&'a ClassDecl>,
    pub extension: Option<&'a EnumExtension>,
    pub callable: Option<Callable<'a>>,
    /// Initializer, parameter default or enum value holding the offset,
    /// when it is not inside a callable body.
    pub initializer: Option<&'a Expr>,
}

impl<'a> EnclosingScope<'a> {
    pub fn at(module: &'a Module, offset: TextSize) -> Self {
        let mut scope = Self::default();
        if let Some(class) = module.class_at(offset) {
            scope.class = Some(class);
            scope.callable = class
                .methods
                .iter()
                .find(|m| m.span.contains(offset))
                .map(Callable::function)
                .or_else(|| {
                    class
                        .constructors
                        .iter()
                        .find(|c| c.span.contains(offset))
                        .map(Callable::constructor)
                });
        } else if let Some(ext) = module.extension_at(offset) {
            scope.extension = Some(ext);
            scope.callable = ext
                .methods
                .iter()
                .find(|m| m.span.contains(offset))
                .map(Callable::function);
        } else {
            scope.callable = module
                .functions
                .iter()
                .find(|f| f.span.contains(offset))
                .map(Callable::function);
        }
        let in_body = matches!(scope.callable, Some(c) if c.body.span.contains(offset));
        if !in_body {
            scope.initializer = module.initializer_at(offset);
        }
        scope
    }

    /// Range that bounds every use of a local name declared at this scope.
    pub fn local_range(&self) -> Option<TextRange> {
        self.callable
            .map(|c| c.span.range)
            .or_else(|| self.initializer.map(|e| e.span().range))
    }

    /// Type of `this`: the enclosing class, or the enum being extended.
    pub fn this_type(&self) -> Option<TypeExpr> {
        if let Some(class) = self.class {
            return Some(TypeExpr::generic(class.name.name.clone(), class.type_param_names()));
        }
        self.extension.map(|ext| TypeExpr::named(ext.target.name.clone()))
    }

    /// Variables visible at `offset` in the enclosing callable's body, or
    /// lambda parameters inside a declaration-level expression.
    pub fn variables(&self, offset: TextSize) -> Vec<ScopeVariable<'a>> {
        if let Some(callable) = self.callable {
            if callable.body.span.contains(offset) {
                return visible_variables(&callable.body.stmts, offset);
            }
        }
        let mut out = Vec::new();
        if let Some(expr) = self.initializer {
            collect_lambdas(expr, offset, &mut out);
        }
        out
    }
}
