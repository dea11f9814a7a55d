//! Type resolution: the static type of an expression at a cursor.
//!
//! Two entry points share one set of rules:
//! - [`TypeResolver::resolve_type`] takes expression *text* such as
//!   `people[0].name.ToUpper()`, splits it on top-level dots and resolves it
//!   part by part (used by completion and hover on partial code);
//! - [`TypeResolver::resolve_expr`] walks a parsed [`Expr`] (used to type
//!   bindings declared without a type).
//!
//! Resolution is best-effort: when a step of a chain fails, the type reached
//! so far is returned. Nothing here reports errors; a miss is `None`.
//!
//! A bare name is looked up in this order: `this`/`base`, parameters of the
//! enclosing callable, variables visible at the cursor (latest binding wins),
//! fields and properties of the enclosing class hierarchy, and finally type
//! names for static access. A trailing call on a name that is none of these
//! resolves as a function or method call.

use super::builtins;
use super::document::DocumentSnapshot;
use super::scope::{EnclosingScope, InferenceRoot, Projection, ScopeVariable};
use super::workspace::{DeclHit, MemberHit, WorkspaceSnapshot};
use crate::base::{TextSize, Uri};
use crate::syntax::{BinaryOp, DeclRef, Expr, Module, Param, TypeExpr, UnaryOp, literal_type};

/// Bound on inference through initializers (`let a = b`, `let b = c`, ...).
const MAX_DEPTH: u32 = 16;

/// What a bare name refers to at some offset.
#[derive(Debug, Clone)]
pub enum NameTarget<'a> {
    Parameter(&'a Param),
    Variable(ScopeVariable<'a>),
    Member(MemberHit<'a>),
    Declaration(DeclHit<'a>),
}

/// Resolves types for one document against a workspace snapshot.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    snapshot: &'a WorkspaceSnapshot,
    document: &'a DocumentSnapshot,
    module: &'a Module,
}

impl<'a> TypeResolver<'a> {
    /// `None` if `uri` is not in the snapshot or has no AST.
    pub fn new(snapshot: &'a WorkspaceSnapshot, uri: &Uri) -> Option<Self> {
        let document = snapshot.document(uri)?;
        let module = document.module()?;
        Some(Self {
            snapshot,
            document,
            module,
        })
    }

    pub fn snapshot(&self) -> &'a WorkspaceSnapshot {
        self.snapshot
    }

    pub fn document(&self) -> &'a DocumentSnapshot {
        self.document
    }

    pub fn module(&self) -> &'a Module {
        self.module
    }

    pub fn scope_at(&self, offset: TextSize) -> EnclosingScope<'a> {
        EnclosingScope::at(self.module, offset)
    }

    // =========================================================================
    // Text entry point
    // =========================================================================

    /// Resolve the type of expression text as if written at `offset`.
    pub fn resolve_type(&self, expr: &str, offset: TextSize) -> Option<TypeExpr> {
        let scope = self.scope_at(offset);
        self.resolve_type_in(expr, offset, &scope)
    }

    pub fn resolve_type_in(
        &self,
        expr: &str,
        offset: TextSize,
        scope: &EnclosingScope<'a>,
    ) -> Option<TypeExpr> {
        let parts = split_chain(expr);
        let (first, rest) = parts.split_first()?;
        let (mut current, complete) = self.resolve_first_part(first, offset, scope)?;
        if !complete {
            return Some(current);
        }
        for part in rest {
            let mut suffixes = part.suffixes.as_slice();
            let call = suffixes.first() == Some(&Suffix::Call);
            if call {
                suffixes = &suffixes[1..];
            }
            let Some(next) = self.resolve_member(&current, part.name, call) else {
                tracing::trace!(receiver = %current, member = part.name, "member not found");
                break;
            };
            let (next, complete) = self.apply_suffixes(next, suffixes);
            current = next;
            if !complete {
                break;
            }
        }
        Some(current)
    }

    fn resolve_first_part(
        &self,
        part: &Part<'_>,
        offset: TextSize,
        scope: &EnclosingScope<'a>,
    ) -> Option<(TypeExpr, bool)> {
        let mut suffixes = part.suffixes.as_slice();
        let starts_with_call = suffixes.first() == Some(&Suffix::Call);

        let root = if part.is_new {
            if starts_with_call {
                suffixes = &suffixes[1..];
            }
            Some(TypeExpr::parse(part.name))
        } else if let Some(ty) = self.resolve_name(part.name, offset, scope, 0) {
            Some(ty)
        } else if starts_with_call {
            suffixes = &suffixes[1..];
            self.resolve_callable(part.name, scope)
        } else {
            None
        };

        let root = root?;
        Some(self.apply_suffixes(root, suffixes))
    }

    /// Apply calls and indexing in order. The flag is `false` if a step
    /// could not be resolved.
    fn apply_suffixes(&self, mut ty: TypeExpr, suffixes: &[Suffix]) -> (TypeExpr, bool) {
        for suffix in suffixes {
            match suffix {
                Suffix::Call => ty = self.call_result(ty),
                Suffix::Index => match builtins::index_type(&ty.clone().non_null()) {
                    Some(element) => ty = element,
                    None => return (ty, false),
                },
            }
        }
        (ty, true)
    }

    /// Type of `member` accessed on a value of type `receiver`.
    ///
    /// With `call`, a method yields its return type and a delegate-typed
    /// field yields the delegate's return type.
    pub fn resolve_member(
        &self,
        receiver: &TypeExpr,
        member: &str,
        call: bool,
    ) -> Option<TypeExpr> {
        if member.is_empty() {
            return None;
        }
        let receiver = receiver.clone().non_null();
        let hit = self.snapshot.find_member(&receiver, member)?;
        let ty = hit.ty?;
        if call && !hit.member.is_method() {
            return Some(self.call_result(ty));
        }
        Some(ty)
    }

    /// Result of calling a value of type `ty`: a delegate's return type,
    /// otherwise the type itself (constructor call on a type name).
    fn call_result(&self, ty: TypeExpr) -> TypeExpr {
        self.delegate_return(&ty).unwrap_or(ty)
    }

    fn delegate_return(&self, ty: &TypeExpr) -> Option<TypeExpr> {
        if let Some((_, delegate)) = self.snapshot.find_delegate(&ty.base) {
            return Some(
                delegate
                    .return_type
                    .as_ref()
                    .map(|t| t.expr.clone())
                    .unwrap_or_else(|| TypeExpr::named("void")),
            );
        }
        match ty.base.as_str() {
            "Func" => ty.arg(ty.args.len().checked_sub(1)?),
            "Action" => Some(TypeExpr::named("void")),
            _ => None,
        }
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// Step 1: the type a bare name denotes, without call semantics.
    fn resolve_name(
        &self,
        name: &str,
        offset: TextSize,
        scope: &EnclosingScope<'a>,
        depth: u32,
    ) -> Option<TypeExpr> {
        match name {
            "this" => return scope.this_type(),
            "base" => {
                return scope
                    .class
                    .and_then(|c| c.base.as_ref())
                    .map(|b| b.expr.clone());
            }
            _ => {}
        }
        if let Some(ty) = literal_text_type(name) {
            return Some(ty);
        }

        if let Some(param) = scope.callable.and_then(|c| c.param(name)) {
            return param_type(param);
        }

        let variables = scope.variables(offset);
        if let Some(var) = variables.iter().rev().find(|v| v.name == name) {
            return self.variable_type(var, scope, depth);
        }

        if let Some(this) = scope.this_type() {
            if let Some(hit) = self.snapshot.find_member(&this, name) {
                if !hit.member.is_method() {
                    return hit.ty;
                }
            }
        }

        self.type_name(name)
    }

    /// A name used for static access or construction.
    fn type_name(&self, name: &str) -> Option<TypeExpr> {
        let ty = TypeExpr::parse(name);
        if ty.base.is_empty() || !is_name_like(&ty.base) {
            return None;
        }
        self.snapshot.is_type_name(&ty.base).then_some(ty)
    }

    /// Step 2: `name(..)` where `name` is a method of the enclosing type or
    /// a function (same document first, then the workspace).
    fn resolve_callable(&self, name: &str, scope: &EnclosingScope<'a>) -> Option<TypeExpr> {
        if let Some(this) = scope.this_type() {
            if let Some(hit) = self.snapshot.find_member(&this, name) {
                if hit.member.is_method() {
                    return hit.ty;
                }
            }
        }
        let hit = self.snapshot.find_declaration_from(&self.document.uri, name)?;
        match hit.decl {
            DeclRef::Function(f) => Some(
                f.return_type
                    .as_ref()
                    .map(|t| t.expr.clone())
                    .unwrap_or_else(|| TypeExpr::named("void")),
            ),
            DeclRef::Class(c) => Some(TypeExpr::named(c.name.name.clone())),
            DeclRef::Interface(_) | DeclRef::Enum(_) | DeclRef::Delegate(_) => None,
        }
    }

    /// The type of a visible variable, inferring it if it was declared
    /// without one.
    pub fn variable_type(
        &self,
        var: &ScopeVariable<'a>,
        scope: &EnclosingScope<'a>,
        depth: u32,
    ) -> Option<TypeExpr> {
        if let Some(ty) = &var.declared_type {
            return Some(ty.clone());
        }
        let inference = var.inference.as_ref()?;
        if depth >= MAX_DEPTH {
            tracing::trace!(name = %var.name, "inference depth exhausted");
            return None;
        }
        let mut ty = match &inference.root {
            InferenceRoot::Expr(expr) => {
                self.resolve_expr_in(expr, inference.offset, scope, depth + 1)?
            }
            InferenceRoot::Type(ty) => ty.clone(),
        };
        for step in &inference.steps {
            ty = self.project(&ty, step)?;
        }
        Some(ty)
    }

    fn project(&self, ty: &TypeExpr, step: &Projection) -> Option<TypeExpr> {
        let ty = ty.clone();
        match step {
            Projection::Element => builtins::iteration_type(&ty.non_null()),
            Projection::DictKey => builtins::entry_types(&ty.non_null()).0,
            Projection::DictValue => builtins::entry_types(&ty.non_null()).1,
            Projection::ListItem => builtins::index_type(&ty.non_null()),
            Projection::Unwrap => {
                if ty.nullable {
                    Some(ty.non_null())
                } else if matches!(ty.base.as_str(), "Option" | "Nullable") {
                    ty.arg(0)
                } else {
                    Some(ty)
                }
            }
            Projection::OkValue => match ty.base.as_str() {
                "Result" => ty.arg(0),
                _ => None,
            },
            Projection::ErrValue => match ty.base.as_str() {
                "Result" => ty.arg(1),
                _ => None,
            },
            Projection::Positional(idx) => {
                if let Some(mut elements) = ty.tuple_elements() {
                    return (*idx < elements.len()).then(|| elements.swap_remove(*idx));
                }
                let (_, class) = self.snapshot.find_class(&ty.base)?;
                let params = class.type_param_names();
                class
                    .fields
                    .iter()
                    .map(|f| f.ty.as_ref())
                    .chain(class.properties.iter().map(|p| p.ty.as_ref()))
                    .nth(*idx)
                    .flatten()
                    .map(|t| t.expr.substitute(&params, &ty.args))
            }
            Projection::Member(name) => self.resolve_member(&ty, name, false),
        }
    }

    /// What `name` refers to at `offset`: a parameter, a visible variable, a
    /// member of the enclosing type, or a declaration (same document first).
    pub fn lookup_name(&self, name: &str, offset: TextSize) -> Option<NameTarget<'a>> {
        let scope = self.scope_at(offset);
        if let Some(param) = scope.callable.and_then(|c| c.param(name)) {
            return Some(NameTarget::Parameter(param));
        }
        let mut variables = scope.variables(offset);
        if let Some(idx) = variables.iter().rposition(|v| v.name == name) {
            return Some(NameTarget::Variable(variables.swap_remove(idx)));
        }
        if let Some(this) = scope.this_type() {
            if let Some(hit) = self.snapshot.find_member(&this, name) {
                return Some(NameTarget::Member(hit));
            }
        }
        self.snapshot
            .find_declaration_from(&self.document.uri, name)
            .map(NameTarget::Declaration)
    }

    // =========================================================================
    // Structural entry point
    // =========================================================================

    /// Resolve the type of a parsed expression located at `offset`.
    pub fn resolve_expr(&self, expr: &Expr, offset: TextSize) -> Option<TypeExpr> {
        let scope = self.scope_at(offset);
        self.resolve_expr_in(expr, offset, &scope, 0)
    }

    fn resolve_expr_in(
        &self,
        expr: &Expr,
        offset: TextSize,
        scope: &EnclosingScope<'a>,
        depth: u32,
    ) -> Option<TypeExpr> {
        if depth > MAX_DEPTH {
            return None;
        }
        let resolve = |e: &Expr| self.resolve_expr_in(e, offset, scope, depth + 1);
        match expr {
            Expr::Literal { kind, .. } => kind.type_name().map(TypeExpr::named),
            Expr::Ident(ident) => self.resolve_name(&ident.name, offset, scope, depth),
            Expr::This(_) => scope.this_type(),
            Expr::Base(_) => scope
                .class
                .and_then(|c| c.base.as_ref())
                .map(|b| b.expr.clone()),
            Expr::Field { target, member, .. } => {
                let receiver = resolve(target)?;
                self.resolve_member(&receiver, &member.name, false)
                    .or(Some(receiver))
            }
            Expr::Call { callee, .. } => match callee.as_ref() {
                Expr::Ident(ident) => {
                    match self.resolve_name(&ident.name, offset, scope, depth) {
                        Some(ty) => Some(self.call_result(ty)),
                        None => self.resolve_callable(&ident.name, scope),
                    }
                }
                Expr::Field { target, member, .. } => {
                    let receiver = resolve(target)?;
                    self.resolve_member(&receiver, &member.name, true)
                        .or(Some(receiver))
                }
                other => resolve(other).map(|ty| self.call_result(ty)),
            },
            Expr::Index { target, .. } => {
                let container = resolve(target)?;
                builtins::index_type(&container.clone().non_null()).or(Some(container))
            }
            Expr::New { ty, .. } => Some(ty.expr.clone()),
            Expr::Unary { op, operand, .. } => match op {
                UnaryOp::Not => Some(TypeExpr::named("bool")),
                UnaryOp::Neg => resolve(operand),
            },
            Expr::Binary { op, lhs, rhs, .. } => {
                if op.is_comparison() {
                    return Some(TypeExpr::named("bool"));
                }
                if *op == BinaryOp::Coalesce {
                    return resolve(lhs).map(TypeExpr::non_null).or_else(|| resolve(rhs));
                }
                let lhs = resolve(lhs);
                let rhs = resolve(rhs);
                Some(arithmetic_result(lhs?, rhs))
            }
            Expr::Assign { value, .. } => resolve(value),
            Expr::Is { .. } => Some(TypeExpr::named("bool")),
            Expr::Lambda { .. } | Expr::Error(_) => None,
            Expr::List { items, .. } => {
                let element = items
                    .first()
                    .and_then(resolve)
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "object".to_string());
                Some(TypeExpr::generic("List", vec![element.into()]))
            }
            Expr::Paren { inner, .. } => resolve(inner),
        }
    }
}

fn param_type(param: &Param) -> Option<TypeExpr> {
    param
        .ty
        .as_ref()
        .map(|t| t.expr.clone())
        .or_else(|| literal_type(param.default.as_ref()))
}

/// `string` wins over numbers, `double` over `int`.
fn arithmetic_result(lhs: TypeExpr, rhs: Option<TypeExpr>) -> TypeExpr {
    let rhs_base = rhs.as_ref().map(|t| t.base.as_str());
    if lhs.base == "string" || rhs_base == Some("string") {
        return TypeExpr::named("string");
    }
    if lhs.base == "int" && matches!(rhs_base, Some("double" | "float")) {
        return rhs.unwrap_or(lhs);
    }
    lhs
}

fn literal_text_type(text: &str) -> Option<TypeExpr> {
    let first = text.chars().next()?;
    let name = match first {
        '"' => "string",
        '\'' => "char",
        '0'..='9' if text.contains('.') => "double",
        '0'..='9' => "int",
        _ => match text {
            "true" | "false" => "bool",
            _ => return None,
        },
    };
    Some(TypeExpr::named(name))
}

fn is_name_like(text: &str) -> bool {
    text.split('.').all(|segment| {
        let mut chars = segment.chars();
        chars
            .next()
            .is_some_and(|c| c == '_' || unicode_ident::is_xid_start(c))
            && chars.all(unicode_ident::is_xid_continue)
    })
}

// ============================================================================
// CHAIN SPLITTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
    Call,
    Index,
}

/// One dot-separated part of a chain: `items[0]`, `run()`, `new List<int>()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Part<'t> {
    name: &'t str,
    suffixes: Vec<Suffix>,
    is_new: bool,
}

/// Split on dots outside brackets and literals, then parse each part.
fn split_chain(text: &str) -> Vec<Part<'_>> {
    let text = text.trim();
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let bytes = text.as_bytes();

    for (idx, ch) in text.char_indices() {
        if let Some(q) = quote {
            if ch == q && (idx == 0 || bytes[idx - 1] != b'\\') {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '<' => depth += 1,
            ')' | ']' | '>' => depth = (depth - 1).max(0),
            '.' if depth == 0 => {
                let segment = &text[start..idx];
                let numeric = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
                if !numeric {
                    parts.push(parse_part(segment));
                    start = idx + 1;
                }
            }
            _ => {}
        }
    }
    parts.push(parse_part(&text[start..]));
    parts.retain(|p| !p.name.is_empty() || !p.suffixes.is_empty());
    parts
}

fn parse_part(segment: &str) -> Part<'_> {
    let segment = segment.trim();
    let (segment, is_new) = match segment.strip_prefix("new ") {
        Some(rest) => (rest.trim_start(), true),
        None => (segment, false),
    };

    let mut angle = 0i32;
    let mut name_end = segment.len();
    let mut quote: Option<char> = None;
    for (idx, ch) in segment.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '<' => angle += 1,
            '>' => angle = (angle - 1).max(0),
            '(' | '[' if angle == 0 => {
                name_end = idx;
                break;
            }
            _ => {}
        }
    }

    let name = segment[..name_end].trim();
    let mut suffixes = Vec::new();
    let mut depth = 0i32;
    for ch in segment[name_end..].chars() {
        match ch {
            '(' | '[' => {
                if depth == 0 {
                    suffixes.push(if ch == '(' { Suffix::Call } else { Suffix::Index });
                }
                depth += 1;
            }
            ')' | ']' => depth = (depth - 1).max(0),
            _ => {}
        }
    }

    Part {
        name,
        suffixes,
        is_new,
    }
}
