//! AST for the terse notation.
//!
//! Declarations are flat structs; statements, expressions and patterns are
//! closed enums so every consumer matches them exhaustively. Nodes are
//! immutable once the parser hands a [`Module`] out.

use smol_str::SmolStr;

use super::TypeExpr;
use crate::base::{Span, TextSize};

/// A name together with where it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: SmolStr,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
}

impl Visibility {
    pub fn is_private(self) -> bool {
        self == Visibility::Private
    }

    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Public => None,
            Visibility::Internal => Some("internal"),
            Visibility::Protected => Some("protected"),
            Visibility::Private => Some("priv"),
        }
    }
}

/// A written type: the text, its parsed form, and every name inside it.
///
/// `names` holds each identifier of the type with its own span, so
/// `Dict<string, Person>` yields `Dict`, `string` and `Person`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub text: SmolStr,
    pub expr: TypeExpr,
    pub names: Vec<Ident>,
    pub span: Span,
}

impl TypeRef {
    pub fn new(text: impl Into<SmolStr>, names: Vec<Ident>, span: Span) -> Self {
        let text = text.into();
        Self {
            expr: TypeExpr::parse(&text),
            text,
            names,
            span,
        }
    }

    /// The base name as written (last dotted segment excluded).
    pub fn base(&self) -> &str {
        &self.expr.base
    }
}

// ============================================================================
// MODULE & DECLARATIONS
// ============================================================================

/// One document's parsed program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Module {
    pub usings: Vec<Using>,
    pub interfaces: Vec<InterfaceDecl>,
    pub classes: Vec<ClassDecl>,
    pub functions: Vec<FunctionDecl>,
    pub enums: Vec<EnumDecl>,
    pub delegates: Vec<DelegateDecl>,
    pub enum_extensions: Vec<EnumExtension>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Using {
    pub path: SmolStr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Struct,
    Record,
}

impl ClassKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ClassKind::Class => "class",
            ClassKind::Struct => "struct",
            ClassKind::Record => "record",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub kind: ClassKind,
    pub visibility: Visibility,
    pub type_params: Vec<Ident>,
    /// Base class as written; resolved lazily because it may live in
    /// another document.
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<FieldDecl>,
    pub properties: Vec<PropertyDecl>,
    pub methods: Vec<FunctionDecl>,
    pub constructors: Vec<ConstructorDecl>,
    pub events: Vec<EventDecl>,
    pub doc: Option<SmolStr>,
    pub span: Span,
}

impl ClassDecl {
    pub fn type_param_names(&self) -> Vec<SmolStr> {
        self.type_params.iter().map(|p| p.name.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub name: Ident,
    pub visibility: Visibility,
    pub bases: Vec<TypeRef>,
    pub methods: Vec<MethodSignature>,
    pub doc: Option<SmolStr>,
    pub span: Span,
}

/// A method declared without a body (interface member).
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub name: Ident,
    pub params: Vec<Param>,
    pub return_type: Option<TypeRef>,
    pub doc: Option<SmolStr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: Ident,
    pub visibility: Visibility,
    pub mutable: bool,
    pub is_const: bool,
    pub ty: Option<TypeRef>,
    pub init: Option<Expr>,
    pub doc: Option<SmolStr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDecl {
    pub name: Ident,
    pub visibility: Visibility,
    pub ty: Option<TypeRef>,
    pub init: Option<Expr>,
    pub doc: Option<SmolStr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDecl {
    pub name: Ident,
    pub visibility: Visibility,
    pub ty: Option<TypeRef>,
    pub doc: Option<SmolStr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    /// The `new` keyword.
    pub keyword: Span,
    pub visibility: Visibility,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

/// A function with a body: top-level functions, methods, and enum extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Ident,
    pub visibility: Visibility,
    pub is_static: bool,
    pub type_params: Vec<Ident>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeRef>,
    pub body: Block,
    pub doc: Option<SmolStr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Ident,
    pub ty: Option<TypeRef>,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Ident,
    pub visibility: Visibility,
    pub members: Vec<EnumMember>,
    pub doc: Option<SmolStr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: Ident,
    pub value: Option<Expr>,
    pub span: Span,
}

/// `extend Color { fn label() -> string { .. } }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumExtension {
    pub target: Ident,
    pub methods: Vec<FunctionDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DelegateDecl {
    pub name: Ident,
    pub visibility: Visibility,
    pub params: Vec<Param>,
    pub return_type: Option<TypeRef>,
    pub doc: Option<SmolStr>,
    pub span: Span,
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Binding(Binding),
    Expr(Expr),
    Return { value: Option<Expr>, span: Span },
    Throw { value: Option<Expr>, span: Span },
    Break(Span),
    Continue(Span),
    If(IfStmt),
    For(ForStmt),
    Foreach(ForeachStmt),
    DictForeach(DictForeachStmt),
    While { cond: Expr, body: Block, span: Span },
    Try(TryStmt),
    Match(MatchStmt),
    Block(Block),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Binding(b) => b.span,
            Stmt::Expr(e) => e.span(),
            Stmt::Return { span, .. } | Stmt::Throw { span, .. } | Stmt::While { span, .. } => {
                *span
            }
            Stmt::Break(span) | Stmt::Continue(span) => *span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Foreach(s) => s.span,
            Stmt::DictForeach(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Match(s) => s.span,
            Stmt::Block(b) => b.span,
        }
    }
}

/// `let name[: T] = init` / `var name[: T] = init`
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Ident,
    pub mutable: bool,
    pub ty: Option<TypeRef>,
    pub init: Option<Expr>,
    pub span: Span,
}

/// `if a { } else if b { } else { }` with the else-if chain flattened.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub branches: Vec<IfBranch>,
    pub else_body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub cond: Expr,
    pub body: Block,
    pub span: Span,
}

/// Counted loop: `for i in start..end { }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub var: Ident,
    pub start: Expr,
    pub end: Expr,
    pub body: Block,
    pub span: Span,
}

/// `for item[: T] in items { }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForeachStmt {
    pub var: Ident,
    pub ty: Option<TypeRef>,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

/// `for (key, value) in map { }`
#[derive(Debug, Clone, PartialEq)]
pub struct DictForeachStmt {
    pub key: Ident,
    pub value: Ident,
    pub iterable: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub body: Block,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub binding: Option<Ident>,
    pub ty: Option<TypeRef>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStmt {
    pub scrutinee: Expr,
    pub cases: Vec<MatchCase>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Float,
    String,
    Char,
    Bool,
    Null,
}

impl LiteralKind {
    /// The built-in type a literal of this kind has, if any.
    pub fn type_name(self) -> Option<&'static str> {
        match self {
            LiteralKind::Int => Some("int"),
            LiteralKind::Float => Some("double"),
            LiteralKind::String => Some("string"),
            LiteralKind::Char => Some("char"),
            LiteralKind::Bool => Some("bool"),
            LiteralKind::Null => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Coalesce,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
                | BinaryOp::And
                | BinaryOp::Or
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LambdaBody {
    Expr(Box<Expr>),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal {
        kind: LiteralKind,
        text: SmolStr,
        span: Span,
    },
    Ident(Ident),
    This(Span),
    Base(Span),
    Field {
        target: Box<Expr>,
        member: Ident,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    New {
        ty: TypeRef,
        args: Vec<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Assign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Is {
        value: Box<Expr>,
        ty: TypeRef,
        span: Span,
    },
    Lambda {
        params: Vec<Param>,
        body: LambdaBody,
        span: Span,
    },
    List {
        items: Vec<Expr>,
        span: Span,
    },
    Paren {
        inner: Box<Expr>,
        span: Span,
    },
    /// Placeholder left by the parser where an expression failed to parse.
    Error(Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(ident) => ident.span,
            Expr::This(span) | Expr::Base(span) | Expr::Error(span) => *span,
            Expr::Literal { span, .. }
            | Expr::Field { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. }
            | Expr::New { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Is { span, .. }
            | Expr::Lambda { span, .. }
            | Expr::List { span, .. }
            | Expr::Paren { span, .. } => *span,
        }
    }
}

// ============================================================================
// PATTERNS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// `_`
    Wildcard(Span),
    /// A bare name binds the matched value.
    Variable(Ident),
    /// `var name`
    Var(Ident),
    /// Literal or dotted constant (`42`, `"x"`, `Color.Red`).
    Literal { text: SmolStr, span: Span },
    Some { inner: Box<Pattern>, span: Span },
    Ok { inner: Box<Pattern>, span: Span },
    Err { inner: Box<Pattern>, span: Span },
    /// `Point(x, y)` or `(x, y)`
    Positional {
        ty: Option<TypeRef>,
        elements: Vec<Pattern>,
        span: Span,
    },
    /// `Person { name: n, age }`
    Property {
        ty: Option<TypeRef>,
        fields: Vec<FieldPattern>,
        span: Span,
    },
    /// `[first, second]`
    List { elements: Vec<Pattern>, span: Span },
}

/// One `field: pattern` entry; a bare `field` binds a variable of that name.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPattern {
    pub field: Ident,
    pub pattern: Option<Pattern>,
    pub span: Span,
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Wildcard(span) => *span,
            Pattern::Variable(ident) | Pattern::Var(ident) => ident.span,
            Pattern::Literal { span, .. }
            | Pattern::Some { span, .. }
            | Pattern::Ok { span, .. }
            | Pattern::Err { span, .. }
            | Pattern::Positional { span, .. }
            | Pattern::Property { span, .. }
            | Pattern::List { span, .. } => *span,
        }
    }
}

// ============================================================================
// LOOKUP HELPERS
// ============================================================================

impl Module {
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name.is(name))
    }

    pub fn interface(&self, name: &str) -> Option<&InterfaceDecl> {
        self.interfaces.iter().find(|i| i.name.is(name))
    }

    pub fn enum_decl(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.iter().find(|e| e.name.is(name))
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name.is(name))
    }

    pub fn delegate(&self, name: &str) -> Option<&DelegateDecl> {
        self.delegates.iter().find(|d| d.name.is(name))
    }

    /// Innermost class whose span contains `offset`.
    pub fn class_at(&self, offset: TextSize) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.span.contains(offset))
    }

    /// Enum extension whose span contains `offset`.
    pub fn extension_at(&self, offset: TextSize) -> Option<&EnumExtension> {
        self.enum_extensions
            .iter()
            .find(|e| e.span.contains(offset))
    }

    /// Declaration-level expression containing `offset`: a field or
    /// property initializer, a parameter default or an enum member value.
    pub fn initializer_at(&self, offset: TextSize) -> Option<&Expr> {
        let classes = self.classes.iter().flat_map(|class| {
            let fields = class.fields.iter().filter_map(|f| f.init.as_ref());
            let properties = class.properties.iter().filter_map(|p| p.init.as_ref());
            let methods = class
                .methods
                .iter()
                .flat_map(|m| param_defaults(&m.params));
            let constructors = class
                .constructors
                .iter()
                .flat_map(|c| param_defaults(&c.params));
            fields.chain(properties).chain(methods).chain(constructors)
        });
        let signatures = self
            .interfaces
            .iter()
            .flat_map(|i| &i.methods)
            .flat_map(|sig| param_defaults(&sig.params));
        let functions = self
            .functions
            .iter()
            .chain(self.enum_extensions.iter().flat_map(|e| &e.methods))
            .flat_map(|f| param_defaults(&f.params));
        let delegates = self
            .delegates
            .iter()
            .flat_map(|d| param_defaults(&d.params));
        let enum_values = self
            .enums
            .iter()
            .flat_map(|e| &e.members)
            .filter_map(|m| m.value.as_ref());

        classes
            .chain(signatures)
            .chain(functions)
            .chain(delegates)
            .chain(enum_values)
            .find(|expr| expr.span().contains(offset))
    }
}

fn param_defaults(params: &[Param]) -> impl Iterator<Item = &Expr> {
    params.iter().filter_map(|p| p.default.as_ref())
}
