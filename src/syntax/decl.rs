//! Borrowed views over declarations and members.
//!
//! Lookups hand these out instead of cloning AST nodes; they live as long as
//! the snapshot that owns the [`Module`].

use smol_str::SmolStr;

use super::ast::*;
use super::TypeExpr;
use crate::base::Span;

/// What kind of symbol a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Class,
    Interface,
    Enum,
    EnumMember,
    Delegate,
    Function,
    Method,
    Constructor,
    Field,
    Property,
    Event,
    Parameter,
    Local,
}

impl SymbolKind {
    pub fn display(&self) -> &'static str {
        match self {
            SymbolKind::Class => "class",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::EnumMember => "enum member",
            SymbolKind::Delegate => "delegate",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Field => "field",
            SymbolKind::Property => "property",
            SymbolKind::Event => "event",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Local => "local",
        }
    }

    pub fn is_type(&self) -> bool {
        matches!(
            self,
            SymbolKind::Class | SymbolKind::Interface | SymbolKind::Enum | SymbolKind::Delegate
        )
    }
}

/// A top-level declaration.
#[derive(Debug, Clone, Copy)]
pub enum DeclRef<'a> {
    Class(&'a ClassDecl),
    Interface(&'a InterfaceDecl),
    Enum(&'a EnumDecl),
    Function(&'a FunctionDecl),
    Delegate(&'a DelegateDecl),
}

impl<'a> DeclRef<'a> {
    pub fn name(&self) -> &'a Ident {
        match self {
            DeclRef::Class(c) => &c.name,
            DeclRef::Interface(i) => &i.name,
            DeclRef::Enum(e) => &e.name,
            DeclRef::Function(f) => &f.name,
            DeclRef::Delegate(d) => &d.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            DeclRef::Class(c) => c.span,
            DeclRef::Interface(i) => i.span,
            DeclRef::Enum(e) => e.span,
            DeclRef::Function(f) => f.span,
            DeclRef::Delegate(d) => d.span,
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            DeclRef::Class(c) => c.visibility,
            DeclRef::Interface(i) => i.visibility,
            DeclRef::Enum(e) => e.visibility,
            DeclRef::Function(f) => f.visibility,
            DeclRef::Delegate(d) => d.visibility,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            DeclRef::Class(_) => SymbolKind::Class,
            DeclRef::Interface(_) => SymbolKind::Interface,
            DeclRef::Enum(_) => SymbolKind::Enum,
            DeclRef::Function(_) => SymbolKind::Function,
            DeclRef::Delegate(_) => SymbolKind::Delegate,
        }
    }

    pub fn doc(&self) -> Option<&'a SmolStr> {
        match self {
            DeclRef::Class(c) => c.doc.as_ref(),
            DeclRef::Interface(i) => i.doc.as_ref(),
            DeclRef::Enum(e) => e.doc.as_ref(),
            DeclRef::Function(f) => f.doc.as_ref(),
            DeclRef::Delegate(d) => d.doc.as_ref(),
        }
    }

    /// One-line signature used by hover and completion details.
    pub fn signature(&self) -> String {
        match self {
            DeclRef::Class(c) => {
                let mut sig = format!("{} {}", c.kind.keyword(), c.name.name);
                if !c.type_params.is_empty() {
                    let params: Vec<&str> = c.type_params.iter().map(|p| p.name.as_str()).collect();
                    sig.push_str(&format!("<{}>", params.join(", ")));
                }
                if let Some(base) = &c.base {
                    sig.push_str(" extends ");
                    sig.push_str(&base.text);
                }
                if !c.interfaces.is_empty() {
                    let names: Vec<&str> = c.interfaces.iter().map(|i| i.text.as_str()).collect();
                    sig.push_str(" implements ");
                    sig.push_str(&names.join(", "));
                }
                sig
            }
            DeclRef::Interface(i) => {
                let mut sig = format!("interface {}", i.name.name);
                if !i.bases.is_empty() {
                    let names: Vec<&str> = i.bases.iter().map(|b| b.text.as_str()).collect();
                    sig.push_str(" extends ");
                    sig.push_str(&names.join(", "));
                }
                sig
            }
            DeclRef::Enum(e) => format!("enum {}", e.name.name),
            DeclRef::Function(f) => {
                function_signature(&f.name.name, &f.params, f.return_type.as_ref())
            }
            DeclRef::Delegate(d) => format!(
                "delegate {}",
                function_signature(&d.name.name, &d.params, d.return_type.as_ref())
                    .trim_start_matches("fn ")
            ),
        }
    }
}

/// A member found on a type, user-declared or built in.
#[derive(Debug, Clone)]
pub enum MemberRef<'a> {
    Field(&'a FieldDecl),
    Property(&'a PropertyDecl),
    Method(&'a FunctionDecl),
    Signature(&'a MethodSignature),
    Event(&'a EventDecl),
    EnumMember {
        owner: &'a EnumDecl,
        member: &'a EnumMember,
    },
    Builtin {
        name: &'static str,
        ty: TypeExpr,
        is_method: bool,
    },
}

impl<'a> MemberRef<'a> {
    pub fn name(&self) -> &str {
        match self {
            MemberRef::Field(f) => &f.name.name,
            MemberRef::Property(p) => &p.name.name,
            MemberRef::Method(m) => &m.name.name,
            MemberRef::Signature(s) => &s.name.name,
            MemberRef::Event(e) => &e.name.name,
            MemberRef::EnumMember { member, .. } => &member.name.name,
            MemberRef::Builtin { name, .. } => name,
        }
    }

    /// Declaration site; built-in members have none.
    pub fn name_span(&self) -> Option<Span> {
        match self {
            MemberRef::Field(f) => Some(f.name.span),
            MemberRef::Property(p) => Some(p.name.span),
            MemberRef::Method(m) => Some(m.name.span),
            MemberRef::Signature(s) => Some(s.name.span),
            MemberRef::Event(e) => Some(e.name.span),
            MemberRef::EnumMember { member, .. } => Some(member.name.span),
            MemberRef::Builtin { .. } => None,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            MemberRef::Field(_) => SymbolKind::Field,
            MemberRef::Property(_) => SymbolKind::Property,
            MemberRef::Method(_) | MemberRef::Signature(_) => SymbolKind::Method,
            MemberRef::Event(_) => SymbolKind::Event,
            MemberRef::EnumMember { .. } => SymbolKind::EnumMember,
            MemberRef::Builtin { is_method, .. } => {
                if *is_method {
                    SymbolKind::Method
                } else {
                    SymbolKind::Property
                }
            }
        }
    }

    pub fn visibility(&self) -> Visibility {
        match self {
            MemberRef::Field(f) => f.visibility,
            MemberRef::Property(p) => p.visibility,
            MemberRef::Method(m) => m.visibility,
            MemberRef::Event(e) => e.visibility,
            MemberRef::Signature(_) | MemberRef::EnumMember { .. } | MemberRef::Builtin { .. } => {
                Visibility::Public
            }
        }
    }

    pub fn is_method(&self) -> bool {
        self.kind() == SymbolKind::Method
    }

    pub fn doc(&self) -> Option<&'a SmolStr> {
        match self {
            MemberRef::Field(f) => f.doc.as_ref(),
            MemberRef::Property(p) => p.doc.as_ref(),
            MemberRef::Method(m) => m.doc.as_ref(),
            MemberRef::Signature(s) => s.doc.as_ref(),
            MemberRef::Event(e) => e.doc.as_ref(),
            MemberRef::EnumMember { .. } | MemberRef::Builtin { .. } => None,
        }
    }

    /// The declared type: field/property/event type or method return type.
    ///
    /// Methods without a return type are `void`. Enum members have their
    /// enum's type.
    pub fn declared_type(&self) -> Option<TypeExpr> {
        match self {
            MemberRef::Field(f) => f
                .ty
                .as_ref()
                .map(|t| t.expr.clone())
                .or_else(|| literal_type(f.init.as_ref())),
            MemberRef::Property(p) => p
                .ty
                .as_ref()
                .map(|t| t.expr.clone())
                .or_else(|| literal_type(p.init.as_ref())),
            MemberRef::Event(e) => e.ty.as_ref().map(|t| t.expr.clone()),
            MemberRef::Method(m) => Some(return_type(m.return_type.as_ref())),
            MemberRef::Signature(s) => Some(return_type(s.return_type.as_ref())),
            MemberRef::EnumMember { owner, .. } => Some(TypeExpr::named(owner.name.name.clone())),
            MemberRef::Builtin { ty, .. } => Some(ty.clone()),
        }
    }

    /// One-line signature used by hover and completion details.
    pub fn signature(&self) -> String {
        match self {
            MemberRef::Field(f) => {
                let keyword = if f.is_const {
                    "const"
                } else if f.mutable {
                    "var"
                } else {
                    "let"
                };
                typed_signature(keyword, &f.name.name, f.ty.as_ref())
            }
            MemberRef::Property(p) => typed_signature("prop", &p.name.name, p.ty.as_ref()),
            MemberRef::Event(e) => typed_signature("event", &e.name.name, e.ty.as_ref()),
            MemberRef::Method(m) => {
                function_signature(&m.name.name, &m.params, m.return_type.as_ref())
            }
            MemberRef::Signature(s) => {
                function_signature(&s.name.name, &s.params, s.return_type.as_ref())
            }
            MemberRef::EnumMember { owner, member } => {
                format!("{}.{}", owner.name.name, member.name.name)
            }
            MemberRef::Builtin {
                name,
                ty,
                is_method,
            } => {
                if *is_method {
                    format!("fn {name}(..) -> {ty}")
                } else {
                    format!("prop {name}: {ty}")
                }
            }
        }
    }
}

fn return_type(ty: Option<&TypeRef>) -> TypeExpr {
    ty.map(|t| t.expr.clone())
        .unwrap_or_else(|| TypeExpr::named("void"))
}

/// Type of a literal initializer, used when a field omits its type.
pub fn literal_type(init: Option<&Expr>) -> Option<TypeExpr> {
    match init? {
        Expr::Literal { kind, .. } => kind.type_name().map(TypeExpr::named),
        Expr::New { ty, .. } => Some(ty.expr.clone()),
        _ => None,
    }
}

fn typed_signature(keyword: &str, name: &str, ty: Option<&TypeRef>) -> String {
    match ty {
        Some(ty) => format!("{keyword} {name}: {}", ty.text),
        None => format!("{keyword} {name}"),
    }
}

/// `fn name(a: int, b) -> T`
pub fn function_signature(name: &str, params: &[Param], ret: Option<&TypeRef>) -> String {
    let params: Vec<String> = params
        .iter()
        .map(|p| match &p.ty {
            Some(ty) => format!("{}: {}", p.name.name, ty.text),
            None => p.name.name.to_string(),
        })
        .collect();
    let mut sig = format!("fn {}({})", name, params.join(", "));
    if let Some(ret) = ret {
        sig.push_str(" -> ");
        sig.push_str(&ret.text);
    }
    sig
}

impl Module {
    /// Every top-level declaration in source-list order: classes, interfaces,
    /// enums, functions, delegates.
    pub fn declarations(&self) -> impl Iterator<Item = DeclRef<'_>> {
        self.classes
            .iter()
            .map(DeclRef::Class)
            .chain(self.interfaces.iter().map(DeclRef::Interface))
            .chain(self.enums.iter().map(DeclRef::Enum))
            .chain(self.functions.iter().map(DeclRef::Function))
            .chain(self.delegates.iter().map(DeclRef::Delegate))
    }

    /// First top-level declaration named `name`.
    pub fn find_declaration(&self, name: &str) -> Option<DeclRef<'_>> {
        self.declarations().find(|d| d.name().is(name))
    }
}

impl ClassDecl {
    /// Own members in declaration-kind order (fields, properties, methods,
    /// events). Constructors are not members.
    pub fn members(&self) -> impl Iterator<Item = MemberRef<'_>> {
        self.fields
            .iter()
            .map(MemberRef::Field)
            .chain(self.properties.iter().map(MemberRef::Property))
            .chain(self.methods.iter().map(MemberRef::Method))
            .chain(self.events.iter().map(MemberRef::Event))
    }

    /// First own member named `name`.
    pub fn member(&self, name: &str) -> Option<MemberRef<'_>> {
        self.members().find(|m| m.name() == name)
    }
}

impl EnumDecl {
    pub fn member(&self, name: &str) -> Option<MemberRef<'_>> {
        self.members
            .iter()
            .find(|m| m.name.is(name))
            .map(|member| MemberRef::EnumMember {
                owner: self,
                member,
            })
    }
}
