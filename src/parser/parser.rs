//! Recursive descent parser for the terse notation
//!
//! Builds the AST from tokens. Supports error recovery: every error is
//! recorded and parsing continues, so the returned [`Module`] is always
//! usable, if partial.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::lexer::Token;
use super::syntax_kind::SyntaxKind;
use super::{SyntaxError, SyntaxErrorKind};
use crate::base::{LineIndex, Span};
use crate::syntax::*;

/// Nesting limit for blocks, expressions and patterns.
const MAX_DEPTH: u32 = 200;

/// Parse result: the module (always present) and any syntax errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub module: Module,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a token stream produced by [`super::tokenize`] over `source`.
pub fn parse(source: &str, tokens: &[Token]) -> Parse {
    let mut parser = Parser::new(source, tokens);
    let module = parser.parse_module();
    Parse {
        module,
        errors: parser.errors,
    }
}

/// The parser state
struct Parser<'a> {
    source: &'a str,
    /// Tokens without doc comments.
    tokens: Vec<Token>,
    /// Doc comment text attached to the token at the same index.
    docs: Vec<Option<SmolStr>>,
    pos: usize,
    line_index: LineIndex,
    errors: Vec<SyntaxError>,
    depth: u32,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, raw: &[Token]) -> Self {
        let mut tokens = Vec::with_capacity(raw.len());
        let mut docs = Vec::with_capacity(raw.len());
        let mut pending_doc: Vec<&str> = Vec::new();
        for token in raw {
            if token.kind == SyntaxKind::DocComment {
                let text = token.text(source).trim_start_matches('/');
                pending_doc.push(text.strip_prefix(' ').unwrap_or(text));
                continue;
            }
            docs.push(if pending_doc.is_empty() {
                None
            } else {
                Some(SmolStr::new(pending_doc.join("\n")))
            });
            pending_doc.clear();
            tokens.push(*token);
        }
        Self {
            source,
            tokens,
            docs,
            pos: 0,
            line_index: LineIndex::new(source),
            errors: Vec::new(),
            depth: 0,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::Eof)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        self.peek() == kind
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn current_text(&self) -> &'a str {
        self.current().map(|t| t.text(self.source)).unwrap_or("")
    }

    /// Whether a line break precedes the current token.
    fn at_line_start(&self) -> bool {
        self.current().is_some_and(|t| t.newline_before)
    }

    fn current_start(&self) -> TextSize {
        match self.current() {
            Some(t) => t.range.start(),
            None => TextSize::new(self.source.len() as u32),
        }
    }

    fn current_range(&self) -> TextRange {
        match self.current() {
            Some(t) => t.range,
            None => TextRange::empty(TextSize::new(self.source.len() as u32)),
        }
    }

    /// End of the last consumed token.
    fn prev_end(&self) -> TextSize {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map(|t| t.range.end())
            .unwrap_or_default()
    }

    fn current_doc(&self) -> Option<SmolStr> {
        self.docs.get(self.pos).cloned().flatten()
    }

    fn span(&self, range: TextRange) -> Span {
        self.line_index.span(range)
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: TextSize) -> Span {
        let end = self.prev_end().max(start);
        self.span(TextRange::new(start, end))
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Option<Token> {
        let token = self.current().copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!(
                "expected {}, found {}",
                kind.describe(),
                self.peek().describe()
            ));
            false
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        let range = self.current_range();
        self.errors
            .push(SyntaxError::new(SyntaxErrorKind::Syntax, message, range));
    }

    fn ident(&mut self) -> Option<Ident> {
        if self.at(SyntaxKind::Ident) {
            let token = self.bump()?;
            Some(Ident::new(token.text(self.source), self.span(token.range)))
        } else {
            self.error(format!("expected identifier, found {}", self.peek().describe()));
            None
        }
    }

    /// Identifier, or an empty placeholder name at the current position.
    fn ident_or_missing(&mut self) -> Ident {
        match self.ident() {
            Some(ident) => ident,
            None => Ident::new("", self.span(TextRange::empty(self.prev_end()))),
        }
    }

    fn enter(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            self.error("nesting too deep");
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Skip tokens until one satisfying `stop` (or EOF). Always skips at least one.
    fn recover_until(&mut self, stop: impl Fn(SyntaxKind) -> bool) {
        self.bump();
        while !self.at_eof() && !stop(self.peek()) {
            self.bump();
        }
    }

    // =========================================================================
    // Module & declarations
    // =========================================================================

    fn parse_module(&mut self) -> Module {
        let mut module = Module {
            span: self.span(TextRange::up_to(TextSize::new(self.source.len() as u32))),
            ..Module::default()
        };

        while !self.at_eof() {
            let before = self.pos;
            self.parse_item(&mut module);
            if self.pos == before {
                self.error(format!("expected declaration, found {}", self.peek().describe()));
                self.recover_until(SyntaxKind::starts_declaration);
            }
        }

        module
    }

    fn parse_item(&mut self, module: &mut Module) {
        let doc = self.current_doc();
        let start = self.current_start();
        if self.eat(SyntaxKind::Semicolon) {
            return;
        }
        let before = self.pos;
        let visibility = self.parse_visibility();
        self.eat(SyntaxKind::StaticKw);

        match self.peek() {
            SyntaxKind::UseKw => {
                if let Some(using) = self.parse_using(start) {
                    module.usings.push(using);
                }
            }
            SyntaxKind::ClassKw | SyntaxKind::StructKw | SyntaxKind::RecordKw => {
                let class = self.parse_class(start, visibility, doc);
                module.classes.push(class);
            }
            SyntaxKind::InterfaceKw => {
                let interface = self.parse_interface(start, visibility, doc);
                module.interfaces.push(interface);
            }
            SyntaxKind::EnumKw => {
                let decl = self.parse_enum(start, visibility, doc);
                module.enums.push(decl);
            }
            SyntaxKind::ExtendKw => {
                let ext = self.parse_extension(start);
                module.enum_extensions.push(ext);
            }
            SyntaxKind::DelegateKw => {
                let delegate = self.parse_delegate(start, visibility, doc);
                module.delegates.push(delegate);
            }
            SyntaxKind::FnKw => {
                let function = self.parse_function(start, visibility, false, doc);
                module.functions.push(function);
            }
            _ => {
                if self.pos != before {
                    self.error(format!(
                        "expected declaration after modifiers, found {}",
                        self.peek().describe()
                    ));
                }
            }
        }
    }

    fn parse_visibility(&mut self) -> Visibility {
        let visibility = match self.peek() {
            SyntaxKind::PubKw => Visibility::Public,
            SyntaxKind::PrivKw => Visibility::Private,
            SyntaxKind::InternalKw => Visibility::Internal,
            SyntaxKind::ProtectedKw => Visibility::Protected,
            _ => return Visibility::default(),
        };
        self.bump();
        visibility
    }

    fn parse_using(&mut self, start: TextSize) -> Option<Using> {
        self.bump();
        let first = self.ident()?;
        let mut path = first.name.to_string();
        while self.at(SyntaxKind::Dot) && self.nth(1) == SyntaxKind::Ident {
            self.bump();
            path.push('.');
            path.push_str(self.current_text());
            self.bump();
        }
        self.eat(SyntaxKind::Semicolon);
        Some(Using {
            path: SmolStr::new(path),
            span: self.span_from(start),
        })
    }

    fn parse_type_params(&mut self) -> Vec<Ident> {
        let mut params = Vec::new();
        if !self.eat(SyntaxKind::Lt) {
            return params;
        }
        while let Some(ident) = self.ident() {
            params.push(ident);
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::Gt);
        params
    }

    fn parse_type_list(&mut self) -> Vec<TypeRef> {
        let mut types = Vec::new();
        while let Some(ty) = self.parse_type() {
            types.push(ty);
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        types
    }

    fn parse_class(
        &mut self,
        start: TextSize,
        visibility: Visibility,
        doc: Option<SmolStr>,
    ) -> ClassDecl {
        let kind = match self.bump().map(|t| t.kind) {
            Some(SyntaxKind::StructKw) => ClassKind::Struct,
            Some(SyntaxKind::RecordKw) => ClassKind::Record,
            _ => ClassKind::Class,
        };
        let name = self.ident_or_missing();
        let type_params = self.parse_type_params();
        let base = if self.eat(SyntaxKind::ExtendsKw) {
            self.parse_type()
        } else {
            None
        };
        let interfaces = if self.eat(SyntaxKind::ImplementsKw) {
            self.parse_type_list()
        } else {
            Vec::new()
        };

        let mut class = ClassDecl {
            name,
            kind,
            visibility,
            type_params,
            base,
            interfaces,
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            events: Vec::new(),
            doc,
            span: Span::default(),
        };

        if self.expect(SyntaxKind::LBrace) {
            while !self.at(SyntaxKind::RBrace) && !self.at_eof() {
                let before = self.pos;
                self.parse_member(&mut class);
                if self.pos == before {
                    self.error(format!("expected member, found {}", self.peek().describe()));
                    self.recover_until(|k| {
                        k == SyntaxKind::RBrace
                            || k.starts_declaration()
                            || matches!(
                                k,
                                SyntaxKind::LetKw
                                    | SyntaxKind::VarKw
                                    | SyntaxKind::ConstKw
                                    | SyntaxKind::PropKw
                                    | SyntaxKind::EventKw
                                    | SyntaxKind::NewKw
                            )
                    });
                }
            }
            self.expect(SyntaxKind::RBrace);
        }

        class.span = self.span_from(start);
        class
    }

    fn parse_member(&mut self, class: &mut ClassDecl) {
        let doc = self.current_doc();
        let start = self.current_start();
        if self.eat(SyntaxKind::Semicolon) {
            return;
        }
        let visibility = self.parse_visibility();
        let is_static = self.eat(SyntaxKind::StaticKw);

        match self.peek() {
            SyntaxKind::LetKw | SyntaxKind::VarKw | SyntaxKind::ConstKw => {
                let keyword = self.peek();
                self.bump();
                let name = self.ident_or_missing();
                let ty = self.parse_type_annotation();
                let init = self.parse_initializer();
                class.fields.push(FieldDecl {
                    name,
                    visibility,
                    mutable: keyword == SyntaxKind::VarKw,
                    is_const: keyword == SyntaxKind::ConstKw,
                    ty,
                    init,
                    doc,
                    span: self.span_from(start),
                });
            }
            SyntaxKind::PropKw => {
                self.bump();
                let name = self.ident_or_missing();
                let ty = self.parse_type_annotation();
                let init = self.parse_initializer();
                class.properties.push(PropertyDecl {
                    name,
                    visibility,
                    ty,
                    init,
                    doc,
                    span: self.span_from(start),
                });
            }
            SyntaxKind::EventKw => {
                self.bump();
                let name = self.ident_or_missing();
                let ty = self.parse_type_annotation();
                class.events.push(EventDecl {
                    name,
                    visibility,
                    ty,
                    doc,
                    span: self.span_from(start),
                });
            }
            SyntaxKind::FnKw => {
                let method = self.parse_function(start, visibility, is_static, doc);
                class.methods.push(method);
            }
            SyntaxKind::NewKw => {
                let keyword = self.bump().map(|t| self.span(t.range)).unwrap_or_default();
                let params = self.parse_params();
                let body = self.parse_block();
                class.constructors.push(ConstructorDecl {
                    keyword,
                    visibility,
                    params,
                    body,
                    span: self.span_from(start),
                });
            }
            _ => {}
        }
    }

    fn parse_type_annotation(&mut self) -> Option<TypeRef> {
        if self.eat(SyntaxKind::Colon) {
            self.parse_type()
        } else {
            None
        }
    }

    fn parse_initializer(&mut self) -> Option<Expr> {
        if self.eat(SyntaxKind::Eq) {
            Some(self.parse_expr())
        } else {
            None
        }
    }

    fn parse_function(
        &mut self,
        start: TextSize,
        visibility: Visibility,
        is_static: bool,
        doc: Option<SmolStr>,
    ) -> FunctionDecl {
        self.bump();
        let name = self.ident_or_missing();
        let type_params = self.parse_type_params();
        let params = self.parse_params();
        let return_type = if self.eat(SyntaxKind::Arrow) {
            self.parse_type()
        } else {
            None
        };
        let body = self.parse_block();
        FunctionDecl {
            name,
            visibility,
            is_static,
            type_params,
            params,
            return_type,
            body,
            doc,
            span: self.span_from(start),
        }
    }

    fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if !self.expect(SyntaxKind::LParen) {
            return params;
        }
        while !self.at(SyntaxKind::RParen) && !self.at_eof() {
            let start = self.current_start();
            let Some(name) = self.ident() else {
                self.recover_until(|k| {
                    matches!(k, SyntaxKind::Comma | SyntaxKind::RParen | SyntaxKind::LBrace)
                });
                if self.eat(SyntaxKind::Comma) {
                    continue;
                }
                break;
            };
            let ty = self.parse_type_annotation();
            let default = self.parse_initializer();
            params.push(Param {
                name,
                ty,
                default,
                span: self.span_from(start),
            });
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RParen);
        params
    }

    fn parse_interface(
        &mut self,
        start: TextSize,
        visibility: Visibility,
        doc: Option<SmolStr>,
    ) -> InterfaceDecl {
        self.bump();
        let name = self.ident_or_missing();
        let bases = if self.eat(SyntaxKind::ExtendsKw) {
            self.parse_type_list()
        } else {
            Vec::new()
        };
        let mut methods = Vec::new();
        if self.expect(SyntaxKind::LBrace) {
            while !self.at(SyntaxKind::RBrace) && !self.at_eof() {
                let sig_doc = self.current_doc();
                let sig_start = self.current_start();
                if self.eat(SyntaxKind::Semicolon) {
                    continue;
                }
                self.parse_visibility();
                if !self.eat(SyntaxKind::FnKw) {
                    self.error(format!(
                        "expected method signature, found {}",
                        self.peek().describe()
                    ));
                    self.recover_until(|k| matches!(k, SyntaxKind::FnKw | SyntaxKind::RBrace));
                    continue;
                }
                let sig_name = self.ident_or_missing();
                let params = self.parse_params();
                let return_type = if self.eat(SyntaxKind::Arrow) {
                    self.parse_type()
                } else {
                    None
                };
                if self.at(SyntaxKind::LBrace) {
                    // Default bodies are accepted and ignored.
                    self.parse_block();
                }
                methods.push(MethodSignature {
                    name: sig_name,
                    params,
                    return_type,
                    doc: sig_doc,
                    span: self.span_from(sig_start),
                });
            }
            self.expect(SyntaxKind::RBrace);
        }
        InterfaceDecl {
            name,
            visibility,
            bases,
            methods,
            doc,
            span: self.span_from(start),
        }
    }

    fn parse_enum(
        &mut self,
        start: TextSize,
        visibility: Visibility,
        doc: Option<SmolStr>,
    ) -> EnumDecl {
        self.bump();
        let name = self.ident_or_missing();
        let mut members = Vec::new();
        if self.expect(SyntaxKind::LBrace) {
            while !self.at(SyntaxKind::RBrace) && !self.at_eof() {
                let member_start = self.current_start();
                let Some(member) = self.ident() else {
                    self.recover_until(|k| {
                        matches!(k, SyntaxKind::Comma | SyntaxKind::RBrace | SyntaxKind::Ident)
                    });
                    self.eat(SyntaxKind::Comma);
                    continue;
                };
                let value = self.parse_initializer();
                members.push(EnumMember {
                    name: member,
                    value,
                    span: self.span_from(member_start),
                });
                self.eat(SyntaxKind::Comma);
            }
            self.expect(SyntaxKind::RBrace);
        }
        EnumDecl {
            name,
            visibility,
            members,
            doc,
            span: self.span_from(start),
        }
    }

    fn parse_extension(&mut self, start: TextSize) -> EnumExtension {
        self.bump();
        let target = self.ident_or_missing();
        let mut methods = Vec::new();
        if self.expect(SyntaxKind::LBrace) {
            while !self.at(SyntaxKind::RBrace) && !self.at_eof() {
                let doc = self.current_doc();
                let method_start = self.current_start();
                if self.eat(SyntaxKind::Semicolon) {
                    continue;
                }
                let visibility = self.parse_visibility();
                let is_static = self.eat(SyntaxKind::StaticKw);
                if self.at(SyntaxKind::FnKw) {
                    methods.push(self.parse_function(method_start, visibility, is_static, doc));
                } else {
                    self.error(format!("expected `fn`, found {}", self.peek().describe()));
                    self.recover_until(|k| matches!(k, SyntaxKind::FnKw | SyntaxKind::RBrace));
                }
            }
            self.expect(SyntaxKind::RBrace);
        }
        EnumExtension {
            target,
            methods,
            span: self.span_from(start),
        }
    }

    fn parse_delegate(
        &mut self,
        start: TextSize,
        visibility: Visibility,
        doc: Option<SmolStr>,
    ) -> DelegateDecl {
        self.bump();
        let name = self.ident_or_missing();
        let params = self.parse_params();
        let return_type = if self.eat(SyntaxKind::Arrow) {
            self.parse_type()
        } else {
            None
        };
        self.eat(SyntaxKind::Semicolon);
        DelegateDecl {
            name,
            visibility,
            params,
            return_type,
            doc,
            span: self.span_from(start),
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// `A.B<T, U>[]?` or a tuple `(A, B)`.
    fn parse_type(&mut self) -> Option<TypeRef> {
        let start = self.current_start();
        let mut text = String::new();
        let mut names = Vec::new();
        if !self.parse_type_into(&mut text, &mut names) {
            return None;
        }
        Some(TypeRef::new(text, names, self.span_from(start)))
    }

    fn parse_type_into(&mut self, text: &mut String, names: &mut Vec<Ident>) -> bool {
        if !self.enter() {
            return false;
        }
        let ok = self.parse_type_inner(text, names);
        self.leave();
        ok
    }

    fn parse_type_inner(&mut self, text: &mut String, names: &mut Vec<Ident>) -> bool {
        if self.eat(SyntaxKind::LParen) {
            text.push('(');
            let mut first = true;
            while !self.at(SyntaxKind::RParen) && !self.at_eof() {
                if !first {
                    text.push_str(", ");
                }
                first = false;
                if !self.parse_type_into(text, names) || !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
            self.expect(SyntaxKind::RParen);
            text.push(')');
        } else {
            let Some(first) = self.ident() else {
                return false;
            };
            text.push_str(&first.name);
            names.push(first);
            while self.at(SyntaxKind::Dot) && self.nth(1) == SyntaxKind::Ident {
                self.bump();
                if let Some(segment) = self.ident() {
                    text.push('.');
                    text.push_str(&segment.name);
                    names.push(segment);
                }
            }
            if self.at(SyntaxKind::Lt) {
                self.bump();
                text.push('<');
                let mut first_arg = true;
                loop {
                    if !first_arg {
                        text.push_str(", ");
                    }
                    first_arg = false;
                    if !self.parse_type_into(text, names) || !self.eat(SyntaxKind::Comma) {
                        break;
                    }
                }
                self.expect(SyntaxKind::Gt);
                text.push('>');
            }
        }

        while self.at(SyntaxKind::LBracket) && self.nth(1) == SyntaxKind::RBracket {
            self.bump();
            self.bump();
            text.push_str("[]");
        }
        if self.at(SyntaxKind::Question) && !self.at_line_start() {
            self.bump();
            text.push('?');
        }
        true
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> Block {
        let start = self.current_start();
        if !self.expect(SyntaxKind::LBrace) {
            return Block {
                stmts: Vec::new(),
                span: self.span(TextRange::empty(start)),
            };
        }
        if !self.enter() {
            self.recover_until(|k| k == SyntaxKind::RBrace);
            self.eat(SyntaxKind::RBrace);
            return Block {
                stmts: Vec::new(),
                span: self.span_from(start),
            };
        }

        let mut stmts = Vec::new();
        while !self.at(SyntaxKind::RBrace) && !self.at_eof() {
            if self.peek().starts_declaration() {
                // A declaration keyword inside a body means a `}` went missing.
                break;
            }
            let before = self.pos;
            if let Some(stmt) = self.parse_stmt() {
                stmts.push(stmt);
            }
            if self.pos == before {
                self.error(format!("expected statement, found {}", self.peek().describe()));
                self.bump();
            }
        }
        self.leave();
        self.expect(SyntaxKind::RBrace);
        Block {
            stmts,
            span: self.span_from(start),
        }
    }

    fn parse_stmt(&mut self) -> Option<Stmt> {
        let start = self.current_start();
        let stmt = match self.peek() {
            SyntaxKind::Semicolon => {
                self.bump();
                return None;
            }
            SyntaxKind::LetKw | SyntaxKind::VarKw => {
                let mutable = self.at(SyntaxKind::VarKw);
                self.bump();
                let name = self.ident_or_missing();
                let ty = self.parse_type_annotation();
                let init = self.parse_initializer();
                Stmt::Binding(Binding {
                    name,
                    mutable,
                    ty,
                    init,
                    span: self.span_from(start),
                })
            }
            SyntaxKind::ReturnKw => {
                self.bump();
                let value = self.parse_optional_value();
                Stmt::Return {
                    value,
                    span: self.span_from(start),
                }
            }
            SyntaxKind::ThrowKw => {
                self.bump();
                let value = self.parse_optional_value();
                Stmt::Throw {
                    value,
                    span: self.span_from(start),
                }
            }
            SyntaxKind::BreakKw => {
                self.bump();
                Stmt::Break(self.span_from(start))
            }
            SyntaxKind::ContinueKw => {
                self.bump();
                Stmt::Continue(self.span_from(start))
            }
            SyntaxKind::IfKw => Stmt::If(self.parse_if(start)),
            SyntaxKind::ForKw => self.parse_for(start),
            SyntaxKind::WhileKw => {
                self.bump();
                let cond = self.parse_expr();
                let body = self.parse_block();
                Stmt::While {
                    cond,
                    body,
                    span: self.span_from(start),
                }
            }
            SyntaxKind::TryKw => Stmt::Try(self.parse_try(start)),
            SyntaxKind::MatchKw => Stmt::Match(self.parse_match(start)),
            SyntaxKind::LBrace => Stmt::Block(self.parse_block()),
            _ if self.at_expr_start() => Stmt::Expr(self.parse_expr()),
            _ => return None,
        };
        self.eat(SyntaxKind::Semicolon);
        Some(stmt)
    }

    /// Value after `return`/`throw`, only if it starts on the same line.
    fn parse_optional_value(&mut self) -> Option<Expr> {
        if self.at_expr_start() && !self.at_line_start() {
            Some(self.parse_expr())
        } else {
            None
        }
    }

    fn parse_if(&mut self, start: TextSize) -> IfStmt {
        self.bump();
        let mut branches = Vec::new();
        let cond = self.parse_expr();
        let body = self.parse_block();
        branches.push(IfBranch {
            cond,
            body,
            span: self.span_from(start),
        });

        let mut else_body = None;
        while self.at(SyntaxKind::ElseKw) {
            let branch_start = self.current_start();
            self.bump();
            if self.eat(SyntaxKind::IfKw) {
                let cond = self.parse_expr();
                let body = self.parse_block();
                branches.push(IfBranch {
                    cond,
                    body,
                    span: self.span_from(branch_start),
                });
            } else {
                else_body = Some(self.parse_block());
                break;
            }
        }

        IfStmt {
            branches,
            else_body,
            span: self.span_from(start),
        }
    }

    fn parse_for(&mut self, start: TextSize) -> Stmt {
        self.bump();
        if self.eat(SyntaxKind::LParen) {
            let key = self.ident_or_missing();
            self.expect(SyntaxKind::Comma);
            let value = self.ident_or_missing();
            self.expect(SyntaxKind::RParen);
            self.expect(SyntaxKind::InKw);
            let iterable = self.parse_expr();
            let body = self.parse_block();
            return Stmt::DictForeach(DictForeachStmt {
                key,
                value,
                iterable,
                body,
                span: self.span_from(start),
            });
        }

        let var = self.ident_or_missing();
        let ty = self.parse_type_annotation();
        self.expect(SyntaxKind::InKw);
        let first = self.parse_expr();
        if self.eat(SyntaxKind::DotDot) {
            let end = self.parse_expr();
            let body = self.parse_block();
            return Stmt::For(ForStmt {
                var,
                start: first,
                end,
                body,
                span: self.span_from(start),
            });
        }
        let body = self.parse_block();
        Stmt::Foreach(ForeachStmt {
            var,
            ty,
            iterable: first,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_try(&mut self, start: TextSize) -> TryStmt {
        self.bump();
        let body = self.parse_block();
        let mut catches = Vec::new();
        while self.at(SyntaxKind::CatchKw) {
            let catch_start = self.current_start();
            self.bump();
            let parenthesized = self.eat(SyntaxKind::LParen);
            let binding = if self.at(SyntaxKind::Ident) {
                self.ident()
            } else {
                None
            };
            let ty = self.parse_type_annotation();
            if parenthesized {
                self.expect(SyntaxKind::RParen);
            }
            let catch_body = self.parse_block();
            catches.push(CatchClause {
                binding,
                ty,
                body: catch_body,
                span: self.span_from(catch_start),
            });
        }
        let finally = if self.eat(SyntaxKind::FinallyKw) {
            Some(self.parse_block())
        } else {
            None
        };
        if catches.is_empty() && finally.is_none() {
            self.error("expected `catch` or `finally`");
        }
        TryStmt {
            body,
            catches,
            finally,
            span: self.span_from(start),
        }
    }

    fn parse_match(&mut self, start: TextSize) -> MatchStmt {
        self.bump();
        let scrutinee = self.parse_expr();
        let mut cases = Vec::new();
        if self.expect(SyntaxKind::LBrace) {
            while !self.at(SyntaxKind::RBrace) && !self.at_eof() {
                let case_start = self.current_start();
                let before = self.pos;
                let pattern = self.parse_pattern();
                let guard = if self.eat(SyntaxKind::IfKw) {
                    Some(self.parse_expr())
                } else {
                    None
                };
                if !self.expect(SyntaxKind::FatArrow) {
                    if self.pos == before {
                        self.bump();
                    }
                    self.recover_until(|k| matches!(k, SyntaxKind::Comma | SyntaxKind::RBrace));
                    self.eat(SyntaxKind::Comma);
                    continue;
                }
                let body = self.parse_case_body();
                self.eat(SyntaxKind::Comma);
                cases.push(MatchCase {
                    pattern,
                    guard,
                    body,
                    span: self.span_from(case_start),
                });
            }
            self.expect(SyntaxKind::RBrace);
        }
        MatchStmt {
            scrutinee,
            cases,
            span: self.span_from(start),
        }
    }

    /// Case body: a block, or a single statement wrapped into one.
    fn parse_case_body(&mut self) -> Block {
        if self.at(SyntaxKind::LBrace) {
            return self.parse_block();
        }
        let start = self.current_start();
        let stmts = self.parse_stmt().into_iter().collect();
        Block {
            stmts,
            span: self.span_from(start),
        }
    }

    // =========================================================================
    // Patterns
    // =========================================================================

    fn parse_pattern(&mut self) -> Pattern {
        if !self.enter() {
            let span = self.span(self.current_range());
            self.bump();
            return Pattern::Wildcard(span);
        }
        let pattern = self.parse_pattern_inner();
        self.leave();
        pattern
    }

    fn parse_pattern_inner(&mut self) -> Pattern {
        let start = self.current_start();
        match self.peek() {
            SyntaxKind::Ident if self.current_text() == "_" => {
                self.bump();
                Pattern::Wildcard(self.span_from(start))
            }
            SyntaxKind::VarKw => {
                self.bump();
                Pattern::Var(self.ident_or_missing())
            }
            SyntaxKind::IntNumber
            | SyntaxKind::FloatNumber
            | SyntaxKind::String
            | SyntaxKind::Char
            | SyntaxKind::TrueKw
            | SyntaxKind::FalseKw
            | SyntaxKind::NullKw => {
                let text = self.current_text();
                self.bump();
                Pattern::Literal {
                    text: SmolStr::new(text),
                    span: self.span_from(start),
                }
            }
            SyntaxKind::Minus
                if matches!(self.nth(1), SyntaxKind::IntNumber | SyntaxKind::FloatNumber) =>
            {
                self.bump();
                let text = format!("-{}", self.current_text());
                self.bump();
                Pattern::Literal {
                    text: SmolStr::new(text),
                    span: self.span_from(start),
                }
            }
            SyntaxKind::LParen => {
                let elements = self.parse_pattern_list(SyntaxKind::LParen, SyntaxKind::RParen);
                Pattern::Positional {
                    ty: None,
                    elements,
                    span: self.span_from(start),
                }
            }
            SyntaxKind::LBracket => {
                let elements = self.parse_pattern_list(SyntaxKind::LBracket, SyntaxKind::RBracket);
                Pattern::List {
                    elements,
                    span: self.span_from(start),
                }
            }
            SyntaxKind::LBrace => {
                let fields = self.parse_field_patterns();
                Pattern::Property {
                    ty: None,
                    fields,
                    span: self.span_from(start),
                }
            }
            SyntaxKind::Ident => self.parse_named_pattern(start),
            _ => {
                self.error(format!("expected pattern, found {}", self.peek().describe()));
                Pattern::Wildcard(self.span(TextRange::empty(start)))
            }
        }
    }

    fn parse_named_pattern(&mut self, start: TextSize) -> Pattern {
        let text = self.current_text();
        match (text, self.nth(1)) {
            ("Some" | "Ok" | "Err", SyntaxKind::LParen) => {
                self.bump();
                self.bump();
                let inner = Box::new(self.parse_pattern());
                self.expect(SyntaxKind::RParen);
                let span = self.span_from(start);
                match text {
                    "Some" => Pattern::Some { inner, span },
                    "Ok" => Pattern::Ok { inner, span },
                    _ => Pattern::Err { inner, span },
                }
            }
            (_, SyntaxKind::LParen | SyntaxKind::Lt) => {
                let ty = self.parse_type();
                let elements = self.parse_pattern_list(SyntaxKind::LParen, SyntaxKind::RParen);
                Pattern::Positional {
                    ty,
                    elements,
                    span: self.span_from(start),
                }
            }
            (_, SyntaxKind::LBrace) => {
                let ty = self.parse_type();
                let fields = self.parse_field_patterns();
                Pattern::Property {
                    ty,
                    fields,
                    span: self.span_from(start),
                }
            }
            (_, SyntaxKind::Dot) => {
                let mut path = String::new();
                loop {
                    path.push_str(self.current_text());
                    self.bump();
                    if self.at(SyntaxKind::Dot) && self.nth(1) == SyntaxKind::Ident {
                        self.bump();
                        path.push('.');
                    } else {
                        break;
                    }
                }
                Pattern::Literal {
                    text: SmolStr::new(path),
                    span: self.span_from(start),
                }
            }
            _ => Pattern::Variable(self.ident_or_missing()),
        }
    }

    fn parse_pattern_list(&mut self, open: SyntaxKind, close: SyntaxKind) -> Vec<Pattern> {
        let mut elements = Vec::new();
        if !self.expect(open) {
            return elements;
        }
        while !self.at(close) && !self.at_eof() {
            let before = self.pos;
            elements.push(self.parse_pattern());
            if self.pos == before {
                self.bump();
            }
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(close);
        elements
    }

    fn parse_field_patterns(&mut self) -> Vec<FieldPattern> {
        let mut fields = Vec::new();
        if !self.expect(SyntaxKind::LBrace) {
            return fields;
        }
        while !self.at(SyntaxKind::RBrace) && !self.at_eof() {
            let start = self.current_start();
            let Some(field) = self.ident() else {
                self.recover_until(|k| matches!(k, SyntaxKind::Comma | SyntaxKind::RBrace));
                self.eat(SyntaxKind::Comma);
                continue;
            };
            let pattern = if self.eat(SyntaxKind::Colon) {
                Some(self.parse_pattern())
            } else {
                None
            };
            fields.push(FieldPattern {
                field,
                pattern,
                span: self.span_from(start),
            });
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RBrace);
        fields
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn at_expr_start(&self) -> bool {
        matches!(
            self.peek(),
            SyntaxKind::Ident
                | SyntaxKind::IntNumber
                | SyntaxKind::FloatNumber
                | SyntaxKind::String
                | SyntaxKind::Char
                | SyntaxKind::TrueKw
                | SyntaxKind::FalseKw
                | SyntaxKind::NullKw
                | SyntaxKind::ThisKw
                | SyntaxKind::BaseKw
                | SyntaxKind::NewKw
                | SyntaxKind::LParen
                | SyntaxKind::LBracket
                | SyntaxKind::Bang
                | SyntaxKind::Minus
                | SyntaxKind::Pipe
                | SyntaxKind::PipePipe
        )
    }

    fn parse_expr(&mut self) -> Expr {
        if !self.enter() {
            let span = self.span(self.current_range());
            self.recover_until(|k| matches!(k, SyntaxKind::RBrace | SyntaxKind::Semicolon));
            return Expr::Error(span);
        }
        let expr = self.parse_assignment();
        self.leave();
        expr
    }

    fn parse_assignment(&mut self) -> Expr {
        let target = self.parse_binary(0);
        let op = match self.peek() {
            SyntaxKind::Eq => AssignOp::Assign,
            SyntaxKind::PlusEq => AssignOp::AddAssign,
            SyntaxKind::MinusEq => AssignOp::SubAssign,
            _ => return target,
        };
        self.bump();
        let value = self.parse_expr();
        let span = target.span().cover(value.span());
        Expr::Assign {
            op,
            target: Box::new(target),
            value: Box::new(value),
            span,
        }
    }

    /// Binary operator at the current token with its precedence.
    fn binary_op(&self) -> Option<(BinaryOp, u8)> {
        let op = match self.peek() {
            SyntaxKind::QuestionQuestion => (BinaryOp::Coalesce, 1),
            SyntaxKind::PipePipe => (BinaryOp::Or, 2),
            SyntaxKind::AmpAmp => (BinaryOp::And, 3),
            SyntaxKind::EqEq => (BinaryOp::Eq, 4),
            SyntaxKind::BangEq => (BinaryOp::NotEq, 4),
            SyntaxKind::Lt => (BinaryOp::Lt, 5),
            SyntaxKind::LtEq => (BinaryOp::LtEq, 5),
            SyntaxKind::Gt => (BinaryOp::Gt, 5),
            SyntaxKind::GtEq => (BinaryOp::GtEq, 5),
            SyntaxKind::Plus => (BinaryOp::Add, 6),
            SyntaxKind::Minus => (BinaryOp::Sub, 6),
            SyntaxKind::Star => (BinaryOp::Mul, 7),
            SyntaxKind::Slash => (BinaryOp::Div, 7),
            SyntaxKind::Percent => (BinaryOp::Rem, 7),
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Expr {
        let mut lhs = self.parse_unary();
        loop {
            if self.at(SyntaxKind::IsKw) && min_prec <= 5 {
                self.bump();
                let Some(ty) = self.parse_type() else {
                    break;
                };
                let span = lhs.span().cover(ty.span);
                lhs = Expr::Is {
                    value: Box::new(lhs),
                    ty,
                    span,
                };
                continue;
            }
            let Some((op, prec)) = self.binary_op() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(prec + 1);
            let span = lhs.span().cover(rhs.span());
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                span,
            };
        }
        lhs
    }

    fn parse_unary(&mut self) -> Expr {
        let start = self.current_start();
        let op = match self.peek() {
            SyntaxKind::Bang => UnaryOp::Not,
            SyntaxKind::Minus => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        self.bump();
        if !self.enter() {
            return Expr::Error(self.span_from(start));
        }
        let operand = self.parse_unary();
        self.leave();
        Expr::Unary {
            op,
            operand: Box::new(operand),
            span: self.span_from(start),
        }
    }

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            match self.peek() {
                SyntaxKind::Dot => {
                    self.bump();
                    // `a.` while typing: keep the receiver with an empty member.
                    let member = if self.at(SyntaxKind::Ident) && !self.at_line_start() {
                        self.ident_or_missing()
                    } else {
                        self.error("expected member name after `.`");
                        Ident::new("", self.span(TextRange::empty(self.prev_end())))
                    };
                    let span = expr.span().cover(member.span);
                    expr = Expr::Field {
                        target: Box::new(expr),
                        member,
                        span,
                    };
                }
                SyntaxKind::LParen if !self.at_line_start() => {
                    let args = self.parse_args();
                    let span = expr.span().cover(self.span_from(self.prev_end()));
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        span,
                    };
                }
                SyntaxKind::LBracket if !self.at_line_start() => {
                    self.bump();
                    let index = self.parse_expr();
                    self.expect(SyntaxKind::RBracket);
                    let span = expr.span().cover(self.span_from(self.prev_end()));
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                        span,
                    };
                }
                _ => break,
            }
        }
        expr
    }

    fn parse_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        self.expect(SyntaxKind::LParen);
        while !self.at(SyntaxKind::RParen) && !self.at_eof() {
            if !self.at_expr_start() {
                self.error(format!("expected argument, found {}", self.peek().describe()));
                break;
            }
            args.push(self.parse_expr());
            if !self.eat(SyntaxKind::Comma) {
                break;
            }
        }
        self.expect(SyntaxKind::RParen);
        args
    }

    fn parse_primary(&mut self) -> Expr {
        let start = self.current_start();
        let literal = match self.peek() {
            SyntaxKind::IntNumber => Some(LiteralKind::Int),
            SyntaxKind::FloatNumber => Some(LiteralKind::Float),
            SyntaxKind::String => Some(LiteralKind::String),
            SyntaxKind::Char => Some(LiteralKind::Char),
            SyntaxKind::TrueKw | SyntaxKind::FalseKw => Some(LiteralKind::Bool),
            SyntaxKind::NullKw => Some(LiteralKind::Null),
            _ => None,
        };
        if let Some(kind) = literal {
            let text = SmolStr::new(self.current_text());
            self.bump();
            return Expr::Literal {
                kind,
                text,
                span: self.span_from(start),
            };
        }

        match self.peek() {
            SyntaxKind::Ident => Expr::Ident(self.ident_or_missing()),
            SyntaxKind::ThisKw => {
                self.bump();
                Expr::This(self.span_from(start))
            }
            SyntaxKind::BaseKw => {
                self.bump();
                Expr::Base(self.span_from(start))
            }
            SyntaxKind::NewKw => {
                self.bump();
                let Some(ty) = self.parse_type() else {
                    return Expr::Error(self.span_from(start));
                };
                let args = if self.at(SyntaxKind::LParen) {
                    self.parse_args()
                } else {
                    Vec::new()
                };
                Expr::New {
                    ty,
                    args,
                    span: self.span_from(start),
                }
            }
            SyntaxKind::LParen => {
                self.bump();
                let inner = self.parse_expr();
                self.expect(SyntaxKind::RParen);
                Expr::Paren {
                    inner: Box::new(inner),
                    span: self.span_from(start),
                }
            }
            SyntaxKind::LBracket => {
                self.bump();
                let mut items = Vec::new();
                while !self.at(SyntaxKind::RBracket) && self.at_expr_start() {
                    items.push(self.parse_expr());
                    if !self.eat(SyntaxKind::Comma) {
                        break;
                    }
                }
                self.expect(SyntaxKind::RBracket);
                Expr::List {
                    items,
                    span: self.span_from(start),
                }
            }
            SyntaxKind::Pipe | SyntaxKind::PipePipe => self.parse_lambda(start),
            _ => {
                self.error(format!("expected expression, found {}", self.peek().describe()));
                let span = self.span(self.current_range());
                let keep = matches!(
                    self.peek(),
                    SyntaxKind::RBrace | SyntaxKind::RParen | SyntaxKind::RBracket | SyntaxKind::Eof
                ) || self.peek().starts_statement()
                    || self.peek().starts_declaration();
                if !keep {
                    self.bump();
                }
                Expr::Error(span)
            }
        }
    }

    fn parse_lambda(&mut self, start: TextSize) -> Expr {
        let mut params = Vec::new();
        if self.eat(SyntaxKind::Pipe) {
            while !self.at(SyntaxKind::Pipe) && !self.at_eof() {
                let param_start = self.current_start();
                let Some(name) = self.ident() else {
                    break;
                };
                let ty = self.parse_type_annotation();
                params.push(Param {
                    name,
                    ty,
                    default: None,
                    span: self.span_from(param_start),
                });
                if !self.eat(SyntaxKind::Comma) {
                    break;
                }
            }
            self.expect(SyntaxKind::Pipe);
        } else {
            self.bump();
        }
        let body = if self.at(SyntaxKind::LBrace) {
            LambdaBody::Block(self.parse_block())
        } else {
            LambdaBody::Expr(Box::new(self.parse_expr()))
        };
        Expr::Lambda {
            params,
            body,
            span: self.span_from(start),
        }
    }
}
