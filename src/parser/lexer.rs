//! Logos-based lexer for the terse notation
//!
//! Fast tokenization using the logos crate. Whitespace and plain comments are
//! dropped here; line breaks survive only as [`Token::newline_before`].

use super::syntax_kind::SyntaxKind;
use super::{SyntaxError, SyntaxErrorKind};
use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token with its kind and position. Owns no text; slice the source with
/// `range` to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
    /// A line break separates this token from the previous one.
    pub newline_before: bool,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source
            .get(std::ops::Range::<usize>::from(self.range))
            .unwrap_or("")
    }
}

/// Lexer output: every token plus the lexical errors met on the way.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<SyntaxError>,
}

/// Tokenize an entire string. Never stops early: bad input becomes an
/// [`SyntaxKind::Error`] token plus an error.
pub fn tokenize(input: &str) -> Lexed {
    let mut lexed = Lexed::default();
    let mut lexer = LogosToken::lexer(input);
    let mut newline_before = false;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let range = TextRange::new(
            TextSize::new(span.start as u32),
            TextSize::new(span.end as u32),
        );
        let kind = match result {
            Ok(LogosToken::Newline) => {
                newline_before = true;
                continue;
            }
            Ok(LogosToken::LineComment | LogosToken::BlockComment) => continue,
            Ok(LogosToken::UnterminatedString) => {
                lexed.errors.push(SyntaxError::new(
                    SyntaxErrorKind::Lexical,
                    "unterminated string literal",
                    range,
                ));
                SyntaxKind::String
            }
            Ok(token) => token.into(),
            Err(()) => {
                lexed.errors.push(SyntaxError::new(
                    SyntaxErrorKind::Lexical,
                    format!("unexpected character `{}`", lexer.slice()),
                    range,
                ));
                SyntaxKind::Error
            }
        };
        lexed.tokens.push(Token {
            kind,
            range,
            newline_before,
        });
        newline_before = false;
    }

    lexed
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[token("\n")]
    Newline,

    #[regex(r"//([^/\n][^\n]*)?")]
    LineComment,

    #[regex(r"/\*([^*]|\*[^/])*\*/")]
    BlockComment,

    #[regex(r"///[^\n]*")]
    DocComment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9][0-9_]*")]
    Integer,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*")]
    Float,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,

    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedString,

    #[regex(r"'([^'\\\n]|\\.)'")]
    Char,

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    #[token("use")]
    Use,
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("record")]
    Record,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("extend")]
    Extend,
    #[token("delegate")]
    Delegate,
    #[token("fn")]
    Fn,
    #[token("new")]
    New,
    #[token("let")]
    Let,
    #[token("var")]
    Var,
    #[token("const")]
    Const,
    #[token("prop")]
    Prop,
    #[token("event")]
    Event,
    #[token("pub")]
    Pub,
    #[token("priv")]
    Priv,
    #[token("internal")]
    Internal,
    #[token("protected")]
    Protected,
    #[token("static")]
    Static,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("return")]
    Return,
    #[token("throw")]
    Throw,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("while")]
    While,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("match")]
    Match,
    #[token("this")]
    This,
    #[token("base")]
    Base,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[token("is")]
    Is,

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("..")]
    DotDot,
    #[token("=>")]
    FatArrow,
    #[token("->")]
    Arrow,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("??")]
    QuestionQuestion,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("|")]
    Pipe,
    #[token("?")]
    Question,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            // Trivia is filtered out in `tokenize` before conversion.
            LogosToken::Newline | LogosToken::LineComment | LogosToken::BlockComment => {
                SyntaxKind::Error
            }
            LogosToken::DocComment => SyntaxKind::DocComment,
            LogosToken::Ident => SyntaxKind::Ident,
            LogosToken::Integer => SyntaxKind::IntNumber,
            LogosToken::Float => SyntaxKind::FloatNumber,
            LogosToken::String | LogosToken::UnterminatedString => SyntaxKind::String,
            LogosToken::Char => SyntaxKind::Char,
            LogosToken::Use => SyntaxKind::UseKw,
            LogosToken::Class => SyntaxKind::ClassKw,
            LogosToken::Struct => SyntaxKind::StructKw,
            LogosToken::Record => SyntaxKind::RecordKw,
            LogosToken::Interface => SyntaxKind::InterfaceKw,
            LogosToken::Enum => SyntaxKind::EnumKw,
            LogosToken::Extend => SyntaxKind::ExtendKw,
            LogosToken::Delegate => SyntaxKind::DelegateKw,
            LogosToken::Fn => SyntaxKind::FnKw,
            LogosToken::New => SyntaxKind::NewKw,
            LogosToken::Let => SyntaxKind::LetKw,
            LogosToken::Var => SyntaxKind::VarKw,
            LogosToken::Const => SyntaxKind::ConstKw,
            LogosToken::Prop => SyntaxKind::PropKw,
            LogosToken::Event => SyntaxKind::EventKw,
            LogosToken::Pub => SyntaxKind::PubKw,
            LogosToken::Priv => SyntaxKind::PrivKw,
            LogosToken::Internal => SyntaxKind::InternalKw,
            LogosToken::Protected => SyntaxKind::ProtectedKw,
            LogosToken::Static => SyntaxKind::StaticKw,
            LogosToken::Extends => SyntaxKind::ExtendsKw,
            LogosToken::Implements => SyntaxKind::ImplementsKw,
            LogosToken::Return => SyntaxKind::ReturnKw,
            LogosToken::Throw => SyntaxKind::ThrowKw,
            LogosToken::Break => SyntaxKind::BreakKw,
            LogosToken::Continue => SyntaxKind::ContinueKw,
            LogosToken::If => SyntaxKind::IfKw,
            LogosToken::Else => SyntaxKind::ElseKw,
            LogosToken::For => SyntaxKind::ForKw,
            LogosToken::In => SyntaxKind::InKw,
            LogosToken::While => SyntaxKind::WhileKw,
            LogosToken::Try => SyntaxKind::TryKw,
            LogosToken::Catch => SyntaxKind::CatchKw,
            LogosToken::Finally => SyntaxKind::FinallyKw,
            LogosToken::Match => SyntaxKind::MatchKw,
            LogosToken::This => SyntaxKind::ThisKw,
            LogosToken::Base => SyntaxKind::BaseKw,
            LogosToken::True => SyntaxKind::TrueKw,
            LogosToken::False => SyntaxKind::FalseKw,
            LogosToken::Null => SyntaxKind::NullKw,
            LogosToken::Is => SyntaxKind::IsKw,
            LogosToken::DotDot => SyntaxKind::DotDot,
            LogosToken::FatArrow => SyntaxKind::FatArrow,
            LogosToken::Arrow => SyntaxKind::Arrow,
            LogosToken::EqEq => SyntaxKind::EqEq,
            LogosToken::BangEq => SyntaxKind::BangEq,
            LogosToken::LtEq => SyntaxKind::LtEq,
            LogosToken::GtEq => SyntaxKind::GtEq,
            LogosToken::AmpAmp => SyntaxKind::AmpAmp,
            LogosToken::PipePipe => SyntaxKind::PipePipe,
            LogosToken::QuestionQuestion => SyntaxKind::QuestionQuestion,
            LogosToken::PlusEq => SyntaxKind::PlusEq,
            LogosToken::MinusEq => SyntaxKind::MinusEq,
            LogosToken::LBrace => SyntaxKind::LBrace,
            LogosToken::RBrace => SyntaxKind::RBrace,
            LogosToken::LParen => SyntaxKind::LParen,
            LogosToken::RParen => SyntaxKind::RParen,
            LogosToken::LBracket => SyntaxKind::LBracket,
            LogosToken::RBracket => SyntaxKind::RBracket,
            LogosToken::Semicolon => SyntaxKind::Semicolon,
            LogosToken::Colon => SyntaxKind::Colon,
            LogosToken::Comma => SyntaxKind::Comma,
            LogosToken::Dot => SyntaxKind::Dot,
            LogosToken::Eq => SyntaxKind::Eq,
            LogosToken::Lt => SyntaxKind::Lt,
            LogosToken::Gt => SyntaxKind::Gt,
            LogosToken::Plus => SyntaxKind::Plus,
            LogosToken::Minus => SyntaxKind::Minus,
            LogosToken::Star => SyntaxKind::Star,
            LogosToken::Slash => SyntaxKind::Slash,
            LogosToken::Percent => SyntaxKind::Percent,
            LogosToken::Bang => SyntaxKind::Bang,
            LogosToken::Pipe => SyntaxKind::Pipe,
            LogosToken::Question => SyntaxKind::Question,
        }
    }
}
