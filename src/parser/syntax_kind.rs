//! Token kinds for the terse notation.

/// Kind of a lexed token.
///
/// Trivia (whitespace, plain comments) never reaches the parser; line breaks
/// are folded into [`super::Token::newline_before`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // Literals & names
    Ident,
    IntNumber,
    FloatNumber,
    String,
    Char,
    DocComment,

    // Keywords
    UseKw,
    ClassKw,
    StructKw,
    RecordKw,
    InterfaceKw,
    EnumKw,
    ExtendKw,
    DelegateKw,
    FnKw,
    NewKw,
    LetKw,
    VarKw,
    ConstKw,
    PropKw,
    EventKw,
    PubKw,
    PrivKw,
    InternalKw,
    ProtectedKw,
    StaticKw,
    ExtendsKw,
    ImplementsKw,
    ReturnKw,
    ThrowKw,
    BreakKw,
    ContinueKw,
    IfKw,
    ElseKw,
    ForKw,
    InKw,
    WhileKw,
    TryKw,
    CatchKw,
    FinallyKw,
    MatchKw,
    ThisKw,
    BaseKw,
    TrueKw,
    FalseKw,
    NullKw,
    IsKw,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semicolon,
    Colon,
    Comma,
    Dot,
    DotDot,
    FatArrow,
    Arrow,
    Eq,
    EqEq,
    BangEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,
    Pipe,
    QuestionQuestion,
    Question,
    PlusEq,
    MinusEq,

    /// Unrecognized input; the lexer reports it and keeps going.
    Error,
    /// Synthetic end-of-input marker returned when peeking past the last token.
    Eof,
}

impl SyntaxKind {
    /// Reserved words, in the order of the variants above.
    pub const KEYWORDS: &'static [&'static str] = &[
        "use",
        "class",
        "struct",
        "record",
        "interface",
        "enum",
        "extend",
        "delegate",
        "fn",
        "new",
        "let",
        "var",
        "const",
        "prop",
        "event",
        "pub",
        "priv",
        "internal",
        "protected",
        "static",
        "extends",
        "implements",
        "return",
        "throw",
        "break",
        "continue",
        "if",
        "else",
        "for",
        "in",
        "while",
        "try",
        "catch",
        "finally",
        "match",
        "this",
        "base",
        "true",
        "false",
        "null",
        "is",
    ];

    pub fn is_keyword_text(text: &str) -> bool {
        Self::KEYWORDS.contains(&text)
    }

    /// Tokens that may start a top-level or member declaration.
    pub fn starts_declaration(self) -> bool {
        matches!(
            self,
            SyntaxKind::UseKw
                | SyntaxKind::ClassKw
                | SyntaxKind::StructKw
                | SyntaxKind::RecordKw
                | SyntaxKind::InterfaceKw
                | SyntaxKind::EnumKw
                | SyntaxKind::ExtendKw
                | SyntaxKind::DelegateKw
                | SyntaxKind::FnKw
                | SyntaxKind::PubKw
                | SyntaxKind::PrivKw
                | SyntaxKind::InternalKw
                | SyntaxKind::ProtectedKw
                | SyntaxKind::StaticKw
        )
    }

    /// Tokens that may start a statement other than an expression statement.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            SyntaxKind::LetKw
                | SyntaxKind::VarKw
                | SyntaxKind::ReturnKw
                | SyntaxKind::ThrowKw
                | SyntaxKind::BreakKw
                | SyntaxKind::ContinueKw
                | SyntaxKind::IfKw
                | SyntaxKind::ForKw
                | SyntaxKind::WhileKw
                | SyntaxKind::TryKw
                | SyntaxKind::MatchKw
        )
    }

    /// Human-readable name for diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            SyntaxKind::Ident => "identifier",
            SyntaxKind::IntNumber | SyntaxKind::FloatNumber => "number",
            SyntaxKind::String => "string",
            SyntaxKind::Char => "character",
            SyntaxKind::DocComment => "doc comment",
            SyntaxKind::LBrace => "`{`",
            SyntaxKind::RBrace => "`}`",
            SyntaxKind::LParen => "`(`",
            SyntaxKind::RParen => "`)`",
            SyntaxKind::LBracket => "`[`",
            SyntaxKind::RBracket => "`]`",
            SyntaxKind::Semicolon => "`;`",
            SyntaxKind::Colon => "`:`",
            SyntaxKind::Comma => "`,`",
            SyntaxKind::Dot => "`.`",
            SyntaxKind::DotDot => "`..`",
            SyntaxKind::FatArrow => "`=>`",
            SyntaxKind::Arrow => "`->`",
            SyntaxKind::Eq => "`=`",
            SyntaxKind::Gt => "`>`",
            SyntaxKind::Pipe => "`|`",
            SyntaxKind::InKw => "`in`",
            SyntaxKind::Eof => "end of file",
            SyntaxKind::Error => "invalid token",
            _ => "token",
        }
    }
}
