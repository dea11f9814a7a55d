//! Parser for the terse notation
//!
//! This module provides the reference frontend used by the document pipeline:
//! - **logos** for fast lexing
//! - a resilient recursive-descent parser producing the immutable AST in
//!   [`crate::syntax`]
//!
//! ## Architecture
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind (+ lexical errors)
//!     ↓
//! Parser → Module AST (+ syntax errors), always produced
//!     ↓
//! HIR → binding, resolution
//! ```
//!
//! Errors never abort parsing: each one is recorded and the parser skips to
//! the next synchronizing token, so a half-typed document still yields an AST
//! for editor features.

#[allow(clippy::module_inception)]
mod parser;

mod lexer;
mod syntax_kind;

pub use lexer::{Lexed, Token, tokenize};
pub use parser::{Parse, parse};
pub use syntax_kind::SyntaxKind;

use text_size::TextRange;

/// Where an error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    Lexical,
    Syntax,
}

/// A lexical or syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, message: impl Into<String>, range: TextRange) -> Self {
        Self {
            kind,
            message: message.into(),
            range,
        }
    }
}

/// Lex and parse in one go. Lexical errors come first in the returned list.
pub fn parse_text(source: &str) -> Parse {
    let lexed = tokenize(source);
    let mut parse = parse(source, &lexed.tokens);
    let mut errors = lexed.errors;
    errors.append(&mut parse.errors);
    parse.errors = errors;
    parse
}
