//! The frontend seam: tokenize, parse and bind behind one trait.
//!
//! The document pipeline talks to the language only through [`Frontend`].
//! [`NotationFrontend`] wires in this crate's lexer, parser and binder; other
//! implementations can be installed with [`super::Workspace::with_frontend`].
//! Any stage may panic; the pipeline catches it.

use super::bind::{self, BindError, BoundModule};
use crate::parser::{self, Lexed, Parse, Token};
use crate::syntax::Module;

pub trait Frontend: Send + Sync {
    fn tokenize(&self, text: &str) -> Lexed;

    /// Must produce a module even when `tokens` came with lexical errors.
    fn parse(&self, text: &str, tokens: &[Token]) -> Parse;

    fn bind(&self, module: &Module) -> Result<BoundModule, BindError>;
}

/// The built-in frontend for the terse notation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotationFrontend;

impl Frontend for NotationFrontend {
    fn tokenize(&self, text: &str) -> Lexed {
        parser::tokenize(text)
    }

    fn parse(&self, text: &str, tokens: &[Token]) -> Parse {
        parser::parse(text, tokens)
    }

    fn bind(&self, module: &Module) -> Result<BoundModule, BindError> {
        bind::bind(module)
    }
}
