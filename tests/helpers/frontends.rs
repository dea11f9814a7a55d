//! Frontends that count or crash, installed through `Workspace::with_frontend`.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use terse::hir::{BindError, BoundModule, Frontend, NotationFrontend, bind};
use terse::parser::{Lexed, Parse, Token};
use terse::syntax::Module;

/// Delegates to the notation frontend and counts each stage.
#[derive(Debug, Default)]
pub struct CountingFrontend {
    pub tokenized: AtomicUsize,
    pub parsed: AtomicUsize,
    pub bound: AtomicUsize,
}

impl CountingFrontend {
    pub fn binds(&self) -> usize {
        self.bound.load(Ordering::SeqCst)
    }
}

impl Frontend for CountingFrontend {
    fn tokenize(&self, text: &str) -> Lexed {
        self.tokenized.fetch_add(1, Ordering::SeqCst);
        NotationFrontend.tokenize(text)
    }

    fn parse(&self, text: &str, tokens: &[Token]) -> Parse {
        self.parsed.fetch_add(1, Ordering::SeqCst);
        NotationFrontend.parse(text, tokens)
    }

    fn bind(&self, module: &Module) -> Result<BoundModule, BindError> {
        self.bound.fetch_add(1, Ordering::SeqCst);
        bind(module)
    }
}

/// Which stage panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Tokenize,
    Parse,
    Bind,
}

/// Panics in one stage, otherwise behaves like the notation frontend.
#[derive(Debug, Clone, Copy)]
pub struct PanickingFrontend(pub Stage);

impl Frontend for PanickingFrontend {
    fn tokenize(&self, text: &str) -> Lexed {
        if self.0 == Stage::Tokenize {
            panic!("tokenizer exploded");
        }
        NotationFrontend.tokenize(text)
    }

    fn parse(&self, text: &str, tokens: &[Token]) -> Parse {
        if self.0 == Stage::Parse {
            panic!("parser exploded");
        }
        NotationFrontend.parse(text, tokens)
    }

    fn bind(&self, module: &Module) -> Result<BoundModule, BindError> {
        if self.0 == Stage::Bind {
            panic!("binder exploded");
        }
        bind(module)
    }
}
