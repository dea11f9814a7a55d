//! Per-document analysis pipeline.
//!
//! Every edit reruns tokenize → parse → bind and produces a fresh, immutable
//! [`DocumentSnapshot`]. A [`Document`] holds the current snapshot behind a
//! read-write lock and swaps it in one write, so a reader always sees one
//! consistent version: text, tokens, AST, bind state and diagnostics together.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::bind::{BindError, BindState, BoundModule};
use super::diagnostics::{Diagnostic, panic_message};
use super::frontend::Frontend;
use crate::base::{LineCol, LineIndex, TextSize, Uri};
use crate::parser::Token;
use crate::syntax::Module;

/// One analyzed version of a document.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub uri: Uri,
    pub version: i32,
    pub text: Arc<str>,
    pub line_index: LineIndex,
    pub tokens: Arc<[Token]>,
    /// Absent only when the frontend crashed before producing a module.
    pub module: Option<Arc<Module>>,
    pub bind_state: BindState,
    pub diagnostics: Arc<[Diagnostic]>,
}

impl DocumentSnapshot {
    /// Run the full pipeline over `text`.
    ///
    /// Never panics: a crash while lexing or parsing becomes a single
    /// internal-error diagnostic, a crash while binding degrades the bind
    /// state.
    pub fn analyze(uri: Uri, text: &str, version: i32, frontend: &dyn Frontend) -> Self {
        let text: Arc<str> = Arc::from(text);
        let line_index = LineIndex::new(&text);

        let lexed = match catch_unwind(AssertUnwindSafe(|| frontend.tokenize(&text))) {
            Ok(lexed) => lexed,
            Err(payload) => {
                let detail = panic_message(payload.as_ref());
                tracing::warn!(uri = %uri, %detail, "tokenizer panicked");
                return Self::crashed(
                    uri,
                    text,
                    line_index,
                    version,
                    Arc::from([]),
                    "tokenizing",
                    &detail,
                );
            }
        };
        let mut diagnostics: Vec<Diagnostic> = lexed
            .errors
            .iter()
            .map(|e| Diagnostic::from_syntax_error(e, &line_index))
            .collect();
        let tokens: Arc<[Token]> = Arc::from(lexed.tokens);

        let parse = match catch_unwind(AssertUnwindSafe(|| frontend.parse(&text, &tokens))) {
            Ok(parse) => parse,
            Err(payload) => {
                let detail = panic_message(payload.as_ref());
                tracing::warn!(uri = %uri, %detail, "parser panicked");
                return Self::crashed(
                    uri,
                    text,
                    line_index,
                    version,
                    tokens,
                    "parsing",
                    &detail,
                );
            }
        };
        diagnostics.extend(
            parse
                .errors
                .iter()
                .map(|e| Diagnostic::from_syntax_error(e, &line_index)),
        );
        let module = Arc::new(parse.module);

        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let bind_state = if errors > 0 {
            BindState::Failed { errors }
        } else {
            match catch_unwind(AssertUnwindSafe(|| frontend.bind(&module))) {
                Ok(Ok(bound)) => {
                    diagnostics.extend(bound.warnings().iter().cloned());
                    BindState::Bound(Arc::new(bound))
                }
                Ok(Err(error)) => {
                    tracing::debug!(uri = %uri, %error, "binding failed");
                    BindState::Degraded(error)
                }
                Err(payload) => {
                    let detail = panic_message(payload.as_ref());
                    tracing::warn!(uri = %uri, %detail, "binder panicked");
                    BindState::Degraded(BindError::Panicked(detail))
                }
            }
        };

        Self {
            uri,
            version,
            text,
            line_index,
            tokens,
            module: Some(module),
            bind_state,
            diagnostics: diagnostics.into(),
        }
    }

    fn crashed(
        uri: Uri,
        text: Arc<str>,
        line_index: LineIndex,
        version: i32,
        tokens: Arc<[Token]>,
        stage: &str,
        detail: &str,
    ) -> Self {
        Self {
            uri,
            version,
            text,
            line_index,
            tokens,
            module: None,
            bind_state: BindState::Failed { errors: 1 },
            diagnostics: Arc::from([Diagnostic::internal_error(stage, detail)]),
        }
    }

    pub fn module(&self) -> Option<&Module> {
        self.module.as_deref()
    }

    pub fn bound(&self) -> Option<&BoundModule> {
        self.bind_state.bound().map(|b| b.as_ref())
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn offset_at(&self, line: u32, col: u32) -> TextSize {
        self.line_index.offset(LineCol::new(line, col))
    }

    pub fn line_col(&self, offset: TextSize) -> LineCol {
        self.line_index.line_col(offset)
    }
}

/// An open document: the current snapshot plus a single-writer update lock.
#[derive(Debug)]
pub struct Document {
    uri: Uri,
    current: RwLock<Arc<DocumentSnapshot>>,
    /// Serializes `update` calls; readers never take it.
    update_lock: Mutex<()>,
}

impl Document {
    /// Create a document already analyzed at `version`.
    pub fn new(uri: Uri, text: &str, version: i32, frontend: &dyn Frontend) -> Self {
        let snapshot = DocumentSnapshot::analyze(uri.clone(), text, version, frontend);
        Self {
            uri,
            current: RwLock::new(Arc::new(snapshot)),
            update_lock: Mutex::new(()),
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The current snapshot. Cheap: clones an `Arc`.
    pub fn snapshot(&self) -> Arc<DocumentSnapshot> {
        self.current.read().clone()
    }

    pub fn version(&self) -> i32 {
        self.current.read().version
    }

    pub fn diagnostics(&self) -> Arc<[Diagnostic]> {
        self.current.read().diagnostics.clone()
    }

    /// Reanalyze with new text and publish the resulting diagnostics.
    ///
    /// A version older than the stored one is ignored and the current
    /// diagnostics are returned unchanged.
    pub fn update(&self, text: &str, version: i32, frontend: &dyn Frontend) -> Arc<[Diagnostic]> {
        let _guard = self.update_lock.lock();
        let current = self.snapshot();
        if version < current.version {
            tracing::debug!(
                uri = %self.uri,
                version,
                current = current.version,
                "ignoring stale update"
            );
            return current.diagnostics.clone();
        }

        let next = Arc::new(DocumentSnapshot::analyze(
            self.uri.clone(),
            text,
            version,
            frontend,
        ));
        tracing::debug!(
            uri = %self.uri,
            version,
            diagnostics = next.diagnostics.len(),
            bound = next.bind_state.is_bound(),
            "document updated"
        );
        let diagnostics = next.diagnostics.clone();
        *self.current.write() = next;
        diagnostics
    }
}
