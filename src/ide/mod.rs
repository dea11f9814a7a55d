//! IDE features: high-level APIs for editor requests.
//!
//! This module provides the interface between the semantic model (HIR)
//! and an editor front end. Each function corresponds to one request.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: take a [`WorkspaceSnapshot`](crate::hir::WorkspaceSnapshot), return data
//! 2. **No protocol types**: spans and our own result types, converted at the boundary
//! 3. **Best effort**: an unresolvable name yields an empty result, never an error
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```
//! use terse::base::Uri;
//! use terse::ide::AnalysisHost;
//!
//! let host = AnalysisHost::new();
//! let uri = Uri::from("file:///shapes.terse");
//! host.document_changed(&uri, "class Circle { let radius: double }", 1);
//!
//! let analysis = host.analysis();
//! assert!(analysis.diagnostics(&uri).is_empty());
//! ```

mod analysis;
mod completion;
mod cursor;
mod goto;
mod hover;
mod references;
mod rename;
pub mod text_utils;

pub use analysis::{Analysis, AnalysisConfig, AnalysisHost};
pub use completion::{CompletionItem, CompletionKind, completions};
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use hover::{HoverResult, hover};
pub use references::{Occurrence, Reference, ReferenceResult, collect_occurrences, find_references};
pub use rename::{RenameEdits, RenameError, TextEdit, rename};
pub use text_utils::{is_valid_identifier, word_at};
