//! AnalysisHost and Analysis: state management for IDE features.
//!
//! The `AnalysisHost` owns the workspace and hands out `Analysis` snapshots
//! for querying. A snapshot never changes, so several queries against one
//! `Analysis` see the same document versions even while edits arrive.
//!
//! ## Usage
//!
//! ```
//! use terse::base::Uri;
//! use terse::ide::AnalysisHost;
//!
//! let host = AnalysisHost::new();
//! let uri = Uri::from("file:///main.terse");
//! host.document_changed(&uri, "class Person { let name: string }", 1);
//!
//! let analysis = host.analysis();
//! let offset = analysis.offset_at(&uri, 0, 8).unwrap_or_default();
//! assert!(analysis.hover(&uri, offset).is_some());
//! ```

use std::sync::Arc;

use text_size::TextSize;

use super::completion::{self, CompletionItem};
use super::goto::{self, GotoResult};
use super::hover::{self, HoverResult};
use super::references::{self, ReferenceResult};
use super::rename::{self, RenameEdits, RenameError};
use crate::base::{LineCol, Uri};
use crate::hir::{Diagnostic, Frontend, Workspace, WorkspaceSnapshot};

/// Knobs for the interactive operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Offer public declarations from other documents.
    pub workspace_completions: bool,
    /// Offer keywords.
    pub keyword_completions: bool,
    /// Cap on the number of completion items.
    pub max_completions: Option<usize>,
    /// Include doc comments in hover text.
    pub hover_docs: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            workspace_completions: true,
            keyword_completions: true,
            max_completions: None,
            hover_docs: true,
        }
    }
}

/// Owns all mutable state for the IDE layer.
///
/// Apply changes via `document_changed()` and `close()`, then get a
/// consistent snapshot via `analysis()`.
#[derive(Debug, Default)]
pub struct AnalysisHost {
    workspace: Workspace,
    config: AnalysisConfig,
}

impl AnalysisHost {
    /// Create a new empty AnalysisHost.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            workspace: Workspace::new(),
            config,
        }
    }

    /// A host whose documents are analyzed by `frontend`.
    pub fn with_frontend(frontend: Arc<dyn Frontend>) -> Self {
        Self {
            workspace: Workspace::with_frontend(frontend),
            config: AnalysisConfig::default(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AnalysisConfig) {
        self.config = config;
    }

    /// Reanalyze `uri` with new text. Returns the document's diagnostics.
    ///
    /// Takes `&self`: edits to different documents may run concurrently.
    pub fn document_changed(&self, uri: &Uri, text: &str, version: i32) -> Arc<[Diagnostic]> {
        self.workspace.update(uri, text, version)
    }

    /// Forget a document. Returns whether it was open.
    pub fn close(&self, uri: &Uri) -> bool {
        self.workspace.remove(uri)
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Get a consistent snapshot for querying.
    pub fn analysis(&self) -> Analysis {
        Analysis {
            snapshot: self.workspace.snapshot(),
            config: self.config.clone(),
        }
    }
}

/// A consistent snapshot of the workspace for querying.
///
/// All IDE queries go through this type. Offsets are byte offsets into the
/// document text; use [`Analysis::offset_at`] to convert from line/column.
#[derive(Debug, Clone)]
pub struct Analysis {
    snapshot: WorkspaceSnapshot,
    config: AnalysisConfig,
}

impl Analysis {
    pub fn snapshot(&self) -> &WorkspaceSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Get hover information at a position.
    pub fn hover(&self, uri: &Uri, offset: TextSize) -> Option<HoverResult> {
        hover::hover(&self.snapshot, uri, offset, self.config.hover_docs)
    }

    /// Get completions at a position.
    pub fn completions(&self, uri: &Uri, offset: TextSize) -> Vec<CompletionItem> {
        completion::completions(&self.snapshot, uri, offset, &self.config)
    }

    /// Go to definition at a position.
    pub fn goto_definition(&self, uri: &Uri, offset: TextSize) -> GotoResult {
        goto::goto_definition(&self.snapshot, uri, offset)
    }

    /// Find all references to the symbol at a position.
    pub fn find_references(
        &self,
        uri: &Uri,
        offset: TextSize,
        include_declaration: bool,
    ) -> ReferenceResult {
        references::find_references(&self.snapshot, uri, offset, include_declaration)
    }

    /// Compute the edits renaming the symbol at a position.
    pub fn rename(
        &self,
        uri: &Uri,
        offset: TextSize,
        new_name: &str,
    ) -> Result<RenameEdits, RenameError> {
        rename::rename(&self.snapshot, uri, offset, new_name)
    }

    /// Diagnostics of a document; empty if it is not open.
    pub fn diagnostics(&self, uri: &Uri) -> Arc<[Diagnostic]> {
        self.snapshot
            .document(uri)
            .map(|doc| doc.diagnostics.clone())
            .unwrap_or_else(|| Arc::from([]))
    }

    /// Convert a 0-indexed line/column to an offset.
    pub fn offset_at(&self, uri: &Uri, line: u32, col: u32) -> Option<TextSize> {
        self.snapshot
            .document(uri)
            .map(|doc| doc.offset_at(line, col))
    }

    /// Convert an offset to a 0-indexed line/column.
    pub fn line_col(&self, uri: &Uri, offset: TextSize) -> Option<LineCol> {
        self.snapshot
            .document(uri)
            .map(|doc| doc.line_col(offset))
    }
}
