//! # terse-base
//!
//! Semantic core for the terse notation: document analysis pipeline, type and
//! member resolution, and the editor queries built on them.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → AnalysisHost, hover, completion, goto, references, rename
//!   ↓
//! hir       → Documents, workspace index, scopes, type resolver, binder
//!   ↓
//! syntax    → AST (closed Stmt / Expr / Pattern enums), TypeExpr
//!   ↓
//! parser    → Logos lexer, resilient recursive-descent parser
//!   ↓
//! base      → Primitives (Span, LineIndex, Uri)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → syntax → hir → ide)
// ============================================================================

/// Foundation types: Span, LineIndex, Uri
pub mod base;

/// Parser: Logos lexer, recursive-descent parser
pub mod parser;

/// Syntax: AST types and type expressions
pub mod syntax;

/// High-level IR: documents, workspace, resolution
pub mod hir;

/// IDE features: completion, hover, goto-definition, find-references, rename
pub mod ide;

// Re-export foundation types
pub use base::{LineCol, LineIndex, Span, TextRange, TextSize, Uri};
pub use ide::{Analysis, AnalysisConfig, AnalysisHost};
