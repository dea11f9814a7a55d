//! High-level IR (HIR): documents, workspace index and type resolution.
//!
//! Everything here reads the immutable AST produced by a [`Frontend`]; the
//! only mutation is replacing a document's snapshot on edit.
//!
//! ## Key Types
//!
//! - [`Document`] / [`DocumentSnapshot`]: one document's analysis, swapped whole on update
//! - [`BindState`]: whether binding ran, was skipped, or failed
//! - [`Workspace`] / [`WorkspaceSnapshot`]: every open document, cross-file lookups
//! - [`EnclosingScope`] / [`ScopeVariable`]: names visible at a cursor
//! - [`TypeResolver`]: static type of an expression at a cursor
//!
//! ## Layers
//!
//! ```text
//! DocumentSnapshot::analyze   ← tokenize → parse → bind, per edit
//!     │
//!     ▼
//! WorkspaceSnapshot           ← declarations and member walks across documents
//!     │
//!     ▼
//! EnclosingScope::variables   ← names visible at an offset
//!     │
//!     ▼
//! TypeResolver                ← chains, calls, indexing, inference
//! ```

mod bind;
pub mod builtins;
mod diagnostics;
mod document;
mod frontend;
mod resolve;
mod scope;
mod workspace;

pub use bind::{BindError, BindState, BoundDecl, BoundModule, bind};
pub use diagnostics::{Diagnostic, Severity, codes, has_errors};
pub use document::{Document, DocumentSnapshot};
pub use frontend::{Frontend, NotationFrontend};
pub use resolve::{NameTarget, TypeResolver};
pub use scope::{
    Callable, EnclosingScope, Inference, InferenceRoot, Projection, ScopeVariable, VariableOrigin,
    pattern_variables, visible_variables,
};
pub use workspace::{DeclHit, MemberHit, Workspace, WorkspaceSnapshot};
