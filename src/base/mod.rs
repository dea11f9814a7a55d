//! Foundation types for the terse toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Span`] - Located text range attached to every AST node
//! - [`LineCol`], [`LineIndex`] - Offset ↔ line/column conversion
//! - [`Uri`] - Document identity used as the workspace key
//!
//! This module has NO dependencies on other terse modules.

mod position;
mod span;
mod uri;

pub use position::{LineCol, LineIndex};
pub use span::Span;
pub use uri::Uri;

// Re-export text-size types for convenience
pub use text_size::{self, TextRange, TextSize};
