//! Syntax layer: AST types and the type-expression parser.
//!
//! The AST is produced by a [`crate::hir::Frontend`] and never mutated
//! afterwards; everything above this layer only reads it.

pub mod ast;
mod decl;
mod type_expr;

pub use ast::*;
pub use decl::{DeclRef, MemberRef, SymbolKind, function_signature, literal_type};
pub use type_expr::TypeExpr;
