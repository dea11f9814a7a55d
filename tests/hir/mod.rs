//! HIR layer tests
//!
//! Tests for the semantic model behind the editor queries:
//! - Document pipeline (binding, panics, versions)
//! - Type expression parsing
//! - Scope visibility
//! - Type and member resolution across documents

pub mod tests_pipeline;
pub mod tests_resolution;
pub mod tests_scope;
pub mod tests_type_expr;
