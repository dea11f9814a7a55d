//! IDE feature tests
//!
//! Tests for:
//! - Hover information
//! - Go to definition
//! - Find references
//! - Rename
//! - Code completion

pub mod tests_completion;
pub mod tests_goto;
pub mod tests_hover;
pub mod tests_references;
pub mod tests_rename;
