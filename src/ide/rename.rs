//! Rename implementation.
//!
//! Edits are the occurrences [`find_references`] reports, declaration
//! included, so rename carries the same name-based matching rules.

use indexmap::IndexMap;
use smol_str::SmolStr;
use text_size::TextSize;
use thiserror::Error;

use super::cursor::symbol_at;
use super::references::find_references;
use super::text_utils::is_valid_identifier;
use crate::base::{Span, Uri};
use crate::hir::{TypeResolver, WorkspaceSnapshot};
use crate::parser::SyntaxKind;

/// Why a rename was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("`{0}` is not a valid identifier")]
    InvalidIdentifier(SmolStr),
    #[error("`{0}` is a reserved keyword")]
    Keyword(SmolStr),
    #[error("no renameable symbol at the cursor")]
    NoSymbol,
}

/// Replace the text at `span` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub new_text: SmolStr,
}

/// Edits grouped per document, documents in workspace order.
pub type RenameEdits = IndexMap<Uri, Vec<TextEdit>>;

/// Rename the symbol at `offset` in `uri` to `new_name`.
///
/// Built-in members cannot be renamed.
pub fn rename(
    snapshot: &WorkspaceSnapshot,
    uri: &Uri,
    offset: TextSize,
    new_name: &str,
) -> Result<RenameEdits, RenameError> {
    if SyntaxKind::is_keyword_text(new_name) {
        return Err(RenameError::Keyword(SmolStr::new(new_name)));
    }
    if !is_valid_identifier(new_name) {
        return Err(RenameError::InvalidIdentifier(SmolStr::new(new_name)));
    }

    let resolver = TypeResolver::new(snapshot, uri).ok_or(RenameError::NoSymbol)?;
    let symbol = symbol_at(&resolver, offset).ok_or(RenameError::NoSymbol)?;
    if symbol.definition(resolver.document()).is_none() {
        return Err(RenameError::NoSymbol);
    }

    let result = find_references(snapshot, uri, offset, true);
    if result.is_empty() {
        return Err(RenameError::NoSymbol);
    }

    let new_text = SmolStr::new(new_name);
    let mut edits = RenameEdits::default();
    for reference in result.references {
        edits.entry(reference.uri).or_default().push(TextEdit {
            span: reference.span,
            new_text: new_text.clone(),
        });
    }
    tracing::debug!(
        from = %symbol.name,
        to = new_name,
        documents = edits.len(),
        "rename"
    );
    Ok(edits)
}
