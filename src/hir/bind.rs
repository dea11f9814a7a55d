//! Binder: validates a parsed module against its own declarations.
//!
//! Binding builds the module's top-level declaration table. It runs only on
//! modules that lexed and parsed cleanly; its outcome is recorded per
//! document as a [`BindState`].

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use thiserror::Error;

use super::diagnostics::{Diagnostic, codes};
use crate::base::Span;
use crate::syntax::{Module, SymbolKind};

/// Why binding produced no bound module.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("class `{class}` inherits from itself")]
    CyclicInheritance { class: SmolStr },
    #[error("binder panicked: {0}")]
    Panicked(String),
}

/// One entry of the declaration table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundDecl {
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub name_span: Span,
}

/// The output of a successful bind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundModule {
    /// First declaration per name, in source order.
    declarations: IndexMap<SmolStr, BoundDecl>,
    warnings: Vec<Diagnostic>,
}

impl BoundModule {
    pub fn declaration(&self, name: &str) -> Option<&BoundDecl> {
        self.declarations.get(name)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &BoundDecl> {
        self.declarations.values()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Non-fatal findings, published with the document's diagnostics.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }
}

/// Outcome of binding one document version.
#[derive(Debug, Clone)]
pub enum BindState {
    /// Binding succeeded.
    Bound(Arc<BoundModule>),
    /// The AST is usable but the binder failed on it.
    Degraded(BindError),
    /// Binding was skipped because lexing or parsing reported errors.
    Failed { errors: usize },
}

impl BindState {
    pub fn bound(&self) -> Option<&Arc<BoundModule>> {
        match self {
            BindState::Bound(bound) => Some(bound),
            BindState::Degraded(_) | BindState::Failed { .. } => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound().is_some()
    }
}

/// Bind a module.
pub fn bind(module: &Module) -> Result<BoundModule, BindError> {
    check_inheritance(module)?;

    let mut bound = BoundModule::default();
    for decl in module.declarations() {
        let name = decl.name();
        if name.name.is_empty() {
            continue;
        }
        if let Some(first) = bound.declarations.get(&name.name) {
            bound.warnings.push(
                Diagnostic::warning(
                    name.span,
                    format!(
                        "`{}` is already declared as a {} on line {}",
                        name.name,
                        first.kind.display(),
                        first.name_span.line + 1
                    ),
                )
                .with_code(codes::DUPLICATE_DECLARATION),
            );
            continue;
        }
        bound.declarations.insert(
            name.name.clone(),
            BoundDecl {
                name: name.name.clone(),
                kind: decl.kind(),
                name_span: name.span,
            },
        );
    }

    tracing::trace!(declarations = bound.len(), "bound module");
    Ok(bound)
}

/// Reject classes of this module that extend each other in a cycle.
///
/// Bases declared in other documents are not followed here.
fn check_inheritance(module: &Module) -> Result<(), BindError> {
    let bases: FxHashMap<&str, &str> = module
        .classes
        .iter()
        .filter_map(|c| Some((c.name.name.as_str(), c.base.as_ref()?.base())))
        .collect();

    for class in &module.classes {
        let mut seen = FxHashSet::default();
        let mut current = class.name.name.as_str();
        while let Some(&base) = bases.get(current) {
            if base == class.name.name || !seen.insert(base) {
                return Err(BindError::CyclicInheritance {
                    class: class.name.name.clone(),
                });
            }
            current = base;
        }
    }
    Ok(())
}
