//! Workspace symbol index: every open document, keyed by URI.
//!
//! The [`Workspace`] owns documents in a concurrent map: updates to different
//! URIs run independently, updates to one URI are serialized by its
//! [`Document`]. Cross-file queries run on a [`WorkspaceSnapshot`], a sorted
//! list of the current snapshot of every document taken at one instant, and
//! never block on edits in flight.

use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::builtins;
use super::diagnostics::Diagnostic;
use super::document::{Document, DocumentSnapshot};
use super::frontend::{Frontend, NotationFrontend};
use crate::base::Uri;
use crate::syntax::{
    ClassDecl, DeclRef, DelegateDecl, EnumDecl, FunctionDecl, InterfaceDecl, MemberRef, Module,
    TypeExpr,
};

// ============================================================================
// WORKSPACE
// ============================================================================

/// The set of open documents.
pub struct Workspace {
    documents: DashMap<Uri, Arc<Document>>,
    frontend: Arc<dyn Frontend>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workspace")
            .field("documents", &self.documents.len())
            .finish_non_exhaustive()
    }
}

impl Workspace {
    pub fn new() -> Self {
        Self::with_frontend(Arc::new(NotationFrontend))
    }

    /// A workspace analyzing documents with a custom frontend.
    pub fn with_frontend(frontend: Arc<dyn Frontend>) -> Self {
        Self {
            documents: DashMap::new(),
            frontend,
        }
    }

    pub fn frontend(&self) -> &Arc<dyn Frontend> {
        &self.frontend
    }

    /// Open a document, replacing any previous one with the same URI.
    pub fn open(&self, uri: Uri, text: &str, version: i32) -> Arc<[Diagnostic]> {
        let frontend = self.frontend.as_ref();
        let document = Arc::new(Document::new(uri.clone(), text, version, frontend));
        let diagnostics = document.diagnostics();
        self.documents.insert(uri, document);
        diagnostics
    }

    /// The document for `uri`, created empty at version 0 if it is not open.
    pub fn get_or_create(&self, uri: &Uri) -> Arc<Document> {
        if let Some(document) = self.documents.get(uri) {
            return document.clone();
        }
        let frontend = self.frontend.as_ref();
        self.documents
            .entry(uri.clone())
            .or_insert_with(|| Arc::new(Document::new(uri.clone(), "", 0, frontend)))
            .clone()
    }

    /// Reanalyze `uri` with new text, opening it at `version` if needed.
    ///
    /// Analysis runs outside the map shard lock, so other documents stay
    /// readable and writable meanwhile.
    pub fn update(&self, uri: &Uri, text: &str, version: i32) -> Arc<[Diagnostic]> {
        let frontend = self.frontend.as_ref();
        if let Some(document) = self.get(uri) {
            return document.update(text, version, frontend);
        }
        let created = Arc::new(Document::new(uri.clone(), text, version, frontend));
        let document = self
            .documents
            .entry(uri.clone())
            .or_insert_with(|| created.clone())
            .clone();
        if Arc::ptr_eq(&document, &created) {
            created.diagnostics()
        } else {
            // Another first edit won the race; ours applies as an update.
            document.update(text, version, frontend)
        }
    }

    /// Close a document. Returns whether it was open.
    pub fn remove(&self, uri: &Uri) -> bool {
        self.documents.remove(uri).is_some()
    }

    pub fn get(&self, uri: &Uri) -> Option<Arc<Document>> {
        self.documents.get(uri).map(|d| d.clone())
    }

    pub fn contains(&self, uri: &Uri) -> bool {
        self.documents.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Current diagnostics of `uri`, empty if it is not open.
    pub fn diagnostics(&self, uri: &Uri) -> Arc<[Diagnostic]> {
        self.get(uri)
            .map(|d| d.diagnostics())
            .unwrap_or_else(|| Arc::from([]))
    }

    /// Capture the current snapshot of every document.
    pub fn snapshot(&self) -> WorkspaceSnapshot {
        let mut documents: Vec<Arc<DocumentSnapshot>> =
            self.documents.iter().map(|entry| entry.value().snapshot()).collect();
        documents.sort_by(|a, b| a.uri.cmp(&b.uri));
        WorkspaceSnapshot { documents }
    }
}

// ============================================================================
// SNAPSHOT QUERIES
// ============================================================================

/// A member found by a hierarchy walk.
#[derive(Debug, Clone)]
pub struct MemberHit<'a> {
    pub member: MemberRef<'a>,
    /// Document declaring the member; `None` for built-ins.
    pub document: Option<&'a DocumentSnapshot>,
    /// Name of the type that declares the member.
    pub owner: SmolStr,
    /// Declared type with the receiver's generic arguments substituted.
    pub ty: Option<TypeExpr>,
}

/// A top-level declaration together with its document.
#[derive(Debug, Clone, Copy)]
pub struct DeclHit<'a> {
    pub document: &'a DocumentSnapshot,
    pub decl: DeclRef<'a>,
}

/// Read-only view over every open document at one point in time.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceSnapshot {
    documents: Vec<Arc<DocumentSnapshot>>,
}

impl WorkspaceSnapshot {
    /// Build a snapshot from document snapshots directly.
    pub fn from_documents(mut documents: Vec<Arc<DocumentSnapshot>>) -> Self {
        documents.sort_by(|a, b| a.uri.cmp(&b.uri));
        Self { documents }
    }

    /// Documents, sorted by URI.
    pub fn documents(&self) -> &[Arc<DocumentSnapshot>] {
        &self.documents
    }

    pub fn document(&self, uri: &Uri) -> Option<&DocumentSnapshot> {
        self.documents
            .binary_search_by(|d| d.uri.cmp(uri))
            .ok()
            .map(|idx| self.documents[idx].as_ref())
    }

    fn modules(&self) -> impl Iterator<Item = (&DocumentSnapshot, &Module)> {
        self.documents
            .iter()
            .filter_map(|doc| Some((doc.as_ref(), doc.module()?)))
    }

    fn find_map<'a, T>(
        &'a self,
        f: impl Fn(&'a Module) -> Option<T>,
    ) -> Option<(&'a DocumentSnapshot, T)> {
        self.modules().find_map(|(doc, module)| Some((doc, f(module)?)))
    }

    /// First top-level declaration named `name` in any document.
    pub fn find_declaration(&self, name: &str) -> Option<DeclHit<'_>> {
        self.find_map(|m| m.find_declaration(name))
            .map(|(document, decl)| DeclHit { document, decl })
    }

    /// Like [`Self::find_declaration`], but searches `preferred` first.
    pub fn find_declaration_from(&self, preferred: &Uri, name: &str) -> Option<DeclHit<'_>> {
        if let Some(document) = self.document(preferred) {
            if let Some(decl) = document.module().and_then(|m| m.find_declaration(name)) {
                return Some(DeclHit { document, decl });
            }
        }
        self.find_declaration(name)
    }

    pub fn find_class(&self, name: &str) -> Option<(&DocumentSnapshot, &ClassDecl)> {
        self.find_map(|m| m.class(name))
    }

    pub fn find_interface(&self, name: &str) -> Option<(&DocumentSnapshot, &InterfaceDecl)> {
        self.find_map(|m| m.interface(name))
    }

    pub fn find_enum(&self, name: &str) -> Option<(&DocumentSnapshot, &EnumDecl)> {
        self.find_map(|m| m.enum_decl(name))
    }

    pub fn find_delegate(&self, name: &str) -> Option<(&DocumentSnapshot, &DelegateDecl)> {
        self.find_map(|m| m.delegate(name))
    }

    pub fn find_function(&self, name: &str) -> Option<(&DocumentSnapshot, &FunctionDecl)> {
        self.find_map(|m| m.function(name))
    }

    /// Is `name` a declared or built-in type?
    pub fn is_type_name(&self, name: &str) -> bool {
        builtins::is_type_name(name)
            || self
                .find_declaration(name)
                .is_some_and(|hit| hit.decl.kind().is_type())
    }

    /// Every non-private top-level declaration, tagged with its document.
    pub fn public_declarations(&self) -> Vec<DeclHit<'_>> {
        self.modules()
            .flat_map(|(document, module)| {
                module
                    .declarations()
                    .filter(|decl| !decl.visibility().is_private())
                    .map(move |decl| DeclHit { document, decl })
            })
            .collect()
    }

    /// Methods added to `enum_name` by `extend` blocks in any document.
    pub fn extension_methods(&self, enum_name: &str) -> Vec<(&DocumentSnapshot, &FunctionDecl)> {
        self.modules()
            .flat_map(|(document, module)| {
                module
                    .enum_extensions
                    .iter()
                    .filter(move |ext| ext.target.is(enum_name))
                    .flat_map(move |ext| ext.methods.iter().map(move |m| (document, m)))
            })
            .collect()
    }

    /// Find `member` on `ty`: own members, then the base class chain, then
    /// implemented interfaces, then built-in tables. The first name match
    /// wins.
    pub fn find_member(&self, ty: &TypeExpr, member: &str) -> Option<MemberHit<'_>> {
        let mut found = None;
        self.walk_hierarchy(ty, &mut FxHashSet::default(), &mut |hit| {
            if hit.member.name() == member {
                found = Some(hit);
                true
            } else {
                false
            }
        });
        found
    }

    /// Every member visible on `ty`, first declaration per name, in walk order.
    pub fn members_of(&self, ty: &TypeExpr) -> Vec<MemberHit<'_>> {
        let mut seen = FxHashSet::default();
        let mut members = Vec::new();
        self.walk_hierarchy(ty, &mut FxHashSet::default(), &mut |hit| {
            if seen.insert(SmolStr::new(hit.member.name())) {
                members.push(hit);
            }
            false
        });
        members
    }

    /// Visit members of `ty` in lookup order until `visit` returns `true`.
    /// Returns whether the walk was stopped.
    fn walk_hierarchy<'a>(
        &'a self,
        ty: &TypeExpr,
        visited: &mut FxHashSet<SmolStr>,
        visit: &mut dyn FnMut(MemberHit<'a>) -> bool,
    ) -> bool {
        if !visited.insert(ty.base.clone()) {
            return false;
        }

        if let Some((document, class)) = self.find_class(&ty.base) {
            tracing::trace!(class = %class.name.name, "walking class members");
            let params = class.type_param_names();
            for member in class.members() {
                let declared = member
                    .declared_type()
                    .map(|t| t.substitute(&params, &ty.args));
                let hit = MemberHit {
                    member,
                    document: Some(document),
                    owner: class.name.name.clone(),
                    ty: declared,
                };
                if visit(hit) {
                    return true;
                }
            }
            if let Some(base) = &class.base {
                let base = base.expr.substitute(&params, &ty.args);
                if self.walk_hierarchy(&base, visited, visit) {
                    return true;
                }
            }
            for iface in &class.interfaces {
                let iface = iface.expr.substitute(&params, &ty.args);
                if self.walk_hierarchy(&iface, visited, visit) {
                    return true;
                }
            }
            return false;
        }

        if let Some((document, iface)) = self.find_interface(&ty.base) {
            for sig in &iface.methods {
                let member = MemberRef::Signature(sig);
                let hit = MemberHit {
                    ty: member.declared_type(),
                    member,
                    document: Some(document),
                    owner: iface.name.name.clone(),
                };
                if visit(hit) {
                    return true;
                }
            }
            for base in &iface.bases {
                if self.walk_hierarchy(&base.expr, visited, visit) {
                    return true;
                }
            }
            return false;
        }

        if let Some((document, decl)) = self.find_enum(&ty.base) {
            for member in &decl.members {
                let member = MemberRef::EnumMember {
                    owner: decl,
                    member,
                };
                let hit = MemberHit {
                    ty: member.declared_type(),
                    member,
                    document: Some(document),
                    owner: decl.name.name.clone(),
                };
                if visit(hit) {
                    return true;
                }
            }
            for (document, method) in self.extension_methods(&decl.name.name) {
                let member = MemberRef::Method(method);
                let hit = MemberHit {
                    ty: member.declared_type(),
                    member,
                    document: Some(document),
                    owner: decl.name.name.clone(),
                };
                if visit(hit) {
                    return true;
                }
            }
            return false;
        }

        for member in builtins::members(&ty.clone().non_null()) {
            let hit = MemberHit {
                ty: member.declared_type(),
                member,
                document: None,
                owner: ty.base.clone(),
            };
            if visit(hit) {
                return true;
            }
        }
        false
    }
}
