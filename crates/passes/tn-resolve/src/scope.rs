//! Package scopes and the per-compilation scope tree

use crate::symbol::Symbol;
use indexmap::IndexMap;
use la_arena::{Arena, Idx};
use serde::{Deserialize, Serialize};
use tn_ty::Type;

/// Kind of scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    /// Package-level scope (top-level)
    Package,
    /// Parameters of a function or lambda
    Function,
    /// Block scope (inside { })
    Block,
}

/// Symbol table with one entry per name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    kind: ScopeKind,
    symbols: IndexMap<String, Symbol>,
}

impl Scope {
    /// Create an empty scope
    pub fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            symbols: IndexMap::new(),
        }
    }

    /// Kind of the scope
    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    /// Declare `name`, merging with an earlier declaration of the same name
    pub fn add_symbol(&mut self, name: &str, ty: Type, public: bool, mutable: bool) -> &Symbol {
        let incoming = Symbol::new(name, ty, public, mutable);
        let entry = self
            .symbols
            .entry(name.to_string())
            .and_modify(|existing| {
                tracing::trace!(name, existing = %existing.ty, incoming = %incoming.ty, "merging redeclaration");
                existing.merge(incoming.clone());
            })
            .or_insert_with(|| incoming.clone());
        entry
    }

    /// Symbol declared under `name`
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    /// Whether `name` is declared directly in this scope
    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Symbols in declaration order
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Number of symbols declared here
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the scope declares nothing
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Unique identifier for a scope
pub type ScopeId = Idx<ScopeData>;

/// A nested scope created during conversion
#[derive(Debug, Clone)]
pub struct ScopeData {
    /// Parent scope (None for the root)
    pub parent: Option<ScopeId>,
    /// Symbols declared in this scope
    pub scope: Scope,
    /// Parameter names, in order, for function scopes
    pub parameters: Vec<String>,
}

impl ScopeData {
    /// Kind of the scope
    pub fn kind(&self) -> ScopeKind {
        self.scope.kind()
    }
}

/// Tree of all nested scopes of one compilation.
///
/// The root stands for the package scope; its symbols live in the
/// namespace, so the root itself stays empty.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Arena<ScopeData>,
    root: ScopeId,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only the package root
    pub fn new() -> Self {
        let mut scopes = Arena::new();
        let root = scopes.alloc(ScopeData {
            parent: None,
            scope: Scope::new(ScopeKind::Package),
            parameters: Vec::new(),
        });
        Self { scopes, root }
    }

    /// The package root
    pub fn root(&self) -> ScopeId {
        self.root
    }

    /// Create a new child scope
    pub fn create_child(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        self.scopes.alloc(ScopeData {
            parent: Some(parent),
            scope: Scope::new(kind),
            parameters: Vec::new(),
        })
    }

    /// Get scope data
    pub fn get(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id]
    }

    /// Kind of scope `id`
    pub fn kind(&self, id: ScopeId) -> ScopeKind {
        self.scopes[id].kind()
    }

    /// Enclosing scope, `None` for the root
    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes[id].parent
    }

    /// Declare a symbol in `scope`
    pub fn add_symbol(
        &mut self,
        scope: ScopeId,
        name: &str,
        ty: Type,
        public: bool,
        mutable: bool,
    ) -> &Symbol {
        self.scopes[scope].scope.add_symbol(name, ty, public, mutable)
    }

    /// Declare the next positional parameter of a function scope
    pub fn add_parameter(&mut self, scope: ScopeId, name: &str, ty: Type) {
        let data = &mut self.scopes[scope];
        data.parameters.push(name.to_string());
        data.scope.add_symbol(name, ty, false, false);
    }

    /// Zero-based position of parameter `name` in `scope`
    pub fn parameter_index(&self, scope: ScopeId, name: &str) -> Option<usize> {
        self.scopes[scope]
            .parameters
            .iter()
            .rposition(|param| param == name)
    }

    /// `scope` followed by its ancestors up to the root
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |id| self.scopes[*id].parent)
    }

    /// Resolve a name in a scope, walking up parent scopes
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        self.ancestors(scope).find_map(|id| {
            self.scopes[id]
                .scope
                .get(name)
                .map(|symbol| (id, symbol))
        })
    }

    /// Nearest enclosing scope of `kind`, including `scope` itself
    pub fn enclosing(&self, scope: ScopeId, kind: ScopeKind) -> Option<ScopeId> {
        self.ancestors(scope).find(|id| self.kind(*id) == kind)
    }

    /// All scopes in allocation order
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &ScopeData)> {
        self.scopes.iter()
    }

    /// Number of scopes
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether the tree has no scopes
    pub fn is_empty(&self) -> bool {
        self.scopes.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parents() {
        let mut tree = ScopeTree::new();
        let function = tree.create_child(tree.root(), ScopeKind::Function);
        tree.add_parameter(function, "x", Type::INT);
        let block = tree.create_child(function, ScopeKind::Block);
        tree.add_symbol(block, "y", Type::STRING, false, true);

        let (found, symbol) = tree.lookup(block, "x").unwrap();
        assert_eq!(found, function);
        assert_eq!(symbol.ty, Type::INT);
        assert_eq!(tree.parameter_index(function, "x"), Some(0));
        assert!(tree.lookup(function, "y").is_none());
        assert_eq!(tree.enclosing(block, ScopeKind::Function), Some(function));
    }

    #[test]
    fn test_one_symbol_per_name() {
        let mut scope = Scope::new(ScopeKind::Package);
        scope.add_symbol("x", Type::INT, false, false);
        scope.add_symbol("x", Type::STRING, true, true);
        assert_eq!(scope.len(), 1);
        let symbol = scope.get("x").unwrap();
        assert_eq!(symbol.ty, Type::STRING);
        assert!(symbol.public && symbol.mutable);
    }
}
