//! Conversion state shared by the registration and conversion passes

use crate::diagnostic::{DiagnosticKind, Diagnostics};
use crate::imports::ImportTable;
use tn_hir::{Expr, ExprId, Program, Target};
use tn_resolve::{Namespace, PRELUDE_MODULE, PRELUDE_PACKAGE, ScopeId, ScopeKind, Symbol};
use tn_span::Span;
use tn_syntax::TypeRef;
use tn_ty::{Type, TypeLookup};

/// A name resolved to its declaration
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Where the symbol lives
    pub target: Target,
    /// The symbol as currently declared
    pub symbol: Symbol,
}

/// Context for converting one compilation unit
pub struct ConversionContext<'ns> {
    /// Namespace receiving the package declarations
    pub namespace: &'ns mut Namespace,
    /// Module of the unit
    pub module: String,
    /// Package of the unit
    pub package: String,
    /// HIR under construction
    pub program: Program,
    /// Imports of the unit
    pub imports: ImportTable,
    /// Collected diagnostics
    pub diagnostics: Diagnostics,
    current_scope: ScopeId,
    return_types: Vec<Type>,
    generics: Vec<String>,
}

impl<'ns> ConversionContext<'ns> {
    /// Create a context for `module/package`, creating the package if needed
    pub fn new(namespace: &'ns mut Namespace, module: &str, package: &str) -> Self {
        namespace.get_or_create_package(module, package);
        let program = Program::new(module, package);
        let current_scope = program.scopes.root();
        Self {
            namespace,
            module: module.to_string(),
            package: package.to_string(),
            program,
            imports: ImportTable::new(),
            diagnostics: Diagnostics::default(),
            current_scope,
            return_types: Vec::new(),
            generics: Vec::new(),
        }
    }

    /// Report a diagnostic at `span`
    pub fn report(&mut self, kind: DiagnosticKind, span: Span) {
        self.diagnostics.report(kind, span);
    }

    /// Allocate an expression with its type
    pub fn alloc(&mut self, expr: Expr, ty: Type) -> ExprId {
        self.program.alloc(expr, ty)
    }

    /// Allocate an `any`-typed error node
    pub fn error(&mut self, span: Span) -> ExprId {
        self.program.alloc(Expr::Error { span }, Type::ANY)
    }

    /// Type of a converted expression
    pub fn ty(&self, id: ExprId) -> Type {
        self.program.ty(id).clone()
    }

    // ── Scopes ──

    /// Scope expressions are currently converted in
    pub fn scope(&self) -> ScopeId {
        self.current_scope
    }

    /// Whether conversion is at package level
    pub fn at_package_level(&self) -> bool {
        self.current_scope == self.program.scopes.root()
    }

    /// Enter a new child of the current scope
    pub fn enter_scope(&mut self, kind: ScopeKind) -> ScopeId {
        let scope = self.program.scopes.create_child(self.current_scope, kind);
        self.current_scope = scope;
        scope
    }

    /// Return to the parent of the current scope
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.program.scopes.parent(self.current_scope) {
            self.current_scope = parent;
        }
    }

    // ── Function state ──

    /// Enter a function body returning `ty`
    pub fn push_return_type(&mut self, ty: Type) {
        self.return_types.push(ty);
    }

    /// Leave the innermost function body
    pub fn pop_return_type(&mut self) {
        self.return_types.pop();
    }

    /// Return type of the innermost enclosing function
    pub fn return_type(&self) -> Option<&Type> {
        self.return_types.last()
    }

    /// Bring generic names into scope, returning the mark to restore
    pub fn push_generics(&mut self, names: &[String]) -> usize {
        let mark = self.generics.len();
        self.generics.extend(names.iter().cloned());
        mark
    }

    /// Forget generic names brought in after `mark`
    pub fn pop_generics(&mut self, mark: usize) {
        self.generics.truncate(mark);
    }

    /// Generic names in scope, outermost first
    pub fn generics(&self) -> &[String] {
        &self.generics
    }

    // ── Types ──

    /// Resolve a type reference, falling back to `any` on failure.
    ///
    /// Failures are reported only when `report` is set, so a signature
    /// resolved once per pass is diagnosed once.
    pub fn resolve_type(&mut self, type_ref: &TypeRef, report: bool) -> Type {
        let result = {
            let types = TypeScope {
                namespace: &*self.namespace,
                module: &self.module,
                package: &self.package,
                imports: &self.imports,
            };
            tn_ty::resolve(type_ref, &self.generics, &types, &*self.namespace)
        };
        match result {
            Ok(ty) => ty,
            Err(error) => {
                if report {
                    self.diagnostics.push(error.into());
                }
                Type::ANY
            }
        }
    }

    // ── Names ──

    /// Whether a symbol from `module` with the given flag may be used here
    pub fn is_visible(&self, module: &str, public: bool) -> bool {
        public || module == self.module
    }

    /// Resolve a name: nested scopes, imports, the package, then the prelude
    pub fn resolve_name(&self, name: &str) -> Option<Resolved> {
        if let Some((scope, symbol)) = self.program.scopes.lookup(self.current_scope, name) {
            return Some(Resolved {
                target: Target::Scoped {
                    scope,
                    name: name.to_string(),
                },
                symbol: symbol.clone(),
            });
        }

        if let Some(imported) = self.imports.name(name)
            && let Some(symbol) = self
                .namespace
                .lookup_qualified(&imported.module, &imported.package, &imported.name)
        {
            return Some(package_target(&imported.module, &imported.package, symbol));
        }

        if let Some(symbol) = self.namespace.lookup_qualified(&self.module, &self.package, name) {
            return Some(package_target(&self.module, &self.package, symbol));
        }

        self.namespace
            .lookup_qualified(PRELUDE_MODULE, PRELUDE_PACKAGE, name)
            .map(|symbol| package_target(PRELUDE_MODULE, PRELUDE_PACKAGE, symbol))
    }

    /// Resolve `alias.name` through a whole-package import
    pub fn resolve_qualified(&self, alias: &str, name: &str) -> Option<Resolved> {
        let path = self.imports.alias(alias)?;
        self.resolve_in_package(&path.module, &path.package, name)
    }

    /// Resolve `name` in a specific package, honouring visibility
    pub fn resolve_in_package(&self, module: &str, package: &str, name: &str) -> Option<Resolved> {
        let symbol = self.namespace.lookup_qualified(module, package, name)?;
        let same_package = module == self.module && package == self.package;
        if !same_package && !self.is_visible(module, symbol.public) {
            return None;
        }
        Some(package_target(module, package, symbol))
    }

    /// Whether `name` is bound to a whole-package import and not to a value
    pub fn names_package(&self, name: &str) -> bool {
        self.imports.alias(name).is_some() && self.resolve_name(name).is_none()
    }
}

fn package_target(module: &str, package: &str, symbol: &Symbol) -> Resolved {
    Resolved {
        target: Target::Package {
            module: module.to_string(),
            package: package.to_string(),
            name: symbol.name.clone(),
        },
        symbol: symbol.clone(),
    }
}

/// Type names visible to the unit: its own package, then imported types
struct TypeScope<'a> {
    namespace: &'a Namespace,
    module: &'a str,
    package: &'a str,
    imports: &'a ImportTable,
}

impl TypeLookup for TypeScope<'_> {
    fn lookup_type(&self, name: &str) -> Option<Type> {
        if let Some(definition) = self.namespace.lookup_variant(self.module, self.package, name) {
            return Some(Type::Variant(definition.ty()));
        }
        let imported = self.imports.name(name)?;
        let definition = self
            .namespace
            .lookup_variant(&imported.module, &imported.package, &imported.name)?;
        (definition.public || imported.module == self.module).then(|| Type::Variant(definition.ty()))
    }
}
