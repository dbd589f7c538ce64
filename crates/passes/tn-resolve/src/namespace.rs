//! Module and package registry

use crate::registry::{TypeRegistry, VariantDefinition};
use crate::scope::{Scope, ScopeKind};
use crate::symbol::Symbol;
use indexmap::IndexMap;
use tn_ty::{Type, VariantCaseLookup, VariantType};

/// Module holding the built-in functions
pub const PRELUDE_MODULE: &str = "std";
/// Package holding the built-in functions
pub const PRELUDE_PACKAGE: &str = "lang";

/// A package: its scope and its variant types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Owning module name
    pub module: String,
    /// Package name
    pub package: String,
    /// Package-level symbols
    pub scope: Scope,
    /// Variant types declared in the package
    pub types: TypeRegistry,
}

impl PackageDescriptor {
    fn new(module: &str, package: &str) -> Self {
        Self {
            module: module.to_string(),
            package: package.to_string(),
            scope: Scope::new(ScopeKind::Package),
            types: TypeRegistry::new(),
        }
    }

    /// Declare a package-level symbol
    pub fn add_symbol(&mut self, name: &str, ty: Type, public: bool, mutable: bool) -> &Symbol {
        self.scope.add_symbol(name, ty, public, mutable)
    }

    /// `module/package`
    pub fn path(&self) -> String {
        format!("{}/{}", self.module, self.package)
    }
}

/// A named group of packages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Module name
    pub name: String,
    packages: IndexMap<String, PackageDescriptor>,
}

impl Module {
    /// Package named `name` in this module
    pub fn package(&self, name: &str) -> Option<&PackageDescriptor> {
        self.packages.get(name)
    }

    /// Packages in creation order
    pub fn packages(&self) -> impl Iterator<Item = &PackageDescriptor> {
        self.packages.values()
    }
}

/// Registry of every module and package known to the compiler.
///
/// A namespace outlives individual compilations: compiling into the same
/// namespace again merges redeclarations into the existing packages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    modules: IndexMap<String, Module>,
}

impl Namespace {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Namespace with the `std/lang` built-ins declared
    pub fn with_prelude() -> Self {
        let mut namespace = Self::new();
        namespace.load_prelude();
        namespace
    }

    /// Declare the `std/lang` built-ins
    pub fn load_prelude(&mut self) {
        let lang = self.get_or_create_package(PRELUDE_MODULE, PRELUDE_PACKAGE);
        lang.add_symbol("println", Type::function(vec![Type::ANY], Type::UNIT), true, false);
        lang.add_symbol("print", Type::function(vec![Type::ANY], Type::UNIT), true, false);
        lang.add_symbol("len", Type::function(vec![Type::STRING], Type::INT), true, false);
        lang.add_symbol(
            "len",
            Type::function(vec![Type::array(Type::ANY)], Type::INT),
            true,
            false,
        );
        lang.add_symbol(
            "to_string",
            Type::function(vec![Type::ANY], Type::STRING),
            true,
            false,
        );
    }

    /// Existing package, or a new empty one
    pub fn get_or_create_package(&mut self, module: &str, package: &str) -> &mut PackageDescriptor {
        let module_entry = self
            .modules
            .entry(module.to_string())
            .or_insert_with(|| {
                tracing::debug!(module, "creating module");
                Module {
                    name: module.to_string(),
                    packages: IndexMap::new(),
                }
            });
        module_entry
            .packages
            .entry(package.to_string())
            .or_insert_with(|| {
                tracing::debug!(module, package, "creating package");
                PackageDescriptor::new(module, package)
            })
    }

    /// Package lookup without creation
    pub fn find_package(&self, module: &str, package: &str) -> Option<&PackageDescriptor> {
        self.modules.get(module)?.package(package)
    }

    /// Declare a symbol in `module/package`, creating the package if needed
    pub fn add_symbol(
        &mut self,
        module: &str,
        package: &str,
        name: &str,
        ty: Type,
        public: bool,
        mutable: bool,
    ) -> &Symbol {
        self.get_or_create_package(module, package)
            .add_symbol(name, ty, public, mutable)
    }

    /// Symbol addressed as `module/package.name`
    pub fn lookup_qualified(&self, module: &str, package: &str, name: &str) -> Option<&Symbol> {
        self.find_package(module, package)?.scope.get(name)
    }

    /// Variant type definition addressed as `module/package.name`
    pub fn lookup_variant(&self, module: &str, package: &str, name: &str) -> Option<&VariantDefinition> {
        self.find_package(module, package)?.types.get(name)
    }

    /// Definition behind a variant type
    pub fn variant_definition(&self, ty: &VariantType) -> Option<&VariantDefinition> {
        self.lookup_variant(&ty.module, &ty.package, &ty.name)
    }

    /// Module named `name`
    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Modules in creation order
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }

    /// Every package of every module
    pub fn packages(&self) -> impl Iterator<Item = &PackageDescriptor> {
        self.modules.values().flat_map(Module::packages)
    }
}

impl VariantCaseLookup for Namespace {
    fn has_case(&self, variant: &VariantType, case: &str) -> bool {
        self.variant_definition(variant)
            .is_some_and(|definition| definition.case(case).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::VariantCase;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut namespace = Namespace::new();
        namespace
            .get_or_create_package("app", "main")
            .add_symbol("x", Type::INT, true, false);
        namespace.get_or_create_package("app", "main");
        namespace.get_or_create_package("app", "util");

        let module = namespace.module("app").unwrap();
        assert_eq!(module.packages().count(), 2);
        assert_eq!(
            namespace.lookup_qualified("app", "main", "x").map(|symbol| &symbol.ty),
            Some(&Type::INT)
        );
        assert!(namespace.find_package("app", "missing").is_none());
    }

    #[test]
    fn test_prelude_overloads_len() {
        let namespace = Namespace::with_prelude();
        let len = namespace
            .lookup_qualified(PRELUDE_MODULE, PRELUDE_PACKAGE, "len")
            .unwrap();
        assert!(matches!(&len.ty, Type::Overloaded(set) if set.len() == 2));
    }

    #[test]
    fn test_variant_case_lookup() {
        let mut namespace = Namespace::new();
        let definition = VariantDefinition {
            module: "app".to_string(),
            package: "main".to_string(),
            name: "Color".to_string(),
            type_params: Vec::new(),
            public: false,
            cases: vec![VariantCase {
                name: "Red".to_string(),
                fields: Vec::new(),
                public: false,
            }],
        };
        let ty = definition.ty();
        namespace
            .get_or_create_package("app", "main")
            .types
            .define(definition);

        assert!(namespace.has_case(&ty, "Red"));
        assert!(!namespace.has_case(&ty, "Blue"));
    }
}
