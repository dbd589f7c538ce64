//! Import table of one compilation unit

use crate::diagnostic::{DiagnosticKind, Diagnostics};
use rustc_hash::FxHashMap;
use tn_resolve::Namespace;
use tn_syntax::ImportDecl;

/// `module/package` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePath {
    /// Module name
    pub module: String,
    /// Package name
    pub package: String,
}

/// A name bound by an import list entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedName {
    /// Source module
    pub module: String,
    /// Source package
    pub package: String,
    /// Name in the source package
    pub name: String,
}

/// Whole-package aliases and individually imported names
#[derive(Debug, Default, Clone)]
pub struct ImportTable {
    aliases: FxHashMap<String, PackagePath>,
    names: FxHashMap<String, ImportedName>,
}

impl ImportTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table for `imports`, reporting unknown packages and names.
    ///
    /// An import without alias and without a name list binds the package
    /// under its own name. Names imported from another module must be public.
    pub fn build(
        imports: &[ImportDecl],
        namespace: &Namespace,
        current_module: &str,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut table = Self::new();
        for import in imports {
            let Some(descriptor) = namespace.find_package(&import.module, &import.package) else {
                diagnostics.report(
                    DiagnosticKind::UnknownPackage {
                        path: format!("{}/{}", import.module, import.package),
                    },
                    import.span,
                );
                continue;
            };
            let same_module = import.module == current_module;

            let alias = match (&import.alias, import.entries.is_empty()) {
                (Some(alias), _) => Some(alias.clone()),
                (None, true) => Some(import.package.clone()),
                (None, false) => None,
            };
            if let Some(alias) = alias {
                table.aliases.insert(
                    alias,
                    PackagePath {
                        module: import.module.clone(),
                        package: import.package.clone(),
                    },
                );
            }

            for entry in &import.entries {
                let visible = descriptor
                    .scope
                    .get(&entry.name)
                    .map(|symbol| symbol.public)
                    .or_else(|| descriptor.types.get(&entry.name).map(|variant| variant.public))
                    .is_some_and(|public| public || same_module);
                if !visible {
                    diagnostics.report(
                        DiagnosticKind::UnrecognizedName {
                            name: entry.name.clone(),
                        },
                        entry.span,
                    );
                    continue;
                }
                table.names.insert(
                    entry.local_name().to_string(),
                    ImportedName {
                        module: import.module.clone(),
                        package: import.package.clone(),
                        name: entry.name.clone(),
                    },
                );
            }

            tracing::debug!(
                module = %import.module,
                package = %import.package,
                names = import.entries.len(),
                "resolved import"
            );
        }
        table
    }

    /// Package bound to a whole-package alias
    pub fn alias(&self, alias: &str) -> Option<&PackagePath> {
        self.aliases.get(alias)
    }

    /// Origin of a name bound by an import list
    pub fn name(&self, local: &str) -> Option<&ImportedName> {
        self.names.get(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_ty::Type;

    fn namespace() -> Namespace {
        let mut namespace = Namespace::new();
        namespace.add_symbol("geo", "shapes", "area", Type::function(vec![], Type::INT), true, false);
        namespace.add_symbol("geo", "shapes", "secret", Type::INT, false, false);
        namespace
    }

    fn build(source: &str, module: &str) -> (ImportTable, Diagnostics) {
        let result = tn_parser::parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let mut diagnostics = Diagnostics::default();
        let table = ImportTable::build(&result.unit.imports, &namespace(), module, &mut diagnostics);
        (table, diagnostics)
    }

    #[test]
    fn test_package_imported_under_its_name() {
        let (table, diagnostics) = build("import geo/shapes", "app");
        assert!(diagnostics.is_empty());
        assert_eq!(table.alias("shapes").map(|path| path.module.as_str()), Some("geo"));
    }

    #[test]
    fn test_renamed_entry() {
        let (table, diagnostics) = build("import geo/shapes as s { area as surface }", "app");
        assert!(diagnostics.is_empty());
        assert!(table.alias("s").is_some());
        assert!(table.alias("shapes").is_none());
        assert_eq!(table.name("surface").map(|name| name.name.as_str()), Some("area"));
    }

    #[test]
    fn test_private_name_needs_same_module() {
        let (_, diagnostics) = build("import geo/shapes { secret }", "app");
        let kinds: Vec<_> = diagnostics.into_vec().into_iter().map(|diag| diag.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::UnrecognizedName {
                name: "secret".to_string()
            }]
        );

        let (table, diagnostics) = build("import geo/shapes { secret }", "geo");
        assert!(diagnostics.is_empty());
        assert!(table.name("secret").is_some());
    }

    #[test]
    fn test_unknown_package() {
        let (_, diagnostics) = build("import geo/missing", "app");
        let kinds: Vec<_> = diagnostics.into_vec().into_iter().map(|diag| diag.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::UnknownPackage {
                path: "geo/missing".to_string()
            }]
        );
    }
}
