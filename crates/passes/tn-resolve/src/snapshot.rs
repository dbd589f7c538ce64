//! Precompiled namespace images
//!
//! A snapshot records every package's symbols and variant definitions so a
//! namespace can be seeded without re-reading source text.

use crate::error::SnapshotError;
use crate::namespace::Namespace;
use crate::registry::VariantDefinition;
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};

/// Serializable image of a [`Namespace`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSnapshot {
    /// Modules in creation order
    pub modules: Vec<ModuleSnapshot>,
}

/// Serializable image of one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSnapshot {
    /// Module name
    pub name: String,
    /// Packages in creation order
    pub packages: Vec<PackageSnapshot>,
}

/// Serializable image of one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSnapshot {
    /// Package name
    pub name: String,
    /// Package-level symbols
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    /// Variant type definitions
    #[serde(default)]
    pub variants: Vec<VariantDefinition>,
}

impl NamespaceSnapshot {
    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON image
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Namespace {
    /// Capture every module and package
    pub fn snapshot(&self) -> NamespaceSnapshot {
        let modules = self
            .modules()
            .map(|module| ModuleSnapshot {
                name: module.name.clone(),
                packages: module
                    .packages()
                    .map(|package| PackageSnapshot {
                        name: package.package.clone(),
                        symbols: package.scope.symbols().cloned().collect(),
                        variants: package.types.iter().cloned().collect(),
                    })
                    .collect(),
            })
            .collect();
        NamespaceSnapshot { modules }
    }

    /// Rebuild a namespace from a snapshot
    pub fn from_snapshot(snapshot: &NamespaceSnapshot) -> Self {
        let mut namespace = Self::new();
        namespace.load_snapshot(snapshot);
        namespace
    }

    /// Merge a snapshot into this namespace
    pub fn load_snapshot(&mut self, snapshot: &NamespaceSnapshot) {
        for module in &snapshot.modules {
            for package in &module.packages {
                let descriptor = self.get_or_create_package(&module.name, &package.name);
                for symbol in &package.symbols {
                    descriptor.add_symbol(&symbol.name, symbol.ty.clone(), symbol.public, symbol.mutable);
                }
                for variant in &package.variants {
                    descriptor.types.define(variant.clone());
                }
                tracing::debug!(
                    module = %module.name,
                    package = %package.name,
                    symbols = package.symbols.len(),
                    variants = package.variants.len(),
                    "loaded package from snapshot"
                );
            }
        }
    }

    /// Serialize the namespace as JSON
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        self.snapshot().to_json()
    }

    /// Rebuild a namespace from JSON
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(Self::from_snapshot(&NamespaceSnapshot::from_json(json)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use tn_ty::Type;

    #[test]
    fn test_snapshot_round_trip() {
        let namespace = Namespace::with_prelude();
        let json = namespace.to_json().unwrap();
        let restored = Namespace::from_json(&json).unwrap();
        assert_eq!(restored, namespace);
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut namespace = Namespace::new();
        namespace.add_symbol("app", "main", "answer", Type::INT, true, false);
        let json = serde_json::to_string(&namespace.snapshot()).unwrap();
        expect![[r#"{"modules":[{"name":"app","packages":[{"name":"main","symbols":[{"name":"answer","ty":{"Primitive":"Int"},"public":true,"mutable":false}],"variants":[]}]}]}"#]]
            .assert_eq(&json);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Namespace::from_json("{ not json"),
            Err(SnapshotError::Json(_))
        ));
    }
}
