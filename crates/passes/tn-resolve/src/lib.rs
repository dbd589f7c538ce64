//! Symbol tables for Tern
//!
//! The [`Namespace`] is the long-lived registry of modules and packages. Each
//! package owns a [`Scope`] of symbols and a [`TypeRegistry`] of variant
//! types. Nested scopes created while converting one compilation unit live in
//! a [`ScopeTree`] that the conversion owns.

pub mod error;
pub mod namespace;
pub mod registry;
pub mod scope;
pub mod snapshot;
pub mod symbol;

pub use error::SnapshotError;
pub use namespace::{Module, Namespace, PackageDescriptor, PRELUDE_MODULE, PRELUDE_PACKAGE};
pub use registry::{Field, TypeRegistry, VariantCase, VariantDefinition};
pub use scope::{Scope, ScopeData, ScopeId, ScopeKind, ScopeTree};
pub use snapshot::{ModuleSnapshot, NamespaceSnapshot, PackageSnapshot};
pub use symbol::{Symbol, merge_types};
