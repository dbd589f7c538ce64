//! Type model for Tern
//!
//! This crate handles:
//! - Type representation (primitives, functions, overload sets, variants)
//! - Resolution of syntactic type references
//! - Unification of generic signatures against argument types

pub mod error;
pub mod resolve;
pub mod ty;
pub mod unify;

pub use error::TypeResolveError;
pub use resolve::{TypeLookup, VariantCaseLookup, builtin_type, resolve};
pub use ty::{FnType, OverloadSet, Primitive, Type, VariantType};
pub use unify::{UnificationError, Unifier, is_assignable};
