//! Resolution of syntactic type references
//!
//! [`resolve`] turns a [`TypeRef`] from the parse tree into a [`Type`]. Names
//! are looked up in the in-scope generic parameters first, then through a
//! [`TypeLookup`], then among the primitives. The lookups are traits so the
//! resolver stays independent of the namespace.

use crate::error::TypeResolveError;
use crate::ty::{Primitive, Type};
use rustc_hash::FxHashMap;
use tn_syntax::TypeRef;

/// Name to type lookup
pub trait TypeLookup {
    /// Type registered under `name`
    fn lookup_type(&self, name: &str) -> Option<Type>;
}

/// Case list lookup for variant types
pub trait VariantCaseLookup {
    /// Whether the definition behind `variant` declares `case`
    fn has_case(&self, variant: &crate::ty::VariantType, case: &str) -> bool;
}

impl TypeLookup for FxHashMap<String, Type> {
    fn lookup_type(&self, name: &str) -> Option<Type> {
        self.get(name).cloned()
    }
}

/// Built-in type for `name`, if any
pub fn builtin_type(name: &str) -> Option<Type> {
    Primitive::from_name(name).map(Type::Primitive)
}

/// Resolve `type_ref` with `generics` in scope
///
/// # Errors
///
/// Returns `TypeResolveError` for unknown names, unknown cases and
/// constructor arity mismatches
pub fn resolve(
    type_ref: &TypeRef,
    generics: &[String],
    types: &dyn TypeLookup,
    cases: &dyn VariantCaseLookup,
) -> Result<Type, TypeResolveError> {
    match type_ref {
        TypeRef::Named { name, span } => resolve_name(name, generics, types).ok_or_else(|| {
            TypeResolveError::UnresolvedTypeReference {
                name: name.clone(),
                span: *span,
            }
        }),

        TypeRef::Function { params, ret, .. } => {
            let params = params
                .iter()
                .map(|param| resolve(param, generics, types, cases))
                .collect::<Result<Vec<_>, _>>()?;
            let ret = resolve(ret, generics, types, cases)?;
            Ok(Type::function(params, ret))
        }

        TypeRef::Constructor { base, args, span } => {
            let args = args
                .iter()
                .map(|arg| resolve(arg, generics, types, cases))
                .collect::<Result<Vec<_>, _>>()?;

            if let TypeRef::Named { name, .. } = base.as_ref()
                && name == "array"
                && !generics.contains(name)
                && types.lookup_type(name).is_none()
            {
                let [element] = <[Type; 1]>::try_from(args).map_err(|args| {
                    TypeResolveError::TypeArityMismatch {
                        name: name.clone(),
                        expected: 1,
                        actual: args.len(),
                        span: *span,
                    }
                })?;
                return Ok(Type::array(element));
            }

            let base_ty = resolve(base, generics, types, cases)?;
            match base_ty {
                Type::Variant(mut variant) if variant.type_params.len() == args.len() => {
                    variant.type_args = args;
                    Ok(Type::Variant(variant))
                }
                Type::Variant(variant) => Err(TypeResolveError::TypeArityMismatch {
                    name: variant.name,
                    expected: variant.type_params.len(),
                    actual: args.len(),
                    span: *span,
                }),
                other => Err(TypeResolveError::TypeArityMismatch {
                    name: other.to_string(),
                    expected: 0,
                    actual: args.len(),
                    span: *span,
                }),
            }
        }

        TypeRef::Case { base, case, span } => {
            let base_ty = resolve(base, generics, types, cases)?;
            match base_ty {
                Type::Variant(variant) if cases.has_case(&variant, case) => {
                    Ok(Type::Variant(variant.with_case(case.clone())))
                }
                _ => Err(TypeResolveError::UnresolvedTypeReference {
                    name: format!("{base}.{case}"),
                    span: *span,
                }),
            }
        }
    }
}

fn resolve_name(name: &str, generics: &[String], types: &dyn TypeLookup) -> Option<Type> {
    if generics.iter().any(|generic| generic == name) {
        return Some(Type::TypeParameter(name.to_string()));
    }
    types.lookup_type(name).or_else(|| builtin_type(name))
}
