//! Type unification
#![allow(
    clippy::min_ident_chars,
    reason = "Ty is the conventional name in type system implementations"
)]

use crate::ty::{FnType, Type};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Unification error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnificationError {
    /// Types cannot be unified
    #[error("type mismatch: expected {expected}, found {found}")]
    Mismatch {
        /// Expected type
        expected: Type,
        /// Found type
        found: Type,
    },

    /// Occurs check failed (infinite type)
    #[error("occurs check failed: {param} occurs in {ty}")]
    OccursCheck {
        /// Type parameter
        param: String,
        /// Type containing the parameter
        ty: Type,
    },
}

/// Unifier binding type parameters to concrete types
#[derive(Debug, Default, Clone)]
pub struct Unifier {
    bindings: FxHashMap<String, Type>,
}

impl Unifier {
    /// Create a new unifier with no bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Bindings collected so far
    pub fn bindings(&self) -> &FxHashMap<String, Type> {
        &self.bindings
    }

    /// Substitute every binding into `ty`
    pub fn apply(&self, ty: &Type) -> Type {
        let mut current = ty.substitute(&self.bindings);
        // Bindings may refer to parameters bound later
        for _ in 0..self.bindings.len() {
            let next = current.substitute(&self.bindings);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Unify an expected type with the type actually supplied.
    ///
    /// A variant narrowed to a case unifies with its base type in both
    /// directions; two different cases never unify. `any` unifies with
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns `UnificationError` if the types cannot be unified
    pub fn unify(&mut self, expected: &Type, found: &Type) -> Result<(), UnificationError> {
        let mismatch = || UnificationError::Mismatch {
            expected: expected.clone(),
            found: found.clone(),
        };

        if expected == found || expected.is_any() || found.is_any() {
            return Ok(());
        }

        match (expected, found) {
            (Type::TypeParameter(name), _) => self.unify_param(name, found, false),
            (_, Type::TypeParameter(name)) => self.unify_param(name, expected, true),

            (Type::Function(left), Type::Function(right)) => self.unify_fn(left, right),

            // Passing an overload set where one signature is expected
            (Type::Function(left), Type::Overloaded(set)) => {
                for member in set.members() {
                    let mut attempt = self.clone();
                    if attempt.unify_fn(left, member).is_ok() {
                        *self = attempt;
                        return Ok(());
                    }
                }
                Err(mismatch())
            }

            (Type::Array(left), Type::Array(right)) => self.unify(left, right),

            (Type::Variant(left), Type::Variant(right)) => {
                let cases_differ =
                    left.case.is_some() && right.case.is_some() && left.case != right.case;
                if !left.same_definition(right)
                    || left.type_args.len() != right.type_args.len()
                    || cases_differ
                {
                    return Err(mismatch());
                }
                for (left_arg, right_arg) in left.type_args.iter().zip(&right.type_args) {
                    self.unify(left_arg, right_arg)?;
                }
                Ok(())
            }

            _ => Err(mismatch()),
        }
    }

    fn unify_fn(&mut self, left: &FnType, right: &FnType) -> Result<(), UnificationError> {
        if left.params.len() != right.params.len() {
            return Err(UnificationError::Mismatch {
                expected: Type::Function(left.clone()),
                found: Type::Function(right.clone()),
            });
        }
        for (left_param, right_param) in left.params.iter().zip(&right.params) {
            self.unify(left_param, right_param)?;
        }
        self.unify(&left.ret, &right.ret)
    }

    fn unify_param(&mut self, name: &str, ty: &Type, flipped: bool) -> Result<(), UnificationError> {
        if let Some(bound) = self.bindings.get(name).cloned() {
            return if flipped {
                self.unify(ty, &bound)
            } else {
                self.unify(&bound, ty)
            };
        }
        if matches!(ty, Type::TypeParameter(other) if other == name) {
            return Ok(());
        }
        let ty = self.apply(ty);
        if ty.mentions(name) {
            return Err(UnificationError::OccursCheck {
                param: name.to_string(),
                ty,
            });
        }
        self.bindings.insert(name.to_string(), ty);
        Ok(())
    }
}

/// Whether a value of type `found` may be used where `expected` is required
pub fn is_assignable(expected: &Type, found: &Type) -> bool {
    Unifier::new().unify(expected, found).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::{OverloadSet, VariantType};

    fn param(name: &str) -> Type {
        Type::TypeParameter(name.to_string())
    }

    #[test]
    fn test_unify_binds_type_parameters() {
        let mut unifier = Unifier::new();
        unifier
            .unify(&Type::array(param("T")), &Type::array(Type::INT))
            .unwrap();
        assert_eq!(unifier.apply(&param("T")), Type::INT);

        let err = unifier.unify(&param("T"), &Type::STRING).unwrap_err();
        assert!(matches!(err, UnificationError::Mismatch { .. }));
    }

    #[test]
    fn test_occurs_check() {
        let mut unifier = Unifier::new();
        let err = unifier
            .unify(&param("T"), &Type::array(param("T")))
            .unwrap_err();
        assert!(matches!(err, UnificationError::OccursCheck { .. }));
    }

    #[test]
    fn test_case_is_assignable_to_base() {
        let option = VariantType::generic("std", "option", "Option", vec!["T".to_string()]);
        let mut int_option = option.clone();
        int_option.type_args = vec![Type::INT];

        let just = Type::Variant(option.with_case("Just"));
        assert!(is_assignable(&Type::Variant(int_option.clone()), &just));
        assert!(!is_assignable(
            &Type::Variant(int_option.with_case("Nothing")),
            &Type::Variant(int_option.with_case("Just"))
        ));
    }

    #[test]
    fn test_any_and_overloads() {
        assert!(is_assignable(&Type::INT, &Type::ANY));
        assert!(!is_assignable(&Type::INT, &Type::STRING));

        let overloads = Type::Overloaded(OverloadSet::new([
            FnType::new(vec![Type::INT], Type::UNIT),
            FnType::new(vec![Type::STRING], Type::UNIT),
        ]));
        assert!(is_assignable(
            &Type::function(vec![Type::STRING], Type::UNIT),
            &overloads
        ));
    }
}
