//! Symbols and the redeclaration merge rule

use serde::{Deserialize, Serialize};
use tn_ty::{OverloadSet, Type};

/// A named, typed entry in a scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    /// Symbol name
    pub name: String,
    /// Resolved type, possibly an overload set
    pub ty: Type,
    /// Visible outside the declaring package
    pub public: bool,
    /// Reassignable (`var`)
    pub mutable: bool,
}

impl Symbol {
    /// Create a new symbol
    pub fn new(name: impl Into<String>, ty: Type, public: bool, mutable: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            public,
            mutable,
        }
    }

    /// Fold a redeclaration of the same name into this symbol.
    ///
    /// The type follows [`merge_types`]; flags are taken from the incoming
    /// declaration.
    pub fn merge(&mut self, incoming: Self) {
        let existing = std::mem::replace(&mut self.ty, Type::UNIT);
        self.ty = merge_types(existing, incoming.ty);
        self.public = incoming.public;
        self.mutable = incoming.mutable;
    }
}

/// Type of a name after redeclaring it with `incoming`.
///
/// Functions with the same parameter list replace each other, functions with
/// different parameter lists accumulate into an overload set, anything else is
/// replaced by the newer declaration.
pub fn merge_types(existing: Type, incoming: Type) -> Type {
    match (existing, incoming) {
        (Type::Function(old), Type::Function(new)) => {
            if old.params == new.params {
                Type::Function(new)
            } else {
                Type::Overloaded(OverloadSet::new([old, new]))
            }
        }
        (Type::Overloaded(mut set), Type::Function(new)) => {
            set.insert(new);
            Type::Overloaded(set)
        }
        (Type::Function(old), Type::Overloaded(new)) => {
            let mut set = OverloadSet::new([old]);
            set.extend(new);
            Type::Overloaded(set)
        }
        (Type::Overloaded(mut set), Type::Overloaded(new)) => {
            set.extend(new);
            Type::Overloaded(set)
        }
        (_, incoming) => incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_ty::FnType;

    fn f(params: Vec<Type>, ret: Type) -> Type {
        Type::function(params, ret)
    }

    fn declare(declarations: Vec<Type>) -> Type {
        let mut declarations = declarations.into_iter();
        let mut symbol = Symbol::new("f", declarations.next().unwrap(), false, false);
        for ty in declarations {
            symbol.merge(Symbol::new("f", ty, false, false));
        }
        symbol.ty
    }

    #[test]
    fn test_same_params_replace_return_type() {
        let merged = declare(vec![
            f(vec![Type::INT, Type::STRING], Type::UNIT),
            f(vec![Type::INT, Type::STRING], Type::INT),
        ]);
        assert_eq!(merged, f(vec![Type::INT, Type::STRING], Type::INT));
    }

    #[test]
    fn test_different_params_overload() {
        let merged = declare(vec![
            f(vec![Type::INT, Type::STRING], Type::INT),
            f(vec![Type::STRING], Type::INT),
        ]);
        assert_eq!(
            merged,
            Type::Overloaded(OverloadSet::new([
                FnType::new(vec![Type::INT, Type::STRING], Type::INT),
                FnType::new(vec![Type::STRING], Type::INT),
            ]))
        );
    }

    #[test]
    fn test_overload_accumulates() {
        let merged = declare(vec![
            f(vec![Type::INT, Type::STRING], Type::INT),
            f(vec![Type::STRING], Type::INT),
            f(vec![], Type::UNIT),
        ]);
        let Type::Overloaded(set) = &merged else {
            panic!("expected overload set, got {merged}");
        };
        assert_eq!(set.len(), 3);
        assert!(set.members().contains(&FnType::new(vec![], Type::UNIT)));
    }

    #[test]
    fn test_non_functions_replace() {
        assert_eq!(declare(vec![Type::INT, Type::STRING]), Type::STRING);
        assert_eq!(
            declare(vec![f(vec![], Type::UNIT), Type::INT]),
            Type::INT
        );
    }

    #[test]
    fn test_flags_follow_incoming() {
        let mut symbol = Symbol::new("x", Type::INT, false, true);
        symbol.merge(Symbol::new("x", Type::INT, true, false));
        assert!(symbol.public);
        assert!(!symbol.mutable);
    }
}
