//! Storage classification of variable accesses

use crate::error::LowerFault;
use tn_hir::{Target, VariableAccess};
use tn_lir::Storage;
use tn_resolve::{ScopeKind, ScopeTree};

/// Storage class of one read or write.
///
/// Depends only on the declaring scope and the scope of the access: the
/// function scopes crossed walking outward from the access to the
/// declaration give the closure depth, and a parameter used from its own
/// function is a positional argument.
///
/// # Errors
///
/// Returns `LowerFault::UnreachableScope` when the declaring scope does not
/// enclose the access
pub fn classify(scopes: &ScopeTree, access: &VariableAccess) -> Result<Storage, LowerFault> {
    let (declaring, name) = match &access.target {
        Target::Package {
            module,
            package,
            name,
        } => {
            return Ok(Storage::Package {
                module: module.clone(),
                package: package.clone(),
                name: name.clone(),
            });
        }
        Target::Scoped { scope, name } => (*scope, name),
    };

    let mut depth = 0;
    for scope in scopes.ancestors(access.scope) {
        if scope == declaring {
            if depth > 0 {
                return Ok(Storage::OuterScope {
                    name: name.clone(),
                    depth,
                });
            }
            if scopes.kind(scope) == ScopeKind::Function
                && let Some(index) = scopes.parameter_index(scope, name)
            {
                return Ok(Storage::FunctionArgument { index });
            }
            return Ok(Storage::Local { name: name.clone() });
        }
        if scopes.kind(scope) == ScopeKind::Function {
            depth += 1;
        }
    }

    Err(LowerFault::UnreachableScope {
        name: name.clone(),
        span: access.span,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_resolve::ScopeId;
    use tn_span::Span;
    use tn_ty::Type;

    fn access(declaring: ScopeId, from: ScopeId, name: &str) -> VariableAccess {
        VariableAccess {
            target: Target::Scoped {
                scope: declaring,
                name: name.to_string(),
            },
            scope: from,
            span: Span::default(),
        }
    }

    #[test]
    fn test_parameter_in_own_function() {
        let mut tree = ScopeTree::new();
        let function = tree.create_child(tree.root(), ScopeKind::Function);
        tree.add_parameter(function, "a", Type::INT);
        tree.add_parameter(function, "b", Type::INT);
        let body = tree.create_child(function, ScopeKind::Block);

        assert_eq!(
            classify(&tree, &access(function, body, "b")),
            Ok(Storage::FunctionArgument { index: 1 })
        );
    }

    #[test]
    fn test_capture_counts_function_boundaries() {
        let mut tree = ScopeTree::new();
        let outer = tree.create_child(tree.root(), ScopeKind::Function);
        tree.add_parameter(outer, "x", Type::INT);
        let outer_body = tree.create_child(outer, ScopeKind::Block);
        tree.add_symbol(outer_body, "y", Type::INT, false, true);
        let middle = tree.create_child(outer_body, ScopeKind::Function);
        let middle_body = tree.create_child(middle, ScopeKind::Block);
        let inner = tree.create_child(middle_body, ScopeKind::Function);
        let inner_body = tree.create_child(inner, ScopeKind::Block);

        assert_eq!(
            classify(&tree, &access(outer, middle_body, "x")),
            Ok(Storage::OuterScope {
                name: "x".to_string(),
                depth: 1
            })
        );
        assert_eq!(
            classify(&tree, &access(outer_body, inner_body, "y")),
            Ok(Storage::OuterScope {
                name: "y".to_string(),
                depth: 2
            })
        );
        assert_eq!(
            classify(&tree, &access(outer_body, outer_body, "y")),
            Ok(Storage::Local {
                name: "y".to_string()
            })
        );
    }

    #[test]
    fn test_classification_is_pure() {
        let mut tree = ScopeTree::new();
        let function = tree.create_child(tree.root(), ScopeKind::Function);
        let body = tree.create_child(function, ScopeKind::Block);
        tree.add_symbol(body, "v", Type::INT, false, false);
        let nested = tree.create_child(body, ScopeKind::Block);

        let first = classify(&tree, &access(body, nested, "v"));
        // Unrelated scopes do not change the answer
        let other = tree.create_child(tree.root(), ScopeKind::Function);
        tree.create_child(other, ScopeKind::Block);
        assert_eq!(classify(&tree, &access(body, nested, "v")), first);
        assert_eq!(
            first,
            Ok(Storage::Local {
                name: "v".to_string()
            })
        );
    }

    #[test]
    fn test_package_target() {
        let tree = ScopeTree::new();
        let access = VariableAccess {
            target: Target::Package {
                module: "std".to_string(),
                package: "lang".to_string(),
                name: "println".to_string(),
            },
            scope: tree.root(),
            span: Span::default(),
        };
        assert_eq!(
            classify(&tree, &access),
            Ok(Storage::Package {
                module: "std".to_string(),
                package: "lang".to_string(),
                name: "println".to_string(),
            })
        );
    }

    #[test]
    fn test_declaration_outside_access_chain() {
        let mut tree = ScopeTree::new();
        let left = tree.create_child(tree.root(), ScopeKind::Block);
        let right = tree.create_child(tree.root(), ScopeKind::Block);
        assert!(matches!(
            classify(&tree, &access(left, right, "z")),
            Err(LowerFault::UnreachableScope { .. })
        ));
    }
}
