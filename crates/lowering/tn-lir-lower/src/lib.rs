//! HIR → LIR lowering
//!
//! Replaces every resolved variable access with its storage class and drops
//! the scope tree. Declarations keep the flags a backend needs to emit them.

pub mod error;
pub mod storage;

pub use error::LowerFault;
pub use storage::classify;

use tn_hir::{Expr, ExprId, InterpolationPart, Literal, Program};
use tn_lir::{CaseShape, Node, NodeKind, Storage, Value};
use tn_ty::Type;

/// Lower a converted program
///
/// # Errors
///
/// Returns `LowerFault` for error nodes and unreachable scopes
pub fn lower_program(program: &Program) -> Result<tn_lir::Program, LowerFault> {
    let items = program
        .items
        .iter()
        .map(|item| lower_expr(program, *item))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(
        module = %program.module,
        package = %program.package,
        items = items.len(),
        "lowered program"
    );
    Ok(tn_lir::Program {
        module: program.module.clone(),
        package: program.package.clone(),
        items,
    })
}

fn lower_value(literal: &Literal) -> Value {
    match literal {
        Literal::Int(value) => Value::Int(*value),
        Literal::Float(value) => Value::Float(*value),
        Literal::Bool(value) => Value::Bool(*value),
        Literal::String(value) => Value::String(value.clone()),
        Literal::Unit => Value::Unit,
    }
}

fn lower_boxed(program: &Program, id: ExprId) -> Result<Box<Node>, LowerFault> {
    lower_expr(program, id).map(Box::new)
}

fn lower_all(program: &Program, ids: &[ExprId]) -> Result<Vec<Node>, LowerFault> {
    ids.iter().map(|id| lower_expr(program, *id)).collect()
}

fn lower_expr(program: &Program, id: ExprId) -> Result<Node, LowerFault> {
    let expr = program.expr(id);
    let span = expr.span();
    let kind = match expr {
        Expr::Literal { value, .. } => NodeKind::Value(lower_value(value)),
        Expr::Interpolation { parts, .. } => NodeKind::Interpolation {
            parts: parts
                .iter()
                .map(|part| match part {
                    InterpolationPart::Text(text) => {
                        Ok(Node::new(NodeKind::Value(Value::String(text.clone())), span))
                    }
                    InterpolationPart::Expr(expr) => lower_expr(program, *expr),
                })
                .collect::<Result<_, _>>()?,
        },
        Expr::Variable(access) => NodeKind::Read {
            storage: classify(&program.scopes, access)?,
        },
        Expr::DefinePackageFunction { item, value, .. } => {
            let params = match program.ty(*value) {
                Type::Function(signature) => signature.params.clone(),
                _ => Vec::new(),
            };
            NodeKind::DefinePackageFunction {
                module: item.module.clone(),
                package: item.package.clone(),
                name: item.name.clone(),
                public: item.public,
                mutable: item.mutable,
                params,
                function: lower_boxed(program, *value)?,
            }
        }
        Expr::DefinePackageVariable { item, value, .. } => NodeKind::DefinePackageVariable {
            module: item.module.clone(),
            package: item.package.clone(),
            name: item.name.clone(),
            public: item.public,
            mutable: item.mutable,
            value: lower_boxed(program, *value)?,
        },
        Expr::DefineLocalVariable {
            name,
            mutable,
            value,
            ..
        } => NodeKind::DeclareLocal {
            name: name.clone(),
            mutable: *mutable,
            value: lower_boxed(program, *value)?,
        },
        Expr::Assignment { target, value, .. } => NodeKind::Write {
            storage: classify(&program.scopes, target)?,
            value: lower_boxed(program, *value)?,
        },
        Expr::IndexAssignment {
            receiver,
            index,
            value,
            ..
        } => NodeKind::WriteIndex {
            receiver: lower_boxed(program, *receiver)?,
            index: lower_boxed(program, *index)?,
            value: lower_boxed(program, *value)?,
        },
        Expr::Function { params, body, .. } => NodeKind::Function {
            params: params.iter().map(|param| param.name.clone()).collect(),
            body: lower_boxed(program, *body)?,
        },
        Expr::Block { body, .. } => NodeKind::Block {
            body: lower_all(program, body)?,
        },
        Expr::Call { callee, args, .. } => NodeKind::Call {
            callee: lower_boxed(program, *callee)?,
            args: lower_all(program, args)?,
        },
        Expr::FieldAccess {
            receiver, field, ..
        } => NodeKind::Field {
            receiver: lower_boxed(program, *receiver)?,
            field: field.clone(),
        },
        Expr::Index {
            receiver, index, ..
        } => NodeKind::Index {
            receiver: lower_boxed(program, *receiver)?,
            index: lower_boxed(program, *index)?,
        },
        Expr::Binary {
            op, left, right, ..
        } => NodeKind::Binary {
            op: *op,
            left: lower_boxed(program, *left)?,
            right: lower_boxed(program, *right)?,
        },
        Expr::Unary { op, operand, .. } => NodeKind::Unary {
            op: *op,
            operand: lower_boxed(program, *operand)?,
        },
        Expr::If {
            condition,
            then_branch,
            else_branch,
            ..
        } => NodeKind::If {
            condition: lower_boxed(program, *condition)?,
            then_branch: lower_boxed(program, *then_branch)?,
            else_branch: else_branch
                .map(|branch| lower_boxed(program, branch))
                .transpose()?,
        },
        Expr::While {
            condition, body, ..
        } => NodeKind::While {
            condition: lower_boxed(program, *condition)?,
            body: lower_boxed(program, *body)?,
        },
        Expr::Return { value, .. } => NodeKind::Return {
            value: value.map(|value| lower_boxed(program, value)).transpose()?,
        },
        Expr::Is { value, case, .. } => NodeKind::Is {
            value: lower_boxed(program, *value)?,
            case: case.clone(),
        },
        Expr::Array { elements, .. } => NodeKind::Array {
            elements: lower_all(program, elements)?,
        },
        Expr::DefineVariantType { definition, .. } => NodeKind::DefineVariantType {
            module: definition.module.clone(),
            package: definition.package.clone(),
            name: definition.name.clone(),
            cases: definition
                .cases
                .iter()
                .map(|case| CaseShape {
                    name: case.name.clone(),
                    fields: case.fields.iter().map(|field| field.name.clone()).collect(),
                })
                .collect(),
        },
        Expr::Error { span } => return Err(LowerFault::UnexpectedErrorNode { span: *span }),
    };
    Ok(Node::new(kind, span))
}

/// Storage classes of every access in `program`, in allocation order
///
/// # Errors
///
/// Returns `LowerFault::UnreachableScope` for an access outside its
/// declaring scope
pub fn storage_map(program: &Program) -> Result<Vec<(String, Storage)>, LowerFault> {
    program
        .variable_accesses()
        .map(|access| Ok((access.target.name().to_string(), classify(&program.scopes, access)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use tn_resolve::Namespace;

    fn lowered(source: &str) -> tn_lir::Program {
        let result = tn_parser::parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let mut namespace = Namespace::with_prelude();
        let hir = tn_hir_lower::lower_unit(&result.unit, &mut namespace, "user", "default").unwrap();
        assert!(hir.diagnostics.is_empty(), "{:?}", hir.diagnostics);
        lower_program(&hir.program).unwrap()
    }

    #[test]
    fn test_lower_closure() {
        let program = lowered(
            "fn counter(start: int) {\n  var count = start\n  val bump = fn() { count = count + 1 }\n  bump()\n}",
        );
        expect![[r#"
            program user/default
              define fn user/default.counter(int)
                function(start)
                  block
                    local var count
                      read arg 0
                    local val bump
                      function()
                        block
                          write outer count depth 1
                            binary +
                              read outer count depth 1
                              int 1
                    call
                      read local bump
        "#]]
        .assert_eq(&program.to_string());
    }

    #[test]
    fn test_lower_package_declarations() {
        let program = lowered(
            "pub var total = 0\nval add = fn(x: int) { total = total + x }\n\
             data Box = Full(item: int) | Empty\nprintln(\"total: ${total}\")",
        );
        expect![[r#"
            program user/default
              define var user/default.total pub
                int 0
              define fn user/default.add(int)
                function(x)
                  block
                    write package user/default.total
                      binary +
                        read package user/default.total
                        read arg 0
              define data user/default.Box
                case Full(item)
                case Empty()
              call
                read package std/lang.println
                interpolate
                  string "total: "
                  read package user/default.total
        "#]]
        .assert_eq(&program.to_string());
    }

    #[test]
    fn test_error_node_is_a_fault() {
        let result = tn_parser::parse("missing");
        let mut namespace = Namespace::with_prelude();
        let hir = tn_hir_lower::lower_unit(&result.unit, &mut namespace, "user", "default").unwrap();
        assert!(matches!(
            lower_program(&hir.program),
            Err(LowerFault::UnexpectedErrorNode { .. })
        ));
    }

    #[test]
    fn test_storage_map_of_nested_functions() {
        let result = tn_parser::parse("fn f(a: int): int {\n  val b = a\n  fn g(): int { a + b }\n  g()\n}");
        let mut namespace = Namespace::with_prelude();
        let hir = tn_hir_lower::lower_unit(&result.unit, &mut namespace, "user", "default").unwrap();
        assert!(hir.diagnostics.is_empty(), "{:?}", hir.diagnostics);
        let map = storage_map(&hir.program).unwrap();
        assert_eq!(
            map,
            vec![
                ("a".to_string(), Storage::FunctionArgument { index: 0 }),
                (
                    "a".to_string(),
                    Storage::OuterScope {
                        name: "a".to_string(),
                        depth: 1
                    }
                ),
                (
                    "b".to_string(),
                    Storage::OuterScope {
                        name: "b".to_string(),
                        depth: 1
                    }
                ),
                (
                    "g".to_string(),
                    Storage::Local {
                        name: "g".to_string()
                    }
                ),
            ]
        );
    }
}
