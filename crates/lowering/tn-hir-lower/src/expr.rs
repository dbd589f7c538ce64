//! Literals, operators, control flow and collections

use crate::context::ConversionContext;
use crate::convert::{check_assignable, convert_expr};
use crate::diagnostic::DiagnosticKind;
use tn_hir::{BinaryOp, Expr, ExprId, InterpolationPart, Literal, UnaryOp};
use tn_span::Span;
use tn_syntax::Node;
use tn_ty::{Type, is_assignable};

/// Literal atom
pub fn convert_literal(ctx: &mut ConversionContext<'_>, value: &Literal, span: Span) -> ExprId {
    let ty = match value {
        Literal::Int(_) => Type::INT,
        Literal::Float(_) => Type::FLOAT,
        Literal::Bool(_) => Type::BOOL,
        Literal::String(_) => Type::STRING,
        Literal::Unit => Type::UNIT,
    };
    ctx.alloc(
        Expr::Literal {
            value: value.clone(),
            span,
        },
        ty,
    )
}

/// Interpolated string, one part per text run or expression
pub fn convert_interpolation(
    ctx: &mut ConversionContext<'_>,
    parts: &[tn_syntax::InterpolationPart],
    span: Span,
) -> ExprId {
    let parts = parts
        .iter()
        .map(|part| match part {
            tn_syntax::InterpolationPart::Text(text) => InterpolationPart::Text(text.clone()),
            tn_syntax::InterpolationPart::Expr(node) => {
                InterpolationPart::Expr(convert_expr(ctx, node))
            }
        })
        .collect();
    ctx.alloc(Expr::Interpolation { parts, span }, Type::STRING)
}

fn is_numeric(ty: &Type) -> bool {
    *ty == Type::INT || *ty == Type::FLOAT
}

/// Binary operator with operand checks
pub fn convert_binary(
    ctx: &mut ConversionContext<'_>,
    op: BinaryOp,
    left: &Node,
    right: &Node,
    span: Span,
) -> ExprId {
    let left = convert_expr(ctx, left);
    let right = convert_expr(ctx, right);
    let ty = if op.is_logical() {
        check_assignable(ctx, &Type::BOOL, left);
        check_assignable(ctx, &Type::BOOL, right);
        Type::BOOL
    } else if op.is_comparison() {
        check_comparison(ctx, op, left, right, span);
        Type::BOOL
    } else {
        arithmetic_type(ctx, op, left, right)
    };
    ctx.alloc(
        Expr::Binary {
            op,
            left,
            right,
            span,
        },
        ty,
    )
}

/// Result of `+ - * / %`: strings concatenate with anything, mixed
/// numbers widen to float
fn arithmetic_type(ctx: &mut ConversionContext<'_>, op: BinaryOp, left: ExprId, right: ExprId) -> Type {
    let (left_ty, right_ty) = (ctx.ty(left), ctx.ty(right));
    if op == BinaryOp::Add && (left_ty == Type::STRING || right_ty == Type::STRING) {
        return Type::STRING;
    }
    if left_ty.is_any() || right_ty.is_any() {
        return Type::ANY;
    }
    match (is_numeric(&left_ty), is_numeric(&right_ty)) {
        (true, true) if left_ty == Type::INT && right_ty == Type::INT => Type::INT,
        (true, true) => Type::FLOAT,
        (true, false) => {
            let span = ctx.program.span(right);
            ctx.report(
                DiagnosticKind::TypeMismatch {
                    expected: left_ty,
                    actual: right_ty,
                },
                span,
            );
            Type::ANY
        }
        (false, _) => {
            let span = ctx.program.span(left);
            ctx.report(
                DiagnosticKind::TypeMismatch {
                    expected: Type::INT,
                    actual: left_ty,
                },
                span,
            );
            Type::ANY
        }
    }
}

fn check_comparison(ctx: &mut ConversionContext<'_>, op: BinaryOp, left: ExprId, right: ExprId, span: Span) {
    let (left_ty, right_ty) = (ctx.ty(left), ctx.ty(right));
    let comparable = if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
        (is_numeric(&left_ty) && is_numeric(&right_ty))
            || is_assignable(&left_ty, &right_ty)
            || is_assignable(&right_ty, &left_ty)
    } else {
        left_ty.is_any()
            || right_ty.is_any()
            || (is_numeric(&left_ty) && is_numeric(&right_ty))
            || (left_ty == Type::STRING && right_ty == Type::STRING)
    };
    if !comparable {
        ctx.report(
            DiagnosticKind::TypeMismatch {
                expected: left_ty,
                actual: right_ty,
            },
            span,
        );
    }
}

/// `!` on bools, `-` on numbers
pub fn convert_unary(ctx: &mut ConversionContext<'_>, op: UnaryOp, operand: &Node, span: Span) -> ExprId {
    let operand = convert_expr(ctx, operand);
    let ty = match op {
        UnaryOp::Not => {
            check_assignable(ctx, &Type::BOOL, operand);
            Type::BOOL
        }
        UnaryOp::Negate => {
            let ty = ctx.ty(operand);
            if is_numeric(&ty) || ty.is_any() {
                ty
            } else {
                let span = ctx.program.span(operand);
                ctx.report(
                    DiagnosticKind::TypeMismatch {
                        expected: Type::INT,
                        actual: ty,
                    },
                    span,
                );
                Type::ANY
            }
        }
    };
    ctx.alloc(Expr::Unary { op, operand, span }, ty)
}

// ── Control flow ──

/// `if` without `else` is unit; with `else` both branches must agree
pub fn convert_if(
    ctx: &mut ConversionContext<'_>,
    condition: &Node,
    then_branch: &Node,
    else_branch: Option<&Node>,
    span: Span,
) -> ExprId {
    let condition = convert_expr(ctx, condition);
    check_assignable(ctx, &Type::BOOL, condition);
    let then_branch = convert_expr(ctx, then_branch);
    let else_branch = else_branch.map(|node| convert_expr(ctx, node));

    let ty = match else_branch {
        None => Type::UNIT,
        Some(else_branch) => {
            let then_type = ctx.ty(then_branch);
            let else_type = ctx.ty(else_branch);
            if is_assignable(&then_type, &else_type) && is_assignable(&else_type, &then_type) {
                if then_type.is_any() { else_type } else { then_type }
            } else {
                ctx.report(
                    DiagnosticKind::IfElseBranchesTypeMismatch {
                        then_type,
                        else_type,
                    },
                    span,
                );
                Type::ANY
            }
        }
    };

    ctx.alloc(
        Expr::If {
            condition,
            then_branch,
            else_branch,
            span,
        },
        ty,
    )
}

/// `while`, condition must be a bool
pub fn convert_while(ctx: &mut ConversionContext<'_>, condition: &Node, body: &Node, span: Span) -> ExprId {
    let condition = convert_expr(ctx, condition);
    check_assignable(ctx, &Type::BOOL, condition);
    let body = convert_expr(ctx, body);
    ctx.alloc(
        Expr::While {
            condition,
            body,
            span,
        },
        Type::UNIT,
    )
}

/// `return` is checked against the innermost function and has type `any`
pub fn convert_return(ctx: &mut ConversionContext<'_>, value: Option<&Node>, span: Span) -> ExprId {
    let value = value.map(|node| convert_expr(ctx, node));
    match (ctx.return_type().cloned(), value) {
        (None, _) => ctx.report(DiagnosticKind::ReturnOutsideFunction, span),
        (Some(expected), Some(value)) => check_assignable(ctx, &expected, value),
        (Some(expected), None) => {
            if !expected.is_unit() && !expected.is_any() {
                ctx.report(DiagnosticKind::MissingReturnValue { expected }, span);
            }
        }
    }
    ctx.alloc(Expr::Return { value, span }, Type::ANY)
}

// ── Values ──

/// `receiver[index]` on arrays
pub fn convert_index(ctx: &mut ConversionContext<'_>, receiver: &Node, index: &Node, span: Span) -> ExprId {
    let receiver = convert_expr(ctx, receiver);
    let index = convert_expr(ctx, index);
    check_assignable(ctx, &Type::INT, index);

    let ty = match ctx.ty(receiver) {
        Type::Array(element) => *element,
        ty if ty == Type::STRING || ty.is_any() => ty,
        ty => {
            let span = ctx.program.span(receiver);
            ctx.report(DiagnosticKind::TypeIsNotIndexable { ty }, span);
            Type::ANY
        }
    };
    ctx.alloc(
        Expr::Index {
            receiver,
            index,
            span,
        },
        ty,
    )
}

/// `receiver[index] = value`; strings are not writable
pub fn convert_index_assignment(
    ctx: &mut ConversionContext<'_>,
    receiver: &Node,
    index: &Node,
    value: &Node,
    span: Span,
) -> ExprId {
    let receiver = convert_expr(ctx, receiver);
    let index = convert_expr(ctx, index);
    let value = convert_expr(ctx, value);
    check_assignable(ctx, &Type::INT, index);

    match ctx.ty(receiver) {
        Type::Array(element) => check_assignable(ctx, &element, value),
        ty if ty.is_any() => {}
        ty => {
            let span = ctx.program.span(receiver);
            ctx.report(DiagnosticKind::TypeIsNotIndexable { ty }, span);
        }
    }
    ctx.alloc(
        Expr::IndexAssignment {
            receiver,
            index,
            value,
            span,
        },
        Type::UNIT,
    )
}

/// `value is Case`, valid on variants declaring the case
pub fn convert_is(ctx: &mut ConversionContext<'_>, value: &Node, case: &str, span: Span) -> ExprId {
    let value = convert_expr(ctx, value);
    let ty = ctx.ty(value);
    let known = match &ty {
        Type::Variant(variant) => ctx
            .namespace
            .variant_definition(variant)
            .is_some_and(|definition| definition.case(case).is_some()),
        other => other.is_any(),
    };
    if !known {
        ctx.report(
            DiagnosticKind::UnknownMember {
                ty,
                member: case.to_string(),
            },
            span,
        );
    }
    ctx.alloc(
        Expr::Is {
            value,
            case: case.to_string(),
            span,
        },
        Type::BOOL,
    )
}

/// Element type is the first element not typed `any`
pub fn convert_array(ctx: &mut ConversionContext<'_>, elements: &[Node], span: Span) -> ExprId {
    let elements: Vec<ExprId> = elements.iter().map(|node| convert_expr(ctx, node)).collect();
    let element = elements
        .iter()
        .map(|id| ctx.ty(*id))
        .find(|ty| !ty.is_any())
        .unwrap_or(Type::ANY);
    for id in &elements {
        check_assignable(ctx, &element, *id);
    }
    ctx.alloc(Expr::Array { elements, span }, Type::array(element))
}
