//! Calls, method calls and member access
//!
//! `receiver.m(args)` is resolved statically, in order: a package alias
//! named like the receiver when the receiver is not a value, the package
//! defining the receiver's variant type, a field of that variant holding a
//! function, and finally the ordinary name lookup. Package functions found
//! this way receive the receiver as their first argument.

use crate::context::{ConversionContext, Resolved};
use crate::convert::convert_expr;
use crate::diagnostic::DiagnosticKind;
use tn_hir::{Expr, ExprId, VariableAccess};
use tn_span::Span;
use tn_syntax::Node;
use tn_ty::{FnType, Type, Unifier, VariantType};

/// Convert `callee(args)`, including method calls
pub fn convert_call(ctx: &mut ConversionContext<'_>, callee: &Node, args: &[Node], span: Span) -> ExprId {
    if let Node::Member {
        receiver,
        member,
        member_span,
        ..
    } = callee
    {
        return convert_method_call(ctx, receiver, member, *member_span, args, span);
    }

    let name = match callee {
        Node::Name { name, .. } | Node::QualifiedName { name, .. } => name.clone(),
        other => other.describe(),
    };
    let callee = convert_expr(ctx, callee);
    let args = convert_args(ctx, args);
    finish_call(ctx, &name, callee, args, span)
}

fn convert_method_call(
    ctx: &mut ConversionContext<'_>,
    receiver: &Node,
    method: &str,
    method_span: Span,
    args: &[Node],
    span: Span,
) -> ExprId {
    if let Node::Name { name: alias, .. } = receiver
        && ctx.names_package(alias)
    {
        let args = convert_args(ctx, args);
        let Some(resolved) = ctx.resolve_qualified(alias, method) else {
            ctx.report(
                DiagnosticKind::UnrecognizedName {
                    name: format!("{alias}.{method}"),
                },
                method_span,
            );
            return ctx.error(span);
        };
        let callee = variable(ctx, resolved, method_span);
        return finish_call(ctx, method, callee, args, span);
    }

    let receiver = convert_expr(ctx, receiver);
    if let Type::Variant(variant) = ctx.ty(receiver) {
        if let Some(resolved) = ctx.resolve_in_package(&variant.module, &variant.package, method) {
            tracing::trace!(method, package = %variant.package, "method resolved in defining package");
            let callee = variable(ctx, resolved, method_span);
            let args = with_receiver(ctx, receiver, args);
            return finish_call(ctx, method, callee, args, span);
        }
        if let Some(field_ty) = field_type(ctx, &variant, method) {
            let field_span = ctx.program.span(receiver).to(method_span);
            let callee = ctx.alloc(
                Expr::FieldAccess {
                    receiver,
                    field: method.to_string(),
                    span: field_span,
                },
                field_ty,
            );
            let args = convert_args(ctx, args);
            return finish_call(ctx, method, callee, args, span);
        }
    }

    if let Some(resolved) = ctx.resolve_name(method) {
        let callee = variable(ctx, resolved, method_span);
        let args = with_receiver(ctx, receiver, args);
        return finish_call(ctx, method, callee, args, span);
    }

    ctx.report(
        DiagnosticKind::UnrecognizedName {
            name: method.to_string(),
        },
        method_span,
    );
    convert_args(ctx, args);
    ctx.error(span)
}

/// `receiver.member` outside a call: qualified variable or variant field
pub fn convert_member(
    ctx: &mut ConversionContext<'_>,
    receiver: &Node,
    member: &str,
    member_span: Span,
    span: Span,
) -> ExprId {
    if let Node::Name { name: alias, .. } = receiver
        && ctx.names_package(alias)
    {
        let Some(resolved) = ctx.resolve_qualified(alias, member) else {
            ctx.report(
                DiagnosticKind::UnrecognizedName {
                    name: format!("{alias}.{member}"),
                },
                member_span,
            );
            return ctx.error(span);
        };
        let access = VariableAccess {
            target: resolved.target,
            scope: ctx.scope(),
            span,
        };
        return ctx.alloc(Expr::Variable(access), resolved.symbol.ty);
    }

    let receiver = convert_expr(ctx, receiver);
    let receiver_ty = ctx.ty(receiver);
    let field_ty = match &receiver_ty {
        Type::Variant(variant) => field_type(ctx, variant, member),
        ty if ty.is_any() => Some(Type::ANY),
        _ => None,
    };
    let Some(field_ty) = field_ty else {
        ctx.report(
            DiagnosticKind::UnknownMember {
                ty: receiver_ty,
                member: member.to_string(),
            },
            member_span,
        );
        return ctx.error(span);
    };
    ctx.alloc(
        Expr::FieldAccess {
            receiver,
            field: member.to_string(),
            span,
        },
        field_ty,
    )
}

/// `module/package.name`, without going through the import table
pub fn convert_qualified(
    ctx: &mut ConversionContext<'_>,
    module: &str,
    package: &str,
    name: &str,
    name_span: Span,
    span: Span,
) -> ExprId {
    if ctx.namespace.find_package(module, package).is_none() {
        ctx.report(
            DiagnosticKind::UnknownPackage {
                path: format!("{module}/{package}"),
            },
            span,
        );
        return ctx.error(span);
    }
    let Some(resolved) = ctx.resolve_in_package(module, package, name) else {
        ctx.report(
            DiagnosticKind::UnrecognizedName {
                name: format!("{module}/{package}.{name}"),
            },
            name_span,
        );
        return ctx.error(span);
    };
    variable(ctx, resolved, span)
}

fn field_type(ctx: &ConversionContext<'_>, variant: &VariantType, field: &str) -> Option<Type> {
    ctx.namespace
        .variant_definition(variant)?
        .field_type(variant, field)
}

fn variable(ctx: &mut ConversionContext<'_>, resolved: Resolved, span: Span) -> ExprId {
    let access = VariableAccess {
        target: resolved.target,
        scope: ctx.scope(),
        span,
    };
    ctx.alloc(Expr::Variable(access), resolved.symbol.ty)
}

fn convert_args(ctx: &mut ConversionContext<'_>, args: &[Node]) -> Vec<ExprId> {
    args.iter().map(|arg| convert_expr(ctx, arg)).collect()
}

fn with_receiver(ctx: &mut ConversionContext<'_>, receiver: ExprId, args: &[Node]) -> Vec<ExprId> {
    let mut converted = Vec::with_capacity(args.len() + 1);
    converted.push(receiver);
    converted.extend(args.iter().map(|arg| convert_expr(ctx, arg)));
    converted
}

fn finish_call(
    ctx: &mut ConversionContext<'_>,
    name: &str,
    callee: ExprId,
    args: Vec<ExprId>,
    span: Span,
) -> ExprId {
    // Parameters the arguments left unbound must not escape the call
    let ty = call_type(ctx, name, callee, &args, span).erase_type_params(ctx.generics());
    ctx.alloc(Expr::Call { callee, args, span }, ty)
}

/// Result type of calling `callee` with `args`, reporting what does not fit
fn call_type(ctx: &mut ConversionContext<'_>, name: &str, callee: ExprId, args: &[ExprId], span: Span) -> Type {
    match ctx.ty(callee) {
        Type::Function(signature) => check_signature(ctx, &signature, args, span),
        Type::Overloaded(set) => {
            let arg_types: Vec<Type> = args.iter().map(|arg| ctx.ty(*arg)).collect();
            if let Some(ret) = set
                .members()
                .iter()
                .find_map(|member| try_signature(member, &arg_types))
            {
                return ret;
            }
            ctx.report(
                DiagnosticKind::NoMatchingOverload {
                    name: name.to_string(),
                    args: arg_types,
                },
                span,
            );
            Type::ANY
        }
        ty if ty.is_any() => Type::ANY,
        ty => {
            let callee_span = ctx.program.span(callee);
            ctx.report(
                DiagnosticKind::NotAFunction {
                    name: name.to_string(),
                    ty,
                },
                callee_span,
            );
            Type::ANY
        }
    }
}

/// Check arguments against one signature, inferring its type parameters
fn check_signature(ctx: &mut ConversionContext<'_>, signature: &FnType, args: &[ExprId], span: Span) -> Type {
    if signature.params.len() != args.len() {
        ctx.report(
            DiagnosticKind::FunctionArityMismatch {
                expected: signature.params.len(),
                actual: args.len(),
            },
            span,
        );
        return if signature.ret.has_type_params() {
            Type::ANY
        } else {
            (*signature.ret).clone()
        };
    }

    let mut unifier = Unifier::new();
    for (param, arg) in signature.params.iter().zip(args) {
        let actual = ctx.ty(*arg);
        if unifier.unify(param, &actual).is_err() {
            let arg_span = ctx.program.span(*arg);
            ctx.report(
                DiagnosticKind::TypeMismatch {
                    expected: unifier.apply(param),
                    actual,
                },
                arg_span,
            );
        }
    }
    unifier.apply(&signature.ret)
}

/// Result type when `args` fit `signature`
fn try_signature(signature: &FnType, args: &[Type]) -> Option<Type> {
    if signature.params.len() != args.len() {
        return None;
    }
    let mut unifier = Unifier::new();
    for (param, arg) in signature.params.iter().zip(args) {
        unifier.unify(param, arg).ok()?;
    }
    Some(unifier.apply(&signature.ret))
}
