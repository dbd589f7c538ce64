//! Conversion pass: parse tree to HIR
//!
//! Declarations, functions and blocks live here; operators and control flow
//! are in [`crate::expr`], calls and member access in [`crate::call`].

use crate::call;
use crate::context::ConversionContext;
use crate::diagnostic::DiagnosticKind;
use crate::error::ConversionFault;
use crate::expr;
use crate::register::{function_signature, resolve_annotation, resolve_params, variant_definition};
use tn_hir::{Expr, ExprId, PackageItem, Param, VariableAccess};
use tn_resolve::ScopeKind;
use tn_span::Span;
use tn_syntax::{FunctionDeclaration, NameDeclaration, Node, VariantTypeDefinition};
use tn_ty::{Type, is_assignable};

/// Convert a top-level node
///
/// # Errors
///
/// Returns `ConversionFault` when a `fn` or `data` declaration registered
/// for this unit is no longer in the namespace
pub fn convert_item(ctx: &mut ConversionContext<'_>, node: &Node) -> Result<ExprId, ConversionFault> {
    match node {
        Node::FunctionDeclaration(decl) => convert_package_function(ctx, decl),
        Node::VariantTypeDefinition(def) => convert_package_variant(ctx, def),
        other => Ok(convert_expr(ctx, other)),
    }
}

/// Convert any node in the current scope
pub fn convert_expr(ctx: &mut ConversionContext<'_>, node: &Node) -> ExprId {
    match node {
        Node::Literal { value, span } => expr::convert_literal(ctx, value, *span),
        Node::Interpolation { parts, span } => expr::convert_interpolation(ctx, parts, *span),
        Node::Name { name, span } => convert_name(ctx, name, *span),
        Node::QualifiedName {
            module,
            package,
            name,
            name_span,
            span,
        } => call::convert_qualified(ctx, module, package, name, *name_span, *span),
        Node::NameDeclaration(decl) => convert_name_declaration(ctx, decl),
        Node::FunctionDeclaration(decl) => convert_local_function(ctx, decl),
        Node::VariantTypeDefinition(def) => convert_nested_variant(ctx, def),
        Node::Lambda {
            params,
            return_type,
            body,
            span,
        } => {
            let params = resolve_params(ctx, params, true);
            let ret = resolve_annotation(ctx, return_type.as_ref(), true);
            convert_function(ctx, params, ret, body, *span)
        }
        Node::Block { body, span } => convert_block(ctx, body, *span),
        Node::Call { callee, args, span } => call::convert_call(ctx, callee, args, *span),
        Node::Member {
            receiver,
            member,
            member_span,
            span,
        } => call::convert_member(ctx, receiver, member, *member_span, *span),
        Node::Index {
            receiver,
            index,
            span,
        } => expr::convert_index(ctx, receiver, index, *span),
        Node::Assignment {
            name,
            name_span,
            value,
            span,
        } => convert_assignment(ctx, name, *name_span, value, *span),
        Node::IndexAssignment {
            receiver,
            index,
            value,
            span,
        } => expr::convert_index_assignment(ctx, receiver, index, value, *span),
        Node::Binary {
            op,
            left,
            right,
            span,
        } => expr::convert_binary(ctx, *op, left, right, *span),
        Node::Unary { op, operand, span } => expr::convert_unary(ctx, *op, operand, *span),
        Node::If {
            condition,
            then_branch,
            else_branch,
            span,
        } => expr::convert_if(ctx, condition, then_branch, else_branch.as_deref(), *span),
        Node::While {
            condition,
            body,
            span,
        } => expr::convert_while(ctx, condition, body, *span),
        Node::Return { value, span } => expr::convert_return(ctx, value.as_deref(), *span),
        Node::Is { value, case, span } => expr::convert_is(ctx, value, case, *span),
        Node::Array { elements, span } => expr::convert_array(ctx, elements, *span),
    }
}

/// Report a mismatch unless the type of `id` is assignable to `expected`
pub fn check_assignable(ctx: &mut ConversionContext<'_>, expected: &Type, id: ExprId) {
    let actual = ctx.ty(id);
    if !is_assignable(expected, &actual) {
        let span = ctx.program.span(id);
        ctx.report(
            DiagnosticKind::TypeMismatch {
                expected: expected.clone(),
                actual,
            },
            span,
        );
    }
}

fn convert_name(ctx: &mut ConversionContext<'_>, name: &str, span: Span) -> ExprId {
    let Some(resolved) = ctx.resolve_name(name) else {
        ctx.report(
            DiagnosticKind::UnrecognizedName {
                name: name.to_string(),
            },
            span,
        );
        return ctx.error(span);
    };
    let access = VariableAccess {
        target: resolved.target,
        scope: ctx.scope(),
        span,
    };
    ctx.alloc(Expr::Variable(access), resolved.symbol.ty)
}

// ── Declarations ──

/// `val`/`var`: package function or variable at the root, local elsewhere.
///
/// The name is declared after its initializer is converted, so the
/// initializer sees any earlier binding of the same name.
fn convert_name_declaration(ctx: &mut ConversionContext<'_>, decl: &NameDeclaration) -> ExprId {
    let annotation = resolve_annotation(ctx, decl.ty.as_ref(), true);
    let value = convert_expr(ctx, &decl.value);
    let ty = match annotation {
        Some(declared) => {
            check_assignable(ctx, &declared, value);
            declared
        }
        None => ctx.ty(value),
    };

    if ctx.at_package_level() {
        let item = PackageItem {
            module: ctx.module.clone(),
            package: ctx.package.clone(),
            name: decl.name.clone(),
            public: decl.public,
            mutable: decl.mutable,
        };
        let is_function = ty.is_callable();
        ctx.namespace
            .add_symbol(&ctx.module, &ctx.package, &decl.name, ty, decl.public, decl.mutable);
        let expr = if is_function {
            Expr::DefinePackageFunction {
                item,
                value,
                span: decl.span,
            }
        } else {
            Expr::DefinePackageVariable {
                item,
                value,
                span: decl.span,
            }
        };
        return ctx.alloc(expr, Type::UNIT);
    }

    let scope = ctx.scope();
    ctx.program
        .scopes
        .add_symbol(scope, &decl.name, ty, false, decl.mutable);
    ctx.alloc(
        Expr::DefineLocalVariable {
            scope,
            name: decl.name.clone(),
            mutable: decl.mutable,
            value,
            span: decl.span,
        },
        Type::UNIT,
    )
}

fn convert_package_function(
    ctx: &mut ConversionContext<'_>,
    decl: &FunctionDeclaration,
) -> Result<ExprId, ConversionFault> {
    if ctx
        .namespace
        .lookup_qualified(&ctx.module, &ctx.package, &decl.name)
        .is_none()
    {
        return Err(ConversionFault::MissingFunction {
            module: ctx.module.clone(),
            package: ctx.package.clone(),
            name: decl.name.clone(),
            span: decl.span,
        });
    }

    // Signature errors were reported during registration
    let (params, ret) = function_signature(ctx, decl, false);
    let ty = Type::function(params.iter().map(|param| param.ty.clone()).collect(), ret.clone());
    ctx.namespace
        .add_symbol(&ctx.module, &ctx.package, &decl.name, ty, decl.public, false);

    let mark = ctx.push_generics(&decl.type_params);
    let value = convert_function(ctx, params, Some(ret), &decl.body, decl.span);
    ctx.pop_generics(mark);

    let item = PackageItem {
        module: ctx.module.clone(),
        package: ctx.package.clone(),
        name: decl.name.clone(),
        public: decl.public,
        mutable: false,
    };
    Ok(ctx.alloc(
        Expr::DefinePackageFunction {
            item,
            value,
            span: decl.span,
        },
        Type::UNIT,
    ))
}

/// Nested `fn`: declared before its body so it can call itself
fn convert_local_function(ctx: &mut ConversionContext<'_>, decl: &FunctionDeclaration) -> ExprId {
    let (params, ret) = function_signature(ctx, decl, true);
    let ty = Type::function(params.iter().map(|param| param.ty.clone()).collect(), ret.clone());
    let scope = ctx.scope();
    ctx.program.scopes.add_symbol(scope, &decl.name, ty, false, false);

    let mark = ctx.push_generics(&decl.type_params);
    let value = convert_function(ctx, params, Some(ret), &decl.body, decl.span);
    ctx.pop_generics(mark);

    ctx.alloc(
        Expr::DefineLocalVariable {
            scope,
            name: decl.name.clone(),
            mutable: false,
            value,
            span: decl.span,
        },
        Type::UNIT,
    )
}

fn convert_package_variant(
    ctx: &mut ConversionContext<'_>,
    def: &VariantTypeDefinition,
) -> Result<ExprId, ConversionFault> {
    let Some(definition) = ctx
        .namespace
        .lookup_variant(&ctx.module, &ctx.package, &def.name)
        .cloned()
    else {
        return Err(ConversionFault::MissingVariant {
            module: ctx.module.clone(),
            package: ctx.package.clone(),
            name: def.name.clone(),
            span: def.span,
        });
    };
    Ok(ctx.alloc(
        Expr::DefineVariantType {
            definition,
            span: def.span,
        },
        Type::UNIT,
    ))
}

/// `data` inside a body: registered in the package on the spot
fn convert_nested_variant(ctx: &mut ConversionContext<'_>, def: &VariantTypeDefinition) -> ExprId {
    let definition = variant_definition(ctx, def, true);
    let module = ctx.module.clone();
    let package = ctx.package.clone();
    let descriptor = ctx.namespace.get_or_create_package(&module, &package);
    for case in &definition.cases {
        descriptor.add_symbol(&case.name, definition.constructor_type(case), case.public, false);
    }
    descriptor.types.define(definition.clone());
    ctx.alloc(
        Expr::DefineVariantType {
            definition,
            span: def.span,
        },
        Type::UNIT,
    )
}

fn convert_assignment(
    ctx: &mut ConversionContext<'_>,
    name: &str,
    name_span: Span,
    value: &Node,
    span: Span,
) -> ExprId {
    let resolved = ctx.resolve_name(name);
    let value = convert_expr(ctx, value);
    let Some(resolved) = resolved else {
        ctx.report(
            DiagnosticKind::UnrecognizedName {
                name: name.to_string(),
            },
            name_span,
        );
        return ctx.error(span);
    };

    if !resolved.symbol.mutable {
        ctx.report(
            DiagnosticKind::ImmutableAssignment {
                name: name.to_string(),
            },
            name_span,
        );
    }
    check_assignable(ctx, &resolved.symbol.ty, value);

    let target = VariableAccess {
        target: resolved.target,
        scope: ctx.scope(),
        span: name_span,
    };
    ctx.alloc(Expr::Assignment { target, value, span }, Type::UNIT)
}

// ── Functions and blocks ──

/// Convert a function body with `params` bound in a fresh function scope.
///
/// Without a declared return type the body's type is used.
pub fn convert_function(
    ctx: &mut ConversionContext<'_>,
    params: Vec<Param>,
    ret: Option<Type>,
    body: &[Node],
    span: Span,
) -> ExprId {
    let scope = ctx.enter_scope(ScopeKind::Function);
    for param in &params {
        ctx.program
            .scopes
            .add_parameter(scope, &param.name, param.ty.clone());
    }
    ctx.push_return_type(ret.clone().unwrap_or(Type::ANY));
    let body_id = convert_block(ctx, body, span);
    ctx.pop_return_type();
    ctx.exit_scope();

    let body_ty = ctx.ty(body_id);
    let ret = match ret {
        Some(ret) => {
            check_function_result(ctx, &ret, &body_ty, body.last().map_or(span, Node::span), span);
            ret
        }
        None => body_ty,
    };

    let ty = Type::function(params.iter().map(|param| param.ty.clone()).collect(), ret.clone());
    ctx.alloc(
        Expr::Function {
            scope,
            params,
            ret,
            body: body_id,
            span,
        },
        ty,
    )
}

fn check_function_result(
    ctx: &mut ConversionContext<'_>,
    ret: &Type,
    body_ty: &Type,
    last_span: Span,
    span: Span,
) {
    if ret.is_unit() || ret.is_any() {
        return;
    }
    if body_ty.is_unit() {
        ctx.report(
            DiagnosticKind::MissingReturnValue {
                expected: ret.clone(),
            },
            span,
        );
    } else if !is_assignable(ret, body_ty) {
        ctx.report(
            DiagnosticKind::TypeMismatch {
                expected: ret.clone(),
                actual: body_ty.clone(),
            },
            last_span,
        );
    }
}

/// Convert statements in a new block scope; the last one gives the type
pub fn convert_block(ctx: &mut ConversionContext<'_>, body: &[Node], span: Span) -> ExprId {
    let scope = ctx.enter_scope(ScopeKind::Block);
    let statements: Vec<ExprId> = body.iter().map(|node| convert_expr(ctx, node)).collect();
    ctx.exit_scope();
    let ty = statements.last().map_or(Type::UNIT, |id| ctx.ty(*id));
    ctx.alloc(
        Expr::Block {
            scope,
            body: statements,
            span,
        },
        ty,
    )
}
