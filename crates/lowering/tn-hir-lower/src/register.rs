//! Registration pass
//!
//! Declares every top-level `fn` signature and every variant type of a unit
//! in the package before any body is converted, so bodies can refer to
//! declarations that come later in the source.

use crate::context::ConversionContext;
use tn_hir::Param;
use tn_resolve::{Field, VariantCase, VariantDefinition};
use tn_syntax::{FunctionDeclaration, Node, TypeRef, VariantTypeDefinition};
use tn_ty::Type;

/// Declare the package-level names of `items`.
///
/// Variant shells go first so case fields and signatures may mention any
/// variant of the unit, then cases with their constructors, then functions.
pub fn register_declarations(ctx: &mut ConversionContext<'_>, items: &[Node]) {
    let variants: Vec<&VariantTypeDefinition> = items
        .iter()
        .filter_map(|item| match item {
            Node::VariantTypeDefinition(def) => Some(def),
            _ => None,
        })
        .collect();

    for def in &variants {
        let shell = VariantDefinition {
            module: ctx.module.clone(),
            package: ctx.package.clone(),
            name: def.name.clone(),
            type_params: def.type_params.clone(),
            public: def.public,
            cases: Vec::new(),
        };
        ctx.namespace
            .get_or_create_package(&ctx.module, &ctx.package)
            .types
            .define(shell);
    }

    for def in &variants {
        let definition = variant_definition(ctx, def, true);
        let module = ctx.module.clone();
        let package = ctx.package.clone();
        let descriptor = ctx.namespace.get_or_create_package(&module, &package);
        for case in &definition.cases {
            descriptor.add_symbol(
                &case.name,
                definition.constructor_type(case),
                case.public,
                false,
            );
        }
        descriptor.types.define(definition);
    }

    let mut functions = 0;
    for item in items {
        if let Node::FunctionDeclaration(decl) = item {
            let (params, ret) = function_signature(ctx, decl, true);
            let ty = Type::function(params.into_iter().map(|param| param.ty).collect(), ret);
            ctx.namespace
                .add_symbol(&ctx.module, &ctx.package, &decl.name, ty, decl.public, false);
            functions += 1;
        }
    }

    tracing::debug!(
        module = %ctx.module,
        package = %ctx.package,
        variants = variants.len(),
        functions,
        "registered declarations"
    );
}

/// Build the definition of a `data` type owned by the current package.
///
/// Fields resolve with the type's generic parameters in scope. A case is
/// public when marked `pub` itself or when the whole type is.
pub fn variant_definition(
    ctx: &mut ConversionContext<'_>,
    def: &VariantTypeDefinition,
    report: bool,
) -> VariantDefinition {
    let mark = ctx.push_generics(&def.type_params);
    let cases = def
        .cases
        .iter()
        .map(|case| VariantCase {
            name: case.name.clone(),
            fields: case
                .fields
                .iter()
                .map(|field| Field {
                    name: field.name.clone(),
                    ty: ctx.resolve_type(&field.ty, report),
                    public: field.public || def.public,
                })
                .collect(),
            public: case.public || def.public,
        })
        .collect();
    ctx.pop_generics(mark);

    VariantDefinition {
        module: ctx.module.clone(),
        package: ctx.package.clone(),
        name: def.name.clone(),
        type_params: def.type_params.clone(),
        public: def.public,
        cases,
    }
}

/// Resolved parameters and return type of a `fn`; no annotation means unit
pub fn function_signature(
    ctx: &mut ConversionContext<'_>,
    decl: &FunctionDeclaration,
    report: bool,
) -> (Vec<Param>, Type) {
    let mark = ctx.push_generics(&decl.type_params);
    let params = resolve_params(ctx, &decl.params, report);
    let ret = match &decl.return_type {
        Some(ty) => ctx.resolve_type(ty, report),
        None => Type::UNIT,
    };
    ctx.pop_generics(mark);
    (params, ret)
}

/// Resolve parameter types in the current generic scope
pub fn resolve_params(
    ctx: &mut ConversionContext<'_>,
    params: &[tn_syntax::Param],
    report: bool,
) -> Vec<Param> {
    params
        .iter()
        .map(|param| Param {
            name: param.name.clone(),
            ty: ctx.resolve_type(&param.ty, report),
        })
        .collect()
}

/// Resolve an optional annotation
pub fn resolve_annotation(
    ctx: &mut ConversionContext<'_>,
    ty: Option<&TypeRef>,
    report: bool,
) -> Option<Type> {
    ty.map(|ty| ctx.resolve_type(ty, report))
}
