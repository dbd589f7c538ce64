//! HIR lowering - converts the parse tree to HIR with name resolution
//!
//! This crate handles:
//! - Top-level declaration ordering
//! - Registration of package-level signatures and variant types
//! - Import resolution and scoped name lookup
//! - Type checking of every expression
//! - Parse tree → HIR conversion

pub mod diagnostic;
pub mod error;
pub mod sort;

mod call;
mod context;
mod convert;
mod expr;
mod imports;
mod register;

pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::ConversionFault;
pub use sort::{Cycle, SortOutcome, sort_declarations};

use context::ConversionContext;
use imports::ImportTable;
use tn_hir::Program;
use tn_resolve::Namespace;
use tn_syntax::SourceUnit;

/// Result of converting one compilation unit
#[derive(Debug)]
pub struct Lowered {
    /// The converted unit
    pub program: Program,
    /// Problems found in the source, in discovery order
    pub diagnostics: Vec<Diagnostic>,
}

/// Convert a parsed unit into HIR, declaring its package-level names in
/// `namespace`.
///
/// The unit's `package` line selects the target package; without one the
/// defaults are used.
///
/// # Errors
///
/// Returns `ConversionFault` when registration and conversion disagree
pub fn lower_unit(
    unit: &SourceUnit,
    namespace: &mut Namespace,
    default_module: &str,
    default_package: &str,
) -> Result<Lowered, ConversionFault> {
    let (module, package) = unit.package.as_ref().map_or(
        (default_module, default_package),
        |decl| (decl.module.as_str(), decl.package.as_str()),
    );

    let mut ctx = ConversionContext::new(namespace, module, package);
    ctx.imports = ImportTable::build(&unit.imports, &*ctx.namespace, module, &mut ctx.diagnostics);

    let outcome = sort_declarations(&unit.items);
    for cycle in outcome.cycles {
        ctx.report(DiagnosticKind::CyclicDeclaration { names: cycle.names }, cycle.span);
    }

    register::register_declarations(&mut ctx, &unit.items);

    for idx in outcome.order {
        let id = convert::convert_item(&mut ctx, &unit.items[idx])?;
        ctx.program.items.push(id);
    }

    tracing::debug!(
        module,
        package,
        items = ctx.program.items.len(),
        diagnostics = ctx.diagnostics.len(),
        "converted unit"
    );
    Ok(Lowered {
        program: ctx.program,
        diagnostics: ctx.diagnostics.into_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_hir::{Expr, Target};
    use tn_ty::Type;

    fn lower_into(namespace: &mut Namespace, source: &str) -> Lowered {
        let result = tn_parser::parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        lower_unit(&result.unit, namespace, "user", "default").unwrap()
    }

    fn lower(source: &str) -> (Lowered, Namespace) {
        let mut namespace = Namespace::with_prelude();
        let lowered = lower_into(&mut namespace, source);
        (lowered, namespace)
    }

    fn kinds(source: &str) -> Vec<DiagnosticKind> {
        lower(source)
            .0
            .diagnostics
            .into_iter()
            .map(|diagnostic| diagnostic.kind)
            .collect()
    }

    fn symbol_type(namespace: &Namespace, name: &str) -> Type {
        namespace
            .lookup_qualified("user", "default", name)
            .map(|symbol| symbol.ty.clone())
            .unwrap()
    }

    #[test]
    fn test_forward_reference() {
        let (lowered, namespace) = lower("val a = b\nval b = 10");
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
        assert_eq!(symbol_type(&namespace, "a"), Type::INT);

        let first = lowered.program.expr(lowered.program.items[0]);
        assert!(matches!(first, Expr::DefinePackageVariable { item, .. } if item.name == "b"));
    }

    #[test]
    fn test_function_typed_value_is_package_function() {
        let (lowered, namespace) = lower("val inc = fn(x: int) { x + 1 }\nval n = inc(2)");
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
        assert_eq!(
            symbol_type(&namespace, "inc"),
            Type::function(vec![Type::INT], Type::INT)
        );
        assert_eq!(symbol_type(&namespace, "n"), Type::INT);
        let first = lowered.program.expr(lowered.program.items[0]);
        assert!(matches!(first, Expr::DefinePackageFunction { .. }));
    }

    #[test]
    fn test_generic_call_infers_result() {
        let (lowered, namespace) = lower("fn id[T](x: T): T { x }\nval a = id(3)\nval s = id(\"s\")");
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
        assert_eq!(symbol_type(&namespace, "a"), Type::INT);
        assert_eq!(symbol_type(&namespace, "s"), Type::STRING);
    }

    #[test]
    fn test_overload_selection() {
        let source = "fn f(x: int): int { x }\nfn f(x: string): string { x }\n\
                      val a = f(1)\nval b = f(\"s\")\nval c = f(true)";
        let (lowered, namespace) = lower(source);
        assert_eq!(symbol_type(&namespace, "a"), Type::INT);
        assert_eq!(symbol_type(&namespace, "b"), Type::STRING);
        let kinds: Vec<_> = lowered.diagnostics.into_iter().map(|diag| diag.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::NoMatchingOverload {
                name: "f".to_string(),
                args: vec![Type::BOOL],
            }]
        );
    }

    #[test]
    fn test_prelude_method_call() {
        let (lowered, namespace) = lower("val xs = [1, 2]\nval n = xs.len()\nval m = \"abc\".len()");
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
        assert_eq!(symbol_type(&namespace, "n"), Type::INT);
        assert_eq!(symbol_type(&namespace, "m"), Type::INT);
    }

    #[test]
    fn test_method_resolution_prefers_defining_package() {
        let mut namespace = Namespace::with_prelude();
        let shapes = "package geo/shapes\n\
                      pub data Shape = Circle(radius: float) | Square(side: float)\n\
                      pub fn area(shape: Shape): string { \"from shapes\" }";
        let lowered = lower_into(&mut namespace, shapes);
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);

        let main = "package app/main\n\
                    import geo/shapes { Circle }\n\
                    fn area(value: int): int { value }\n\
                    val c = Circle(1.5)\n\
                    val a = c.area()";
        let lowered = lower_into(&mut namespace, main);
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
        assert_eq!(
            namespace.lookup_qualified("app", "main", "a").map(|symbol| &symbol.ty),
            Some(&Type::STRING)
        );

        let callee_targets: Vec<_> = lowered
            .program
            .variable_accesses()
            .filter(|access| access.target.name() == "area")
            .map(|access| access.target.clone())
            .collect();
        assert_eq!(
            callee_targets,
            vec![Target::Package {
                module: "geo".to_string(),
                package: "shapes".to_string(),
                name: "area".to_string(),
            }]
        );
    }

    #[test]
    fn test_package_alias_call() {
        let mut namespace = Namespace::with_prelude();
        lower_into(&mut namespace, "package util/math\npub fn double(x: int): int { x * 2 }");
        let lowered = lower_into(&mut namespace, "import util/math as m\nval four = m.double(2)");
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
        assert_eq!(symbol_type(&namespace, "four"), Type::INT);
    }

    #[test]
    fn test_qualified_access() {
        let mut namespace = Namespace::with_prelude();
        lower_into(&mut namespace, "package geo/shapes\npub val answer = 42\nval hidden = 1");
        let lowered = lower_into(
            &mut namespace,
            "package app/main\nval y = geo/shapes.answer\nval z = geo/shapes.hidden\nval w = geo/nowhere.answer",
        );
        assert_eq!(
            namespace.lookup_qualified("app", "main", "y").map(|symbol| &symbol.ty),
            Some(&Type::INT)
        );
        let kinds: Vec<_> = lowered.diagnostics.into_iter().map(|diag| diag.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::UnrecognizedName {
                    name: "geo/shapes.hidden".to_string()
                },
                DiagnosticKind::UnknownPackage {
                    path: "geo/nowhere".to_string()
                },
            ]
        );
        let targets: Vec<_> = lowered
            .program
            .variable_accesses()
            .map(|access| access.target.clone())
            .collect();
        assert_eq!(
            targets,
            vec![Target::Package {
                module: "geo".to_string(),
                package: "shapes".to_string(),
                name: "answer".to_string(),
            }]
        );
    }

    #[test]
    fn test_uninferred_type_parameter_becomes_any() {
        let (lowered, namespace) = lower("fn empty[T](): array[T] { [] }\nval e = empty()\nval n = e[0] + 1");
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
        assert_eq!(symbol_type(&namespace, "e"), Type::array(Type::ANY));

        let (lowered, _) = lower("fn single[T](x: T): array[T] { [x] }\nfn wrap[T](x: T): array[T] { single(x) }");
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
    }

    #[test]
    fn test_variant_fields_and_cases() {
        let source = "data Option[T] = Just(value: T) | Nothing\n\
                      val o = Just(1)\n\
                      val b = o is Just\n\
                      val j: Option[int].Just = o\n\
                      val v = j.value";
        let (lowered, namespace) = lower(source);
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
        assert_eq!(symbol_type(&namespace, "b"), Type::BOOL);
        assert_eq!(symbol_type(&namespace, "v"), Type::INT);

        assert_eq!(
            kinds("data Option[T] = Just(value: T) | Nothing\nval o = Just(1)\nval v = o.value\nval x = o is Other"),
            vec![
                DiagnosticKind::UnknownMember {
                    ty: symbol_type(&namespace, "o"),
                    member: "value".to_string(),
                },
                DiagnosticKind::UnknownMember {
                    ty: symbol_type(&namespace, "o"),
                    member: "Other".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_nested_function_captures() {
        let source = "fn outer(x: int): int {\n  fn inner(): int { x }\n  inner()\n}";
        let (lowered, _) = lower(source);
        assert!(lowered.diagnostics.is_empty(), "{:?}", lowered.diagnostics);
        let program = &lowered.program;
        let x_reads: Vec<_> = program
            .variable_accesses()
            .filter(|access| access.target.name() == "x")
            .collect();
        assert_eq!(x_reads.len(), 1);
        let Target::Scoped { scope, .. } = &x_reads[0].target else {
            panic!("parameter resolved to {:?}", x_reads[0].target);
        };
        assert_eq!(program.scopes.parameter_index(*scope, "x"), Some(0));
    }

    #[test]
    fn test_type_diagnostics() {
        assert_eq!(
            kinds("val x: int = \"a\""),
            vec![DiagnosticKind::TypeMismatch {
                expected: Type::INT,
                actual: Type::STRING,
            }]
        );
        assert_eq!(
            kinds("fn f(): int { }"),
            vec![DiagnosticKind::MissingReturnValue { expected: Type::INT }]
        );
        assert_eq!(
            kinds("fn f(a: int): int { a }\nf(1, 2)"),
            vec![DiagnosticKind::FunctionArityMismatch {
                expected: 1,
                actual: 2
            }]
        );
        assert_eq!(
            kinds("val n = 1\nn(2)"),
            vec![DiagnosticKind::NotAFunction {
                name: "n".to_string(),
                ty: Type::INT,
            }]
        );
        assert_eq!(
            kinds("val n = 1\nval c = n[0]"),
            vec![DiagnosticKind::TypeIsNotIndexable { ty: Type::INT }]
        );
        assert_eq!(
            kinds("val v = if (true) { 1 } else { \"no\" }"),
            vec![DiagnosticKind::IfElseBranchesTypeMismatch {
                then_type: Type::INT,
                else_type: Type::STRING,
            }]
        );
    }

    #[test]
    fn test_name_diagnostics() {
        assert_eq!(
            kinds("missing(1)"),
            vec![DiagnosticKind::UnrecognizedName {
                name: "missing".to_string()
            }]
        );
        assert_eq!(
            kinds("val y = 1\ny = 2"),
            vec![DiagnosticKind::ImmutableAssignment {
                name: "y".to_string()
            }]
        );
        assert_eq!(kinds("return 1"), vec![DiagnosticKind::ReturnOutsideFunction]);
        assert_eq!(
            kinds("data Option[T] = Just(value: T) | Nothing\nval o: Option[int, int] = Just(1)"),
            vec![DiagnosticKind::TypeArityMismatch {
                name: "Option".to_string(),
                expected: 1,
                actual: 2,
            }]
        );
        assert_eq!(
            kinds("val t: Missing = 1"),
            vec![DiagnosticKind::UnresolvedTypeReference {
                name: "Missing".to_string()
            }]
        );
    }

    #[test]
    fn test_cycle_is_reported_and_conversion_continues() {
        let (lowered, _) = lower("val a = b\nval b = a");
        assert_eq!(lowered.program.items.len(), 2);
        assert!(lowered.diagnostics.iter().any(|diagnostic| matches!(
            &diagnostic.kind,
            DiagnosticKind::CyclicDeclaration { names } if names == &["a".to_string(), "b".to_string()]
        )));
    }

    #[test]
    fn test_unregistered_function_is_a_fault() {
        let result = tn_parser::parse("fn lonely() { }");
        let mut namespace = Namespace::new();
        let mut ctx = ConversionContext::new(&mut namespace, "user", "default");
        let fault = convert::convert_item(&mut ctx, &result.unit.items[0]).unwrap_err();
        assert!(matches!(fault, ConversionFault::MissingFunction { name, .. } if name == "lonely"));
    }

    #[test]
    fn test_repeated_compilation_merges() {
        let mut namespace = Namespace::with_prelude();
        lower_into(&mut namespace, "fn f(x: int): int { x }");
        lower_into(&mut namespace, "fn f(x: string): int { 0 }");
        assert!(matches!(symbol_type(&namespace, "f"), Type::Overloaded(set) if set.len() == 2));
    }
}
