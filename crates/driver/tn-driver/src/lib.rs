//! Compilation driver and high-level APIs
//!
//! This crate runs the whole front end for one source unit: parse, convert
//! to HIR against a caller-owned [`Namespace`], and lower to LIR when the
//! unit checked cleanly.

pub mod config;
pub mod render;

pub use config::{CompileOptions, ConfigError};
pub use render::Renderer;

use thiserror::Error;
use tn_hir_lower::{ConversionFault, Diagnostic};
use tn_lir_lower::LowerFault;
use tn_parser::ParseError;
use tn_resolve::Namespace;

/// Compilation that produced no tree to analyse, or hit an internal fault
#[derive(Debug, Error)]
pub enum CompileError {
    /// The source did not parse
    #[error("source has {} parse error(s)", .0.len())]
    Parse(Vec<ParseError>),

    /// Conversion reached an inconsistent state
    #[error(transparent)]
    Internal(#[from] ConversionFault),

    /// Lowering reached an inconsistent state
    #[error(transparent)]
    Lower(#[from] LowerFault),
}

impl CompileError {
    /// Human-readable report against `source`
    pub fn render(&self, source: &str, options: &CompileOptions) -> String {
        match self {
            Self::Parse(errors) => Renderer::new(&options.file_name, source).report_all(errors),
            Self::Internal(_) | Self::Lower(_) => format!("internal compiler error: {self}"),
        }
    }
}

/// Output of one compilation
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Converted program, error nodes included
    pub hir: tn_hir::Program,
    /// Lowered program, present only without diagnostics
    pub lir: Option<tn_lir::Program>,
    /// Collected diagnostics, in report order
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    /// Whether the unit checked without diagnostics
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Reports for every diagnostic against `source`
    pub fn render_diagnostics(&self, source: &str, options: &CompileOptions) -> String {
        Renderer::new(&options.file_name, source).report_all(&self.diagnostics)
    }

    /// One `file:line:col: message` line per diagnostic
    pub fn summaries(&self, source: &str, options: &CompileOptions) -> Vec<String> {
        let renderer = Renderer::new(&options.file_name, source);
        self.diagnostics
            .iter()
            .map(|diagnostic| renderer.summary(diagnostic.span, diagnostic))
            .collect()
    }
}

/// Compile `source` with default options
pub fn compile(source: &str, namespace: &mut Namespace) -> Result<Compilation, CompileError> {
    compile_with(source, namespace, &CompileOptions::default())
}

/// Compile `source` into `namespace`
///
/// Declarations are merged into the namespace even when the unit has
/// diagnostics, so a later unit can refer to them.
pub fn compile_with(
    source: &str,
    namespace: &mut Namespace,
    options: &CompileOptions,
) -> Result<Compilation, CompileError> {
    let parsed = tn_parser::parse(source);
    if !parsed.is_ok() {
        return Err(CompileError::Parse(parsed.errors));
    }

    let lowered = tn_hir_lower::lower_unit(
        &parsed.unit,
        namespace,
        &options.default_module,
        &options.default_package,
    )?;
    let lir = if lowered.diagnostics.is_empty() {
        Some(tn_lir_lower::lower_program(&lowered.program)?)
    } else {
        None
    };

    tracing::debug!(
        file = %options.file_name,
        diagnostics = lowered.diagnostics.len(),
        lowered = lir.is_some(),
        "compiled unit"
    );
    Ok(Compilation {
        hir: lowered.program,
        lir,
        diagnostics: lowered.diagnostics,
    })
}

/// A namespace and options reused across compilations, as a REPL does
pub struct Session {
    namespace: Namespace,
    options: CompileOptions,
}

impl Session {
    /// Session over a fresh namespace built from `options`
    pub fn new(options: CompileOptions) -> Self {
        Self {
            namespace: options.namespace(),
            options,
        }
    }

    /// Session over an existing namespace, such as one restored from a snapshot
    pub fn with_namespace(namespace: Namespace, options: CompileOptions) -> Self {
        Self { namespace, options }
    }

    /// Compile one more unit against the session namespace
    pub fn compile(&mut self, source: &str) -> Result<Compilation, CompileError> {
        compile_with(source, &mut self.namespace, &self.options)
    }

    /// Namespace the session compiles into
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Options applied to every unit
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_hir_lower::DiagnosticKind;
    use tn_ty::Type;

    #[test]
    fn test_clean_unit_is_lowered() {
        let mut namespace = Namespace::with_prelude();
        let compilation = compile("val a = 1\nprintln(a)", &mut namespace).unwrap();
        assert!(compilation.is_ok());
        let lir = compilation.lir.unwrap();
        assert_eq!(lir.module, "user");
        assert_eq!(lir.items.len(), 2);
    }

    #[test]
    fn test_diagnostics_skip_lowering() {
        let mut namespace = Namespace::with_prelude();
        let compilation = compile("val a: int = \"text\"", &mut namespace).unwrap();
        assert!(compilation.lir.is_none());
        assert!(matches!(
            compilation.diagnostics[0].kind,
            DiagnosticKind::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_parse_errors_abort() {
        let mut namespace = Namespace::with_prelude();
        let error = compile("val = 1", &mut namespace).unwrap_err();
        let CompileError::Parse(errors) = &error else {
            panic!("expected parse errors, got {error:?}");
        };
        assert!(!errors.is_empty());
        let rendered = error.render("val = 1", &CompileOptions::default());
        assert!(rendered.contains("parser::"), "{rendered}");
    }

    #[test]
    fn test_default_package_from_options() {
        let options = CompileOptions {
            default_module: "scripts".to_string(),
            ..CompileOptions::default()
        };
        let mut namespace = options.namespace();
        let compilation = compile_with("val x = 1", &mut namespace, &options).unwrap();
        assert_eq!(compilation.hir.module, "scripts");
        assert_eq!(
            namespace.lookup_qualified("scripts", "default", "x").map(|symbol| &symbol.ty),
            Some(&Type::INT)
        );
    }

    #[test]
    fn test_package_line_overrides_options() {
        let mut namespace = Namespace::with_prelude();
        let compilation = compile("package app/main\nval x = 1", &mut namespace).unwrap();
        assert_eq!(compilation.hir.module, "app");
        assert_eq!(compilation.hir.package, "main");
    }

    #[test]
    fn test_session_keeps_declarations() {
        let mut session = Session::default();
        assert!(session.compile("fn double(a: int): int { a * 2 }").unwrap().is_ok());
        let second = session.compile("val four = double(2)").unwrap();
        assert!(second.is_ok(), "{:?}", second.diagnostics);
        assert_eq!(
            session
                .namespace()
                .lookup_qualified("user", "default", "four")
                .map(|symbol| &symbol.ty),
            Some(&Type::INT)
        );
    }

    #[test]
    fn test_rendered_diagnostics() {
        let source = "val a = 1\nval b = missing";
        let options = CompileOptions {
            file_name: "main.tn".to_string(),
            ..CompileOptions::default()
        };
        let mut namespace = options.namespace();
        let compilation = compile_with(source, &mut namespace, &options).unwrap();
        let text = compilation.render_diagnostics(source, &options);
        assert!(text.contains("main.tn:2:9"), "{text}");
        assert!(text.contains("unrecognized name `missing`"), "{text}");
        assert_eq!(
            compilation.summaries(source, &options),
            vec!["main.tn:2:9: unrecognized name `missing`".to_string()]
        );
    }
}
