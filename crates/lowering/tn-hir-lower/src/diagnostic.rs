//! User-facing diagnostics collected during conversion

use miette::LabeledSpan;
use std::fmt;
use thiserror::Error;
use tn_span::Span;
use tn_ty::{Type, TypeResolveError};

/// What went wrong, with the data tests match on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    /// Name not found in any visible scope
    #[error("unrecognized name `{name}`")]
    UnrecognizedName {
        /// The name as written
        name: String,
    },

    /// Call of a value that is not a function
    #[error("`{name}` is not a function, its type is {ty}")]
    NotAFunction {
        /// Callee as written
        name: String,
        /// Callee type
        ty: Type,
    },

    /// Wrong number of arguments
    #[error("expected {expected} argument(s), found {actual}")]
    FunctionArityMismatch {
        /// Parameter count
        expected: usize,
        /// Argument count
        actual: usize,
    },

    /// Value of the wrong type
    #[error("type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        /// Required type
        expected: Type,
        /// Supplied type
        actual: Type,
    },

    /// Indexing a value that is not an array or string
    #[error("type {ty} cannot be indexed")]
    TypeIsNotIndexable {
        /// Receiver type
        ty: Type,
    },

    /// Function with a declared result whose body produces none
    #[error("missing return value of type {expected}")]
    MissingReturnValue {
        /// Declared return type
        expected: Type,
    },

    /// `if`/`else` branches of different types
    #[error("if and else branches have different types: {then_type} and {else_type}")]
    IfElseBranchesTypeMismatch {
        /// Type of the then branch
        then_type: Type,
        /// Type of the else branch
        else_type: Type,
    },

    /// Type name that does not resolve
    #[error("unresolved type reference `{name}`")]
    UnresolvedTypeReference {
        /// Referenced name
        name: String,
    },

    /// Type constructor with the wrong number of arguments
    #[error("type `{name}` expects {expected} type argument(s), found {actual}")]
    TypeArityMismatch {
        /// Constructor name
        name: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Top-level values that depend on each other without a function in between
    #[error("cyclic declaration: {}", .names.join(" -> "))]
    CyclicDeclaration {
        /// Names on the cycle, in traversal order
        names: Vec<String>,
    },

    /// No overload accepts the argument types
    #[error("no overload of `{name}` accepts ({})", display_types(.args))]
    NoMatchingOverload {
        /// Callee as written
        name: String,
        /// Argument types
        args: Vec<Type>,
    },

    /// Assignment to a `val` or a function
    #[error("cannot assign to immutable `{name}`")]
    ImmutableAssignment {
        /// Assigned name
        name: String,
    },

    /// Field or case not present on a type
    #[error("type {ty} has no member `{member}`")]
    UnknownMember {
        /// Receiver type
        ty: Type,
        /// Requested member
        member: String,
    },

    /// Import or qualified access of an undeclared package
    #[error("unknown package `{path}`")]
    UnknownPackage {
        /// `module/package`
        path: String,
    },

    /// `return` at package level
    #[error("`return` outside of a function")]
    ReturnOutsideFunction,
}

fn display_types(types: &[Type]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl DiagnosticKind {
    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnrecognizedName { .. } => "tern::unrecognized_name",
            Self::NotAFunction { .. } => "tern::not_a_function",
            Self::FunctionArityMismatch { .. } => "tern::function_arity_mismatch",
            Self::TypeMismatch { .. } => "tern::type_mismatch",
            Self::TypeIsNotIndexable { .. } => "tern::type_is_not_indexable",
            Self::MissingReturnValue { .. } => "tern::missing_return_value",
            Self::IfElseBranchesTypeMismatch { .. } => "tern::if_else_branches_type_mismatch",
            Self::UnresolvedTypeReference { .. } => "tern::unresolved_type_reference",
            Self::TypeArityMismatch { .. } => "tern::type_arity_mismatch",
            Self::CyclicDeclaration { .. } => "tern::cyclic_declaration",
            Self::NoMatchingOverload { .. } => "tern::no_matching_overload",
            Self::ImmutableAssignment { .. } => "tern::immutable_assignment",
            Self::UnknownMember { .. } => "tern::unknown_member",
            Self::UnknownPackage { .. } => "tern::unknown_package",
            Self::ReturnOutsideFunction => "tern::return_outside_function",
        }
    }

    /// Short label placed under the offending source
    fn label(&self) -> String {
        match self {
            Self::UnrecognizedName { .. } => "not found in this scope".to_string(),
            Self::NotAFunction { .. } => "called here".to_string(),
            Self::FunctionArityMismatch { expected, .. } => format!("expected {expected} argument(s)"),
            Self::TypeMismatch { expected, .. } => format!("expected {expected}"),
            Self::TypeIsNotIndexable { .. } => "indexed here".to_string(),
            Self::MissingReturnValue { .. } => "function body produces no value".to_string(),
            Self::IfElseBranchesTypeMismatch { .. } => "branches disagree".to_string(),
            Self::UnresolvedTypeReference { .. } => "unknown type".to_string(),
            Self::TypeArityMismatch { expected, .. } => format!("expected {expected} type argument(s)"),
            Self::CyclicDeclaration { .. } => "declared in a cycle".to_string(),
            Self::NoMatchingOverload { .. } => "no matching signature".to_string(),
            Self::ImmutableAssignment { .. } => "assigned here".to_string(),
            Self::UnknownMember { .. } => "unknown member".to_string(),
            Self::UnknownPackage { .. } => "unknown package".to_string(),
            Self::ReturnOutsideFunction => "not inside a function".to_string(),
        }
    }
}

/// A diagnostic with its source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong
    pub kind: DiagnosticKind,
    /// Where it went wrong
    pub span: Span,
}

impl Diagnostic {
    /// Diagnostic of `kind` at `span`
    pub fn new(kind: DiagnosticKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl From<TypeResolveError> for Diagnostic {
    fn from(error: TypeResolveError) -> Self {
        let span = error.span();
        let kind = match error {
            TypeResolveError::UnresolvedTypeReference { name, .. } => {
                DiagnosticKind::UnresolvedTypeReference { name }
            }
            TypeResolveError::TypeArityMismatch {
                name,
                expected,
                actual,
                ..
            } => DiagnosticKind::TypeArityMismatch {
                name,
                expected,
                actual,
            },
        };
        Self { kind, span }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.kind)
    }
}

impl std::error::Error for Diagnostic {}

impl miette::Diagnostic for Diagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_with_span(
            Some(self.kind.label()),
            (self.span.start as usize, self.span.len() as usize),
        );
        Some(Box::new(std::iter::once(label)))
    }
}

/// Collected diagnostics of one conversion
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Record a diagnostic
    pub fn report(&mut self, kind: DiagnosticKind, span: Span) {
        tracing::debug!(code = kind.code(), start = span.start, end = span.end, "{kind}");
        self.entries.push(Diagnostic::new(kind, span));
    }

    /// Add a built diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.report(diagnostic.kind, diagnostic.span);
    }

    /// Whether nothing was reported
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of reported diagnostics
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Diagnostics in report order
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
