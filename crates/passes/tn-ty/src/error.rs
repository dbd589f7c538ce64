//! Type resolution errors

use tn_span::Span;

/// Errors produced while resolving a syntactic type reference
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeResolveError {
    /// Name is neither a generic parameter nor a known type
    #[error("unresolved type reference `{name}`")]
    UnresolvedTypeReference {
        /// Referenced name, `Base.Case` for case references
        name: String,
        /// Location of the reference
        span: Span,
    },

    /// Type constructor applied to the wrong number of arguments
    #[error("type `{name}` expects {expected} type argument(s), found {actual}")]
    TypeArityMismatch {
        /// Constructor name
        name: String,
        /// Declared generic parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
        /// Location of the reference
        span: Span,
    },
}

impl TypeResolveError {
    /// Location of the offending reference
    pub fn span(&self) -> Span {
        match self {
            Self::UnresolvedTypeReference { span, .. } | Self::TypeArityMismatch { span, .. } => {
                *span
            }
        }
    }
}
