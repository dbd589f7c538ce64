//! Rich error reporting for the parser

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;
use tn_span::Span;

/// Parse error with diagnostic information
#[derive(Error, Debug, Clone, PartialEq, Diagnostic)]
pub enum ParseError {
    /// Input the lexer could not turn into a token
    #[error("unrecognized input `{text}`")]
    #[diagnostic(code(parser::unrecognized_input))]
    UnrecognizedInput {
        /// Offending text
        text: String,
        /// Source location
        #[label("not a valid token")]
        span: SourceSpan,
    },

    /// Syntax error with unexpected input
    #[error("expected {expected}, found `{found}`")]
    #[diagnostic(code(parser::unexpected_token))]
    UnexpectedToken {
        /// What the parser was looking for
        expected: String,
        /// What was found
        found: String,
        /// Source location
        #[label("expected {expected} here")]
        span: SourceSpan,
    },

    /// Input ended early
    #[error("expected {expected}, found end of file")]
    #[diagnostic(code(parser::unexpected_eof))]
    UnexpectedEof {
        /// What the parser was looking for
        expected: String,
        /// End of the input
        #[label("input ends here")]
        span: SourceSpan,
    },

    /// Literal that does not fit its type
    #[error("invalid {kind} literal `{text}`")]
    #[diagnostic(code(parser::invalid_literal))]
    InvalidLiteral {
        /// Literal kind (integer, float)
        kind: &'static str,
        /// Literal text
        text: String,
        /// Source location
        #[label("cannot be represented")]
        span: SourceSpan,
    },

    /// `${` without a closing brace
    #[error("unterminated interpolation")]
    #[diagnostic(code(parser::unterminated_interpolation), help("close the expression with `}}`"))]
    UnterminatedInterpolation {
        /// Location of the `${`
        #[label("opened here")]
        span: SourceSpan,
    },
}

impl ParseError {
    /// Byte span of the error
    pub fn span(&self) -> Span {
        let span = match self {
            Self::UnrecognizedInput { span, .. }
            | Self::UnexpectedToken { span, .. }
            | Self::UnexpectedEof { span, .. }
            | Self::InvalidLiteral { span, .. }
            | Self::UnterminatedInterpolation { span } => *span,
        };
        Span::new(span.offset() as u32, (span.offset() + span.len()) as u32)
    }
}

/// Convert a byte span to a miette span
pub(crate) fn source_span(span: Span) -> SourceSpan {
    (span.start as usize, span.len() as usize).into()
}
