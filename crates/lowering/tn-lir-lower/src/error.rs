//! Lowering faults

use tn_span::Span;

/// HIR that cannot be lowered.
///
/// Only HIR produced without diagnostics is lowered, so each of these is a
/// bug in an earlier pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LowerFault {
    /// An error placeholder survived into lowering
    #[error("error node at {}..{} reached lowering", .span.start, .span.end)]
    UnexpectedErrorNode {
        /// Location of the failed expression
        span: Span,
    },

    /// A scoped access whose declaring scope does not enclose it
    #[error("`{name}` is used outside the scope declaring it")]
    UnreachableScope {
        /// Accessed name
        name: String,
        /// Location of the access
        span: Span,
    },
}
