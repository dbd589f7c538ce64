//! Internal faults of the conversion pipeline

use tn_span::Span;

/// Registration and conversion disagree about what was declared.
///
/// This is a compiler bug, never a problem with the input, so it aborts the
/// conversion instead of becoming a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionFault {
    /// A `fn` the registration pass should have declared is missing
    #[error("function `{module}/{package}.{name}` was not registered before conversion")]
    MissingFunction {
        /// Declaring module
        module: String,
        /// Declaring package
        package: String,
        /// Function name
        name: String,
        /// Declaration location
        span: Span,
    },

    /// A `data` type the registration pass should have declared is missing
    #[error("variant type `{module}/{package}.{name}` was not registered before conversion")]
    MissingVariant {
        /// Declaring module
        module: String,
        /// Declaring package
        package: String,
        /// Type name
        name: String,
        /// Declaration location
        span: Span,
    },
}
