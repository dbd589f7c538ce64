//! Source spans and locations

use codespan_reporting::files::{Files, SimpleFile};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A byte offset span in a source file
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: u32,
    /// End byte offset (exclusive)
    pub end: u32,
}

impl Span {
    /// Create a span from byte offsets
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Span covering both `self` and `other`
    #[must_use]
    pub fn to(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length in bytes
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// One-based line and column of a byte offset
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct LineCol {
    /// Line number, starting at 1
    pub line: usize,
    /// Column number, starting at 1
    pub column: usize,
}

impl fmt::Display for LineCol {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}

/// A named source text with line lookup
pub struct SourceFile<'src> {
    file: SimpleFile<&'src str, &'src str>,
}

impl<'src> SourceFile<'src> {
    /// Wrap a source text
    pub fn new(name: &'src str, source: &'src str) -> Self {
        Self {
            file: SimpleFile::new(name, source),
        }
    }

    /// File name used in rendered diagnostics
    pub fn name(&self) -> &'src str {
        *self.file.name()
    }

    /// Full source text
    pub fn source(&self) -> &'src str {
        *self.file.source()
    }

    /// Line and column of a byte offset, clamped to the end of the text
    pub fn line_col(&self, offset: u32) -> LineCol {
        let offset = (offset as usize).min(self.file.source().len());
        match self.file.location((), offset) {
            Ok(location) => LineCol {
                line: location.line_number,
                column: location.column_number,
            },
            Err(_) => LineCol { line: 1, column: 1 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let merged = Span::new(4, 8).to(Span::new(1, 5));
        assert_eq!(merged, Span::new(1, 8));
        assert_eq!(merged.len(), 7);
        assert!(!merged.is_empty());
    }

    #[test]
    fn test_line_col() {
        let file = SourceFile::new("<input>", "val a = 1\nval b = a\n");
        assert_eq!(file.line_col(0), LineCol { line: 1, column: 1 });
        assert_eq!(file.line_col(14), LineCol { line: 2, column: 5 });
        assert_eq!(file.line_col(14).to_string(), "2:5");
    }
}
