//! Human-readable diagnostic output

use miette::{GraphicalReportHandler, GraphicalTheme, NamedSource, Report};
use std::fmt;
use tn_span::{SourceFile, Span};

/// Renders diagnostics against one source text
pub struct Renderer<'src> {
    file: SourceFile<'src>,
    handler: GraphicalReportHandler,
}

impl<'src> Renderer<'src> {
    /// Renderer for `source`, reported under `file_name`
    pub fn new(file_name: &'src str, source: &'src str) -> Self {
        Self {
            file: SourceFile::new(file_name, source),
            handler: GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor()),
        }
    }

    /// One line: `file:line:col: message`
    pub fn summary(&self, span: Span, message: &impl fmt::Display) -> String {
        format!("{}:{}: {message}", self.file.name(), self.file.line_col(span.start))
    }

    /// Full report with the source snippet and labels
    pub fn report<D>(&self, diagnostic: &D) -> String
    where
        D: miette::Diagnostic + Clone + Send + Sync + 'static,
    {
        let report = Report::new(diagnostic.clone()).with_source_code(NamedSource::new(
            self.file.name(),
            self.file.source().to_string(),
        ));
        let mut out = String::new();
        if self.handler.render_report(&mut out, &*report).is_err() {
            // Writing into a String does not fail
            return diagnostic.to_string();
        }
        out
    }

    /// Reports for a list of diagnostics, separated by blank lines
    pub fn report_all<D>(&self, diagnostics: &[D]) -> String
    where
        D: miette::Diagnostic + Clone + Send + Sync + 'static,
    {
        diagnostics
            .iter()
            .map(|diagnostic| self.report(diagnostic))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_hir_lower::{Diagnostic, DiagnosticKind};

    #[test]
    fn test_summary_points_at_line_and_column() {
        let source = "val a = 1\nval b = c\n";
        let renderer = Renderer::new("main.tn", source);
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UnrecognizedName {
                name: "c".to_string(),
            },
            Span::new(18, 19),
        );
        assert_eq!(
            renderer.summary(diagnostic.span, &diagnostic),
            "main.tn:2:9: unrecognized name `c`"
        );
    }

    #[test]
    fn test_report_includes_code_and_label() {
        let source = "val a = 1\nval b = c\n";
        let renderer = Renderer::new("main.tn", source);
        let diagnostic = Diagnostic::new(
            DiagnosticKind::UnrecognizedName {
                name: "c".to_string(),
            },
            Span::new(18, 19),
        );
        let text = renderer.report(&diagnostic);
        assert!(text.contains("tern::unrecognized_name"), "{text}");
        assert!(text.contains("unrecognized name `c`"), "{text}");
        assert!(text.contains("main.tn:2:9"), "{text}");
        assert!(text.contains("not found in this scope"), "{text}");
    }
}
