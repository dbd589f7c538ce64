//! Parser for Tern source units
//!
//! Tokens come from a `logos` lexer; a recursive-descent parser builds the
//! [`tn_syntax::SourceUnit`] tree. Parsing never stops at the first error:
//! every problem is collected as a [`ParseError`] and the parser resynchronizes
//! at the next line.

pub mod error;
pub mod lexer;
mod parser;

pub use error::ParseError;

use tn_syntax::SourceUnit;

/// Result of parsing a source file
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed unit, possibly partial when `errors` is non-empty
    pub unit: SourceUnit,
    /// Parse errors with detailed diagnostics
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    /// Whether the source parsed cleanly
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse Tern source code
pub fn parse(source: &str) -> ParseResult {
    let mut parser = parser::Parser::new(source, 0);
    let unit = parser.parse_unit();
    tracing::debug!(
        items = unit.items.len(),
        imports = unit.imports.len(),
        errors = parser.errors.len(),
        "parsed source unit"
    );
    ParseResult {
        unit,
        errors: parser.errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tn_span::Span;
    use tn_syntax::{BinaryOp, InterpolationPart, Literal, Node, TypeRef};

    fn parse_ok(source: &str) -> SourceUnit {
        let result = parse(source);
        assert!(result.is_ok(), "unexpected errors: {:?}", result.errors);
        result.unit
    }

    fn describe_items(unit: &SourceUnit) -> Vec<String> {
        unit.items.iter().map(Node::describe).collect()
    }

    #[test]
    fn test_parse_declarations() {
        let unit = parse_ok(
            "package app/main\n\
             import std/math as m { sqrt, pow as power }\n\
             val a = 1\n\
             var b: int = 2\n\
             fn add(x: int, y: int): int { x + y }\n\
             pub data Option[T] = Just(value: T) | Nothing",
        );

        let package = unit.package.as_ref().unwrap();
        assert_eq!((package.module.as_str(), package.package.as_str()), ("app", "main"));

        let import = &unit.imports[0];
        assert_eq!(import.alias.as_deref(), Some("m"));
        assert_eq!(import.entries.len(), 2);
        assert_eq!(import.entries[1].local_name(), "power");

        assert_eq!(
            describe_items(&unit),
            vec!["val a", "var b", "fn add", "data Option"]
        );

        let Node::VariantTypeDefinition(data) = &unit.items[3] else {
            panic!("expected data definition");
        };
        assert!(data.public);
        assert_eq!(data.type_params, vec!["T".to_string()]);
        assert_eq!(data.cases[0].fields[0].name, "value");
        assert!(data.cases[1].fields.is_empty());
    }

    #[test]
    fn test_operator_precedence() {
        let unit = parse_ok("1 + 2 * 3 == 7 && !done");
        let Node::Binary { op, left, .. } = &unit.items[0] else {
            panic!("expected binary expression");
        };
        assert_eq!(*op, BinaryOp::And);
        let Node::Binary { op, left, .. } = left.as_ref() else {
            panic!("expected equality");
        };
        assert_eq!(*op, BinaryOp::Eq);
        let Node::Binary { op, right, .. } = left.as_ref() else {
            panic!("expected addition");
        };
        assert_eq!(*op, BinaryOp::Add);
        assert!(matches!(right.as_ref(), Node::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn test_newline_ends_call_chain() {
        let unit = parse_ok("val f = g\n(1)");
        assert_eq!(unit.items.len(), 2);
        assert!(matches!(unit.items[1], Node::Literal { value: Literal::Int(1), .. }));
    }

    #[test]
    fn test_method_call_and_assignment() {
        let unit = parse_ok("xs.push(1)\nxs[0] = 2\ncount = count + 1");
        assert!(matches!(&unit.items[0], Node::Call { callee, .. } if matches!(callee.as_ref(), Node::Member { member, .. } if member == "push")));
        assert!(matches!(unit.items[1], Node::IndexAssignment { .. }));
        assert_eq!(unit.items[2].describe(), "count =");
    }

    #[test]
    fn test_qualified_name_and_division() {
        let unit = parse_ok("geo/shapes.area(c)\nwidth / height.value");
        let Node::Call { callee, .. } = &unit.items[0] else {
            panic!("expected call");
        };
        assert_eq!(callee.describe(), "geo/shapes.area");
        assert_eq!(callee.span(), Span::new(0, 15));
        assert!(matches!(
            &unit.items[1],
            Node::Binary { op: BinaryOp::Div, right, .. } if matches!(right.as_ref(), Node::Member { .. })
        ));
    }

    #[test]
    fn test_types() {
        let unit = parse_ok("val f: (int, array[string]) -> Option.Just = g");
        let Node::NameDeclaration(decl) = &unit.items[0] else {
            panic!("expected declaration");
        };
        let ty = decl.ty.as_ref().unwrap();
        assert!(matches!(ty, TypeRef::Function { .. }));
        assert_eq!(ty.to_string(), "(int, array[string]) -> Option.Just");
    }

    #[test]
    fn test_string_interpolation() {
        let unit = parse_ok(r#"val s = "hi $name, ${a + 1}!""#);
        let Node::NameDeclaration(decl) = &unit.items[0] else {
            panic!("expected declaration");
        };
        let Node::Interpolation { parts, .. } = decl.value.as_ref() else {
            panic!("expected interpolation");
        };
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], InterpolationPart::Text("hi ".to_string()));
        let InterpolationPart::Expr(Node::Name { name, span }) = &parts[1] else {
            panic!("expected name part");
        };
        assert_eq!(name, "name");
        assert_eq!(*span, Span::new(13, 17));
        assert!(matches!(&parts[3], InterpolationPart::Expr(Node::Binary { .. })));
    }

    #[test]
    fn test_plain_string_escapes() {
        let unit = parse_ok(r#""a\n\"b\" \$c""#);
        assert!(matches!(
            &unit.items[0],
            Node::Literal { value: Literal::String(text), .. } if text == "a\n\"b\" $c"
        ));
    }

    #[test]
    fn test_if_else_chain_and_return() {
        let unit = parse_ok(
            "fn sign(x: int): int {\n\
               if (x < 0) { return -1 } else if (x == 0) { 0 } else { 1 }\n\
             }",
        );
        let Node::FunctionDeclaration(decl) = &unit.items[0] else {
            panic!("expected function");
        };
        let Node::If { else_branch, .. } = &decl.body[0] else {
            panic!("expected if");
        };
        assert!(matches!(
            else_branch.as_deref(),
            Some(Node::If { else_branch: Some(_), .. })
        ));
    }

    #[test]
    fn test_error_recovery() {
        let result = parse("val = 1\nval ok = 2\nfn broken( {\n}\nval after = 3");
        assert!(!result.is_ok());
        let names = describe_items(&result.unit);
        assert!(names.contains(&"val ok".to_string()));
        assert!(names.contains(&"val after".to_string()));
        assert!(matches!(result.errors[0], ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_unterminated_interpolation() {
        let result = parse(r#""value ${x""#);
        assert!(result
            .errors
            .iter()
            .any(|error| matches!(error, ParseError::UnterminatedInterpolation { .. })));
    }
}
