//! Hand-written recursive-descent parser with one function per precedence level.

use crate::error::{ParseError, source_span};
use crate::lexer::{Lexeme, Token, lex};
use std::mem;
use tn_span::Span;
use tn_syntax::{
    BinaryOp, CaseDefinition, FieldDefinition, FunctionDeclaration, ImportDecl, ImportEntry,
    InterpolationPart, Literal, NameDeclaration, Node, PackageDecl, Param, SourceUnit, TypeRef,
    UnaryOp, VariantTypeDefinition,
};

/// Parser state wrapping a token stream
pub(crate) struct Parser<'src> {
    text: &'src str,
    tokens: Vec<Lexeme<'src>>,
    pos: usize,
    offset: u32,
    last_end: u32,
    pub(crate) errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    /// Parser over `text`, which starts at byte `offset` of the full source
    pub(crate) fn new(text: &'src str, offset: u32) -> Self {
        let (tokens, lex_errors) = lex(text, offset);
        let errors = lex_errors
            .into_iter()
            .map(|span| ParseError::UnrecognizedInput {
                text: text
                    .get((span.start - offset) as usize..(span.end - offset) as usize)
                    .unwrap_or_default()
                    .to_string(),
                span: source_span(span),
            })
            .collect();
        Self {
            text,
            tokens,
            pos: 0,
            offset,
            last_end: offset,
            errors,
        }
    }

    // ── Helpers ──

    fn peek(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos).map(|lexeme| lexeme.token.clone())
    }

    fn peek_at(&self, index: usize) -> Option<Token<'src>> {
        self.tokens
            .get(self.pos + index)
            .map(|lexeme| lexeme.token.clone())
    }

    /// Whether the next tokens spell `module/package.name` without spaces
    fn at_qualified_path(&self) -> bool {
        let Some(window) = self.tokens.get(self.pos..self.pos + 5) else {
            return false;
        };
        let shape = matches!(
            (&window[0].token, &window[1].token, &window[2].token, &window[3].token, &window[4].token),
            (
                Token::Identifier(_),
                Token::Slash,
                Token::Identifier(_),
                Token::Dot,
                Token::Identifier(_)
            )
        );
        shape && window.windows(2).all(|pair| pair[0].span.end == pair[1].span.start)
    }

    fn at(&self, expected: &Token<'_>) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|lexeme| mem::discriminant(&lexeme.token) == mem::discriminant(expected))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Whether the next token starts a new line
    fn at_line_start(&self) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|lexeme| lexeme.newline_before)
    }

    fn current_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .map_or_else(|| self.eof_span(), |lexeme| lexeme.span)
    }

    fn eof_span(&self) -> Span {
        let end = self.offset + self.text.len() as u32;
        Span::new(end, end)
    }

    fn advance(&mut self) -> Option<Lexeme<'src>> {
        let lexeme = self.tokens.get(self.pos).cloned()?;
        self.pos += 1;
        self.last_end = lexeme.span.end;
        Some(lexeme)
    }

    fn eat(&mut self, expected: &Token<'_>) -> bool {
        if self.at(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token<'_>) -> Option<Span> {
        if self.at(expected) {
            return self.advance().map(|lexeme| lexeme.span);
        }
        self.error_expected(&format!("`{expected}`"));
        None
    }

    fn expect_ident(&mut self, what: &str) -> Option<(String, Span)> {
        if let Some(Token::Identifier(name)) = self.peek() {
            let span = self.advance().map(|lexeme| lexeme.span)?;
            return Some((name.to_string(), span));
        }
        self.error_expected(what);
        None
    }

    fn error_expected(&mut self, expected: &str) {
        let error = match self.tokens.get(self.pos) {
            Some(lexeme) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: lexeme.token.to_string(),
                span: source_span(lexeme.span),
            },
            None => ParseError::UnexpectedEof {
                expected: expected.to_string(),
                span: source_span(self.eof_span()),
            },
        };
        self.errors.push(error);
    }

    /// Span from `start` to the end of the last consumed token
    fn span_from(&self, start: Span) -> Span {
        Span::new(start.start, self.last_end.max(start.end))
    }

    /// Skip to the next line or closing brace after an error
    fn recover(&mut self, before: usize) {
        if self.pos == before {
            self.advance();
        }
        while !self.at_end() && !self.at(&Token::RightBrace) && !self.at_line_start() {
            self.advance();
        }
    }

    fn eat_separators(&mut self) {
        while self.eat(&Token::Semicolon) {}
    }

    // ── Units ──

    pub(crate) fn parse_unit(&mut self) -> SourceUnit {
        let package = if self.at(&Token::Package) {
            self.parse_package()
        } else {
            None
        };
        self.eat_separators();

        let mut imports = Vec::new();
        while self.at(&Token::Import) {
            let before = self.pos;
            match self.parse_import() {
                Some(import) => imports.push(import),
                None => self.recover(before),
            }
            self.eat_separators();
        }

        let mut items = Vec::new();
        while !self.at_end() {
            let before = self.pos;
            if self.at(&Token::RightBrace) {
                self.error_expected("declaration or expression");
                self.advance();
                continue;
            }
            match self.parse_statement() {
                Some(node) => items.push(node),
                None => self.recover(before),
            }
            self.eat_separators();
        }

        SourceUnit {
            package,
            imports,
            items,
        }
    }

    fn parse_package(&mut self) -> Option<PackageDecl> {
        let start = self.expect(&Token::Package)?;
        let (module, _) = self.expect_ident("module name")?;
        self.expect(&Token::Slash)?;
        let (package, _) = self.expect_ident("package name")?;
        Some(PackageDecl {
            module,
            package,
            span: self.span_from(start),
        })
    }

    fn parse_import(&mut self) -> Option<ImportDecl> {
        let start = self.expect(&Token::Import)?;
        let (module, _) = self.expect_ident("module name")?;
        self.expect(&Token::Slash)?;
        let (package, _) = self.expect_ident("package name")?;

        let alias = if self.eat(&Token::As) {
            Some(self.expect_ident("package alias")?.0)
        } else {
            None
        };

        let mut entries = Vec::new();
        if self.eat(&Token::LeftBrace) {
            while !self.at(&Token::RightBrace) {
                let (name, name_span) = self.expect_ident("imported name")?;
                let alias = if self.eat(&Token::As) {
                    Some(self.expect_ident("local name")?.0)
                } else {
                    None
                };
                entries.push(ImportEntry {
                    name,
                    alias,
                    span: self.span_from(name_span),
                });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RightBrace)?;
        }

        Some(ImportDecl {
            module,
            package,
            alias,
            entries,
            span: self.span_from(start),
        })
    }

    // ── Statements ──

    fn parse_statement(&mut self) -> Option<Node> {
        let start = self.current_span();
        let public = self.eat(&Token::Pub);
        match self.peek() {
            Some(Token::Fn) if matches!(self.peek_at(1), Some(Token::Identifier(_))) => self
                .parse_function(public, start)
                .map(Node::FunctionDeclaration),
            Some(Token::Val | Token::Var) => self
                .parse_name_declaration(public, start)
                .map(Node::NameDeclaration),
            Some(Token::Data) => self
                .parse_variant_type(public, start)
                .map(Node::VariantTypeDefinition),
            _ if public => {
                self.error_expected("`fn`, `val`, `var` or `data` after `pub`");
                None
            }
            _ => self.parse_assignment(),
        }
    }

    fn parse_function(&mut self, public: bool, start: Span) -> Option<FunctionDeclaration> {
        self.expect(&Token::Fn)?;
        let (name, _) = self.expect_ident("function name")?;
        let type_params = if self.at(&Token::LeftBracket) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        let params = self.parse_params()?;
        let return_type = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let (body, _) = self.parse_block_body()?;
        Some(FunctionDeclaration {
            name,
            public,
            type_params,
            params,
            return_type,
            body,
            span: self.span_from(start),
        })
    }

    fn parse_name_declaration(&mut self, public: bool, start: Span) -> Option<NameDeclaration> {
        let mutable = self.at(&Token::Var);
        self.advance();
        let (name, _) = self.expect_ident("variable name")?;
        let ty = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        self.expect(&Token::Equal)?;
        let value = self.parse_expression()?;
        Some(NameDeclaration {
            name,
            public,
            mutable,
            ty,
            value: Box::new(value),
            span: self.span_from(start),
        })
    }

    fn parse_variant_type(&mut self, public: bool, start: Span) -> Option<VariantTypeDefinition> {
        self.expect(&Token::Data)?;
        let (name, _) = self.expect_ident("type name")?;
        let type_params = if self.at(&Token::LeftBracket) {
            self.parse_type_params()?
        } else {
            Vec::new()
        };
        self.expect(&Token::Equal)?;

        let mut cases = vec![self.parse_case()?];
        while self.eat(&Token::Pipe) {
            cases.push(self.parse_case()?);
        }

        Some(VariantTypeDefinition {
            name,
            public,
            type_params,
            cases,
            span: self.span_from(start),
        })
    }

    fn parse_case(&mut self) -> Option<CaseDefinition> {
        let start = self.current_span();
        let public = self.eat(&Token::Pub);
        let (name, _) = self.expect_ident("case name")?;
        let mut fields = Vec::new();
        if self.eat(&Token::LeftParen) {
            while !self.at(&Token::RightParen) {
                let field_start = self.current_span();
                let field_public = self.eat(&Token::Pub);
                let (field_name, _) = self.expect_ident("field name")?;
                self.expect(&Token::Colon)?;
                let ty = self.parse_type()?;
                fields.push(FieldDefinition {
                    name: field_name,
                    public: field_public,
                    ty,
                    span: self.span_from(field_start),
                });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RightParen)?;
        }
        Some(CaseDefinition {
            name,
            public,
            fields,
            span: self.span_from(start),
        })
    }

    fn parse_type_params(&mut self) -> Option<Vec<String>> {
        self.expect(&Token::LeftBracket)?;
        let mut names = Vec::new();
        while !self.at(&Token::RightBracket) {
            names.push(self.expect_ident("type parameter")?.0);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RightBracket)?;
        Some(names)
    }

    fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.expect(&Token::LeftParen)?;
        let mut params = Vec::new();
        while !self.at(&Token::RightParen) {
            let (name, span) = self.expect_ident("parameter name")?;
            self.expect(&Token::Colon)?;
            let ty = self.parse_type()?;
            params.push(Param {
                name,
                ty,
                span: self.span_from(span),
            });
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RightParen)?;
        Some(params)
    }

    fn parse_block_body(&mut self) -> Option<(Vec<Node>, Span)> {
        let start = self.expect(&Token::LeftBrace)?;
        let mut body = Vec::new();
        self.eat_separators();
        while !self.at(&Token::RightBrace) && !self.at_end() {
            let before = self.pos;
            match self.parse_statement() {
                Some(node) => body.push(node),
                None => self.recover(before),
            }
            self.eat_separators();
        }
        self.expect(&Token::RightBrace)?;
        Some((body, self.span_from(start)))
    }

    // ── Types ──

    fn parse_type(&mut self) -> Option<TypeRef> {
        let start = self.current_span();
        if self.eat(&Token::LeftParen) {
            let mut params = Vec::new();
            while !self.at(&Token::RightParen) {
                params.push(self.parse_type()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RightParen)?;
            self.expect(&Token::Arrow)?;
            let ret = self.parse_type()?;
            return Some(TypeRef::Function {
                params,
                ret: Box::new(ret),
                span: self.span_from(start),
            });
        }

        let (name, span) = self.expect_ident("type")?;
        let mut ty = TypeRef::Named { name, span };
        if self.at(&Token::LeftBracket) && !self.at_line_start() {
            self.advance();
            let mut args = Vec::new();
            while !self.at(&Token::RightBracket) {
                args.push(self.parse_type()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
            self.expect(&Token::RightBracket)?;
            ty = TypeRef::Constructor {
                base: Box::new(ty),
                args,
                span: self.span_from(start),
            };
        }
        if self.eat(&Token::Dot) {
            let (case, _) = self.expect_ident("case name")?;
            ty = TypeRef::Case {
                base: Box::new(ty),
                case,
                span: self.span_from(start),
            };
        }
        Some(ty)
    }

    // ── Expressions ──

    fn parse_assignment(&mut self) -> Option<Node> {
        let target = self.parse_expression()?;
        if !self.at(&Token::Equal) {
            return Some(target);
        }
        self.advance();
        let value = self.parse_assignment()?;
        let span = target.span().to(value.span());
        match target {
            Node::Name {
                name,
                span: name_span,
            } => Some(Node::Assignment {
                name,
                name_span,
                value: Box::new(value),
                span,
            }),
            Node::Index {
                receiver, index, ..
            } => Some(Node::IndexAssignment {
                receiver,
                index,
                value: Box::new(value),
                span,
            }),
            other => {
                self.errors.push(ParseError::UnexpectedToken {
                    expected: "assignable expression".to_string(),
                    found: other.describe(),
                    span: source_span(other.span()),
                });
                None
            }
        }
    }

    pub(crate) fn parse_expression(&mut self) -> Option<Node> {
        self.parse_or()
    }

    /// Binary operator for the next token at `level`, unless it starts a new line
    fn binary_op(&self, level: u8) -> Option<BinaryOp> {
        if self.at_line_start() {
            return None;
        }
        let op = match (level, self.peek()?) {
            (0, Token::OrOr) => BinaryOp::Or,
            (1, Token::AndAnd) => BinaryOp::And,
            (2, Token::EqualEqual) => BinaryOp::Eq,
            (2, Token::NotEqual) => BinaryOp::NotEq,
            (3, Token::Less) => BinaryOp::Lt,
            (3, Token::LessEqual) => BinaryOp::LtEq,
            (3, Token::Greater) => BinaryOp::Gt,
            (3, Token::GreaterEqual) => BinaryOp::GtEq,
            (4, Token::Plus) => BinaryOp::Add,
            (4, Token::Minus) => BinaryOp::Sub,
            (5, Token::Star) => BinaryOp::Mul,
            (5, Token::Slash) => BinaryOp::Div,
            (5, Token::Percent) => BinaryOp::Rem,
            _ => return None,
        };
        Some(op)
    }

    fn parse_binary(&mut self, level: u8) -> Option<Node> {
        let mut left = self.parse_binary_operand(level)?;
        while let Some(op) = self.binary_op(level) {
            self.advance();
            let right = self.parse_binary_operand(level)?;
            let span = left.span().to(right.span());
            left = Node::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Some(left)
    }

    fn parse_binary_operand(&mut self, level: u8) -> Option<Node> {
        match level {
            0..=2 => self.parse_binary(level + 1),
            3 => self.parse_is(),
            4 => self.parse_binary(5),
            _ => self.parse_unary(),
        }
    }

    fn parse_or(&mut self) -> Option<Node> {
        self.parse_binary(0)
    }

    fn parse_is(&mut self) -> Option<Node> {
        let value = self.parse_binary(4)?;
        if !self.at(&Token::Is) || self.at_line_start() {
            return Some(value);
        }
        self.advance();
        let (case, case_span) = self.expect_ident("case name")?;
        let span = value.span().to(case_span);
        Some(Node::Is {
            value: Box::new(value),
            case,
            span,
        })
    }

    fn parse_unary(&mut self) -> Option<Node> {
        let op = match self.peek() {
            Some(Token::Bang) => UnaryOp::Not,
            Some(Token::Minus) => UnaryOp::Negate,
            _ => return self.parse_postfix(),
        };
        let start = self.current_span();
        self.advance();
        let operand = self.parse_unary()?;
        let span = start.to(operand.span());
        Some(Node::Unary {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    fn parse_postfix(&mut self) -> Option<Node> {
        let mut node = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(Token::LeftParen) if !self.at_line_start() => {
                    let args = self.parse_args()?;
                    let span = self.span_from(node.span());
                    node = Node::Call {
                        callee: Box::new(node),
                        args,
                        span,
                    };
                }
                Some(Token::LeftBracket) if !self.at_line_start() => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect(&Token::RightBracket)?;
                    let span = self.span_from(node.span());
                    node = Node::Index {
                        receiver: Box::new(node),
                        index: Box::new(index),
                        span,
                    };
                }
                Some(Token::Dot) => {
                    self.advance();
                    let (member, member_span) = self.expect_ident("member name")?;
                    let span = node.span().to(member_span);
                    node = Node::Member {
                        receiver: Box::new(node),
                        member,
                        member_span,
                        span,
                    };
                }
                _ => return Some(node),
            }
        }
    }

    fn parse_qualified_name(&mut self) -> Option<Node> {
        let (module, start) = self.expect_ident("module name")?;
        self.expect(&Token::Slash)?;
        let (package, _) = self.expect_ident("package name")?;
        self.expect(&Token::Dot)?;
        let (name, name_span) = self.expect_ident("name")?;
        Some(Node::QualifiedName {
            module,
            package,
            name,
            name_span,
            span: start.to(name_span),
        })
    }

    fn parse_args(&mut self) -> Option<Vec<Node>> {
        self.expect(&Token::LeftParen)?;
        let mut args = Vec::new();
        while !self.at(&Token::RightParen) {
            args.push(self.parse_expression()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RightParen)?;
        Some(args)
    }

    fn parse_primary(&mut self) -> Option<Node> {
        let Some(token) = self.peek() else {
            self.error_expected("expression");
            return None;
        };
        let span = self.current_span();
        match token {
            Token::Integer(text) => {
                self.advance();
                let value = text.replace('_', "").parse::<i64>().unwrap_or_else(|_| {
                    self.errors.push(ParseError::InvalidLiteral {
                        kind: "integer",
                        text: text.to_string(),
                        span: source_span(span),
                    });
                    0
                });
                Some(Node::Literal {
                    value: Literal::Int(value),
                    span,
                })
            }
            Token::Float(text) => {
                self.advance();
                let value = text.replace('_', "").parse::<f64>().unwrap_or_else(|_| {
                    self.errors.push(ParseError::InvalidLiteral {
                        kind: "float",
                        text: text.to_string(),
                        span: source_span(span),
                    });
                    0.0
                });
                Some(Node::Literal {
                    value: Literal::Float(value),
                    span,
                })
            }
            Token::String(raw) => {
                self.advance();
                Some(self.parse_string(raw, span))
            }
            Token::True | Token::False => {
                self.advance();
                Some(Node::Literal {
                    value: Literal::Bool(matches!(token, Token::True)),
                    span,
                })
            }
            Token::Identifier("unit") => {
                self.advance();
                Some(Node::Literal {
                    value: Literal::Unit,
                    span,
                })
            }
            Token::Identifier(_) if self.at_qualified_path() => self.parse_qualified_name(),
            Token::Identifier(name) => {
                self.advance();
                Some(Node::Name {
                    name: name.to_string(),
                    span,
                })
            }
            Token::LeftParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Some(inner)
            }
            Token::LeftBrace => {
                let (body, span) = self.parse_block_body()?;
                Some(Node::Block { body, span })
            }
            Token::LeftBracket => {
                self.advance();
                let mut elements = Vec::new();
                while !self.at(&Token::RightBracket) {
                    elements.push(self.parse_expression()?);
                    if !self.eat(&Token::Comma) {
                        break;
                    }
                }
                self.expect(&Token::RightBracket)?;
                Some(Node::Array {
                    elements,
                    span: self.span_from(span),
                })
            }
            Token::If => self.parse_if(),
            Token::While => self.parse_while(),
            Token::Return => self.parse_return(),
            Token::Fn => self.parse_lambda(),
            _ => {
                self.error_expected("expression");
                None
            }
        }
    }

    fn parse_block_node(&mut self) -> Option<Node> {
        let (body, span) = self.parse_block_body()?;
        Some(Node::Block { body, span })
    }

    fn parse_if(&mut self) -> Option<Node> {
        let start = self.expect(&Token::If)?;
        self.expect(&Token::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(&Token::RightParen)?;
        let then_branch = self.parse_block_node()?;
        let else_branch = if self.eat(&Token::Else) {
            if self.at(&Token::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                Some(Box::new(self.parse_block_node()?))
            }
        } else {
            None
        };
        Some(Node::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
            span: self.span_from(start),
        })
    }

    fn parse_while(&mut self) -> Option<Node> {
        let start = self.expect(&Token::While)?;
        self.expect(&Token::LeftParen)?;
        let condition = self.parse_expression()?;
        self.expect(&Token::RightParen)?;
        let body = self.parse_block_node()?;
        Some(Node::While {
            condition: Box::new(condition),
            body: Box::new(body),
            span: self.span_from(start),
        })
    }

    fn parse_return(&mut self) -> Option<Node> {
        let start = self.expect(&Token::Return)?;
        let has_value = !self.at_line_start()
            && self
                .peek()
                .is_some_and(|token| token.starts_expression());
        let value = if has_value {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        Some(Node::Return {
            value,
            span: self.span_from(start),
        })
    }

    fn parse_lambda(&mut self) -> Option<Node> {
        let start = self.expect(&Token::Fn)?;
        let params = self.parse_params()?;
        let return_type = if self.eat(&Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let (body, _) = self.parse_block_body()?;
        Some(Node::Lambda {
            params,
            return_type,
            body,
            span: self.span_from(start),
        })
    }

    // ── Strings ──

    /// Unescape a string token and split out `$name` / `${expr}` parts
    fn parse_string(&mut self, raw: &'src str, span: Span) -> Node {
        let inner = &raw[1..raw.len() - 1];
        let inner_offset = span.start + 1;
        let mut parts = Vec::new();
        let mut text = String::new();
        let mut chars = inner.char_indices().peekable();

        while let Some((idx, current)) = chars.next() {
            match current {
                '\\' => match chars.next() {
                    Some((_, 'n')) => text.push('\n'),
                    Some((_, 't')) => text.push('\t'),
                    Some((_, 'r')) => text.push('\r'),
                    Some((_, '0')) => text.push('\0'),
                    Some((_, escaped)) => text.push(escaped),
                    None => text.push('\\'),
                },
                '$' if chars.peek().is_some_and(|(_, next)| *next == '{') => {
                    chars.next();
                    let expr_start = idx + 2;
                    let mut depth = 1;
                    let mut expr_end = None;
                    for (pos, character) in chars.by_ref() {
                        match character {
                            '{' => depth += 1,
                            '}' => {
                                depth -= 1;
                                if depth == 0 {
                                    expr_end = Some(pos);
                                    break;
                                }
                            }
                            _ => {}
                        }
                    }
                    let Some(expr_end) = expr_end else {
                        self.errors.push(ParseError::UnterminatedInterpolation {
                            span: source_span(Span::new(
                                inner_offset + idx as u32,
                                inner_offset + idx as u32 + 2,
                            )),
                        });
                        break;
                    };
                    if !text.is_empty() {
                        parts.push(InterpolationPart::Text(mem::take(&mut text)));
                    }
                    let mut sub = Parser::new(
                        &inner[expr_start..expr_end],
                        inner_offset + expr_start as u32,
                    );
                    let expr = sub.parse_expression();
                    if expr.is_some() && !sub.at_end() {
                        sub.error_expected("`}`");
                    }
                    self.errors.append(&mut sub.errors);
                    if let Some(expr) = expr {
                        parts.push(InterpolationPart::Expr(expr));
                    }
                }
                '$' if chars
                    .peek()
                    .is_some_and(|(_, next)| next.is_ascii_alphabetic() || *next == '_') =>
                {
                    let name_start = idx + 1;
                    let mut name_end = name_start;
                    while let Some((pos, character)) = chars.peek().copied() {
                        if character.is_ascii_alphanumeric() || character == '_' {
                            name_end = pos + character.len_utf8();
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    if !text.is_empty() {
                        parts.push(InterpolationPart::Text(mem::take(&mut text)));
                    }
                    parts.push(InterpolationPart::Expr(Node::Name {
                        name: inner[name_start..name_end].to_string(),
                        span: Span::new(
                            inner_offset + name_start as u32,
                            inner_offset + name_end as u32,
                        ),
                    }));
                }
                other => text.push(other),
            }
        }

        if parts.is_empty() {
            return Node::Literal {
                value: Literal::String(text),
                span,
            };
        }
        if !text.is_empty() {
            parts.push(InterpolationPart::Text(text));
        }
        Node::Interpolation { parts, span }
    }
}
