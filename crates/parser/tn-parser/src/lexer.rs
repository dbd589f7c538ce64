//! Tern lexer built on `logos`

use logos::Logos;
use std::fmt;
use tn_span::Span;

/// A token together with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme<'src> {
    /// The token
    pub token: Token<'src>,
    /// Byte span, already shifted by the lexer's base offset
    pub span: Span,
    /// Whether a line break separates this token from the previous one
    pub newline_before: bool,
}

/// Lex `source`, shifting every span by `offset`. Unrecognised input is
/// returned as error spans next to the token list.
pub fn lex(source: &str, offset: u32) -> (Vec<Lexeme<'_>>, Vec<Span>) {
    let mut lexemes = Vec::new();
    let mut errors = Vec::new();
    let mut previous_end = 0;

    for (result, range) in Token::lexer(source).spanned() {
        let newline_before = source[previous_end..range.start].contains('\n');
        previous_end = range.end;
        let span = Span::new(range.start as u32 + offset, range.end as u32 + offset);
        match result {
            Ok(token) => lexemes.push(Lexeme {
                token,
                span,
                newline_before,
            }),
            Err(()) => errors.push(span),
        }
    }

    (lexemes, errors)
}

fn line_comment<'src>(lex: &mut logos::Lexer<'src, Token<'src>>) -> logos::Skip {
    let remainder = lex.remainder();
    let len = remainder.find('\n').unwrap_or(remainder.len());
    lex.bump(len);
    logos::Skip
}

fn block_comment<'src>(lex: &mut logos::Lexer<'src, Token<'src>>) -> logos::FilterResult<(), ()> {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            logos::FilterResult::Skip
        }
        None => {
            lex.bump(remainder.len());
            logos::FilterResult::Error(())
        }
    }
}

/// Tern tokens
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token<'src> {
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("as")]
    As,
    #[token("pub")]
    Pub,
    #[token("fn")]
    Fn,
    #[token("val")]
    Val,
    #[token("var")]
    Var,
    #[token("data")]
    Data,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("is")]
    Is,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("->")]
    Arrow,
    #[token("|")]
    Pipe,
    #[token("=")]
    Equal,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    NotEqual,
    #[token("<")]
    Less,
    #[token("<=")]
    LessEqual,
    #[token(">")]
    Greater,
    #[token(">=")]
    GreaterEqual,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*", priority = 4)]
    Float(&'src str),
    #[regex(r"[0-9][0-9_]*", priority = 3)]
    Integer(&'src str),
    #[regex(r#""([^"\\]|\\.)*""#)]
    String(&'src str),
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Identifier(&'src str),

    #[token("//", line_comment)]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,
}

impl Token<'_> {
    /// Whether the token can begin an expression
    pub fn starts_expression(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_)
                | Self::Integer(_)
                | Self::Float(_)
                | Self::String(_)
                | Self::True
                | Self::False
                | Self::LeftParen
                | Self::LeftBrace
                | Self::LeftBracket
                | Self::If
                | Self::While
                | Self::Return
                | Self::Fn
                | Self::Bang
                | Self::Minus
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Package => "package",
            Self::Import => "import",
            Self::As => "as",
            Self::Pub => "pub",
            Self::Fn => "fn",
            Self::Val => "val",
            Self::Var => "var",
            Self::Data => "data",
            Self::If => "if",
            Self::Else => "else",
            Self::While => "while",
            Self::Return => "return",
            Self::Is => "is",
            Self::True => "true",
            Self::False => "false",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Semicolon => ";",
            Self::Dot => ".",
            Self::Arrow => "->",
            Self::Pipe => "|",
            Self::Equal => "=",
            Self::EqualEqual => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Bang => "!",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Float(text) | Self::Integer(text) | Self::String(text) | Self::Identifier(text) => {
                *text
            }
            Self::LineComment | Self::BlockComment => "comment",
        };
        formatter.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        let (lexemes, errors) = lex(source, 0);
        assert!(errors.is_empty(), "unexpected lex errors: {errors:?}");
        lexemes.into_iter().map(|lexeme| lexeme.token).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            tokens("val value = is_ok"),
            vec![
                Token::Val,
                Token::Identifier("value"),
                Token::Equal,
                Token::Identifier("is_ok"),
            ]
        );
    }

    #[test]
    fn test_numbers_and_member_access() {
        assert_eq!(
            tokens("1.5 2 xs.len"),
            vec![
                Token::Float("1.5"),
                Token::Integer("2"),
                Token::Identifier("xs"),
                Token::Dot,
                Token::Identifier("len"),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            tokens("a // trailing\n/* block\n comment */ b"),
            vec![Token::Identifier("a"), Token::Identifier("b")]
        );
    }

    #[test]
    fn test_newline_tracking_and_offset() {
        let (lexemes, _) = lex("f\n(1)", 10);
        assert!(!lexemes[0].newline_before);
        assert!(lexemes[1].newline_before);
        assert_eq!(lexemes[1].span, Span::new(12, 13));
    }
}
