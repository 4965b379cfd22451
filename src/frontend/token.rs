//! Token definitions for tacc

use std::fmt;
use serde::Serialize;

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(span: Span) -> Self {
        Self { kind: TokenKind::Eof, span }
    }

    /// Line the token starts on
    pub fn line(&self) -> usize {
        self.span.line
    }
}

/// Numeric literal value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            // Keep the decimal point so `2.0` does not render as `2`
            Number::Float(x) => write!(f, "{:?}", x),
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    // ============ Keywords ============
    /// if
    If,
    /// else
    Else,
    /// while
    While,
    /// return
    Return,
    /// int
    Int,
    /// void
    Void,
    /// BEGIN (block open)
    Begin,
    /// END (block close)
    End,

    // ============ Identifiers and Literals ============
    /// Identifier (variable name, function name)
    Ident(String),
    /// Integer or decimal literal
    Number(Number),

    // ============ Operators ============
    /// =
    Assign,
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// ==
    EqEq,
    /// !=
    Ne,
    /// <
    Lt,
    /// <=
    Le,
    /// >
    Gt,
    /// >=
    Ge,

    // ============ Delimiters ============
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// :
    Colon,
    /// ;
    Semicolon,

    // ============ Special ============
    /// End of input
    Eof,
}

impl TokenKind {
    /// Try to convert an identifier to a keyword
    pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
        match s {
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "while" => Some(TokenKind::While),
            "return" => Some(TokenKind::Return),
            "int" => Some(TokenKind::Int),
            "void" => Some(TokenKind::Void),
            "BEGIN" => Some(TokenKind::Begin),
            "END" => Some(TokenKind::End),
            _ => None,
        }
    }

    /// Source spelling of fixed tokens
    pub fn symbol(&self) -> Option<&'static str> {
        let s = match self {
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::Int => "int",
            TokenKind::Void => "void",
            TokenKind::Begin => "BEGIN",
            TokenKind::End => "END",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::EqEq => "==",
            TokenKind::Ne => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Ident(_) | TokenKind::Number(_) | TokenKind::Eof => return None,
        };
        Some(s)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Eof => write!(f, "end of input"),
            other => match other.symbol() {
                Some(s) => write!(f, "'{}'", s),
                None => write!(f, "{:?}", other),
            },
        }
    }
}
