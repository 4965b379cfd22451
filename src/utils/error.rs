//! Error handling for tacc
//!
//! Lexical and syntax errors are fatal and travel as `Err` values. Semantic
//! errors are accumulated by the analyzer and returned as a list.

use serde::Serialize;
use thiserror::Error;

use crate::frontend::token::TokenKind;
use crate::types::Type;
use crate::utils::Span;

/// Result type alias for the fatal stages
pub type Result<T> = std::result::Result<T, CompileError>;

// ==================== Lexer Errors ====================

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum LexicalError {
    #[error("line {line}: unexpected character '{character}'")]
    UnexpectedCharacter { character: char, line: usize },

    #[error("line {line}: number literal {text} is out of range")]
    NumberOutOfRange { text: String, line: usize },
}

impl LexicalError {
    pub fn line(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { line, .. } | Self::NumberOutOfRange { line, .. } => *line,
        }
    }
}

// ==================== Parser Errors ====================

/// First deviation from the grammar; parsing stops here
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("line {}: expected {expected}, found {found}", .span.line)]
pub struct SyntaxError {
    pub expected: String,
    pub found: TokenKind,
    pub span: Span,
}

// ==================== Pipeline Errors ====================

/// A failure that stops the pipeline before semantic analysis
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum CompileError {
    #[error("lexical error: {0}")]
    Lexical(#[from] LexicalError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
}

impl CompileError {
    pub fn line(&self) -> usize {
        match self {
            Self::Lexical(e) => e.line(),
            Self::Syntax(e) => e.span.line,
        }
    }
}

// ==================== Semantic Errors ====================

/// The diagnostic classes reported by semantic analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SemanticErrorKind {
    DuplicateDeclaration,
    UndeclaredVariable,
    TypeMismatch,
    ArityMismatch,
    InvalidReturn,
}

#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum SemanticError {
    #[error("line {}: '{name}' is already declared in this scope", .span.line)]
    DuplicateDeclaration { name: String, span: Span },

    #[error("line {}: variable '{name}' is not declared", .span.line)]
    UndeclaredVariable { name: String, span: Span },

    #[error("line {}: function '{name}' is not declared", .span.line)]
    UndeclaredFunction { name: String, span: Span },

    #[error("line {}: type mismatch in {context}: expected {expected}, found {found}", .span.line)]
    TypeMismatch {
        context: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("line {}: function '{name}' expects {expected} argument(s) but {found} were given", .span.line)]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("line {}: function '{function}' is void and must not return a value", .span.line)]
    VoidReturnValue { function: String, span: Span },

    #[error("line {}: function '{function}' must return a value of type {expected}", .span.line)]
    MissingReturnValue {
        function: String,
        expected: Type,
        span: Span,
    },

    #[error("line {}: 'return' outside of a function", .span.line)]
    ReturnOutsideFunction { span: Span },
}

impl SemanticError {
    /// Map this error to its diagnostic class
    pub fn kind(&self) -> SemanticErrorKind {
        match self {
            Self::DuplicateDeclaration { .. } => SemanticErrorKind::DuplicateDeclaration,
            Self::UndeclaredVariable { .. } | Self::UndeclaredFunction { .. } => {
                SemanticErrorKind::UndeclaredVariable
            }
            Self::TypeMismatch { .. } => SemanticErrorKind::TypeMismatch,
            Self::ArityMismatch { .. } => SemanticErrorKind::ArityMismatch,
            Self::VoidReturnValue { .. }
            | Self::MissingReturnValue { .. }
            | Self::ReturnOutsideFunction { .. } => SemanticErrorKind::InvalidReturn,
        }
    }

    /// Get the span associated with this error
    pub fn span(&self) -> Span {
        match self {
            Self::DuplicateDeclaration { span, .. }
            | Self::UndeclaredVariable { span, .. }
            | Self::UndeclaredFunction { span, .. }
            | Self::TypeMismatch { span, .. }
            | Self::ArityMismatch { span, .. }
            | Self::VoidReturnValue { span, .. }
            | Self::MissingReturnValue { span, .. }
            | Self::ReturnOutsideFunction { span } => *span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_line() {
        let err = SemanticError::UndeclaredVariable {
            name: "b".to_string(),
            span: Span::new(4, 5, 7),
        };
        assert_eq!(err.to_string(), "line 7: variable 'b' is not declared");
        assert_eq!(err.kind(), SemanticErrorKind::UndeclaredVariable);

        let lex = CompileError::from(LexicalError::UnexpectedCharacter { character: '$', line: 2 });
        assert_eq!(lex.to_string(), "lexical error: line 2: unexpected character '$'");
        assert_eq!(lex.line(), 2);
    }

    #[test]
    fn test_undeclared_function_is_undeclared_class() {
        let err = SemanticError::UndeclaredFunction {
            name: "foo".to_string(),
            span: Span::dummy(),
        };
        assert_eq!(err.kind(), SemanticErrorKind::UndeclaredVariable);
    }
}
