//! Lexer for tacc
//!
//! Converts source code into a stream of tokens.

use crate::frontend::token::{Number, Token, TokenKind};
use crate::utils::{LexicalError, Span};

/// The lexer state
pub struct Lexer {
    /// Source code as characters
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Current line (1-based)
    line: usize,
    /// Line of the current token's first character
    start_line: usize,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
            start_line: 1,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    /// Get the next character without advancing
    fn peek_next(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    /// Create a span from start to current position
    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos, self.start_line)
    }

    /// Create a token with the current span
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.make_span())
    }

    /// Skip whitespace and comments
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                // Line comments: `# ...` and `// ...`
                '#' => self.skip_line(),
                '/' if self.peek_next() == Some('/') => self.skip_line(),
                _ => break,
            }
        }
    }

    fn skip_line(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();

        let kind = TokenKind::keyword_from_str(&text)
            .unwrap_or(TokenKind::Ident(text));

        self.make_token(kind)
    }

    /// Read a number literal (integer or decimal)
    fn read_number(&mut self) -> Result<Token, LexicalError> {
        let mut is_float = false;

        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        // A decimal point only belongs to the number when a digit follows
        if self.peek() == Some('.') && self.peek_next().map_or(false, |c| c.is_ascii_digit()) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text: String = self.source[self.start..self.pos].iter().collect();

        let number = if is_float {
            text.parse::<f64>()
                .map(Number::Float)
                .map_err(|_| LexicalError::NumberOutOfRange { text: text.clone(), line: self.start_line })?
        } else {
            text.parse::<i64>()
                .map(Number::Int)
                .map_err(|_| LexicalError::NumberOutOfRange { text: text.clone(), line: self.start_line })?
        };

        Ok(self.make_token(TokenKind::Number(number)))
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token, LexicalError> {
        self.skip_whitespace();
        self.start = self.pos;
        self.start_line = self.line;

        let Some(c) = self.peek() else {
            return Ok(Token::eof(self.make_span()));
        };

        // Identifiers and keywords; a leading '_' is reserved for generated names
        if c.is_ascii_alphabetic() {
            return Ok(self.read_identifier());
        }

        if c.is_ascii_digit() {
            return self.read_number();
        }

        self.advance();

        // Operators and punctuation, two-character forms first
        let kind = match c {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::EqEq
                } else {
                    TokenKind::Assign
                }
            }
            '!' if self.peek() == Some('=') => {
                self.advance();
                TokenKind::Ne
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            _ => {
                return Err(LexicalError::UnexpectedCharacter {
                    character: c,
                    line: self.start_line,
                })
            }
        };

        Ok(self.make_token(kind))
    }

    /// Tokenize the entire source, stopping at the first lexical error
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexicalError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        log::debug!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }

    /// Tokenize the entire source, skipping offending input and collecting
    /// every lexical error along the way
    pub fn tokenize_lossy(&mut self) -> (Vec<Token>, Vec<LexicalError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        loop {
            match self.next_token() {
                Ok(token) => {
                    let is_eof = token.kind == TokenKind::Eof;
                    tokens.push(token);
                    if is_eof {
                        break;
                    }
                }
                Err(e) => {
                    log::trace!("skipping after {}", e);
                    errors.push(e);
                }
            }
        }
        (tokens, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("x = 3 + 2;"),
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::Assign,
                TokenKind::Number(Number::Int(3)),
                TokenKind::Plus,
                TokenKind::Number(Number::Int(2)),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keywords_need_exact_match() {
        assert_eq!(
            kinds("if iffy BEGIN BEGINS END while"),
            vec![
                TokenKind::If,
                TokenKind::Ident("iffy".to_string()),
                TokenKind::Begin,
                TokenKind::Ident("BEGINS".to_string()),
                TokenKind::End,
                TokenKind::While,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.14"),
            vec![
                TokenKind::Number(Number::Int(42)),
                TokenKind::Number(Number::Float(3.14)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comparison_operators_longest_match() {
        assert_eq!(
            kinds("< <= > >= == != ="),
            vec![
                TokenKind::Lt,
                TokenKind::Le,
                TokenKind::Gt,
                TokenKind::Ge,
                TokenKind::EqEq,
                TokenKind::Ne,
                TokenKind::Assign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_and_lines() {
        let tokens = Lexer::new("# header\nx = 1; // trailing\n\ny = 2;")
            .tokenize()
            .unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident("x".to_string()));
        assert_eq!(tokens[0].line(), 2);
        assert_eq!(tokens[4].kind, TokenKind::Ident("y".to_string()));
        assert_eq!(tokens[4].line(), 4);
    }

    #[test]
    fn test_unexpected_character() {
        let err = Lexer::new("x = 1;\ny = $;").tokenize().unwrap_err();
        assert_eq!(err, LexicalError::UnexpectedCharacter { character: '$', line: 2 });
    }

    #[test]
    fn test_reserved_underscore_prefix() {
        let err = Lexer::new("_t1 = 2;").tokenize().unwrap_err();
        assert_eq!(err, LexicalError::UnexpectedCharacter { character: '_', line: 1 });
        // Underscores inside identifiers are fine
        assert_eq!(kinds("a_b")[0], TokenKind::Ident("a_b".to_string()));
    }

    #[test]
    fn test_trailing_dot_is_not_a_number() {
        let err = Lexer::new("3.").tokenize().unwrap_err();
        assert_eq!(err, LexicalError::UnexpectedCharacter { character: '.', line: 1 });
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = Lexer::new("99999999999999999999").tokenize().unwrap_err();
        assert!(matches!(err, LexicalError::NumberOutOfRange { line: 1, .. }));
    }

    #[test]
    fn test_lossy_collects_every_error() {
        let (tokens, errors) = Lexer::new("x @ = 1 ! ;").tokenize_lossy();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            tokens.into_iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::Assign,
                TokenKind::Number(Number::Int(1)),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }
}
