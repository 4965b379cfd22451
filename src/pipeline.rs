//! Compilation pipeline
//!
//! Runs lexer, parser, semantic analysis and IR generation in order.

use crate::frontend::ast::Program;
use crate::frontend::lexer::Lexer;
use crate::frontend::parser::Parser;
use crate::frontend::semantic::SemanticAnalyzer;
use crate::frontend::token::Token;
use crate::middle::ir::Instruction;
use crate::middle::ir_gen::IRGenerator;
use crate::utils::{Result, SemanticError};

/// Everything produced for one compilation unit
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub program: Program,
    /// Semantic errors in discovery order
    pub errors: Vec<SemanticError>,
    /// Empty whenever `errors` is not
    pub instructions: Vec<Instruction>,
}

impl Compilation {
    /// True when analysis passed and IR was generated
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compile source text. Lexical and syntax errors abort; semantic errors are
/// collected and block IR generation.
pub fn compile(source: &str) -> Result<Compilation> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens.clone()).parse_program()?;

    let errors = SemanticAnalyzer::new().analyze(&program);
    let instructions = if errors.is_empty() {
        IRGenerator::new().generate(&program)
    } else {
        log::debug!("skipping IR generation: {} semantic error(s)", errors.len());
        Vec::new()
    };

    Ok(Compilation {
        tokens,
        program,
        errors,
        instructions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{CompileError, SemanticErrorKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_valid_program() {
        let unit = compile("int x; x = 3 + 2;").unwrap();
        assert!(unit.is_ok());
        assert_eq!(unit.program.globals.len(), 2);
        assert_eq!(unit.instructions.len(), 2);
        // int x ; x = 3 + 2 ; <eof>
        assert_eq!(unit.tokens.len(), 10);
    }

    #[test]
    fn test_semantic_errors_block_generation() {
        let unit = compile("x = 1;\nint y; int y;").unwrap();
        assert!(!unit.is_ok());
        let kinds: Vec<_> = unit.errors.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![SemanticErrorKind::UndeclaredVariable, SemanticErrorKind::DuplicateDeclaration]
        );
        assert!(unit.instructions.is_empty());
    }

    #[test]
    fn test_lexical_error_aborts() {
        let err = compile("int x;\nx = 1 $ 2;").unwrap_err();
        assert!(matches!(err, CompileError::Lexical(_)));
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_syntax_error_aborts() {
        let err = compile("int x\nx = 1;").unwrap_err();
        assert!(matches!(err, CompileError::Syntax(_)));
        assert_eq!(err.line(), 2);
    }
}
