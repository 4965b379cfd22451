//! tacc - a small-language compiler front end
//!
//! Source text goes through a lexer, a recursive-descent parser, a
//! scope-aware semantic analyzer and finally a three-address code generator.

pub mod feedback;
pub mod frontend;
pub mod middle;
pub mod pipeline;
pub mod types;
pub mod utils;

pub use frontend::ast::Program;
pub use frontend::token::Token;
pub use middle::ir::Instruction;
pub use middle::ir_printer::print_ir;
pub use pipeline::{compile, Compilation};
pub use types::Type;
pub use utils::{CompileError, LexicalError, SemanticError, SemanticErrorKind, Span, SyntaxError};

/// Split source text into tokens, ending with `Eof`
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexicalError> {
    frontend::lexer::Lexer::new(source).tokenize()
}

/// Build the AST from a token stream
pub fn parse(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    frontend::parser::Parser::new(tokens).parse_program()
}

/// Check declarations, uses and types; returns every error found
pub fn analyze(program: &Program) -> Vec<SemanticError> {
    frontend::semantic::SemanticAnalyzer::new().analyze(program)
}

/// Lower a semantically valid program to three-address code
pub fn generate(program: &Program) -> Vec<Instruction> {
    middle::ir_gen::generate(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stage_by_stage() {
        let tokens = tokenize("int x; while x < 2 : BEGIN x = x + 1; END").unwrap();
        let program = parse(tokens).unwrap();
        assert_eq!(analyze(&program), vec![]);
        assert_eq!(analyze(&program), analyze(&program));
        let code = generate(&program);
        assert_eq!(code.first(), Some(&Instruction::Label("_L1_while".to_string())));
        assert_eq!(code.last(), Some(&Instruction::Label("_L2_endwhile".to_string())));
    }

    #[test]
    fn test_undeclared_call_reports_once() {
        let program = parse(tokenize("int x; foo(x);").unwrap()).unwrap();
        let errors = analyze(&program);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), SemanticErrorKind::UndeclaredVariable);

        let program = parse(tokenize("foo(y);").unwrap()).unwrap();
        assert_eq!(analyze(&program).len(), 1);
    }
}
