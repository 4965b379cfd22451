//! IR Printer - Pretty print tacc IR
//!
//! Outputs human-readable three-address code, one instruction per line.

use crate::middle::ir::Instruction;

const INDENT: &str = "    ";

/// Pretty printer for tacc IR
pub struct IRPrinter {
    output: String,
}

impl IRPrinter {
    pub fn new() -> Self {
        Self {
            output: String::new(),
        }
    }

    /// Print an instruction sequence to string
    pub fn print(&mut self, code: &[Instruction]) -> String {
        self.output.clear();

        for inst in code {
            self.print_instruction(inst);
        }

        self.output.clone()
    }

    /// Labels and function headers sit flush left
    fn print_instruction(&mut self, inst: &Instruction) {
        if !inst.is_label() {
            self.output.push_str(INDENT);
        }
        self.output.push_str(&inst.to_string());
        self.output.push('\n');
    }
}

impl Default for IRPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to print an instruction sequence
pub fn print_ir(code: &[Instruction]) -> String {
    let mut printer = IRPrinter::new();
    printer.print(code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::Parser;
    use crate::middle::ir_gen::generate;
    use pretty_assertions::assert_eq;

    fn compile_and_print(source: &str) -> String {
        let tokens = Lexer::new(source).tokenize().unwrap();
        let program = Parser::new(tokens).parse_program().unwrap();
        print_ir(&generate(&program))
    }

    #[test]
    fn test_print_empty() {
        assert_eq!(print_ir(&[]), "");
    }

    #[test]
    fn test_print_while_loop() {
        let ir = compile_and_print("int x; while x < 3 : BEGIN x = x + 1; END");
        assert_eq!(
            ir,
            "_L1_while:\n\
             \x20   _t3 = x < 3\n\
             \x20   IF NOT _t3 GOTO _L2_endwhile\n\
             \x20   _t4 = x + 1\n\
             \x20   x = _t4\n\
             \x20   GOTO _L1_while\n\
             _L2_endwhile:\n"
        );
    }

    #[test]
    fn test_print_function() {
        let ir = compile_and_print("int id(int a) : BEGIN return a; END");
        assert_eq!(ir, "    return\nfunc id(a):\n    return a\n");
    }
}
