//! IR Generator - AST to tacc IR
//!
//! Lowers a semantically valid AST into linear three-address code. Running
//! it on a program with outstanding semantic errors is not supported.

use crate::frontend::ast::{Block, Call, Expr, FunctionDecl, Program, Stmt};
use crate::middle::ir::Instruction;

/// Name allocation for one compilation unit. Temporaries and labels share
/// one counter, and the leading `_` cannot start a source identifier, so no
/// generated name collides with another or with user names.
#[derive(Debug, Default)]
pub struct LoweringContext {
    counter: usize,
}

impl LoweringContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> usize {
        self.counter += 1;
        self.counter
    }

    /// Fresh temporary: `_t{n}`
    pub fn new_temp(&mut self) -> String {
        format!("_t{}", self.next_id())
    }

    /// Fresh label: `_L{n}_{hint}`
    pub fn new_label(&mut self, hint: &str) -> String {
        format!("_L{}_{}", self.next_id(), hint)
    }
}

/// IR Generator
pub struct IRGenerator {
    ctx: LoweringContext,
    code: Vec<Instruction>,
}

impl IRGenerator {
    pub fn new() -> Self {
        Self {
            ctx: LoweringContext::new(),
            code: Vec::new(),
        }
    }

    /// Generate IR for a program: top-level statements first, then each
    /// function in declaration order. When functions follow, the top-level
    /// code ends with a `return` so it never runs into a function body.
    pub fn generate(&mut self, program: &Program) -> Vec<Instruction> {
        self.ctx = LoweringContext::new();
        self.code.clear();

        for stmt in &program.globals {
            self.generate_stmt(stmt);
        }

        if !program.functions.is_empty() {
            self.emit(Instruction::Return(None));
        }

        for func in &program.functions {
            self.generate_function(func);
        }

        log::debug!("generated {} instructions", self.code.len());
        std::mem::take(&mut self.code)
    }

    fn emit(&mut self, inst: Instruction) {
        log::trace!("emit {}", inst);
        self.code.push(inst);
    }

    fn generate_function(&mut self, func: &FunctionDecl) {
        self.emit(Instruction::Function {
            name: func.name.name.clone(),
            params: func.params.iter().map(|p| p.name.name.clone()).collect(),
        });

        self.generate_block(&func.body);

        // Implicit return when control can fall off the end
        if !matches!(func.body.stmts.last(), Some(Stmt::Return { .. })) {
            self.emit(Instruction::Return(None));
        }
    }

    fn generate_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.generate_stmt(stmt);
        }
    }

    fn generate_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            // Declarations only reserve a name
            Stmt::VarDecl { .. } => {}

            Stmt::Assign { name, value, .. } => {
                let expr = self.generate_expr(value);
                self.emit(Instruction::Assign {
                    dest: name.name.clone(),
                    expr,
                });
            }

            Stmt::If { cond, then_block, else_block, .. } => {
                let cond = self.generate_expr(cond);
                let else_label = self.ctx.new_label("else");
                let end_label = self.ctx.new_label("endif");

                self.emit(Instruction::IfFalseGoto {
                    cond,
                    label: else_label.clone(),
                });
                self.generate_block(then_block);
                self.emit(Instruction::Goto(end_label.clone()));
                self.emit(Instruction::Label(else_label));
                if let Some(block) = else_block {
                    self.generate_block(block);
                }
                self.emit(Instruction::Label(end_label));
            }

            Stmt::While { cond, body, .. } => {
                let start_label = self.ctx.new_label("while");
                let end_label = self.ctx.new_label("endwhile");

                self.emit(Instruction::Label(start_label.clone()));
                let cond = self.generate_expr(cond);
                self.emit(Instruction::IfFalseGoto {
                    cond,
                    label: end_label.clone(),
                });
                self.generate_block(body);
                self.emit(Instruction::Goto(start_label));
                self.emit(Instruction::Label(end_label));
            }

            Stmt::Block(block) => self.generate_block(block),

            Stmt::Call(call) => {
                let argc = self.generate_args(call);
                self.emit(Instruction::Call {
                    dest: None,
                    func: call.name.name.clone(),
                    argc,
                });
            }

            Stmt::Return { value, .. } => {
                let value = value.as_ref().map(|expr| self.generate_expr(expr));
                self.emit(Instruction::Return(value));
            }
        }
    }

    /// Lower an expression and return the name (or literal) holding its value
    fn generate_expr(&mut self, expr: &Expr) -> String {
        match expr {
            Expr::Number(n, _) => n.to_string(),

            Expr::Ident(ident) => ident.name.clone(),

            Expr::Binary { left, op, right, .. } => {
                let left = self.generate_expr(left);
                let right = self.generate_expr(right);
                let dest = self.ctx.new_temp();
                self.emit(Instruction::Assign {
                    dest: dest.clone(),
                    expr: format!("{} {} {}", left, op, right),
                });
                dest
            }

            Expr::Call(call) => {
                let argc = self.generate_args(call);
                let dest = self.ctx.new_temp();
                self.emit(Instruction::Call {
                    dest: Some(dest.clone()),
                    func: call.name.name.clone(),
                    argc,
                });
                dest
            }
        }
    }

    /// Evaluate arguments left to right, then push them in order
    fn generate_args(&mut self, call: &Call) -> usize {
        let values: Vec<String> = call.args.iter().map(|arg| self.generate_expr(arg)).collect();
        let argc = values.len();
        for value in values {
            self.emit(Instruction::Param(value));
        }
        argc
    }
}

impl Default for IRGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to lower a program with a fresh generator
pub fn generate(program: &Program) -> Vec<Instruction> {
    IRGenerator::new().generate(program)
}
