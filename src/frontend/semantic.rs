//! Semantic Analysis for tacc
//!
//! Performs:
//! - Symbol table management (scope stack)
//! - Function signature registration before any body is checked
//! - Type checking of expressions, assignments, calls and returns
//!
//! Errors are accumulated; analysis never stops at the first one.

use std::collections::HashMap;

use crate::frontend::ast::*;
use crate::frontend::token::Number;
use crate::types::Type;
use crate::utils::{SemanticError, Span};

// ==================== Symbol Table ====================

/// Stack of scopes, innermost last
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Type>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        // Global scope
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// Enter a new scope
    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
        log::trace!("enter scope (depth {})", self.scopes.len());
    }

    /// Exit the current scope; the global scope is never popped
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
        log::trace!("exit scope (depth {})", self.scopes.len());
    }

    /// Declare a name in the current scope. Returns false if the name is
    /// already declared in this same scope.
    pub fn declare(&mut self, name: &str, ty: Type) -> bool {
        match self.scopes.last_mut() {
            Some(scope) if !scope.contains_key(name) => {
                scope.insert(name.to_string(), ty);
                true
            }
            _ => false,
        }
    }

    /// Look up a name, searching from the current scope outward
    pub fn lookup(&self, name: &str) -> Option<Type> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// Names in the global scope, sorted by name
    pub fn globals(&self) -> Vec<(String, Type)> {
        let mut globals: Vec<(String, Type)> = self.scopes[0]
            .iter()
            .map(|(name, ty)| (name.clone(), *ty))
            .collect();
        globals.sort_by(|a, b| a.0.cmp(&b.0));
        globals
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== Function Table ====================

/// Declared signature of a function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSig {
    pub params: Vec<(String, Type)>,
    pub ret: Type,
}

// ==================== Semantic Analyzer ====================

/// Semantic analyzer
pub struct SemanticAnalyzer {
    pub symbols: SymbolTable,
    pub functions: HashMap<String, FunctionSig>,
    pub errors: Vec<SemanticError>,
    /// Name and return type of the function whose body is being checked
    current_function: Option<(String, Type)>,
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            symbols: SymbolTable::new(),
            functions: HashMap::new(),
            errors: Vec::new(),
            current_function: None,
        }
    }

    fn error(&mut self, error: SemanticError) {
        log::trace!("semantic error: {}", error);
        self.errors.push(error);
    }

    /// Analyze a program and return every error found. State from a
    /// previous run is discarded first.
    pub fn analyze(&mut self, program: &Program) -> Vec<SemanticError> {
        self.symbols = SymbolTable::new();
        self.functions.clear();
        self.errors.clear();
        self.current_function = None;

        // Pass 1: register every signature so forward calls and recursion resolve
        for func in &program.functions {
            self.collect_function(func);
        }

        // Pass 2: top-level statements in the global scope
        for stmt in &program.globals {
            self.check_stmt(stmt);
        }

        // Pass 3: function bodies
        for func in &program.functions {
            self.check_function(func);
        }

        log::debug!("semantic analysis finished with {} error(s)", self.errors.len());
        self.errors.clone()
    }

    /// Registered function signatures, sorted by name
    pub fn signatures(&self) -> Vec<(&str, &FunctionSig)> {
        let mut sigs: Vec<_> = self
            .functions
            .iter()
            .map(|(name, sig)| (name.as_str(), sig))
            .collect();
        sigs.sort_by(|a, b| a.0.cmp(b.0));
        sigs
    }

    fn collect_function(&mut self, func: &FunctionDecl) {
        if self.functions.contains_key(&func.name.name) {
            self.error(SemanticError::DuplicateDeclaration {
                name: func.name.name.clone(),
                span: func.name.span,
            });
            return;
        }

        let params = func
            .params
            .iter()
            .map(|p| (p.name.name.clone(), p.ty))
            .collect();
        self.functions.insert(
            func.name.name.clone(),
            FunctionSig {
                params,
                ret: func.ret_type,
            },
        );
    }

    fn check_function(&mut self, func: &FunctionDecl) {
        self.symbols.enter_scope();
        let previous = self
            .current_function
            .replace((func.name.name.clone(), func.ret_type));

        for param in &func.params {
            self.declare(&param.name, param.ty);
        }

        // Parameters and body share one scope
        for stmt in &func.body.stmts {
            self.check_stmt(stmt);
        }

        self.current_function = previous;
        self.symbols.exit_scope();
    }

    fn declare(&mut self, name: &Ident, ty: Type) {
        if !self.symbols.declare(&name.name, ty) {
            self.error(SemanticError::DuplicateDeclaration {
                name: name.name.clone(),
                span: name.span,
            });
        }
    }

    /// Check a block in a fresh scope
    fn check_block(&mut self, block: &Block) {
        self.symbols.enter_scope();
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
        self.symbols.exit_scope();
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::VarDecl { ty, name, .. } => self.declare(name, *ty),

            Stmt::Assign { name, value, span } => {
                let var_ty = self.lookup_var(name);
                let value_ty = self.check_expr(value);
                if let (Some(expected), Some(found)) = (var_ty, value_ty) {
                    if expected != found {
                        self.error(SemanticError::TypeMismatch {
                            context: format!("assignment to '{}'", name.name),
                            expected,
                            found,
                            span: *span,
                        });
                    }
                }
            }

            Stmt::If { cond, then_block, else_block, .. } => {
                self.check_condition(cond, "'if' condition");
                self.check_block(then_block);
                if let Some(block) = else_block {
                    self.check_block(block);
                }
            }

            Stmt::While { cond, body, .. } => {
                self.check_condition(cond, "'while' condition");
                self.check_block(body);
            }

            Stmt::Block(block) => self.check_block(block),

            Stmt::Call(call) => {
                self.check_call(call);
            }

            Stmt::Return { value, span } => self.check_return(value.as_ref(), *span),
        }
    }

    fn check_condition(&mut self, cond: &Expr, context: &str) {
        if let Some(found) = self.check_expr(cond) {
            if found != Type::Int {
                self.error(SemanticError::TypeMismatch {
                    context: context.to_string(),
                    expected: Type::Int,
                    found,
                    span: cond.span(),
                });
            }
        }
    }

    fn check_return(&mut self, value: Option<&Expr>, span: Span) {
        let value_ty = value.and_then(|expr| self.check_expr(expr));

        let Some((function, ret)) = self.current_function.clone() else {
            self.error(SemanticError::ReturnOutsideFunction { span });
            return;
        };

        match (ret, value) {
            (Type::Void, Some(_)) => {
                self.error(SemanticError::VoidReturnValue { function, span });
            }
            (Type::Void, None) => {}
            (expected, None) => {
                self.error(SemanticError::MissingReturnValue { function, expected, span });
            }
            (expected, Some(expr)) => {
                if let Some(found) = value_ty {
                    if found != expected {
                        self.error(SemanticError::TypeMismatch {
                            context: format!("return value of '{}'", function),
                            expected,
                            found,
                            span: expr.span(),
                        });
                    }
                }
            }
        }
    }

    fn lookup_var(&mut self, name: &Ident) -> Option<Type> {
        let ty = self.symbols.lookup(&name.name);
        if ty.is_none() {
            self.error(SemanticError::UndeclaredVariable {
                name: name.name.clone(),
                span: name.span,
            });
        }
        ty
    }

    /// Type of an expression. `None` means an error has already been
    /// reported for it, so callers stay quiet.
    fn check_expr(&mut self, expr: &Expr) -> Option<Type> {
        match expr {
            Expr::Number(Number::Int(_), _) => Some(Type::Int),
            Expr::Number(Number::Float(_), _) => Some(Type::Float),

            Expr::Ident(ident) => self.lookup_var(ident),

            Expr::Binary { left, op, right, .. } => {
                let left_ty = self.check_expr(left);
                let right_ty = self.check_expr(right);
                let (left_ty, right_ty) = (left_ty?, right_ty?);

                for (ty, operand) in [(left_ty, left), (right_ty, right)] {
                    if ty != Type::Int {
                        self.error(SemanticError::TypeMismatch {
                            context: format!("operand of '{}'", op),
                            expected: Type::Int,
                            found: ty,
                            span: operand.span(),
                        });
                        return None;
                    }
                }

                // Arithmetic and comparisons both produce int
                Some(Type::Int)
            }

            Expr::Call(call) => self.check_call(call),
        }
    }

    fn check_call(&mut self, call: &Call) -> Option<Type> {
        let Some(sig) = self.functions.get(&call.name.name).cloned() else {
            self.error(SemanticError::UndeclaredFunction {
                name: call.name.name.clone(),
                span: call.name.span,
            });
            return None;
        };

        if call.args.len() != sig.params.len() {
            self.error(SemanticError::ArityMismatch {
                name: call.name.name.clone(),
                expected: sig.params.len(),
                found: call.args.len(),
                span: call.span,
            });
        }

        for (i, arg) in call.args.iter().enumerate() {
            let arg_ty = self.check_expr(arg);
            let param = sig.params.get(i);
            if let (Some(found), Some((_, expected))) = (arg_ty, param) {
                if found != *expected {
                    self.error(SemanticError::TypeMismatch {
                        context: format!("argument {} of '{}'", i + 1, call.name.name),
                        expected: *expected,
                        found,
                        span: arg.span(),
                    });
                }
            }
        }

        Some(sig.ret)
    }
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::Parser;
    use crate::utils::SemanticErrorKind;
    use pretty_assertions::assert_eq;

    fn program(source: &str) -> Program {
        let tokens = Lexer::new(source).tokenize().unwrap();
        Parser::new(tokens).parse_program().unwrap()
    }

    fn analyze(source: &str) -> Vec<SemanticError> {
        SemanticAnalyzer::new().analyze(&program(source))
    }

    fn kinds(source: &str) -> Vec<SemanticErrorKind> {
        analyze(source).iter().map(|e| e.kind()).collect()
    }

    #[test]
    fn test_symbol_table_shadowing() {
        let mut table = SymbolTable::new();
        assert!(table.declare("x", Type::Int));
        assert!(!table.declare("x", Type::Int));
        table.enter_scope();
        assert!(table.declare("x", Type::Float));
        assert_eq!(table.lookup("x"), Some(Type::Float));
        table.exit_scope();
        assert_eq!(table.lookup("x"), Some(Type::Int));
        table.exit_scope();
        assert_eq!(table.lookup("x"), Some(Type::Int));
        assert_eq!(table.globals(), vec![("x".to_string(), Type::Int)]);
    }

    #[test]
    fn test_valid_program() {
        let errors = analyze(
            "int x;\n\
             x = 3 + 2;\n\
             if x : BEGIN x = x * 2; END else : BEGIN x = x - 1; END",
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn test_duplicate_in_same_scope() {
        assert_eq!(kinds("int x; int x;"), vec![SemanticErrorKind::DuplicateDeclaration]);
    }

    #[test]
    fn test_nested_scope_shadows_without_error() {
        let errors = analyze(
            "int x;\n\
             if x : BEGIN int x; x = 1; END\n\
             while x : BEGIN int x; BEGIN int x; END END",
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn test_branch_locals_are_invisible_outside() {
        let errors = analyze(
            "int x;\n\
             if x : BEGIN int y; y = 1; END\n\
             y = 2;",
        );
        assert_eq!(
            errors,
            vec![SemanticError::UndeclaredVariable {
                name: "y".to_string(),
                span: Span::new(38, 39, 3),
            }]
        );
    }

    #[test]
    fn test_undeclared_variable() {
        let errors = analyze("x = 1;\nz = x + y;");
        let names: Vec<String> = errors
            .iter()
            .map(|e| match e {
                SemanticError::UndeclaredVariable { name, .. } => name.clone(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(names, vec!["x", "z", "x", "y"]);
    }

    #[test]
    fn test_decimal_literal_is_a_type_mismatch() {
        let errors = analyze("int x; x = 2.5;\nx = x + 1.5;");
        assert_eq!(
            errors.iter().map(|e| e.kind()).collect::<Vec<_>>(),
            vec![SemanticErrorKind::TypeMismatch, SemanticErrorKind::TypeMismatch]
        );
        assert!(matches!(
            &errors[1],
            SemanticError::TypeMismatch { found: Type::Float, .. }
        ));
    }

    #[test]
    fn test_undeclared_function_reports_once() {
        // `x` is undeclared too, but the call's arguments are not inspected
        assert_eq!(kinds("foo(x);"), vec![SemanticErrorKind::UndeclaredVariable]);
        assert_eq!(kinds("int x; foo(x);"), vec![SemanticErrorKind::UndeclaredVariable]);
        assert!(matches!(
            &analyze("foo(x);")[0],
            SemanticError::UndeclaredFunction { name, .. } if name == "foo"
        ));
    }

    #[test]
    fn test_forward_call_and_recursion() {
        let errors = analyze(
            "int r;\n\
             r = fact(5);\n\
             int fact(int n) : BEGIN\n\
               if n < 2 : BEGIN return 1; END\n\
               return n * fact(n - 1);\n\
             END",
        );
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn test_arity_and_argument_types_are_independent() {
        let source = "void f(int a, int b) : BEGIN END\n\
                      f(1);\n\
                      f(1, 2.5);\n\
                      f(1.5, 2, 3);";
        assert_eq!(
            kinds(source),
            vec![
                SemanticErrorKind::ArityMismatch,
                SemanticErrorKind::TypeMismatch,
                SemanticErrorKind::ArityMismatch,
                SemanticErrorKind::TypeMismatch,
            ]
        );
    }

    #[test]
    fn test_void_call_result_cannot_be_used() {
        let errors = analyze("int x; void f() : BEGIN END\nx = f();");
        assert!(matches!(
            &errors[..],
            [SemanticError::TypeMismatch { expected: Type::Int, found: Type::Void, .. }]
        ));
    }

    #[test]
    fn test_void_function_returning_value() {
        let errors = analyze("void f() : BEGIN return 5; END");
        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], SemanticError::VoidReturnValue { function, .. } if function == "f"));
        assert_eq!(errors[0].kind(), SemanticErrorKind::InvalidReturn);
    }

    #[test]
    fn test_int_function_missing_value() {
        let errors = analyze("int f() : BEGIN return; END");
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            SemanticError::MissingReturnValue { expected: Type::Int, .. }
        ));
    }

    #[test]
    fn test_return_outside_function() {
        assert_eq!(kinds("return 1;"), vec![SemanticErrorKind::InvalidReturn]);
        assert_eq!(kinds("return;"), vec![SemanticErrorKind::InvalidReturn]);
    }

    #[test]
    fn test_duplicate_params_and_functions() {
        let errors = analyze(
            "int f(int a, int a) : BEGIN return a; END\n\
             int g(int a) : BEGIN int a; return a; END\n\
             void f() : BEGIN END",
        );
        let names: Vec<&str> = errors
            .iter()
            .map(|e| match e {
                SemanticError::DuplicateDeclaration { name, .. } => name.as_str(),
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        // Signature registration runs before any body
        assert_eq!(names, vec!["f", "a", "a"]);
    }

    #[test]
    fn test_functions_see_globals() {
        let errors = analyze("int total;\nvoid bump(int n) : BEGIN total = total + n; END\nbump(2);");
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let program = program(
            "int x; int x;\n\
             if y : BEGIN int z; END\n\
             z = 1;\n\
             void f() : BEGIN return 1; END",
        );
        let mut analyzer = SemanticAnalyzer::new();
        let first = analyzer.analyze(&program);
        let second = analyzer.analyze(&program);
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        assert_eq!(first, SemanticAnalyzer::new().analyze(&program));
    }

    #[test]
    fn test_global_scope_snapshot() {
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.analyze(&program("int b; int a; if a : BEGIN int c; END"));
        assert_eq!(
            analyzer.symbols.globals(),
            vec![("a".to_string(), Type::Int), ("b".to_string(), Type::Int)]
        );
    }

    #[test]
    fn test_signatures_sorted_by_name() {
        let mut analyzer = SemanticAnalyzer::new();
        analyzer.analyze(&program(
            "void log(int v) : BEGIN END\n\
             int add(int a, int b) : BEGIN return a + b; END",
        ));
        let names: Vec<_> = analyzer.signatures().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["add", "log"]);
        assert_eq!(
            analyzer.signatures()[0].1,
            &FunctionSig {
                params: vec![("a".to_string(), Type::Int), ("b".to_string(), Type::Int)],
                ret: Type::Int,
            }
        );
    }
}
