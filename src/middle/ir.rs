//! tacc IR definitions
//!
//! Linear three-address code. Control flow is expressed with labels and
//! jumps; there are no basic blocks.

use std::fmt;
use serde::Serialize;

/// One three-address instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Instruction {
    /// dest = expr (expr is a value or `a op b`)
    Assign { dest: String, expr: String },
    /// label:
    Label(String),
    /// GOTO label
    Goto(String),
    /// IF NOT cond GOTO label
    IfFalseGoto { cond: String, label: String },
    /// Function entry
    Function { name: String, params: Vec<String> },
    /// Push one call argument
    Param(String),
    /// Call with the previous `argc` params; `dest` receives the result
    Call {
        dest: Option<String>,
        func: String,
        argc: usize,
    },
    /// return [value]
    Return(Option<String>),
}

impl Instruction {
    pub fn is_label(&self) -> bool {
        matches!(self, Instruction::Label(_) | Instruction::Function { .. })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Assign { dest, expr } => write!(f, "{} = {}", dest, expr),
            Instruction::Label(name) => write!(f, "{}:", name),
            Instruction::Goto(label) => write!(f, "GOTO {}", label),
            Instruction::IfFalseGoto { cond, label } => write!(f, "IF NOT {} GOTO {}", cond, label),
            Instruction::Function { name, params } => {
                write!(f, "func {}({}):", name, params.join(", "))
            }
            Instruction::Param(value) => write!(f, "param {}", value),
            Instruction::Call { dest: Some(dest), func, argc } => {
                write!(f, "{} = call {}, {}", dest, func, argc)
            }
            Instruction::Call { dest: None, func, argc } => write!(f, "call {}, {}", func, argc),
            Instruction::Return(Some(value)) => write!(f, "return {}", value),
            Instruction::Return(None) => write!(f, "return"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendering() {
        let cases = [
            (Instruction::Assign { dest: "_t1".into(), expr: "x + 1".into() }, "_t1 = x + 1"),
            (Instruction::Label("_L2_else".into()), "_L2_else:"),
            (Instruction::Goto("_L3_endif".into()), "GOTO _L3_endif"),
            (
                Instruction::IfFalseGoto { cond: "x".into(), label: "_L2_else".into() },
                "IF NOT x GOTO _L2_else",
            ),
            (
                Instruction::Function { name: "add".into(), params: vec!["a".into(), "b".into()] },
                "func add(a, b):",
            ),
            (Instruction::Param("a".into()), "param a"),
            (
                Instruction::Call { dest: Some("_t4".into()), func: "add".into(), argc: 2 },
                "_t4 = call add, 2",
            ),
            (Instruction::Call { dest: None, func: "log".into(), argc: 0 }, "call log, 0"),
            (Instruction::Return(None), "return"),
        ];
        for (inst, text) in cases {
            assert_eq!(inst.to_string(), text);
        }
    }
}
