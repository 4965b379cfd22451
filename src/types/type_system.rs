//! Type System for tacc
//!
//! The language is scalar-only: every variable, parameter and operand is `int`.

use std::fmt;
use serde::Serialize;

/// Scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    Int,
    Void,
    /// Type of a decimal literal; no declaration can name it
    Float,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Void => write!(f, "void"),
            Type::Float => write!(f, "float"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Type::Int.to_string(), "int");
        assert_eq!(Type::Void.to_string(), "void");
        assert_eq!(Type::Float.to_string(), "float");
    }
}
