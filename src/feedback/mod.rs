//! Structured Feedback Module
//!
//! Machine-readable compilation reports:
//! - JSON diagnostics with stable error codes
//! - Compilation statistics
//! - The rendered IR on success

use serde::Serialize;

use crate::pipeline::Compilation;
use crate::utils::{CompileError, SemanticError, SemanticErrorKind};

// ==================== Diagnostics ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// One reported problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Error code (e.g., "E0001")
    pub code: String,
    pub severity: Severity,
    /// Human-readable message, including the line
    pub message: String,
    pub line: usize,
}

impl Diagnostic {
    pub fn from_compile_error(error: &CompileError) -> Self {
        let code = match error {
            CompileError::Lexical(_) => "E0001",
            CompileError::Syntax(_) => "E0002",
        };
        Self::error(code, error.to_string(), error.line())
    }

    pub fn from_semantic_error(error: &SemanticError) -> Self {
        let code = match error.kind() {
            SemanticErrorKind::DuplicateDeclaration => "E0101",
            SemanticErrorKind::UndeclaredVariable => "E0102",
            SemanticErrorKind::TypeMismatch => "E0103",
            SemanticErrorKind::ArityMismatch => "E0104",
            SemanticErrorKind::InvalidReturn => "E0105",
        };
        Self::error(code, error.to_string(), error.span().line)
    }

    fn error(code: &str, message: String, line: usize) -> Self {
        Self {
            code: code.to_string(),
            severity: Severity::Error,
            message,
            line,
        }
    }
}

// ==================== Compilation Report ====================

/// Complete report for one source file
#[derive(Debug, Clone, Serialize)]
pub struct CompilationReport {
    pub success: bool,
    pub source_file: String,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: CompilationStats,
    /// Rendered instructions, empty unless generation ran
    pub ir: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompilationStats {
    pub token_count: usize,
    pub global_count: usize,
    pub function_count: usize,
    pub instruction_count: usize,
    pub total_time_ms: u64,
}

impl CompilationReport {
    /// Build a report from a pipeline outcome
    pub fn new(
        source_file: impl Into<String>,
        result: &Result<Compilation, CompileError>,
        total_time_ms: u64,
    ) -> Self {
        let source_file = source_file.into();
        match result {
            Ok(unit) => {
                let stats = CompilationStats {
                    token_count: unit.tokens.len(),
                    global_count: unit.program.globals.len(),
                    function_count: unit.program.functions.len(),
                    instruction_count: unit.instructions.len(),
                    total_time_ms,
                };
                let diagnostics: Vec<_> =
                    unit.errors.iter().map(Diagnostic::from_semantic_error).collect();
                Self {
                    success: diagnostics.is_empty(),
                    source_file,
                    diagnostics,
                    stats,
                    ir: unit.instructions.iter().map(|i| i.to_string()).collect(),
                }
            }
            Err(error) => Self {
                success: false,
                source_file,
                diagnostics: vec![Diagnostic::from_compile_error(error)],
                stats: CompilationStats {
                    total_time_ms,
                    ..CompilationStats::default()
                },
                ir: vec![],
            },
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
