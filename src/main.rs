//! tacc Compiler
//!
//! Command-line driver for the tacc front end.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use tacc::feedback::CompilationReport;
use tacc::frontend::semantic::SemanticAnalyzer;
use tacc::{compile, parse, print_ir, tokenize, CompileError};

/// tacc Compiler
#[derive(Parser, Debug)]
#[command(name = "tacc")]
#[command(author = "Z1529")]
#[command(version = "0.1.0")]
#[command(about = "tacc - compiles a small block-structured language to three-address code")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file for the rendered IR
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Emit a structured JSON report instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a source file to IR
    Build {
        /// Input source file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check a source file for errors
    Check {
        /// Input source file
        input: PathBuf,
    },
    /// Print the token stream
    Tokens {
        /// Input source file
        input: PathBuf,
    },
    /// Print the syntax tree
    Ast {
        /// Input source file
        input: PathBuf,
    },
    /// Print the global symbol table and function signatures
    Symbols {
        /// Input source file
        input: PathBuf,
    },
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// Dispatch the command; `Ok(false)` means diagnostics were reported
fn run(cli: &Cli) -> Result<bool> {
    match &cli.command {
        Some(Commands::Build { input, output }) => build_file(input, output.as_deref(), cli.json),
        Some(Commands::Check { input }) => check_file(input, cli.json),
        Some(Commands::Tokens { input }) => dump_tokens(input),
        Some(Commands::Ast { input }) => dump_ast(input),
        Some(Commands::Symbols { input }) => dump_symbols(input),
        Some(Commands::Version) => {
            println!("tacc 0.1.0");
            println!("Three-address code compiler");
            println!("License: Apache-2.0");
            Ok(true)
        }
        None => match &cli.input {
            Some(input) => build_file(input, cli.output.as_deref(), cli.json),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: tacc <FILE> or tacc build <FILE>");
                Ok(false)
            }
        },
    }
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("could not read {}", input.display()))
}

/// Compile a source file and emit its IR
fn build_file(input: &Path, output: Option<&Path>, json: bool) -> Result<bool> {
    let source = read_source(input)?;
    let start = Instant::now();
    let result = compile(&source);

    if json {
        return print_report(input, &result, start);
    }

    let unit = match result {
        Ok(unit) => unit,
        Err(e) => return Ok(report_fatal(&e)),
    };
    if !unit.is_ok() {
        for error in &unit.errors {
            eprintln!("Semantic error: {}", error);
        }
        return Ok(false);
    }

    let ir_text = print_ir(&unit.instructions);
    match output {
        Some(path) => {
            fs::write(path, &ir_text)
                .with_context(|| format!("could not write {}", path.display()))?;
            println!("Wrote IR to {}", path.display());
        }
        None => print!("{}", ir_text),
    }
    Ok(true)
}

/// Check a source file for errors without generating output
fn check_file(input: &Path, json: bool) -> Result<bool> {
    let source = read_source(input)?;
    let start = Instant::now();
    let result = compile(&source);

    if json {
        return print_report(input, &result, start);
    }

    match result {
        Ok(unit) if unit.is_ok() => {
            println!("No errors found in {}", input.display());
            Ok(true)
        }
        Ok(unit) => {
            for error in &unit.errors {
                eprintln!("Semantic error: {}", error);
            }
            eprintln!("{} error(s) found", unit.errors.len());
            Ok(false)
        }
        Err(e) => Ok(report_fatal(&e)),
    }
}

fn dump_tokens(input: &Path) -> Result<bool> {
    let source = read_source(input)?;
    match tokenize(&source) {
        Ok(tokens) => {
            for token in &tokens {
                println!("{:>4}  {}", token.line(), token.kind);
            }
            Ok(true)
        }
        Err(e) => Ok(report_fatal(&e.into())),
    }
}

fn dump_ast(input: &Path) -> Result<bool> {
    let source = read_source(input)?;
    match compile(&source) {
        Ok(unit) => {
            println!("{:#?}", unit.program);
            Ok(true)
        }
        Err(e) => Ok(report_fatal(&e)),
    }
}

fn dump_symbols(input: &Path) -> Result<bool> {
    let source = read_source(input)?;
    let program = match tokenize(&source)
        .map_err(CompileError::from)
        .and_then(|tokens| parse(tokens).map_err(CompileError::from))
    {
        Ok(program) => program,
        Err(e) => return Ok(report_fatal(&e)),
    };

    let mut analyzer = SemanticAnalyzer::new();
    let errors = analyzer.analyze(&program);
    for error in &errors {
        eprintln!("Semantic error: {}", error);
    }

    println!("Globals:");
    for (name, ty) in analyzer.symbols.globals() {
        println!("    {:<16} {}", name, ty);
    }
    println!("Functions:");
    for (name, sig) in analyzer.signatures() {
        let params: Vec<String> = sig
            .params
            .iter()
            .map(|(param, ty)| format!("{} {}", ty, param))
            .collect();
        println!("    {} {}({})", sig.ret, name, params.join(", "));
    }
    Ok(errors.is_empty())
}

fn report_fatal(error: &CompileError) -> bool {
    eprintln!("{}", error);
    false
}

fn print_report(
    input: &Path,
    result: &std::result::Result<tacc::Compilation, CompileError>,
    start: Instant,
) -> Result<bool> {
    let elapsed = start.elapsed().as_millis() as u64;
    let report = CompilationReport::new(input.display().to_string(), result, elapsed);
    println!("{}", report.to_json());
    Ok(report.success)
}
