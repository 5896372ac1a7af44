pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

use std::path::Path;

use log::info;

use analyzer::TypeChecker;
use codegen::{NameContext, Statement, TacGenerator};
use error::CompileError;
use lexer::Lexer;
use parser::Parser;

/// Runs every stage over `source` and returns the generated TAC.
/// `filename` only appears in diagnostics.
pub fn compile(filename: &str, source: &str) -> Result<Vec<Statement>, CompileError> {
    run(Lexer::new(filename, source))
}

pub fn compile_file(path: impl AsRef<Path>) -> Result<Vec<Statement>, CompileError> {
    run(Lexer::open(path)?)
}

fn run(lexer: Lexer) -> Result<Vec<Statement>, CompileError> {
    let filename = lexer.filename().to_string();

    let mut program = Parser::new(lexer)?.parse()?;
    TypeChecker::check(&mut program)?;

    let mut names = NameContext::new();
    let statements = TacGenerator::generate(program, &mut names)?;

    info!("compiled '{}' into {} statements", filename, statements.len());
    Ok(statements)
}
