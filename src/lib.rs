//! Volt: a small dynamic scripting language.
//!
//! This crate exposes the lexer, parser, value model, evaluator and module
//! loader as a library so that a host binary (CLI, REPL, embedder) can drive
//! them without caring about the internals of any single stage.

pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod modules;
pub mod parser;
pub mod value;

pub use environment::{EnvRef, Environment};
pub use error::{Position, VoltError};
pub use interpreter::Interpreter;
pub use lexer::Lexer;
pub use parser::Parser;
pub use value::Value;

/// Lex, parse and evaluate `source` in a fresh global environment, returning
/// the interpreter used to run it (so callers can inspect globals or run
/// further statements in the same scope, as the REPL does).
pub fn run_source(name: &str, source: &str) -> Result<Interpreter, VoltError> {
    log::debug!("evaluating {} bytes from {name}", source.len());
    let tokens = Lexer::new(source).lex()?;
    let program = Parser::new(tokens).parse_program()?;
    let mut interpreter = Interpreter::new();
    interpreter.run(&program)?;
    Ok(interpreter)
}
