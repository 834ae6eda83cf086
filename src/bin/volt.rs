//! The `volt` executable (§6, §12): runs a source file, or drops into a
//! REPL with no arguments. Grounded on the teacher's `src/bin/why.rs`
//! `clap::Parser` derive struct and its `error!("{err} ({line}:{col})")`
//! diagnostic pattern.

use std::io::{self, Write};

use clap::Parser as ClapParser;
use log::{debug, error};

use volt::{Lexer, Parser, VoltError};

#[derive(ClapParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Volt source file to run. Omit to start a REPL.
    file: Option<std::path::PathBuf>,

    /// Raise logging verbosity (repeatable: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    simple_logger::init_with_level(verbosity_to_level(cli.verbose)).unwrap();

    let status = match cli.file {
        Some(path) => run_file(&path),
        None => run_repl(),
    };

    std::process::exit(status);
}

fn verbosity_to_level(count: u8) -> log::Level {
    match count {
        0 => log::Level::Warn,
        1 => log::Level::Info,
        2 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

fn run_file(path: &std::path::Path) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            report(&format!("could not read '{}': {err}", path.display()));
            return 1;
        }
    };

    debug!("evaluating {} bytes from {}", source.len(), path.display());
    match volt::run_source(&path.display().to_string(), &source) {
        Ok(_) => 0,
        Err(err) => {
            report_volt_error(&err);
            1
        }
    }
}

fn run_repl() -> i32 {
    println!("volt {} -- type 'help' for commands, 'exit' to quit", env!("CARGO_PKG_VERSION"));
    let mut interpreter = volt::Interpreter::new();
    let mut line_no = 0usize;

    loop {
        print!("volt> ");
        if io::stdout().flush().is_err() {
            return 1;
        }

        let Some(source) = read_statement() else {
            println!();
            return 0;
        };

        let trimmed = source.trim();
        match trimmed {
            "" => continue,
            "exit" | "quit" => return 0,
            "help" => {
                println!("commands: exit, quit, help. anything else is evaluated as Volt source.");
                continue;
            }
            _ => {}
        }

        line_no += 1;
        debug!("evaluating {} bytes from <repl:{line_no}>", source.len());
        if let Err(err) = eval_in_repl(&mut interpreter, &source) {
            report_volt_error(&err);
        }
    }
}

fn eval_in_repl(interpreter: &mut volt::Interpreter, source: &str) -> Result<(), VoltError> {
    let tokens = Lexer::new(source).lex()?;
    let program = Parser::new(tokens).parse_program()?;
    interpreter.run(&program)?;
    Ok(())
}

/// Reads one logical REPL statement: the first line, plus continuation
/// lines while `{` outnumbers `}` (§6).
fn read_statement() -> Option<String> {
    let mut buffer = String::new();
    io::stdin().read_line(&mut buffer).ok()?;
    if buffer.is_empty() {
        return None;
    }

    while brace_balance(&buffer) > 0 {
        print!("...   ");
        if io::stdout().flush().is_err() {
            break;
        }
        let mut next = String::new();
        if io::stdin().read_line(&mut next).is_err() || next.is_empty() {
            break;
        }
        buffer.push_str(&next);
    }

    Some(buffer)
}

fn brace_balance(source: &str) -> i64 {
    source.chars().fold(0i64, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

fn report_volt_error(err: &VoltError) {
    report(&err.to_string());
}

fn report(message: &str) {
    error!("⚡ {message}");
}
