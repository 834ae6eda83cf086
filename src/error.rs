//! Error types shared by every stage of the pipeline.
//!
//! Mirrors the teacher crate's hand-rolled `LexError`/`FileLoadError` style
//! (manual `Display` + `std::error::Error` impls) rather than reaching for a
//! derive-macro error crate.

use std::error::Error;
use std::fmt::{self, Display};

use crate::value::Value;

/// Line and column, both 1-indexed.
pub type Position = (usize, usize);

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub message: String,
    pub position: Position,
}

impl Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{})",
            self.message, self.position.0, self.position.1
        )
    }
}

impl Error for LexError {}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{})",
            self.message, self.position.0, self.position.1
        )
    }
}

impl Error for ParseError {}

/// A runtime failure.
///
/// `thrown` distinguishes the two ways an error reaches `try/catch` (§7):
/// a user `throw value` carries the raw value, while a failure the
/// evaluator detects itself (undefined name, division by zero, ...) carries
/// `None` and is presented to `catch` as `message`.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub message: String,
    pub position: Position,
    pub thrown: Option<Value>,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
            thrown: None,
        }
    }

    pub fn thrown(value: Value, position: Position) -> Self {
        Self {
            message: String::new(),
            position,
            thrown: Some(value),
        }
    }

    /// The value a `catch` clause should see.
    pub fn catch_value(&self) -> Value {
        self.thrown.clone().unwrap_or_else(|| Value::str(self.message.clone()))
    }
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}:{})",
            self.message, self.position.0, self.position.1
        )
    }
}

impl Error for RuntimeError {}

#[derive(Debug, Clone)]
pub enum VoltError {
    Lex(LexError),
    Parse(ParseError),
    Runtime(RuntimeError),
}

impl Display for VoltError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoltError::Lex(err) => write!(f, "{err}"),
            VoltError::Parse(err) => write!(f, "{err}"),
            VoltError::Runtime(err) => write!(f, "{err}"),
        }
    }
}

impl Error for VoltError {}

impl From<LexError> for VoltError {
    fn from(err: LexError) -> Self {
        VoltError::Lex(err)
    }
}

impl From<ParseError> for VoltError {
    fn from(err: ParseError) -> Self {
        VoltError::Parse(err)
    }
}

impl From<RuntimeError> for VoltError {
    fn from(err: RuntimeError) -> Self {
        VoltError::Runtime(err)
    }
}
