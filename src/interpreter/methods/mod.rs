//! Built-in method tables for primitive types (§4.4): string, list, dict,
//! number. Each submodule exposes a `call` dispatcher matched on method
//! name, mirroring the "small static table per primitive type" design note
//! in §9 rather than runtime reflection.

pub mod dict;
pub mod list;
pub mod number;
pub mod string;

use crate::error::{Position, RuntimeError};
use crate::value::Value;

pub(super) fn no_such_method(type_name: &str, name: &str, position: Position) -> RuntimeError {
    RuntimeError::new(format!("{type_name} has no method '{name}'"), position)
}

pub(super) fn arity_error(name: &str, expected: &str, got: usize, position: Position) -> RuntimeError {
    RuntimeError::new(format!("'{name}' expects {expected}, got {got} argument(s)"), position)
}

pub(super) fn expect_arg(args: &[Value], index: usize, name: &str, position: Position) -> Result<Value, RuntimeError> {
    args.get(index)
        .cloned()
        .ok_or_else(|| RuntimeError::new(format!("'{name}' is missing a required argument"), position))
}

pub(super) fn expect_int(value: &Value, name: &str, position: Position) -> Result<i64, RuntimeError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) => Ok(*f as i64),
        other => Err(RuntimeError::new(format!("'{name}' expects a number, found {}", other.type_name()), position)),
    }
}

pub(super) fn expect_str(value: &Value, name: &str, position: Position) -> Result<std::rc::Rc<String>, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s.clone()),
        other => Err(RuntimeError::new(format!("'{name}' expects a string, found {}", other.type_name()), position)),
    }
}
