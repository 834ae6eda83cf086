//! Module registry (§4.5): one `resolve` entry point shared by built-in
//! native modules and user `.volt` files, matching the teacher's loader
//! "native vs. file" split.

mod file;
mod math;
mod random;
mod time;

use std::path::Path;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::environment::Environment;
use crate::error::{Position, RuntimeError};
use crate::interpreter::Interpreter;
use crate::value::{ModuleValue, NativeFn, Value};

/// Resolves `use path` (§4.5) to a `(default binding name, module value)`
/// pair. The default name is what the module is bound under when no alias
/// is given; for user files this is always the file's base name, even if
/// `path` itself differs (an explicitly preserved Open Question).
pub fn resolve(interp: &mut Interpreter, path: &str, position: Position) -> Result<(String, Value), RuntimeError> {
    match path {
        "math" => Ok(("math".to_owned(), math::module())),
        "random" => Ok(("random".to_owned(), random::module())),
        "time" => Ok(("time".to_owned(), time::module())),
        "file" => Ok(("file".to_owned(), file::module())),
        _ => load_user_module(interp, path, position),
    }
}

fn load_user_module(interp: &mut Interpreter, path: &str, position: Position) -> Result<(String, Value), RuntimeError> {
    let file_path = if path.ends_with(".volt") {
        Path::new(path).to_path_buf()
    } else {
        Path::new(path).with_extension("volt")
    };

    let source = std::fs::read_to_string(&file_path)
        .map_err(|_| RuntimeError::new(format!("module not found: '{}'", file_path.display()), position))?;

    let base_name = file_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_owned)
        .unwrap_or_else(|| path.to_owned());

    let tokens = crate::lexer::Lexer::new(&source)
        .lex()
        .map_err(|err| RuntimeError::new(format!("in module '{base_name}': {err}"), position))?;
    let program = crate::parser::Parser::new(tokens)
        .parse_program()
        .map_err(|err| RuntimeError::new(format!("in module '{base_name}': {err}"), position))?;

    let module_env = Environment::child(&interp.globals);
    interp
        .run_in_env(&program.statements, &module_env)
        .map_err(|err| RuntimeError::new(format!("in module '{base_name}': {err}"), position))?;

    let mut exports = IndexMap::new();
    for (name, value) in module_env.own_bindings() {
        exports.insert(name, value);
    }

    let module = Value::Module(Rc::new(ModuleValue {
        name: base_name.clone(),
        exports,
        natives: IndexMap::new(),
    }));
    Ok((base_name, module))
}

pub(crate) fn native(f: impl Fn(&mut Interpreter, &[Value], Position) -> Result<Value, RuntimeError> + 'static) -> NativeFn {
    Rc::new(f)
}

pub(crate) fn expect_number(value: &Value, module: &str, func: &str, position: Position) -> Result<f64, RuntimeError> {
    match value {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeError::new(
            format!("{module}.{func} expects a number, found {}", other.type_name()),
            position,
        )),
    }
}

pub(crate) fn expect_string<'a>(value: &'a Value, module: &str, func: &str, position: Position) -> Result<&'a str, RuntimeError> {
    match value {
        Value::Str(s) => Ok(s.as_str()),
        other => Err(RuntimeError::new(
            format!("{module}.{func} expects a string, found {}", other.type_name()),
            position,
        )),
    }
}

pub(crate) fn arg(args: &[Value], index: usize, module: &str, func: &str, position: Position) -> Result<Value, RuntimeError> {
    args.get(index)
        .cloned()
        .ok_or_else(|| RuntimeError::new(format!("{module}.{func} is missing a required argument"), position))
}
