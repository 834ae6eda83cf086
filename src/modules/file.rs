//! The `file` built-in module (§13). Per §5, no `std::fs::File` handle is
//! ever returned to user code: each native opens, does its work, and closes
//! within the call.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::value::{ModuleValue, Value};

use super::{arg, expect_string, native};

pub fn module() -> Value {
    let mut natives = IndexMap::new();

    natives.insert(
        "read".to_owned(),
        native(|_, args, pos| {
            let path = arg(args, 0, "file", "read", pos)?;
            let path = expect_string(&path, "file", "read", pos)?;
            std::fs::read_to_string(path)
                .map(Value::str)
                .map_err(|err| RuntimeError::new(format!("file.read '{path}': {err}"), pos))
        }),
    );

    natives.insert(
        "write".to_owned(),
        native(|_, args, pos| {
            let path = arg(args, 0, "file", "write", pos)?;
            let path = expect_string(&path, "file", "write", pos)?.to_owned();
            let contents = arg(args, 1, "file", "write", pos)?;
            let contents = expect_string(&contents, "file", "write", pos)?;
            std::fs::write(&path, contents)
                .map(|_| Value::Null)
                .map_err(|err| RuntimeError::new(format!("file.write '{path}': {err}"), pos))
        }),
    );

    natives.insert(
        "exists".to_owned(),
        native(|_, args, pos| {
            let path = arg(args, 0, "file", "exists", pos)?;
            let path = expect_string(&path, "file", "exists", pos)?;
            Ok(Value::Bool(std::path::Path::new(path).exists()))
        }),
    );

    natives.insert(
        "append".to_owned(),
        native(|_, args, pos| {
            use std::io::Write;
            let path = arg(args, 0, "file", "append", pos)?;
            let path = expect_string(&path, "file", "append", pos)?.to_owned();
            let contents = arg(args, 1, "file", "append", pos)?;
            let contents = expect_string(&contents, "file", "append", pos)?.to_owned();
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| RuntimeError::new(format!("file.append '{path}': {err}"), pos))?;
            file.write_all(contents.as_bytes())
                .map_err(|err| RuntimeError::new(format!("file.append '{path}': {err}"), pos))?;
            Ok(Value::Null)
        }),
    );

    Value::Module(Rc::new(ModuleValue {
        name: "file".to_owned(),
        exports: IndexMap::new(),
        natives,
    }))
}
