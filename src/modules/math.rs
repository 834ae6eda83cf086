use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::{ModuleValue, Value};

use super::{arg, expect_number, native};

pub fn module() -> Value {
    let mut exports = IndexMap::new();
    exports.insert("pi".to_owned(), Value::Float(std::f64::consts::PI));
    exports.insert("e".to_owned(), Value::Float(std::f64::consts::E));

    let mut natives = IndexMap::new();
    natives.insert(
        "sqrt".to_owned(),
        native(|_, args, pos| Ok(Value::Float(expect_number(&arg(args, 0, "math", "sqrt", pos)?, "math", "sqrt", pos)?.sqrt()))),
    );
    natives.insert(
        "abs".to_owned(),
        native(|_, args, pos| Ok(Value::Float(expect_number(&arg(args, 0, "math", "abs", pos)?, "math", "abs", pos)?.abs()))),
    );
    natives.insert(
        "floor".to_owned(),
        native(|_, args, pos| Ok(Value::Float(expect_number(&arg(args, 0, "math", "floor", pos)?, "math", "floor", pos)?.floor()))),
    );
    natives.insert(
        "ceil".to_owned(),
        native(|_, args, pos| Ok(Value::Float(expect_number(&arg(args, 0, "math", "ceil", pos)?, "math", "ceil", pos)?.ceil()))),
    );
    natives.insert(
        "round".to_owned(),
        native(|_, args, pos| Ok(Value::Float(expect_number(&arg(args, 0, "math", "round", pos)?, "math", "round", pos)?.round()))),
    );
    natives.insert(
        "pow".to_owned(),
        native(|_, args, pos| {
            let base = expect_number(&arg(args, 0, "math", "pow", pos)?, "math", "pow", pos)?;
            let exponent = expect_number(&arg(args, 1, "math", "pow", pos)?, "math", "pow", pos)?;
            Ok(Value::Float(base.powf(exponent)))
        }),
    );
    natives.insert(
        "min".to_owned(),
        native(|_, args, pos| {
            let a = expect_number(&arg(args, 0, "math", "min", pos)?, "math", "min", pos)?;
            let b = expect_number(&arg(args, 1, "math", "min", pos)?, "math", "min", pos)?;
            Ok(Value::Float(a.min(b)))
        }),
    );
    natives.insert(
        "max".to_owned(),
        native(|_, args, pos| {
            let a = expect_number(&arg(args, 0, "math", "max", pos)?, "math", "max", pos)?;
            let b = expect_number(&arg(args, 1, "math", "max", pos)?, "math", "max", pos)?;
            Ok(Value::Float(a.max(b)))
        }),
    );

    Value::Module(Rc::new(ModuleValue {
        name: "math".to_owned(),
        exports,
        natives,
    }))
}
