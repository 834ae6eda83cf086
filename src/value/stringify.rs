//! The canonical stringifier (§4.4): used by `show`, string interpolation,
//! and string-coercing `+`.

use std::cell::RefCell;
use std::rc::Rc;

use super::{InstanceValue, Value};

/// Stringifies without consulting a class's `toString` method; instances
/// fall back straight to `<Name instance>`. Used where there is no
/// evaluator at hand (e.g. diagnostics and `Debug`). `Interpreter::stringify`
/// is the fallible, `toString`-aware counterpart used by `show` and string
/// interpolation (§4.3, "method dispatch").
pub fn stringify(value: &Value) -> String {
    stringify_with(value, &|_| None)
}

pub fn stringify_with(
    value: &Value,
    instance_to_string: &dyn Fn(&Rc<RefCell<InstanceValue>>) -> Option<String>,
) -> String {
    match value {
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Str(s) => s.as_str().to_owned(),
        Value::List(list) => {
            let items: Vec<String> = list
                .borrow()
                .iter()
                .map(|v| stringify_with(v, instance_to_string))
                .collect();
            format!("[{}]", items.join(", "))
        }
        Value::Dict(dict) => {
            let items: Vec<String> = dict
                .borrow()
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}: {}",
                        stringify_with(&k.into_value(), instance_to_string),
                        stringify_with(v, instance_to_string)
                    )
                })
                .collect();
            format!("{{{}}}", items.join(", "))
        }
        Value::Function(f) => format!("<function {}>", f.name),
        Value::Native(f) => format!("<function {}>", f.name),
        Value::Class(c) => format!("<class {}>", c.name),
        Value::Instance(instance) => instance_to_string(instance)
            .unwrap_or_else(|| format!("<{} instance>", instance.borrow().class.name)),
        Value::Module(m) => format!("<module {}>", m.name),
    }
}

/// A floating value equal to its own truncation prints without a decimal
/// point (§4.4).
fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}
