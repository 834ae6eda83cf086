use indexmap::IndexMap;

use crate::environment::EnvRef;
use crate::error::{Position, RuntimeError};
use crate::interpreter::{EvalResult, Interpreter};
use crate::value::{DictKey, Value};

use super::{expect_arg, no_such_method};

pub fn call(
    interp: &mut Interpreter,
    receiver: &Value,
    name: &str,
    args: &[Value],
    caller_env: &EnvRef,
    position: Position,
) -> EvalResult<Value> {
    let Value::Dict(dict) = receiver else {
        unreachable!("dict::call invoked on a non-dict receiver");
    };

    let result = match name {
        "keys" => Value::list(dict.borrow().keys().map(DictKey::into_value).collect()),
        "values" => Value::list(dict.borrow().values().cloned().collect()),
        "entries" => Value::list(
            dict.borrow()
                .iter()
                .map(|(k, v)| Value::list(vec![k.into_value(), v.clone()]))
                .collect(),
        ),
        "toList" => Value::list(
            dict.borrow()
                .iter()
                .map(|(k, v)| Value::list(vec![k.into_value(), v.clone()]))
                .collect(),
        ),
        "size" | "length" => Value::Int(dict.borrow().len() as i64),
        "isEmpty" => Value::Bool(dict.borrow().is_empty()),
        "clear" => {
            dict.borrow_mut().clear();
            Value::Null
        }
        "copy" => Value::dict(dict.borrow().clone()),
        "has" | "contains" => {
            let key = DictKey::from_value(&expect_arg(args, 0, name, position)?, position)?;
            Value::Bool(dict.borrow().contains_key(&key))
        }
        "get" => {
            let key = DictKey::from_value(&expect_arg(args, 0, name, position)?, position)?;
            match dict.borrow().get(&key) {
                Some(value) => value.clone(),
                None => args.get(1).cloned().unwrap_or(Value::Null),
            }
        }
        "remove" | "delete" => {
            let key = DictKey::from_value(&expect_arg(args, 0, name, position)?, position)?;
            match dict.borrow_mut().shift_remove(&key) {
                Some(value) => value,
                None => Value::Null,
            }
        }
        "merge" => {
            let Value::Dict(other) = expect_arg(args, 0, name, position)? else {
                return Err(RuntimeError::new("'merge' expects a dictionary argument", position).into());
            };
            let mut merged = dict.borrow().clone();
            for (k, v) in other.borrow().iter() {
                merged.insert(k.clone(), v.clone());
            }
            Value::dict(merged)
        }
        "forEach" => {
            let callback = expect_arg(args, 0, name, position)?;
            let entries: Vec<(DictKey, Value)> = dict.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            for (key, value) in entries {
                interp.call_value(callback.clone(), vec![key.into_value(), value], caller_env, position)?;
            }
            Value::Null
        }
        "map" => {
            let callback = expect_arg(args, 0, name, position)?;
            let entries: Vec<(DictKey, Value)> = dict.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            let mut mapped = IndexMap::new();
            for (key, value) in entries {
                let new_value = interp.call_value(callback.clone(), vec![key.clone().into_value(), value], caller_env, position)?;
                mapped.insert(key, new_value);
            }
            Value::dict(mapped)
        }
        "filter" => {
            let callback = expect_arg(args, 0, name, position)?;
            let entries: Vec<(DictKey, Value)> = dict.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            let mut kept = IndexMap::new();
            for (key, value) in entries {
                if interp
                    .call_value(callback.clone(), vec![key.clone().into_value(), value.clone()], caller_env, position)?
                    .is_truthy()
                {
                    kept.insert(key, value);
                }
            }
            Value::dict(kept)
        }
        _ => return Err(no_such_method("dictionary", name, position).into()),
    };
    Ok(result)
}
