use crate::environment::EnvRef;
use crate::error::{Position, RuntimeError};
use crate::interpreter::{EvalResult, Interpreter};
use crate::value::Value;

use super::{expect_arg, expect_int, no_such_method};

pub fn call(
    interp: &mut Interpreter,
    receiver: &Value,
    name: &str,
    args: &[Value],
    caller_env: &EnvRef,
    position: Position,
) -> EvalResult<Value> {
    let Value::List(list) = receiver else {
        unreachable!("list::call invoked on a non-list receiver");
    };

    let result = match name {
        "length" => Value::Int(list.borrow().len() as i64),
        "isEmpty" => Value::Bool(list.borrow().is_empty()),
        "clear" => {
            list.borrow_mut().clear();
            Value::Null
        }
        "copy" => Value::list(list.borrow().clone()),
        "first" => list.borrow().first().cloned().unwrap_or(Value::Null),
        "last" => list.borrow().last().cloned().unwrap_or(Value::Null),
        "push" | "append" => {
            let value = expect_arg(args, 0, name, position)?;
            list.borrow_mut().push(value);
            Value::Null
        }
        "pop" => {
            let index = match args.first() {
                Some(value) => expect_int(value, name, position)? as usize,
                None => {
                    let len = list.borrow().len();
                    if len == 0 {
                        return Err(RuntimeError::new("pop from an empty list", position).into());
                    }
                    len - 1
                }
            };
            let mut items = list.borrow_mut();
            if index >= items.len() {
                return Err(RuntimeError::new(format!("pop index {index} out of range"), position).into());
            }
            items.remove(index)
        }
        "shift" => {
            let mut items = list.borrow_mut();
            if items.is_empty() {
                return Err(RuntimeError::new("shift from an empty list", position).into());
            }
            items.remove(0)
        }
        "unshift" => {
            let value = expect_arg(args, 0, name, position)?;
            list.borrow_mut().insert(0, value);
            Value::Null
        }
        "insert" => {
            let index = expect_int(&expect_arg(args, 0, name, position)?, name, position)? as usize;
            let value = expect_arg(args, 1, name, position)?;
            let mut items = list.borrow_mut();
            if index > items.len() {
                return Err(RuntimeError::new(format!("insert index {index} out of range"), position).into());
            }
            items.insert(index, value);
            Value::Null
        }
        "remove" => {
            let target = expect_arg(args, 0, name, position)?;
            let mut items = list.borrow_mut();
            match items.iter().position(|item| item.structural_eq(&target)) {
                Some(index) => {
                    items.remove(index);
                    Value::Bool(true)
                }
                None => Value::Bool(false),
            }
        }
        "indexOf" => {
            let target = expect_arg(args, 0, name, position)?;
            let items = list.borrow();
            match items.iter().position(|item| item.structural_eq(&target)) {
                Some(index) => Value::Int(index as i64),
                None => Value::Int(-1),
            }
        }
        "lastIndexOf" => {
            let target = expect_arg(args, 0, name, position)?;
            let items = list.borrow();
            match items.iter().rposition(|item| item.structural_eq(&target)) {
                Some(index) => Value::Int(index as i64),
                None => Value::Int(-1),
            }
        }
        "includes" | "contains" => {
            let target = expect_arg(args, 0, name, position)?;
            Value::Bool(list.borrow().iter().any(|item| item.structural_eq(&target)))
        }
        "count" => {
            let target = expect_arg(args, 0, name, position)?;
            Value::Int(list.borrow().iter().filter(|item| item.structural_eq(&target)).count() as i64)
        }
        "join" => {
            let sep = match args.first() {
                Some(Value::Str(s)) => s.as_str().to_owned(),
                Some(_) => return Err(RuntimeError::new("'join' separator must be a string", position).into()),
                None => ",".to_owned(),
            };
            let items = list.borrow().clone();
            let mut parts = Vec::with_capacity(items.len());
            for item in &items {
                parts.push(interp.stringify(item, position)?);
            }
            Value::str(parts.join(&sep))
        }
        "slice" => {
            let items = list.borrow();
            let (start, end) = slice_bounds(items.len(), args, name, position)?;
            Value::list(items[start..end].to_vec())
        }
        "reverse" => {
            let mut items = list.borrow().clone();
            items.reverse();
            Value::list(items)
        }
        "sort" => {
            let mut items = list.borrow().clone();
            sort_values(&mut items, position)?;
            Value::list(items)
        }
        "flat" => {
            let mut flattened = Vec::new();
            for item in list.borrow().iter() {
                match item {
                    Value::List(inner) => flattened.extend(inner.borrow().iter().cloned()),
                    other => flattened.push(other.clone()),
                }
            }
            Value::list(flattened)
        }
        "fill" => {
            let value = expect_arg(args, 0, name, position)?;
            let len = list.borrow().len();
            let start = match args.get(1) {
                Some(v) => expect_int(v, name, position)?.clamp(0, len as i64) as usize,
                None => 0,
            };
            let end = match args.get(2) {
                Some(v) => expect_int(v, name, position)?.clamp(0, len as i64) as usize,
                None => len,
            };
            let mut items = list.borrow_mut();
            for item in items.iter_mut().take(end.max(start)).skip(start) {
                *item = value.clone();
            }
            Value::Null
        }
        "unique" => {
            let items = list.borrow();
            let mut seen: Vec<Value> = Vec::new();
            for item in items.iter() {
                if !seen.iter().any(|v| v.structural_eq(item)) {
                    seen.push(item.clone());
                }
            }
            Value::list(seen)
        }
        "sum" => {
            let items = list.borrow();
            let mut int_sum = 0i64;
            let mut float_sum = 0.0f64;
            let mut is_float = false;
            for item in items.iter() {
                match item {
                    Value::Int(i) => int_sum += i,
                    Value::Float(f) => {
                        is_float = true;
                        float_sum += f;
                    }
                    other => return Err(RuntimeError::new(format!("cannot sum a {}", other.type_name()), position).into()),
                }
            }
            if is_float {
                Value::Float(float_sum + int_sum as f64)
            } else {
                Value::Int(int_sum)
            }
        }
        "min" | "max" => {
            let items = list.borrow();
            if items.is_empty() {
                return Err(RuntimeError::new(format!("'{name}' on an empty list"), position).into());
            }
            let mut best = items[0].clone();
            for item in items.iter().skip(1) {
                let better = match numeric_cmp(item, &best, position)? {
                    std::cmp::Ordering::Greater if name == "max" => true,
                    std::cmp::Ordering::Less if name == "min" => true,
                    _ => false,
                };
                if better {
                    best = item.clone();
                }
            }
            best
        }
        "enumerate" => {
            let items = list.borrow();
            Value::list(
                items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| Value::list(vec![Value::Int(i as i64), v.clone()]))
                    .collect(),
            )
        }
        "zip" => {
            let Value::List(other) = expect_arg(args, 0, name, position)? else {
                return Err(RuntimeError::new("'zip' expects a list argument", position).into());
            };
            let items = list.borrow();
            let other_items = other.borrow();
            Value::list(
                items
                    .iter()
                    .zip(other_items.iter())
                    .map(|(a, b)| Value::list(vec![a.clone(), b.clone()]))
                    .collect(),
            )
        }
        "map" => {
            let callback = expect_arg(args, 0, name, position)?;
            let items = list.borrow().clone();
            let mut mapped = Vec::with_capacity(items.len());
            for item in items {
                mapped.push(interp.call_value(callback.clone(), vec![item], caller_env, position)?);
            }
            Value::list(mapped)
        }
        "filter" => {
            let callback = expect_arg(args, 0, name, position)?;
            let items = list.borrow().clone();
            let mut kept = Vec::new();
            for item in items {
                if interp.call_value(callback.clone(), vec![item.clone()], caller_env, position)?.is_truthy() {
                    kept.push(item);
                }
            }
            Value::list(kept)
        }
        "find" => {
            let callback = expect_arg(args, 0, name, position)?;
            let items = list.borrow().clone();
            let mut found = Value::Null;
            for item in items {
                if interp.call_value(callback.clone(), vec![item.clone()], caller_env, position)?.is_truthy() {
                    found = item;
                    break;
                }
            }
            found
        }
        "findIndex" => {
            let callback = expect_arg(args, 0, name, position)?;
            let items = list.borrow().clone();
            let mut found = -1i64;
            for (index, item) in items.into_iter().enumerate() {
                if interp.call_value(callback.clone(), vec![item], caller_env, position)?.is_truthy() {
                    found = index as i64;
                    break;
                }
            }
            Value::Int(found)
        }
        "forEach" => {
            let callback = expect_arg(args, 0, name, position)?;
            let items = list.borrow().clone();
            for item in items {
                interp.call_value(callback.clone(), vec![item], caller_env, position)?;
            }
            Value::Null
        }
        "every" => {
            let callback = expect_arg(args, 0, name, position)?;
            let items = list.borrow().clone();
            let mut all = true;
            for item in items {
                if !interp.call_value(callback.clone(), vec![item], caller_env, position)?.is_truthy() {
                    all = false;
                    break;
                }
            }
            Value::Bool(all)
        }
        "some" => {
            let callback = expect_arg(args, 0, name, position)?;
            let items = list.borrow().clone();
            let mut any = false;
            for item in items {
                if interp.call_value(callback.clone(), vec![item], caller_env, position)?.is_truthy() {
                    any = true;
                    break;
                }
            }
            Value::Bool(any)
        }
        "reduce" => {
            let callback = expect_arg(args, 0, name, position)?;
            let items = list.borrow().clone();
            let mut iter = items.into_iter();
            let mut accumulator = match args.get(1) {
                Some(initial) => initial.clone(),
                None => iter
                    .next()
                    .ok_or_else(|| RuntimeError::new("'reduce' on an empty list requires an initial value", position))?,
            };
            for item in iter {
                accumulator = interp.call_value(callback.clone(), vec![accumulator, item], caller_env, position)?;
            }
            accumulator
        }
        _ => return Err(no_such_method("list", name, position).into()),
    };
    Ok(result)
}

fn slice_bounds(len: usize, args: &[Value], name: &str, position: Position) -> EvalResult<(usize, usize)> {
    let start = match args.first() {
        Some(value) => expect_int(value, name, position)?.clamp(0, len as i64) as usize,
        None => 0,
    };
    let end = match args.get(1) {
        Some(value) => expect_int(value, name, position)?.clamp(0, len as i64) as usize,
        None => len,
    };
    Ok((start, end.max(start)))
}

fn numeric_cmp(a: &Value, b: &Value, position: Position) -> EvalResult<std::cmp::Ordering> {
    let to_f64 = |v: &Value| match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        _ => None,
    };
    match (to_f64(a), to_f64(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).ok_or_else(|| RuntimeError::new("cannot compare NaN", position).into()),
        _ => Err(RuntimeError::new(format!("cannot compare {} and {}", a.type_name(), b.type_name()), position).into()),
    }
}

fn sort_values(items: &mut [Value], position: Position) -> EvalResult<()> {
    let mut err = None;
    items.sort_by(|a, b| match numeric_cmp(a, b, position) {
        Ok(ordering) => ordering,
        Err(flow) => {
            if err.is_none() {
                err = Some(flow);
            }
            std::cmp::Ordering::Equal
        }
    });
    match err {
        Some(flow) => Err(flow),
        None => Ok(()),
    }
}

