use crate::error::{Position, RuntimeError};
use crate::interpreter::{EvalResult, Interpreter};
use crate::value::Value;

use super::{arity_error, expect_arg, expect_int, expect_str, no_such_method};

pub fn call(interp: &mut Interpreter, receiver: &Value, name: &str, args: &[Value], position: Position) -> EvalResult<Value> {
    let Value::Str(s) = receiver else {
        unreachable!("string::call invoked on a non-string receiver");
    };

    let result = match name {
        "upper" => Value::str(s.to_uppercase()),
        "lower" => Value::str(s.to_lowercase()),
        "trim" => Value::str(s.trim().to_owned()),
        "trimStart" => Value::str(s.trim_start().to_owned()),
        "trimEnd" => Value::str(s.trim_end().to_owned()),
        "length" => Value::Int(s.chars().count() as i64),
        "reverse" => Value::str(s.chars().rev().collect::<String>()),
        "isEmpty" => Value::Bool(s.is_empty()),
        "isDigit" => Value::Bool(!s.is_empty() && s.chars().all(|c| c.is_ascii_digit())),
        "isAlpha" => Value::Bool(!s.is_empty() && s.chars().all(|c| c.is_alphabetic())),
        "isSpace" => Value::Bool(!s.is_empty() && s.chars().all(char::is_whitespace)),
        "toList" => Value::list(s.chars().map(|c| Value::str(c.to_string())).collect()),
        "toInt" => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RuntimeError::new(format!("cannot convert '{s}' to an integer"), position))?,
        "toFloat" => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| RuntimeError::new(format!("cannot convert '{s}' to a floating"), position))?,
        "toNumber" => {
            let trimmed = s.trim();
            if trimmed.contains('.') {
                trimmed
                    .parse::<f64>()
                    .map(Value::Float)
                    .map_err(|_| RuntimeError::new(format!("cannot convert '{s}' to a number"), position))?
            } else {
                trimmed
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| RuntimeError::new(format!("cannot convert '{s}' to a number"), position))?
            }
        }
        "contains" | "includes" => {
            let needle = expect_str(&expect_arg(args, 0, name, position)?, name, position)?;
            Value::Bool(s.contains(needle.as_str()))
        }
        "startsWith" => {
            let needle = expect_str(&expect_arg(args, 0, name, position)?, name, position)?;
            Value::Bool(s.starts_with(needle.as_str()))
        }
        "endsWith" => {
            let needle = expect_str(&expect_arg(args, 0, name, position)?, name, position)?;
            Value::Bool(s.ends_with(needle.as_str()))
        }
        "indexOf" => {
            let needle = expect_str(&expect_arg(args, 0, name, position)?, name, position)?;
            match s.find(needle.as_str()) {
                Some(byte_index) => Value::Int(s[..byte_index].chars().count() as i64),
                None => Value::Int(-1),
            }
        }
        "lastIndexOf" => {
            let needle = expect_str(&expect_arg(args, 0, name, position)?, name, position)?;
            match s.rfind(needle.as_str()) {
                Some(byte_index) => Value::Int(s[..byte_index].chars().count() as i64),
                None => Value::Int(-1),
            }
        }
        "count" => {
            let needle = expect_str(&expect_arg(args, 0, name, position)?, name, position)?;
            if needle.is_empty() {
                Value::Int(0)
            } else {
                Value::Int(s.matches(needle.as_str()).count() as i64)
            }
        }
        "replace" => {
            let old = expect_str(&expect_arg(args, 0, name, position)?, name, position)?;
            let new = expect_str(&expect_arg(args, 1, name, position)?, name, position)?;
            Value::str(s.replace(old.as_str(), new.as_str()))
        }
        "repeat" => {
            let n = expect_int(&expect_arg(args, 0, name, position)?, name, position)?;
            if n < 0 {
                return Err(RuntimeError::new("'repeat' count must not be negative", position).into());
            }
            Value::str(s.repeat(n as usize))
        }
        "charAt" => {
            let i = expect_int(&expect_arg(args, 0, name, position)?, name, position)?;
            if i < 0 {
                return Err(RuntimeError::new("'charAt' index must not be negative", position).into());
            }
            s.chars().nth(i as usize).map(|c| Value::str(c.to_string())).unwrap_or_else(|| Value::str(""))
        }
        "slice" => {
            let chars: Vec<char> = s.chars().collect();
            let (start, end) = slice_bounds(chars.len(), args, name, position)?;
            Value::str(chars[start..end].iter().collect::<String>())
        }
        "split" => {
            let parts: Vec<Value> = match args.first() {
                Some(sep_value) => {
                    let sep = expect_str(sep_value, name, position)?;
                    if sep.is_empty() {
                        s.chars().map(|c| Value::str(c.to_string())).collect()
                    } else {
                        s.split(sep.as_str()).map(Value::str).collect()
                    }
                }
                None => s.split_whitespace().map(Value::str).collect(),
            };
            Value::list(parts)
        }
        "join" => {
            let Value::List(list) = expect_arg(args, 0, name, position)? else {
                return Err(arity_error(name, "a list", args.len(), position).into());
            };
            let items = list.borrow().clone();
            let mut parts = Vec::with_capacity(items.len());
            for item in &items {
                parts.push(interp.stringify(item, position)?);
            }
            Value::str(parts.join(s.as_str()))
        }
        "padStart" => {
            let width = expect_int(&expect_arg(args, 0, name, position)?, name, position)? as usize;
            let pad = match args.get(1) {
                Some(value) => expect_str(value, name, position)?,
                None => std::rc::Rc::new(" ".to_owned()),
            };
            Value::str(pad_string(s, &pad, width, true))
        }
        "padEnd" => {
            let width = expect_int(&expect_arg(args, 0, name, position)?, name, position)? as usize;
            let pad = match args.get(1) {
                Some(value) => expect_str(value, name, position)?,
                None => std::rc::Rc::new(" ".to_owned()),
            };
            Value::str(pad_string(s, &pad, width, false))
        }
        "format" => {
            let mut out = String::new();
            let mut rest = s.as_str();
            let mut arg_index = 0;
            while let Some(pos) = rest.find("{}") {
                out.push_str(&rest[..pos]);
                let value = args.get(arg_index).cloned().unwrap_or(Value::Null);
                out.push_str(&interp.stringify(&value, position)?);
                arg_index += 1;
                rest = &rest[pos + 2..];
            }
            out.push_str(rest);
            Value::str(out)
        }
        _ => return Err(no_such_method("string", name, position).into()),
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

fn pad_string(s: &str, pad: &str, width: usize, at_start: bool) -> String {
    let current = s.chars().count();
    if current >= width || pad.is_empty() {
        return s.to_owned();
    }
    let needed = width - current;
    let filler: String = pad.chars().cycle().take(needed).collect();
    if at_start {
        format!("{filler}{s}")
    } else {
        format!("{s}{filler}")
    }
}
