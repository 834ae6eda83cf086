use crate::error::{Position, RuntimeError};
use crate::interpreter::EvalResult;
use crate::value::{stringify, Value};

use super::{expect_arg, no_such_method};

pub fn call(_interp: &mut crate::interpreter::Interpreter, receiver: &Value, name: &str, args: &[Value], position: Position) -> EvalResult<Value> {
    let result = match name {
        "toStr" | "toString" => Value::str(stringify(receiver)),
        "toInt" => match receiver {
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Int(*f as i64),
            _ => unreachable!(),
        },
        "toFloat" => match receiver {
            Value::Int(i) => Value::Float(*i as f64),
            Value::Float(f) => Value::Float(*f),
            _ => unreachable!(),
        },
        "abs" => match receiver {
            Value::Int(i) => Value::Int(i.abs()),
            Value::Float(f) => Value::Float(f.abs()),
            _ => unreachable!(),
        },
        "isEven" => Value::Bool(as_i64(receiver) % 2 == 0),
        "isOdd" => Value::Bool(as_i64(receiver) % 2 != 0),
        "isPositive" => Value::Bool(as_f64(receiver) > 0.0),
        "isNegative" => Value::Bool(as_f64(receiver) < 0.0),
        "isZero" => Value::Bool(as_f64(receiver) == 0.0),
        "clamp" => {
            let lo = expect_arg(args, 0, name, position)?;
            let hi = expect_arg(args, 1, name, position)?;
            clamp(receiver, &lo, &hi, position)?
        }
        _ => return Err(no_such_method("number", name, position).into()),
    };
    Ok(result)
}

fn as_i64(value: &Value) -> i64 {
    match value {
        Value::Int(i) => *i,
        Value::Float(f) => *f as i64,
        _ => unreachable!(),
    }
}

fn as_f64(value: &Value) -> f64 {
    match value {
        Value::Int(i) => *i as f64,
        Value::Float(f) => *f,
        _ => unreachable!(),
    }
}

fn clamp(value: &Value, lo: &Value, hi: &Value, position: Position) -> EvalResult<Value> {
    match (value, lo, hi) {
        (Value::Int(v), Value::Int(l), Value::Int(h)) => Ok(Value::Int((*v).clamp(*l, *h))),
        _ => {
            let v = as_f64_checked(value, position)?;
            let l = as_f64_checked(lo, position)?;
            let h = as_f64_checked(hi, position)?;
            Ok(Value::Float(v.clamp(l, h)))
        }
    }
}

fn as_f64_checked(value: &Value, position: Position) -> EvalResult<f64> {
    match value {
        Value::Int(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeError::new(format!("'clamp' expects numbers, found {}", other.type_name()), position).into()),
    }
}
