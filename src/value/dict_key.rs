//! Hashable wrapper around the subset of [`Value`] that may be used as a
//! dictionary key (§3: "keys may be any hashable value").

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::error::{Position, RuntimeError};

use super::Value;

#[derive(Debug, Clone)]
pub enum DictKey {
    Null,
    Bool(bool),
    Int(i64),
    /// Stored as bits so `DictKey` can implement `Eq`/`Hash`; two floats with
    /// the same bit pattern hash identically, matching `==` for all
    /// non-`NaN` keys actually produced by the parser/evaluator.
    Float(u64),
    Str(Rc<String>),
}

impl DictKey {
    pub fn from_value(value: &Value, position: Position) -> Result<DictKey, RuntimeError> {
        match value {
            Value::Null => Ok(DictKey::Null),
            Value::Bool(b) => Ok(DictKey::Bool(*b)),
            Value::Int(i) => Ok(DictKey::Int(*i)),
            Value::Float(f) => Ok(DictKey::Float(f.to_bits())),
            Value::Str(s) => Ok(DictKey::Str(s.clone())),
            other => Err(RuntimeError::new(
                format!("value of type '{}' cannot be used as a dictionary key", other.type_name()),
                position,
            )),
        }
    }

    pub fn into_value(&self) -> Value {
        match self {
            DictKey::Null => Value::Null,
            DictKey::Bool(b) => Value::Bool(*b),
            DictKey::Int(i) => Value::Int(*i),
            DictKey::Float(bits) => Value::Float(f64::from_bits(*bits)),
            DictKey::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl PartialEq for DictKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DictKey::Null, DictKey::Null) => true,
            (DictKey::Bool(a), DictKey::Bool(b)) => a == b,
            (DictKey::Int(a), DictKey::Int(b)) => a == b,
            (DictKey::Float(a), DictKey::Float(b)) => a == b,
            (DictKey::Str(a), DictKey::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DictKey {}

impl Hash for DictKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            DictKey::Null => {}
            DictKey::Bool(b) => b.hash(state),
            DictKey::Int(i) => i.hash(state),
            DictKey::Float(bits) => bits.hash(state),
            DictKey::Str(s) => s.hash(state),
        }
    }
}
