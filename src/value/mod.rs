//! The closed runtime value taxonomy (§3) plus the canonical stringifier
//! (§4.4).
//!
//! Lists, dicts, instances and modules are shared by reference (`Rc<RefCell<..>>`)
//! so that mutation through one alias is observable through all others, per
//! the sharing invariant in §3; strings and numbers are plain value types.

mod dict_key;
mod stringify;

pub use dict_key::DictKey;
pub use stringify::stringify;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{Param, Stmt};
use crate::environment::EnvRef;
use crate::error::{Position, RuntimeError};
use crate::interpreter::Interpreter;

pub type ListRef = Rc<RefCell<Vec<Value>>>;
pub type DictRef = Rc<RefCell<IndexMap<DictKey, Value>>>;

/// A user-defined function: parameters with optional default expressions, a
/// body, and the environment captured at its declaration site (its
/// closure). The closure pointer is immutable once the function exists (§3).
#[derive(Debug)]
pub struct FunctionValue {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub closure: EnvRef,
}

/// A native (host-implemented) callable, used by built-in modules (§4.5).
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, &[Value], Position) -> Result<Value, RuntimeError>>;

pub struct NativeFunction {
    pub name: String,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction").field("name", &self.name).finish()
    }
}

/// A class: name, optional parent, its own (non-inherited) methods, and the
/// environment in which `class` was declared.
#[derive(Debug)]
pub struct ClassValue {
    pub name: String,
    pub parent: Option<Rc<ClassValue>>,
    pub methods: RefCell<IndexMap<String, Rc<FunctionValue>>>,
    pub env: EnvRef,
}

impl ClassValue {
    /// Walks this class then its ancestors looking for `name` (§3: "inherited
    /// methods resolve via linear walk up `parent`").
    pub fn find_method(&self, name: &str) -> Option<Rc<FunctionValue>> {
        if let Some(method) = self.methods.borrow().get(name) {
            return Some(method.clone());
        }
        self.parent.as_ref().and_then(|p| p.find_method(name))
    }

    /// Used by `isinstance`-style checks (§8): true if `self` is `other` or
    /// inherits from it, walking the `parent` chain.
    pub fn is_or_inherits(&self, other: &Rc<ClassValue>) -> bool {
        if self.name == other.name {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.is_or_inherits(other),
            None => false,
        }
    }

    /// Like [`ClassValue::find_method`] but also returns the class that
    /// actually owns the method, so `super` calls made from inside it
    /// rebind `__class__` to *that* class rather than back to the most
    /// derived one (§4.3, "method dispatch").
    pub fn find_method_with_owner(self: &Rc<Self>, name: &str) -> Option<(Rc<FunctionValue>, Rc<ClassValue>)> {
        if let Some(method) = self.methods.borrow().get(name) {
            return Some((method.clone(), self.clone()));
        }
        self.parent.as_ref().and_then(|p| p.find_method_with_owner(name))
    }
}

#[derive(Debug)]
pub struct InstanceValue {
    pub class: Rc<ClassValue>,
    pub properties: IndexMap<String, Value>,
}

/// A module's bindings (§3, §4.5): plain data exports plus, for user `.volt`
/// modules, function bindings additionally exposed as callables that close
/// over the module's own environment.
pub struct ModuleValue {
    pub name: String,
    pub exports: IndexMap<String, Value>,
    pub natives: IndexMap<String, NativeFn>,
}

impl fmt::Debug for ModuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleValue")
            .field("name", &self.name)
            .field("exports", &self.exports.keys().collect::<Vec<_>>())
            .field("natives", &self.natives.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<String>),
    List(ListRef),
    Dict(DictRef),
    Function(Rc<FunctionValue>),
    Native(Rc<NativeFunction>),
    Class(Rc<ClassValue>),
    Instance(Rc<RefCell<InstanceValue>>),
    Module(Rc<ModuleValue>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(Rc::new(s.into()))
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(RefCell::new(items)))
    }

    pub fn dict(entries: IndexMap<DictKey, Value>) -> Value {
        Value::Dict(Rc::new(RefCell::new(entries)))
    }

    /// §4.3: null and false are false; numeric 0 is false; empty
    /// string/list/dict is false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(list) => !list.borrow().is_empty(),
            Value::Dict(dict) => !dict.borrow().is_empty(),
            Value::Function(_)
            | Value::Native(_)
            | Value::Class(_)
            | Value::Instance(_)
            | Value::Module(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "floating",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Dict(_) => "dictionary",
            Value::Function(_) | Value::Native(_) => "function",
            Value::Class(_) => "class",
            Value::Instance(_) => "instance",
            Value::Module(_) => "module",
        }
    }

    /// Structural equality for lists/dicts/numbers/strings/booleans/null;
    /// identity for functions/classes/instances/modules (§4.3).
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structural_eq(y))
            }
            (Value::Dict(a), Value::Dict(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|other_v| v.structural_eq(other_v)))
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", stringify(self))
    }
}
