//! Lexically scoped environment chain (§3, §9).
//!
//! A frame is reference-counted and its parent link is immutable once
//! created, so closures may safely outlive the scope that created them; only
//! the bindings map itself is mutable. Function calls parent a fresh frame
//! on the callee's closure rather than the caller's frame, and only
//! `try`/`catch` among block constructs introduces a child frame (§3).

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::value::Value;

pub type EnvRef = Rc<Environment>;

pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<EnvRef>,
}

impl fmt::Debug for Environment {
    /// Frames routinely contain functions closing back over themselves;
    /// print binding names only rather than recursing into values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.bindings.borrow().keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

impl Environment {
    pub fn root() -> EnvRef {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    pub fn child(parent: &EnvRef) -> EnvRef {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent.clone()),
        })
    }

    /// Introduces or overwrites a binding in *this* frame (`set`, §3).
    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(name))
    }

    /// Walks parents and updates the innermost binding that already holds
    /// `name`; returns whether such a binding was found. Volt has no
    /// "assign without introducing", so callers that want introduce-or-assign
    /// semantics fall back to `define` on the current frame when this
    /// returns `false`.
    pub fn assign_if_exists(&self, name: &str, value: Value) -> bool {
        if self.bindings.borrow().contains_key(name) {
            self.bindings.borrow_mut().insert(name.to_owned(), value);
            return true;
        }
        match &self.parent {
            Some(parent) => parent.assign_if_exists(name, value),
            None => false,
        }
    }

    /// Bindings introduced directly in this frame, not its ancestors. Used
    /// by the module loader (§4.5) to turn an evaluated file's top-level
    /// scope into a module's exports.
    pub fn own_bindings(&self) -> HashMap<String, Value> {
        self.bindings.borrow().clone()
    }
}
