use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::value::{ModuleValue, Value};

use super::{arg, expect_number, native};

pub fn module() -> Value {
    let rng = Rc::new(RefCell::new(StdRng::from_entropy()));

    let mut natives = IndexMap::new();

    let seed_rng = rng.clone();
    natives.insert(
        "seed".to_owned(),
        native(move |_, args, pos| {
            let n = expect_number(&arg(args, 0, "random", "seed", pos)?, "random", "seed", pos)?;
            *seed_rng.borrow_mut() = StdRng::seed_from_u64(n as u64);
            Ok(Value::Null)
        }),
    );

    let int_rng = rng.clone();
    natives.insert(
        "int".to_owned(),
        native(move |_, args, pos| {
            let lo = expect_number(&arg(args, 0, "random", "int", pos)?, "random", "int", pos)? as i64;
            let hi = expect_number(&arg(args, 1, "random", "int", pos)?, "random", "int", pos)? as i64;
            if lo > hi {
                return Err(crate::error::RuntimeError::new("random.int expects lo <= hi", pos));
            }
            Ok(Value::Int(int_rng.borrow_mut().gen_range(lo..=hi)))
        }),
    );

    let float_rng = rng.clone();
    natives.insert(
        "float".to_owned(),
        native(move |_, _args, _pos| Ok(Value::Float(float_rng.borrow_mut().gen::<f64>()))),
    );

    let choice_rng = rng;
    natives.insert(
        "choice".to_owned(),
        native(move |_, args, pos| {
            let Value::List(list) = arg(args, 0, "random", "choice", pos)? else {
                return Err(crate::error::RuntimeError::new("random.choice expects a list", pos));
            };
            let items = list.borrow();
            if items.is_empty() {
                return Err(crate::error::RuntimeError::new("random.choice on an empty list", pos));
            }
            let index = choice_rng.borrow_mut().gen_range(0..items.len());
            Ok(items[index].clone())
        }),
    );

    Value::Module(Rc::new(ModuleValue {
        name: "random".to_owned(),
        exports: IndexMap::new(),
        natives,
    }))
}
