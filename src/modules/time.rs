use std::rc::Rc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;

use crate::error::RuntimeError;
use crate::value::{ModuleValue, Value};

use super::{arg, expect_number, native};

pub fn module() -> Value {
    let mut natives = IndexMap::new();

    natives.insert(
        "now".to_owned(),
        native(|_, _args, pos| {
            let elapsed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|err| RuntimeError::new(format!("time.now: {err}"), pos))?;
            Ok(Value::Float(elapsed.as_secs_f64()))
        }),
    );

    natives.insert(
        "sleepMs".to_owned(),
        native(|_, args, pos| {
            let millis = expect_number(&arg(args, 0, "time", "sleepMs", pos)?, "time", "sleepMs", pos)?;
            if millis < 0.0 {
                return Err(RuntimeError::new("time.sleepMs expects a non-negative duration", pos));
            }
            std::thread::sleep(Duration::from_millis(millis as u64));
            Ok(Value::Null)
        }),
    );

    Value::Module(Rc::new(ModuleValue {
        name: "time".to_owned(),
        exports: IndexMap::new(),
        natives,
    }))
}
