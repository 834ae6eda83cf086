//! Integration coverage for the String/List/Dict/Number built-in method
//! tables (§4.4) and list/dict literal and indexing semantics (§3).

use volt::{run_source, Value};

fn globals(source: &str) -> volt::Interpreter {
    run_source("test", source).expect("program should evaluate")
}

fn get(interp: &volt::Interpreter, name: &str) -> Value {
    interp.globals.get(name).unwrap_or_else(|| panic!("'{name}' was never defined"))
}

fn as_str(value: &Value) -> String {
    match value {
        Value::Str(s) => s.as_str().to_owned(),
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn string_methods_can_be_called_with_or_without_parens() {
    let interp = globals(
        r#"
        set s = "  Hello World  "
        set trimmed = s.trim()
        set lowered = trimmed.lower()
        set bareLength = s.length
        set calledLength = s.length()
        "#,
    );
    assert_eq!(as_str(&get(&interp, "trimmed")), "Hello World");
    assert_eq!(as_str(&get(&interp, "lowered")), "hello world");
    assert!(matches!(get(&interp, "bareLength"), Value::Int(n) if n == get_int(&interp, "calledLength")));
}

fn get_int(interp: &volt::Interpreter, name: &str) -> i64 {
    match get(interp, name) {
        Value::Int(n) => n,
        other => panic!("expected an Int, got {other:?}"),
    }
}

#[test]
fn string_interpolation_and_format() {
    let interp = globals(
        r#"
        set name = "Volt"
        set version = 1
        set greeting = f"hello {name}, v{version + 0}!"
        set templated = "{} scripts {}".format("Volt", "run")
        "#,
    );
    assert_eq!(as_str(&get(&interp, "greeting")), "hello Volt, v1!");
    assert_eq!(as_str(&get(&interp, "templated")), "Volt scripts run");
}

#[test]
fn list_is_shared_by_reference_and_supports_push_pop() {
    let interp = globals(
        r#"
        set a = [1, 2, 3]
        set b = a
        push b 4
        set popped = pop a
        set lenA = a.length
        set lenB = b.length
        "#,
    );
    assert!(matches!(get(&interp, "popped"), Value::Int(4)));
    assert!(matches!(get(&interp, "lenA"), Value::Int(3)));
    assert!(matches!(get(&interp, "lenB"), Value::Int(3)));
}

#[test]
fn list_map_filter_reduce_use_the_callers_scope() {
    let interp = globals(
        r#"
        set factor = 10
        set numbers = [1, 2, 3, 4]
        set scaled = numbers.map((x) => x * factor)
        set evens = numbers.filter((x) => x % 2 == 0)
        set total = numbers.reduce((acc, x) => acc + x, 0)
        "#,
    );
    match get(&interp, "scaled") {
        Value::List(list) => {
            let items = list.borrow();
            assert_eq!(items.len(), 4);
            assert!(matches!(items[0], Value::Int(10)));
            assert!(matches!(items[3], Value::Int(40)));
        }
        other => panic!("expected a list, got {other:?}"),
    }
    match get(&interp, "evens") {
        Value::List(list) => assert_eq!(list.borrow().len(), 2),
        other => panic!("expected a list, got {other:?}"),
    }
    assert!(matches!(get(&interp, "total"), Value::Int(10)));
}

#[test]
fn list_indexing_and_assignment() {
    let interp = globals(
        r#"
        set items = [10, 20, 30]
        set first = items[0]
        set items[1] = 99
        set second = items[1]
        "#,
    );
    assert!(matches!(get(&interp, "first"), Value::Int(10)));
    assert!(matches!(get(&interp, "second"), Value::Int(99)));
}

#[test]
fn out_of_bounds_index_is_a_runtime_error() {
    let err = run_source("test", "set items = [1,2,3]\nshow items[10]").unwrap_err();
    assert!(matches!(err, volt::VoltError::Runtime(_)));
}

#[test]
fn dict_keys_values_and_joined_entries() {
    let interp = globals(
        r#"
        set d = {a: 1, b: 2}
        set joinedKeys = d.keys().join(",")
        set total = d.values().sum()
        set has = d.has("a")
        "#,
    );
    assert_eq!(as_str(&get(&interp, "joinedKeys")), "a,b");
    assert!(matches!(get(&interp, "total"), Value::Int(3)));
    assert!(matches!(get(&interp, "has"), Value::Bool(true)));
}

#[test]
fn dict_get_with_default_and_remove() {
    let interp = globals(
        r#"
        set d = {code: 1}
        set missing = d.get("nope", -1)
        set removed = d.remove("code")
        set sizeAfter = d.size()
        "#,
    );
    assert!(matches!(get(&interp, "missing"), Value::Int(-1)));
    assert!(matches!(get(&interp, "removed"), Value::Int(1)));
    assert!(matches!(get(&interp, "sizeAfter"), Value::Int(0)));
}

#[test]
fn dict_index_assignment_inserts_or_overwrites() {
    let interp = globals(
        r#"
        set d = {}
        set d["x"] = 1
        set d["x"] = 2
        set value = d["x"]
        "#,
    );
    assert!(matches!(get(&interp, "value"), Value::Int(2)));
}

#[test]
fn number_methods() {
    let interp = globals(
        r#"
        set n = -7
        set absolute = n.abs()
        set clamped = n.clamp(0, 10)
        set isEven = (4).isEven()
        "#,
    );
    assert!(matches!(get(&interp, "absolute"), Value::Int(7)));
    assert!(matches!(get(&interp, "clamped"), Value::Int(0)));
    assert!(matches!(get(&interp, "isEven"), Value::Bool(true)));
}
