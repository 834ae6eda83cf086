//! Integration coverage for loops, `match`, `try`/`catch`/`finally` and
//! `throw` (§4.3).

use volt::{run_source, Value};

fn globals(source: &str) -> volt::Interpreter {
    run_source("test", source).expect("program should evaluate")
}

fn get(interp: &volt::Interpreter, name: &str) -> Value {
    interp.globals.get(name).unwrap_or_else(|| panic!("'{name}' was never defined"))
}

#[test]
fn while_loop_with_break_and_continue() {
    let interp = globals(
        r#"
        set i = 0
        set sum = 0
        while i < 10 {
            set i = i + 1
            if i == 5 { continue }
            if i == 8 { break }
            set sum = sum + i
        }
        "#,
    );
    assert!(matches!(get(&interp, "sum"), Value::Int(22)));
    assert!(matches!(get(&interp, "i"), Value::Int(8)));
}

#[test]
fn for_with_a_bare_count_runs_that_many_times() {
    let interp = globals(
        r#"
        set count = 0
        for 5 { set count = count + 1 }
        "#,
    );
    assert!(matches!(get(&interp, "count"), Value::Int(5)));
}

#[test]
fn range_for_is_inclusive_of_both_bounds() {
    let interp = globals(
        r#"
        set total = 0
        for i in 1 to 4 { set total = total + i }
        "#,
    );
    assert!(matches!(get(&interp, "total"), Value::Int(10)));
}

#[test]
fn match_picks_the_first_matching_arm_with_no_fallthrough() {
    let interp = globals(
        r#"
        set result = 0
        set x = 2
        match x {
            case 1 { set result = 10 }
            case 2 { set result = 20 }
            default { set result = -1 }
        }
        "#,
    );
    assert!(matches!(get(&interp, "result"), Value::Int(20)));
}

#[test]
fn match_falls_through_to_the_default_arm() {
    let interp = globals(
        r#"
        set result = 0
        set x = 99
        match x {
            case 1 { set result = 10 }
            default { set result = -1 }
        }
        "#,
    );
    assert!(matches!(get(&interp, "result"), Value::Int(-1)));
}

#[test]
fn throw_is_caught_and_carries_the_thrown_value() {
    let interp = globals(
        r#"
        set caught = null
        try {
            throw {code: 7, message: "boom"}
        } catch e {
            set caught = e.code
        }
        "#,
    );
    assert!(matches!(get(&interp, "caught"), Value::Int(7)));
}

#[test]
fn finally_runs_whether_or_not_an_error_was_thrown() {
    let interp = globals(
        r#"
        set ran = 0
        try {
            set x = 1
        } finally {
            set ran = ran + 1
        }
        try {
            throw "oops"
        } catch e {
        } finally {
            set ran = ran + 1
        }
        "#,
    );
    assert!(matches!(get(&interp, "ran"), Value::Int(2)));
}

#[test]
fn uncaught_throw_propagates_as_a_runtime_error() {
    let err = run_source("test", r#"throw "boom""#).unwrap_err();
    match err {
        volt::VoltError::Runtime(e) => {
            assert!(matches!(e.catch_value(), Value::Str(_)));
        }
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn destructuring_a_list_binds_each_name() {
    let interp = globals(
        r#"
        set [a, b, c] = [1, 2, 3]
        "#,
    );
    assert!(matches!(get(&interp, "a"), Value::Int(1)));
    assert!(matches!(get(&interp, "b"), Value::Int(2)));
    assert!(matches!(get(&interp, "c"), Value::Int(3)));
}

#[test]
fn destructuring_a_dict_binds_by_key_name() {
    let interp = globals(
        r#"
        set {code, message} = {code: 42, message: "ok"}
        "#,
    );
    assert!(matches!(get(&interp, "code"), Value::Int(42)));
    match get(&interp, "message") {
        Value::Str(s) => assert_eq!(*s, "ok"),
        other => panic!("expected a string, got {other:?}"),
    }
}
