//! Integration coverage for the module system (§4.5): built-in native
//! modules and user `.volt` file modules.

use volt::{run_source, Value};

fn globals(source: &str) -> volt::Interpreter {
    run_source("test", source).expect("program should evaluate")
}

fn get(interp: &volt::Interpreter, name: &str) -> Value {
    interp.globals.get(name).unwrap_or_else(|| panic!("'{name}' was never defined"))
}

#[test]
fn math_module_exposes_constants_and_functions() {
    let interp = globals(
        r#"
        use "math"
        set area = math.pi * math.pow(2, 2)
        set rounded = math.round(area)
        "#,
    );
    assert!(matches!(get(&interp, "rounded"), Value::Float(f) if (f - 13.0).abs() < 1.0));
}

#[test]
fn math_module_min_and_max() {
    let interp = globals(
        r#"
        use "math"
        set lo = math.min(3, 7)
        set hi = math.max(3, 7)
        "#,
    );
    assert!(matches!(get(&interp, "lo"), Value::Float(f) if f == 3.0));
    assert!(matches!(get(&interp, "hi"), Value::Float(f) if f == 7.0));
}

#[test]
fn use_with_an_alias_binds_under_that_name() {
    let interp = globals(
        r#"
        use "math" to m
        set result = m.sqrt(9)
        "#,
    );
    assert!(matches!(get(&interp, "result"), Value::Float(f) if f == 3.0));
}

#[test]
fn random_module_int_respects_bounds() {
    let interp = globals(
        r#"
        use "random"
        random.seed(1)
        set n = random.int(5, 5)
        "#,
    );
    assert!(matches!(get(&interp, "n"), Value::Int(5)));
}

#[test]
fn time_module_now_returns_a_positive_float() {
    let interp = globals(
        r#"
        use "time"
        set t = time.now()
        "#,
    );
    assert!(matches!(get(&interp, "t"), Value::Float(f) if f > 0.0));
}

#[test]
fn file_module_round_trips_through_disk() {
    let path = std::env::temp_dir().join(format!("volt-file-module-test-{}.txt", std::process::id()));
    let path_str = path.to_str().unwrap().replace('\\', "/");
    let source = format!(
        r#"
        use "file"
        file.write("{path}", "hello volt")
        set existed = file.exists("{path}")
        set contents = file.read("{path}")
        "#,
        path = path_str
    );
    let interp = globals(&source);
    assert!(matches!(get(&interp, "existed"), Value::Bool(true)));
    match get(&interp, "contents") {
        Value::Str(s) => assert_eq!(*s, "hello volt"),
        other => panic!("expected a string, got {other:?}"),
    }
    let _ = std::fs::remove_file(&path);
}

#[test]
fn user_volt_file_is_loaded_as_a_module() {
    let interp = globals(
        r#"
        use "tests/fixtures/greeter"
        set message = greeter.greet("Volt")
        "#,
    );
    match get(&interp, "message") {
        Value::Str(s) => assert_eq!(*s, "hello, Volt"),
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn unresolvable_module_is_a_runtime_error() {
    let err = run_source("test", r#"use "does/not/exist""#).unwrap_err();
    assert!(matches!(err, volt::VoltError::Runtime(_)));
}
