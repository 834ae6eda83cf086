//! Integration coverage for functions, closures and lambdas (§3, §4.3).

use volt::{run_source, Value};

fn globals(source: &str) -> volt::Interpreter {
    run_source("test", source).expect("program should evaluate")
}

fn get(interp: &volt::Interpreter, name: &str) -> Value {
    interp.globals.get(name).unwrap_or_else(|| panic!("'{name}' was never defined"))
}

#[test]
fn function_captures_its_declaration_environment() {
    let interp = globals(
        r#"
        func makeAdder(n) {
            func add(x) { return x + n }
            return add
        }
        set addFive = makeAdder(5)
        set result = addFive(10)
        "#,
    );
    assert!(matches!(get(&interp, "result"), Value::Int(15)));
}

#[test]
fn each_call_gets_a_fresh_frame() {
    let interp = globals(
        r#"
        func counter() {
            set n = 0
            func bump() { set n = n + 1 return n }
            return bump
        }
        set a = counter()
        set b = counter()
        set x1 = a()
        set x2 = a()
        set y1 = b()
        "#,
    );
    assert!(matches!(get(&interp, "x1"), Value::Int(1)));
    assert!(matches!(get(&interp, "x2"), Value::Int(2)));
    assert!(matches!(get(&interp, "y1"), Value::Int(1)));
}

#[test]
fn lambda_expression_evaluates_and_calls() {
    let interp = globals(
        r#"
        set square = (x) => x * x
        set result = square(6)
        "#,
    );
    assert!(matches!(get(&interp, "result"), Value::Int(36)));
}

#[test]
fn default_arguments_evaluate_in_the_callers_scope() {
    let interp = globals(
        r#"
        set base = 100
        func withDefault(x = base + 1) { return x }
        set result = withDefault()
        set base = 200
        set afterRebind = withDefault()
        "#,
    );
    assert!(matches!(get(&interp, "result"), Value::Int(101)));
    assert!(matches!(get(&interp, "afterRebind"), Value::Int(201)));
}

#[test]
fn recursive_function_calls_itself_by_name() {
    let interp = globals(
        r#"
        func factorial(n) {
            if n <= 1 { return 1 }
            return n * factorial(n - 1)
        }
        set result = factorial(5)
        "#,
    );
    assert!(matches!(get(&interp, "result"), Value::Int(120)));
}

#[test]
fn calling_too_few_arguments_is_a_runtime_error() {
    let err = run_source(
        "test",
        r#"
        func needsTwo(a, b) { return a + b }
        needsTwo(1)
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, volt::VoltError::Runtime(_)));
}
