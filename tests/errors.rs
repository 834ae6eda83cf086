//! Integration coverage for error reporting across all three pipeline
//! stages (§7): lex errors, parse errors, and runtime errors, plus the
//! `VoltError` Display format consumed by the CLI (§6, §12).

use volt::VoltError;

fn lex_err(source: &str) -> VoltError {
    run(source).unwrap_err()
}

fn run(source: &str) -> Result<volt::Interpreter, VoltError> {
    volt::run_source("test", source)
}

#[test]
fn unterminated_string_is_reported_as_a_lex_error() {
    let err = lex_err("show \"unterminated");
    assert!(matches!(err, VoltError::Lex(_)));
}

#[test]
fn unknown_character_is_reported_as_a_lex_error() {
    let err = lex_err("set x = 1 ~ 2");
    assert!(matches!(err, VoltError::Lex(_)));
}

#[test]
fn unbalanced_parens_are_reported_as_a_parse_error() {
    let err = lex_err("show (1 + 2");
    assert!(matches!(err, VoltError::Parse(_)));
}

#[test]
fn try_without_catch_or_finally_is_a_parse_error() {
    let err = lex_err("try { show 1 }");
    assert!(matches!(err, VoltError::Parse(_)));
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let err = lex_err("show neverDefined");
    assert!(matches!(err, VoltError::Runtime(_)));
}

#[test]
fn calling_a_non_function_is_a_runtime_error() {
    let err = lex_err("set x = 5\nx()");
    assert!(matches!(err, VoltError::Runtime(_)));
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let err = lex_err("show 1 / 0");
    assert!(matches!(err, VoltError::Runtime(_)));
}

#[test]
fn division_by_zero_is_catchable() {
    let interp = run(
        r#"
        set caught = false
        try { show 1 / 0 } catch e { set caught = true }
        "#,
    )
    .expect("try/catch should handle the division error");
    assert!(matches!(interp.globals.get("caught"), Some(volt::Value::Bool(true))));
}

#[test]
fn break_outside_a_loop_is_a_runtime_error() {
    let err = lex_err("break");
    match err {
        VoltError::Runtime(e) => assert!(e.message.contains("break")),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn return_outside_a_function_is_a_runtime_error() {
    let err = lex_err("return 1");
    match err {
        VoltError::Runtime(e) => assert!(e.message.contains("return")),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn error_display_includes_position() {
    let err = lex_err("show missing");
    let text = err.to_string();
    assert!(text.contains(':'), "expected a 'message (line:col)' format, got '{text}'");
}

#[test]
fn constructing_without_init_but_with_arguments_fails() {
    let err = lex_err(
        r#"
        class Plain {}
        new Plain(1, 2)
        "#,
    );
    assert!(matches!(err, VoltError::Runtime(_)));
}
