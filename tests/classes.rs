//! Integration coverage for classes, inheritance, `super` and `this` (§3, §4.3).

use volt::{run_source, Value};

fn globals(source: &str) -> volt::Interpreter {
    run_source("test", source).expect("program should evaluate")
}

fn get(interp: &volt::Interpreter, name: &str) -> Value {
    interp.globals.get(name).unwrap_or_else(|| panic!("'{name}' was never defined"))
}

#[test]
fn init_runs_on_construction_and_sets_properties() {
    let interp = globals(
        r#"
        class Point {
            func init(x, y) { set this.x = x set this.y = y }
        }
        set p = new Point(1, 2)
        set sum = p.x + p.y
        "#,
    );
    assert!(matches!(get(&interp, "sum"), Value::Int(3)));
}

#[test]
fn method_resolves_through_the_parent_chain() {
    let interp = globals(
        r#"
        class Animal {
            func speak() { return "..." }
        }
        class Dog extends Animal {}
        set d = new Dog()
        set sound = d.speak()
        "#,
    );
    match get(&interp, "sound") {
        Value::Str(s) => assert_eq!(*s, "..."),
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn overriding_method_shadows_the_parents() {
    let interp = globals(
        r#"
        class Animal { func speak() { return "..." } }
        class Dog extends Animal { func speak() { return "woof" } }
        set sound = new Dog().speak()
        "#,
    );
    match get(&interp, "sound") {
        Value::Str(s) => assert_eq!(*s, "woof"),
        other => panic!("expected a string, got {other:?}"),
    }
}

#[test]
fn super_call_dispatches_to_the_owning_parent_and_grandparent() {
    let interp = globals(
        r#"
        class A { func describe() { return 1 } }
        class B extends A { func describe() { return super.describe() + 1 } }
        class C extends B { func describe() { return super.describe() + 1 } }
        set result = new C().describe()
        "#,
    );
    assert!(matches!(get(&interp, "result"), Value::Int(3)));
}

#[test]
fn constructing_with_arguments_but_no_init_is_an_error() {
    let err = run_source(
        "test",
        r#"
        class Empty {}
        new Empty(1)
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, volt::VoltError::Runtime(_)));
}

#[test]
fn isinstance_walks_the_parent_chain() {
    let interp = globals(
        r#"
        class Animal {}
        class Dog extends Animal {}
        set d = new Dog()
        set isDog = isinstance(d, Dog)
        set isAnimal = isinstance(d, Animal)
        class Cat extends Animal {}
        set isCat = isinstance(d, Cat)
        "#,
    );
    assert!(matches!(get(&interp, "isDog"), Value::Bool(true)));
    assert!(matches!(get(&interp, "isAnimal"), Value::Bool(true)));
    assert!(matches!(get(&interp, "isCat"), Value::Bool(false)));
}

#[test]
fn a_property_holding_a_function_is_callable_as_a_method() {
    let interp = globals(
        r#"
        class Box {
            func init(f) { set this.f = f }
        }
        set b = new Box((x) => x + 1)
        set result = b.f(41)
        "#,
    );
    assert!(matches!(get(&interp, "result"), Value::Int(42)));
}
