//! Integration coverage for the recursive-descent parser (§4.2): precedence
//! climbing, statement shapes and a handful of parse-error cases.

use volt::ast::{BinaryOp, Expr, Stmt};
use volt::lexer::Lexer;
use volt::parser::Parser;

fn parse(src: &str) -> Vec<Stmt> {
    let tokens = Lexer::new(src).lex().expect("lex");
    Parser::new(tokens).parse_program().expect("parse").statements
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let stmts = parse("show 1 + 2 * 3");
    let Stmt::Show(Expr::Binary(BinaryOp::Add, lhs, rhs, _), _) = &stmts[0] else {
        panic!("expected a binary add, got {:?}", stmts[0]);
    };
    assert!(matches!(**lhs, Expr::Integer(1, _)));
    assert!(matches!(**rhs, Expr::Binary(BinaryOp::Mul, _, _, _)));
}

#[test]
fn parens_override_precedence() {
    let stmts = parse("show (1 + 2) * 3");
    let Stmt::Show(Expr::Binary(BinaryOp::Mul, lhs, rhs, _), _) = &stmts[0] else {
        panic!("expected a binary mul, got {:?}", stmts[0]);
    };
    assert!(matches!(**lhs, Expr::Binary(BinaryOp::Add, _, _, _)));
    assert!(matches!(**rhs, Expr::Integer(3, _)));
}

#[test]
fn comparison_binds_looser_than_arithmetic() {
    let stmts = parse("show 1 + 1 == 2");
    assert!(matches!(&stmts[0], Stmt::Show(Expr::Binary(BinaryOp::Eq, _, _, _), _)));
}

#[test]
fn and_or_bind_looser_than_comparison() {
    let stmts = parse("show 1 < 2 and 3 < 4 or false");
    let Stmt::Show(Expr::Binary(BinaryOp::Or, lhs, _, _), _) = &stmts[0] else {
        panic!("expected top-level or, got {:?}", stmts[0]);
    };
    assert!(matches!(**lhs, Expr::Binary(BinaryOp::And, _, _, _)));
}

#[test]
fn method_chain_and_member_access_parse_left_to_right() {
    let stmts = parse("show a.b.c()");
    let Stmt::Show(Expr::MethodCall(receiver, name, args, _), _) = &stmts[0] else {
        panic!("expected a method call, got {:?}", stmts[0]);
    };
    assert_eq!(name, "c");
    assert!(args.is_empty());
    assert!(matches!(**receiver, Expr::Member(_, _, _)));
}

#[test]
fn if_else_if_else_chain() {
    let stmts = parse(
        r#"
        if x == 1 { show 1 } else if x == 2 { show 2 } else { show 0 }
        "#,
    );
    let Stmt::If(arms, else_body, _) = &stmts[0] else {
        panic!("expected an if statement, got {:?}", stmts[0]);
    };
    assert_eq!(arms.len(), 2);
    assert!(else_body.is_some());
}

#[test]
fn function_declaration_with_default_parameter() {
    let stmts = parse("func greet(name, greeting=\"hi\") { show greeting }");
    let Stmt::FuncDecl(name, params, body, _) = &stmts[0] else {
        panic!("expected a function declaration, got {:?}", stmts[0]);
    };
    assert_eq!(name, "greet");
    assert_eq!(params[0].name, "name");
    assert!(params[0].default.is_none());
    assert_eq!(params[1].name, "greeting");
    assert!(params[1].default.is_some());
    assert_eq!(body.len(), 1);
}

#[test]
fn class_decl_with_extends_and_methods() {
    let stmts = parse(
        r#"
        class Dog extends Animal {
            func init(name) { set this.name = name }
            func speak() { show this.name }
        }
        "#,
    );
    let Stmt::ClassDecl(decl, _) = &stmts[0] else {
        panic!("expected a class declaration, got {:?}", stmts[0]);
    };
    assert_eq!(decl.name, "Dog");
    assert_eq!(decl.parent.as_deref(), Some("Animal"));
    assert_eq!(decl.methods.len(), 2);
}

#[test]
fn dict_literal_with_bare_identifier_keys() {
    let stmts = parse("show {code: 42, msg: \"bad\"}");
    let Stmt::Show(Expr::Dict(entries, _), _) = &stmts[0] else {
        panic!("expected a dict literal, got {:?}", stmts[0]);
    };
    assert!(matches!(&entries[0].0, Expr::Str(k, _) if k == "code"));
}

#[test]
fn lambda_expression() {
    let stmts = parse("set double = (x) => x * 2");
    let Stmt::Assign(_, Expr::Lambda(params, body, _), _) = &stmts[0] else {
        panic!("expected a lambda assignment, got {:?}", stmts[0]);
    };
    assert_eq!(params.len(), 1);
    assert!(matches!(**body, Expr::Binary(BinaryOp::Mul, _, _, _)));
}

#[test]
fn missing_closing_paren_is_a_parse_error() {
    let tokens = Lexer::new("show (1 + 2").lex().unwrap();
    let err = Parser::new(tokens).parse_program().unwrap_err();
    assert!(err.position.0 >= 1);
}
