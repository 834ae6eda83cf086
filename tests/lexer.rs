//! Integration coverage for the scanner (§4.1) driven over whole program
//! fragments rather than single tokens -- the per-token cases already live
//! as unit tests inside `src/lexer/mod.rs`.

use volt::lexer::{Keyword, Lexer, StringFragment, TokenKind};

fn kinds(src: &str) -> Vec<TokenKind> {
    Lexer::new(src).lex().unwrap().into_iter().map(|t| t.kind).collect()
}

#[test]
fn keywords_and_identifiers_in_a_function_header() {
    let found = kinds("func add(a, b) { return a + b }");
    assert_eq!(
        found,
        vec![
            TokenKind::Keyword(Keyword::Func),
            TokenKind::Identifier("add".into()),
            TokenKind::LParen,
            TokenKind::Identifier("a".into()),
            TokenKind::Comma,
            TokenKind::Identifier("b".into()),
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::Keyword(Keyword::Return),
            TokenKind::Identifier("a".into()),
            TokenKind::Plus,
            TokenKind::Identifier("b".into()),
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn class_header_with_extends_and_new() {
    let found = kinds("class Dog extends Animal {}\nset d = new Dog()");
    assert_eq!(
        found[0..6],
        [
            TokenKind::Keyword(Keyword::Class),
            TokenKind::Identifier("Dog".into()),
            TokenKind::Keyword(Keyword::Extends),
            TokenKind::Identifier("Animal".into()),
            TokenKind::LBrace,
            TokenKind::RBrace,
        ]
    );
    assert!(found.contains(&TokenKind::Keyword(Keyword::New)));
}

#[test]
fn match_case_default_keywords() {
    let found = kinds("match x { case 1 => show 1 default => show 0 }");
    assert!(found.contains(&TokenKind::Keyword(Keyword::Match)));
    assert!(found.contains(&TokenKind::Keyword(Keyword::Case)));
    assert!(found.contains(&TokenKind::Keyword(Keyword::Default)));
}

#[test]
fn try_catch_finally_throw_keywords_present() {
    let found = kinds("try { throw 1 } catch e { show e } finally { show 0 }");
    for kw in [Keyword::Try, Keyword::Catch, Keyword::Finally, Keyword::Throw] {
        assert!(found.contains(&TokenKind::Keyword(kw)), "missing {kw:?}");
    }
}

#[test]
fn use_module_statement() {
    let found = kinds(r#"use "math" to m"#);
    assert_eq!(found[0], TokenKind::Keyword(Keyword::Use));
    assert_eq!(found[1], TokenKind::Str("math".into()));
    assert_eq!(found[2], TokenKind::Keyword(Keyword::To));
}

#[test]
fn interpolated_string_inside_a_program() {
    let found = kinds(r#"set name = "world" show f"hello {name}!""#);
    let TokenKind::InterpolatedStr(fragments) = found.last().unwrap_or_else(|| {
        found.iter().find(|k| matches!(k, TokenKind::InterpolatedStr(_))).unwrap()
    }) else {
        panic!("expected an interpolated string token");
    };
    assert_eq!(
        fragments,
        &vec![
            StringFragment::Literal("hello ".into()),
            StringFragment::Expression("name".into()),
            StringFragment::Literal("!".into()),
        ]
    );
}

#[test]
fn newline_separates_statements() {
    let found = kinds("set a = 1\nset b = 2");
    assert!(found.contains(&TokenKind::Newline));
}

#[test]
fn unknown_character_is_a_lex_error() {
    let err = Lexer::new("set a = 1 @ 2").lex().unwrap_err();
    assert!(err.message.contains('@'));
}
