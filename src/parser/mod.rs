//! Recursive-descent parser with precedence climbing (§4.2).
//!
//! The cursor shape (index into a `Vec<Token>`, `peek`/`advance`) follows the
//! teacher crate's `Tokens<T>` iterator in `src/lexer/tokens.rs`; the
//! grammar itself is new since the teacher drives its parser from a pest
//! grammar file rather than hand-written descent.

mod expr;

use crate::ast::{
    ClassDecl, Expr, IfArm, MatchArm, Param, Program, Stmt,
};
use crate::error::{ParseError, Position};
use crate::lexer::{Keyword, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

type PResult<T> = Result<T, ParseError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    fn current(&self) -> &Token {
        self.tokens
            .get(self.index)
            .unwrap_or_else(|| self.tokens.last().expect("token stream always has EOF"))
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn position(&self) -> Position {
        self.current().position
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek_kind(), TokenKind::Keyword(k) if *k == keyword)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            position: self.position(),
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> PResult<Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!(
                "expected {what}, found {:?}",
                self.peek_kind()
            )))
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> PResult<Token> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.error(format!(
                "expected '{}', found {:?}",
                keyword.as_str(),
                self.peek_kind()
            )))
        }
    }

    fn expect_identifier(&mut self) -> PResult<String> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(self.error(format!("expected identifier, found {other:?}"))),
        }
    }

    /// `.` followed by a keyword is accepted as a property name (§4.2) so
    /// that `list.push` etc. keep working despite the lexer reserving those
    /// words.
    fn expect_property_name(&mut self) -> PResult<String> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            TokenKind::Keyword(k) => {
                self.advance();
                Ok(k.as_str().to_owned())
            }
            other => Err(self.error(format!("expected property name, found {other:?}"))),
        }
    }

    fn skip_newlines(&mut self) {
        while self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    fn at_end(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    /// Checkpoint/rewind pair backing the lambda-vs-parenthesised-expression
    /// backtrack in `parser::expr` (§4.2, §9).
    fn mark(&self) -> usize {
        self.index
    }

    fn reset(&mut self, checkpoint: usize) {
        self.index = checkpoint;
    }

    fn end_of_statement(&mut self) {
        // Newlines terminate statements but are otherwise insignificant;
        // one is enough, the rest are swallowed by the next skip_newlines.
        if self.check(&TokenKind::Newline) {
            self.advance();
        }
    }

    pub fn parse_program(mut self) -> PResult<Program> {
        let mut statements = Vec::new();
        self.skip_newlines();
        while !self.at_end() {
            statements.push(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(Program { statements })
    }

    fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_newlines();
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error("unterminated block, expected '}'"));
            }
            statements.push(self.parse_statement()?);
            self.skip_newlines();
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(statements)
    }

    fn parse_statement(&mut self) -> PResult<Stmt> {
        match self.peek_kind().clone() {
            TokenKind::Keyword(Keyword::Set) => self.parse_set(),
            TokenKind::Keyword(Keyword::Show) => self.parse_show(),
            TokenKind::Keyword(Keyword::Ask) => self.parse_ask(),
            TokenKind::Keyword(Keyword::If) => self.parse_if(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::For) => self.parse_for(),
            TokenKind::Keyword(Keyword::Func) => self.parse_func_decl(),
            TokenKind::Keyword(Keyword::Return) => self.parse_return(),
            TokenKind::Keyword(Keyword::Break) => {
                let position = self.position();
                self.advance();
                self.end_of_statement();
                Ok(Stmt::Break(position))
            }
            TokenKind::Keyword(Keyword::Continue) => {
                let position = self.position();
                self.advance();
                self.end_of_statement();
                Ok(Stmt::Continue(position))
            }
            TokenKind::Keyword(Keyword::Push) => self.parse_push(),
            TokenKind::Keyword(Keyword::Pop) => self.parse_pop(),
            TokenKind::Keyword(Keyword::Class) => self.parse_class(),
            TokenKind::Keyword(Keyword::Match) => self.parse_match(),
            TokenKind::Keyword(Keyword::Try) => self.parse_try(),
            TokenKind::Keyword(Keyword::Throw) => self.parse_throw(),
            TokenKind::Keyword(Keyword::Use) => self.parse_use(),
            _ => {
                let expr = self.parse_expr()?;
                self.end_of_statement();
                Ok(Stmt::Expr(expr))
            }
        }
    }

    fn parse_set(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance(); // 'set'

        if self.check(&TokenKind::LBracket) {
            return self.parse_destructure_list(position);
        }
        if self.check(&TokenKind::LBrace) {
            return self.parse_destructure_dict(position);
        }

        let target = self.parse_assignment_target()?;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expr()?;
        self.end_of_statement();
        Ok(Stmt::Assign(target, value, position))
    }

    fn parse_destructure_list(&mut self, position: Position) -> PResult<Stmt> {
        self.expect(TokenKind::LBracket, "'['")?;
        let mut names = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                names.push(self.expect_identifier()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBracket, "']'")?;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expr()?;
        self.end_of_statement();
        Ok(Stmt::DestructureList(names, value, position))
    }

    fn parse_destructure_dict(&mut self, position: Position) -> PResult<Stmt> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut names = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                names.push(self.expect_identifier()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expr()?;
        self.end_of_statement();
        Ok(Stmt::DestructureDict(names, value, position))
    }

    /// A single identifier, `this`, or a chain of `.`/`[]` accesses rooted
    /// at either, per the assignment-target grammar in §4.2.
    fn parse_assignment_target(&mut self) -> PResult<Expr> {
        let position = self.position();
        let mut target = match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Expr::Identifier(name, position)
            }
            TokenKind::Keyword(Keyword::This) => {
                self.advance();
                Expr::This(position)
            }
            other => return Err(self.error(format!("invalid assignment target {other:?}"))),
        };

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    let pos = self.position();
                    self.advance();
                    let name = self.expect_property_name()?;
                    target = Expr::Member(Box::new(target), name, pos);
                }
                TokenKind::LBracket => {
                    let pos = self.position();
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    target = Expr::Index(Box::new(target), Box::new(index), pos);
                }
                _ => break,
            }
        }

        Ok(target)
    }

    fn parse_show(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let expr = self.parse_expr()?;
        self.end_of_statement();
        Ok(Stmt::Show(expr, position))
    }

    /// `ask <ident>` or `ask <prompt-expr>, <ident>` (§4.3; concrete syntax
    /// is a Volt-specific design decision, see DESIGN.md).
    fn parse_ask(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let first = self.parse_expr()?;
        if self.check(&TokenKind::Comma) {
            self.advance();
            let name = self.expect_identifier()?;
            self.end_of_statement();
            Ok(Stmt::Ask(Some(first), name, position))
        } else {
            let name = match first {
                Expr::Identifier(name, _) => name,
                _ => return Err(self.error("'ask' target must be an identifier")),
            };
            self.end_of_statement();
            Ok(Stmt::Ask(None, name, position))
        }
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let mut arms = vec![self.parse_if_arm()?];
        let mut else_body = None;

        loop {
            self.skip_newlines_before_else();
            if self.check_keyword(Keyword::Else) {
                self.advance();
                if self.check_keyword(Keyword::If) {
                    self.advance();
                    arms.push(self.parse_if_arm()?);
                    continue;
                } else {
                    else_body = Some(self.parse_block()?);
                    break;
                }
            }
            break;
        }

        Ok(Stmt::If(arms, else_body, position))
    }

    /// Allows `}<newline>else` by peeking past newlines without consuming
    /// them when no `else` follows.
    fn skip_newlines_before_else(&mut self) {
        let checkpoint = self.index;
        self.skip_newlines();
        if !self.check_keyword(Keyword::Else) {
            self.index = checkpoint;
        }
    }

    fn parse_if_arm(&mut self) -> PResult<IfArm> {
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(IfArm { condition, body })
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let condition = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::While(condition, body, position))
    }

    /// Disambiguates the three `for` shapes (§4.2) with one token of
    /// lookahead plus a rewind: only `ident in`/`ident ,` commit to
    /// range/iterate form, everything else rewinds and is parsed as
    /// repeat-N-times.
    fn parse_for(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let checkpoint = self.index;

        if let TokenKind::Identifier(name) = self.peek_kind().clone() {
            self.advance();

            if self.check_keyword(Keyword::In) {
                self.advance();
                let source = self.parse_expr()?;
                if self.check_keyword(Keyword::To) {
                    self.advance();
                    let end = self.parse_expr()?;
                    let body = self.parse_block()?;
                    return Ok(Stmt::RangeFor(name, source, end, body, position));
                }
                let body = self.parse_block()?;
                return Ok(Stmt::IterateFor(name, None, source, body, position));
            }

            if self.check(&TokenKind::Comma) {
                self.advance();
                let second = self.expect_identifier()?;
                self.expect_keyword(Keyword::In)?;
                let source = self.parse_expr()?;
                let body = self.parse_block()?;
                return Ok(Stmt::IterateFor(name, Some(second), source, body, position));
            }
        }

        self.index = checkpoint;
        let count = self.parse_expr()?;
        let body = self.parse_block()?;
        Ok(Stmt::RepeatNTimes(count, body, position))
    }

    fn parse_params(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let name = self.expect_identifier()?;
                let default = if self.check(&TokenKind::Eq) {
                    self.advance();
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                params.push(Param { name, default });
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(params)
    }

    fn parse_func_decl(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let name = self.expect_identifier()?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        Ok(Stmt::FuncDecl(name, params, body, position))
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let value = if self.check(&TokenKind::Newline)
            || self.check(&TokenKind::RBrace)
            || self.at_end()
        {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.end_of_statement();
        Ok(Stmt::Return(value, position))
    }

    /// `push <lvalue-expr> <value-expr>`: the target is parsed with the
    /// restricted (no-binary-operator) grammar so that e.g. `push b 4` does
    /// not require a separator between the two expressions.
    fn parse_push(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let target = self.parse_postfix_expr()?;
        let value = self.parse_expr()?;
        self.end_of_statement();
        Ok(Stmt::Push(target, value, position))
    }

    fn parse_pop(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let target = self.parse_postfix_expr()?;
        let index = if self.starts_expression() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.end_of_statement();
        Ok(Stmt::Pop(target, index, position))
    }

    fn starts_expression(&self) -> bool {
        !matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Eof | TokenKind::RBrace
        )
    }

    fn parse_throw(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let value = self.parse_expr()?;
        self.end_of_statement();
        Ok(Stmt::Throw(value, position))
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let body = self.parse_block()?;
        self.skip_newlines_before_else(); // reuse: peeks for catch/finally too
        let mut catch = None;
        if self.check_keyword(Keyword::Catch) {
            self.advance();
            let name = self.expect_identifier()?;
            catch = Some((name, self.parse_block()?));
        }
        let checkpoint = self.index;
        self.skip_newlines();
        let mut finally = None;
        if self.check_keyword(Keyword::Finally) {
            self.advance();
            finally = Some(self.parse_block()?);
        } else {
            self.index = checkpoint;
        }

        if catch.is_none() && finally.is_none() {
            return Err(self.error("'try' requires a 'catch' and/or 'finally' clause"));
        }

        Ok(Stmt::TryCatchFinally {
            body,
            catch,
            finally,
            position,
        })
    }

    fn parse_match(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let subject = self.parse_expr()?;
        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_newlines();
        let mut arms = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.check_keyword(Keyword::Case) {
                self.advance();
                let pattern = self.parse_expr()?;
                let body = self.parse_block()?;
                arms.push(MatchArm {
                    pattern: Some(pattern),
                    body,
                });
            } else if self.check_keyword(Keyword::Default) {
                self.advance();
                let body = self.parse_block()?;
                arms.push(MatchArm {
                    pattern: None,
                    body,
                });
            } else {
                return Err(self.error("expected 'case' or 'default' in match body"));
            }
            self.skip_newlines();
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Stmt::Match(subject, arms, position))
    }

    fn parse_class(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let name = self.expect_identifier()?;
        let parent = if self.check_keyword(Keyword::Extends) {
            self.advance();
            Some(self.expect_identifier()?)
        } else {
            None
        };

        self.expect(TokenKind::LBrace, "'{'")?;
        self.skip_newlines();
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            self.expect_keyword(Keyword::Func)?;
            let method_name = self.expect_identifier()?;
            let params = self.parse_params()?;
            let body = self.parse_block()?;
            methods.push((method_name, params, body));
            self.skip_newlines();
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(Stmt::ClassDecl(
            ClassDecl {
                name,
                parent,
                methods,
            },
            position,
        ))
    }

    /// `use "path" [to alias]` (§4.5); `to` is reused as the aliasing
    /// keyword rather than introducing a new reserved word.
    fn parse_use(&mut self) -> PResult<Stmt> {
        let position = self.position();
        self.advance();
        let path = match self.peek_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                s
            }
            other => return Err(self.error(format!("expected module path string, found {other:?}"))),
        };
        let alias = if self.check_keyword(Keyword::To) {
            self.advance();
            Some(self.expect_identifier()?)
        } else {
            None
        };
        self.end_of_statement();
        Ok(Stmt::UseModule {
            path,
            alias,
            position,
        })
    }

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.parse_or()
    }
}
