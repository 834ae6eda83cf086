use super::{PResult, Parser};
use crate::ast::{BinaryOp, Expr, InterpPart, Param, UnaryOp};
use crate::error::Position;
use crate::lexer::{Keyword, Lexer, StringFragment, TokenKind};

impl Parser {
    /// Entry point used by statement parsing; lowest-precedence level.
    pub(super) fn parse_or(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_and()?;
        while self.check_keyword(Keyword::Or) {
            let position = self.position();
            self.advance();
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs), position);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_not()?;
        while self.check_keyword(Keyword::And) {
            let position = self.position();
            self.advance();
            let rhs = self.parse_not()?;
            lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs), position);
        }
        Ok(lhs)
    }

    /// `not` is right-associative and sits above `and`/`or` but below
    /// comparison in the precedence table (§4.2).
    fn parse_not(&mut self) -> PResult<Expr> {
        if self.check_keyword(Keyword::Not) || self.check(&TokenKind::Bang) {
            let position = self.position();
            self.advance();
            let operand = self.parse_not()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand), position));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            let position = self.position();
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), position);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            let position = self.position();
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), position);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            let position = self.position();
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), position);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        if self.check(&TokenKind::Minus) {
            let position = self.position();
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand), position));
        }
        self.parse_postfix_expr()
    }

    /// Postfix chain of `.member`, `[index]` and `(call)`; also used
    /// directly by `push`/`pop` target parsing, which wants an lvalue-shaped
    /// expression without binary operators.
    pub(super) fn parse_postfix_expr(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.peek_kind() {
                TokenKind::Dot => {
                    let position = self.position();
                    self.advance();

                    let name = self.expect_property_name()?;
                    if self.check(&TokenKind::LParen) {
                        let args = self.parse_call_args()?;
                        expr = Expr::MethodCall(Box::new(expr), name, args, position);
                    } else {
                        expr = Expr::Member(Box::new(expr), name, position);
                    }
                }
                TokenKind::LBracket => {
                    let position = self.position();
                    self.advance();
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::Index(Box::new(expr), Box::new(index), position);
                }
                TokenKind::LParen => {
                    let position = self.position();
                    let args = self.parse_call_args()?;
                    expr = Expr::Call(Box::new(expr), args, position);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_call_args(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if self.check(&TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let position = self.position();

        match self.peek_kind().clone() {
            TokenKind::Integer(value) => {
                self.advance();
                Ok(Expr::Integer(value, position))
            }
            TokenKind::Float(value) => {
                self.advance();
                Ok(Expr::Float(value, position))
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(Expr::Str(value, position))
            }
            TokenKind::InterpolatedStr(fragments) => {
                self.advance();
                self.parse_interpolated(fragments, position)
            }
            TokenKind::Boolean(value) => {
                self.advance();
                Ok(Expr::Boolean(value, position))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Null(position))
            }
            TokenKind::Keyword(Keyword::This) => {
                self.advance();
                Ok(Expr::This(position))
            }
            TokenKind::Keyword(Keyword::New) => {
                self.advance();
                let name = self.expect_identifier()?;
                let args = self.parse_call_args()?;
                Ok(Expr::New(name, args, position))
            }
            TokenKind::Keyword(Keyword::Super) => {
                self.advance();
                self.expect(TokenKind::Dot, "'.'")?;
                let method = self.expect_property_name()?;
                let args = self.parse_call_args()?;
                Ok(Expr::SuperCall(method, args, position))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expr::Identifier(name, position))
            }
            TokenKind::LBracket => self.parse_list_literal(position),
            TokenKind::LBrace => self.parse_dict_literal(position),
            TokenKind::LParen => self.parse_paren_or_lambda(position),
            other => Err(self.error(format!("unexpected token {other:?} in expression"))),
        }
    }

    fn parse_list_literal(&mut self, position: Position) -> PResult<Expr> {
        self.advance(); // '['
        self.skip_newlines();
        let mut items = Vec::new();
        if !self.check(&TokenKind::RBracket) {
            loop {
                self.skip_newlines();
                items.push(self.parse_expr()?);
                self.skip_newlines();
                if self.check(&TokenKind::Comma) {
                    self.advance();
                    self.skip_newlines();
                } else {
                    break;
                }
            }
        }
        self.skip_newlines();
        self.expect(TokenKind::RBracket, "']'")?;
        Ok(Expr::List(items, position))
    }

    /// A bare identifier key (`{code: 42}`) becomes a string-literal key,
    /// not a variable lookup; anything else is a full key expression.
    fn parse_dict_literal(&mut self, position: Position) -> PResult<Expr> {
        self.advance(); // '{'
        self.skip_newlines();
        let mut entries = Vec::new();
        if !self.check(&TokenKind::RBrace) {
            loop {
                self.skip_newlines();
                let key = self.parse_dict_key()?;
                self.expect(TokenKind::Colon, "':'")?;
                let value = self.parse_expr()?;
                entries.push((key, value));
                self.skip_newlines();
                if self.check(&TokenKind::Comma) {
                    self.advance();
                    self.skip_newlines();
                } else {
                    break;
                }
            }
        }
        self.skip_newlines();
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Expr::Dict(entries, position))
    }

    fn parse_dict_key(&mut self) -> PResult<Expr> {
        let position = self.position();
        if let TokenKind::Identifier(name) = self.peek_kind().clone() {
            self.advance();
            return Ok(Expr::Str(name, position));
        }
        self.parse_expr()
    }

    /// Disambiguates a lambda head from a parenthesised expression with one
    /// bounded backtrack (§4.2, §9): speculatively parse `(params) =>`, and
    /// rewind to a plain grouped expression if that fails.
    fn parse_paren_or_lambda(&mut self, position: Position) -> PResult<Expr> {
        let checkpoint = self.mark();
        if let Ok(params) = self.try_parse_lambda_params() {
            if self.check(&TokenKind::FatArrow) {
                self.advance();
                let body = self.parse_expr()?;
                return Ok(Expr::Lambda(params, Box::new(body), position));
            }
        }
        self.reset(checkpoint);

        self.advance(); // '('
        self.skip_newlines();
        let inner = self.parse_expr()?;
        self.skip_newlines();
        self.expect(TokenKind::RParen, "')'")?;
        Ok(inner)
    }

    fn try_parse_lambda_params(&mut self) -> PResult<Vec<Param>> {
        self.advance(); // '('
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

    /// Re-lexes and re-parses each expression fragment of an interpolated
    /// string (§4.2).
    fn parse_interpolated(
        &mut self,
        fragments: Vec<StringFragment>,
        position: Position,
    ) -> PResult<Expr> {
        let mut parts = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            match fragment {
                StringFragment::Literal(text) => parts.push(InterpPart::Literal(text)),
                StringFragment::Expression(source) => {
                    let tokens = Lexer::new(&source).lex().map_err(|err| crate::error::ParseError {
                        message: format!("invalid interpolated expression: {err}"),
                        position,
                    })?;
                    let expr = Parser::new(tokens).parse_expr()?;
                    parts.push(InterpPart::Expr(expr));
                }
            }
        }
        Ok(Expr::InterpolatedStr(parts, position))
    }
}
