//! Hand-rolled left-to-right scanner (§4.1).
//!
//! Follows the teacher crate's `Peekable<Chars>` + running `(line, col)`
//! approach (see the original `src/lexer/mod.rs`), extended with string
//! escapes, interpolated strings and the full Volt operator/keyword set.

mod token;

pub use token::*;

use crate::error::{LexError, Position};

pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

type LexResult<T> = Result<T, LexError>;

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    fn error(&self, message: impl Into<String>, position: Position) -> LexError {
        LexError {
            message: message.into(),
            position,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek2(&self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next()
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.chars.next()?;
        if next == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(next)
    }

    fn position(&self) -> Position {
        (self.line, self.col)
    }

    pub fn lex(mut self) -> LexResult<Vec<Token>> {
        loop {
            self.skip_insignificant_whitespace();

            let Some(c) = self.peek() else {
                break;
            };

            let position = self.position();

            match c {
                '\n' => {
                    self.advance();
                    self.tokens.push(Token::new(TokenKind::Newline, position));
                }
                'f' if matches!(self.peek2(), Some('"') | Some('\'')) => {
                    self.advance();
                    let quote = self.advance().expect("quote after 'f' prefix");
                    self.lex_string(quote, true)?;
                }
                'a'..='z' | 'A'..='Z' | '_' => self.lex_identifier_or_keyword()?,
                '0'..='9' => self.lex_number()?,
                '"' | '\'' => self.lex_string(c, false)?,
                _ => self.lex_operator()?,
            }
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, self.position()));

        Ok(self.tokens)
    }

    /// Consumes spaces/tabs and `--` line comments. Newlines are significant
    /// and are handled by the caller.
    fn skip_insignificant_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') => {
                    self.advance();
                }
                Some('-') if self.peek2() == Some('-') => {
                    self.advance();
                    self.advance();
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_identifier_or_keyword(&mut self) -> LexResult<()> {
        let position = self.position();
        let mut word = String::new();

        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let kind = match word.to_lowercase().as_str() {
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            "null" => TokenKind::Null,
            _ => match Keyword::from_str(&word) {
                Some(keyword) => TokenKind::Keyword(keyword),
                None => TokenKind::Identifier(word),
            },
        };

        self.tokens.push(Token::new(kind, position));
        Ok(())
    }

    /// Integers and floats are distinguished by a `.` immediately followed by
    /// a digit; a lone trailing dot terminates the number (§4.1).
    fn lex_number(&mut self) -> LexResult<()> {
        let position = self.position();
        let mut text = String::new();

        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let is_float =
            self.peek() == Some('.') && matches!(self.peek2(), Some(d) if d.is_ascii_digit());

        if is_float {
            text.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }

            let value = text
                .parse::<f64>()
                .map_err(|_| self.error(format!("invalid float literal '{text}'"), position))?;
            self.tokens
                .push(Token::new(TokenKind::Float(value), position));
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| self.error(format!("invalid integer literal '{text}'"), position))?;
            self.tokens
                .push(Token::new(TokenKind::Integer(value), position));
        }

        Ok(())
    }

    fn escape(&self, c: char) -> Option<char> {
        Some(match c {
            'n' => '\n',
            't' => '\t',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            '{' => '{',
            '}' => '}',
            '0' => '\0',
            _ => return None,
        })
    }

    /// Strings may not contain raw newlines. `interpolated` strings are
    /// prefixed by `f` and carry fragments of literal/expression text
    /// (§3, §4.1).
    fn lex_string(&mut self, quote: char, interpolated: bool) -> LexResult<()> {
        let position = self.position();
        if !interpolated {
            // the `f"..."` case already consumed the opening quote.
            self.advance();
        }

        let mut fragments = Vec::new();
        let mut literal = String::new();

        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string literal", position)),
                Some('\n') => return Err(self.error("unterminated string literal", position)),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.advance() {
                        None => return Err(self.error("unterminated string literal", position)),
                        Some(escaped) => match self.escape(escaped) {
                            Some(resolved) => literal.push(resolved),
                            None => {
                                literal.push('\\');
                                literal.push(escaped);
                            }
                        },
                    }
                }
                Some('{') if interpolated => {
                    if !literal.is_empty() {
                        fragments.push(StringFragment::Literal(std::mem::take(&mut literal)));
                    }
                    let expr = self.lex_interpolation_expr(position)?;
                    fragments.push(StringFragment::Expression(expr));
                }
                Some(c) => {
                    literal.push(c);
                    self.advance();
                }
            }
        }

        if interpolated {
            if !literal.is_empty() {
                fragments.push(StringFragment::Literal(literal));
            }
            self.tokens
                .push(Token::new(TokenKind::InterpolatedStr(fragments), position));
        } else {
            self.tokens
                .push(Token::new(TokenKind::Str(literal), position));
        }

        Ok(())
    }

    /// Reads the raw source of one `{ ... }` region, tracking nested braces
    /// and skipping over quoted strings so that embedded strings may
    /// themselves contain braces (§4.1).
    fn lex_interpolation_expr(&mut self, string_start: Position) -> LexResult<String> {
        self.advance(); // consume '{'
        let mut depth = 1usize;
        let mut expr = String::new();

        loop {
            match self.peek() {
                None => return Err(self.error("unterminated interpolation", string_start)),
                Some('{') => {
                    depth += 1;
                    expr.push('{');
                    self.advance();
                }
                Some('}') => {
                    depth -= 1;
                    self.advance();
                    if depth == 0 {
                        break;
                    }
                    expr.push('}');
                }
                Some(q @ ('"' | '\'')) => {
                    expr.push(q);
                    self.advance();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(self.error("unterminated interpolation", string_start))
                            }
                            Some('\\') => {
                                expr.push('\\');
                                self.advance();
                                if let Some(escaped) = self.advance() {
                                    expr.push(escaped);
                                }
                            }
                            Some(c) if c == q => {
                                expr.push(c);
                                self.advance();
                                break;
                            }
                            Some(c) => {
                                expr.push(c);
                                self.advance();
                            }
                        }
                    }
                }
                Some(c) => {
                    expr.push(c);
                    self.advance();
                }
            }
        }

        Ok(expr)
    }

    fn lex_operator(&mut self) -> LexResult<()> {
        let position = self.position();
        let c = self.advance().expect("checked by caller");

        let kind = match c {
            '=' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::EqEq
                } else if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::FatArrow
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '-' => {
                if self.peek() == Some('>') {
                    self.advance();
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '+' => TokenKind::Plus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            other => return Err(self.error(format!("unknown character '{other}'"), position)),
        };

        self.tokens.push(Token::new(kind, position));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .lex()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_arithmetic() {
        assert_eq!(
            kinds("1 + 2"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Plus,
                TokenKind::Integer(2),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn number_dot_method_call() {
        assert_eq!(
            kinds("5.method()"),
            vec![
                TokenKind::Integer(5),
                TokenKind::Dot,
                TokenKind::Identifier("method".into()),
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn float_literal() {
        assert_eq!(kinds("3.14"), vec![TokenKind::Float(3.14), TokenKind::Eof]);
    }

    #[test]
    fn keyword_is_case_insensitive() {
        assert_eq!(
            kinds("IF"),
            vec![TokenKind::Keyword(Keyword::If), TokenKind::Eof]
        );
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(
            kinds("== != <= >= -> =>"),
            vec![
                TokenKind::EqEq,
                TokenKind::NotEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::Arrow,
                TokenKind::FatArrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\q""#),
            vec![TokenKind::Str("a\nb\\q".into()), TokenKind::Eof]
        );
    }

    #[test]
    fn interpolated_string_fragments() {
        let tokens = kinds(r#"f"a{1+1}b{ "{}" }c""#);
        let TokenKind::InterpolatedStr(fragments) = &tokens[0] else {
            panic!("expected interpolated string, got {:?}", tokens[0]);
        };
        assert_eq!(
            fragments,
            &vec![
                StringFragment::Literal("a".into()),
                StringFragment::Expression("1+1".into()),
                StringFragment::Literal("b".into()),
                StringFragment::Expression(" \"{}\" ".into()),
                StringFragment::Literal("c".into()),
            ]
        );
    }

    #[test]
    fn unterminated_string_reports_position() {
        let err = Lexer::new("\"abc").lex().unwrap_err();
        assert_eq!(err.position, (1, 1));
    }

    #[test]
    fn line_comment() {
        assert_eq!(
            kinds("1 -- trailing comment\n2"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Newline,
                TokenKind::Integer(2),
                TokenKind::Eof
            ]
        );
    }
}
