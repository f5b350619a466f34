//! Read position over a token slice

use crate::frontend::lexer::{Token, TokenTag};
use crate::util::diagnostic::{CompileError, Result};
use crate::util::span::Location;

pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Location reported once the slice is exhausted
    end: Location,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let end = tokens.last().map(Token::location).unwrap_or_default();
        Self { tokens, pos: 0, end }
    }

    /// Cursor whose end-of-input errors point at `end`
    pub fn with_end(
        tokens: &'a [Token],
        end: Location,
    ) -> Self {
        Self { tokens, pos: 0, end }
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_at(
        &self,
        offset: usize,
    ) -> Option<&'a Token> {
        self.tokens.get(self.pos + offset)
    }

    pub fn peek_is(
        &self,
        text: &str,
    ) -> bool {
        self.peek().is_some_and(|t| t.is(text))
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn location(&self) -> Location {
        self.peek().map(Token::location).unwrap_or_else(|| self.end.clone())
    }

    pub fn error(
        &self,
        message: impl Into<String>,
    ) -> CompileError {
        CompileError::sequence(self.location(), message)
    }

    pub fn next(&mut self) -> Result<&'a Token> {
        let token = self
            .tokens
            .get(self.pos)
            .ok_or_else(|| self.error("unexpected end of input"))?;
        self.pos += 1;
        Ok(token)
    }

    pub fn eat(
        &mut self,
        text: &str,
    ) -> bool {
        if self.peek_is(text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn expect(
        &mut self,
        text: &str,
    ) -> Result<&'a Token> {
        match self.peek() {
            Some(t) if t.is(text) => {
                self.pos += 1;
                Ok(t)
            }
            Some(t) => Err(self.error(format!("expected `{}`, found `{}`", text, t.text))),
            None => Err(self.error(format!("expected `{}`, found end of input", text))),
        }
    }

    pub fn expect_ident(&mut self) -> Result<&'a Token> {
        match self.peek() {
            Some(t) if t.tag == TokenTag::Ident => {
                self.pos += 1;
                Ok(t)
            }
            Some(t) => Err(self.error(format!("expected a name, found `{}`", t.text))),
            None => Err(self.error("expected a name, found end of input")),
        }
    }

    /// At `open`: the tokens up to its matching `close`, consumed along
    /// with both brackets
    pub fn group(
        &mut self,
        open: &str,
        close: &str,
    ) -> Result<&'a [Token]> {
        let start_location = self.location();
        self.expect(open)?;
        let start = self.pos;
        let mut depth = 1;
        while let Some(token) = self.tokens.get(self.pos) {
            if token.is(open) {
                depth += 1;
            } else if token.is(close) {
                depth -= 1;
                if depth == 0 {
                    let inner = &self.tokens[start..self.pos];
                    self.pos += 1;
                    return Ok(inner);
                }
            }
            self.pos += 1;
        }
        Err(CompileError::sequence(start_location, format!("unclosed `{}`", open)))
    }

    /// Tokens up to (not including) the first `stop` outside brackets;
    /// the stop token itself is left in place
    pub fn until(
        &mut self,
        stops: &[&str],
    ) -> &'a [Token] {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.tokens.get(self.pos) {
            if depth == 0 && stops.iter().any(|s| token.is(s)) {
                break;
            }
            match token.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.pos += 1;
        }
        &self.tokens[start..self.pos]
    }

    /// Everything not consumed yet
    pub fn rest(&mut self) -> &'a [Token] {
        let rest = &self.tokens[self.pos.min(self.tokens.len())..];
        self.pos = self.tokens.len();
        rest
    }
}

/// Split at commas outside brackets; an empty slice gives no parts
pub fn split_commas(tokens: &[Token]) -> Vec<&[Token]> {
    if tokens.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        match token.text.as_str() {
            "(" | "[" | "{" | "<" => depth += 1,
            ")" | "]" | "}" | ">" => depth = depth.saturating_sub(1),
            "," if depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
}
