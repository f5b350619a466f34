//! Tokenizer implementation
//! Main lexer structure and token generation logic

use std::iter::Peekable;
use std::str::Chars;

use super::tokens::*;
use crate::util::span::{FileName, Location, Position};

/// Main lexer structure
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
    file: FileName,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source
    pub fn new(
        source: &'a str,
        file: FileName,
    ) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            file,
        }
    }

    /// Get current position
    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Get start position of current token
    pub fn start_position(&self) -> Position {
        Position::new(self.start_line, self.start_column)
    }

    fn start_location(&self) -> Location {
        Location::new(self.file.clone(), self.start_position())
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        match self.chars.next() {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
                Some('\n')
            }
            Some(c) => {
                self.column += 1;
                Some(c)
            }
            None => None,
        }
    }

    /// Peek at next character
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Peek at character after next
    fn peek_next(&self) -> Option<char> {
        self.chars.clone().nth(1)
    }

    /// Skip whitespace and comments
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '/' if self.peek_next() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                '/' if self.peek_next() == Some('*') => {
                    self.start_line = self.line;
                    self.start_column = self.column;
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(LexError::UnterminatedComment {
                                    location: self.start_location(),
                                })
                            }
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Generate next token, `None` at end of input
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace_and_comments()?;

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        self.start_line = self.line;
        self.start_column = self.column;

        let token = match c {
            c if c.is_ascii_alphabetic() || c == '_' || c == '$' => self.scan_identifier(),
            c if c.is_ascii_digit() => self.scan_number(),
            '"' | '\'' => self.scan_string(c)?,
            c if PUNCTUATION.contains(&c) => {
                self.advance();
                self.make_token(c.to_string(), TokenTag::Punct)
            }
            c => self.scan_operator(c)?,
        };

        Ok(Some(token))
    }

    /// Scan identifier, keyword or `name!` reference
    fn scan_identifier(&mut self) -> Token {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // `name!` but not `name != ...`
        if self.peek() == Some('!') && self.peek_next() != Some('=') {
            self.advance();
            value.push('!');
            return self.make_token(value, TokenTag::MacroRef);
        }

        let tag = if KEYWORDS.contains(&value.as_str()) {
            TokenTag::Keyword
        } else {
            TokenTag::Ident
        };
        self.make_token(value, tag)
    }

    /// Scan a numeric literal: the maximal run of alphanumerics, with
    /// a `.` allowed when a digit follows it
    fn scan_number(&mut self) -> Token {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                value.push(c);
                self.advance();
            } else if c == '.' && self.peek_next().is_some_and(|n| n.is_ascii_digit()) {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }
        self.make_token(value, TokenTag::Number)
    }

    /// Scan a quoted literal, keeping quotes and escapes verbatim
    fn scan_string(
        &mut self,
        quote: char,
    ) -> Result<Token, LexError> {
        let mut value = String::new();
        value.push(quote);
        self.advance();

        loop {
            match self.advance() {
                Some('\\') => {
                    value.push('\\');
                    match self.advance() {
                        Some(c) => value.push(c),
                        None => break,
                    }
                }
                Some(c) if c == quote => {
                    value.push(c);
                    return Ok(self.make_token(value, TokenTag::Str));
                }
                Some(c) => value.push(c),
                None => break,
            }
        }

        Err(LexError::UnterminatedString {
            location: self.start_location(),
        })
    }

    /// Scan an operator with maximal munch
    fn scan_operator(
        &mut self,
        first: char,
    ) -> Result<Token, LexError> {
        if let Some(second) = self.peek_next() {
            let pair: String = [first, second].iter().collect();
            if MULTI_CHAR_OPS.contains(&pair.as_str()) {
                self.advance();
                self.advance();
                return Ok(self.make_token(pair, TokenTag::Op));
            }
        }

        if SINGLE_CHAR_OPS.contains(&first) {
            self.advance();
            return Ok(self.make_token(first.to_string(), TokenTag::Op));
        }

        Err(LexError::UnexpectedChar {
            location: self.start_location(),
            ch: first,
        })
    }

    /// Create token at the current token start
    fn make_token(
        &self,
        text: String,
        tag: TokenTag,
    ) -> Token {
        Token::new(text, tag, self.start_position(), self.file.clone())
    }
}
