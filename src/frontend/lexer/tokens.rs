//! Token types

use std::fmt;

use crate::util::span::{FileName, Location, Position};

/// Lexer error
#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("{location}: unterminated string literal")]
    UnterminatedString { location: Location },
    #[error("{location}: unterminated block comment")]
    UnterminatedComment { location: Location },
    #[error("{location}: unexpected character '{ch}'")]
    UnexpectedChar { location: Location, ch: char },
}

/// Token tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenTag {
    /// Plain identifier (including `$name` rule captures)
    Ident,
    /// Reserved word
    Keyword,
    /// `name!` reference to a macro, define or compiler macro
    MacroRef,
    /// Numeric literal, suffix included
    Number,
    /// Quoted literal, quotes included
    Str,
    /// Operator
    Op,
    /// Delimiter or separator
    Punct,
}

/// Reserved words
pub const KEYWORDS: &[&str] = &[
    "let", "if", "else", "while", "return", "break", "continue", "struct", "enum", "pre", "post",
    "true", "false",
];

/// Multi-character operators, longest first for maximal munch
pub const MULTI_CHAR_OPS: &[&str] = &[
    "->", "==", "!=", "<=", ">=", "&&", "||", "<<", ">>", "+=", "-=", "*=", "/=", "%=", "&=", "|=",
    "++", "--",
];

/// Single-character operators
pub const SINGLE_CHAR_OPS: &[char] = &['+', '-', '*', '/', '%', '<', '>', '=', '&', '|', '!', '^', '@', '.'];

/// Delimiters and separators
pub const PUNCTUATION: &[char] = &['(', ')', '{', '}', '[', ']', ',', ';', ':'];

/// A lexeme with its source position.
///
/// Tokens have value semantics: two tokens are equal when their text is
/// equal, wherever they came from.
#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub tag: TokenTag,
    pub pos: Position,
    pub file: FileName,
}

impl Token {
    /// Create a new token
    pub fn new(
        text: impl Into<String>,
        tag: TokenTag,
        pos: Position,
        file: FileName,
    ) -> Self {
        Self {
            text: text.into(),
            tag,
            pos,
            file,
        }
    }

    /// Create a compiler-made token, tagging it from its text and
    /// attributing it to `origin`'s location
    pub fn synthetic(
        text: impl Into<String>,
        origin: &Token,
    ) -> Self {
        let text = text.into();
        let tag = classify(&text);
        Self {
            text,
            tag,
            pos: origin.pos,
            file: origin.file.clone(),
        }
    }

    /// Create a compiler-made token with no meaningful location
    pub fn bare(text: impl Into<String>) -> Self {
        let text = text.into();
        let tag = classify(&text);
        Self {
            text,
            tag,
            pos: Position::dummy(),
            file: FileName::default(),
        }
    }

    /// Check the token text
    #[inline]
    pub fn is(
        &self,
        text: &str,
    ) -> bool {
        self.text == text
    }

    /// Name of a `name!` reference, without the bang
    pub fn macro_name(&self) -> Option<&str> {
        match self.tag {
            TokenTag::MacroRef => self.text.strip_suffix('!'),
            _ => None,
        }
    }

    /// Identifier or keyword
    pub fn is_word(&self) -> bool {
        matches!(self.tag, TokenTag::Ident | TokenTag::Keyword)
    }

    pub fn location(&self) -> Location {
        Location::new(self.file.clone(), self.pos)
    }
}

impl PartialEq for Token {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.text == other.text
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Infer a tag from token text alone
pub fn classify(text: &str) -> TokenTag {
    let Some(first) = text.chars().next() else {
        return TokenTag::Punct;
    };
    if first.is_ascii_alphabetic() || first == '_' || first == '$' {
        if text.ends_with('!') {
            TokenTag::MacroRef
        } else if KEYWORDS.contains(&text) {
            TokenTag::Keyword
        } else {
            TokenTag::Ident
        }
    } else if first.is_ascii_digit() {
        TokenTag::Number
    } else if first == '"' || first == '\'' {
        TokenTag::Str
    } else if MULTI_CHAR_OPS.contains(&text) || (text.len() == 1 && SINGLE_CHAR_OPS.contains(&first)) {
        TokenTag::Op
    } else {
        TokenTag::Punct
    }
}

/// Join token texts with single spaces
pub fn join_text(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_text_only() {
        let a = Token::new("x", TokenTag::Ident, Position::new(1, 1), FileName::new("a.oak"));
        let b = Token::new("x", TokenTag::Ident, Position::new(9, 4), FileName::new("b.oak"));
        assert_eq!(a, b);
        assert_ne!(a, Token::bare("y"));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("foo"), TokenTag::Ident);
        assert_eq!(classify("$x"), TokenTag::Ident);
        assert_eq!(classify("let"), TokenTag::Keyword);
        assert_eq!(classify("include!"), TokenTag::MacroRef);
        assert_eq!(classify("0xFF"), TokenTag::Number);
        assert_eq!(classify("\"hi\""), TokenTag::Str);
        assert_eq!(classify("<="), TokenTag::Op);
        assert_eq!(classify("^"), TokenTag::Op);
        assert_eq!(classify("{"), TokenTag::Punct);
    }

    #[test]
    fn test_macro_name() {
        assert_eq!(Token::bare("double!").macro_name(), Some("double"));
        assert_eq!(Token::bare("double").macro_name(), None);
    }

    #[test]
    fn test_synthetic_keeps_origin() {
        let origin = Token::new("+", TokenTag::Op, Position::new(4, 2), FileName::new("m.oak"));
        let made = Token::synthetic("Add", &origin);
        assert_eq!(made.tag, TokenTag::Ident);
        assert_eq!(made.pos, Position::new(4, 2));
        assert_eq!(made.file.as_str(), "m.oak");
    }
}
