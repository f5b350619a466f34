//! Lexer module
//!
//! Text to token sequence. Re-entrant: the same entry point lexes source
//! files, macro program output, define bodies and rule patterns.

pub mod tokenizer;
pub mod tokens;

#[cfg(test)]
mod tests;

pub use tokenizer::Lexer;
pub use tokens::{join_text, LexError, Token, TokenTag};

use crate::util::span::FileName;

/// Tokenize source text attributed to `filename`
pub fn lex(
    source: &str,
    filename: &str,
) -> Result<Vec<Token>, LexError> {
    lex_in(source, FileName::new(filename))
}

/// Tokenize source text with an already shared file name
pub fn lex_in(
    source: &str,
    file: FileName,
) -> Result<Vec<Token>, LexError> {
    tracing::debug!("Lexing {} ({} bytes)", file, source.len());

    let mut lexer = Lexer::new(source, file);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    tracing::debug!("Lexed {} tokens", tokens.len());
    Ok(tokens)
}
