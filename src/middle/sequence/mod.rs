//! Sequencing: macro-free, operator-substituted tokens to typed AST
//!
//! Definitions land in the symbol table and the struct and enum tables of
//! the compile context; function bodies become [`ASTNode`] trees hung off
//! their symbols. Generic definitions are recorded and instantiated on
//! first use (see [`crate::middle::generics`]).

pub mod ast;
pub mod calls;
pub mod cursor;
pub mod decl;
pub mod expr;
pub mod scope;
pub mod stmt;
pub mod symbols;
pub mod types;

#[cfg(test)]
mod tests;

pub use ast::{ASTKind, ASTNode};
pub use scope::ScopeStack;
pub use symbols::{EnumDef, StructDef, Symbol, SymbolKind, SymbolTable};

use tracing::debug;

use crate::driver::CompileContext;
use crate::frontend::lexer::Token;
use crate::util::diagnostic::Result;

/// Sequence one file's worth of tokens
pub fn sequence_file(
    ctx: &mut CompileContext,
    tokens: &[Token],
) -> Result<()> {
    let tokens = split_shift_closers(tokens);
    debug!("Sequencing {} tokens", tokens.len());
    decl::sequence_definitions(ctx, &tokens)
}

/// `>>` left after operator substitution closes two generic lists
fn split_shift_closers(tokens: &[Token]) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if token.is(">>") {
            out.push(Token::synthetic(">", token));
            out.push(Token::synthetic(">", token));
        } else {
            out.push(token.clone());
        }
    }
    out
}
