//! Frontend
//!
//! Everything that happens to a file before it is sequenced: lexing,
//! macro expansion, rule rewriting and operator substitution, plus the
//! type representation shared with the later phases.
//!
//! Phases run strictly in this order for every file:
//!
//! ```text
//! lex -> expand_macros -> apply_rules -> substitute_operators
//! ```

pub mod lexer;
pub mod operators;
pub mod preprocess;
pub mod rules;
pub mod token_list;
pub mod types;

pub use lexer::{lex, Token, TokenTag};
pub use operators::substitute_operators;
pub use preprocess::expand_macros;
pub use rules::apply_rules;
pub use token_list::TokenList;
pub use types::{Type, TypeNode};
