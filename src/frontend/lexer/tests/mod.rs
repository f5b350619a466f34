//! Lexer unit tests

mod basic;
mod operators;
