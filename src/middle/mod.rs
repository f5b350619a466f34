//! Middle and back end
//!
//! Sequencing turns each file's final token stream into typed definitions,
//! generics are instantiated as they are used, and the finished program is
//! rendered as a single C translation unit.

pub mod codegen;
pub mod generics;
pub mod mangle;
pub mod sequence;

pub use codegen::render;
pub use sequence::sequence_file;
