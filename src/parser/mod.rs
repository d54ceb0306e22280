//! Parser for prompt templates

pub mod ast;
mod grammar;
pub mod lexer;
mod pairing;

pub use ast::*;
pub use grammar::parse;
pub use pairing::MAX_DEPTH;
