pub mod ast;
mod driver;
pub mod error;
pub mod lexer;
pub mod stream;
pub mod token;

pub use driver::{BlockScope, Parser};
pub use error::{ParseError, ParseResult};
