pub mod brackets;
pub mod config;
pub mod error;
pub mod eval;
pub mod history;
pub mod lexer;
pub mod postfix;
pub mod round;
pub mod sanitize;
pub mod session;
pub mod token;
pub mod vm;

pub use error::{ErrorKind, EvalError};
pub use eval::{evaluate, EvalOptions, Evaluator};
