//! Utility module

mod error;

pub use error::{Result, SemanticError, SyntaxError};
