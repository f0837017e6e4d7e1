use std::{error::Error, fmt::Display};

use crate::token::Position;

/// Fatal parse error: the first unexpected token aborts parsing (spec §4.2,
/// "Failure"). There is no error recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub position: Position,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Syntax Error: {} at {}:{}",
            self.message, self.position.0, self.position.1
        )
    }
}

impl Error for SyntaxError {}

pub type ParseResult<T> = Result<T, SyntaxError>;
