use std::{error::Error, fmt};

use crate::token::Position;

/// A fault raised while evaluating a parsed program (spec §3, §7).
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    UndefinedVariable { name: String, position: Position },
    UnknownFunction { name: String, position: Position },
    InvalidMember { property: String, position: Position },
    TypeError { message: String, position: Position },
    /// Squared exposes no division-by-zero literal behavior; the host
    /// must not let this reach Rust's native integer-division panic.
    DivisionByZero { position: Position },
}

impl RuntimeError {
    pub fn position(&self) -> Position {
        match self {
            RuntimeError::UndefinedVariable { position, .. }
            | RuntimeError::UnknownFunction { position, .. }
            | RuntimeError::InvalidMember { position, .. }
            | RuntimeError::TypeError { position, .. }
            | RuntimeError::DivisionByZero { position } => *position,
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (line, col) = self.position();
        match self {
            RuntimeError::UndefinedVariable { name, .. } => {
                write!(f, "undefined variable '{name}' at {line}:{col}")
            }
            RuntimeError::UnknownFunction { name, .. } => {
                write!(f, "unknown function '{name}' at {line}:{col}")
            }
            RuntimeError::InvalidMember { property, .. } => {
                write!(f, "invalid member '{property}' at {line}:{col}")
            }
            RuntimeError::TypeError { message, .. } => {
                write!(f, "{message} at {line}:{col}")
            }
            RuntimeError::DivisionByZero { .. } => {
                write!(f, "division by zero at {line}:{col}")
            }
        }
    }
}

impl Error for RuntimeError {}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
