//! Lexer, parser, and tree-walking evaluator for the Squared (`^2`)
//! scripting language.
//!
//! ```text
//! source text -> Lexer -> tokens -> Parser -> Program -> Interpreter -> output sink
//! ```
//!
//! The parser is re-invoked on raw token slices captured inside
//! `Expression::TypeCtor` nodes while the evaluator walks the tree — the
//! deferred sub-parse that gives the language its name.
pub mod ast;
pub mod format;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod scope;
pub mod token;
pub mod value;

pub use ast::Parser;
pub use host::{Module, ModuleRegistry, OutputSink, StdoutSink, StringSink};
pub use interpreter::{Interpreter, RuntimeError};
pub use lexer::{lex, LexError};

use ast::SyntaxError;

/// A failure at any of the three pipeline stages.
#[derive(Debug)]
pub enum SquaredError {
    Lex(LexError),
    Syntax(SyntaxError),
    Runtime(RuntimeError),
}

impl std::fmt::Display for SquaredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SquaredError::Lex(err) => write!(f, "{err}"),
            SquaredError::Syntax(err) => write!(f, "{err}"),
            SquaredError::Runtime(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SquaredError {}

impl From<LexError> for SquaredError {
    fn from(err: LexError) -> Self {
        SquaredError::Lex(err)
    }
}

impl From<SyntaxError> for SquaredError {
    fn from(err: SyntaxError) -> Self {
        SquaredError::Syntax(err)
    }
}

impl From<RuntimeError> for SquaredError {
    fn from(err: RuntimeError) -> Self {
        SquaredError::Runtime(err)
    }
}

/// Run a whole program through lex → parse → evaluate, against a given
/// output sink and module registry. This is the single entry point a host
/// binary (or test) needs.
pub fn run(source: &str, output: impl OutputSink, modules: ModuleRegistry) -> Result<(), SquaredError> {
    let tokens = lex(source)?;
    let program = Parser::parse_program(tokens)?;
    let mut interpreter = Interpreter::new(output, modules);
    interpreter.run(&program)?;
    Ok(())
}
