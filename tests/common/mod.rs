//! Shared harness for integration tests: lex, parse, and evaluate a program
//! against an in-memory output sink.
use squared::{host::ModuleRegistry, Interpreter, Module, RuntimeError, StringSink};

/// Run `source` to completion and return its printed lines. Panics if the
/// program fails to lex, parse, or evaluate.
pub fn run_lines(source: &str) -> Vec<String> {
    run_lines_with_modules(source, ModuleRegistry::new())
}

pub fn run_lines_with_modules(source: &str, modules: ModuleRegistry) -> Vec<String> {
    let tokens = squared::lex(source).expect("lex");
    let program = squared::Parser::parse_program(tokens).expect("parse");
    let mut interpreter = Interpreter::new(StringSink::new(), modules);
    interpreter.run(&program).expect("evaluate");
    interpreter.output_mut().lines().to_vec()
}

/// Run `source`, expecting evaluation to fail, and return the runtime error.
pub fn run_expect_error(source: &str) -> RuntimeError {
    let tokens = squared::lex(source).expect("lex");
    let program = squared::Parser::parse_program(tokens).expect("parse");
    let mut interpreter = Interpreter::new(StringSink::new(), ModuleRegistry::new());
    interpreter.run(&program).expect_err("expected a runtime error")
}

/// Run `source` and return whatever lines were printed before it either
/// finished or hit a runtime error, plus the final result. Used to observe
/// side effects (e.g. `print` calls) that happen on the way to a failure.
pub fn run_capturing(source: &str) -> (Result<(), RuntimeError>, Vec<String>) {
    let tokens = squared::lex(source).expect("lex");
    let program = squared::Parser::parse_program(tokens).expect("parse");
    let mut interpreter = Interpreter::new(StringSink::new(), ModuleRegistry::new());
    let result = interpreter.run(&program);
    (result, interpreter.output_mut().lines().to_vec())
}

#[allow(dead_code)]
pub fn single_module(name: &str, module: Module) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register(name, module);
    registry
}
