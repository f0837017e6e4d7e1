//! # sqr
//!
//! The reference command-line interpreter for Squared (`^2`). Reads a
//! source file, lexes, parses, and evaluates it against a standard-output
//! sink.
mod cli;

use std::{fs, process::ExitCode};

use log::error;
use squared::{host::ModuleRegistry, SquaredError, StdoutSink};

use cli::Cli;

fn main() -> ExitCode {
    let args = Cli::init();
    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let source = match fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(io_error) => {
            error!("could not read '{}': {io_error}", args.file.display());
            return ExitCode::FAILURE;
        }
    };

    match squared::run(&source, StdoutSink, ModuleRegistry::new()) {
        Ok(()) => ExitCode::SUCCESS,
        // A RuntimeError has already been reported through the output sink
        // by the interpreter itself (spec §7); logging it again here would
        // just duplicate the message.
        Err(SquaredError::Runtime(_)) => ExitCode::FAILURE,
        Err(squared_error) => {
            error!("{squared_error}");
            ExitCode::FAILURE
        }
    }
}
