//! Host bridge: output sink, optional input prompt, module registry (spec §6).
use std::collections::HashMap;

use crate::value::Value;

/// Destination for `print` output and runtime error reports (spec §6's
/// `output(text, isError?)`).
pub trait OutputSink {
    fn write_line(&mut self, text: &str, is_error: bool);
}

/// Writes to the process's standard output/error streams.
#[derive(Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&mut self, text: &str, is_error: bool) {
        if is_error {
            eprintln!("{text}");
        } else {
            println!("{text}");
        }
    }
}

/// Captures output in memory, for tests and embedders that want to inspect
/// emitted lines rather than print them.
#[derive(Default, Debug)]
pub struct StringSink {
    lines: Vec<String>,
    error_lines: Vec<String>,
}

impl StringSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn error_lines(&self) -> &[String] {
        &self.error_lines
    }
}

impl OutputSink for StringSink {
    fn write_line(&mut self, text: &str, is_error: bool) {
        if is_error {
            self.error_lines.push(text.to_owned());
        } else {
            self.lines.push(text.to_owned());
        }
    }
}

/// Optional input callback (spec §6); unused by the core evaluator itself,
/// kept so a host can wire an interactive `read`-style built-in without
/// changing the interpreter's shape.
pub trait InputPrompt {
    fn prompt(&mut self, text: &str) -> String;
}

/// A single importable unit: a default export plus its enumerable top-level
/// members (spec §4.4's `Import` semantics).
#[derive(Debug, Clone)]
pub struct Module {
    pub default: Value,
    pub members: HashMap<String, Value>,
}

impl Module {
    pub fn new(default: Value) -> Self {
        Self {
            default,
            members: HashMap::new(),
        }
    }

    pub fn with_member(mut self, name: impl Into<String>, value: Value) -> Self {
        self.members.insert(name.into(), value);
        self
    }
}

/// Host-populated name → [`Module`] map, consulted by `import` (spec §6, §9
/// — the source's browser-style dynamic loader is replaced here by a
/// registry the host fills in ahead of time).
#[derive(Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Module>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, module: Module) {
        self.modules.insert(name.into(), module);
    }

    pub fn get(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }
}
