//! Lexical scope (spec §3, §4.5).
use std::{cell::RefCell, collections::HashMap, rc::Rc};

use log::trace;

use crate::value::Value;

#[derive(Default, Debug)]
struct Bindings {
    values: HashMap<String, Value>,
}

/// A name→[`Value`] mapping with a reference to an enclosing scope.
///
/// Lookup and write-through assignment only ever consult the *current*
/// scope and the *global* scope (spec §3, §4.5) — not every scope in
/// between — so `Scope` only needs to remember whether it is the global one
/// or carries a handle back to it.
///
/// Cloning a `Scope` is cheap and shares the same bindings (`Rc<RefCell<_>>`)
/// until [`Scope::snapshot`] is used to take an independent copy, which is
/// how function closures capture their enclosing scope (spec §9's "Closure
/// snapshot").
#[derive(Clone, Debug)]
pub struct Scope {
    bindings: Rc<RefCell<Bindings>>,
    global: Option<Rc<RefCell<Bindings>>>,
}

impl Scope {
    /// Create a new global scope.
    pub fn global() -> Self {
        Self {
            bindings: Rc::new(RefCell::new(Bindings::default())),
            global: None,
        }
    }

    /// Build the scope a function call executes in: its own bindings start
    /// as a copy of the closure snapshot, and its global slot is wired to
    /// the interpreter's real, live global scope (spec §4.6 — invocation
    /// "creates a new scope snapshot-initialised from the function's
    /// closure"). This is what lets a function see global mutations that
    /// happened *after* the closure was captured, while still treating its
    /// own captured locals as the starting point of its current scope.
    pub fn activate(&self, global: &Scope) -> Self {
        let values = self.bindings.borrow().values.clone();
        Self {
            bindings: Rc::new(RefCell::new(Bindings { values })),
            global: Some(global.bindings.clone()),
        }
    }

    /// Take an independent copy of the bindings currently visible in this
    /// scope, to be carried by a [`crate::value::Function`] closure (spec
    /// §3, §9). Later mutations to `self` are not visible through the
    /// snapshot, and vice versa.
    pub fn snapshot(&self) -> Self {
        let mut flat = Bindings::default();
        if let Some(global) = &self.global {
            flat.values.extend(global.borrow().values.clone());
        }
        flat.values.extend(self.bindings.borrow().values.clone());
        Self {
            bindings: Rc::new(RefCell::new(flat)),
            global: None,
        }
    }

    /// Declare `name` in the *current* scope (spec §4.5's `VarDecl`).
    pub fn declare(&self, name: &str, value: Value) {
        trace!("declaring '{name}' in current scope");
        self.bindings.borrow_mut().values.insert(name.to_owned(), value);
    }

    /// Look up `name`: current scope, then global (spec §4.5's
    /// `Identifier`). Returns `None` if absent in both.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().values.get(name).cloned() {
            return Some(value);
        }
        self.global
            .as_ref()
            .and_then(|g| g.borrow().values.get(name).cloned())
    }

    /// Write-through assignment: mutate the nearest scope (current or
    /// global) that already contains `name` (spec §4.5's `Assign`). Returns
    /// `false` if `name` is bound in neither.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if self.bindings.borrow().values.contains_key(name) {
            self.bindings.borrow_mut().values.insert(name.to_owned(), value);
            return true;
        }
        if let Some(global) = &self.global {
            if global.borrow().values.contains_key(name) {
                global.borrow_mut().values.insert(name.to_owned(), value);
                return true;
            }
        }
        false
    }
}
