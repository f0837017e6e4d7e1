//! Tree-walking evaluator (spec §4.4–§4.6).
mod builtins;
mod constructor;
mod error;

pub use error::{RuntimeError, RuntimeResult};

use std::rc::Rc;

use log::trace;

use crate::{
    ast::{BinaryOp, Expression, MemberProperty, Program, Statement},
    format::format_value,
    host::{ModuleRegistry, OutputSink},
    scope::Scope,
    value::{ControlOutcome, Function, Primitive, Value},
};

/// Walks a parsed [`Program`] over a [`Scope`] tree, writing to an
/// [`OutputSink`] and consulting a [`ModuleRegistry`] for `import` (spec §6).
pub struct Interpreter<S: OutputSink> {
    global: Scope,
    output: S,
    modules: ModuleRegistry,
    /// The slot backing the `eval()`/`eval(x)` built-in (spec §4.6). It is a
    /// single interpreter-level cell, not a scope binding.
    eval_cell: Value,
}

impl<S: OutputSink> Interpreter<S> {
    pub fn new(output: S, modules: ModuleRegistry) -> Self {
        Self {
            global: Scope::global(),
            output,
            modules,
            eval_cell: Value::undefined(),
        }
    }

    pub fn output_mut(&mut self) -> &mut S {
        &mut self.output
    }

    /// Run a whole program to completion. A `Control` value escaping the
    /// top level (a stray `return`/`break`/`continue`) is not an error per
    /// se — the spec defines no behaviour for it — so it is simply
    /// discarded once statement execution ends.
    pub fn run(&mut self, program: &Program) -> RuntimeResult<()> {
        let global = self.global.clone();
        match self.execute_block(&program.body, &global) {
            Ok(_) => Ok(()),
            Err(err) => {
                self.output.write_line(&format!("Runtime Error: {err}"), true);
                Err(err)
            }
        }
    }

    fn execute_block(
        &mut self,
        statements: &[Statement],
        scope: &Scope,
    ) -> RuntimeResult<Option<ControlOutcome>> {
        for statement in statements {
            if let Some(outcome) = self.execute_statement(statement, scope)? {
                return Ok(Some(outcome));
            }
        }
        Ok(None)
    }

    fn execute_statement(
        &mut self,
        statement: &Statement,
        scope: &Scope,
    ) -> RuntimeResult<Option<ControlOutcome>> {
        trace!("executing statement at {:?}", statement.position());
        match statement {
            Statement::VarDecl { name, value, .. } => {
                let value = self.eval_expr(value, scope)?;
                scope.declare(name, value);
                Ok(None)
            }
            Statement::Assign {
                name,
                value,
                position,
            } => {
                let value = self.eval_expr(value, scope)?;
                if !scope.assign(name, value) {
                    return Err(RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        position: *position,
                    });
                }
                Ok(None)
            }
            Statement::FuncDecl {
                name, params, body, ..
            } => {
                let function = Function {
                    params: params.iter().map(|p| p.name.clone()).collect(),
                    body: body.clone(),
                    closure: scope.snapshot(),
                };
                scope.declare(name, Value::Function(Rc::new(function)));
                Ok(None)
            }
            Statement::If {
                test,
                consequent,
                alternate,
                ..
            } => {
                let test = self.eval_expr(test, scope)?;
                if test.is_truthy() {
                    self.execute_block(consequent, scope)
                } else if let Some(alternate) = alternate {
                    self.execute_block(alternate, scope)
                } else {
                    Ok(None)
                }
            }
            Statement::While { test, body, .. } => {
                while self.eval_expr(test, scope)?.is_truthy() {
                    match self.execute_block(body, scope)? {
                        Some(ControlOutcome::Break) => break,
                        Some(ControlOutcome::Continue) | None => {}
                        Some(outcome @ ControlOutcome::Return(_)) => return Ok(Some(outcome)),
                    }
                }
                Ok(None)
            }
            Statement::For {
                init,
                test,
                update,
                body,
                ..
            } => {
                // `init` runs once in the enclosing scope, so a declared loop
                // variable outlives the loop (spec §9 — kept deliberately).
                self.execute_statement(init, scope)?;
                while self.eval_expr(test, scope)?.is_truthy() {
                    match self.execute_block(body, scope)? {
                        Some(ControlOutcome::Break) => break,
                        Some(ControlOutcome::Continue) | None => {
                            self.execute_statement(update, scope)?;
                        }
                        Some(outcome @ ControlOutcome::Return(_)) => return Ok(Some(outcome)),
                    }
                }
                Ok(None)
            }
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::undefined(),
                };
                Ok(Some(ControlOutcome::Return(value)))
            }
            Statement::Break { .. } => Ok(Some(ControlOutcome::Break)),
            Statement::Continue { .. } => Ok(Some(ControlOutcome::Continue)),
            Statement::ExprStmt { expr, .. } => {
                self.eval_expr(expr, scope)?;
                Ok(None)
            }
            Statement::Import {
                module_name,
                position,
            } => {
                self.execute_import(module_name, *position, scope)?;
                Ok(None)
            }
        }
    }

    fn execute_import(&mut self, module_name: &str, position: (usize, usize), scope: &Scope) -> RuntimeResult<()> {
        let binding_name = module_name.split('.').next().unwrap_or(module_name).to_owned();
        let module = self.modules.get(module_name).ok_or_else(|| RuntimeError::UnknownFunction {
            name: module_name.to_owned(),
            position,
        })?;
        scope.declare(&binding_name, module.default.clone());
        for (name, value) in module.members.clone() {
            scope.declare(&name, value);
        }
        Ok(())
    }

    fn eval_expr(&mut self, expr: &Expression, scope: &Scope) -> RuntimeResult<Value> {
        match expr {
            Expression::Literal { value, .. } => Ok(Value::int(*value)),
            Expression::Identifier { name, .. } => Ok(self.eval_identifier(name, scope)),
            Expression::Binary {
                op,
                left,
                right,
                position,
            } => {
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                self.eval_binary(*op, left, right, *position)
            }
            Expression::Call {
                callee,
                args,
                position,
            } => self.eval_call(callee, args, scope, *position),
            Expression::Member {
                object,
                property,
                position,
            } => {
                let object = self.eval_expr(object, scope)?;
                self.eval_member(object, property, scope, *position)
            }
            Expression::TypeCtor {
                kind,
                body_tokens,
                position,
            } => self.eval_constructor(kind, body_tokens, scope, *position),
        }
    }

    /// Unbound identifiers evaluate to their own name as a string (spec
    /// §4.5, §9's "Identifier-as-string fallback"). This is load-bearing
    /// for bare words inside `fstr`/`str` bodies, which are plain
    /// identifier tokens re-parsed as expressions.
    fn eval_identifier(&self, name: &str, scope: &Scope) -> Value {
        scope.get(name).unwrap_or_else(|| Value::str(name))
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: Value,
        right: Value,
        position: (usize, usize),
    ) -> RuntimeResult<Value> {
        use BinaryOp::*;
        let left = unwrap_primitive(left, position)?;
        let right = unwrap_primitive(right, position)?;
        match op {
            Eq => Ok(Value::bool(left == right)),
            Neq => Ok(Value::bool(left != right)),
            Lt | Gt | Le | Ge => {
                let (l, r) = as_int_pair(&left, &right, position)?;
                Ok(Value::bool(match op {
                    Lt => l < r,
                    Gt => l > r,
                    Le => l <= r,
                    Ge => l >= r,
                    _ => unreachable!(),
                }))
            }
            Add | Sub | Mul | Div => {
                let (l, r) = as_int_pair(&left, &right, position)?;
                let result = match op {
                    Add => l + r,
                    Sub => l - r,
                    Mul => l * r,
                    Div => {
                        if r == 0 {
                            return Err(RuntimeError::DivisionByZero { position });
                        }
                        l / r
                    }
                    _ => unreachable!(),
                };
                Ok(Value::int(result))
            }
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expression,
        args: &[Expression],
        scope: &Scope,
        position: (usize, usize),
    ) -> RuntimeResult<Value> {
        // Step 1: a bare identifier naming a built-in.
        if let Expression::Identifier { name, .. } = callee {
            if let Some(result) = self.try_builtin(name, args, scope, position)? {
                return Ok(result);
            }
        }

        // Step 2: a `Member` whose object is an `Object` — look up the
        // property as a function bound to that object. The receiver and key
        // are cached so the Step 3 fallback below can reuse them instead of
        // re-evaluating the whole `Member` expression (and any side effects
        // in `object` or a `Dynamic` property) a second time.
        if let Expression::Member {
            object,
            property,
            position: member_position,
        } = callee
        {
            let receiver = self.eval_expr(object, scope)?;
            let key = self.member_key(property, scope)?;
            if let Value::Object(properties) = &receiver {
                let function = properties.borrow().get(&key).cloned();
                if let Some(Value::Function(function)) = function {
                    let arg_values = self.eval_args(args, scope)?;
                    return self.call_function(function, arg_values);
                }
            }

            let callee_value = self.lookup_member(receiver, &key, *member_position)?;
            let Value::Function(function) = callee_value else {
                return Err(RuntimeError::UnknownFunction {
                    name: describe_callee(callee),
                    position,
                });
            };
            let arg_values = self.eval_args(args, scope)?;
            return self.call_function(function, arg_values);
        }

        // Step 3: evaluate the callee; it must be a function.
        let callee_value = self.eval_expr(callee, scope)?;
        let Value::Function(function) = callee_value else {
            return Err(RuntimeError::UnknownFunction {
                name: describe_callee(callee),
                position,
            });
        };
        let arg_values = self.eval_args(args, scope)?;
        self.call_function(function, arg_values)
    }

    fn eval_args(&mut self, args: &[Expression], scope: &Scope) -> RuntimeResult<Vec<Value>> {
        args.iter().map(|arg| self.eval_expr(arg, scope)).collect()
    }

    /// Invoke a function: a fresh scope activated from its closure snapshot,
    /// arguments evaluated in the *caller's* scope and bound by name, body
    /// executed, `Return` unwrapped (spec §4.6).
    fn call_function(&mut self, function: Rc<Function>, args: Vec<Value>) -> RuntimeResult<Value> {
        let call_scope = function.closure.activate(&self.global);
        for (param, value) in function.params.iter().zip(args) {
            call_scope.declare(param, value);
        }
        match self.execute_block(&function.body, &call_scope)? {
            Some(ControlOutcome::Return(value)) => Ok(value),
            _ => Ok(Value::undefined()),
        }
    }

    fn member_key(&mut self, property: &MemberProperty, scope: &Scope) -> RuntimeResult<String> {
        match property {
            MemberProperty::Static(name) => Ok(name.clone()),
            MemberProperty::Dynamic(expr) => {
                let value = self.eval_expr(expr, scope)?;
                Ok(format_value(&value))
            }
        }
    }

    fn eval_member(
        &mut self,
        object: Value,
        property: &MemberProperty,
        scope: &Scope,
        position: (usize, usize),
    ) -> RuntimeResult<Value> {
        let key = self.member_key(property, scope)?;
        self.lookup_member(object, &key, position)
    }

    /// Resolve an already-evaluated object and a (possibly already-formatted)
    /// key string to a member value, without touching `scope` — shared by
    /// `eval_member` and `eval_call`'s Step 3 fallback so a receiver or
    /// dynamic-property expression is never re-evaluated (spec §4.6).
    fn lookup_member(&self, object: Value, key: &str, position: (usize, usize)) -> RuntimeResult<Value> {
        match &object {
            Value::Array(elements) => {
                if key == "val" {
                    return Ok(object.clone());
                }
                if let Some(index) = array_index(key) {
                    return Ok(elements
                        .borrow()
                        .get(index)
                        .cloned()
                        .unwrap_or(Value::Primitive(Primitive::Str("undefined".to_owned()))));
                }
                Err(RuntimeError::InvalidMember {
                    property: key.to_owned(),
                    position,
                })
            }
            Value::Object(properties) => properties.borrow().get(key).cloned().ok_or(RuntimeError::InvalidMember {
                property: key.to_owned(),
                position,
            }),
            Value::EvalCell(inner) if key == "result" => Ok((**inner).clone()),
            _ => Err(RuntimeError::InvalidMember {
                property: key.to_owned(),
                position,
            }),
        }
    }
}

/// `val`, `e<digits>`, or a bare digit string all address an array element by
/// a 0-based index (spec §4.6).
fn array_index(key: &str) -> Option<usize> {
    let digits = key.strip_prefix('e').unwrap_or(key);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn unwrap_primitive(value: Value, position: (usize, usize)) -> RuntimeResult<Primitive> {
    match value {
        Value::Primitive(primitive) => Ok(primitive),
        other => Err(RuntimeError::TypeError {
            message: format!("expected a primitive value, found {}", other.type_name()),
            position,
        }),
    }
}

fn as_int_pair(left: &Primitive, right: &Primitive, position: (usize, usize)) -> RuntimeResult<(i64, i64)> {
    match (left, right) {
        (Primitive::Int(l), Primitive::Int(r)) => Ok((*l, *r)),
        _ => Err(RuntimeError::TypeError {
            message: "operator applied to non-integer operands".to_owned(),
            position,
        }),
    }
}

fn describe_callee(callee: &Expression) -> String {
    match callee {
        Expression::Identifier { name, .. } => name.clone(),
        _ => "<expression>".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ast::Parser, host::StringSink, lexer};

    fn run_source(source: &str) -> (RuntimeResult<()>, StringSink) {
        let tokens = lexer::lex(source).expect("lex");
        let program = Parser::parse_program(tokens).expect("parse");
        let mut interp = Interpreter::new(StringSink::new(), ModuleRegistry::new());
        let result = interp.run(&program);
        let sink = std::mem::replace(interp.output_mut(), StringSink::new());
        (result, sink)
    }

    #[test]
    fn prints_assigned_literal() {
        let (result, sink) = run_source("var [x] = int[10]\nprint(x)\n");
        result.unwrap();
        assert_eq!(sink.lines(), ["10"]);
    }

    #[test]
    fn while_loop_breaks() {
        let (result, sink) = run_source(
            "var [i] = int[0]\nwhile [i < int[3]]\n    print(i)\n    i = i + int[1]\n",
        );
        result.unwrap();
        assert_eq!(sink.lines(), ["0", "1", "2"]);
    }

    #[test]
    fn function_closes_over_global() {
        let (result, sink) = run_source(
            "var [g] = int[10]\nfunc [add(var[a])]\n    return a + g\nprint(add(int[5]))\n",
        );
        result.unwrap();
        assert_eq!(sink.lines(), ["15"]);
    }

    #[test]
    fn assign_to_undefined_name_is_an_error() {
        let (result, _) = run_source("missing = int[1]\n");
        assert!(matches!(result, Err(RuntimeError::UndefinedVariable { .. })));
    }

    #[test]
    fn local_assignment_does_not_mutate_global() {
        let (result, sink) = run_source(
            "var [x] = int[1]\nfunc [shadow()]\n    var [x] = int[2]\n    x = int[3]\nshadow()\nprint(x)\n",
        );
        result.unwrap();
        assert_eq!(sink.lines(), ["1"]);
    }
}
