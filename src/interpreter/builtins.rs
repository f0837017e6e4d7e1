//! Built-in functions resolved before any user-defined callee (spec §4.6).
use rand::Rng;

use crate::{
    ast::Expression,
    format::format_value,
    host::OutputSink,
    scope::Scope,
    value::Value,
};

use super::{Interpreter, RuntimeError, RuntimeResult};

impl<S: OutputSink> Interpreter<S> {
    /// Returns `Ok(None)` if `name` does not name a built-in, so the caller
    /// can fall through to ordinary function resolution.
    pub(super) fn try_builtin(
        &mut self,
        name: &str,
        args: &[Expression],
        scope: &Scope,
        position: (usize, usize),
    ) -> RuntimeResult<Option<Value>> {
        match name {
            "print" => {
                let values = self.eval_args(args, scope)?;
                let rendered: Vec<String> = values.iter().map(format_value).collect();
                self.output.write_line(&rendered.join(" "), false);
                Ok(Some(Value::undefined()))
            }
            "random" => {
                let values = self.eval_args(args, scope)?;
                Ok(Some(self.builtin_random(&values, position)?))
            }
            "eval" => {
                let values = self.eval_args(args, scope)?;
                Ok(Some(self.builtin_eval(values)))
            }
            _ => Ok(None),
        }
    }

    fn builtin_random(&self, args: &[Value], position: (usize, usize)) -> RuntimeResult<Value> {
        let mut rng = rand::thread_rng();
        match args {
            [Value::Array(elements)] => {
                let elements = elements.borrow();
                if elements.is_empty() {
                    return Err(RuntimeError::TypeError {
                        message: "random() called with an empty array".to_owned(),
                        position,
                    });
                }
                let index = rng.gen_range(0..elements.len());
                Ok(elements[index].clone())
            }
            [Value::Primitive(min), Value::Primitive(max)] => {
                let (min, max) = match (min, max) {
                    (crate::value::Primitive::Int(min), crate::value::Primitive::Int(max)) => {
                        (*min, *max)
                    }
                    _ => {
                        return Err(RuntimeError::TypeError {
                            message: "random(min, max) expects integer bounds".to_owned(),
                            position,
                        })
                    }
                };
                Ok(Value::int(rng.gen_range(min..=max)))
            }
            _ => Err(RuntimeError::TypeError {
                message: "random() expects an array, or a (min, max) pair".to_owned(),
                position,
            }),
        }
    }

    /// `eval()` replays the last stored `EvalCell`; `eval(x)` stores and
    /// returns a fresh one (spec §4.6).
    fn builtin_eval(&mut self, mut args: Vec<Value>) -> Value {
        if args.is_empty() {
            return self.eval_cell.clone();
        }
        let cell = Value::EvalCell(Box::new(args.remove(0)));
        self.eval_cell = cell.clone();
        cell
    }
}
