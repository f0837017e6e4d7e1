//! Type-constructor evaluation: `kind[bodyTokens]` (spec §4.3).
//!
//! Every arm operates on the verbatim token slice harvested by the parser,
//! re-parsing or otherwise interpreting it lazily, only now that `kind` is
//! known.
use indexmap::IndexMap;

use crate::{
    ast::{parser::parse_integer_text, Parser},
    format::format_value,
    host::OutputSink,
    scope::Scope,
    token::{Position, Token, TokenKind},
    value::Value,
};

use super::{Interpreter, RuntimeError, RuntimeResult};

impl<S: OutputSink> Interpreter<S> {
    pub(super) fn eval_constructor(
        &mut self,
        kind: &str,
        body: &[Token],
        scope: &Scope,
        position: Position,
    ) -> RuntimeResult<Value> {
        match kind {
            "int" => Ok(Value::int(parse_integer_text(&concat_texts(body)))),
            "str" => Ok(Value::str(normalize_joined(&join_with_spaces(body)))),
            "bool" => Ok(Value::bool(join_with_spaces(body).to_lowercase().trim() == "true")),
            "var" => self.eval_var_ctor(body, scope, position),
            "f" | "fobj" => self.eval_expression_ctor(body, scope, position),
            "a" => self.eval_array_ctor(body, scope, position),
            "obj" | "o" => self.eval_object_ctor(body, scope, position),
            "fint" => {
                let rendered = self.render_template(body, scope, position, "")?;
                Ok(Value::int(parse_integer_text(&rendered)))
            }
            "fstr" => {
                let rendered = self.render_template(body, scope, position, " ")?;
                Ok(Value::str(collapse_before_punctuation(rendered.trim())))
            }
            other => Err(RuntimeError::TypeError {
                message: format!("unknown type constructor '{other}'"),
                position,
            }),
        }
    }

    fn eval_var_ctor(&self, body: &[Token], scope: &Scope, position: Position) -> RuntimeResult<Value> {
        let Some(first) = body.first() else {
            return Err(RuntimeError::TypeError {
                message: "var[] requires a variable name".to_owned(),
                position,
            });
        };
        scope.get(&first.text).ok_or_else(|| RuntimeError::UndefinedVariable {
            name: first.text.clone(),
            position,
        })
    }

    /// `f`/`fobj`: re-parse the body as a single expression and evaluate it.
    /// A parse failure falls back to the raw concatenated token text (spec
    /// §4.3) rather than propagating a syntax error.
    fn eval_expression_ctor(&mut self, body: &[Token], scope: &Scope, position: Position) -> RuntimeResult<Value> {
        match Parser::parse_single_expression(body.to_vec()) {
            Ok(expr) => self.eval_expr(&expr, scope),
            Err(_) => Ok(Value::str(concat_texts(body))),
        }
    }

    fn eval_array_ctor(&mut self, body: &[Token], scope: &Scope, position: Position) -> RuntimeResult<Value> {
        let mut elements = vec![];
        for segment in split_top_level_commas(body) {
            let expr = Parser::parse_single_expression(segment).map_err(|err| RuntimeError::TypeError {
                message: format!("invalid array element: {err}"),
                position,
            })?;
            elements.push(self.eval_expr(&expr, scope)?);
        }
        Ok(Value::array(elements))
    }

    /// `obj`/`o`: each top-level-comma segment must open with the identifier
    /// `prop`, e.g. `prop[name] = str[bot]`. Segments that don't start with
    /// `prop` are ignored (spec §4.3).
    fn eval_object_ctor(&mut self, body: &[Token], scope: &Scope, position: Position) -> RuntimeResult<Value> {
        let mut properties = IndexMap::new();
        for segment in split_top_level_commas(body) {
            let Some(key) = property_key(&segment) else {
                continue;
            };
            let Some(eq_index) = segment.iter().position(|t| t.is_symbol("=")) else {
                continue;
            };
            let value_tokens = segment[eq_index + 1..].to_vec();
            let expr = Parser::parse_single_expression(value_tokens).map_err(|err| RuntimeError::TypeError {
                message: format!("invalid object property '{key}': {err}"),
                position,
            })?;
            let value = self.eval_expr(&expr, scope)?;
            properties.insert(key, value);
        }
        Ok(Value::object(properties))
    }

    /// Shared `fint`/`fstr` templating pass: scan for balanced `{ … }`
    /// islands, evaluate and format each, then join every segment (literal
    /// token text or formatted island) with `separator`.
    fn render_template(
        &mut self,
        body: &[Token],
        scope: &Scope,
        position: Position,
        separator: &str,
    ) -> RuntimeResult<String> {
        let mut segments = vec![];
        let mut i = 0;
        while i < body.len() {
            if body[i].is_symbol("{") {
                let mut depth = 1usize;
                let mut island = vec![];
                i += 1;
                while i < body.len() && depth > 0 {
                    if body[i].is_symbol("{") {
                        depth += 1;
                        island.push(body[i].clone());
                    } else if body[i].is_symbol("}") {
                        depth -= 1;
                        if depth > 0 {
                            island.push(body[i].clone());
                        }
                    } else {
                        island.push(body[i].clone());
                    }
                    i += 1;
                }
                let expr = Parser::parse_single_expression(island).map_err(|err| RuntimeError::TypeError {
                    message: format!("invalid template expression: {err}"),
                    position,
                })?;
                let value = self.eval_expr(&expr, scope)?;
                segments.push(format_value(&value));
            } else {
                segments.push(body[i].text.clone());
                i += 1;
            }
        }
        Ok(segments.join(separator))
    }
}

fn concat_texts(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

fn join_with_spaces(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>().join(" ")
}

/// `str`'s normalization: collapse `" , "` → `","` and `" ."` → `"."`, trim.
fn normalize_joined(joined: &str) -> String {
    joined.replace(" , ", ",").replace(" .", ".").trim().to_owned()
}

/// `fstr`'s normalization: drop whitespace immediately before `, ! ? .`.
fn collapse_before_punctuation(joined: &str) -> String {
    let mut out = String::with_capacity(joined.len());
    for ch in joined.chars() {
        if matches!(ch, ',' | '!' | '?' | '.') {
            while out.ends_with(' ') {
                out.pop();
            }
        }
        out.push(ch);
    }
    out
}

/// Split a token slice on top-level `,` symbols, tracking `[`/`]` depth so a
/// comma nested inside another constructor's body does not split a segment
/// (spec §4.3).
fn split_top_level_commas(tokens: &[Token]) -> Vec<Vec<Token>> {
    let mut segments = vec![];
    let mut current = vec![];
    let mut depth = 0usize;
    for token in tokens {
        match &token.kind {
            TokenKind::LBracket => {
                depth += 1;
                current.push(token.clone());
            }
            TokenKind::RBracket => {
                depth = depth.saturating_sub(1);
                current.push(token.clone());
            }
            _ if depth == 0 && token.is_symbol(",") => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(token.clone()),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// `prop[name] = …` — index 0 is the `prop` identifier, index 2 is the key.
fn property_key(segment: &[Token]) -> Option<String> {
    if segment.first()?.is_identifier("prop") {
        segment.get(2).map(|t| t.text.clone())
    } else {
        None
    }
}
