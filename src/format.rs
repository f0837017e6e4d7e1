//! Value-to-text formatting (spec §6), shared by `print`, template
//! interpolation, and error messages.
use crate::value::{Primitive, Value};

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Primitive(Primitive::Int(n)) => n.to_string(),
        Value::Primitive(Primitive::Bool(b)) => b.to_string(),
        Value::Primitive(Primitive::Str(s)) => s.clone(),
        Value::Primitive(Primitive::Undefined) => "undefined".to_owned(),
        Value::Array(elements) => {
            let rendered: Vec<String> = elements.borrow().iter().map(format_value).collect();
            format!("[{}]", rendered.join(", "))
        }
        Value::Object(properties) => {
            let rendered: Vec<String> = properties
                .borrow()
                .iter()
                .map(|(key, value)| format!("{key}: {}", format_value(value)))
                .collect();
            format!("{{ {} }}", rendered.join(", "))
        }
        Value::Function(_) => "<function>".to_owned(),
        Value::Control(_) => "undefined".to_owned(),
        Value::EvalCell(inner) => format_value(inner),
    }
}
