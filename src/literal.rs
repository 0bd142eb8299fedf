//! Restricted literal parser for textual default values.
//!
//! Declarations may spell a default as text (`defaultvalue: "10"` for an
//! integer descriptor). This parser turns such literals into typed JSON
//! values. It accepts numbers, booleans, quoted strings and bracketed
//! sequences thereof, and nothing else: it is deliberately not an
//! expression evaluator, so declaration files can never execute code.

use serde_json::{Number, Value};

use crate::data::{DataFormat, DataType};

/// Parse a textual literal into a value of the declared type and shape.
///
/// Returns `None` when the literal does not parse as the declared type;
/// the caller decides how loudly to fail.
pub fn parse_literal(text: &str, dtype: DataType, dformat: DataFormat) -> Option<Value> {
    let text = text.trim();
    match dformat {
        DataFormat::Scalar => parse_scalar(text, dtype),
        DataFormat::OneD => {
            let items = split_sequence(text)?;
            items
                .into_iter()
                .map(|item| parse_scalar(item.trim(), dtype))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array)
        }
        DataFormat::TwoD => {
            let rows = split_sequence(text)?;
            rows.into_iter()
                .map(|row| parse_literal(row.trim(), dtype, DataFormat::OneD))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

fn parse_scalar(text: &str, dtype: DataType) -> Option<Value> {
    match dtype {
        DataType::Integer => text.parse::<i64>().ok().map(Value::from),
        DataType::Double => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        DataType::Boolean => match text.to_lowercase().as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        DataType::String => Some(Value::String(unquote(text).to_string())),
    }
}

/// Strip one pair of matching single or double quotes, if present.
fn unquote(text: &str) -> &str {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// Split a bracketed sequence literal into its top-level elements.
///
/// Accepts `[...]` or `(...)` delimiters. Commas inside nested brackets or
/// quotes do not split. Returns `None` for unbalanced input or a missing
/// outer bracket.
fn split_sequence(text: &str) -> Option<Vec<&str>> {
    let inner = if text.starts_with('[') && text.ends_with(']') {
        &text[1..text.len() - 1]
    } else if text.starts_with('(') && text.ends_with(')') {
        &text[1..text.len() - 1]
    } else {
        return None;
    };

    if inner.trim().is_empty() {
        return Some(Vec::new());
    }

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (pos, ch) in inner.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '[' | '(' => depth += 1,
                ']' | ')' => depth = depth.checked_sub(1)?,
                ',' if depth == 0 => {
                    items.push(&inner[start..pos]);
                    start = pos + 1;
                }
                _ => {}
            },
        }
    }
    if depth != 0 || quote.is_some() {
        return None;
    }
    items.push(&inner[start..]);
    Some(items)
}
