//! Coercion of attribute values to their declared JSON schema type.
//!
//! Conversions follow the JavaScript constructors the stored format was
//! designed around (`String(v)`, `Boolean(v)`, `Number(v)`, ...), so a value
//! read from content coerces the same way regardless of which editor wrote it.
//! JSON cannot hold NaN or infinities; those numeric results become `null`,
//! which is also how they serialize.

use crate::error::CoercionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Largest integer a double represents exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Declared type of a block attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Boolean,
    Object,
    Null,
    Array,
    Integer,
    Number,
    /// Unknown type names: values pass through untouched
    #[serde(other)]
    Any,
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeType::String => "string",
            AttributeType::Boolean => "boolean",
            AttributeType::Object => "object",
            AttributeType::Null => "null",
            AttributeType::Array => "array",
            AttributeType::Integer => "integer",
            AttributeType::Number => "number",
            AttributeType::Any => "any",
        };
        f.write_str(name)
    }
}

/// Coerce a value to the given type.
///
/// Fails only when an array is requested for a value that cannot be iterated.
pub fn coerce(value: &Value, ty: AttributeType) -> Result<Value, CoercionError> {
    let coerced = match ty {
        AttributeType::String => Value::String(to_js_string(value)),
        AttributeType::Boolean => Value::Bool(is_truthy(value)),
        AttributeType::Object => match value {
            Value::Null => Value::Object(Map::new()),
            Value::Object(_) | Value::Array(_) => value.clone(),
            primitive => {
                let mut boxed = Map::new();
                boxed.insert("value".to_string(), primitive.clone());
                Value::Object(boxed)
            }
        },
        AttributeType::Null => Value::Null,
        AttributeType::Array => match value {
            Value::Array(_) => value.clone(),
            Value::String(s) => Value::Array(
                s.chars()
                    .map(|c| Value::String(c.to_string()))
                    .collect(),
            ),
            other => return Err(CoercionError::not_iterable(type_name(other))),
        },
        AttributeType::Integer | AttributeType::Number => from_f64(to_number(value)),
        AttributeType::Any => value.clone(),
    };
    Ok(coerced)
}

/// Name of the JSON type of a value, for messages
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `String(value)`
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// `Boolean(value)`
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `Number(value)`, with NaN as `f64::NAN`
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => string_to_number(s),
        Value::Array(_) => string_to_number(&to_js_string(value)),
        Value::Object(_) => f64::NAN,
    }
}

fn string_to_number(input: &str) -> f64 {
    let s = input.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = |prefix_len: usize, radix: u32| parse_radix(&s[prefix_len..], radix);
    let lower = s.to_ascii_lowercase();
    if lower.starts_with("0x") {
        return radix(2, 16);
    }
    if lower.starts_with("0o") {
        return radix(2, 8);
    }
    if lower.starts_with("0b") {
        return radix(2, 2);
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // Rust accepts spellings such as "inf" and "NaN" that JavaScript does not
    if lower.contains("inf") || lower.contains("nan") {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Unsigned digits in `radix`, without an upper bound on the magnitude
fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|digit| acc * radix as f64 + digit as f64)
        })
        .unwrap_or(f64::NAN)
}

/// Convert a double back to JSON, preferring an integer representation
fn from_f64(n: f64) -> Value {
    if !n.is_finite() {
        return Value::Null;
    }
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::from(n as i64);
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

/// `Number.prototype.toString()`: plain decimal notation between 1e-6 and
/// 1e21, exponent notation with an explicit sign outside of it
fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    let f = match n.as_f64() {
        Some(f) => f,
        None => return n.to_string(),
    };

    if f == 0.0 {
        return "0".to_string();
    }
    if f.abs() >= 1e21 || f.abs() < 1e-6 {
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }
    format!("{}", f)
}
