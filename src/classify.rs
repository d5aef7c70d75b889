//! Semantic type inference for raw parameter values.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::value::Value;

/// The semantic kind a value is cast as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum TypeTag {
    Null,
    Boolean,
    Integer,
    Decimal,
    DateTime,
    Text,
    Sequence,
}

impl TypeTag {
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Null => "Null",
            TypeTag::Boolean => "Boolean",
            TypeTag::Integer => "Integer",
            TypeTag::Decimal => "Decimal",
            TypeTag::DateTime => "DateTime",
            TypeTag::Text => "Text",
            TypeTag::Sequence => "Sequence",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the tag names case-insensitively, plus the names used by older
/// schema files (`integer`, `double`, `string`, `array`, ...).
impl FromStr for TypeTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "null" => Ok(TypeTag::Null),
            "boolean" | "bool" => Ok(TypeTag::Boolean),
            "integer" | "int" => Ok(TypeTag::Integer),
            "decimal" | "double" | "float" => Ok(TypeTag::Decimal),
            "datetime" => Ok(TypeTag::DateTime),
            "text" | "string" => Ok(TypeTag::Text),
            "sequence" | "array" => Ok(TypeTag::Sequence),
            _ => Err(format!("unknown type name '{s}'")),
        }
    }
}

impl TryFrom<String> for TypeTag {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Classifies a raw value. The first matching rule wins:
///
/// 1. `Bool` is `Boolean`
/// 2. `Null` is `Null`
/// 3. numeric text in canonical integer form is `Integer`
/// 4. numeric text surviving an `f64` round trip is `Decimal`
/// 5. `List` is `Sequence`
/// 6. `DateTime` is `DateTime`
/// 7. any other text is `Text`
///
/// Numbers are judged by their textual form, so `Int` and `Float` go through the
/// same checks as numeric strings. `"000123"` is not canonical and stays `Text`.
///
/// # Errors
///
/// Returns [`Error::UnknownType`](crate::Error::UnknownType) for non-finite floats,
/// which have no SQL representation.
///
/// # Examples
///
/// ```
/// use sqlx_cast_bind::{classify::classify, TypeTag, Value};
///
/// assert_eq!(classify(&Value::from("42"))?, TypeTag::Integer);
/// assert_eq!(classify(&Value::from("0.5"))?, TypeTag::Decimal);
/// assert_eq!(classify(&Value::from("000123"))?, TypeTag::Text);
/// # Ok::<(), sqlx_cast_bind::Error>(())
/// ```
pub fn classify(value: &Value) -> crate::Result<TypeTag> {
    if let Value::Bool(_) = value {
        return Ok(TypeTag::Boolean);
    }
    if value.is_null() {
        return Ok(TypeTag::Null);
    }

    if let Some(text) = numeric_text(value) {
        if is_numeric(&text) {
            if is_canonical_integer(&text) && integral_fits(value, &text) {
                return Ok(TypeTag::Integer);
            }
            if is_canonical_decimal(&text) {
                return Ok(TypeTag::Decimal);
            }
        }
    }

    match value {
        Value::List(_) => Ok(TypeTag::Sequence),
        Value::DateTime(_) => Ok(TypeTag::DateTime),
        Value::Text(_) => Ok(TypeTag::Text),
        other => Err(crate::Error::UnknownType(format!("value {other:?}"))),
    }
}

/// Textual form used by the numeric rules, `None` for non-scalar values.
pub(crate) fn numeric_text(value: &Value) -> Option<String> {
    match value {
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) if f.is_finite() => Some(f.to_string()),
        Value::Text(s) => Some(s.clone()),
        _ => None,
    }
}

/// Whole floats only count as integers within `i64`; larger ones stay floating
/// point.
fn integral_fits(value: &Value, text: &str) -> bool {
    match value {
        Value::Float(_) => text.parse::<i64>().is_ok(),
        _ => true,
    }
}

fn is_numeric(text: &str) -> bool {
    text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E'))
}

/// `-?(0|[1-9][0-9]*)`, excluding `-0`.
///
/// This is exactly the set of strings an integer parse would print back
/// unchanged, without bounding the magnitude.
pub(crate) fn is_canonical_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits == "0" {
        return !text.starts_with('-');
    }
    !digits.starts_with('0')
}

fn is_canonical_decimal(text: &str) -> bool {
    text.parse::<f64>()
        .map(|f| f.is_finite() && f.to_string() == text)
        .unwrap_or(false)
}
