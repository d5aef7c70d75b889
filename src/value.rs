//! Raw parameter values and parameter maps.
//!
//! A [`Value`] carries a parameter exactly as the caller supplied it. Nothing is
//! decided about its SQL representation here; that is the job of
//! [`classify`](crate::classify::classify) and the [`Caster`](crate::cast::Caster).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::Deserialize;

use crate::classify::TypeTag;

/// Named parameters for one bind call.
pub type Params = BTreeMap<String, Value>;

/// A raw, not yet classified parameter value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    List(Vec<Value>),
}

impl Value {
    /// Returns the tag matching the value's native variant.
    ///
    /// Unlike [`classify`](crate::classify::classify) this never looks at content:
    /// `Value::Text("5")` is `Text`, `Value::Float(3.0)` is `Decimal`.
    pub fn kind(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Int(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Decimal,
            Value::Text(_) => TypeTag::Text,
            Value::DateTime(_) => TypeTag::DateTime,
            Value::List(_) => TypeTag::Sequence,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! from_lossless {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        })*
    };
}

from_lossless!(i8, i16, i32, i64, u8, u16, u32);

// Integers wider than i64 keep their digits so the caster can apply its
// overflow fallback instead of wrapping.
macro_rules! from_wide {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                match i64::try_from(v) {
                    Ok(v) => Value::Int(v),
                    Err(_) => Value::Text(v.to_string()),
                }
            }
        })*
    };
}

from_wide!(u64, i128, u128, usize, isize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::DateTime(v.and_time(chrono::NaiveTime::MIN))
    }
}

/// Zoned timestamps are bound in their own local wall-clock time.
impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::DateTime(v.naive_local())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::List(v.iter().cloned().map(Into::into).collect())
    }
}

/// JSON objects become sequences of their values; keys carry no SQL meaning.
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::from(u)
                } else {
                    n.as_f64().map_or(Value::Null, Value::Float)
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::List(map.into_iter().map(|(_, v)| Value::from(v)).collect())
            }
        }
    }
}

/// Builds a [`Params`] map from `name => value` pairs.
///
/// ```
/// use sqlx_cast_bind::{params, Value};
///
/// let p = params! { "id" => 3, "name" => "abc%" };
/// assert_eq!(p["id"], Value::Int(3));
/// ```
#[macro_export]
macro_rules! params {
    () => { $crate::Params::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::Params::new();
        $(map.insert(::std::string::String::from($key), $crate::Value::from($value));)+
        map
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wide_integers_keep_digits() {
        assert_eq!(Value::from(7u64), Value::Int(7));
        assert_eq!(
            Value::from(u64::MAX),
            Value::Text("18446744073709551615".to_string())
        );
    }

    #[test]
    fn test_option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".to_string()));
    }

    #[test]
    fn test_from_json() {
        let v = Value::from(json!([1, 2.5, "x", null, true, {"a": 1}]));
        assert_eq!(
            v,
            Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::Text("x".to_string()),
                Value::Null,
                Value::Bool(true),
                Value::List(vec![Value::Int(1)]),
            ])
        );
    }

    #[test]
    fn test_kind_follows_variant() {
        assert_eq!(Value::from("5").kind(), TypeTag::Text);
        assert_eq!(Value::from(3.0).kind(), TypeTag::Decimal);
        assert_eq!(Value::from(vec![1, 2]).kind(), TypeTag::Sequence);
    }

    #[test]
    fn test_params_macro() {
        let p = params! { "id" => 3, "name" => "abc%", "gone" => None::<i64> };
        assert_eq!(p.len(), 3);
        assert_eq!(p["gone"], Value::Null);
    }
}
