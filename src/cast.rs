//! Per-backend casting of classified values.
//!
//! One [`Caster`] engine handles every backend. What differs between backends is
//! the [`Dialect`] strategy it is built with: [`Literal`] renders SQL literals for
//! text-substitution backends (MySQL, PostgreSQL), [`Native`] produces values for
//! server-side bind variables (Oracle and prepared statements in general).

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::classify::{classify, is_canonical_integer, numeric_text, TypeTag};
use crate::error::Error;
use crate::session::{EscapeStyle, Session};
use crate::value::Value;

/// Format of date-time values in SQL.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Encapsulation character for text literals.
pub const ENCAP: char = '\'';

/// A value ready for a driver's bind call.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundValue::Null => f.write_str("NULL"),
            BoundValue::Int(i) => write!(f, "{i}"),
            BoundValue::Float(v) => write!(f, "{v}"),
            BoundValue::Text(s) => f.write_str(s),
        }
    }
}

/// The backend-safe form of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum CastResult {
    /// SQL fragment safe for direct embedding
    Literal(String),
    /// Value for a native bind variable
    Bound(BoundValue),
}

/// Options shared by the caster and the binders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindOptions {
    /// Call [`Session::connect`] when a text value needs escaping and the
    /// session is not connected yet. When `false` such casts fail with
    /// [`Error::ConnectionRequired`].
    pub auto_connect: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self { auto_connect: true }
    }
}

/// Casting rules of one backend.
///
/// The provided methods are the text-substitution rules. A backend overrides only
/// the rules whose syntax differs.
pub trait Dialect {
    fn name(&self) -> &'static str;

    /// Whether text casting goes through the session's escape routine.
    fn escapes_text(&self) -> bool {
        true
    }

    fn cast_null(&self) -> CastResult {
        CastResult::Literal("NULL".to_owned())
    }

    fn cast_boolean(&self, value: bool) -> CastResult {
        CastResult::Literal(if value { "1" } else { "0" }.to_owned())
    }

    fn cast_integer(&self, value: i64) -> CastResult {
        CastResult::Literal(value.to_string())
    }

    fn cast_decimal(&self, value: f64) -> CastResult {
        CastResult::Literal(value.to_string())
    }

    fn cast_datetime(&self, value: &NaiveDateTime) -> CastResult {
        CastResult::Literal(format!("{ENCAP}{}{ENCAP}", value.format(DATETIME_FORMAT)))
    }

    /// # Errors
    ///
    /// Fails if the session cannot escape, typically [`Error::ConnectionRequired`].
    fn cast_text(&self, value: &str, session: &dyn Session) -> crate::Result<CastResult> {
        let escaped = session.escape_string(value)?;
        Ok(CastResult::Literal(format!("{ENCAP}{escaped}{ENCAP}")))
    }

    /// Joins the casts of a sequence's elements. No parentheses are added.
    fn join(&self, parts: Vec<CastResult>) -> CastResult {
        let parts: Vec<String> = parts
            .into_iter()
            .map(|part| match part {
                CastResult::Literal(sql) => sql,
                CastResult::Bound(value) => value.to_string(),
            })
            .collect();
        CastResult::Literal(parts.join(","))
    }
}

/// Text-substitution rules. Backends differ only through the session's escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Literal {
    name: &'static str,
}

impl Literal {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub const fn mysql() -> Self {
        Self::new("MySQL")
    }

    pub const fn postgres() -> Self {
        Self::new("PostgreSQL")
    }
}

impl Dialect for Literal {
    fn name(&self) -> &'static str {
        self.name
    }
}

/// Native bind rules: values go to the driver unquoted and the driver does the
/// escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Native {
    name: &'static str,
}

impl Native {
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub const fn oracle() -> Self {
        Self::new("Oracle")
    }

    /// Server-side prepared statements on MySQL.
    pub const fn mysql() -> Self {
        Self::new("MySQL")
    }
}

impl Dialect for Native {
    fn name(&self) -> &'static str {
        self.name
    }

    fn escapes_text(&self) -> bool {
        false
    }

    fn cast_null(&self) -> CastResult {
        CastResult::Bound(BoundValue::Null)
    }

    fn cast_boolean(&self, value: bool) -> CastResult {
        CastResult::Bound(BoundValue::Int(i64::from(value)))
    }

    fn cast_integer(&self, value: i64) -> CastResult {
        CastResult::Bound(BoundValue::Int(value))
    }

    fn cast_decimal(&self, value: f64) -> CastResult {
        CastResult::Bound(BoundValue::Float(value))
    }

    fn cast_datetime(&self, value: &NaiveDateTime) -> CastResult {
        CastResult::Bound(BoundValue::Text(value.format(DATETIME_FORMAT).to_string()))
    }

    fn cast_text(&self, value: &str, _session: &dyn Session) -> crate::Result<CastResult> {
        Ok(CastResult::Bound(BoundValue::Text(value.to_owned())))
    }

    fn join(&self, parts: Vec<CastResult>) -> CastResult {
        let parts: Vec<String> = parts
            .into_iter()
            .map(|part| match part {
                CastResult::Literal(sql) => sql,
                CastResult::Bound(value) => value.to_string(),
            })
            .collect();
        CastResult::Bound(BoundValue::Text(parts.join(",")))
    }
}

/// How a backend gets parameter values into a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    TextSubstitution,
    NativeBind,
}

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    MySql,
    Postgres,
    Oracle,
}

impl Backend {
    pub fn name(self) -> &'static str {
        match self {
            Backend::MySql => "MySQL",
            Backend::Postgres => "PostgreSQL",
            Backend::Oracle => "Oracle",
        }
    }

    pub fn binding(self) -> Binding {
        match self {
            Backend::MySql | Backend::Postgres => Binding::TextSubstitution,
            Backend::Oracle => Binding::NativeBind,
        }
    }

    /// Escape style assumed before the server's settings are known.
    pub fn default_escape_style(self) -> EscapeStyle {
        match self {
            Backend::MySql => EscapeStyle::MySql {
                no_backslash_escapes: false,
            },
            Backend::Postgres => EscapeStyle::Postgres {
                standard_conforming_strings: true,
            },
            Backend::Oracle => EscapeStyle::Ansi,
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" | "mysqli" => Ok(Backend::MySql),
            "postgres" | "postgresql" | "pgsql" => Ok(Backend::Postgres),
            "oracle" | "oci" => Ok(Backend::Oracle),
            _ => Err(format!("no connector for database type '{s}'")),
        }
    }
}

/// Casts classified values with the rules of one [`Dialect`].
#[derive(Debug, Clone)]
pub struct Caster<D> {
    dialect: D,
    options: BindOptions,
}

impl<D: Dialect> Caster<D> {
    pub fn new(dialect: D) -> Self {
        Self::with_options(dialect, BindOptions::default())
    }

    pub fn with_options(dialect: D, options: BindOptions) -> Self {
        Self { dialect, options }
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    pub fn options(&self) -> BindOptions {
        self.options
    }

    /// Classifies `value` and casts it.
    ///
    /// # Errors
    ///
    /// See [`classify`] and [`Caster::cast`].
    pub fn cast_value(
        &self,
        value: &Value,
        session: &mut dyn Session,
    ) -> crate::Result<CastResult> {
        let tag = classify(value)?;
        self.cast(tag, value, session)
    }

    /// Casts `value` as `tag`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownType`] if `value` cannot be read as `tag`
    /// - [`Error::ConnectionRequired`] if text needs escaping, the session is not
    ///   connected and auto-connect is off
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlx_cast_bind::cast::{CastResult, Caster, Literal};
    /// use sqlx_cast_bind::session::{EscapeSession, EscapeStyle};
    /// use sqlx_cast_bind::{TypeTag, Value};
    ///
    /// let caster = Caster::new(Literal::mysql());
    /// let mut session = EscapeSession::new(EscapeStyle::MySql { no_backslash_escapes: false });
    ///
    /// let cast = caster.cast(TypeTag::Text, &Value::from("O'Hara"), &mut session)?;
    /// assert_eq!(cast, CastResult::Literal("'O\\'Hara'".to_string()));
    /// # Ok::<(), sqlx_cast_bind::Error>(())
    /// ```
    pub fn cast(
        &self,
        tag: TypeTag,
        value: &Value,
        session: &mut dyn Session,
    ) -> crate::Result<CastResult> {
        match tag {
            TypeTag::Null => Ok(self.dialect.cast_null()),
            TypeTag::Boolean => Ok(self.dialect.cast_boolean(truthy(value))),
            TypeTag::Integer => self.cast_integer(value, session),
            TypeTag::Decimal => {
                let decimal = numeric_text(value)
                    .and_then(|text| text.parse::<f64>().ok())
                    .filter(|f| f.is_finite())
                    .ok_or_else(|| mismatch(tag, value))?;
                Ok(self.dialect.cast_decimal(decimal))
            }
            TypeTag::DateTime => match value {
                Value::DateTime(dt) => Ok(self.dialect.cast_datetime(dt)),
                other => Err(mismatch(tag, other)),
            },
            TypeTag::Text => {
                let text = match value {
                    Value::Text(s) => s.clone(),
                    other => numeric_text(other).ok_or_else(|| mismatch(tag, other))?,
                };
                self.cast_text(&text, session)
            }
            TypeTag::Sequence => match value {
                Value::List(items) => {
                    let parts = items
                        .iter()
                        .map(|item| self.cast_value(item, session))
                        .collect::<crate::Result<Vec<_>>>()?;
                    Ok(self.dialect.join(parts))
                }
                other => Err(mismatch(tag, other)),
            },
        }
    }

    fn cast_integer(
        &self,
        value: &Value,
        session: &mut dyn Session,
    ) -> crate::Result<CastResult> {
        let text = numeric_text(value)
            .filter(|text| is_canonical_integer(text))
            .ok_or_else(|| mismatch(TypeTag::Integer, value))?;
        match text.parse::<i64>() {
            Ok(int) => Ok(self.dialect.cast_integer(int)),
            Err(_) => {
                tracing::warn!(
                    backend = self.dialect.name(),
                    digits = text.len(),
                    "integer exceeds i64, casting as text"
                );
                self.cast_text(&text, session)
            }
        }
    }

    fn cast_text(&self, text: &str, session: &mut dyn Session) -> crate::Result<CastResult> {
        if self.dialect.escapes_text() && !session.is_connected() {
            if !self.options.auto_connect {
                return Err(Error::ConnectionRequired);
            }
            session.connect()?;
        }
        self.dialect.cast_text(text, session)
    }
}

/// `value != 0`
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Text(s) => s.trim().parse::<f64>().map_or(!s.is_empty(), |f| f != 0.0),
        Value::DateTime(_) => true,
        Value::List(items) => !items.is_empty(),
    }
}

fn mismatch(tag: TypeTag, value: &Value) -> Error {
    Error::UnknownType(format!("value {value:?} as {tag}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::EscapeSession;
    use chrono::NaiveDate;

    fn mysql_session() -> EscapeSession {
        EscapeSession::new(EscapeStyle::MySql {
            no_backslash_escapes: false,
        })
    }

    fn literal(v: impl Into<Value>) -> String {
        let caster = Caster::new(Literal::mysql());
        match caster.cast_value(&v.into(), &mut mysql_session()).unwrap() {
            CastResult::Literal(sql) => sql,
            other => panic!("expected literal, got {other:?}"),
        }
    }

    fn bound(v: impl Into<Value>) -> BoundValue {
        let caster = Caster::new(Native::oracle());
        let mut session = EscapeSession::detached(EscapeStyle::Ansi);
        match caster.cast_value(&v.into(), &mut session).unwrap() {
            CastResult::Bound(value) => value,
            other => panic!("expected bound value, got {other:?}"),
        }
    }

    fn sample_datetime() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(1973, 11, 29)
            .unwrap()
            .and_hms_opt(21, 33, 9)
            .unwrap()
    }

    #[test]
    fn test_literal_scalars() {
        assert_eq!(literal(Value::Null), "NULL");
        assert_eq!(literal(true), "1");
        assert_eq!(literal(false), "0");
        assert_eq!(literal(42), "42");
        assert_eq!(literal("-7"), "-7");
        assert_eq!(literal(2.5), "2.5");
        assert_eq!(literal("0.1"), "0.1");
        assert_eq!(literal(sample_datetime()), "'1973-11-29 21:33:09'");
        assert_eq!(literal("abc%"), "'abc%'");
    }

    #[test]
    fn test_leading_zero_text_keeps_zeros() {
        assert_eq!(literal("000123"), "'000123'");
    }

    #[test]
    fn test_integer_overflow_falls_back_to_text() {
        assert_eq!(literal("99999999999999999999"), "'99999999999999999999'");
        assert_eq!(literal(u64::MAX), "'18446744073709551615'");
        assert_eq!(literal(i64::MAX), "9223372036854775807");
    }

    #[test]
    fn test_huge_float_casts_as_decimal() {
        assert_eq!(literal(1e20), "100000000000000000000");
        assert_eq!(bound(1e20), BoundValue::Float(1e20));
        assert_eq!(bound(-2e19), BoundValue::Float(-2e19));
    }

    #[test]
    fn test_sequence_joins_without_parentheses() {
        assert_eq!(literal(vec![1, 2, 3]), "1,2,3");
        assert_eq!(
            literal(Value::List(vec![
                Value::from("a'b"),
                Value::Null,
                Value::from(vec![4, 5]),
            ])),
            "'a\\'b',NULL,4,5"
        );
        assert_eq!(literal(Vec::<i32>::new()), "");
    }

    #[test]
    fn test_sequence_equals_concatenated_casts() {
        let items = [Value::from("x"), Value::from(7), Value::from(0.25)];
        let joined = items
            .iter()
            .map(|v| literal(v.clone()))
            .collect::<Vec<_>>()
            .join(",");
        assert_eq!(literal(items.to_vec()), joined);
    }

    #[test]
    fn test_cast_is_idempotent() {
        let caster = Caster::new(Literal::mysql());
        let mut session = mysql_session();
        let value = Value::from("it's");
        let first = caster.cast_value(&value, &mut session).unwrap();
        let second = caster.cast_value(&value, &mut session).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_explicit_boolean_tag_uses_value_not_zero() {
        let caster = Caster::new(Literal::mysql());
        let mut session = mysql_session();
        let cast = |v: Value| caster.cast(TypeTag::Boolean, &v, &mut mysql_session()).unwrap();
        assert_eq!(cast(Value::Int(5)), CastResult::Literal("1".into()));
        assert_eq!(cast(Value::Int(0)), CastResult::Literal("0".into()));
        assert_eq!(cast(Value::from("0")), CastResult::Literal("0".into()));
        assert!(caster
            .cast(TypeTag::DateTime, &Value::Int(1), &mut session)
            .is_err());
    }

    #[test]
    fn test_native_values() {
        assert_eq!(bound(Value::Null), BoundValue::Null);
        assert_eq!(bound(true), BoundValue::Int(1));
        assert_eq!(bound(12), BoundValue::Int(12));
        assert_eq!(bound("1.5"), BoundValue::Float(1.5));
        assert_eq!(
            bound(sample_datetime()),
            BoundValue::Text("1973-11-29 21:33:09".to_string())
        );
        assert_eq!(bound("O'Hara"), BoundValue::Text("O'Hara".to_string()));
        assert_eq!(
            bound("123456789012345678901234"),
            BoundValue::Text("123456789012345678901234".to_string())
        );
        assert_eq!(bound(vec!["a", "b"]), BoundValue::Text("a,b".to_string()));
    }

    #[test]
    fn test_native_text_needs_no_connection() {
        let caster = Caster::with_options(Native::oracle(), BindOptions { auto_connect: false });
        let mut session = EscapeSession::detached(EscapeStyle::Ansi);
        assert!(caster.cast_value(&Value::from("x"), &mut session).is_ok());
    }

    #[test]
    fn test_text_without_connection() {
        let strict = Caster::with_options(Literal::mysql(), BindOptions { auto_connect: false });
        let mut session = EscapeSession::detached(Backend::MySql.default_escape_style());
        let err = strict
            .cast_value(&Value::from("x"), &mut session)
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionRequired));
        // numbers never touch the session
        assert!(strict.cast_value(&Value::from(1), &mut session).is_ok());

        let lazy = Caster::new(Literal::mysql());
        assert_eq!(
            lazy.cast_value(&Value::from("x"), &mut session).unwrap(),
            CastResult::Literal("'x'".to_string())
        );
        assert!(session.is_connected());
    }

    #[test]
    fn test_backend_selection() {
        assert_eq!("MySQLi".parse::<Backend>().unwrap(), Backend::MySql);
        assert_eq!("pgsql".parse::<Backend>().unwrap(), Backend::Postgres);
        assert_eq!(Backend::Oracle.binding(), Binding::NativeBind);
        assert_eq!(Backend::Postgres.binding(), Binding::TextSubstitution);
        assert!("sybase".parse::<Backend>().is_err());
    }
}
