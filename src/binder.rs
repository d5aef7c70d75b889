//! Placeholder resolution.
//!
//! [`TextBinder`] embeds cast literals into the SQL text, [`NativeBinder`] keeps
//! the text intact and registers bound values by placeholder name. Both cast every
//! parameter of the map, whether or not the template mentions it.

use std::collections::BTreeMap;

use regex::Regex;

use crate::builder::{placeholder_pattern, scan, substitute};
use crate::cast::{BindOptions, BoundValue, CastResult, Caster, Dialect, Literal, Native};
use crate::error::Error;
use crate::session::Session;
use crate::value::{Params, Value};

fn cast_param<D: Dialect>(
    caster: &Caster<D>,
    name: &str,
    value: &Value,
    session: &mut dyn Session,
) -> crate::Result<CastResult> {
    caster.cast_value(value, session).map_err(|e| match e {
        Error::UnknownType(_) => Error::UnknownType(format!("parameter '{name}'")),
        other => other,
    })
}

fn unsupported(dialect: &dyn Dialect, operation: &'static str) -> Error {
    Error::UnsupportedOperation {
        backend: dialect.name(),
        operation,
    }
}

/// Binds parameters by literal substitution.
///
/// # Examples
///
/// ```
/// use sqlx_cast_bind::{params, TextBinder};
/// use sqlx_cast_bind::cast::Literal;
/// use sqlx_cast_bind::session::{EscapeSession, EscapeStyle};
///
/// let binder = TextBinder::new(Literal::mysql())?;
/// let mut session = EscapeSession::new(EscapeStyle::MySql { no_backslash_escapes: false });
///
/// let sql = binder.bind(
///     "SELECT * FROM t WHERE id = :id AND name LIKE :name",
///     &params! { "id" => 3, "name" => "abc%" },
///     &mut session,
/// )?;
/// assert_eq!(sql, "SELECT * FROM t WHERE id = 3 AND name LIKE 'abc%'");
/// # Ok::<(), sqlx_cast_bind::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TextBinder<D = Literal> {
    caster: Caster<D>,
    pattern: Regex,
}

impl<D: Dialect> TextBinder<D> {
    /// # Errors
    ///
    /// Returns an error if the placeholder pattern cannot be compiled.
    pub fn new(dialect: D) -> crate::Result<Self> {
        Self::with_options(dialect, BindOptions::default())
    }

    /// # Errors
    ///
    /// Returns an error if the placeholder pattern cannot be compiled.
    pub fn with_options(dialect: D, options: BindOptions) -> crate::Result<Self> {
        Ok(Self {
            caster: Caster::with_options(dialect, options),
            pattern: placeholder_pattern()?,
        })
    }

    pub fn caster(&self) -> &Caster<D> {
        &self.caster
    }

    /// Casts every parameter to its SQL literal.
    ///
    /// # Errors
    ///
    /// Fails on the first parameter that cannot be cast, or with
    /// [`Error::UnsupportedOperation`] if the dialect does not produce literals.
    pub fn cast_params(
        &self,
        params: &Params,
        session: &mut dyn Session,
    ) -> crate::Result<BTreeMap<String, String>> {
        let mut literals = BTreeMap::new();
        for (name, value) in params {
            match cast_param(&self.caster, name, value, session)? {
                CastResult::Literal(sql) => {
                    literals.insert(name.clone(), sql);
                }
                CastResult::Bound(_) => {
                    return Err(unsupported(self.caster.dialect(), "text substitution"));
                }
            }
        }
        Ok(literals)
    }

    /// Substitutes `:name` tokens of `template` with the cast parameters.
    ///
    /// Tokens without a parameter are left as they are.
    ///
    /// # Errors
    ///
    /// See [`TextBinder::cast_params`]. Nothing is substituted if any cast fails.
    pub fn bind(
        &self,
        template: &str,
        params: &Params,
        session: &mut dyn Session,
    ) -> crate::Result<String> {
        tracing::debug!(
            backend = self.caster.dialect().name(),
            params = params.len(),
            "binding by text substitution"
        );
        let literals = self.cast_params(params, session)?;
        Ok(substitute(&self.pattern, template, &literals))
    }
}

/// Binds parameters as native bind variables.
#[derive(Debug, Clone)]
pub struct NativeBinder<D = Native> {
    caster: Caster<D>,
    pattern: Regex,
}

impl<D: Dialect> NativeBinder<D> {
    /// # Errors
    ///
    /// Returns an error if the placeholder pattern cannot be compiled.
    pub fn new(dialect: D) -> crate::Result<Self> {
        Self::with_options(dialect, BindOptions::default())
    }

    /// # Errors
    ///
    /// Returns an error if the placeholder pattern cannot be compiled.
    pub fn with_options(dialect: D, options: BindOptions) -> crate::Result<Self> {
        Ok(Self {
            caster: Caster::with_options(dialect, options),
            pattern: placeholder_pattern()?,
        })
    }

    pub fn caster(&self) -> &Caster<D> {
        &self.caster
    }

    /// Casts every parameter and registers it under its name.
    ///
    /// # Errors
    ///
    /// Fails on the first parameter that cannot be cast, or with
    /// [`Error::UnsupportedOperation`] if the dialect produces literals.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlx_cast_bind::{params, NativeBinder};
    /// use sqlx_cast_bind::cast::{BoundValue, Native};
    /// use sqlx_cast_bind::session::{EscapeSession, EscapeStyle};
    ///
    /// let binder = NativeBinder::new(Native::oracle())?;
    /// let mut session = EscapeSession::new(EscapeStyle::Ansi);
    ///
    /// let stmt = binder.bind("SELECT * FROM t WHERE id = :id", &params! { "id" => 3 }, &mut session)?;
    /// assert_eq!(stmt.sql(), "SELECT * FROM t WHERE id = :id");
    /// assert_eq!(stmt.value("id"), Some(&BoundValue::Int(3)));
    /// # Ok::<(), sqlx_cast_bind::Error>(())
    /// ```
    pub fn bind(
        &self,
        template: &str,
        params: &Params,
        session: &mut dyn Session,
    ) -> crate::Result<BoundStatement> {
        tracing::debug!(
            backend = self.caster.dialect().name(),
            params = params.len(),
            "binding native variables"
        );
        let mut values = BTreeMap::new();
        for (name, value) in params {
            match cast_param(&self.caster, name, value, session)? {
                CastResult::Bound(bound) => {
                    values.insert(name.clone(), bound);
                }
                CastResult::Literal(_) => {
                    return Err(unsupported(self.caster.dialect(), "native binding"));
                }
            }
        }
        Ok(BoundStatement {
            sql: template.to_owned(),
            order: scan(&self.pattern, template),
            values,
        })
    }
}

/// A statement with its bind variables registered by name.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    sql: String,
    order: Vec<String>,
    values: BTreeMap<String, BoundValue>,
}

impl BoundStatement {
    /// The SQL text, placeholders untouched.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Placeholder names in order of appearance, repeats included.
    pub fn placeholders(&self) -> &[String] {
        &self.order
    }

    pub fn value(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &BTreeMap<String, BoundValue> {
        &self.values
    }

    /// The SQL with `?` for every placeholder.
    ///
    /// # Errors
    ///
    /// Returns an error if the placeholder pattern cannot be compiled.
    pub fn positional_sql(&self) -> crate::Result<String> {
        crate::builder::build_query(&self.sql)
    }

    /// Values in placeholder order, one per occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnboundPlaceholder`] for a placeholder without a value.
    pub fn positional_values(&self) -> crate::Result<Vec<BoundValue>> {
        self.order
            .iter()
            .map(|name| {
                self.values
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::UnboundPlaceholder(name.clone()))
            })
            .collect()
    }
}
