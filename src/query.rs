use sqlx::mysql::{MySqlArguments, MySqlQueryResult};
use sqlx::{Arguments, Executor, MySql};

use crate::binder::{BoundStatement, NativeBinder};
use crate::cast::{BoundValue, Native};
use crate::session::{EscapeSession, EscapeStyle};
use crate::value::Params;

/// Encodes natively cast values as positional MySQL arguments.
pub(crate) fn arguments(values: &[BoundValue]) -> crate::Result<MySqlArguments> {
    let mut args = MySqlArguments::default();
    for value in values {
        match value {
            BoundValue::Null => args.add(None::<String>),
            BoundValue::Int(v) => args.add(*v),
            BoundValue::Float(v) => args.add(*v),
            BoundValue::Text(v) => args.add(v.clone()),
        }
        .map_err(sqlx::Error::Encode)?;
    }
    Ok(args)
}

/// Casts `params` with the native rules and registers them on `template`.
pub(crate) fn bind_native(template: &str, params: &Params) -> crate::Result<BoundStatement> {
    // native casts never escape, the session stays detached
    let mut session = EscapeSession::detached(EscapeStyle::MySql {
        no_backslash_escapes: false,
    });
    NativeBinder::new(Native::mysql())?.bind(template, params, &mut session)
}

/// A natively bound statement ready to run on MySQL.
///
/// The named placeholders of the statement are turned into positional `?`
/// placeholders and the registered values are bound in placeholder order, so a
/// name used twice is bound twice.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::MySqlPool;
/// use sqlx_cast_bind::{params, PreparedQuery};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let query = PreparedQuery::from_template(
///     "INSERT INTO users (user_id, name) VALUES (:user_id, :name)",
///     &params! { "user_id" => 42, "name" => "John Doe" },
/// )?;
///
/// let result = query.execute(&pool).await?;
/// println!("Inserted {} rows", result.rows_affected());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    sql: String,
    args: Vec<BoundValue>,
}

impl PreparedQuery {
    /// Prepares a statement produced by a [`NativeBinder`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnboundPlaceholder`](crate::Error::UnboundPlaceholder) if
    /// a placeholder has no registered value.
    pub fn new(statement: &BoundStatement) -> crate::Result<Self> {
        Ok(Self {
            sql: statement.positional_sql()?,
            args: statement.positional_values()?,
        })
    }

    /// Casts `params` and prepares `template` in one step.
    ///
    /// # Errors
    ///
    /// Fails if a parameter cannot be cast or a placeholder is left unbound.
    pub fn from_template(template: &str, params: &Params) -> crate::Result<Self> {
        Self::new(&bind_native(template, params)?)
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn args(&self) -> &[BoundValue] {
        &self.args
    }

    /// Executes the prepared query using the provided executor.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn execute<'e, E>(&self, executor: E) -> crate::Result<MySqlQueryResult>
    where
        E: Executor<'e, Database = MySql>,
    {
        tracing::debug!(sql = %self.sql, args = self.args.len(), "executing prepared statement");
        let args = arguments(&self.args)?;
        Ok(sqlx::query_with::<MySql, _>(&self.sql, args)
            .execute(executor)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn test_prepared_query_from_template() {
        let query = PreparedQuery::from_template(
            "SELECT * FROM users WHERE id = :id AND name = :name",
            &params! { "id" => 42, "name" => "it's" },
        )
        .unwrap();

        assert_eq!(query.sql(), "SELECT * FROM users WHERE id = ? AND name = ?");
        assert_eq!(
            query.args(),
            [BoundValue::Int(42), BoundValue::Text("it's".to_string())]
        );
    }

    #[test]
    fn test_prepared_query_repeated_placeholders() {
        let query = PreparedQuery::from_template(
            "SELECT * FROM users WHERE id = :id OR user_id = :id",
            &params! { "id" => 1 },
        )
        .unwrap();

        assert_eq!(query.sql(), "SELECT * FROM users WHERE id = ? OR user_id = ?");
        assert_eq!(query.args(), [BoundValue::Int(1), BoundValue::Int(1)]);
    }

    #[test]
    fn test_arguments_one_per_value() {
        let args = arguments(&[
            BoundValue::Null,
            BoundValue::Int(1),
            BoundValue::Float(0.5),
            BoundValue::Text("x".to_string()),
        ])
        .unwrap();
        assert_eq!(args.len(), 4);
        assert_eq!(arguments(&[]).unwrap().len(), 0);
    }

    #[test]
    fn test_prepared_query_unbound_placeholder() {
        let err = PreparedQuery::from_template("SELECT :missing", &params! {}).unwrap_err();
        assert!(matches!(err, crate::Error::UnboundPlaceholder(name) if name == "missing"));
    }
}
