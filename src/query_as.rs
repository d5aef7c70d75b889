use std::marker::PhantomData;

use sqlx::mysql::{MySqlArguments, MySqlRow};
use sqlx::query::QueryAs;
use sqlx::{Executor, MySql};

use crate::binder::BoundStatement;
use crate::cast::BoundValue;
use crate::query::{arguments, bind_native};
use crate::value::Params;

/// A natively bound statement returning typed rows.
///
/// `PreparedQueryAs` is the row-returning sibling of
/// [`PreparedQuery`](crate::PreparedQuery), decoding rows with SQLx's `FromRow`.
///
/// # Examples
///
/// ```rust,no_run
/// use sqlx::{MySqlPool, FromRow};
/// use sqlx_cast_bind::{params, PreparedQueryAs};
///
/// #[derive(FromRow)]
/// struct User {
///     id: i32,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let pool = MySqlPool::connect("mysql://localhost/test").await?;
/// let query = PreparedQueryAs::<User>::from_template(
///     "SELECT id, name FROM users WHERE age >= :min_age",
///     &params! { "min_age" => 18 },
/// )?;
///
/// let users: Vec<User> = query.fetch_all(&pool).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PreparedQueryAs<R> {
    sql: String,
    args: Vec<BoundValue>,
    _pd: PhantomData<fn() -> R>,
}

impl<R> PreparedQueryAs<R>
where
    for<'row> R: sqlx::FromRow<'row, MySqlRow> + Send + Unpin,
{
    /// Prepares a statement produced by a [`NativeBinder`](crate::NativeBinder).
    ///
    /// # Errors
    ///
    /// Returns an error if a placeholder has no registered value.
    pub fn new(statement: &BoundStatement) -> crate::Result<Self> {
        Ok(Self {
            sql: statement.positional_sql()?,
            args: statement.positional_values()?,
            _pd: PhantomData,
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

    fn query(&self) -> crate::Result<QueryAs<'_, MySql, R, MySqlArguments>> {
        tracing::debug!(sql = %self.sql, args = self.args.len(), "executing prepared statement");
        Ok(sqlx::query_as_with(&self.sql, arguments(&self.args)?))
    }

    /// Executes the query and returns all matching rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or if any row cannot be converted to type `R`.
    pub async fn fetch_all<'e, E>(&self, executor: E) -> crate::Result<Vec<R>>
    where
        E: Executor<'e, Database = MySql>,
    {
        Ok(self.query()?.fetch_all(executor).await?)
    }

    /// Executes the query and returns exactly one row.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No rows are found
    /// - The query fails
    /// - The row cannot be converted to type `R`
    pub async fn fetch_one<'e, E>(&self, executor: E) -> crate::Result<R>
    where
        E: Executor<'e, Database = MySql>,
    {
        Ok(self.query()?.fetch_one(executor).await?)
    }

    /// Executes the query and returns at most one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the row cannot be converted to type `R`.
    pub async fn fetch_optional<'e, E>(&self, executor: E) -> crate::Result<Option<R>>
    where
        E: Executor<'e, Database = MySql>,
    {
        Ok(self.query()?.fetch_optional(executor).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[derive(sqlx::FromRow)]
    struct TestRow {
        #[allow(dead_code)]
        id: i32,
    }

    #[test]
    fn test_prepared_query_as_sequence_is_one_argument() {
        let query = PreparedQueryAs::<TestRow>::from_template(
            "SELECT id FROM users WHERE id = :id AND tag = :tags",
            &params! { "id" => 5, "tags" => vec!["a", "b"] },
        )
        .unwrap();

        assert_eq!(query.sql(), "SELECT id FROM users WHERE id = ? AND tag = ?");
        assert_eq!(
            query.args,
            vec![BoundValue::Int(5), BoundValue::Text("a,b".to_string())]
        );
    }
}
