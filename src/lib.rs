//! # sqlx-cast-bind
//!
//! Type-aware parameter binding for SQL statements with `:name` placeholders,
//! built on SQLx.
//!
//! Every parameter is classified into a small set of SQL-relevant types, cast
//! with the rules of the target backend and then either substituted into the
//! statement text as an escaped literal or registered for native binding.
//!
//! ## Features
//!
//! - **Classification**: Numeric strings, booleans, timestamps and lists are recognized by content
//! - **Per-Backend Casting**: Literal rules for MySQL/PostgreSQL, native bind rules for Oracle-style drivers
//! - **Injection-Safe Substitution**: Text is escaped the way the connected session expects
//! - **Schema Validation**: Declare types, mandatory parameters and defaults per statement
//! - **SQLx Integration**: `PreparedQuery` and `PreparedQueryAs` run natively bound statements on any MySQL `Executor`
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["mysql", "runtime-tokio"] }
//! sqlx-cast-bind = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Text Substitution
//!
//! ```
//! use sqlx_cast_bind::cast::Literal;
//! use sqlx_cast_bind::session::{EscapeSession, EscapeStyle};
//! use sqlx_cast_bind::{params, TextBinder};
//!
//! let binder = TextBinder::new(Literal::mysql())?;
//! let mut session = EscapeSession::new(EscapeStyle::MySql { no_backslash_escapes: false });
//!
//! let sql = binder.bind(
//!     "SELECT * FROM t WHERE id = :id AND name = :name",
//!     &params! { "id" => 3, "name" => "O'Hara" },
//!     &mut session,
//! )?;
//! assert_eq!(sql, r"SELECT * FROM t WHERE id = 3 AND name = 'O\'Hara'");
//! # Ok::<(), sqlx_cast_bind::Error>(())
//! ```
//!
//! ### Native Binding
//!
//! ```rust,no_run
//! use sqlx::MySqlPool;
//! use sqlx_cast_bind::{params, PreparedQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = MySqlPool::connect("mysql://localhost/test").await?;
//!
//! let query = PreparedQuery::from_template(
//!     "INSERT INTO users (id, name, active) VALUES (:id, :name, :active)",
//!     &params! { "id" => 42, "name" => "John Doe", "active" => true },
//! )?;
//!
//! let result = query.execute(&pool).await?;
//! println!("Inserted {} rows", result.rows_affected());
//! # Ok(())
//! # }
//! ```
//!
//! ### Using with Transactions
//!
//! ```rust,no_run
//! use sqlx::{MySql, MySqlPool, Transaction};
//! use sqlx_cast_bind::{params, PreparedQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let pool = MySqlPool::connect("mysql://localhost/test").await?;
//! let mut tx: Transaction<MySql> = pool.begin().await?;
//!
//! let debit = PreparedQuery::from_template(
//!     "UPDATE accounts SET balance = balance - :amount WHERE id = :id",
//!     &params! { "amount" => 100, "id" => 1 },
//! )?;
//! let credit = PreparedQuery::from_template(
//!     "UPDATE accounts SET balance = balance + :amount WHERE id = :id",
//!     &params! { "amount" => 100, "id" => 2 },
//! )?;
//!
//! debit.execute(&mut *tx).await?;
//! credit.execute(&mut *tx).await?;
//!
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Validating Parameters
//!
//! ```
//! use sqlx_cast_bind::mapper::{Rule, Schema};
//! use sqlx_cast_bind::{params, TypeTag, Value};
//!
//! let schema = Schema::new()
//!     .rule("id", Rule::new(TypeTag::Integer).mandatory())
//!     .rule("limit", Rule::new(TypeTag::Integer).default_value(50));
//!
//! let params = schema.validate(params! { "id" => 7 })?;
//! assert_eq!(params["limit"], Value::Int(50));
//! assert!(schema.validate(params! { "limit" => 5 }).is_err());
//! # Ok::<(), sqlx_cast_bind::Error>(())
//! ```
//!
//! ## How It Works
//!
//! 1. **Classify**: Each value gets a [`TypeTag`], with numeric strings promoted to numbers
//! 2. **Cast**: A [`Dialect`](cast::Dialect) turns the value into a literal or a bindable value
//! 3. **Bind**: Placeholders are replaced in one pass, so substituted text is never rescanned
//!
//! ## Limitations
//!
//! - Placeholder names must match `[a-zA-Z0-9_]+`
//! - PostgreSQL `::type` casts look like placeholders; write `CAST(x AS type)` instead
//! - Native binding of a list registers a single comma-joined text value
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at your option.

pub mod binder;
pub mod builder;
pub mod cast;
pub mod classify;
pub mod connector;
pub mod error;
pub mod mapper;
pub mod query;
pub mod query_as;
pub mod session;
pub mod value;

pub use binder::{BoundStatement, NativeBinder, TextBinder};
pub use classify::TypeTag;
pub use error::{Error, Result, ValidationError};
pub use mapper::{Rule, Schema};
pub use query::PreparedQuery;
pub use query_as::PreparedQueryAs;
pub use value::{Params, Value};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::connector::{Connector, MySqlConnector};
    pub use crate::error::{Error, Result};
    pub use crate::params;
    pub use crate::{NativeBinder, PreparedQuery, PreparedQueryAs, Schema, TextBinder, Value};
}
