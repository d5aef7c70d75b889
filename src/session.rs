//! Connection-bound string escaping.
//!
//! Escaping rules depend on settings of the live server session
//! (`NO_BACKSLASH_ESCAPES` on MySQL, `standard_conforming_strings` on PostgreSQL),
//! so text literals are always escaped through a [`Session`] handed to the binder
//! by the caller. There is no global connection.

use sqlx::{Executor, MySql, Postgres};

use crate::error::Error;

/// A handle to the connection whose escaping rules apply.
pub trait Session {
    /// Returns `true` if the handle is attached to a live connection.
    fn is_connected(&self) -> bool;

    /// Establishes the connection. Handles that cannot connect on their own
    /// fail with [`Error::ConnectionRequired`].
    fn connect(&mut self) -> crate::Result<()> {
        Err(Error::ConnectionRequired)
    }

    /// Escapes `text` for use between single quotes. The quotes are not added.
    fn escape_string(&self, text: &str) -> crate::Result<String>;
}

/// The escape routine of a server session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeStyle {
    /// `mysql_real_escape_string`, or quote doubling under `NO_BACKSLASH_ESCAPES`
    MySql { no_backslash_escapes: bool },
    /// `PQescapeStringConn`
    Postgres { standard_conforming_strings: bool },
    /// Plain SQL quote doubling
    Ansi,
}

impl EscapeStyle {
    pub fn escape(self, text: &str) -> String {
        match self {
            EscapeStyle::MySql {
                no_backslash_escapes: false,
            } => escape_mysql(text),
            EscapeStyle::Postgres {
                standard_conforming_strings: false,
            } => escape_backslash_and_quote(text),
            EscapeStyle::MySql { .. } | EscapeStyle::Postgres { .. } | EscapeStyle::Ansi => {
                text.replace('\'', "''")
            }
        }
    }
}

fn escape_mysql(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\x1a' => out.push_str("\\Z"),
            c => out.push(c),
        }
    }
    out
}

fn escape_backslash_and_quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("''"),
            c => out.push(c),
        }
    }
    out
}

/// A session snapshot carrying the escape style of a server connection.
///
/// Sessions built with [`EscapeSession::new`] or read from a server are live.
/// A [`detached`](EscapeSession::detached) session refuses to escape until
/// [`Session::connect`] attaches it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeSession {
    style: EscapeStyle,
    connected: bool,
}

impl EscapeSession {
    pub fn new(style: EscapeStyle) -> Self {
        Self {
            style,
            connected: true,
        }
    }

    pub fn detached(style: EscapeStyle) -> Self {
        Self {
            style,
            connected: false,
        }
    }

    pub fn style(&self) -> EscapeStyle {
        self.style
    }

    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

impl Session for EscapeSession {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn connect(&mut self) -> crate::Result<()> {
        tracing::debug!(style = ?self.style, "attaching escape session");
        self.connected = true;
        Ok(())
    }

    fn escape_string(&self, text: &str) -> crate::Result<String> {
        if !self.connected {
            return Err(Error::ConnectionRequired);
        }
        Ok(self.style.escape(text))
    }
}

/// Reads the escape settings of a live MySQL session.
///
/// # Errors
///
/// Returns an error if the `sql_mode` query fails.
pub async fn mysql_session<'e, E>(executor: E) -> crate::Result<EscapeSession>
where
    E: Executor<'e, Database = MySql>,
{
    let (mode,): (String,) = sqlx::query_as("SELECT @@SESSION.sql_mode")
        .fetch_one(executor)
        .await?;
    let no_backslash_escapes = mode
        .split(',')
        .any(|m| m.trim().eq_ignore_ascii_case("NO_BACKSLASH_ESCAPES"));
    tracing::debug!(%mode, no_backslash_escapes, "read MySQL session escape mode");
    Ok(EscapeSession::new(EscapeStyle::MySql {
        no_backslash_escapes,
    }))
}

/// Reads the escape settings of a live PostgreSQL session.
///
/// # Errors
///
/// Returns an error if the `SHOW` statement fails.
pub async fn postgres_session<'e, E>(executor: E) -> crate::Result<EscapeSession>
where
    E: Executor<'e, Database = Postgres>,
{
    let (setting,): (String,) = sqlx::query_as("SHOW standard_conforming_strings")
        .fetch_one(executor)
        .await?;
    let standard_conforming_strings = setting.eq_ignore_ascii_case("on");
    tracing::debug!(%setting, "read PostgreSQL session escape mode");
    Ok(EscapeSession::new(EscapeStyle::Postgres {
        standard_conforming_strings,
    }))
}
