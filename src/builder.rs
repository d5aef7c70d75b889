use std::collections::BTreeMap;

use regex::{Captures, Regex};

/// Pattern of a named placeholder. The identifier is captured as group 1.
pub const PLACEHOLDER: &str = r":([a-zA-Z0-9_]+)";

/// Compiles [`PLACEHOLDER`].
pub fn placeholder_pattern() -> crate::Result<Regex> {
    Ok(Regex::new(PLACEHOLDER)?)
}

/// Converts named placeholders (`:name`) to positional placeholders (`?`).
///
/// Used by [`BoundStatement`](crate::binder::BoundStatement) when handing a
/// natively bound statement to a driver with positional arguments.
///
/// # Examples
///
/// ```
/// use sqlx_cast_bind::builder::build_query;
///
/// let sql = build_query("SELECT * FROM users WHERE id = :id AND name = :name")?;
/// assert_eq!(sql, "SELECT * FROM users WHERE id = ? AND name = ?");
/// # Ok::<(), sqlx_cast_bind::Error>(())
/// ```
pub fn build_query(template: &str) -> crate::Result<String> {
    let regex = placeholder_pattern()?;
    let replaced = regex.replace_all(template, "?").into_owned();
    Ok(replaced)
}

/// Lists placeholder names in order of appearance, repeats included.
///
/// ```
/// use sqlx_cast_bind::builder::placeholder_names;
///
/// let names = placeholder_names("SELECT :a, :b, :a")?;
/// assert_eq!(names, vec!["a", "b", "a"]);
/// # Ok::<(), sqlx_cast_bind::Error>(())
/// ```
pub fn placeholder_names(template: &str) -> crate::Result<Vec<String>> {
    Ok(scan(&placeholder_pattern()?, template))
}

pub(crate) fn scan(pattern: &Regex, template: &str) -> Vec<String> {
    pattern
        .captures_iter(template)
        .map(|c| c[1].to_owned())
        .collect()
}

/// Replaces each placeholder whose name has an entry in `literals`, in one
/// left-to-right pass. Unknown placeholders are kept verbatim and substituted
/// text is never scanned again.
pub(crate) fn substitute(
    pattern: &Regex,
    template: &str,
    literals: &BTreeMap<String, String>,
) -> String {
    pattern
        .replace_all(template, |caps: &Captures<'_>| match literals.get(&caps[1]) {
            Some(literal) => literal.clone(),
            None => caps[0].to_owned(),
        })
        .into_owned()
}
