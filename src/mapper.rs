//! Parameter schema validation.
//!
//! A [`Schema`] declares, per parameter, the expected type, whether it is
//! mandatory and an optional default. [`validate`] checks a parameter map against
//! it before binding.
//!
//! Schemas are usually written once per call site, either in code or as JSON:
//!
//! ```
//! use sqlx_cast_bind::mapper::Schema;
//! use sqlx_cast_bind::{params, Value};
//!
//! let schema = Schema::from_json(r#"{
//!     "id":    {"type": "Integer", "mandatory": true},
//!     "limit": {"type": "integer", "default": 20}
//! }"#)?;
//!
//! let params = schema.validate(params! { "id" => 3 })?;
//! assert_eq!(params["limit"], Value::Int(20));
//! # Ok::<(), sqlx_cast_bind::Error>(())
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::classify::TypeTag;
use crate::error::ValidationError;
use crate::value::{Params, Value};

/// The contract of one parameter.
///
/// A `Null` value counts as absent and a `Null` default as no default, so a rule
/// typed [`TypeTag::Null`] is never satisfied.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Rule {
    #[serde(rename = "type")]
    pub ty: TypeTag,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub default: Option<Value>,
}

impl Rule {
    pub fn new(ty: TypeTag) -> Self {
        Self {
            ty,
            mandatory: false,
            default: None,
        }
    }

    #[must_use]
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The default, if any. A `Null` default counts as none.
    fn usable_default(&self) -> Option<&Value> {
        self.default.as_ref().filter(|v| !v.is_null())
    }
}

/// Parameter contracts by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    rules: BTreeMap<String, Rule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the JSON description format
    /// `{"name": {"type": "...", "mandatory": bool, "default": value}}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`](crate::Error::Schema) for malformed JSON or an
    /// unknown type name.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn rule(mut self, name: impl Into<String>, rule: Rule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Shorthand for [`validate`]`(params, self)`.
    ///
    /// # Errors
    ///
    /// See [`validate`].
    pub fn validate(&self, params: Params) -> crate::Result<Params> {
        validate(params, self)
    }
}

/// Validates `params` against `schema`, filling in defaults.
///
/// Surplus keys are rejected first. Then, per schema key: a missing mandatory
/// parameter fails, a missing parameter without default fails, a missing
/// parameter takes its default, and the final value must have exactly the
/// declared type. A `Null` value counts as missing.
///
/// The map is consumed; on error no partially defaulted map escapes.
///
/// # Errors
///
/// Returns [`Error::Validation`](crate::Error::Validation) with the first
/// violation found.
pub fn validate(mut params: Params, schema: &Schema) -> crate::Result<Params> {
    let surplus: Vec<String> = params
        .keys()
        .filter(|name| !schema.rules.contains_key(*name))
        .cloned()
        .collect();
    if !surplus.is_empty() {
        return Err(ValidationError::SurplusParameter(surplus).into());
    }

    for (name, rule) in &schema.rules {
        let present = params.get(name).is_some_and(|v| !v.is_null());
        if !present {
            if rule.mandatory {
                return Err(ValidationError::MissingMandatory(name.clone()).into());
            }
            let Some(default) = rule.usable_default() else {
                return Err(ValidationError::MissingNoDefault(name.clone()).into());
            };
            params.insert(name.clone(), default.clone());
        }

        let found = params[name].kind();
        if found != rule.ty {
            return Err(ValidationError::TypeMismatch {
                name: name.clone(),
                expected: rule.ty,
                found,
            }
            .into());
        }
    }

    tracing::trace!(params = params.len(), "parameters match schema");
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::params;

    fn validation_error(result: crate::Result<Params>) -> ValidationError {
        match result {
            Err(Error::Validation(e)) => e,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    fn int_schema() -> Schema {
        Schema::new().rule("x", Rule::new(TypeTag::Integer))
    }

    #[test]
    fn test_rejects_surplus_keys() {
        let err = validation_error(validate(params! { "x" => 1, "y" => 2 }, &int_schema()));
        assert_eq!(err, ValidationError::SurplusParameter(vec!["y".to_string()]));
    }

    #[test]
    fn test_applies_default() {
        let schema = Schema::new().rule("x", Rule::new(TypeTag::Integer).default_value(5));
        let params = validate(params! {}, &schema).unwrap();
        assert_eq!(params, params! { "x" => 5 });
    }

    #[test]
    fn test_null_counts_as_missing() {
        let schema = Schema::new().rule("x", Rule::new(TypeTag::Integer).default_value(5));
        let params = validate(params! { "x" => Value::Null }, &schema).unwrap();
        assert_eq!(params["x"], Value::Int(5));
    }

    #[test]
    fn test_missing_mandatory_wins_over_default() {
        let schema = Schema::new().rule(
            "x",
            Rule::new(TypeTag::Integer).mandatory().default_value(5),
        );
        let err = validation_error(validate(params! {}, &schema));
        assert_eq!(err, ValidationError::MissingMandatory("x".to_string()));
    }

    #[test]
    fn test_missing_without_default() {
        let err = validation_error(validate(params! {}, &int_schema()));
        assert_eq!(err, ValidationError::MissingNoDefault("x".to_string()));

        let schema = Schema::new().rule("x", Rule::new(TypeTag::Integer).default_value(Value::Null));
        let err = validation_error(validate(params! {}, &schema));
        assert_eq!(err, ValidationError::MissingNoDefault("x".to_string()));
    }

    #[test]
    fn test_null_rule_never_passes() {
        let schema = Schema::new().rule("x", Rule::new(TypeTag::Null).default_value(Value::Null));
        let err = validation_error(validate(params! { "x" => Value::Null }, &schema));
        assert_eq!(err, ValidationError::MissingNoDefault("x".to_string()));

        let schema = Schema::new().rule("x", Rule::new(TypeTag::Null).mandatory());
        let err = validation_error(validate(params! { "x" => Value::Null }, &schema));
        assert_eq!(err, ValidationError::MissingMandatory("x".to_string()));
    }

    #[test]
    fn test_type_must_match_exactly() {
        let schema = Schema::new().rule("x", Rule::new(TypeTag::Decimal));
        let err = validation_error(validate(params! { "x" => 1 }, &schema));
        assert_eq!(
            err,
            ValidationError::TypeMismatch {
                name: "x".to_string(),
                expected: TypeTag::Decimal,
                found: TypeTag::Integer,
            }
        );

        // numeric text is still text
        let err = validation_error(validate(params! { "x" => "5" }, &int_schema()));
        assert!(matches!(err, ValidationError::TypeMismatch { found: TypeTag::Text, .. }));
    }

    #[test]
    fn test_idempotent_on_valid_map() {
        let schema = Schema::new()
            .rule("id", Rule::new(TypeTag::Integer).mandatory())
            .rule("name", Rule::new(TypeTag::Text).default_value("anon"))
            .rule("tags", Rule::new(TypeTag::Sequence).default_value(vec!["a"]));
        let once = validate(params! { "id" => 1 }, &schema).unwrap();
        let twice = validate(once.clone(), &schema).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.len(), schema.len());
    }

    #[test]
    fn test_schema_from_json() {
        let schema = Schema::from_json(
            r#"{
                "id": {"type": "Integer", "mandatory": true},
                "ratio": {"type": "double", "default": 0.5},
                "name": {"type": "string", "default": null}
            }"#,
        )
        .unwrap();
        assert_eq!(schema.len(), 3);
        assert!(schema.get("id").unwrap().mandatory);
        assert_eq!(schema.get("ratio").unwrap().default, Some(Value::Float(0.5)));
        assert_eq!(schema.get("name").unwrap().default, None);

        let params = schema.validate(params! { "id" => 9, "name" => "n" }).unwrap();
        assert_eq!(params["ratio"], Value::Float(0.5));
    }

    #[test]
    fn test_schema_from_json_rejects_unknown_type() {
        let err = Schema::from_json(r#"{"x": {"type": "object"}}"#).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
