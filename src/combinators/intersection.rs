use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{IssueCode, ParseError, SchemaError};
use crate::registry::Registry;
use crate::rule::Rule;
use crate::schema::{dispatch, Presence, SchemaReader, Validator, ZSchema};

/// Passes if every child validator accepts the value. Created via [`vschema::and()`](crate::and).
///
/// The input is returned unchanged; child outputs (stripped keys, defaults)
/// are not merged. An `And` without children accepts everything.
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let schema = vschema::and()
///     .validator(vschema::string().min(2))
///     .validator(vschema::string().max(4));
/// assert!(schema.validate_value(&json!("abc")));
/// assert!(!schema.validate_value(&json!("abcde")));
/// ```
#[derive(Clone, Default)]
pub struct ZAnd {
    presence: Presence,
    validators: Rule<Vec<ZSchema>>,
}

impl ZAnd {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reject `null` unless a default is set.
    pub fn required(mut self) -> Self {
        self.presence.required.set_flag(true);
        self
    }

    /// Value substituted when a child rejects the input.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.presence.default.set(value.into());
        self
    }

    /// Append a child validator.
    pub fn validator(mut self, validator: impl Into<ZSchema>) -> Self {
        let validator = validator.into();
        match self.validators.get_mut() {
            Some(children) => children.push(validator),
            None => self.validators.set(vec![validator]),
        }
        self
    }

    /// Replace all child validators.
    pub fn validators<S: Into<ZSchema>>(mut self, validators: impl IntoIterator<Item = S>) -> Self {
        self.validators
            .set(validators.into_iter().map(Into::into).collect());
        self
    }

    /// Build from a JSON schema object, dispatching other types through the registry.
    pub fn from_json(schema: &Value, registry: &Registry) -> Result<ZSchema, SchemaError> {
        dispatch(schema, registry, "and", Self::build)
    }

    pub(crate) fn build(map: &Map<String, Value>, registry: &Registry) -> Result<Self, SchemaError> {
        let reader = SchemaReader::new(map);
        let mut schema = Self {
            presence: Presence::from_reader(&reader)?,
            ..Default::default()
        };
        if let Some(default) = reader.default_value("any value", |_| true)? {
            schema.presence.default.set(default);
        }
        if let Some(children) = reader.nested_list("validators", registry)? {
            schema = schema.validators(children);
        }
        Ok(schema)
    }

    fn check(&self, value: &Value) -> Result<Value, ParseError> {
        let children = self.validators.get().map(Vec::as_slice).unwrap_or_default();
        if let Some(i) = children.iter().position(|child| !child.validate_value(value)) {
            trace!(branch = i, kind = children[i].type_name(), "and rejected");
            return Err(ParseError::with_value(
                IssueCode::InvalidIntersection,
                "Expected data to be parsable by every validator",
                value,
            ));
        }
        Ok(value.clone())
    }
}

impl Validator for ZAnd {
    fn type_name(&self) -> &str {
        "and"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        self.presence.resolve(value, self.check(value))
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("and"));
        self.presence.write(&mut out);
        if let Some(children) = self.validators.get() {
            out.insert(
                "validators".into(),
                Value::Array(children.iter().map(Validator::to_json).collect()),
            );
        }
        Value::Object(out)
    }
}
