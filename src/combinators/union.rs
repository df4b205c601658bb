use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{IssueCode, ParseError, SchemaError};
use crate::registry::Registry;
use crate::rule::Rule;
use crate::schema::{dispatch, Presence, SchemaReader, Validator, ZSchema};

/// Passes if any child validator parses the value. Created via [`vschema::or()`](crate::or).
///
/// Children are tried in order and the first successful result is returned.
/// Errors from the children are discarded. An `Or` without children never matches.
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let schema = vschema::or()
///     .validator(vschema::string())
///     .validator(vschema::number());
/// assert_eq!(schema.parse_value(&json!(5)).unwrap(), json!(5));
/// assert!(schema.parse_value(&json!(true)).is_err());
/// ```
#[derive(Clone, Default)]
pub struct ZOr {
    presence: Presence,
    validators: Rule<Vec<ZSchema>>,
}

impl ZOr {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reject `null` unless a default is set.
    pub fn required(mut self) -> Self {
        self.presence.required.set_flag(true);
        self
    }

    /// Value substituted when no child matches.
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
        dispatch(schema, registry, "or", Self::build)
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
        for (i, child) in children.iter().enumerate() {
            if let Ok(parsed) = child.parse_value(value) {
                trace!(branch = i, kind = child.type_name(), "or matched");
                return Ok(parsed);
            }
        }
        trace!(branches = children.len(), "or matched no branch");
        Err(ParseError::with_value(
            IssueCode::InvalidUnion,
            "Expected data to be parsable by one validator",
            value,
        ))
    }
}

impl Validator for ZOr {
    fn type_name(&self) -> &str {
        "or"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        self.presence.resolve(value, self.check(value))
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("or"));
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
