use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{IssueCode, ParseError, SchemaError};
use crate::registry::Registry;
use crate::schema::{dispatch, Presence, SchemaReader, Validator, ZSchema};

/// Passes if the wrapped validator rejects the value. Created via [`vschema::not()`](crate::not).
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let schema = vschema::not(vschema::string().required());
/// assert_eq!(schema.parse_value(&json!(1)).unwrap(), json!(1));
/// assert!(schema.parse_value(&json!("x")).is_err());
/// ```
#[derive(Clone)]
pub struct ZNot {
    presence: Presence,
    validator: Box<ZSchema>,
}

impl ZNot {
    pub fn new(validator: impl Into<ZSchema>) -> Self {
        Self {
            presence: Presence::default(),
            validator: Box::new(validator.into()),
        }
    }

    /// Reject `null` unless a default is set.
    pub fn required(mut self) -> Self {
        self.presence.required.set_flag(true);
        self
    }

    /// Value substituted when the wrapped validator accepts the input.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.presence.default.set(value.into());
        self
    }

    /// Replace the wrapped validator.
    pub fn validator(mut self, validator: impl Into<ZSchema>) -> Self {
        self.validator = Box::new(validator.into());
        self
    }

    /// Build from a JSON schema object, dispatching other types through the registry.
    pub fn from_json(schema: &Value, registry: &Registry) -> Result<ZSchema, SchemaError> {
        dispatch(schema, registry, "not", Self::build)
    }

    pub(crate) fn build(map: &Map<String, Value>, registry: &Registry) -> Result<Self, SchemaError> {
        let reader = SchemaReader::new(map);
        let inner = reader
            .nested("validator", registry)?
            .ok_or_else(|| SchemaError::rule("validator", "a schema"))?;
        let mut schema = Self::new(inner);
        schema.presence = Presence::from_reader(&reader)?;
        if let Some(default) = reader.default_value("any value", |_| true)? {
            schema.presence.default.set(default);
        }
        Ok(schema)
    }

    fn check(&self, value: &Value) -> Result<Value, ParseError> {
        if self.validator.validate_value(value) {
            trace!(kind = self.validator.type_name(), "not rejected");
            return Err(ParseError::with_value(
                IssueCode::InvalidNegation,
                format!(
                    "Expected data not to be parsable by {}",
                    self.validator.type_name()
                ),
                value,
            ));
        }
        Ok(value.clone())
    }
}

impl Validator for ZNot {
    fn type_name(&self) -> &str {
        "not"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        self.presence.resolve(value, self.check(value))
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("not"));
        self.presence.write(&mut out);
        out.insert("validator".into(), self.validator.to_json());
        Value::Object(out)
    }
}
