use serde_json::{Map, Value};

use crate::error::{ParseError, SchemaError};
use crate::registry::Registry;
use crate::schema::{dispatch, Presence, SchemaReader, Validator, ZSchema};

/// Schema that accepts any JSON value. Created via [`vschema::any()`](crate::any).
///
/// Only `null` is subject to the `required`/`default` rules.
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let schema = vschema::any().required().default(json!("fallback"));
/// assert_eq!(schema.parse_value(&json!([1, 2])).unwrap(), json!([1, 2]));
/// assert_eq!(schema.parse_value(&json!(null)).unwrap(), json!("fallback"));
/// ```
#[derive(Clone, Default)]
pub struct ZAny {
    presence: Presence,
}

impl ZAny {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reject `null` unless a default is set.
    pub fn required(mut self) -> Self {
        self.presence.required.set_flag(true);
        self
    }

    /// Value substituted when parsing fails. Any JSON value, including `null`.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.presence.default.set(value.into());
        self
    }

    /// Build from a JSON schema object, dispatching other types through the registry.
    pub fn from_json(schema: &Value, registry: &Registry) -> Result<ZSchema, SchemaError> {
        dispatch(schema, registry, "any", Self::build)
    }

    pub(crate) fn build(map: &Map<String, Value>, _registry: &Registry) -> Result<Self, SchemaError> {
        let reader = SchemaReader::new(map);
        let mut schema = Self {
            presence: Presence::from_reader(&reader)?,
        };
        if let Some(default) = reader.value("default") {
            schema = schema.default(default.clone());
        }
        Ok(schema)
    }
}

impl Validator for ZAny {
    fn type_name(&self) -> &str {
        "any"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        let outcome = if value.is_null() {
            Err(self.presence.mismatch("any value", value))
        } else {
            Ok(value.clone())
        };
        self.presence.resolve(value, outcome)
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("any"));
        self.presence.write(&mut out);
        Value::Object(out)
    }
}
