use serde_json::{Map, Value};

use crate::error::{IssueCode, ParseError, SchemaError};
use crate::registry::Registry;
use crate::rule::Rule;
use crate::schema::{dispatch, Presence, SchemaReader, Validator, ZSchema};

/// Schema for boolean validation. Created via [`vschema::boolean()`](crate::boolean).
#[derive(Clone, Default)]
pub struct ZBoolean {
    presence: Presence,
    equals: Rule<bool>,
}

impl ZBoolean {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reject `null` unless a default is set.
    pub fn required(mut self) -> Self {
        self.presence.required.set_flag(true);
        self
    }

    /// Value substituted when parsing fails.
    pub fn default(mut self, value: bool) -> Self {
        self.presence.default.set(Value::Bool(value));
        self
    }

    /// Must be exactly this boolean.
    pub fn equals(mut self, value: bool) -> Self {
        self.equals.set(value);
        self
    }

    /// Build from a JSON schema object, dispatching other types through the registry.
    pub fn from_json(schema: &Value, registry: &Registry) -> Result<ZSchema, SchemaError> {
        dispatch(schema, registry, "boolean", Self::build)
    }

    pub(crate) fn build(map: &Map<String, Value>, _registry: &Registry) -> Result<Self, SchemaError> {
        let reader = SchemaReader::new(map);
        let mut schema = Self {
            presence: Presence::from_reader(&reader)?,
            ..Default::default()
        };
        if let Some(default) = reader.default_value("a boolean", Value::is_boolean)? {
            schema.presence.default.set(default);
        }
        if let Some(v) = reader.value("equals") {
            let b = v
                .as_bool()
                .ok_or_else(|| SchemaError::rule("equals", "a boolean"))?;
            schema = schema.equals(b);
        }
        Ok(schema)
    }

    fn check(&self, value: &Value) -> Result<Value, ParseError> {
        let b = value
            .as_bool()
            .ok_or_else(|| self.presence.mismatch("boolean", value))?;
        if let Some(expected) = self.equals.get() {
            if b != *expected {
                return Err(ParseError::with_value(
                    IssueCode::NotEqual {
                        expected: Value::Bool(*expected),
                    },
                    format!("Expected boolean to equal {}", expected),
                    value,
                ));
            }
        }
        Ok(Value::Bool(b))
    }
}

impl Validator for ZBoolean {
    fn type_name(&self) -> &str {
        "boolean"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        self.presence.resolve(value, self.check(value))
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("boolean"));
        self.presence.write(&mut out);
        if let Some(b) = self.equals.get() {
            out.insert("equals".into(), Value::Bool(*b));
        }
        Value::Object(out)
    }
}
