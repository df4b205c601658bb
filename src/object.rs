use serde_json::{Map, Value};

use crate::error::{IssueCode, ParseError, PathSegment, SchemaError};
use crate::registry::Registry;
use crate::rule::Rule;
use crate::schema::{dispatch, Presence, SchemaReader, Validator, ZSchema};

/// Object schema with runtime-defined fields. Created via [`vschema::object()`](crate::object).
///
/// # Unknown keys
///
/// When a field schema is set, keys it does not declare are removed from the
/// output unless [`preserve()`](Self::preserve) is set. Without a field schema
/// the object passes through untouched.
///
/// Fields are checked in declaration order and the first failure aborts the
/// parse. A missing key is validated as `null`; if the field accepts that
/// with a `null` result, the key stays absent in the output.
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let schema = vschema::object()
///     .field("name", vschema::string().required().min(1))
///     .field("age", vschema::number().integer().min(0.0));
///
/// let out = schema.parse_value(&json!({"name": "Ann", "extra": 1})).unwrap();
/// assert_eq!(out, json!({"name": "Ann"}));
/// ```
#[derive(Clone, Default)]
pub struct ZObject {
    presence: Presence,
    preserve: Rule,
    min: Rule<usize>,
    max: Rule<usize>,
    schema: Rule<Vec<(String, ZSchema)>>,
}

impl ZObject {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reject `null` unless a default is set.
    pub fn required(mut self) -> Self {
        self.presence.required.set_flag(true);
        self
    }

    /// Value substituted when parsing fails.
    pub fn default(mut self, value: Map<String, Value>) -> Self {
        self.presence.default.set(Value::Object(value));
        self
    }

    /// Keep keys that the field schema does not declare.
    pub fn preserve(mut self) -> Self {
        self.preserve.set_flag(true);
        self
    }

    /// Minimum number of keys in the input.
    pub fn min(mut self, len: usize) -> Self {
        self.min.set(len);
        self
    }

    /// Maximum number of keys in the input.
    pub fn max(mut self, len: usize) -> Self {
        self.max.set(len);
        self
    }

    /// Declare a field. Declaring an existing key again replaces its schema
    /// and keeps its position.
    pub fn field(mut self, key: impl Into<String>, schema: impl Into<ZSchema>) -> Self {
        let key = key.into();
        let schema = schema.into();
        if !self.schema.is_set() {
            self.schema.set(Vec::new());
        }
        if let Some(fields) = self.schema.get_mut() {
            match fields.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = schema,
                None => fields.push((key, schema)),
            }
        }
        self
    }

    /// Replace the whole field schema.
    pub fn schema<K, S>(mut self, fields: impl IntoIterator<Item = (K, S)>) -> Self
    where
        K: Into<String>,
        S: Into<ZSchema>,
    {
        self.schema.set(Vec::new());
        fields
            .into_iter()
            .fold(self, |obj, (key, schema)| obj.field(key, schema))
    }

    /// Declared field names, in order.
    pub fn keys(&self) -> Vec<&str> {
        self.schema
            .get()
            .map(|fields| fields.iter().map(|(k, _)| k.as_str()).collect())
            .unwrap_or_default()
    }

    /// Build from a JSON schema object, dispatching other types through the registry.
    pub fn from_json(schema: &Value, registry: &Registry) -> Result<ZSchema, SchemaError> {
        dispatch(schema, registry, "object", Self::build)
    }

    pub(crate) fn build(map: &Map<String, Value>, registry: &Registry) -> Result<Self, SchemaError> {
        let reader = SchemaReader::new(map);
        let mut schema = Self {
            presence: Presence::from_reader(&reader)?,
            ..Default::default()
        };
        if let Some(default) = reader.default_value("an object", Value::is_object)? {
            schema.presence.default.set(default);
        }
        schema.preserve.set_flag(reader.flag("preserve")?);
        if let Some(len) = reader.length("min")? {
            schema = schema.min(len);
        }
        if let Some(len) = reader.length("max")? {
            schema = schema.max(len);
        }
        match reader.value("schema") {
            None => {}
            Some(Value::Object(fields)) => {
                let fields = fields
                    .iter()
                    .map(|(key, child)| registry.from_json(child).map(|v| (key.clone(), v)))
                    .collect::<Result<Vec<_>, _>>()?;
                schema = schema.schema(fields);
            }
            Some(_) => return Err(SchemaError::rule("schema", "an object of schemas")),
        }
        Ok(schema)
    }

    fn check(&self, value: &Value) -> Result<Value, ParseError> {
        let obj = value
            .as_object()
            .ok_or_else(|| self.presence.mismatch("object", value))?;

        if let Some(min) = self.min.get() {
            if obj.len() < *min {
                return Err(ParseError::with_value(
                    IssueCode::TooSmall {
                        minimum: *min as f64,
                        inclusive: true,
                    },
                    format!("Object must have at least {} keys", min),
                    value,
                ));
            }
        }

        if let Some(max) = self.max.get() {
            if obj.len() > *max {
                return Err(ParseError::with_value(
                    IssueCode::TooBig {
                        maximum: *max as f64,
                        inclusive: true,
                    },
                    format!("Object must have at most {} keys", max),
                    value,
                ));
            }
        }

        let fields = match self.schema.get() {
            Some(fields) => fields,
            None => return Ok(value.clone()),
        };

        let mut result = obj.clone();
        for (key, child) in fields {
            let present = obj.get(key);
            let parsed = child
                .parse_value(present.unwrap_or(&Value::Null))
                .map_err(|e| e.with_prefix(PathSegment::Field(key.clone())))?;
            if present.is_some() || !parsed.is_null() {
                result.insert(key.clone(), parsed);
            }
        }

        if !self.preserve.is_set() {
            result.retain(|key, _| fields.iter().any(|(k, _)| k == key));
        }
        Ok(Value::Object(result))
    }
}

impl Validator for ZObject {
    fn type_name(&self) -> &str {
        "object"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        self.presence.resolve(value, self.check(value))
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("object"));
        self.presence.write(&mut out);
        if self.preserve.is_set() {
            out.insert("preserve".into(), Value::Bool(true));
        }
        if let Some(len) = self.min.get() {
            out.insert("min".into(), Value::from(*len));
        }
        if let Some(len) = self.max.get() {
            out.insert("max".into(), Value::from(*len));
        }
        if let Some(fields) = self.schema.get() {
            let fields = fields
                .iter()
                .map(|(key, child)| (key.clone(), child.to_json()))
                .collect();
            out.insert("schema".into(), Value::Object(fields));
        }
        Value::Object(out)
    }
}
