use serde_json::{Map, Value};

use crate::error::{IssueCode, ParseError, PathSegment, SchemaError};
use crate::registry::Registry;
use crate::rule::Rule;
use crate::schema::{dispatch, Presence, SchemaReader, Validator, ZSchema};

/// Schema for array validation. Created via [`vschema::array()`](crate::array).
///
/// Every element is parsed with the `item` validator when one is set; the
/// first failing element aborts the parse.
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let schema = vschema::array()
///     .item(vschema::number().required().integer().min(0.0).max(100.0))
///     .min(1);
/// assert_eq!(schema.parse_value(&json!([1, 2, 3])).unwrap(), json!([1, 2, 3]));
/// assert!(schema.parse_value(&json!([1, true, 3])).is_err());
/// ```
#[derive(Clone, Default)]
pub struct ZArray {
    presence: Presence,
    min: Rule<usize>,
    max: Rule<usize>,
    item: Rule<Box<ZSchema>>,
}

impl ZArray {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reject `null` unless a default is set.
    pub fn required(mut self) -> Self {
        self.presence.required.set_flag(true);
        self
    }

    /// Value substituted when parsing fails.
    pub fn default(mut self, value: Vec<Value>) -> Self {
        self.presence.default.set(Value::Array(value));
        self
    }

    /// Minimum number of elements.
    pub fn min(mut self, len: usize) -> Self {
        self.min.set(len);
        self
    }

    /// Maximum number of elements.
    pub fn max(mut self, len: usize) -> Self {
        self.max.set(len);
        self
    }

    /// Validator applied to every element.
    pub fn item(mut self, item: impl Into<ZSchema>) -> Self {
        self.item.set(Box::new(item.into()));
        self
    }

    /// Build from a JSON schema object, dispatching other types through the registry.
    pub fn from_json(schema: &Value, registry: &Registry) -> Result<ZSchema, SchemaError> {
        dispatch(schema, registry, "array", Self::build)
    }

    pub(crate) fn build(map: &Map<String, Value>, registry: &Registry) -> Result<Self, SchemaError> {
        let reader = SchemaReader::new(map);
        let mut schema = Self {
            presence: Presence::from_reader(&reader)?,
            ..Default::default()
        };
        if let Some(default) = reader.default_value("an array", Value::is_array)? {
            schema.presence.default.set(default);
        }
        if let Some(len) = reader.length("min")? {
            schema = schema.min(len);
        }
        if let Some(len) = reader.length("max")? {
            schema = schema.max(len);
        }
        if let Some(item) = reader.nested("item", registry)? {
            schema = schema.item(item);
        }
        Ok(schema)
    }

    fn check(&self, value: &Value) -> Result<Value, ParseError> {
        let arr = value
            .as_array()
            .ok_or_else(|| self.presence.mismatch("array", value))?;

        if let Some(min) = self.min.get() {
            if arr.len() < *min {
                return Err(ParseError::with_value(
                    IssueCode::TooSmall {
                        minimum: *min as f64,
                        inclusive: true,
                    },
                    format!("Array must have at least {} elements", min),
                    value,
                ));
            }
        }

        if let Some(max) = self.max.get() {
            if arr.len() > *max {
                return Err(ParseError::with_value(
                    IssueCode::TooBig {
                        maximum: *max as f64,
                        inclusive: true,
                    },
                    format!("Array must have at most {} elements", max),
                    value,
                ));
            }
        }

        let item = match self.item.get() {
            Some(item) => item,
            None => return Ok(value.clone()),
        };

        let mut results = Vec::with_capacity(arr.len());
        for (i, element) in arr.iter().enumerate() {
            let parsed = item
                .parse_value(element)
                .map_err(|e| e.with_prefix(PathSegment::Index(i)))?;
            results.push(parsed);
        }
        Ok(Value::Array(results))
    }
}

impl Validator for ZArray {
    fn type_name(&self) -> &str {
        "array"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        self.presence.resolve(value, self.check(value))
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("array"));
        self.presence.write(&mut out);
        if let Some(len) = self.min.get() {
            out.insert("min".into(), Value::from(*len));
        }
        if let Some(len) = self.max.get() {
            out.insert("max".into(), Value::from(*len));
        }
        if let Some(item) = self.item.get() {
            out.insert("item".into(), item.to_json());
        }
        Value::Object(out)
    }
}
