use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{IssueCode, ParseError, SchemaError};
use crate::registry::Registry;
use crate::rule::Rule;
use crate::schema::{
    dispatch, is_safe_integer, number_to_json, Presence, SchemaReader, Validator, ZSchema,
};

/// Schema for number validation. Created via [`vschema::number()`](crate::number).
///
/// With `.integer()` the value must be a safe integer (finite, no fractional
/// part, within `-(2^53 - 1)..=2^53 - 1`), and accepted values are returned in
/// integer form.
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let schema = vschema::number().integer().min(0.0).max(100.0);
/// assert_eq!(schema.parse_value(&json!(50.0)).unwrap(), json!(50));
/// assert!(schema.parse_value(&json!(3.5)).is_err());
/// assert!(schema.parse_value(&json!(-1)).is_err());
/// ```
#[derive(Clone, Default)]
pub struct ZNumber {
    presence: Presence,
    integer: Rule,
    min: Rule<f64>,
    max: Rule<f64>,
    equals: Rule<f64>,
}

impl ZNumber {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reject `null` unless a default is set.
    pub fn required(mut self) -> Self {
        self.presence.required.set_flag(true);
        self
    }

    /// Value substituted when parsing fails. A non-finite value leaves the
    /// default unset; use [`try_default`](Self::try_default) to get an error instead.
    pub fn default(mut self, value: f64) -> Self {
        if let Some(value) = checked("default", value) {
            self.presence.default.set(number_to_json(value));
        }
        self
    }

    /// Like [`default`](Self::default), but rejects NaN and infinities.
    pub fn try_default(mut self, value: f64) -> Result<Self, SchemaError> {
        self.presence.default.set(number_to_json(finite("default", value)?));
        Ok(self)
    }

    /// Must be a safe integer.
    pub fn integer(mut self) -> Self {
        self.integer.set_flag(true);
        self
    }

    /// Minimum value (inclusive). A non-finite bound leaves the rule inactive.
    pub fn min(mut self, val: f64) -> Self {
        if let Some(val) = checked("min", val) {
            self.min.set(val);
        }
        self
    }

    /// Like [`min`](Self::min), but rejects NaN and infinities.
    pub fn try_min(mut self, val: f64) -> Result<Self, SchemaError> {
        self.min.set(finite("min", val)?);
        Ok(self)
    }

    /// Maximum value (inclusive). A non-finite bound leaves the rule inactive.
    pub fn max(mut self, val: f64) -> Self {
        if let Some(val) = checked("max", val) {
            self.max.set(val);
        }
        self
    }

    /// Like [`max`](Self::max), but rejects NaN and infinities.
    pub fn try_max(mut self, val: f64) -> Result<Self, SchemaError> {
        self.max.set(finite("max", val)?);
        Ok(self)
    }

    /// Must be numerically equal to this value. A non-finite value leaves the
    /// rule inactive.
    pub fn equals(mut self, val: f64) -> Self {
        if let Some(val) = checked("equals", val) {
            self.equals.set(val);
        }
        self
    }

    /// Like [`equals`](Self::equals), but rejects NaN and infinities.
    pub fn try_equals(mut self, val: f64) -> Result<Self, SchemaError> {
        self.equals.set(finite("equals", val)?);
        Ok(self)
    }

    /// Build from a JSON schema object, dispatching other types through the registry.
    pub fn from_json(schema: &Value, registry: &Registry) -> Result<ZSchema, SchemaError> {
        dispatch(schema, registry, "number", Self::build)
    }

    pub(crate) fn build(map: &Map<String, Value>, _registry: &Registry) -> Result<Self, SchemaError> {
        let reader = SchemaReader::new(map);
        let mut schema = Self {
            presence: Presence::from_reader(&reader)?,
            ..Default::default()
        };
        if let Some(default) = reader.default_value("a number", Value::is_number)? {
            schema.presence.default.set(default);
        }
        schema.integer.set_flag(reader.flag("integer")?);
        if let Some(n) = reader.number("min")? {
            schema = schema.min(n);
        }
        if let Some(n) = reader.number("max")? {
            schema = schema.max(n);
        }
        if let Some(n) = reader.number("equals")? {
            schema = schema.equals(n);
        }
        Ok(schema)
    }

    fn check(&self, value: &Value) -> Result<Value, ParseError> {
        let n = value
            .as_f64()
            .ok_or_else(|| self.presence.mismatch("number", value))?;

        if self.integer.is_set() && !is_safe_integer(n) {
            return Err(ParseError::with_value(
                IssueCode::NotInt,
                "Expected a safe integer",
                value,
            ));
        }

        if let Some(min) = self.min.get() {
            if n < *min {
                return Err(ParseError::with_value(
                    IssueCode::TooSmall {
                        minimum: *min,
                        inclusive: true,
                    },
                    format!("Number must be at least {}", min),
                    value,
                ));
            }
        }

        if let Some(max) = self.max.get() {
            if n > *max {
                return Err(ParseError::with_value(
                    IssueCode::TooBig {
                        maximum: *max,
                        inclusive: true,
                    },
                    format!("Number must be at most {}", max),
                    value,
                ));
            }
        }

        if let Some(expected) = self.equals.get() {
            if n != *expected {
                return Err(ParseError::with_value(
                    IssueCode::NotEqual {
                        expected: number_to_json(*expected),
                    },
                    format!("Number must equal {}", expected),
                    value,
                ));
            }
        }

        if self.integer.is_set() {
            Ok(Value::from(n as i64))
        } else {
            Ok(value.clone())
        }
    }
}

impl Validator for ZNumber {
    fn type_name(&self) -> &str {
        "number"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        self.presence.resolve(value, self.check(value))
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("number"));
        self.presence.write(&mut out);
        if self.integer.is_set() {
            out.insert("integer".into(), Value::Bool(true));
        }
        if let Some(n) = self.min.get() {
            out.insert("min".into(), number_to_json(*n));
        }
        if let Some(n) = self.max.get() {
            out.insert("max".into(), number_to_json(*n));
        }
        if let Some(n) = self.equals.get() {
            out.insert("equals".into(), number_to_json(*n));
        }
        Value::Object(out)
    }
}

/// Rule parameters must be finite so they survive a JSON round trip.
fn finite(rule: &str, val: f64) -> Result<f64, SchemaError> {
    if val.is_finite() {
        Ok(val)
    } else {
        Err(SchemaError::rule(rule, "a finite number"))
    }
}

fn checked(rule: &str, val: f64) -> Option<f64> {
    finite(rule, val)
        .map_err(|err| debug!(%err, "ignoring number rule"))
        .ok()
}
