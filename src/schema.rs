use std::fmt;
use std::future::{ready, Ready};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::collections::ZArray;
use crate::combinators::{ZAnd, ZNot, ZOr};
use crate::error::{value_type_name, IssueCode, ParseError, SchemaError};
use crate::input::JsonInput;
use crate::object::ZObject;
use crate::primitives::{ZAny, ZBoolean, ZNumber, ZString};
use crate::registry::Registry;
use crate::rule::Rule;

/// Core validation trait.
///
/// Every validator in `vschema` implements this trait, and custom validators
/// registered in a [`Registry`] implement it too. Evaluation never mutates the
/// validator, so a built tree can be shared across threads.
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let schema = vschema::string().min(3);
/// assert_eq!(schema.parse_value(&json!("hello")).unwrap(), json!("hello"));
/// assert!(!schema.validate_value(&json!("hi")));
/// ```
pub trait Validator: Send + Sync {
    /// Lower-case type discriminator written as `"type"` in the JSON schema.
    fn type_name(&self) -> &str;

    /// Parse and validate a `serde_json::Value`.
    ///
    /// Returns the (possibly pruned or defaulted) value on success.
    fn parse_value(&self, value: &Value) -> Result<Value, ParseError>;

    /// Serialize the active rules of this validator into a JSON schema object.
    fn to_json(&self) -> Value;

    /// `true` iff [`parse_value`](Self::parse_value) would succeed.
    fn validate_value(&self, value: &Value) -> bool {
        self.parse_value(value).is_ok()
    }

    /// Future-shaped [`parse_value`](Self::parse_value). Resolves immediately.
    fn parse_async(&self, value: &Value) -> Ready<Result<Value, ParseError>> {
        ready(self.parse_value(value))
    }

    /// Future-shaped validation. Resolves immediately; the error side carries
    /// the reason the value was rejected.
    fn validate_async(&self, value: &Value) -> Ready<Result<(), ParseError>> {
        ready(self.parse_value(value).map(|_| ()))
    }

    /// Parse from any supported input (JSON string, bytes, `serde_json::Value`).
    fn parse<I: JsonInput + ?Sized>(&self, input: &I) -> Result<Value, ParseError>
    where
        Self: Sized,
    {
        let json = input.to_json_value().map_err(|e| {
            ParseError::new(IssueCode::InvalidJson, format!("Invalid JSON: {}", e))
        })?;
        self.parse_value(&json)
    }

    /// Check any supported input against this validator.
    fn validate<I: JsonInput + ?Sized>(&self, input: &I) -> bool
    where
        Self: Sized,
    {
        self.parse(input).is_ok()
    }
}

/// A built validator tree node.
///
/// The built-in kinds form a closed set so evaluation and serialization can
/// match exhaustively; anything registered at runtime lives in
/// [`ZSchema::Custom`]. A `ZSchema` exposes no builder methods: convert a
/// builder into it once configuration is finished.
#[derive(Clone)]
pub enum ZSchema {
    Any(ZAny),
    Boolean(ZBoolean),
    Number(ZNumber),
    String(ZString),
    Array(ZArray),
    Object(ZObject),
    Or(ZOr),
    And(ZAnd),
    Not(ZNot),
    Custom(Arc<dyn Validator>),
}

impl ZSchema {
    /// Wrap a user-defined validator.
    pub fn custom<V: Validator + 'static>(validator: V) -> Self {
        ZSchema::Custom(Arc::new(validator))
    }

    /// Build a validator tree from a JSON schema object using the given registry.
    pub fn from_json(schema: &Value, registry: &Registry) -> Result<Self, SchemaError> {
        registry.from_json(schema)
    }

    fn inner(&self) -> &dyn Validator {
        match self {
            ZSchema::Any(v) => v,
            ZSchema::Boolean(v) => v,
            ZSchema::Number(v) => v,
            ZSchema::String(v) => v,
            ZSchema::Array(v) => v,
            ZSchema::Object(v) => v,
            ZSchema::Or(v) => v,
            ZSchema::And(v) => v,
            ZSchema::Not(v) => v,
            ZSchema::Custom(v) => v.as_ref(),
        }
    }
}

impl Validator for ZSchema {
    fn type_name(&self) -> &str {
        self.inner().type_name()
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        self.inner().parse_value(value)
    }

    fn to_json(&self) -> Value {
        self.inner().to_json()
    }
}

impl fmt::Debug for ZSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ZSchema({})", self.to_json())
    }
}

macro_rules! impl_into_zschema {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for ZSchema {
                fn from(v: $ty) -> Self {
                    ZSchema::$variant(v)
                }
            }
        )*
    };
}

impl_into_zschema!(
    ZAny => Any,
    ZBoolean => Boolean,
    ZNumber => Number,
    ZString => String,
    ZArray => Array,
    ZObject => Object,
    ZOr => Or,
    ZAnd => And,
    ZNot => Not,
);

impl From<Arc<dyn Validator>> for ZSchema {
    fn from(v: Arc<dyn Validator>) -> Self {
        ZSchema::Custom(v)
    }
}

// ---------------------------------------------------------------------------
// Shared required/default handling
// ---------------------------------------------------------------------------

/// The `required` and `default` rules every validator carries.
#[derive(Clone, Default)]
pub(crate) struct Presence {
    pub(crate) required: Rule,
    pub(crate) default: Rule<Value>,
}

impl Presence {
    /// Type mismatch error; mentions `null` as acceptable unless required.
    pub(crate) fn mismatch(&self, expected: &str, value: &Value) -> ParseError {
        let or_null = if self.required.is_set() { "" } else { " or null" };
        ParseError::with_value(
            IssueCode::InvalidType {
                expected: expected.to_string(),
                received: value_type_name(value),
            },
            format!(
                "Expected {}{}, received {}",
                expected,
                or_null,
                value_type_name(value)
            ),
            value,
        )
    }

    /// Apply the required/default policy to the outcome of a core check.
    pub(crate) fn resolve(
        &self,
        value: &Value,
        outcome: Result<Value, ParseError>,
    ) -> Result<Value, ParseError> {
        let err = match outcome {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        if value.is_null() && !self.required.is_set() {
            return Ok(Value::Null);
        }
        if let Some(default) = self.default.get() {
            tracing::trace!(reason = %err, "substituting default value");
            return Ok(default.clone());
        }
        if value.is_null() {
            return Err(ParseError::new(
                IssueCode::MissingValue,
                "Required value is missing or null",
            ));
        }
        Err(err)
    }

    /// Read `required` from a schema object. `default` is read by each kind.
    pub(crate) fn from_reader(reader: &SchemaReader<'_>) -> Result<Self, SchemaError> {
        let mut presence = Self::default();
        presence.required.set_flag(reader.flag("required")?);
        Ok(presence)
    }

    pub(crate) fn write(&self, out: &mut Map<String, Value>) {
        if self.required.is_set() {
            out.insert("required".into(), Value::Bool(true));
        }
        if let Some(default) = self.default.get() {
            out.insert("default".into(), default.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// JSON schema helpers
// ---------------------------------------------------------------------------

/// Largest integer exactly representable in an IEEE-754 double (`2^53 - 1`).
pub(crate) const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;

/// `true` for finite numbers without a fractional part inside the safe range.
pub(crate) fn is_safe_integer(n: f64) -> bool {
    n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
}

/// Serialize a rule parameter, preferring the integer form for whole numbers.
///
/// Number builders only store finite parameters, so the `null` arm is never
/// taken for a built validator.
pub(crate) fn number_to_json(n: f64) -> Value {
    if is_safe_integer(n) {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Extract the schema object and its lower-cased `type` discriminator.
pub(crate) fn schema_type(schema: &Value) -> Result<(&Map<String, Value>, String), SchemaError> {
    let map = schema.as_object().ok_or(SchemaError::NotAnObject)?;
    let ty = map
        .get("type")
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingType)?;
    Ok((map, ty.to_lowercase()))
}

/// Shared entry point of every built-in `from_json`: build the kind directly
/// when the discriminator matches, dispatch through the registry otherwise.
///
/// A factory that hands its own, unrewritten schema to a kind's `from_json`
/// would be dispatched straight back to itself; that is reported as
/// [`SchemaError::TypeMismatch`].
pub(crate) fn dispatch<T, F>(
    schema: &Value,
    registry: &Registry,
    own_type: &str,
    build: F,
) -> Result<ZSchema, SchemaError>
where
    T: Into<ZSchema>,
    F: FnOnce(&Map<String, Value>, &Registry) -> Result<T, SchemaError>,
{
    let (map, ty) = schema_type(schema)?;
    if ty == own_type {
        build(map, registry).map(Into::into)
    } else if registry.resolving() == Some(ty.as_str()) {
        Err(SchemaError::TypeMismatch {
            expected: own_type.to_string(),
            found: ty,
        })
    } else if registry.has_validator(&ty) {
        registry.from_json(schema)
    } else {
        Err(SchemaError::UnknownType(ty))
    }
}

/// Typed accessors over a schema object, reporting malformed rules as [`SchemaError`].
pub(crate) struct SchemaReader<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> SchemaReader<'a> {
    pub(crate) fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    pub(crate) fn value(&self, rule: &str) -> Option<&'a Value> {
        self.map.get(rule)
    }

    pub(crate) fn flag(&self, rule: &str) -> Result<bool, SchemaError> {
        match self.map.get(rule) {
            None => Ok(false),
            Some(v) => v.as_bool().ok_or_else(|| SchemaError::rule(rule, "a boolean")),
        }
    }

    pub(crate) fn number(&self, rule: &str) -> Result<Option<f64>, SchemaError> {
        match self.map.get(rule) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| SchemaError::rule(rule, "a number")),
        }
    }

    pub(crate) fn length(&self, rule: &str) -> Result<Option<usize>, SchemaError> {
        match self.map.get(rule) {
            None => Ok(None),
            Some(v) => v
                .as_u64()
                .or_else(|| {
                    v.as_f64()
                        .filter(|n| is_safe_integer(*n) && *n >= 0.0)
                        .map(|n| n as u64)
                })
                .and_then(|n| usize::try_from(n).ok())
                .map(Some)
                .ok_or_else(|| SchemaError::rule(rule, "a non-negative integer")),
        }
    }

    pub(crate) fn string(&self, rule: &str) -> Result<Option<&'a str>, SchemaError> {
        match self.map.get(rule) {
            None => Ok(None),
            Some(v) => v
                .as_str()
                .map(Some)
                .ok_or_else(|| SchemaError::rule(rule, "a string")),
        }
    }

    /// Read `default`, accepting only values the predicate allows.
    pub(crate) fn default_value(
        &self,
        expected: &str,
        accepts: fn(&Value) -> bool,
    ) -> Result<Option<Value>, SchemaError> {
        match self.map.get("default") {
            None => Ok(None),
            Some(v) if accepts(v) => Ok(Some(v.clone())),
            Some(_) => Err(SchemaError::rule("default", expected)),
        }
    }

    /// Resolve a nested schema object through the registry.
    pub(crate) fn nested(
        &self,
        rule: &str,
        registry: &Registry,
    ) -> Result<Option<ZSchema>, SchemaError> {
        match self.map.get(rule) {
            None => Ok(None),
            Some(v) => registry.from_json(v).map(Some),
        }
    }

    /// Resolve an array of nested schema objects through the registry.
    pub(crate) fn nested_list(
        &self,
        rule: &str,
        registry: &Registry,
    ) -> Result<Option<Vec<ZSchema>>, SchemaError> {
        match self.map.get(rule) {
            None => Ok(None),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| registry.from_json(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(_) => Err(SchemaError::rule(rule, "an array of schemas")),
        }
    }
}
