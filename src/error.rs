use std::fmt;

use serde_json::Value;

/// A segment in a validation error path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum PathSegment {
    /// Object field name.
    Field(String),
    /// Array index.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{}", name),
            PathSegment::Index(idx) => write!(f, "[{}]", idx),
        }
    }
}

/// Type of string validation that failed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum StringValidation {
    Uppercase,
    Lowercase,
    Contains,
    Regex,
}

/// Validation issue code: describes what went wrong.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum IssueCode {
    InvalidType { expected: String, received: String },
    MissingValue,
    TooSmall { minimum: f64, inclusive: bool },
    TooBig { maximum: f64, inclusive: bool },
    NotInt,
    NotEqual { expected: Value },
    InvalidString { validation: StringValidation },
    InvalidUnion,
    InvalidIntersection,
    InvalidNegation,
    InvalidJson,
    Custom { code: String },
}

impl IssueCode {
    /// Stable string key for this error code.
    pub fn key(&self) -> &str {
        match self {
            IssueCode::InvalidType { .. } => "invalid_type",
            IssueCode::MissingValue => "missing_value",
            IssueCode::TooSmall { .. } => "too_small",
            IssueCode::TooBig { .. } => "too_big",
            IssueCode::NotInt => "not_int",
            IssueCode::NotEqual { .. } => "not_equal",
            IssueCode::InvalidString { .. } => "invalid_string",
            IssueCode::InvalidUnion => "invalid_union",
            IssueCode::InvalidIntersection => "invalid_intersection",
            IssueCode::InvalidNegation => "invalid_negation",
            IssueCode::InvalidJson => "invalid_json",
            IssueCode::Custom { code } => code,
        }
    }
}

/// Data-validation error raised while parsing a value against a validator tree.
///
/// Validation stops at the first violated rule, so an error always describes
/// exactly one issue. Containers prefix the path of the failing child.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct ParseError {
    pub code: IssueCode,
    pub message: String,
    pub path: Vec<PathSegment>,
    /// The value that was received (if available).
    pub received: Option<Value>,
}

impl ParseError {
    /// Create an error without a received value.
    pub fn new(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: vec![],
            received: None,
        }
    }

    /// Create an error carrying the received value.
    pub fn with_value(code: IssueCode, message: impl Into<String>, received: &Value) -> Self {
        Self {
            code,
            message: message.into(),
            path: vec![],
            received: Some(truncate_value(received)),
        }
    }

    /// Shorthand for a [`IssueCode::Custom`] error, for use in custom validators.
    pub fn custom(code: impl Into<String>, message: impl Into<String>, received: &Value) -> Self {
        Self::with_value(IssueCode::Custom { code: code.into() }, message, received)
    }

    /// Prepend a path segment (used for nested objects/arrays).
    pub fn with_prefix(mut self, segment: PathSegment) -> Self {
        self.path.insert(0, segment);
        self
    }

    /// The path rendered as `.field[0].inner`.
    pub fn path_string(&self) -> String {
        self.path.iter().map(|p| p.to_string()).collect()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.path.is_empty() {
            write!(f, "{}: ", self.path_string())?;
        }
        write!(f, "{}", self.message)?;
        if let Some(val) = &self.received {
            write!(f, ", received {}", format_value_short(val))?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Schema-definition error raised while building a validator from JSON.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Expected schema to be an object")]
    NotAnObject,

    #[error("Expected schema.type to be a string")]
    MissingType,

    #[error("Validator \"{0}\" not found")]
    UnknownType(String),

    #[error("Expected schema.type to be \"{expected}\", found \"{found}\"")]
    TypeMismatch { expected: String, found: String },

    #[error("Schema nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("Expected schema.{rule} to be {expected}")]
    InvalidRule { rule: String, expected: String },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Raised by user factories registered with `Registry::set_validator`.
    #[error("{0}")]
    Custom(String),
}

impl SchemaError {
    pub(crate) fn rule(rule: &str, expected: &str) -> Self {
        SchemaError::InvalidRule {
            rule: rule.to_string(),
            expected: expected.to_string(),
        }
    }
}

/// Returns the JSON type name for a value.
#[doc(hidden)]
pub fn value_type_name(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

/// Format a JSON value for display in errors (short form).
pub fn format_value_short(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            if s.chars().count() > 50 {
                let head: String = s.chars().take(47).collect();
                format!("\"{}...\"", head)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Array(arr) => format!("Array(len={})", arr.len()),
        Value::Object(obj) => format!("Object(keys={})", obj.len()),
    }
}

/// Truncate large values to avoid storing huge payloads in errors.
fn truncate_value(value: &Value) -> Value {
    match value {
        Value::String(s) if s.chars().count() > 100 => {
            let head: String = s.chars().take(97).collect();
            Value::String(format!("{}...", head))
        }
        Value::Array(arr) if arr.len() > 5 => {
            let mut truncated: Vec<Value> = arr[..5].to_vec();
            truncated.push(Value::String(format!("... ({} more)", arr.len() - 5)));
            Value::Array(truncated)
        }
        _ => value.clone(),
    }
}
