use std::fmt;

use regex_lite::Regex;
use serde_json::{Map, Value};

use crate::error::{IssueCode, ParseError, SchemaError, StringValidation};
use crate::registry::Registry;
use crate::rule::Rule;
use crate::schema::{dispatch, Presence, SchemaReader, Validator, ZSchema};

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// A regular expression together with the `/pattern/flags` form it serializes to.
///
/// Flags `i`, `m` and `s` become inline regex flags. `g`, `u` and `y` are kept
/// for serialization but do not change matching.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` with the given flag letters.
    pub fn new(source: &str, flags: &str) -> Result<Self, SchemaError> {
        let mut inline = String::new();
        for flag in flags.chars() {
            match flag {
                'i' | 'm' | 's' => {
                    if !inline.contains(flag) {
                        inline.push(flag);
                    }
                }
                'g' | 'u' | 'y' => {}
                other => {
                    return Err(SchemaError::InvalidPattern(format!(
                        "unsupported flag '{}'",
                        other
                    )))
                }
            }
        }
        let compiled = if inline.is_empty() {
            source.to_string()
        } else {
            format!("(?{}){}", inline, source)
        };
        let regex = Regex::new(&compiled).map_err(|e| SchemaError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            source: source.to_string(),
            flags: flags.to_string(),
            regex,
        })
    }

    /// Parse the `/pattern/flags` literal form.
    ///
    /// ```
    /// use vschema::primitives::Pattern;
    ///
    /// let p = Pattern::parse("/^ab+c$/i").unwrap();
    /// assert!(p.is_match("ABBC"));
    /// assert_eq!(p.to_string(), "/^ab+c$/i");
    /// ```
    pub fn parse(literal: &str) -> Result<Self, SchemaError> {
        let body = literal.strip_prefix('/').ok_or_else(|| {
            SchemaError::InvalidPattern(format!("expected /pattern/flags, got {}", literal))
        })?;
        let end = body.rfind('/').ok_or_else(|| {
            SchemaError::InvalidPattern(format!("missing closing '/' in {}", literal))
        })?;
        Self::new(&body[..end], &body[end + 1..])
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

/// Wraps a compiled regex with an empty flag string.
///
/// Only the pattern text is kept for serialization, so options set through
/// `RegexBuilder` (such as `case_insensitive`) are lost on a JSON round trip.
/// Write them inline (`(?i)abc`) or use [`Pattern::new`] with flags instead.
impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self {
            source: regex.as_str().to_string(),
            flags: String::new(),
            regex,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

// ---------------------------------------------------------------------------
// ZString
// ---------------------------------------------------------------------------

/// Schema for string validation. Created via [`vschema::string()`](crate::string).
///
/// Lengths are counted in characters.
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let schema = vschema::string().uppercase();
/// assert_eq!(schema.parse_value(&json!("ABC")).unwrap(), json!("ABC"));
/// assert!(schema.parse_value(&json!("abc")).is_err());
/// ```
#[derive(Clone, Default)]
pub struct ZString {
    presence: Presence,
    uppercase: Rule,
    lowercase: Rule,
    min: Rule<usize>,
    max: Rule<usize>,
    contains: Rule<String>,
    matches: Rule<Pattern>,
    equals: Rule<String>,
}

impl ZString {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reject `null` unless a default is set.
    pub fn required(mut self) -> Self {
        self.presence.required.set_flag(true);
        self
    }

    /// Value substituted when parsing fails.
    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.presence.default.set(Value::String(value.into()));
        self
    }

    /// Must be unchanged by upper-casing.
    pub fn uppercase(mut self) -> Self {
        self.uppercase.set_flag(true);
        self
    }

    /// Must be unchanged by lower-casing.
    pub fn lowercase(mut self) -> Self {
        self.lowercase.set_flag(true);
        self
    }

    /// Minimum length in characters.
    pub fn min(mut self, len: usize) -> Self {
        self.min.set(len);
        self
    }

    /// Maximum length in characters.
    pub fn max(mut self, len: usize) -> Self {
        self.max.set(len);
        self
    }

    /// Must contain the given substring.
    pub fn contains(mut self, sub: impl Into<String>) -> Self {
        self.contains.set(sub.into());
        self
    }

    /// Must match the given regex.
    pub fn matches(mut self, pattern: impl Into<Pattern>) -> Self {
        self.matches.set(pattern.into());
        self
    }

    /// Must match the regex given in `/pattern/flags` form.
    pub fn try_matches(self, literal: &str) -> Result<Self, SchemaError> {
        Ok(self.matches(Pattern::parse(literal)?))
    }

    /// Must be exactly this string.
    pub fn equals(mut self, value: impl Into<String>) -> Self {
        self.equals.set(value.into());
        self
    }

    /// Build from a JSON schema object, dispatching other types through the registry.
    pub fn from_json(schema: &Value, registry: &Registry) -> Result<ZSchema, SchemaError> {
        dispatch(schema, registry, "string", Self::build)
    }

    pub(crate) fn build(map: &Map<String, Value>, _registry: &Registry) -> Result<Self, SchemaError> {
        let reader = SchemaReader::new(map);
        let mut schema = Self {
            presence: Presence::from_reader(&reader)?,
            ..Default::default()
        };
        if let Some(default) = reader.default_value("a string", Value::is_string)? {
            schema.presence.default.set(default);
        }
        schema.uppercase.set_flag(reader.flag("uppercase")?);
        schema.lowercase.set_flag(reader.flag("lowercase")?);
        if let Some(len) = reader.length("min")? {
            schema = schema.min(len);
        }
        if let Some(len) = reader.length("max")? {
            schema = schema.max(len);
        }
        if let Some(sub) = reader.string("contains")? {
            schema = schema.contains(sub);
        }
        if let Some(literal) = reader.string("matches")? {
            schema = schema.try_matches(literal)?;
        }
        if let Some(s) = reader.string("equals")? {
            schema = schema.equals(s);
        }
        Ok(schema)
    }

    fn check(&self, value: &Value) -> Result<Value, ParseError> {
        let s = value
            .as_str()
            .ok_or_else(|| self.presence.mismatch("string", value))?;

        if self.uppercase.is_set() && s.to_uppercase() != s {
            return Err(ParseError::with_value(
                IssueCode::InvalidString {
                    validation: StringValidation::Uppercase,
                },
                "String must be uppercase",
                value,
            ));
        }

        if self.lowercase.is_set() && s.to_lowercase() != s {
            return Err(ParseError::with_value(
                IssueCode::InvalidString {
                    validation: StringValidation::Lowercase,
                },
                "String must be lowercase",
                value,
            ));
        }

        let len = s.chars().count();

        if let Some(min) = self.min.get() {
            if len < *min {
                return Err(ParseError::with_value(
                    IssueCode::TooSmall {
                        minimum: *min as f64,
                        inclusive: true,
                    },
                    format!("String must be at least {} characters", min),
                    value,
                ));
            }
        }

        if let Some(max) = self.max.get() {
            if len > *max {
                return Err(ParseError::with_value(
                    IssueCode::TooBig {
                        maximum: *max as f64,
                        inclusive: true,
                    },
                    format!("String must be at most {} characters", max),
                    value,
                ));
            }
        }

        if let Some(sub) = self.contains.get() {
            if !s.contains(sub.as_str()) {
                return Err(ParseError::with_value(
                    IssueCode::InvalidString {
                        validation: StringValidation::Contains,
                    },
                    format!("String must contain \"{}\"", sub),
                    value,
                ));
            }
        }

        if let Some(pattern) = self.matches.get() {
            if !pattern.is_match(s) {
                return Err(ParseError::with_value(
                    IssueCode::InvalidString {
                        validation: StringValidation::Regex,
                    },
                    format!("String must match {}", pattern),
                    value,
                ));
            }
        }

        if let Some(expected) = self.equals.get() {
            if s != expected.as_str() {
                return Err(ParseError::with_value(
                    IssueCode::NotEqual {
                        expected: Value::String(expected.clone()),
                    },
                    format!("String must equal \"{}\"", expected),
                    value,
                ));
            }
        }

        Ok(value.clone())
    }
}

impl Validator for ZString {
    fn type_name(&self) -> &str {
        "string"
    }

    fn parse_value(&self, value: &Value) -> Result<Value, ParseError> {
        self.presence.resolve(value, self.check(value))
    }

    fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".into(), Value::from("string"));
        self.presence.write(&mut out);
        if self.uppercase.is_set() {
            out.insert("uppercase".into(), Value::Bool(true));
        }
        if self.lowercase.is_set() {
            out.insert("lowercase".into(), Value::Bool(true));
        }
        if let Some(len) = self.min.get() {
            out.insert("min".into(), Value::from(*len));
        }
        if let Some(len) = self.max.get() {
            out.insert("max".into(), Value::from(*len));
        }
        if let Some(sub) = self.contains.get() {
            out.insert("contains".into(), Value::String(sub.clone()));
        }
        if let Some(pattern) = self.matches.get() {
            out.insert("matches".into(), Value::String(pattern.to_string()));
        }
        if let Some(s) = self.equals.get() {
            out.insert("equals".into(), Value::String(s.clone()));
        }
        Value::Object(out)
    }
}
