//! Type-name → validator factory lookup.
//!
//! The registry is what turns a JSON schema object into a validator tree. Every
//! nested schema (array items, object fields, logical children) is resolved
//! through it, so a type registered here is usable anywhere a built-in is.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::collections::ZArray;
use crate::combinators::{ZAnd, ZNot, ZOr};
use crate::error::SchemaError;
use crate::input::JsonInput;
use crate::object::ZObject;
use crate::primitives::{ZAny, ZBoolean, ZNumber, ZString};
use crate::schema::{schema_type, Validator, ZSchema};

/// Builds a validator from a schema object whose `type` has already been resolved.
pub type ValidatorFactory =
    Arc<dyn Fn(&Map<String, Value>, &Registry) -> Result<ZSchema, SchemaError> + Send + Sync>;

/// Case-insensitive mapping from schema type names to validator factories.
///
/// # Example
/// ```
/// use vschema::prelude::*;
/// use serde_json::json;
///
/// let registry = Registry::new();
/// let schema = registry
///     .from_json(&json!({"type": "Array", "item": {"type": "number", "integer": true}}))
///     .unwrap();
/// assert!(schema.validate_value(&json!([1, 2, 3])));
/// assert!(!schema.validate_value(&json!([1, 2.5])));
/// ```
#[derive(Clone)]
pub struct Registry {
    factories: Arc<HashMap<String, ValidatorFactory>>,
    /// Type whose factory is running when this registry is handed to it.
    resolving: Option<String>,
    depth: usize,
}

/// Deepest schema nesting `from_json` will follow.
pub const MAX_DEPTH: usize = 128;

impl Registry {
    /// A registry with every built-in validator kind.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register_builtin("any", |map, reg| ZAny::build(map, reg).map(Into::into));
        registry.register_builtin("boolean", |map, reg| {
            ZBoolean::build(map, reg).map(Into::into)
        });
        registry.register_builtin("number", |map, reg| ZNumber::build(map, reg).map(Into::into));
        registry.register_builtin("string", |map, reg| ZString::build(map, reg).map(Into::into));
        registry.register_builtin("array", |map, reg| ZArray::build(map, reg).map(Into::into));
        registry.register_builtin("object", |map, reg| ZObject::build(map, reg).map(Into::into));
        registry.register_builtin("or", |map, reg| ZOr::build(map, reg).map(Into::into));
        registry.register_builtin("and", |map, reg| ZAnd::build(map, reg).map(Into::into));
        registry.register_builtin("not", |map, reg| ZNot::build(map, reg).map(Into::into));
        debug!(count = registry.factories.len(), "registered built-in validators");
        registry
    }

    /// A registry without any validator kinds.
    pub fn empty() -> Self {
        Self {
            factories: Arc::new(HashMap::new()),
            resolving: None,
            depth: 0,
        }
    }

    fn register_builtin(
        &mut self,
        name: &str,
        factory: fn(&Map<String, Value>, &Registry) -> Result<ZSchema, SchemaError>,
    ) {
        Arc::make_mut(&mut self.factories).insert(name.to_string(), Arc::new(factory));
    }

    /// Whether a validator kind is registered under this name.
    pub fn has_validator(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// The factory registered under this name.
    pub fn get_validator(&self, name: &str) -> Option<ValidatorFactory> {
        self.factories.get(&name.to_lowercase()).cloned()
    }

    /// Register (or replace) a validator kind. Returns the previous factory, if any.
    ///
    /// # Example
    /// ```
    /// use vschema::prelude::*;
    /// use serde_json::json;
    ///
    /// let mut registry = Registry::new();
    /// // "int" becomes a number validator with the integer rule forced on
    /// registry.set_validator("int", |map, reg| {
    ///     let mut map = map.clone();
    ///     map.insert("type".into(), json!("number"));
    ///     map.insert("integer".into(), json!(true));
    ///     ZNumber::from_json(&serde_json::Value::Object(map), reg)
    /// });
    /// assert!(registry.has_validator("INT"));
    ///
    /// let schema = registry.from_json(&json!({"type": "int", "min": 0})).unwrap();
    /// assert!(schema.validate_value(&json!(3)));
    /// assert!(!schema.validate_value(&json!(3.5)));
    /// ```
    pub fn set_validator<F>(&mut self, name: &str, factory: F) -> Option<ValidatorFactory>
    where
        F: Fn(&Map<String, Value>, &Registry) -> Result<ZSchema, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.to_lowercase();
        debug!(name = %name, "registering validator");
        Arc::make_mut(&mut self.factories).insert(name, Arc::new(factory))
    }

    /// Remove a validator kind. Returns `true` if it was registered.
    pub fn delete_validator(&mut self, name: &str) -> bool {
        let name = name.to_lowercase();
        debug!(name = %name, "removing validator");
        Arc::make_mut(&mut self.factories).remove(&name).is_some()
    }

    /// Names of all registered validator kinds, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build a validator tree from a JSON schema object.
    ///
    /// Factories receive a view of this registry that records which type is
    /// being resolved and how deep the schema is nested. Nesting beyond
    /// [`MAX_DEPTH`] fails with [`SchemaError::TooDeep`].
    pub fn from_json(&self, schema: &Value) -> Result<ZSchema, SchemaError> {
        let (map, ty) = schema_type(schema)?;
        if self.depth >= MAX_DEPTH {
            return Err(SchemaError::TooDeep(MAX_DEPTH));
        }
        let factory = self
            .factories
            .get(&ty)
            .ok_or_else(|| SchemaError::UnknownType(ty.clone()))?;
        debug!(schema_type = %ty, depth = self.depth, "resolving schema");
        let scope = Registry {
            factories: Arc::clone(&self.factories),
            resolving: Some(ty),
            depth: self.depth + 1,
        };
        factory(map, &scope)
    }

    /// The type whose factory received this registry, if any.
    pub(crate) fn resolving(&self) -> Option<&str> {
        self.resolving.as_deref()
    }

    /// Build a validator tree from JSON text or bytes.
    pub fn load<I: JsonInput + ?Sized>(&self, input: &I) -> Result<ZSchema, SchemaError> {
        let schema = input.to_json_value()?;
        self.from_json(&schema)
    }

    /// Serialize a validator tree into its JSON schema object.
    pub fn to_json<V: Validator + ?Sized>(&self, validator: &V) -> Value {
        validator.to_json()
    }

    pub fn any(&self) -> ZAny {
        ZAny::new()
    }

    pub fn boolean(&self) -> ZBoolean {
        ZBoolean::new()
    }

    pub fn number(&self) -> ZNumber {
        ZNumber::new()
    }

    pub fn string(&self) -> ZString {
        ZString::new()
    }

    pub fn array(&self) -> ZArray {
        ZArray::new()
    }

    pub fn object(&self) -> ZObject {
        ZObject::new()
    }

    pub fn or(&self) -> ZOr {
        ZOr::new()
    }

    pub fn and(&self) -> ZAnd {
        ZAnd::new()
    }

    pub fn not(&self, validator: impl Into<ZSchema>) -> ZNot {
        ZNot::new(validator)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
