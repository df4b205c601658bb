//! # vschema: JSON-serializable runtime validation for Rust
//!
//! `vschema` builds validator trees either with chained builder calls or from
//! a plain JSON schema document, and serializes every tree back to that same
//! document. Trees are immutable once built and can be shared across threads.
//!
//! ## Quick Start
//!
//! ```rust
//! use vschema::prelude::*;
//! use serde_json::json;
//!
//! let user = vschema::object()
//!     .field("name", vschema::string().required().min(2).max(50))
//!     .field("age", vschema::number().integer().min(0.0))
//!     .field("tags", vschema::array().required().item(vschema::string().lowercase()).default(vec![]));
//!
//! let out = user.parse(r#"{"name": "Alex", "age": 30.0, "admin": true}"#).unwrap();
//! assert_eq!(out, json!({"name": "Alex", "age": 30, "tags": []}));
//!
//! // The same tree as a schema document, and back.
//! let registry = Registry::new();
//! let doc = registry.to_json(&user);
//! let rebuilt = registry.from_json(&doc).unwrap();
//! assert_eq!(rebuilt.to_json(), doc);
//! ```

pub mod collections;
pub mod combinators;
pub mod error;
pub mod input;
pub mod object;
pub mod primitives;
pub mod registry;
pub mod rule;
pub mod schema;

#[doc(hidden)]
pub use serde_json;

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Create a validator that accepts any non-null value.
pub fn any() -> primitives::ZAny {
    primitives::ZAny::new()
}

/// Create a boolean validation schema.
pub fn boolean() -> primitives::ZBoolean {
    primitives::ZBoolean::new()
}

/// Create a number validation schema (`f64`).
pub fn number() -> primitives::ZNumber {
    primitives::ZNumber::new()
}

/// Create a string validation schema.
pub fn string() -> primitives::ZString {
    primitives::ZString::new()
}

/// Create an array validation schema.
pub fn array() -> collections::ZArray {
    collections::ZArray::new()
}

/// Create an object validation schema.
pub fn object() -> object::ZObject {
    object::ZObject::new()
}

/// Create a schema that passes if any child passes.
pub fn or() -> combinators::ZOr {
    combinators::ZOr::new()
}

/// Create a schema that passes if every child passes.
pub fn and() -> combinators::ZAnd {
    combinators::ZAnd::new()
}

/// Create a schema that passes if `validator` rejects the value.
pub fn not(validator: impl Into<schema::ZSchema>) -> combinators::ZNot {
    combinators::ZNot::new(validator)
}

/// Prelude: import everything needed to build and run validators.
pub mod prelude {
    pub use crate::collections::ZArray;
    pub use crate::combinators::{ZAnd, ZNot, ZOr};
    pub use crate::error::{IssueCode, ParseError, PathSegment, SchemaError, StringValidation};
    pub use crate::input::JsonInput;
    pub use crate::object::ZObject;
    pub use crate::primitives::{Pattern, ZAny, ZBoolean, ZNumber, ZString};
    pub use crate::registry::{Registry, ValidatorFactory, MAX_DEPTH};
    pub use crate::rule::Rule;
    pub use crate::schema::{Validator, ZSchema};
}
