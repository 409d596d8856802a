//! Schema-less object model for API payloads.
//!
//! Every entity the server returns is represented as an [`ApiObject`]: a
//! property bag mapping string keys to [`Value`]s, tagged with the
//! [`ObjectKind`] it was materialized as. Consumers pattern-match on
//! [`Value`] (or use the typed accessors) instead of casting blindly, so a
//! payload whose shape drifts from expectations surfaces as a
//! [`PropertyError`] rather than a panic.

use std::collections::BTreeMap;

use serde_json::Number;

/// The concrete entity type an object was materialized as.
///
/// Payloads carrying an `object` discriminator that is registered in the
/// [`Registry`](crate::Registry) are tagged with the matching kind; anything
/// else (no discriminator, or an unrecognized one) is tagged `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Fallback for payloads without a registered discriminator.
    Generic,
    /// A structured API error (`"error"`).
    Error,
    /// A paginated list (`"list"`).
    Collection,
    /// An SMS message (`"message"`).
    Message,
    /// A bulk send operation (`"bulk_message"`).
    BulkMessage,
    /// An upload slot for a bulk CSV (`"bulk_file"`).
    BulkFile,
}

/// A decoded, fully materialized JSON value.
///
/// Unlike `serde_json::Value`, the object arm holds an [`ApiObject`]: by the
/// time a `Value` exists, every nested mapping has already been converted,
/// so no raw JSON hides inside the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(ApiObject),
}

impl Value {
    /// Returns `true` for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ApiObject> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Exports the value back into plain decoded JSON.
    ///
    /// Converting the exported form again yields a structurally equivalent
    /// tree, including the kind tags resolved through the registry.
    pub fn to_raw(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(values) => {
                serde_json::Value::Array(values.iter().map(Value::to_raw).collect())
            }
            Value::Object(object) => object.to_raw(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(Number::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<ApiObject> for Value {
    fn from(object: ApiObject) -> Self {
        Value::Object(object)
    }
}

/// A property lookup that found something other than what the caller asked
/// for.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// The key is not present on the object.
    #[error("property `{0}` is missing")]
    Missing(String),

    /// The key is present but the stored value has a different shape.
    #[error("property `{key}` is not a {expected}")]
    Mismatch {
        key: String,
        expected: &'static str,
    },
}

/// A materialized server entity: a kind tag plus a key/value property bag.
///
/// The `id` property is always present (construction seeds it with `Null`
/// when the payload carried none), and the `object` discriminator, when the
/// payload had one, is stored as an ordinary property as well.
///
/// # Examples
///
/// ```
/// use denpo::{ApiObject, Value};
///
/// let mut object = ApiObject::generic(Value::from("msg_1"));
/// object.set("to", Value::from("09012345678"));
///
/// assert_eq!(object.id().as_str(), Some("msg_1"));
/// assert_eq!(object.get_str("to"), Ok("09012345678"));
/// assert!(object.get("missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiObject {
    kind: ObjectKind,
    properties: BTreeMap<String, Value>,
}

impl ApiObject {
    /// Creates an object of the given kind, seeding the `id` property.
    pub fn new(kind: ObjectKind, id: Value) -> Self {
        let mut properties = BTreeMap::new();
        properties.insert("id".to_owned(), id);
        Self { kind, properties }
    }

    /// Creates a `Generic` object, seeding the `id` property.
    pub fn generic(id: Value) -> Self {
        Self::new(ObjectKind::Generic, id)
    }

    /// The kind this object was materialized as.
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Returns the value stored under `key`, or `None` when absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Inserts or overwrites a property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// The currently held property keys. Order is not significant.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// The distinguished `id` property. `Null` when the payload had none.
    pub fn id(&self) -> &Value {
        self.properties.get("id").unwrap_or(&Value::Null)
    }

    /// The `object` discriminator string, when present.
    pub fn object(&self) -> Option<&str> {
        self.properties.get("object").and_then(Value::as_str)
    }

    pub fn get_str(&self, key: &str) -> Result<&str, PropertyError> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| PropertyError::Mismatch {
                key: key.to_owned(),
                expected: "string",
            })
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, PropertyError> {
        self.require(key)?
            .as_bool()
            .ok_or_else(|| PropertyError::Mismatch {
                key: key.to_owned(),
                expected: "boolean",
            })
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, PropertyError> {
        self.require(key)?
            .as_i64()
            .ok_or_else(|| PropertyError::Mismatch {
                key: key.to_owned(),
                expected: "integer",
            })
    }

    pub fn get_array(&self, key: &str) -> Result<&[Value], PropertyError> {
        self.require(key)?
            .as_array()
            .ok_or_else(|| PropertyError::Mismatch {
                key: key.to_owned(),
                expected: "array",
            })
    }

    pub fn get_object(&self, key: &str) -> Result<&ApiObject, PropertyError> {
        self.require(key)?
            .as_object()
            .ok_or_else(|| PropertyError::Mismatch {
                key: key.to_owned(),
                expected: "object",
            })
    }

    fn require(&self, key: &str) -> Result<&Value, PropertyError> {
        self.properties
            .get(key)
            .ok_or_else(|| PropertyError::Missing(key.to_owned()))
    }

    /// Exports the object back into plain decoded JSON.
    pub fn to_raw(&self) -> serde_json::Value {
        let map = self
            .properties
            .iter()
            .map(|(key, value)| (key.clone(), value.to_raw()))
            .collect();
        serde_json::Value::Object(map)
    }
}
