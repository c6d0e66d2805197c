//! Property value types for node and edge payloads

use super::store::{GraphError, GraphResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Property value type supporting multiple data types
///
/// Supports:
/// - String
/// - Integer (i64)
/// - Float (f64)
/// - Boolean
/// - Array (Vec<PropertyValue>)
/// - Map (insertion-ordered, see [`PropertyMap`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Vec<PropertyValue>),
    Map(PropertyMap),
    Null,
}

impl PropertyValue {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get float value if this is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get boolean value if this is a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get array value if this is an array
    pub fn as_array(&self) -> Option<&Vec<PropertyValue>> {
        match self {
            PropertyValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get map value if this is a map
    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::Array(_) => "Array",
            PropertyValue::Map(_) => "Map",
            PropertyValue::Null => "Null",
        }
    }

    /// Convert from untyped JSON. Integral numbers become `Integer`, others `Float`.
    /// Integers outside the `i64` range are rejected rather than rounded.
    pub fn from_json(value: JsonValue) -> GraphResult<Self> {
        Ok(match value {
            JsonValue::Null => PropertyValue::Null,
            JsonValue::Bool(b) => PropertyValue::Boolean(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PropertyValue::Integer(i)
                } else if n.is_f64() {
                    PropertyValue::Float(n.as_f64().unwrap_or(f64::NAN))
                } else {
                    return Err(GraphError::InvalidSpec(format!(
                        "integer {} does not fit in a 64-bit signed property",
                        n
                    )));
                }
            }
            JsonValue::String(s) => PropertyValue::String(s),
            JsonValue::Array(items) => PropertyValue::Array(
                items
                    .into_iter()
                    .map(PropertyValue::from_json)
                    .collect::<GraphResult<_>>()?,
            ),
            JsonValue::Object(map) => PropertyValue::Map(
                map.into_iter()
                    .map(|(k, v)| PropertyValue::from_json(v).map(|v| (k, v)))
                    .collect::<GraphResult<_>>()?,
            ),
        })
    }

    /// Convert to untyped JSON. Non-finite floats become null.
    pub fn to_json(&self) -> JsonValue {
        match self {
            PropertyValue::String(s) => JsonValue::String(s.clone()),
            PropertyValue::Integer(i) => JsonValue::from(*i),
            PropertyValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            PropertyValue::Boolean(b) => JsonValue::Bool(*b),
            PropertyValue::Array(arr) => JsonValue::Array(arr.iter().map(|v| v.to_json()).collect()),
            PropertyValue::Map(map) => JsonValue::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            PropertyValue::Null => JsonValue::Null,
        }
    }

    /// Loose equality against a JSON value, as used by query objects
    pub fn matches_json(&self, expected: &JsonValue) -> bool {
        match (self, expected) {
            (PropertyValue::Integer(i), JsonValue::Number(n)) => match n.as_i64() {
                Some(j) => *i == j,
                None => n.as_f64() == Some(*i as f64),
            },
            (PropertyValue::Float(f), JsonValue::Number(n)) => n.as_f64() == Some(*f),
            _ => self.to_json() == *expected,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            PropertyValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, val)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, val)?;
                }
                write!(f, "}}")
            }
            PropertyValue::Null => write!(f, "null"),
        }
    }
}

// Convenience conversions
impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(arr: Vec<PropertyValue>) -> Self {
        PropertyValue::Array(arr)
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(map: PropertyMap) -> Self {
        PropertyValue::Map(map)
    }
}

impl TryFrom<JsonValue> for PropertyValue {
    type Error = GraphError;

    fn try_from(value: JsonValue) -> GraphResult<Self> {
        PropertyValue::from_json(value)
    }
}

/// Payload of a node or edge, in insertion order
pub type PropertyMap = IndexMap<String, PropertyValue>;

/// Build a payload from a JSON object
pub fn property_map_from_json(value: JsonValue) -> GraphResult<PropertyMap> {
    match value {
        JsonValue::Object(map) => map
            .into_iter()
            .map(|(k, v)| PropertyValue::from_json(v).map(|v| (k, v)))
            .collect(),
        other => Err(GraphError::InvalidSpec(format!(
            "payload must be a JSON object, got {}",
            other
        ))),
    }
}
