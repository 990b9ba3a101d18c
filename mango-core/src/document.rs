//! Document and Value types
//!
//! This module provides the data structures shared by the compiler and the
//! reference engine:
//! - Value: the tagged literal type carried by compiled expressions
//! - Document: an identified, sequenced bag of fields
//! - Field path navigation and CouchDB-style collation

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Reserved key holding the document identifier in JSON form
pub const ID_FIELD: &str = "_id";

/// Reserved key holding the revision / sequence marker in JSON form
pub const REV_FIELD: &str = "_rev";

/// Literal value type (JSON types with integers kept distinct from floats)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Object with string keys
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is a number (int or float)
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get as array reference
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Convert a JSON value, keeping integral numbers as `Int`
    pub fn from_json(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64::MAX and all fractional numbers land here
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(arr) => Value::Array(arr.iter().map(Value::from_json).collect()),
            JsonValue::Object(obj) => Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back to plain (untagged) JSON
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::Array(arr) => JsonValue::Array(arr.iter().map(Value::to_json).collect()),
            Value::Object(obj) => JsonValue::Object(
                obj.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Position of this value's type in the collation sequence
    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::Int(_) | Value::Float(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }

    /// Total order over values: null < false < true < numbers < strings < arrays < objects.
    ///
    /// Numbers compare numerically regardless of representation, so `Int(1)`
    /// collates equal to `Float(1.0)`.
    pub fn collate(&self, other: &Value) -> Ordering {
        let rank = self.type_rank().cmp(&other.type_rank());
        if rank != Ordering::Equal {
            return rank;
        }

        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (a, b) if a.is_number() => {
                let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Array(a), Value::Array(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    let cmp = x.collate(y);
                    if cmp != Ordering::Equal {
                        return cmp;
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Object(a), Value::Object(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    let cmp = ka.cmp(kb).then_with(|| va.collate(vb));
                    if cmp != Ordering::Equal {
                        return cmp;
                    }
                }
                a.len().cmp(&b.len())
            }
            // Null and booleans are fully ordered by rank
            _ => Ordering::Equal,
        }
    }

    /// Equality under collation
    pub fn collates_equal(&self, other: &Value) -> bool {
        self.collate(other) == Ordering::Equal
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{:?}", s),
            // Arrays and objects render as their JSON text
            Value::Array(_) | Value::Object(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(arr: Vec<Value>) -> Self {
        Value::Array(arr)
    }
}

/// Stored document: identifier, sequence number and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document identifier
    pub id: String,
    /// Revision / sequence marker assigned by the store
    pub sequence: u64,
    /// Document properties
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// Create an empty document with a specific ID
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence: 0,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style field insertion
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Insert a field
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.fields.insert(key, value)
    }

    /// Check if a field exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Get field by path (e.g., "user.address.city")
    pub fn get_by_path(&self, path: &str) -> Option<&Value> {
        let parts: Vec<&str> = path.split('.').collect();
        self.get_by_path_parts(&parts)
    }

    fn get_by_path_parts(&self, parts: &[&str]) -> Option<&Value> {
        if parts.is_empty() {
            return None;
        }

        let mut current = self.fields.get(parts[0])?;

        for &part in &parts[1..] {
            match current {
                Value::Object(obj) => {
                    current = obj.get(part)?;
                }
                Value::Array(arr) => {
                    // Support array indexing
                    if let Ok(index) = part.parse::<usize>() {
                        current = arr.get(index)?;
                    } else {
                        return None;
                    }
                }
                _ => return None,
            }
        }

        Some(current)
    }

    /// Build a document from its JSON form.
    ///
    /// `_id` must be a string. `_rev` is optional and may be a number or a
    /// CouchDB-style `"N-hash"` string, of which `N` becomes the sequence.
    pub fn from_json(json: &JsonValue) -> Result<Self, DocumentError> {
        let obj = json.as_object().ok_or(DocumentError::NotAnObject)?;

        let id = obj
            .get(ID_FIELD)
            .and_then(JsonValue::as_str)
            .ok_or(DocumentError::MissingId)?;

        let sequence = match obj.get(REV_FIELD) {
            None => 0,
            Some(rev) => parse_revision(rev)?,
        };

        let fields = obj
            .iter()
            .filter(|(k, _)| k.as_str() != ID_FIELD && k.as_str() != REV_FIELD)
            .map(|(k, v)| (k.clone(), Value::from_json(v)))
            .collect();

        Ok(Self {
            id: id.to_string(),
            sequence,
            fields,
        })
    }

    /// Parse a document from JSON text
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        let value: JsonValue = serde_json::from_str(json)
            .map_err(|e| DocumentError::DeserializationError(e.to_string()))?;
        Self::from_json(&value)
    }
}

fn parse_revision(rev: &JsonValue) -> Result<u64, DocumentError> {
    if let Some(n) = rev.as_u64() {
        return Ok(n);
    }
    rev.as_str()
        .and_then(|s| s.split('-').next())
        .and_then(|prefix| prefix.parse::<u64>().ok())
        .ok_or_else(|| DocumentError::InvalidRevision(rev.to_string()))
}

/// Document-related errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document must be a JSON object")]
    NotAnObject,

    #[error("Expected a JSON array of documents")]
    NotAnArray,

    #[error("Document is missing a string _id")]
    MissingId,

    #[error("Invalid revision: {0}")]
    InvalidRevision(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
