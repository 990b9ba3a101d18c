//! Execution engine interface
//!
//! The compiler hands `QueryRequest`s to a `QueryEngine`. `MemoryEngine` is
//! an in-memory implementation over `Document`s.

pub mod memory;

pub use memory::MemoryEngine;

use crate::document::Value;
use crate::query::QueryRequest;
use serde_json::{Map, Value as JsonValue};

/// Executes compiled requests
pub trait QueryEngine {
    fn execute(&self, request: &QueryRequest) -> Result<Vec<Row>, EngineError>;
}

/// One result row: named columns in projection order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.columns.push((name.into(), value));
    }

    /// Get a column by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, value)| value)
    }

    /// Get a string column by name
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Convert to a JSON object, keeping column order
    pub fn to_json(&self) -> JsonValue {
        let map: Map<String, JsonValue> = self
            .columns
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        JsonValue::Object(map)
    }
}

/// Query execution errors
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown data source: {0}")]
    UnknownSource(String),

    #[error("Unbound variable: {0}")]
    UnboundVariable(String),

    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),
}
