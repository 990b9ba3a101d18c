//! Query assembly
//!
//! Combines a compiled selector and projection with the data source they
//! target. Nothing here performs I/O or consults a schema.

use super::ast::Expression;
use super::error::CompileError;
use super::parser::{CompileOptions, SelectorParser};
use super::projection::{compile_projection, ProjectionSpec, ResultColumn};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use tracing::info;

/// Reference to the collection a query runs against
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DataSource {
    pub name: String,
}

impl DataSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Compiled query, ready to hand to an engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    /// Selector document as received
    pub selector: JsonValue,
    /// Compiled output columns
    pub projection: ProjectionSpec,
    /// Compiled predicate
    pub expression: Expression,
    /// Target collection
    pub source: DataSource,
}

impl QueryRequest {
    /// Render the request as `SELECT ... FROM ... WHERE ...`
    pub fn explain(&self) -> String {
        let columns: Vec<String> = self
            .projection
            .columns
            .iter()
            .map(|column| match column {
                ResultColumn::All => "*".to_string(),
                ResultColumn::Column {
                    accessor,
                    alias: Some(alias),
                } => format!("{} AS {}", accessor, alias),
                ResultColumn::Column { accessor, .. } => accessor.to_string(),
            })
            .collect();

        format!(
            "SELECT {} FROM {} WHERE {}",
            columns.join(", "),
            self.source,
            self.expression
        )
    }
}

/// Selector + projection compiler
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCompiler {
    parser: SelectorParser,
}

impl QueryCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            parser: SelectorParser::new(options),
        }
    }

    /// Compile a selector and optional field list against `source`
    pub fn compile(
        &self,
        selector: &JsonValue,
        fields: Option<&JsonValue>,
        source: DataSource,
    ) -> Result<QueryRequest, CompileError> {
        let expression = self.parser.parse(selector)?;
        let projection = compile_projection(fields)?;

        info!(
            source = %source,
            columns = projection.len(),
            "compiled selector"
        );

        Ok(QueryRequest {
            selector: selector.clone(),
            projection,
            expression,
            source,
        })
    }

    /// Compile a `{"selector": ..., "fields": ...}` request value
    pub fn compile_value(
        &self,
        request: &JsonValue,
        source: DataSource,
    ) -> Result<QueryRequest, CompileError> {
        let obj = request
            .as_object()
            .ok_or_else(|| CompileError::malformed("request must be an object"))?;
        let selector = obj
            .get("selector")
            .ok_or_else(|| CompileError::malformed("request is missing a selector"))?;

        self.compile(selector, obj.get("fields"), source)
    }

    /// Compile a request from JSON text
    pub fn compile_str(&self, json: &str, source: DataSource) -> Result<QueryRequest, CompileError> {
        let value: JsonValue =
            serde_json::from_str(json).map_err(|e| CompileError::InvalidJson(e.to_string()))?;
        self.compile_value(&value, source)
    }
}

/// Compile with default options
pub fn compile(
    selector: &JsonValue,
    fields: Option<&JsonValue>,
    source: DataSource,
) -> Result<QueryRequest, CompileError> {
    QueryCompiler::default().compile(selector, fields, source)
}

/// Compile a JSON request text with default options
pub fn compile_request(json: &str, source: DataSource) -> Result<QueryRequest, CompileError> {
    QueryCompiler::default().compile_str(json, source)
}
