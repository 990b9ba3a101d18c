//! Projection compiler
//!
//! Turns the `fields` list of a request into result columns.

use super::ast::{Accessor, MetaKey};
use super::error::CompileError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// One output binding of a projection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResultColumn {
    /// Every document property
    All,
    /// A single accessor, optionally renamed
    Column {
        accessor: Accessor,
        alias: Option<String>,
    },
}

impl ResultColumn {
    /// Column for a requested field name
    pub fn for_field(name: &str) -> Self {
        match MetaKey::from_field(name) {
            Some(meta) => ResultColumn::Column {
                accessor: Accessor::Meta(meta),
                alias: Some(meta.field_name().to_string()),
            },
            None => ResultColumn::Column {
                accessor: Accessor::Property(name.to_string()),
                alias: None,
            },
        }
    }

    /// Name of the column in a result row
    pub fn output_name(&self) -> Option<&str> {
        match self {
            ResultColumn::All => None,
            ResultColumn::Column {
                alias: Some(alias), ..
            } => Some(alias.as_str()),
            ResultColumn::Column {
                accessor: Accessor::Property(path),
                ..
            } => path.rsplit('.').next(),
            ResultColumn::Column {
                accessor: Accessor::Meta(meta),
                ..
            } => Some(meta.field_name()),
            ResultColumn::Column {
                accessor: Accessor::Variable(name),
                ..
            } => Some(name.as_str()),
        }
    }
}

/// Ordered set of result columns
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectionSpec {
    pub columns: Vec<ResultColumn>,
}

impl ProjectionSpec {
    /// Select every property
    pub fn all() -> Self {
        Self {
            columns: vec![ResultColumn::All],
        }
    }

    /// Check if this projection is the wildcard
    pub fn is_all(&self) -> bool {
        matches!(self.columns.as_slice(), [ResultColumn::All])
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Default for ProjectionSpec {
    fn default() -> Self {
        Self::all()
    }
}

/// Compile the optional `fields` value of a request.
///
/// Absent (or `null`) selects all fields; an empty array selects no columns.
pub fn compile_projection(fields: Option<&JsonValue>) -> Result<ProjectionSpec, CompileError> {
    let fields = match fields {
        None | Some(JsonValue::Null) => return Ok(ProjectionSpec::all()),
        Some(fields) => fields,
    };

    let names = fields
        .as_array()
        .ok_or_else(|| CompileError::MalformedProjection("fields must be an array".to_string()))?;

    let columns = names
        .iter()
        .map(|name| {
            name.as_str().map(ResultColumn::for_field).ok_or_else(|| {
                CompileError::MalformedProjection(format!(
                    "field names must be strings, found {}",
                    name
                ))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProjectionSpec { columns })
}
