//! Compilation errors

/// Selector / projection compilation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Malformed selector: {0}")]
    MalformedSelector(String),

    #[error("Invalid operand for {operator}: expected {expected}")]
    InvalidOperand {
        operator: String,
        expected: String,
    },

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Malformed projection: {0}")]
    MalformedProjection(String),
}

impl CompileError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedSelector(message.into())
    }

    pub(crate) fn operand(operator: &str, expected: impl Into<String>) -> Self {
        Self::InvalidOperand {
            operator: operator.to_string(),
            expected: expected.into(),
        }
    }
}
