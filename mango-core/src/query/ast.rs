//! Expression tree definitions
//!
//! Defines the engine-agnostic predicate tree produced by selector compilation

use crate::document::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata accessors exposed by the storage engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MetaKey {
    /// Document identifier (`_id`)
    Id,
    /// Revision / sequence marker (`_rev`)
    Sequence,
}

impl MetaKey {
    /// Resolve a reserved field name to its metadata accessor
    pub fn from_field(name: &str) -> Option<Self> {
        match name {
            "_id" => Some(MetaKey::Id),
            "_rev" => Some(MetaKey::Sequence),
            _ => None,
        }
    }

    /// The reserved field name this accessor is exposed under
    pub fn field_name(&self) -> &'static str {
        match self {
            MetaKey::Id => "_id",
            MetaKey::Sequence => "_rev",
        }
    }
}

/// What an expression reads from a document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "name")]
pub enum Accessor {
    /// Document property, dot-separated path
    Property(String),
    /// Engine metadata
    Meta(MetaKey),
    /// Element variable bound by an enclosing array quantifier
    Variable(String),
}

impl Accessor {
    /// Accessor for a selector field path; `_id` and `_rev` map to metadata
    pub fn field(path: &str) -> Self {
        match MetaKey::from_field(path) {
            Some(meta) => Accessor::Meta(meta),
            None => Accessor::Property(path.to_string()),
        }
    }

    /// Accessor for a bound variable
    pub fn variable(name: impl Into<String>) -> Self {
        Accessor::Variable(name.into())
    }
}

impl fmt::Display for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Property(path) => write!(f, ".{}", path),
            Accessor::Meta(MetaKey::Id) => write!(f, "META().id"),
            Accessor::Meta(MetaKey::Sequence) => write!(f, "META().sequence"),
            Accessor::Variable(name) => write!(f, "${}", name),
        }
    }
}

/// Binary comparison operators
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl ComparisonOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Lte => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Gte => ">=",
        }
    }
}

/// Logical connectives
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogicalKind {
    And,
    Or,
    Not,
}

/// Array quantifiers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuantifierKind {
    /// Every element satisfies the predicate
    All,
    /// At least one element satisfies the predicate
    Any,
}

/// Compiled predicate tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "args")]
pub enum Expression {
    /// field <op> literal
    Comparison {
        field: Accessor,
        op: ComparisonOp,
        value: Value,
    },

    /// field IN (literals), or NOT IN when negated
    Membership {
        field: Accessor,
        values: Vec<Value>,
        negated: bool,
    },

    /// field is present and non-null (or absent-or-null when `must_exist` is false)
    Existence { field: Accessor, must_exist: bool },

    /// AND / OR over children, NOT over a single child
    Logical {
        kind: LogicalKind,
        children: Vec<Expression>,
    },

    /// ANY / EVERY `variable` IN field SATISFIES predicate
    ArrayQuantifier {
        kind: QuantifierKind,
        field: Accessor,
        variable: String,
        predicate: Box<Expression>,
    },

    /// field % divisor = remainder
    Modulo {
        field: Accessor,
        divisor: f64,
        remainder: f64,
    },

    /// field matches pattern
    Regex {
        field: Accessor,
        pattern: String,
        options: Option<String>,
    },

    /// ARRAY_LENGTH(field) = length
    Size { field: Accessor, length: u64 },
}

impl Expression {
    /// Create a comparison
    pub fn compare(field: Accessor, op: ComparisonOp, value: impl Into<Value>) -> Self {
        Self::Comparison {
            field,
            op,
            value: value.into(),
        }
    }

    /// Create an equality comparison
    pub fn eq(field: Accessor, value: impl Into<Value>) -> Self {
        Self::compare(field, ComparisonOp::Eq, value)
    }

    /// Create a membership test
    pub fn in_values(field: Accessor, values: Vec<Value>) -> Self {
        Self::Membership {
            field,
            values,
            negated: false,
        }
    }

    /// Create a negated membership test
    pub fn not_in_values(field: Accessor, values: Vec<Value>) -> Self {
        Self::Membership {
            field,
            values,
            negated: true,
        }
    }

    /// Create an existence check
    pub fn exists(field: Accessor, must_exist: bool) -> Self {
        Self::Existence { field, must_exist }
    }

    /// Conjoin `other` onto this expression (left-deep binary AND)
    pub fn and(self, other: Expression) -> Self {
        Self::Logical {
            kind: LogicalKind::And,
            children: vec![self, other],
        }
    }

    /// Disjoin `other` onto this expression (left-deep binary OR)
    pub fn or(self, other: Expression) -> Self {
        Self::Logical {
            kind: LogicalKind::Or,
            children: vec![self, other],
        }
    }

    /// Negate this expression
    pub fn negated(self) -> Self {
        Self::Logical {
            kind: LogicalKind::Not,
            children: vec![self],
        }
    }

    /// Create an array quantifier
    pub fn quantify(
        kind: QuantifierKind,
        field: Accessor,
        variable: impl Into<String>,
        predicate: Expression,
    ) -> Self {
        Self::ArrayQuantifier {
            kind,
            field,
            variable: variable.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Get all property paths referenced in this expression
    pub fn fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        self.collect_fields(&mut fields);
        fields.sort();
        fields.dedup();
        fields
    }

    fn collect_fields(&self, fields: &mut Vec<String>) {
        match self {
            Expression::Comparison { field, .. }
            | Expression::Membership { field, .. }
            | Expression::Existence { field, .. }
            | Expression::Modulo { field, .. }
            | Expression::Regex { field, .. }
            | Expression::Size { field, .. } => {
                if let Accessor::Property(path) = field {
                    fields.push(path.clone());
                }
            }
            Expression::Logical { children, .. } => {
                for child in children {
                    child.collect_fields(fields);
                }
            }
            Expression::ArrayQuantifier {
                field, predicate, ..
            } => {
                if let Accessor::Property(path) = field {
                    fields.push(path.clone());
                }
                predicate.collect_fields(fields);
            }
        }
    }

    /// Names bound by array quantifiers anywhere in this expression, in tree order
    pub fn bound_variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_bound(&mut names);
        names
    }

    fn collect_bound<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Logical { children, .. } => {
                for child in children {
                    child.collect_bound(names);
                }
            }
            Expression::ArrayQuantifier {
                variable,
                predicate,
                ..
            } => {
                names.push(variable.as_str());
                predicate.collect_bound(names);
            }
            _ => {}
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    write!(f, "(")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", value)?;
    }
    write!(f, ")")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Comparison { field, op, value } => {
                write!(f, "{} {} {}", field, op.symbol(), value)
            }
            Expression::Membership {
                field,
                values,
                negated,
            } => {
                if *negated {
                    write!(f, "NOT ")?;
                }
                write!(f, "{} IN ", field)?;
                write_list(f, values)
            }
            Expression::Existence { field, must_exist } => {
                if *must_exist {
                    write!(f, "{} IS VALUED", field)
                } else {
                    write!(f, "{} IS NOT VALUED", field)
                }
            }
            Expression::Logical { kind, children } => match kind {
                LogicalKind::Not => match children.first() {
                    Some(child) => write!(f, "NOT ({})", child),
                    None => write!(f, "NOT ()"),
                },
                LogicalKind::And | LogicalKind::Or => {
                    let joiner = if *kind == LogicalKind::And { " AND " } else { " OR " };
                    for (i, child) in children.iter().enumerate() {
                        if i > 0 {
                            write!(f, "{}", joiner)?;
                        }
                        write!(f, "({})", child)?;
                    }
                    Ok(())
                }
            },
            Expression::ArrayQuantifier {
                kind,
                field,
                variable,
                predicate,
            } => {
                let keyword = match kind {
                    QuantifierKind::All => "EVERY",
                    QuantifierKind::Any => "ANY",
                };
                write!(
                    f,
                    "{} ${} IN {} SATISFIES {} END",
                    keyword, variable, field, predicate
                )
            }
            Expression::Modulo {
                field,
                divisor,
                remainder,
            } => write!(f, "{} % {} = {}", field, divisor, remainder),
            Expression::Regex {
                field,
                pattern,
                options,
            } => match options {
                Some(opts) => write!(f, "REGEXP_LIKE({}, {:?}, {:?})", field, pattern, opts),
                None => write!(f, "REGEXP_LIKE({}, {:?})", field, pattern),
            },
            Expression::Size { field, length } => {
                write!(f, "ARRAY_LENGTH({}) = {}", field, length)
            }
        }
    }
}
