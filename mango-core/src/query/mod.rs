//! Selector compiler
//!
//! This module provides Mango selector parsing and compilation into
//! engine-agnostic expression trees and projections

pub mod ast;
pub mod error;
pub mod parser;
pub mod projection;
pub mod request;

pub use ast::{Accessor, ComparisonOp, Expression, LogicalKind, MetaKey, QuantifierKind};
pub use error::CompileError;
pub use parser::{compile_field, CompileOptions, SelectorParser};
pub use projection::{compile_projection, ProjectionSpec, ResultColumn};
pub use request::{compile, compile_request, DataSource, QueryCompiler, QueryRequest};
