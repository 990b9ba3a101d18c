//! Mango Core - Selector compilation for document queries
//!
//! This crate provides:
//! - Mango selector parsing into engine-agnostic expression trees
//! - Projection compilation with metadata accessors
//! - A query engine interface and an in-memory reference engine
//! - Configuration and logging setup

pub mod config;
pub mod document;
pub mod engine;
pub mod logging;
pub mod query;

pub use config::*;
pub use document::*;
pub use engine::*;
pub use logging::*;
pub use query::*;
