use super::read_input;
use anyhow::{Context, Result};
use mango_core::{DataSource, MangoConfig, MemoryEngine, QueryCompiler, QueryEngine};
use serde_json::Value as JsonValue;
use std::path::Path;
use tracing::info;

fn compiler(config: &MangoConfig) -> QueryCompiler {
    QueryCompiler::new(config.compiler)
}

pub fn execute_compile(
    config: &MangoConfig,
    source: &DataSource,
    request: &Path,
    explain_only: bool,
) -> Result<String> {
    let text = read_input(request)?;
    let compiled = compiler(config)
        .compile_str(&text, source.clone())
        .with_context(|| format!("Failed to compile {}", request.display()))?;

    let mut output = compiled.explain();
    output.push('\n');

    if !explain_only {
        let json = serde_json::to_string_pretty(&compiled)
            .context("Failed to serialize compiled request")?;
        output.push_str(&json);
        output.push('\n');
    }

    Ok(output)
}

pub fn execute_query(
    config: &MangoConfig,
    source: &DataSource,
    request: &Path,
    documents: &Path,
) -> Result<String> {
    let text = read_input(request)?;
    let compiled = compiler(config)
        .compile_str(&text, source.clone())
        .with_context(|| format!("Failed to compile {}", request.display()))?;

    let docs: JsonValue = serde_json::from_str(&read_input(documents)?)
        .with_context(|| format!("Failed to parse {}", documents.display()))?;

    let engine = MemoryEngine::new();
    let loaded = engine
        .load_json(source, &docs)
        .with_context(|| format!("Failed to load documents from {}", documents.display()))?;

    let rows = engine.execute(&compiled)?;
    info!(documents = loaded, rows = rows.len(), "query complete");

    let mut output = String::new();
    for row in &rows {
        output.push_str(&serde_json::to_string(&row.to_json())?);
        output.push('\n');
    }
    Ok(output)
}
