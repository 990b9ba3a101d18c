//! In-memory query engine
//!
//! Evaluates compiled expressions by scanning every document of a data
//! source, then applies the projection.

use super::{EngineError, QueryEngine, Row};
use crate::document::{Document, DocumentError, Value};
use crate::query::ast::{Accessor, ComparisonOp, Expression, LogicalKind, MetaKey, QuantifierKind};
use crate::query::parser::compile_pattern;
use crate::query::{DataSource, ProjectionSpec, QueryRequest, ResultColumn};
use dashmap::DashMap;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Collections of documents keyed by data source name
pub struct MemoryEngine {
    collections: DashMap<String, Vec<Document>>,
    sequence: AtomicU64,
}

impl MemoryEngine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }

    /// Create an empty data source
    pub fn create_source(&self, source: &DataSource) {
        self.collections.entry(source.name.clone()).or_default();
    }

    /// Store a document, replacing any document with the same ID.
    ///
    /// A document without a sequence is assigned the next one. The stored
    /// sequence is returned.
    pub fn save(&self, source: &DataSource, mut doc: Document) -> u64 {
        let sequence = if doc.sequence > 0 {
            self.sequence.fetch_max(doc.sequence, Ordering::SeqCst);
            doc.sequence
        } else {
            self.sequence.fetch_add(1, Ordering::SeqCst) + 1
        };
        doc.sequence = sequence;

        let mut docs = self.collections.entry(source.name.clone()).or_default();
        match docs.iter_mut().find(|existing| existing.id == doc.id) {
            Some(existing) => *existing = doc,
            None => docs.push(doc),
        }
        sequence
    }

    /// Store several documents in order
    pub fn save_all(&self, source: &DataSource, docs: impl IntoIterator<Item = Document>) {
        for doc in docs {
            self.save(source, doc);
        }
    }

    /// Load a JSON array of documents, returning how many were stored
    pub fn load_json(&self, source: &DataSource, json: &JsonValue) -> Result<usize, DocumentError> {
        let items = json.as_array().ok_or(DocumentError::NotAnArray)?;
        let docs = items
            .iter()
            .map(Document::from_json)
            .collect::<Result<Vec<_>, _>>()?;

        let count = docs.len();
        self.create_source(source);
        self.save_all(source, docs);
        debug!(source = %source, count, "loaded documents");
        Ok(count)
    }

    /// Number of documents in a data source
    pub fn count(&self, source: &DataSource) -> usize {
        self.collections
            .get(&source.name)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Check whether a document matches an expression
    pub fn matches(doc: &Document, expr: &Expression) -> Result<bool, EngineError> {
        let regexes = prepare_regexes(expr)?;
        Evaluator::new(doc, &regexes).matches(expr)
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine for MemoryEngine {
    fn execute(&self, request: &QueryRequest) -> Result<Vec<Row>, EngineError> {
        let docs = self
            .collections
            .get(&request.source.name)
            .ok_or_else(|| EngineError::UnknownSource(request.source.name.clone()))?;

        let regexes = prepare_regexes(&request.expression)?;

        let mut rows = Vec::new();
        for doc in docs.iter() {
            if Evaluator::new(doc, &regexes).matches(&request.expression)? {
                rows.push(project(doc, &request.projection));
            }
        }

        debug!(
            source = %request.source,
            scanned = docs.len(),
            matched = rows.len(),
            "executed query"
        );

        Ok(rows)
    }
}

type RegexCache<'q> = HashMap<(&'q str, Option<&'q str>), Regex>;

/// Compile every `$regex` pattern in the tree once per execution
fn prepare_regexes(expr: &Expression) -> Result<RegexCache<'_>, EngineError> {
    let mut cache = HashMap::new();
    collect_regexes(expr, &mut cache)?;
    Ok(cache)
}

fn collect_regexes<'q>(expr: &'q Expression, cache: &mut RegexCache<'q>) -> Result<(), EngineError> {
    match expr {
        Expression::Regex {
            pattern, options, ..
        } => {
            let key = (pattern.as_str(), options.as_deref());
            if !cache.contains_key(&key) {
                let regex = compile_pattern(pattern, options.as_deref())
                    .map_err(|e| EngineError::InvalidRegex(e.to_string()))?;
                cache.insert(key, regex);
            }
        }
        Expression::Logical { children, .. } => {
            for child in children {
                collect_regexes(child, cache)?;
            }
        }
        Expression::ArrayQuantifier { predicate, .. } => collect_regexes(predicate, cache)?,
        _ => {}
    }
    Ok(())
}

/// Per-document evaluation state: quantifier bindings in scope
struct Evaluator<'q, 'd> {
    doc: &'d Document,
    regexes: &'q RegexCache<'q>,
    bindings: Vec<(&'q str, &'d Value)>,
}

impl<'q, 'd> Evaluator<'q, 'd> {
    fn new(doc: &'d Document, regexes: &'q RegexCache<'q>) -> Self {
        Self {
            doc,
            regexes,
            bindings: Vec::new(),
        }
    }

    fn resolve(&self, accessor: &Accessor) -> Result<Option<Cow<'d, Value>>, EngineError> {
        match accessor {
            Accessor::Property(path) => Ok(self.doc.get_by_path(path).map(Cow::Borrowed)),
            Accessor::Meta(MetaKey::Id) => Ok(Some(Cow::Owned(Value::String(self.doc.id.clone())))),
            Accessor::Meta(MetaKey::Sequence) => {
                Ok(Some(Cow::Owned(Value::Int(self.doc.sequence as i64))))
            }
            Accessor::Variable(name) => self
                .bindings
                .iter()
                .rev()
                .find(|(bound, _)| *bound == name.as_str())
                .map(|(_, value)| Some(Cow::Borrowed(*value)))
                .ok_or_else(|| EngineError::UnboundVariable(name.clone())),
        }
    }

    fn matches(&mut self, expr: &'q Expression) -> Result<bool, EngineError> {
        match expr {
            Expression::Comparison { field, op, value } => {
                let actual = self.resolve(field)?;
                Ok(actual.map_or(false, |actual| compare(&actual, *op, value)))
            }

            Expression::Membership {
                field,
                values,
                negated,
            } => {
                let found = self
                    .resolve(field)?
                    .map_or(false, |actual| is_member(&actual, values));
                Ok(found != *negated)
            }

            Expression::Existence { field, must_exist } => {
                let valued = self
                    .resolve(field)?
                    .map_or(false, |actual| !actual.is_null());
                Ok(valued == *must_exist)
            }

            Expression::Logical { kind, children } => match kind {
                LogicalKind::And => {
                    for child in children {
                        if !self.matches(child)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                LogicalKind::Or => {
                    for child in children {
                        if self.matches(child)? {
                            return Ok(true);
                        }
                    }
                    Ok(false)
                }
                LogicalKind::Not => match children.first() {
                    Some(child) => Ok(!self.matches(child)?),
                    None => Ok(true),
                },
            },

            Expression::ArrayQuantifier {
                kind,
                field,
                variable,
                predicate,
            } => {
                let items: &'d [Value] = match self.resolve(field)? {
                    Some(Cow::Borrowed(Value::Array(items))) => items,
                    _ => return Ok(false),
                };
                if items.is_empty() {
                    return Ok(false);
                }

                for item in items {
                    self.bindings.push((variable.as_str(), item));
                    let satisfied = self.matches(predicate);
                    self.bindings.pop();

                    match (kind, satisfied?) {
                        (QuantifierKind::Any, true) => return Ok(true),
                        (QuantifierKind::All, false) => return Ok(false),
                        _ => {}
                    }
                }
                Ok(*kind == QuantifierKind::All)
            }

            Expression::Modulo {
                field,
                divisor,
                remainder,
            } => {
                let actual = self.resolve(field)?;
                Ok(actual
                    .and_then(|v| v.as_f64())
                    .map_or(false, |n| n % divisor == *remainder))
            }

            Expression::Regex {
                field,
                pattern,
                options,
            } => {
                let regex = self
                    .regexes
                    .get(&(pattern.as_str(), options.as_deref()))
                    .ok_or_else(|| EngineError::InvalidRegex(pattern.clone()))?;
                let actual = self.resolve(field)?;
                Ok(actual
                    .as_deref()
                    .and_then(Value::as_str)
                    .map_or(false, |s| regex.is_match(s)))
            }

            Expression::Size { field, length } => {
                let actual = self.resolve(field)?;
                Ok(actual
                    .as_deref()
                    .and_then(Value::as_array)
                    .map_or(false, |items| items.len() as u64 == *length))
            }
        }
    }
}

/// Comparison against a present value; null only equals null
fn compare(actual: &Value, op: ComparisonOp, expected: &Value) -> bool {
    if actual.is_null() || expected.is_null() {
        let both = actual.is_null() && expected.is_null();
        return match op {
            ComparisonOp::Eq => both,
            ComparisonOp::Ne => !both,
            _ => false,
        };
    }

    let cmp = actual.collate(expected);
    match op {
        ComparisonOp::Eq => cmp == CmpOrdering::Equal,
        ComparisonOp::Ne => cmp != CmpOrdering::Equal,
        ComparisonOp::Lt => cmp == CmpOrdering::Less,
        ComparisonOp::Lte => cmp != CmpOrdering::Greater,
        ComparisonOp::Gt => cmp == CmpOrdering::Greater,
        ComparisonOp::Gte => cmp != CmpOrdering::Less,
    }
}

/// The whole value, or any element of an array value, is listed
fn is_member(actual: &Value, values: &[Value]) -> bool {
    let listed = |candidate: &Value| values.iter().any(|v| v.collates_equal(candidate));
    match actual {
        Value::Array(items) => listed(actual) || items.iter().any(listed),
        _ => listed(actual),
    }
}

fn project(doc: &Document, projection: &ProjectionSpec) -> Row {
    let mut row = Row::new();
    for column in &projection.columns {
        match column {
            ResultColumn::All => {
                for (key, value) in &doc.fields {
                    row.push(key.clone(), value.clone());
                }
            }
            ResultColumn::Column { accessor, .. } => {
                let value = match accessor {
                    Accessor::Property(path) => doc.get_by_path(path).cloned(),
                    Accessor::Meta(MetaKey::Id) => Some(Value::String(doc.id.clone())),
                    Accessor::Meta(MetaKey::Sequence) => Some(Value::Int(doc.sequence as i64)),
                    // Variables are only bound inside quantifier predicates
                    Accessor::Variable(_) => None,
                };
                if let (Some(value), Some(name)) = (value, column.output_name()) {
                    row.push(name, value);
                }
            }
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compile_request;

    fn source() -> DataSource {
        DataSource::new("players")
    }

    fn create_test_engine() -> MemoryEngine {
        let engine = MemoryEngine::new();
        for i in 0..10i64 {
            let mut doc = Document::with_id(format!("user{}", i))
                .field("name", format!("User{}", i))
                .field("age", 20 + i)
                .field("active", i % 2 == 0);
            if i < 3 {
                doc.insert(
                    "tags".to_string(),
                    Value::Array(vec![Value::from("a"), Value::Int(i)]),
                );
            }
            engine.save(&source(), doc);
        }
        engine
    }

    fn run(engine: &MemoryEngine, request: &str) -> Vec<Row> {
        let request = compile_request(request, source()).unwrap();
        engine.execute(&request).unwrap()
    }

    #[test]
    fn test_eq_selector() {
        let engine = create_test_engine();
        let rows = run(&engine, r#"{"selector": {"name": "User5"}, "fields": ["_id", "name"]}"#);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("_id"), Some("user5"));
        assert_eq!(rows[0].get_str("name"), Some("User5"));
    }

    #[test]
    fn test_gt_selector() {
        let engine = create_test_engine();
        let rows = run(&engine, r#"{"selector": {"age": {"$gt": 25}}}"#);
        assert_eq!(rows.len(), 4); // ages 26, 27, 28, 29
    }

    #[test]
    fn test_and_or_not_selectors() {
        let engine = create_test_engine();
        let rows = run(
            &engine,
            r#"{"selector": {"age": {"$gt": 23}, "active": true}}"#,
        );
        assert_eq!(rows.len(), 3); // 24, 26, 28

        let rows = run(
            &engine,
            r#"{"selector": {"$or": [{"name": "User1"}, {"name": "User2"}]}}"#,
        );
        assert_eq!(rows.len(), 2);

        let rows = run(&engine, r#"{"selector": {"$not": {"active": true}}}"#);
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_missing_field_never_compares() {
        let engine = create_test_engine();
        assert_eq!(run(&engine, r#"{"selector": {"email": {"$ne": "x"}}}"#).len(), 0);
        assert_eq!(run(&engine, r#"{"selector": {"email": {"$lt": "x"}}}"#).len(), 0);
        assert_eq!(run(&engine, r#"{"selector": {"email": {"$exists": false}}}"#).len(), 10);
        assert_eq!(run(&engine, r#"{"selector": {"email": {"$nin": ["x"]}}}"#).len(), 10);
    }

    #[test]
    fn test_null_field_semantics() {
        let engine = MemoryEngine::new();
        engine.save(&source(), Document::with_id("a").field("v", Value::Null));
        engine.save(&source(), Document::with_id("b").field("v", 3i64));
        engine.save(&source(), Document::with_id("c"));

        assert_eq!(run(&engine, r#"{"selector": {"v": null}}"#).len(), 1);
        assert_eq!(run(&engine, r#"{"selector": {"v": {"$exists": true}}}"#).len(), 1);
        assert_eq!(run(&engine, r#"{"selector": {"v": {"$exists": false}}}"#).len(), 2);
        assert_eq!(run(&engine, r#"{"selector": {"v": {"$ne": null}}}"#).len(), 1);
        assert_eq!(run(&engine, r#"{"selector": {"v": {"$lt": 10}}}"#).len(), 1);
    }

    #[test]
    fn test_membership_against_array_field() {
        let engine = create_test_engine();
        let rows = run(&engine, r#"{"selector": {"tags": {"$in": ["a"]}}}"#);
        assert_eq!(rows.len(), 3);

        let rows = run(&engine, r#"{"selector": {"tags": {"$in": [2]}}}"#);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_quantifiers() {
        let engine = MemoryEngine::new();
        engine.save(&source(), Document::with_id("both").field("f", vec![Value::from("x"), Value::from("y")]));
        engine.save(&source(), Document::with_id("x").field("f", vec![Value::from("x")]));
        engine.save(&source(), Document::with_id("z").field("f", vec![Value::from("z")]));
        engine.save(&source(), Document::with_id("empty").field("f", Vec::<Value>::new()));
        engine.save(&source(), Document::with_id("scalar").field("f", "x"));

        let ids = |rows: Vec<Row>| -> Vec<String> {
            rows.iter()
                .filter_map(|r| r.get_str("_id").map(String::from))
                .collect()
        };

        let every = run(&engine, r#"{"selector": {"f": {"$all": ["x", "y"]}}, "fields": ["_id"]}"#);
        assert_eq!(ids(every), vec!["both", "x"]);

        let any = run(&engine, r#"{"selector": {"f": {"$elemMatch": ["y", "z"]}}, "fields": ["_id"]}"#);
        assert_eq!(ids(any), vec!["both", "z"]);
    }

    #[test]
    fn test_modulo_regex_size() {
        let engine = create_test_engine();
        assert_eq!(run(&engine, r#"{"selector": {"age": {"$mod": 5}}}"#).len(), 2); // 20, 25
        assert_eq!(run(&engine, r#"{"selector": {"age": {"$mod": [4, 1]}}}"#).len(), 3); // 21, 25, 29
        assert_eq!(run(&engine, r#"{"selector": {"name": {"$regex": "^User[0-4]$"}}}"#).len(), 5);
        assert_eq!(
            run(&engine, r#"{"selector": {"name": {"$regex": "^user1", "$options": "i"}}}"#).len(),
            1
        );
        assert_eq!(run(&engine, r#"{"selector": {"tags": {"$size": 2}}}"#).len(), 3);
        assert_eq!(run(&engine, r#"{"selector": {"age": {"$size": 2}}}"#).len(), 0);
    }

    #[test]
    fn test_sequence_accessor() {
        let engine = create_test_engine();
        let rows = run(&engine, r#"{"selector": {"_rev": {"$lte": 2}}, "fields": ["_id", "_rev"]}"#);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("_rev"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_save_replaces_by_id() {
        let engine = MemoryEngine::new();
        let first = engine.save(&source(), Document::with_id("a").field("v", 1i64));
        let second = engine.save(&source(), Document::with_id("a").field("v", 2i64));
        assert!(second > first);
        assert_eq!(engine.count(&source()), 1);

        let rows = run(&engine, r#"{"selector": {"_id": "a"}, "fields": ["v", "_rev"]}"#);
        assert_eq!(rows[0].get("v"), Some(&Value::Int(2)));
        assert_eq!(rows[0].get("_rev"), Some(&Value::Int(second as i64)));
    }

    #[test]
    fn test_projection_shapes() {
        let engine = create_test_engine();
        let all = run(&engine, r#"{"selector": {"_id": "user0"}}"#);
        assert_eq!(all[0].len(), 4); // active, age, name, tags

        let none = run(&engine, r#"{"selector": {"_id": "user0"}, "fields": []}"#);
        assert_eq!(none.len(), 1);
        assert!(none[0].is_empty());

        let sparse = run(&engine, r#"{"selector": {"_id": "user9"}, "fields": ["tags", "name"]}"#);
        assert_eq!(sparse[0].len(), 1);
    }

    #[test]
    fn test_load_json_keeps_revisions() {
        let engine = MemoryEngine::new();
        let docs = serde_json::json!([
            {"_id": "a", "_rev": "7-abc", "v": 1},
            {"_id": "b", "v": 2}
        ]);
        assert_eq!(engine.load_json(&source(), &docs).unwrap(), 2);

        let rows = run(&engine, r#"{"selector": {"_id": {"$gt": null}}, "fields": ["_id", "_rev"]}"#);
        assert_eq!(rows[0].get("_rev"), Some(&Value::Int(7)));
        assert_eq!(rows[1].get("_rev"), Some(&Value::Int(8)));

        assert!(engine.load_json(&source(), &serde_json::json!([{"v": 1}])).is_err());
        assert!(engine.load_json(&source(), &serde_json::json!({"_id": "a"})).is_err());
    }

    #[test]
    fn test_unknown_source() {
        let engine = MemoryEngine::new();
        let request = compile_request(r#"{"selector": {"a": 1}}"#, source()).unwrap();
        assert!(matches!(
            engine.execute(&request),
            Err(EngineError::UnknownSource(_))
        ));

        engine.create_source(&source());
        assert!(engine.execute(&request).unwrap().is_empty());
    }

    #[test]
    fn test_unbound_variable_is_an_error() {
        let doc = Document::with_id("a");
        let expr = Expression::in_values(Accessor::variable("__all_x__"), vec![Value::Int(1)]);
        assert!(matches!(
            MemoryEngine::matches(&doc, &expr),
            Err(EngineError::UnboundVariable(_))
        ));
    }
}
