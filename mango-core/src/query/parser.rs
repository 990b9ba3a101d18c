//! Selector parser for converting JSON selectors to expression trees
//!
//! Walks a Mango selector document, classifies each key as a combinator or a
//! field clause, and compiles field clauses operator by operator.

use super::ast::{Accessor, ComparisonOp, Expression, QuantifierKind};
use super::error::CompileError;
use crate::document::Value;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

/// Default bound on combinator nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Modifier key read alongside `$regex`
const OPTIONS_KEY: &str = "$options";

/// Recognized field-clause operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Eq,
    Lt,
    Lte,
    Ne,
    Gte,
    Gt,
    In,
    Nin,
    Exists,
    Mod,
    Regex,
    All,
    ElemMatch,
    Type,
    Size,
}

const OPERATORS: &[(&str, Operator)] = &[
    ("$eq", Operator::Eq),
    ("$lt", Operator::Lt),
    ("$lte", Operator::Lte),
    ("$ne", Operator::Ne),
    ("$gte", Operator::Gte),
    ("$gt", Operator::Gt),
    ("$in", Operator::In),
    ("$nin", Operator::Nin),
    ("$exists", Operator::Exists),
    ("$mod", Operator::Mod),
    ("$regex", Operator::Regex),
    ("$all", Operator::All),
    ("$elemMatch", Operator::ElemMatch),
    ("$type", Operator::Type),
    ("$size", Operator::Size),
];

impl Operator {
    fn from_token(token: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, op)| *op)
    }
}

/// Options applied to every compilation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompileOptions {
    /// Maximum tree depth before the selector is rejected. Combinators and
    /// each additional chained key or list element count one level.
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Selector parser
///
/// Holds only immutable options; one instance may compile any number of
/// selectors from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorParser {
    options: CompileOptions,
}

impl SelectorParser {
    /// Create a parser with custom options
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Compile a selector document into an expression tree
    pub fn parse(&self, selector: &JsonValue) -> Result<Expression, CompileError> {
        let doc = selector
            .as_object()
            .ok_or_else(|| CompileError::malformed("selector must be an object"))?;
        self.parse_document(doc, 0)
    }

    fn check_depth(&self, depth: usize) -> Result<(), CompileError> {
        if depth > self.options.max_depth {
            return Err(CompileError::malformed(format!(
                "selector nesting exceeds {} levels",
                self.options.max_depth
            )));
        }
        Ok(())
    }

    /// Compile each key of `doc` and conjoin them in iteration order
    fn parse_document(
        &self,
        doc: &Map<String, JsonValue>,
        depth: usize,
    ) -> Result<Expression, CompileError> {
        // n keys fold into n - 1 left-deep `And` nodes
        let depth = depth + doc.len().saturating_sub(1);
        self.check_depth(depth)?;

        let mut clauses = doc.iter();
        let (first_key, first_value) = clauses
            .next()
            .ok_or_else(|| CompileError::malformed("selector must contain at least one clause"))?;

        let mut out = self.parse_clause(first_key, first_value, depth)?;
        for (key, value) in clauses {
            out = out.and(self.parse_clause(key, value, depth)?);
        }
        Ok(out)
    }

    /// Dispatch a single key/value pair
    fn parse_clause(
        &self,
        key: &str,
        value: &JsonValue,
        depth: usize,
    ) -> Result<Expression, CompileError> {
        match key {
            "$and" => {
                let mut parts = self.parse_selector_list(key, value, depth)?.into_iter();
                let first = parts.next().ok_or_else(|| empty_list(key))?;
                Ok(parts.fold(first, Expression::and))
            }
            "$or" => self.parse_disjunction(key, value, depth),
            "$nor" => Ok(self.parse_disjunction(key, value, depth)?.negated()),
            "$not" => {
                let doc = value.as_object().ok_or_else(|| {
                    CompileError::malformed("$not must be an object")
                })?;
                Ok(self.parse_document(doc, depth + 1)?.negated())
            }
            _ if key.starts_with('$') => Err(CompileError::malformed(format!(
                "unknown combinator {}",
                key
            ))),
            _ => compile_field(key, value),
        }
    }

    fn parse_disjunction(
        &self,
        key: &str,
        value: &JsonValue,
        depth: usize,
    ) -> Result<Expression, CompileError> {
        let mut parts = self.parse_selector_list(key, value, depth)?.into_iter();
        let first = parts.next().ok_or_else(|| empty_list(key))?;
        Ok(parts.fold(first, Expression::or))
    }

    /// Parse the array operand of `$and` / `$or` / `$nor`
    fn parse_selector_list(
        &self,
        key: &str,
        value: &JsonValue,
        depth: usize,
    ) -> Result<Vec<Expression>, CompileError> {
        let arr = value
            .as_array()
            .ok_or_else(|| CompileError::malformed(format!("{} must be an array", key)))?;

        if arr.is_empty() {
            return Err(empty_list(key));
        }

        let depth = depth + arr.len() - 1;
        self.check_depth(depth)?;

        arr.iter()
            .map(|item| {
                let doc = item.as_object().ok_or_else(|| {
                    CompileError::malformed(format!("{} elements must be objects", key))
                })?;
                self.parse_document(doc, depth + 1)
            })
            .collect()
    }
}

fn empty_list(key: &str) -> CompileError {
    CompileError::malformed(format!("{} requires at least one selector", key))
}

/// Compile one field clause.
///
/// A non-object value is implicit equality. In an operand object the first
/// recognized operator decides the clause and every other key is ignored,
/// except that `$type` anywhere in the object is rejected.
pub fn compile_field(field: &str, value: &JsonValue) -> Result<Expression, CompileError> {
    let operands = match value {
        JsonValue::Object(obj) => obj,
        _ => {
            trace!(field, "implicit equality");
            return Ok(Expression::eq(Accessor::field(field), Value::from_json(value)));
        }
    };

    if operands.contains_key("$type") {
        return Err(CompileError::UnsupportedOperator("$type".to_string()));
    }

    let recognized = operands
        .iter()
        .find_map(|(token, operand)| Operator::from_token(token).map(|op| (token, op, operand)));

    if let Some((token, op, operand)) = recognized {
        debug!(field, operator = %token, "compiling field clause");
        return compile_operator(field, token, op, operand, operands);
    }

    if let Some(token) = operands.keys().find(|k| k.starts_with('$')) {
        return Err(CompileError::UnsupportedOperator(token.clone()));
    }

    // No operator keys at all: the object is itself the literal
    Ok(Expression::eq(Accessor::field(field), Value::from_json(value)))
}

fn compile_operator(
    field: &str,
    token: &str,
    op: Operator,
    operand: &JsonValue,
    operands: &Map<String, JsonValue>,
) -> Result<Expression, CompileError> {
    let accessor = Accessor::field(field);

    let expr = match op {
        Operator::Eq => Expression::eq(accessor, Value::from_json(operand)),
        Operator::Lt => Expression::compare(accessor, ComparisonOp::Lt, Value::from_json(operand)),
        Operator::Lte => {
            Expression::compare(accessor, ComparisonOp::Lte, Value::from_json(operand))
        }
        Operator::Gte => {
            Expression::compare(accessor, ComparisonOp::Gte, Value::from_json(operand))
        }
        Operator::Ne => {
            if operand.is_null() {
                Expression::exists(accessor, true)
            } else {
                Expression::compare(accessor, ComparisonOp::Ne, Value::from_json(operand))
            }
        }
        Operator::Gt => {
            if operand.is_null() {
                Expression::exists(accessor, true)
            } else {
                Expression::compare(accessor, ComparisonOp::Gt, Value::from_json(operand))
            }
        }
        Operator::In => Expression::in_values(accessor, literal_list(token, operand)?),
        Operator::Nin => Expression::not_in_values(accessor, literal_list(token, operand)?),
        Operator::Exists => {
            let must_exist = operand
                .as_bool()
                .ok_or_else(|| CompileError::operand(token, "a boolean"))?;
            Expression::exists(accessor, must_exist)
        }
        Operator::Mod => {
            let (divisor, remainder) = modulo_operand(token, operand)?;
            Expression::Modulo {
                field: accessor,
                divisor,
                remainder,
            }
        }
        Operator::Regex => {
            let pattern = operand
                .as_str()
                .ok_or_else(|| CompileError::operand(token, "a string"))?;
            let options = match operands.get(OPTIONS_KEY) {
                None => None,
                Some(opts) => Some(
                    opts.as_str()
                        .ok_or_else(|| CompileError::operand(OPTIONS_KEY, "a string"))?
                        .to_string(),
                ),
            };
            compile_pattern(pattern, options.as_deref())
                .map_err(|e| CompileError::operand(token, format!("a valid pattern ({})", e)))?;
            Expression::Regex {
                field: accessor,
                pattern: pattern.to_string(),
                options,
            }
        }
        Operator::Size => Expression::Size {
            field: accessor,
            length: size_operand(token, operand)?,
        },
        Operator::All => quantifier(QuantifierKind::All, field, literal_list(token, operand)?),
        Operator::ElemMatch => {
            quantifier(QuantifierKind::Any, field, literal_list(token, operand)?)
        }
        Operator::Type => return Err(CompileError::UnsupportedOperator(token.to_string())),
    };

    Ok(expr)
}

fn literal_list(token: &str, operand: &JsonValue) -> Result<Vec<Value>, CompileError> {
    let arr = operand
        .as_array()
        .ok_or_else(|| CompileError::operand(token, "an array"))?;
    Ok(arr.iter().map(Value::from_json).collect())
}

fn modulo_operand(token: &str, operand: &JsonValue) -> Result<(f64, f64), CompileError> {
    let expected = "a number or [divisor, remainder]";
    let (divisor, remainder) = match operand {
        JsonValue::Number(n) => (n.as_f64(), Some(0.0)),
        JsonValue::Array(arr) if arr.len() == 2 => (arr[0].as_f64(), arr[1].as_f64()),
        _ => return Err(CompileError::operand(token, expected)),
    };

    match (divisor, remainder) {
        (Some(d), _) if d == 0.0 => Err(CompileError::operand(token, "a non-zero divisor")),
        (Some(d), Some(r)) => Ok((d, r)),
        _ => Err(CompileError::operand(token, expected)),
    }
}

fn size_operand(token: &str, operand: &JsonValue) -> Result<u64, CompileError> {
    if let Some(n) = operand.as_u64() {
        return Ok(n);
    }
    match operand.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(CompileError::operand(token, "a non-negative integer")),
    }
}

/// Wrap `literals` in an array quantifier over `field`
fn quantifier(kind: QuantifierKind, field: &str, literals: Vec<Value>) -> Expression {
    let variable = bound_name(kind, field);
    let predicate = Expression::in_values(Accessor::variable(variable.clone()), literals);
    Expression::quantify(kind, Accessor::field(field), variable, predicate)
}

/// Deterministic quantifier variable name for `field`.
///
/// The kind prefix keeps `$all` and `$elemMatch` names disjoint; characters
/// that are not valid in an identifier are replaced with `_`.
pub fn bound_name(kind: QuantifierKind, field: &str) -> String {
    let prefix = match kind {
        QuantifierKind::All => "__all_",
        QuantifierKind::Any => "__elem_match_",
    };
    let sanitized: String = field
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    format!("{}{}__", prefix, sanitized)
}

/// Build the regex used for `$regex`, honoring `$options` flags (i, m, s, x)
pub fn compile_pattern(pattern: &str, options: Option<&str>) -> Result<Regex, regex::Error> {
    let mut builder = RegexBuilder::new(pattern);
    if let Some(opts) = options {
        for flag in opts.chars() {
            match flag {
                'i' => builder.case_insensitive(true),
                'm' => builder.multi_line(true),
                's' => builder.dot_matches_new_line(true),
                'x' => builder.ignore_whitespace(true),
                other => {
                    return Err(regex::Error::Syntax(format!(
                        "unknown regex option '{}'",
                        other
                    )))
                }
            };
        }
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::{LogicalKind, MetaKey};
    use serde_json::json;

    fn parse(selector: JsonValue) -> Result<Expression, CompileError> {
        SelectorParser::default().parse(&selector)
    }

    fn prop(name: &str) -> Accessor {
        Accessor::Property(name.to_string())
    }

    #[test]
    fn test_implicit_eq_on_identifier() {
        let expr = parse(json!({"_id": "pikachu"})).unwrap();
        assert_eq!(expr, Expression::eq(Accessor::Meta(MetaKey::Id), "pikachu"));
    }

    #[test]
    fn test_explicit_eq_matches_implicit() {
        assert_eq!(
            parse(json!({"rank": {"$eq": 1}})).unwrap(),
            parse(json!({"rank": 1})).unwrap()
        );
    }

    #[test]
    fn test_implicit_eq_with_array_literal() {
        let expr = parse(json!({"favorites": ["mario"]})).unwrap();
        assert_eq!(
            expr,
            Expression::eq(prop("favorites"), Value::Array(vec![Value::from("mario")]))
        );
    }

    #[test]
    fn test_comparison_operators() {
        let cases = [
            ("$lt", ComparisonOp::Lt),
            ("$lte", ComparisonOp::Lte),
            ("$gte", ComparisonOp::Gte),
            ("$gt", ComparisonOp::Gt),
            ("$ne", ComparisonOp::Ne),
        ];
        for (token, op) in cases {
            let expr = parse(json!({"rank": {token: 8}})).unwrap();
            assert_eq!(expr, Expression::compare(prop("rank"), op, 8i64), "{}", token);
        }
    }

    #[test]
    fn test_null_operand_reinterpreted_as_existence() {
        let expected = Expression::exists(Accessor::Meta(MetaKey::Id), true);
        assert_eq!(parse(json!({"_id": {"$gt": null}})).unwrap(), expected);
        assert_eq!(parse(json!({"_id": {"$ne": null}})).unwrap(), expected);

        // Only $gt and $ne get the special case
        assert_eq!(
            parse(json!({"rank": {"$gte": null}})).unwrap(),
            Expression::compare(prop("rank"), ComparisonOp::Gte, Value::Null)
        );
    }

    #[test]
    fn test_membership_operators() {
        let values = vec![Value::from("pikachu"), Value::from("puff")];
        assert_eq!(
            parse(json!({"name": {"$in": ["pikachu", "puff"]}})).unwrap(),
            Expression::in_values(prop("name"), values.clone())
        );
        assert_eq!(
            parse(json!({"name": {"$nin": ["pikachu", "puff"]}})).unwrap(),
            Expression::not_in_values(prop("name"), values)
        );
    }

    #[test]
    fn test_exists_operator() {
        assert_eq!(
            parse(json!({"rank": {"$exists": false}})).unwrap(),
            Expression::exists(prop("rank"), false)
        );
        assert!(matches!(
            parse(json!({"rank": {"$exists": "yes"}})),
            Err(CompileError::InvalidOperand { .. })
        ));
    }

    #[test]
    fn test_all_and_elem_match_bind_distinct_names() {
        let all = parse(json!({"favorites": {"$all": ["mario", "pokemon"]}})).unwrap();
        match all {
            Expression::ArrayQuantifier {
                kind,
                field,
                variable,
                predicate,
            } => {
                assert_eq!(kind, QuantifierKind::All);
                assert_eq!(field, prop("favorites"));
                assert_eq!(variable, "__all_favorites__");
                assert_eq!(
                    *predicate,
                    Expression::in_values(
                        Accessor::variable("__all_favorites__"),
                        vec![Value::from("mario"), Value::from("pokemon")]
                    )
                );
            }
            _ => panic!("Expected ArrayQuantifier expression"),
        }

        let any = parse(json!({"favorites": {"$elemMatch": ["mario"]}})).unwrap();
        assert_eq!(any.bound_variables(), vec!["__elem_match_favorites__"]);
    }

    #[test]
    fn test_sibling_quantifiers_do_not_collide() {
        let expr = parse(json!({
            "favorites": {"$all": ["mario"]},
            "games.owned": {"$all": ["zelda"]},
            "$or": [{"favorites": {"$elemMatch": ["kirby"]}}, {"games_owned": {"$elemMatch": ["fox"]}}]
        }))
        .unwrap();

        let names = expr.bound_variables();
        assert_eq!(
            names,
            vec![
                "__all_favorites__",
                "__all_games_owned__",
                "__elem_match_favorites__",
                "__elem_match_games_owned__"
            ]
        );
    }

    #[test]
    fn test_mod_regex_size() {
        assert_eq!(
            parse(json!({"debut": {"$mod": 2}})).unwrap(),
            Expression::Modulo {
                field: prop("debut"),
                divisor: 2.0,
                remainder: 0.0
            }
        );
        assert_eq!(
            parse(json!({"debut": {"$mod": [4, 1]}})).unwrap(),
            Expression::Modulo {
                field: prop("debut"),
                divisor: 4.0,
                remainder: 1.0
            }
        );
        assert_eq!(
            parse(json!({"name": {"$regex": "^pika", "$options": "i"}})).unwrap(),
            Expression::Regex {
                field: prop("name"),
                pattern: "^pika".to_string(),
                options: Some("i".to_string())
            }
        );
        assert_eq!(
            parse(json!({"favorites": {"$size": 2}})).unwrap(),
            Expression::Size {
                field: prop("favorites"),
                length: 2
            }
        );
    }

    #[test]
    fn test_invalid_operands() {
        let cases = [
            json!({"a": {"$in": "x"}}),
            json!({"a": {"$nin": 3}}),
            json!({"a": {"$all": {"x": 1}}}),
            json!({"a": {"$elemMatch": "mario"}}),
            json!({"a": {"$mod": "2"}}),
            json!({"a": {"$mod": 0}}),
            json!({"a": {"$mod": [2]}}),
            json!({"a": {"$regex": 5}}),
            json!({"a": {"$regex": "("}}),
            json!({"a": {"$regex": "x", "$options": "q"}}),
            json!({"a": {"$size": -1}}),
            json!({"a": {"$size": 1.5}}),
        ];
        for selector in cases {
            assert!(
                matches!(parse(selector.clone()), Err(CompileError::InvalidOperand { .. })),
                "{}",
                selector
            );
        }
    }

    #[test]
    fn test_first_recognized_operator_wins() {
        let expr = parse(json!({"rank": {"$gte": 1, "$lte": 10}})).unwrap();
        assert_eq!(expr, Expression::compare(prop("rank"), ComparisonOp::Gte, 1i64));

        // Unknown keys before the operator are skipped, not rejected
        let expr = parse(json!({"rank": {"$bogus": 1, "$lt": 3}})).unwrap();
        assert_eq!(expr, Expression::compare(prop("rank"), ComparisonOp::Lt, 3i64));
    }

    #[test]
    fn test_type_is_rejected_anywhere() {
        assert_eq!(
            parse(json!({"_id": {"$type": "string"}})),
            Err(CompileError::UnsupportedOperator("$type".to_string()))
        );
        assert_eq!(
            parse(json!({"_id": {"$eq": "a", "$type": "string"}})),
            Err(CompileError::UnsupportedOperator("$type".to_string()))
        );
    }

    #[test]
    fn test_unknown_operator_only() {
        assert_eq!(
            parse(json!({"rank": {"$near": [1, 2]}})),
            Err(CompileError::UnsupportedOperator("$near".to_string()))
        );
    }

    #[test]
    fn test_plain_object_is_literal() {
        let expr = parse(json!({"stats": {"speed": 3}})).unwrap();
        match expr {
            Expression::Comparison { value: Value::Object(obj), .. } => {
                assert_eq!(obj.get("speed"), Some(&Value::Int(3)));
            }
            _ => panic!("Expected object equality"),
        }
    }

    #[test]
    fn test_implicit_and_follows_key_order() {
        let expr = parse(json!({"_id": "pikachu", "rank": 1, "series": "pokemon"})).unwrap();
        let expected = Expression::eq(Accessor::Meta(MetaKey::Id), "pikachu")
            .and(Expression::eq(prop("rank"), 1i64))
            .and(Expression::eq(prop("series"), "pokemon"));
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_combinators() {
        let mario = Expression::eq(Accessor::Meta(MetaKey::Id), "mario");
        let luigi = Expression::eq(Accessor::Meta(MetaKey::Id), "luigi");

        assert_eq!(
            parse(json!({"$or": [{"_id": "mario"}, {"_id": "luigi"}]})).unwrap(),
            mario.clone().or(luigi.clone())
        );
        assert_eq!(
            parse(json!({"$and": [{"_id": "mario"}, {"_id": "luigi"}]})).unwrap(),
            mario.clone().and(luigi.clone())
        );
        assert_eq!(
            parse(json!({"$nor": [{"_id": "mario"}, {"_id": "luigi"}]})).unwrap(),
            mario.clone().or(luigi).negated()
        );
        assert_eq!(
            parse(json!({"$not": {"_id": "mario"}})).unwrap(),
            mario.negated()
        );
    }

    #[test]
    fn test_nor_alongside_field_clause() {
        let expr = parse(json!({
            "_id": {"$gt": null},
            "$nor": [{"_id": "mario"}, {"_id": "luigi"}]
        }))
        .unwrap();

        match expr {
            Expression::Logical {
                kind: LogicalKind::And,
                children,
            } => {
                assert_eq!(children[0], Expression::exists(Accessor::Meta(MetaKey::Id), true));
                assert!(matches!(
                    children[1],
                    Expression::Logical {
                        kind: LogicalKind::Not,
                        ..
                    }
                ));
            }
            _ => panic!("Expected And expression"),
        }
    }

    #[test]
    fn test_malformed_selectors() {
        let cases = [
            json!({}),
            json!("pikachu"),
            json!({"$and": {"_id": "x"}}),
            json!({"$and": []}),
            json!({"$or": ["x"]}),
            json!({"$nor": [{}]}),
            json!({"$not": [{"_id": "x"}]}),
            json!({"$where": "1 == 1"}),
        ];
        for selector in cases {
            assert!(
                matches!(parse(selector.clone()), Err(CompileError::MalformedSelector(_))),
                "{}",
                selector
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        let mut selector = json!({"rank": 1});
        for _ in 0..5 {
            selector = json!({"$not": selector});
        }

        let strict = SelectorParser::new(CompileOptions { max_depth: 3 });
        assert!(matches!(
            strict.parse(&selector),
            Err(CompileError::MalformedSelector(_))
        ));
        assert!(SelectorParser::new(CompileOptions { max_depth: 5 })
            .parse(&selector)
            .is_ok());
    }

    #[test]
    fn test_wide_selectors_count_against_depth() {
        let wide = |n: usize| -> JsonValue {
            let map: Map<String, JsonValue> =
                (0..n).map(|i| (format!("f{}", i), json!(i))).collect();
            JsonValue::Object(map)
        };

        // n keys build a chain of n - 1 `And` nodes
        assert!(parse(wide(DEFAULT_MAX_DEPTH + 1)).is_ok());
        assert!(matches!(
            parse(wide(DEFAULT_MAX_DEPTH + 2)),
            Err(CompileError::MalformedSelector(_))
        ));
        assert!(matches!(
            parse(wide(5_000)),
            Err(CompileError::MalformedSelector(_))
        ));

        let clauses: Vec<JsonValue> = (0..20_000).map(|i| json!({"rank": i})).collect();
        for combinator in ["$and", "$or", "$nor"] {
            let mut map = Map::new();
            map.insert(combinator.to_string(), JsonValue::Array(clauses.clone()));
            assert!(matches!(
                parse(JsonValue::Object(map)),
                Err(CompileError::MalformedSelector(_))
            ));
        }

        let roomy = SelectorParser::new(CompileOptions { max_depth: 200 });
        assert!(roomy.parse(&wide(200)).is_ok());
    }

    #[test]
    fn test_bound_name_sanitizes_paths() {
        assert_eq!(bound_name(QuantifierKind::All, "favorites"), "__all_favorites__");
        assert_eq!(
            bound_name(QuantifierKind::Any, "owner.pets-list"),
            "__elem_match_owner_pets_list__"
        );
    }

    #[test]
    fn test_compile_pattern_flags() {
        let re = compile_pattern("^PIKA", Some("i")).unwrap();
        assert!(re.is_match("pikachu"));
        assert!(compile_pattern("a", Some("z")).is_err());
    }
}
