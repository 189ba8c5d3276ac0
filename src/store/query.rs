use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{Document, ObjectId};

/// Condition applied to one dotted document path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cond {
    /// Equality; against an array leaf this means "contains" and recurses
    /// into nested arrays.
    Eq(Value),
    /// Membership in a candidate set.
    In(Vec<Value>),
    /// Inclusive numeric range; either bound may be open.
    Range {
        min: Option<f64>,
        max: Option<f64>,
    },
}

/// Conjunction of path conditions: a document matches when every clause
/// holds. Paths are dotted; arrays along a path fan the match out over
/// their elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    clauses: Vec<(String, Cond)>,
}

impl Query {
    pub fn new() -> Self {
        Query::default()
    }

    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::new().and_eq(path, value)
    }

    pub fn is_in(path: impl Into<String>, values: Vec<Value>) -> Self {
        Query::new().and_in(path, values)
    }

    pub fn and_eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((path.into(), Cond::Eq(value.into())));
        self
    }

    pub fn and_in(mut self, path: impl Into<String>, values: Vec<Value>) -> Self {
        self.clauses.push((path.into(), Cond::In(values)));
        self
    }

    pub fn and_range(mut self, path: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        self.clauses.push((path.into(), Cond::Range { min, max }));
        self
    }

    pub fn and_cond(mut self, path: impl Into<String>, cond: Cond) -> Self {
        self.clauses.push((path.into(), cond));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[(String, Cond)] {
        &self.clauses
    }

    /// Rewrites every clause path with a prefix, turning a query over
    /// embedded children into one over their parent collection.
    pub fn prefixed(self, prefix: &str) -> Self {
        Query {
            clauses: self
                .clauses
                .into_iter()
                .map(|(path, cond)| (format!("{prefix}.{path}"), cond))
                .collect(),
        }
    }

    /// Canonicalizes id-valued operands on id-like paths (`_id`, `id`,
    /// `*_id` and list variants) so equal ids always compare equal as hex.
    pub fn normalize_ids(mut self) -> Self {
        for (path, cond) in self.clauses.iter_mut() {
            let leaf = path.rsplit('.').next().unwrap_or(path);
            if !is_id_field(leaf) {
                continue;
            }
            match cond {
                Cond::Eq(value) => normalize_id_value(value),
                Cond::In(values) => values.iter_mut().for_each(normalize_id_value),
                Cond::Range { .. } => {}
            }
        }
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses.iter().all(|(path, cond)| {
            match path.split_once('.') {
                Some((head, rest)) => doc
                    .get(head)
                    .map(|inner| path_matches(inner, rest, cond))
                    .unwrap_or(false),
                None => doc
                    .get(path.as_str())
                    .map(|leaf| leaf_matches(leaf, cond))
                    .unwrap_or(false),
            }
        })
    }
}

/// Field names that carry object ids: `id`, `_id` and any `*_id`/`*_ids`.
pub fn is_id_field(field: &str) -> bool {
    field == "id" || field == "_id" || field.ends_with("_id") || field.ends_with("_ids")
}

fn normalize_id_value(value: &mut Value) {
    if let Value::String(s) = value {
        if let Ok(oid) = ObjectId::parse_str(s) {
            *s = oid.to_hex();
        }
    }
}

fn path_matches(value: &Value, path: &str, cond: &Cond) -> bool {
    match path.split_once('.') {
        Some((head, rest)) => match value {
            Value::Object(map) => map
                .get(head)
                .map(|inner| path_matches(inner, rest, cond))
                .unwrap_or(false),
            Value::Array(items) => items.iter().any(|item| path_matches(item, path, cond)),
            _ => false,
        },
        None => match value {
            Value::Object(map) => map.get(path).map(|leaf| leaf_matches(leaf, cond)).unwrap_or(false),
            Value::Array(items) => items.iter().any(|item| path_matches(item, path, cond)),
            _ => false,
        },
    }
}

fn leaf_matches(leaf: &Value, cond: &Cond) -> bool {
    match cond {
        Cond::Eq(expected) => value_contains(leaf, expected),
        Cond::In(candidates) => candidates.iter().any(|c| value_contains(leaf, c)),
        Cond::Range { min, max } => match leaf.as_f64() {
            Some(n) => min.map_or(true, |m| n >= m) && max.map_or(true, |m| n <= m),
            None => false,
        },
    }
}

/// Scalar equality, with arrays treated as containment at any nesting depth.
fn value_contains(leaf: &Value, expected: &Value) -> bool {
    if leaf == expected {
        return true;
    }
    match leaf {
        Value::Array(items) => items.iter().any(|item| value_contains(item, expected)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::to_document;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        to_document(&value).unwrap()
    }

    #[test]
    fn matches_flat_equality() {
        let d = doc(json!({"name": "eeg", "count": 3}));
        assert!(Query::eq("name", "eeg").matches(&d));
        assert!(!Query::eq("name", "ecg").matches(&d));
        assert!(Query::eq("name", "eeg").and_eq("count", 3).matches(&d));
        assert!(!Query::eq("missing", "x").matches(&d));
    }

    #[test]
    fn dotted_paths_fan_out_over_arrays() {
        let d = doc(json!({
            "participant_states": [
                {"id": "a", "age": 20},
                {"id": "b", "age": 31}
            ]
        }));
        assert!(Query::eq("participant_states.id", "b").matches(&d));
        assert!(Query::eq("participant_states.age", 20).matches(&d));
        assert!(!Query::eq("participant_states.id", "c").matches(&d));
    }

    #[test]
    fn equality_on_array_leaf_means_contains() {
        let d = doc(json!({"appearance_ids": ["x", "y"]}));
        assert!(Query::eq("appearance_ids", "y").matches(&d));
        assert!(!Query::eq("appearance_ids", "z").matches(&d));
    }

    #[test]
    fn equality_recurses_into_nested_arrays() {
        // scenario branch lists are lists of lists of ids
        let d = doc(json!({"activity_executions": [["a", "b"], ["c"]]}));
        assert!(Query::eq("activity_executions", "c").matches(&d));
        assert!(!Query::eq("activity_executions", "d").matches(&d));
    }

    #[test]
    fn in_condition_matches_any_candidate() {
        let d = doc(json!({"_id": "abc"}));
        let q = Query::is_in("_id", vec![json!("xyz"), json!("abc")]);
        assert!(q.matches(&d));
        assert!(!Query::is_in("_id", vec![json!("xyz")]).matches(&d));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let d = doc(json!({"value": 5.0}));
        assert!(Query::new().and_range("value", Some(5.0), Some(10.0)).matches(&d));
        assert!(Query::new().and_range("value", None, Some(5.0)).matches(&d));
        assert!(!Query::new().and_range("value", Some(5.1), None).matches(&d));
        assert!(!Query::new().and_range("missing", Some(0.0), None).matches(&d));
    }

    #[test]
    fn prefixed_rewrites_every_clause() {
        let q = Query::eq("id", "a").and_eq("age", 7).prefixed("participant_states");
        let d = doc(json!({"participant_states": [{"id": "a", "age": 7}]}));
        assert!(q.matches(&d));
    }

    #[test]
    fn normalize_ids_canonicalizes_hex_case() {
        let hex = "AABBCCDDEEFF001122334455";
        let q = Query::eq("_id", hex).normalize_ids();
        let d = doc(json!({"_id": hex.to_lowercase()}));
        assert!(q.matches(&d));
        // non-id paths are left alone
        let q = Query::eq("name", hex).normalize_ids();
        assert!(!q.matches(&doc(json!({"name": hex.to_lowercase()}))));
    }
}
