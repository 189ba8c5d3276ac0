use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A schemaless record as it travels between services and the store.
pub type Document = Map<String, Value>;

/// Free-form key/value annotation carried by most entity kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalProperty {
    pub key: String,
    pub value: Value,
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("expected a JSON object, got {other}"),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}

/// The `id` field of a document, when present and a string.
pub fn doc_id(doc: &Document) -> Option<&str> {
    doc.get("id").and_then(Value::as_str)
}

pub fn field_str<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

pub fn docs_to_array(docs: Vec<Document>) -> Value {
    Value::Array(docs.into_iter().map(Value::Object).collect())
}

/// Rewrites top-level date-only strings (`%Y-%m-%d`) to midnight-UTC
/// timestamps so date fields are stored and compared uniformly.
pub fn normalize_date_fields(doc: &mut Document) {
    for (_, value) in doc.iter_mut() {
        if let Value::String(s) = value {
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                    let stamp = Utc.from_utc_datetime(&naive);
                    *value = Value::String(stamp.to_rfc3339());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_date_only_strings() {
        let mut doc = to_document(&json!({
            "name": "anna",
            "date_of_birth": "1990-03-15",
            "note": "born 1990-03-15 in spring"
        }))
        .unwrap();
        normalize_date_fields(&mut doc);
        assert_eq!(
            doc["date_of_birth"].as_str().unwrap(),
            "1990-03-15T00:00:00+00:00"
        );
        // non-date strings stay untouched
        assert_eq!(doc["name"], json!("anna"));
        assert_eq!(doc["note"], json!("born 1990-03-15 in spring"));
    }
}
