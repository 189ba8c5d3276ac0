//! Helpers for entity kinds stored as arrays of child documents inside a
//! parent document instead of in a collection of their own.

use serde_json::Value;

use crate::model::{Document, ObjectId};

fn child_id_matches(child: &Document, id_hex: &str) -> bool {
    child
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| ObjectId::parse_str(s).ok())
        .map(|oid| oid.to_hex() == id_hex)
        .unwrap_or(false)
}

/// Clones the children out of the parent's embedded array.
pub(crate) fn children_of(parent: &Document, field: &str) -> Vec<Document> {
    parent
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn find_child(parent: &Document, field: &str, id_hex: &str) -> Option<Document> {
    children_of(parent, field)
        .into_iter()
        .find(|child| child_id_matches(child, id_hex))
}

pub(crate) fn push_child(parent: &mut Document, field: &str, child: Document) {
    match parent.get_mut(field) {
        Some(Value::Array(items)) => items.push(Value::Object(child)),
        _ => {
            parent.insert(field.to_owned(), Value::Array(vec![Value::Object(child)]));
        }
    }
}

/// Removes the child with the given id; returns it when found.
pub(crate) fn remove_child(parent: &mut Document, field: &str, id_hex: &str) -> Option<Document> {
    let items = match parent.get_mut(field) {
        Some(Value::Array(items)) => items,
        _ => return None,
    };
    let index = items
        .iter()
        .position(|item| item.as_object().map(|c| child_id_matches(c, id_hex)).unwrap_or(false))?;
    match items.remove(index) {
        Value::Object(child) => Some(child),
        _ => None,
    }
}

/// Swaps the child with the given id for a replacement in place.
pub(crate) fn replace_child(
    parent: &mut Document,
    field: &str,
    id_hex: &str,
    replacement: Document,
) -> bool {
    let items = match parent.get_mut(field) {
        Some(Value::Array(items)) => items,
        _ => return false,
    };
    for item in items.iter_mut() {
        let matches = item
            .as_object()
            .map(|c| child_id_matches(c, id_hex))
            .unwrap_or(false);
        if matches {
            *item = Value::Object(replacement);
            return true;
        }
    }
    false
}
