//! Activity-log details: record snapshots and field diffs
//!
//! Compares the JSON form of a record before and after an update and lists changed
//! fields. Nested objects are walked recursively; numbers compare with a tolerance so
//! float round-trips through the hosted database don't show up as edits.

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeSet;

const FLOAT_EPSILON: f64 = 1e-9;

/// Fields never shown in activity details
const ALWAYS_EXCLUDED: &[&str] = &["id", "createdAt", "updatedAt", "lastLogin"];

fn numbers_equal(a: &serde_json::Number, b: &serde_json::Number) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(fa), Some(fb)) => (fa - fb).abs() < FLOAT_EPSILON,
        _ => a == b,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(va, vb)| values_equal(va, vb))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, va)| b.get(key).is_some_and(|vb| values_equal(va, vb)))
        }
        _ => a == b,
    }
}

/// One changed field; nested fields use dotted paths (`items.0.price`)
#[derive(Debug, Clone, PartialEq, Serialize, serde::Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub from: Value,
    pub to: Value,
}

fn diff_recursive(from: &Value, to: &Value, path: &str, changes: &mut Vec<FieldChange>) {
    match (from, to) {
        (Value::Object(from_obj), Value::Object(to_obj)) => {
            // Sorted so the stored diff is stable
            let keys: BTreeSet<&String> = from_obj.keys().chain(to_obj.keys()).collect();
            for key in keys {
                let field = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                let f = from_obj.get(key).unwrap_or(&Value::Null);
                let t = to_obj.get(key).unwrap_or(&Value::Null);
                diff_recursive(f, t, &field, changes);
            }
        }
        (f, t) => {
            if !values_equal(f, t) {
                changes.push(FieldChange {
                    field: path.to_string(),
                    from: f.clone(),
                    to: t.clone(),
                });
            }
        }
    }
}

fn to_filtered_json<T: Serialize>(value: &T, exclude: &[&str]) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(mut json) => {
            if let Value::Object(obj) = &mut json {
                for field in ALWAYS_EXCLUDED.iter().chain(exclude) {
                    obj.remove(*field);
                }
            }
            Some(json)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize activity details");
            None
        }
    }
}

/// List of changed fields between two versions of a record
pub fn field_changes<T: Serialize>(from: &T, to: &T, exclude: &[&str]) -> Vec<FieldChange> {
    let (Some(from), Some(to)) = (
        to_filtered_json(from, exclude),
        to_filtered_json(to, exclude),
    ) else {
        return Vec::new();
    };
    let mut changes = Vec::new();
    diff_recursive(&from, &to, "", &mut changes);
    changes
}

/// Details for an update entry: `{"changes": [{"field", "from", "to"}, ...]}`
pub fn create_diff<T: Serialize>(from: &T, to: &T, exclude: &[&str]) -> Value {
    let changes = field_changes(from, to, exclude);
    if changes.is_empty() {
        json!({"changes": [], "note": "no_changes_detected"})
    } else {
        json!({"changes": changes})
    }
}

/// Details for a create entry: the new record minus excluded fields
pub fn create_snapshot<T: Serialize>(value: &T, exclude: &[&str]) -> Value {
    to_filtered_json(value, exclude).unwrap_or_else(|| json!({"error": "serialization_failed"}))
}

/// Details for a delete entry
pub fn create_delete_details(name: &str) -> Value {
    json!({"name": name})
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Item {
        id: String,
        name: String,
        price: f64,
        updated_at: Option<i64>,
    }

    fn item(name: &str, price: f64, updated_at: Option<i64>) -> Item {
        Item {
            id: "-N1".into(),
            name: name.into(),
            price,
            updated_at,
        }
    }

    #[test]
    fn test_diff_lists_changed_fields_sorted() {
        let diff = create_diff(&item("Tea", 2.0, None), &item("Green tea", 2.5, Some(9)), &[]);
        let changes = diff["changes"].as_array().unwrap();
        let fields: Vec<&str> = changes.iter().map(|c| c["field"].as_str().unwrap()).collect();
        assert_eq!(fields, vec!["name", "price"]);
        assert_eq!(changes[0]["from"], "Tea");
        assert_eq!(changes[0]["to"], "Green tea");
    }

    #[test]
    fn test_float_noise_is_ignored() {
        let a = item("Tea", 0.1 + 0.2, None);
        let b = item("Tea", 0.3, None);
        assert!(field_changes(&a, &b, &[]).is_empty());
        let diff = create_diff(&a, &b, &[]);
        assert_eq!(diff["note"], "no_changes_detected");
    }

    #[test]
    fn test_nested_paths() {
        let from = json!({"address": {"city": "Lyon", "zip": "69001"}});
        let to = json!({"address": {"city": "Paris", "zip": "69001"}});
        let changes = field_changes(&from, &to, &[]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].field, "address.city");
    }

    #[test]
    fn test_snapshot_excludes_fields() {
        let snapshot = create_snapshot(&item("Tea", 2.0, Some(1)), &["price"]);
        let obj = snapshot.as_object().unwrap();
        assert!(obj.contains_key("name"));
        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("price"));
        assert!(!obj.contains_key("updatedAt"));
    }

    #[test]
    fn test_delete_details() {
        assert_eq!(create_delete_details("Tea")["name"], "Tea");
    }
}
