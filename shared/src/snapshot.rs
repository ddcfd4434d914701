//! Hosted-database read results and their conversion into record lists

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Point-in-time read result from the hosted database.
///
/// Collections come back as a JSON object keyed by the database-assigned key; the key is
/// not part of the stored record, so [`Snapshot::records`] injects it as `id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot(Value);

impl Snapshot {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn empty() -> Self {
        Self(Value::Null)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// True for null and for empty objects/arrays
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.iter().all(Value::is_null),
            _ => false,
        }
    }

    /// `(key, child)` pairs in key order.
    ///
    /// Dense integer keys come back from the database as arrays; those are keyed by index
    /// with null holes skipped.
    pub fn children(&self) -> Vec<(String, Value)> {
        match &self.0 {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_null())
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Deserialize every child into `T`, with the child key written to `id`.
    ///
    /// Children that do not deserialize are skipped and logged.
    pub fn records<T: DeserializeOwned>(&self) -> Vec<T> {
        self.children()
            .into_iter()
            .filter_map(|(key, child)| {
                let Value::Object(mut fields) = child else {
                    tracing::warn!(key = %key, "Skipping non-object record in snapshot");
                    return None;
                };
                fields.insert("id".to_string(), Value::String(key.clone()));
                match serde_json::from_value(Value::Object(fields)) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Skipping malformed record");
                        None
                    }
                }
            })
            .collect()
    }

    /// Deserialize a single record read by path, injecting `id`
    pub fn record<T: DeserializeOwned>(&self, id: &str) -> Option<T> {
        let Value::Object(fields) = &self.0 else {
            return None;
        };
        let mut fields: Map<String, Value> = fields.clone();
        fields.insert("id".to_string(), Value::String(id.to_string()));
        match serde_json::from_value(Value::Object(fields)) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(id = %id, error = %e, "Malformed record");
                None
            }
        }
    }
}

impl From<Value> for Snapshot {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Option<Value>> for Snapshot {
    fn from(value: Option<Value>) -> Self {
        Self(value.unwrap_or(Value::Null))
    }
}
