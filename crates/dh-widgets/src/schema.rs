//! Declarative mapping from raw records to view data.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

/// Computes a field from a raw record and its index.
pub type FieldFn = Arc<dyn Fn(&Value, usize) -> Value + Send + Sync>;

/// How one view-data field is produced.
#[derive(Clone)]
pub enum FieldMapping {
    /// The same value for every record.
    Literal(Value),
    /// A value computed from the record and its index.
    Map(FieldFn),
}

impl FieldMapping {
    /// Produce the field value for `record`.
    pub fn apply(&self, record: &Value, index: usize) -> Value {
        match self {
            FieldMapping::Literal(value) => value.clone(),
            FieldMapping::Map(map) => map(record, index),
        }
    }
}

impl fmt::Debug for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldMapping::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            FieldMapping::Map(_) => f.write_str("Map(..)"),
        }
    }
}

/// An ordered list of `(field, mapping)` pairs.
///
/// # Example
///
/// ```
/// use dh_widgets::schema::Schema;
/// use serde_json::json;
///
/// let schema = Schema::new()
///     .copy("label", "name")
///     .map("value", |record, _| json!(format!("{} ms", record["latency"])))
///     .literal("unit", json!(null));
///
/// let item = schema.map_record(&json!({"name": "p99", "latency": 12}), 0);
/// assert_eq!(item, json!({"label": "p99", "value": "12 ms", "unit": null}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldMapping)>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field with a constant value.
    pub fn literal(mut self, field: impl Into<String>, value: Value) -> Self {
        self.fields.push((field.into(), FieldMapping::Literal(value)));
        self
    }

    /// Add a computed field.
    pub fn map<F>(mut self, field: impl Into<String>, map: F) -> Self
    where
        F: Fn(&Value, usize) -> Value + Send + Sync + 'static,
    {
        self.fields.push((field.into(), FieldMapping::Map(Arc::new(map))));
        self
    }

    /// Add a field copied from `source` in the raw record (`null` if missing).
    pub fn copy(self, field: impl Into<String>, source: impl Into<String>) -> Self {
        let source = source.into();
        self.map(field, move |record, _| {
            record.get(&source).cloned().unwrap_or(Value::Null)
        })
    }

    /// The fields in order.
    pub fn fields(&self) -> &[(String, FieldMapping)] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Map one raw record to a view-data object.
    pub fn map_record(&self, record: &Value, index: usize) -> Value {
        let mut item = Map::new();
        for (field, mapping) in &self.fields {
            item.insert(field.clone(), mapping.apply(record, index));
        }
        Value::Object(item)
    }
}

/// Build view data from raw records.
///
/// At most `size` raw records are used, before any mapping. Without a schema
/// the kept records pass through unchanged.
pub fn build_view_data(raw: &[Value], schema: Option<&Schema>, size: usize) -> Arc<[Value]> {
    let kept = &raw[..raw.len().min(size)];
    match schema {
        Some(schema) => kept
            .iter()
            .enumerate()
            .map(|(index, record)| schema.map_record(record, index))
            .collect(),
        None => kept.iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(n: usize) -> Vec<Value> {
        (0..n).map(|i| json!({"name": format!("r{i}"), "n": i})).collect()
    }

    #[test]
    fn no_schema_passes_records_through() {
        let raw = records(3);
        let view = build_view_data(&raw, None, 5);
        assert_eq!(&view[..], &raw[..]);
    }

    #[test]
    fn size_caps_before_mapping() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let schema = Schema::new().map("title", move |record, _| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            record["name"].clone()
        });

        let view = build_view_data(&records(10), Some(&schema), 4);
        assert_eq!(view.len(), 4);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 4);

        let view = build_view_data(&records(10), None, 2);
        assert_eq!(view.len(), 2);
    }

    #[test]
    fn mappings_receive_the_index() {
        let schema = Schema::new()
            .map("rank", |_, index| json!(index + 1))
            .literal("kind", json!("row"));
        let view = build_view_data(&records(2), Some(&schema), 5);
        assert_eq!(view[1], json!({"rank": 2, "kind": "row"}));
    }

    #[test]
    fn copy_missing_field_is_null() {
        let schema = Schema::new().copy("desc", "description");
        assert_eq!(schema.map_record(&json!({}), 0), json!({"desc": null}));
        assert_eq!(schema.len(), 1);
        assert!(!schema.is_empty());
    }
}
