//! Singer protocol messages and JSON schema rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::formats::{FieldType, Schema};

/// A message on the tap's output stream, tagged by its `type`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message<'a> {
    Schema {
        stream: &'a str,
        schema: Value,
        key_properties: Vec<String>,
    },
    Record {
        stream: &'a str,
        record: Map<String, Value>,
        time_extracted: DateTime<Utc>,
    },
}

/// Render a schema as a JSON schema object. Every property is nullable.
pub fn json_schema(schema: &Schema) -> Value {
    let mut properties = Map::with_capacity(schema.len());
    for field in &schema.fields {
        properties.insert(field.name.clone(), property_schema(field.field_type));
    }
    json!({
        "type": "object",
        "properties": properties,
    })
}

fn property_schema(field_type: FieldType) -> Value {
    match field_type {
        FieldType::Integer => json!({"type": ["integer", "null"]}),
        FieldType::Number => json!({"type": ["number", "null"]}),
        FieldType::String => json!({"type": ["string", "null"]}),
        FieldType::Boolean => json!({"type": ["boolean", "null"]}),
        FieldType::Timestamp => json!({"type": ["string", "null"], "format": "date-time"}),
    }
}
