//! Discovery catalog listing the streams and their field metadata.

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::messages::json_schema;
use crate::formats::Schema;

/// Output of discovery mode
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub streams: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub tap_stream_id: String,
    pub stream: String,
    pub schema: Value,
    pub key_properties: Vec<String>,
    pub metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetadataEntry {
    pub breadcrumb: Vec<String>,
    pub metadata: Map<String, Value>,
}

impl CatalogEntry {
    /// Describe a full-table stream that is selected by default
    pub fn new(stream: &str, schema: &Schema) -> Self {
        let mut metadata = Vec::with_capacity(schema.len() + 1);

        let mut stream_metadata = Map::new();
        stream_metadata.insert("inclusion".to_string(), json!("available"));
        stream_metadata.insert("selected".to_string(), json!(true));
        stream_metadata.insert(
            "forced-replication-method".to_string(),
            json!("FULL_TABLE"),
        );
        stream_metadata.insert("table-key-properties".to_string(), json!([]));
        metadata.push(MetadataEntry {
            breadcrumb: Vec::new(),
            metadata: stream_metadata,
        });

        for field in &schema.fields {
            let mut field_metadata = Map::new();
            field_metadata.insert("inclusion".to_string(), json!("available"));
            metadata.push(MetadataEntry {
                breadcrumb: vec!["properties".to_string(), field.name.clone()],
                metadata: field_metadata,
            });
        }

        Self {
            tap_stream_id: stream.to_string(),
            stream: stream.to_string(),
            schema: json_schema(schema),
            key_properties: Vec::new(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::{FieldType, SchemaField};

    #[test]
    fn test_catalog_entry() {
        let schema = Schema::new(vec![
            SchemaField::new("id", FieldType::Integer),
            SchemaField::new("name", FieldType::String),
        ]);
        let catalog = Catalog {
            streams: vec![CatalogEntry::new("data/users.parquet", &schema)],
        };

        let value = serde_json::to_value(&catalog).unwrap();
        let stream = &value["streams"][0];

        assert_eq!(stream["tap_stream_id"], "data/users.parquet");
        assert_eq!(stream["stream"], "data/users.parquet");
        assert_eq!(
            stream["schema"]["properties"]["name"]["type"],
            json!(["string", "null"])
        );
        assert_eq!(stream["metadata"][0]["breadcrumb"], json!([]));
        assert_eq!(
            stream["metadata"][0]["metadata"]["forced-replication-method"],
            "FULL_TABLE"
        );
        assert_eq!(
            stream["metadata"][2]["breadcrumb"],
            json!(["properties", "name"])
        );
    }
}
