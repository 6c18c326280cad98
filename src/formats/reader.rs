use std::path::Path;

use arrow::record_batch::RecordBatch;
use serde_json::{Map, Value};

use super::error::ColumnarError;

/// Generic type of a schema field, independent of any file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Integer,
    Number,
    String,
    Boolean,
    Timestamp,
}

/// A named, typed column of a stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered field list in the file's physical column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<SchemaField>,
}

impl Schema {
    pub fn new(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single decoded row, keyed by column name in column order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }
}

/// Column name paired with its physical type descriptor (e.g. `int64`, `timestamp[us, tz=UTC]`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_descriptor: String,
}

/// Footer-level information about a columnar file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnarMetadata {
    pub columns: Vec<ColumnDescriptor>,
    pub num_rows: Option<u64>,
}

/// Sequence of record batches in physical file order
pub type BatchIter = Box<dyn Iterator<Item = Result<RecordBatch, ColumnarError>> + Send>;

/// Trait for columnar files that can describe their columns and stream batches
///
/// Each call to `read_batches` must open its own handle so that independent
/// sequences never share a cursor.
pub trait ColumnarFile: Send + Sync {
    /// Location of the file, used in error messages and logs
    fn path(&self) -> &Path;

    /// Read column names and type descriptors without touching row data
    fn read_metadata(&self) -> Result<ColumnarMetadata, ColumnarError>;

    /// Open the file and stream batches of at most `batch_size` rows
    fn read_batches(&self, batch_size: usize) -> Result<BatchIter, ColumnarError>;
}
