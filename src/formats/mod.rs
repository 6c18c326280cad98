//! Columnar file readers and row decoding

pub mod error;
pub mod parquet;
pub mod reader;

pub use error::{ColumnarError, TapError};
pub use self::parquet::{LocalParquetFile, ParquetRowSource, RowIter, map_type, type_descriptor};
pub use reader::{
    BatchIter, ColumnDescriptor, ColumnarFile, ColumnarMetadata, FieldType, Record, Schema,
    SchemaField,
};
