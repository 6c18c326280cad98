//! Parquet file format support for the tap.
//!
//! This module turns a Parquet file into a schema and a stream of records.
//! It includes:
//! - Type mapping from physical column types to schema field types
//! - Conversion from Arrow RecordBatches to row-based Records
//! - A ColumnarFile implementation over local Parquet files
//! - ParquetRowSource, which caches the schema and streams rows batch by batch

mod conversion;
mod file;
mod source;
mod types;

#[cfg(test)]
pub(crate) mod test_util;

pub use file::LocalParquetFile;
pub use source::{ParquetRowSource, RowIter};
pub use types::{map_type, type_descriptor};
