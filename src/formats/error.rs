use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Failures raised by the columnar file layer
#[derive(Debug, Error)]
pub enum ColumnarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("{0}")]
    Conversion(String),
}

/// Errors surfaced by schema derivation and row streaming
///
/// Every variant that originates in the file layer keeps the underlying
/// `ColumnarError` as its `source()`.
#[derive(Debug, Error)]
pub enum TapError {
    /// A column's physical type has no schema mapping
    #[error("Unmappable data type '{0}'.")]
    UnmappableType(String),

    /// The file could not be opened or its footer metadata is corrupt
    #[error("Could not infer schema of parquet file '{path}'")]
    SchemaInference {
        path: String,
        #[source]
        source: ColumnarError,
    },

    /// The file could not be opened when a row sequence was started
    #[error("Could not read from parquet file '{path}'")]
    SourceRead {
        path: String,
        #[source]
        source: ColumnarError,
    },

    /// A record batch failed to load partway through a row sequence
    #[error("Failed to read record batch from '{path}'")]
    BatchRead {
        path: String,
        #[source]
        source: ColumnarError,
    },

    /// A record batch was read but could not be converted to records
    #[error("Failed to convert record batch from '{path}' to records")]
    Decode {
        path: String,
        #[source]
        source: ColumnarError,
    },
}
