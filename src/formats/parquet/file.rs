//! Local Parquet file access.

use std::fs::File;
use std::path::{Path, PathBuf};

use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::debug;

use crate::formats::error::ColumnarError;
use crate::formats::reader::{BatchIter, ColumnDescriptor, ColumnarFile, ColumnarMetadata};

use super::types::type_descriptor;

/// ColumnarFile implementation for Parquet files on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalParquetFile {
    file_path: PathBuf,
}

impl LocalParquetFile {
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
        }
    }
}

impl ColumnarFile for LocalParquetFile {
    fn path(&self) -> &Path {
        &self.file_path
    }

    fn read_metadata(&self) -> Result<ColumnarMetadata, ColumnarError> {
        let file = File::open(&self.file_path)?;

        // Only the footer is parsed here; row groups are left untouched
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

        let columns = builder
            .schema()
            .fields()
            .iter()
            .map(|field| ColumnDescriptor {
                name: field.name().clone(),
                type_descriptor: type_descriptor(field.data_type()),
            })
            .collect();
        let num_rows = u64::try_from(builder.metadata().file_metadata().num_rows()).ok();

        debug!(
            path = %self.file_path.display(),
            row_groups = builder.metadata().num_row_groups(),
            "read parquet footer"
        );

        Ok(ColumnarMetadata { columns, num_rows })
    }

    fn read_batches(&self, batch_size: usize) -> Result<BatchIter, ColumnarError> {
        let file = File::open(&self.file_path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
            .with_batch_size(batch_size)
            .build()?;

        Ok(Box::new(reader.map(|batch| batch.map_err(ColumnarError::from))))
    }
}
