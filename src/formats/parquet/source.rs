//! Schema derivation and streaming row decode for a single Parquet file.

use std::iter::FusedIterator;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use crate::config::DEFAULT_BATCH_SIZE;
use crate::formats::error::TapError;
use crate::formats::reader::{BatchIter, ColumnarFile, Record, Schema, SchemaField};

use super::conversion::record_batch_to_records;
use super::file::LocalParquetFile;
use super::types::map_type;

/// Metadata derived from one footer read
#[derive(Debug)]
struct SourceMetadata {
    schema: Arc<Schema>,
    num_rows: Option<u64>,
}

/// Exposes a stable schema and restartable row sequences for one file
///
/// The schema is derived from the file footer on first demand and cached for
/// the lifetime of the source. Every call to [`rows`](Self::rows) opens the
/// file again, so sequences are independent of each other and of the schema.
pub struct ParquetRowSource<F: ColumnarFile = LocalParquetFile> {
    file: F,
    batch_size: usize,
    metadata: Mutex<Option<Arc<SourceMetadata>>>,
}

impl ParquetRowSource<LocalParquetFile> {
    /// Create a source for a local Parquet file. No I/O happens until first use.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::with_file(LocalParquetFile::new(path))
    }
}

impl<F: ColumnarFile> ParquetRowSource<F> {
    pub fn with_file(file: F) -> Self {
        Self {
            file,
            batch_size: DEFAULT_BATCH_SIZE,
            metadata: Mutex::new(None),
        }
    }

    /// Set the maximum number of rows decoded at once (minimum 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Ordered field list of the file, read from the footer on first call
    pub fn schema(&self) -> Result<Arc<Schema>, TapError> {
        Ok(Arc::clone(&self.metadata()?.schema))
    }

    /// Row count recorded in the footer, if the file declares one
    pub fn estimated_rows(&self) -> Result<Option<u64>, TapError> {
        Ok(self.metadata()?.num_rows)
    }

    fn metadata(&self) -> Result<Arc<SourceMetadata>, TapError> {
        // Holding the lock across the read makes concurrent first calls wait
        // for a single derivation; failures leave the cell empty
        let mut cached = self.metadata.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(metadata) = cached.as_ref() {
            return Ok(Arc::clone(metadata));
        }

        let raw = self
            .file
            .read_metadata()
            .map_err(|source| TapError::SchemaInference {
                path: self.display_path(),
                source,
            })?;

        let mut fields = Vec::with_capacity(raw.columns.len());
        for column in raw.columns {
            let field_type = map_type(&column.type_descriptor)?;
            fields.push(SchemaField::new(column.name, field_type));
        }

        debug!(
            path = %self.path().display(),
            fields = fields.len(),
            rows = ?raw.num_rows,
            "derived schema"
        );

        let metadata = Arc::new(SourceMetadata {
            schema: Arc::new(Schema::new(fields)),
            num_rows: raw.num_rows,
        });
        *cached = Some(Arc::clone(&metadata));
        Ok(metadata)
    }

    /// Open a fresh row sequence starting at the first row of the file
    pub fn rows(&self) -> Result<RowIter, TapError> {
        let batches = self
            .file
            .read_batches(self.batch_size)
            .map_err(|source| TapError::SourceRead {
                path: self.display_path(),
                source,
            })?;

        debug!(path = %self.path().display(), batch_size = self.batch_size, "opened row sequence");
        Ok(RowIter::new(self.display_path(), batches))
    }

    fn display_path(&self) -> String {
        self.path().display().to_string()
    }
}

/// Lazy sequence of records decoded one batch at a time
///
/// At most one decoded batch is held in memory. After the file is exhausted or
/// an error has been yielded the iterator is finished and the file handle has
/// been released; dropping it early releases the handle as well.
pub struct RowIter {
    path: String,
    batches: Option<BatchIter>,
    pending: std::vec::IntoIter<Record>,
    batches_read: u64,
    rows_read: u64,
}

impl RowIter {
    fn new(path: String, batches: BatchIter) -> Self {
        Self {
            path,
            batches: Some(batches),
            pending: Vec::new().into_iter(),
            batches_read: 0,
            rows_read: 0,
        }
    }

    /// Number of record batches pulled from the file so far
    pub fn batches_read(&self) -> u64 {
        self.batches_read
    }

    /// Number of records yielded so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Decoded records waiting to be yielded from the current batch
    pub fn buffered_rows(&self) -> usize {
        self.pending.len()
    }

    fn finish(&mut self) {
        self.batches = None;
        self.pending = Vec::new().into_iter();
    }
}

impl Iterator for RowIter {
    type Item = Result<Record, TapError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.next() {
                self.rows_read += 1;
                return Some(Ok(record));
            }

            let batch = match self.batches.as_mut()?.next() {
                Some(Ok(batch)) => batch,
                Some(Err(source)) => {
                    self.finish();
                    return Some(Err(TapError::BatchRead {
                        path: self.path.clone(),
                        source,
                    }));
                }
                None => {
                    trace!(path = %self.path, rows = self.rows_read, "row sequence exhausted");
                    self.finish();
                    return None;
                }
            };

            self.batches_read += 1;
            trace!(path = %self.path, rows = batch.num_rows(), "decoding record batch");

            match record_batch_to_records(&batch) {
                Ok(records) => self.pending = records.into_iter(),
                Err(source) => {
                    self.finish();
                    return Some(Err(TapError::Decode {
                        path: self.path.clone(),
                        source,
                    }));
                }
            }
        }
    }
}

impl FusedIterator for RowIter {}
