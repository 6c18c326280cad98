//! Parquet fixtures shared by unit and integration tests.

use arrow::array::*;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Write `batches` to a temporary Parquet file with the given row group size
pub fn write_parquet_file(
    schema: SchemaRef,
    batches: &[RecordBatch],
    row_group_size: usize,
) -> NamedTempFile {
    let temp_file = NamedTempFile::new().unwrap();

    let props = WriterProperties::builder()
        .set_max_row_group_size(row_group_size)
        .build();

    let file = std::fs::File::create(temp_file.path()).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props)).unwrap();
    for batch in batches {
        writer.write(batch).unwrap();
    }
    writer.close().unwrap();

    temp_file
}

/// Helper to create a test Parquet file with `id: int32, name: string, value: double`
pub fn create_test_parquet_file(num_rows: usize, row_group_size: usize) -> NamedTempFile {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int32, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("value", DataType::Float64, true),
    ]));

    // Write data in batches
    let batch_size = 100;
    let mut batches = Vec::new();
    for start in (0..num_rows).step_by(batch_size) {
        let end = std::cmp::min(start + batch_size, num_rows);

        let id_array = Int32Array::from_iter_values(start as i32..end as i32);
        let name_array = StringArray::from_iter_values((start..end).map(|i| format!("name_{}", i)));
        let value_array = Float64Array::from_iter_values((start..end).map(|i| i as f64 * 1.5));

        batches.push(
            RecordBatch::try_new(
                schema.clone(),
                vec![
                    Arc::new(id_array),
                    Arc::new(name_array),
                    Arc::new(value_array),
                ],
            )
            .unwrap(),
        );
    }

    write_parquet_file(schema, &batches, row_group_size)
}

/// The three-row `id: int64, name: string, active: bool` users file
pub fn create_users_parquet_file() -> NamedTempFile {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("name", DataType::Utf8, true),
        Field::new("active", DataType::Boolean, true),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![1, 2, 3])),
            Arc::new(StringArray::from(vec![Some("Alice"), Some("Bob"), None])),
            Arc::new(BooleanArray::from(vec![Some(true), Some(false), Some(true)])),
        ],
    )
    .unwrap();

    write_parquet_file(schema, &[batch], 1024)
}

/// A file whose only column has a `decimal128(10, 2)` physical type
pub fn create_decimal_parquet_file() -> NamedTempFile {
    let schema = Arc::new(Schema::new(vec![Field::new(
        "amount",
        DataType::Decimal128(10, 2),
        true,
    )]));
    let amounts = Decimal128Array::from(vec![12345, 500])
        .with_precision_and_scale(10, 2)
        .unwrap();
    let batch = RecordBatch::try_new(schema.clone(), vec![Arc::new(amounts)]).unwrap();

    write_parquet_file(schema, &[batch], 1024)
}
