//! Conversion from Arrow RecordBatch to row-based Records.
//!
//! Each column is converted to JSON values first, then the columns are
//! transposed into one `Record` per row. Nulls become JSON `null` and values
//! with no exact JSON number form (decimals, non-finite floats) are rendered
//! as strings or null respectively.

use arrow::array::*;
use arrow::compute::cast;
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Date64Type, Decimal128Type, Decimal256Type,
    DurationMicrosecondType, DurationMillisecondType, DurationNanosecondType,
    DurationSecondType, Float16Type, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type,
    Int64Type, Time32MillisecondType, Time32SecondType, Time64MicrosecondType,
    Time64NanosecondType, TimeUnit, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType, UInt8Type, UInt16Type, UInt32Type, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::formats::error::ColumnarError;
use crate::formats::reader::Record;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Convert an Arrow RecordBatch to a vector of Records
pub fn record_batch_to_records(batch: &RecordBatch) -> Result<Vec<Record>, ColumnarError> {
    let num_rows = batch.num_rows();
    if num_rows == 0 {
        return Ok(Vec::new());
    }

    let schema = batch.schema();
    let mut columns = Vec::with_capacity(batch.num_columns());
    for (field, array) in schema.fields().iter().zip(batch.columns()) {
        let values = array_to_values(array.as_ref()).map_err(|e| {
            ColumnarError::Conversion(format!(
                "Failed to convert column '{}' ({}): {}",
                field.name(),
                array.data_type(),
                e
            ))
        })?;
        columns.push((field.name(), values.into_iter()));
    }

    // Transpose to rows
    let mut records = Vec::with_capacity(num_rows);
    for _ in 0..num_rows {
        let mut fields = Map::with_capacity(columns.len());
        for (name, values) in columns.iter_mut() {
            fields.insert(name.to_string(), values.next().unwrap_or(Value::Null));
        }
        records.push(Record { fields });
    }

    Ok(records)
}

/// Convert an Arrow array to one JSON value per slot
pub(crate) fn array_to_values(array: &dyn Array) -> Result<Vec<Value>, ColumnarError> {
    let values = match array.data_type() {
        DataType::Null => vec![Value::Null; array.len()],
        DataType::Boolean => {
            let arr = as_boolean_array(array);
            collect_values(array, |i| Ok(Value::Bool(arr.value(i))))?
        }
        DataType::Int8 => convert_primitive::<Int8Type>(array),
        DataType::Int16 => convert_primitive::<Int16Type>(array),
        DataType::Int32 => convert_primitive::<Int32Type>(array),
        DataType::Int64 => convert_primitive::<Int64Type>(array),
        DataType::UInt8 => convert_primitive::<UInt8Type>(array),
        DataType::UInt16 => convert_primitive::<UInt16Type>(array),
        DataType::UInt32 => convert_primitive::<UInt32Type>(array),
        DataType::UInt64 => convert_primitive::<UInt64Type>(array),
        DataType::Float16 => {
            let arr = as_primitive_array::<Float16Type>(array);
            collect_values(array, |i| Ok(Value::from(arr.value(i).to_f64())))?
        }
        // Non-finite floats have no JSON form and become null
        DataType::Float32 => convert_primitive::<Float32Type>(array),
        DataType::Float64 => convert_primitive::<Float64Type>(array),
        DataType::Utf8 => {
            let arr = as_string_array(array);
            collect_values(array, |i| Ok(Value::String(arr.value(i).to_string())))?
        }
        DataType::LargeUtf8 => {
            let arr = as_largestring_array(array);
            collect_values(array, |i| Ok(Value::String(arr.value(i).to_string())))?
        }
        DataType::Utf8View => {
            let arr = array.as_string_view();
            collect_values(array, |i| Ok(Value::String(arr.value(i).to_string())))?
        }
        DataType::Binary => {
            let arr = as_generic_binary_array::<i32>(array);
            collect_values(array, |i| Ok(Value::String(hex::encode(arr.value(i)))))?
        }
        DataType::LargeBinary => {
            let arr = as_generic_binary_array::<i64>(array);
            collect_values(array, |i| Ok(Value::String(hex::encode(arr.value(i)))))?
        }
        DataType::BinaryView => {
            let arr = array.as_binary_view();
            collect_values(array, |i| Ok(Value::String(hex::encode(arr.value(i)))))?
        }
        DataType::FixedSizeBinary(_) => {
            let arr = array.as_fixed_size_binary();
            collect_values(array, |i| Ok(Value::String(hex::encode(arr.value(i)))))?
        }
        DataType::Date32 => {
            let arr = as_primitive_array::<Date32Type>(array);
            collect_values(array, |i| {
                let days = arr.value(i);
                let date = days
                    .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
                    .and_then(NaiveDate::from_num_days_from_ce_opt)
                    .ok_or_else(|| invalid_value("date", days))?;
                Ok(Value::String(date.format("%Y-%m-%d").to_string()))
            })?
        }
        DataType::Date64 => {
            let arr = as_primitive_array::<Date64Type>(array);
            collect_values(array, |i| {
                let millis = arr.value(i);
                let datetime =
                    DateTime::from_timestamp_millis(millis).ok_or_else(|| invalid_value("date", millis))?;
                Ok(Value::String(datetime.format("%Y-%m-%d").to_string()))
            })?
        }
        DataType::Timestamp(unit, _) => convert_timestamp(array, unit)?,
        DataType::Time32(TimeUnit::Second) => {
            convert_time::<Time32SecondType>(array, NANOS_PER_SECOND)?
        }
        DataType::Time32(TimeUnit::Millisecond) => {
            convert_time::<Time32MillisecondType>(array, 1_000_000)?
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            convert_time::<Time64MicrosecondType>(array, 1_000)?
        }
        DataType::Time64(TimeUnit::Nanosecond) => {
            convert_time::<Time64NanosecondType>(array, 1)?
        }
        DataType::Duration(TimeUnit::Second) => convert_primitive::<DurationSecondType>(array),
        DataType::Duration(TimeUnit::Millisecond) => {
            convert_primitive::<DurationMillisecondType>(array)
        }
        DataType::Duration(TimeUnit::Microsecond) => {
            convert_primitive::<DurationMicrosecondType>(array)
        }
        DataType::Duration(TimeUnit::Nanosecond) => {
            convert_primitive::<DurationNanosecondType>(array)
        }
        DataType::Decimal128(_, scale) => {
            let arr = as_primitive_array::<Decimal128Type>(array);
            collect_values(array, |i| {
                Ok(Value::String(format_decimal(&arr.value(i).to_string(), *scale)))
            })?
        }
        DataType::Decimal256(_, scale) => {
            let arr = as_primitive_array::<Decimal256Type>(array);
            collect_values(array, |i| {
                Ok(Value::String(format_decimal(&arr.value(i).to_string(), *scale)))
            })?
        }
        DataType::List(_) => {
            let arr = as_list_array(array);
            collect_values(array, |i| Ok(Value::Array(array_to_values(arr.value(i).as_ref())?)))?
        }
        DataType::LargeList(_) => {
            let arr = as_large_list_array(array);
            collect_values(array, |i| Ok(Value::Array(array_to_values(arr.value(i).as_ref())?)))?
        }
        DataType::FixedSizeList(_, _) => {
            let arr = as_fixed_size_list_array(array);
            collect_values(array, |i| Ok(Value::Array(array_to_values(arr.value(i).as_ref())?)))?
        }
        DataType::Struct(_) => convert_struct(as_struct_array(array))?,
        DataType::Map(_, _) => {
            // Entries become [key, value] pairs; keys need not be strings
            let arr = as_map_array(array);
            collect_values(array, |i| {
                let entries = arr.value(i);
                let keys = array_to_values(entries.column(0).as_ref())?;
                let values = array_to_values(entries.column(1).as_ref())?;
                Ok(Value::Array(
                    keys.into_iter()
                        .zip(values)
                        .map(|(k, v)| Value::Array(vec![k, v]))
                        .collect(),
                ))
            })?
        }
        DataType::Dictionary(_, value_type) => {
            let decoded = cast(array, value_type)?;
            array_to_values(decoded.as_ref())?
        }
        other => {
            return Err(ColumnarError::Conversion(format!(
                "Unsupported array type for conversion: {:?}",
                other
            )));
        }
    };

    Ok(values)
}

/// Map each non-null slot through `value_at`, emitting null for null slots
fn collect_values<F>(array: &dyn Array, mut value_at: F) -> Result<Vec<Value>, ColumnarError>
where
    F: FnMut(usize) -> Result<Value, ColumnarError>,
{
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Ok(Value::Null)
            } else {
                value_at(i)
            }
        })
        .collect()
}

/// Helper to convert primitive arrays
fn convert_primitive<T: ArrowPrimitiveType>(array: &dyn Array) -> Vec<Value>
where
    T::Native: Into<Value>,
{
    let arr = as_primitive_array::<T>(array);
    (0..arr.len())
        .map(|i| {
            if arr.is_null(i) {
                Value::Null
            } else {
                arr.value(i).into()
            }
        })
        .collect()
}

/// Convert timestamp arrays to RFC 3339 strings in UTC
fn convert_timestamp(array: &dyn Array, unit: &TimeUnit) -> Result<Vec<Value>, ColumnarError> {
    match unit {
        TimeUnit::Second => timestamp_values::<TimestampSecondType>(array, |v| {
            DateTime::from_timestamp(v, 0)
        }),
        TimeUnit::Millisecond => {
            timestamp_values::<TimestampMillisecondType>(array, DateTime::from_timestamp_millis)
        }
        TimeUnit::Microsecond => {
            timestamp_values::<TimestampMicrosecondType>(array, DateTime::from_timestamp_micros)
        }
        TimeUnit::Nanosecond => timestamp_values::<TimestampNanosecondType>(array, |v| {
            Some(DateTime::from_timestamp_nanos(v))
        }),
    }
}

fn timestamp_values<T>(
    array: &dyn Array,
    to_datetime: impl Fn(i64) -> Option<DateTime<Utc>>,
) -> Result<Vec<Value>, ColumnarError>
where
    T: ArrowPrimitiveType<Native = i64>,
{
    let arr = as_primitive_array::<T>(array);
    collect_values(array, |i| {
        let raw = arr.value(i);
        let datetime = to_datetime(raw).ok_or_else(|| invalid_value("timestamp", raw))?;
        Ok(Value::String(
            datetime.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        ))
    })
}

/// Convert time-of-day arrays to `HH:MM:SS[.fraction]` strings
fn convert_time<T>(array: &dyn Array, nanos_per_unit: i64) -> Result<Vec<Value>, ColumnarError>
where
    T: ArrowPrimitiveType,
    T::Native: Into<i64>,
{
    let arr = as_primitive_array::<T>(array);
    collect_values(array, |i| {
        let raw: i64 = arr.value(i).into();
        let nanos = raw
            .checked_mul(nanos_per_unit)
            .ok_or_else(|| invalid_value("time", raw))?;
        let time = u32::try_from(nanos / NANOS_PER_SECOND)
            .ok()
            .zip(u32::try_from(nanos % NANOS_PER_SECOND).ok())
            .and_then(|(secs, frac)| NaiveTime::from_num_seconds_from_midnight_opt(secs, frac))
            .ok_or_else(|| invalid_value("time", raw))?;
        Ok(Value::String(time.format("%H:%M:%S%.f").to_string()))
    })
}

/// Convert a struct array to one JSON object per row
fn convert_struct(arr: &StructArray) -> Result<Vec<Value>, ColumnarError> {
    let mut children = Vec::with_capacity(arr.num_columns());
    for (name, column) in arr.column_names().into_iter().zip(arr.columns()) {
        children.push((name, array_to_values(column.as_ref())?.into_iter()));
    }

    let mut values = Vec::with_capacity(arr.len());
    for i in 0..arr.len() {
        let mut object = Map::with_capacity(children.len());
        for (name, child) in children.iter_mut() {
            object.insert(name.to_string(), child.next().unwrap_or(Value::Null));
        }
        values.push(if arr.is_null(i) {
            Value::Null
        } else {
            Value::Object(object)
        });
    }
    Ok(values)
}

fn invalid_value(kind: &str, raw: impl std::fmt::Display) -> ColumnarError {
    ColumnarError::Conversion(format!("Invalid {} value: {}", kind, raw))
}

/// Format the integer digits of a decimal with the given scale
fn format_decimal(unscaled: &str, scale: i8) -> String {
    let (sign, digits) = match unscaled.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", unscaled),
    };

    if scale <= 0 {
        if digits == "0" {
            return "0".to_string();
        }
        let zeros = "0".repeat(scale.unsigned_abs() as usize);
        return format!("{}{}{}", sign, digits, zeros);
    }

    let scale = scale as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
    } else {
        digits.to_string()
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - scale);
    format!("{}{}.{}", sign, int_part, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, Float64Array, Int32Array, Int64Array, StringArray};
    use arrow::buffer::OffsetBuffer;
    use arrow::datatypes::{Field, Schema};
    use serde_json::json;
    use std::f64;
    use std::sync::Arc;

    fn single_column_batch(name: &str, array: ArrayRef) -> RecordBatch {
        let schema = Schema::new(vec![Field::new(name, array.data_type().clone(), true)]);
        RecordBatch::try_new(Arc::new(schema), vec![array]).unwrap()
    }

    fn column_values(batch: &RecordBatch, name: &str) -> Vec<Value> {
        record_batch_to_records(batch)
            .unwrap()
            .into_iter()
            .map(|r| r.get(name).cloned().unwrap())
            .collect()
    }

    #[test]
    fn test_record_batch_to_records_integers() {
        let schema = Schema::new(vec![
            Field::new("int32", DataType::Int32, false),
            Field::new("int64", DataType::Int64, false),
        ]);

        let int32_array = Int32Array::from(vec![1, 2, 3]);
        let int64_array = Int64Array::from(vec![100, 200, 300]);

        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(int32_array), Arc::new(int64_array)],
        )
        .unwrap();

        let records = record_batch_to_records(&batch).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("int32"), Some(&json!(1)));
        assert_eq!(records[0].get("int64"), Some(&json!(100)));
        assert_eq!(records[2].get("int32"), Some(&json!(3)));
        assert_eq!(records[2].get("int64"), Some(&json!(300)));
    }

    #[test]
    fn test_record_preserves_column_order() {
        let schema = Schema::new(vec![
            Field::new("zeta", DataType::Int32, false),
            Field::new("alpha", DataType::Int32, false),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int32Array::from(vec![1])),
                Arc::new(Int32Array::from(vec![2])),
            ],
        )
        .unwrap();

        let records = record_batch_to_records(&batch).unwrap();
        let keys: Vec<&String> = records[0].fields.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_record_batch_to_records_strings() {
        let batch = single_column_batch(
            "name",
            Arc::new(StringArray::from(vec![Some("Alice"), None, Some("Bob")])),
        );

        assert_eq!(
            column_values(&batch, "name"),
            vec![json!("Alice"), Value::Null, json!("Bob")]
        );
    }

    #[test]
    fn test_record_batch_to_records_floats() {
        let batch = single_column_batch(
            "value",
            Arc::new(Float64Array::from(vec![1.5, f64::consts::PI, f64::NAN])),
        );

        assert_eq!(
            column_values(&batch, "value"),
            vec![json!(1.5), json!(f64::consts::PI), Value::Null]
        );
    }

    #[test]
    fn test_record_batch_to_records_booleans() {
        let batch = single_column_batch(
            "flag",
            Arc::new(BooleanArray::from(vec![Some(true), Some(false), None])),
        );

        assert_eq!(
            column_values(&batch, "flag"),
            vec![json!(true), json!(false), Value::Null]
        );
    }

    #[test]
    fn test_record_batch_to_records_dates() {
        // 18993 = 2022-01-01
        let batch = single_column_batch("date", Arc::new(Date32Array::from(vec![0, 18993])));

        assert_eq!(
            column_values(&batch, "date"),
            vec![json!("1970-01-01"), json!("2022-01-01")]
        );
    }

    #[test]
    fn test_record_batch_to_records_timestamps() {
        let micros = TimestampMicrosecondArray::from(vec![Some(1_609_459_200_000_000), None])
            .with_timezone("UTC");
        let nanos = TimestampNanosecondArray::from(vec![1_609_459_200_123_456_789]);

        let micros_batch = single_column_batch("ts", Arc::new(micros));
        let nanos_batch = single_column_batch("ts", Arc::new(nanos));

        assert_eq!(
            column_values(&micros_batch, "ts"),
            vec![json!("2021-01-01T00:00:00Z"), Value::Null]
        );
        assert_eq!(
            column_values(&nanos_batch, "ts"),
            vec![json!("2021-01-01T00:00:00.123456789Z")]
        );
    }

    #[test]
    fn test_record_batch_to_records_time_of_day() {
        let batch = single_column_batch(
            "t",
            Arc::new(Time64MicrosecondArray::from(vec![3_723_500_000])),
        );

        assert_eq!(column_values(&batch, "t"), vec![json!("01:02:03.500")]);
    }

    #[test]
    fn test_record_batch_to_records_decimals() {
        let decimals = Decimal128Array::from(vec![Some(12345), Some(-5), None])
            .with_precision_and_scale(10, 2)
            .unwrap();
        let batch = single_column_batch("amount", Arc::new(decimals));

        assert_eq!(
            column_values(&batch, "amount"),
            vec![json!("123.45"), json!("-0.05"), Value::Null]
        );
    }

    #[test]
    fn test_record_batch_to_records_binary() {
        let batch = single_column_batch(
            "blob",
            Arc::new(BinaryArray::from(vec![&b"\x01\xff"[..]])),
        );

        assert_eq!(column_values(&batch, "blob"), vec![json!("01ff")]);
    }

    #[test]
    fn test_record_batch_to_records_lists() {
        let list = ListArray::new(
            Arc::new(Field::new("item", DataType::Int32, true)),
            OffsetBuffer::from_lengths([2, 0, 1]),
            Arc::new(Int32Array::from(vec![1, 2, 3])),
            None,
        );
        let batch = single_column_batch("tags", Arc::new(list));

        assert_eq!(
            column_values(&batch, "tags"),
            vec![json!([1, 2]), json!([]), json!([3])]
        );
    }

    #[test]
    fn test_record_batch_to_records_structs() {
        let point = StructArray::from(vec![
            (
                Arc::new(Field::new("x", DataType::Float64, false)),
                Arc::new(Float64Array::from(vec![1.5, 2.5])) as ArrayRef,
            ),
            (
                Arc::new(Field::new("label", DataType::Utf8, true)),
                Arc::new(StringArray::from(vec![Some("a"), None])) as ArrayRef,
            ),
        ]);
        let batch = single_column_batch("point", Arc::new(point));

        assert_eq!(
            column_values(&batch, "point"),
            vec![
                json!({"x": 1.5, "label": "a"}),
                json!({"x": 2.5, "label": null})
            ]
        );
    }

    #[test]
    fn test_record_batch_to_records_dictionary() {
        let dict: DictionaryArray<Int32Type> = vec!["red", "blue", "red"].into_iter().collect();
        let batch = single_column_batch("color", Arc::new(dict));

        assert_eq!(
            column_values(&batch, "color"),
            vec![json!("red"), json!("blue"), json!("red")]
        );
    }

    #[test]
    fn test_record_batch_to_records_unsupported_type() {
        let intervals = IntervalYearMonthArray::from(vec![1]);
        let batch = single_column_batch("span", Arc::new(intervals));

        let err = record_batch_to_records(&batch).unwrap_err();
        assert!(err.to_string().contains("Failed to convert column 'span'"));
    }

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal("12345", 2), "123.45");
        assert_eq!(format_decimal("1", 2), "0.01");
        assert_eq!(format_decimal("100", 2), "1.00");
        assert_eq!(format_decimal("-12345", 2), "-123.45");
        assert_eq!(format_decimal("-5", 1), "-0.5");
        assert_eq!(format_decimal("12345", 0), "12345");
        assert_eq!(format_decimal("12", -2), "1200");
        assert_eq!(format_decimal("0", -2), "0");
    }

    #[test]
    fn test_record_batch_to_records_empty() {
        let batch = single_column_batch("id", Arc::new(Int32Array::from(Vec::<i32>::new())));

        let records = record_batch_to_records(&batch).unwrap();

        assert_eq!(records.len(), 0);
    }
}
