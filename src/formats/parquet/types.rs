//! Mapping from physical column types to schema field types.
//!
//! Columns are described by a type descriptor string in the conventional
//! columnar naming (`int64`, `double`, `timestamp[us, tz=UTC]`, ...). Field
//! types are chosen by substring match so parameterized descriptors need no
//! enumeration. Patterns are tested in order and the first match wins; any new
//! pattern must be checked for overlap with the ones before it (notably `int`).
//!
//! Timezone suffixes are removed before matching, so `timestamp[us, tz=UTC]`
//! maps like `timestamp[us]` while `timestamp[ms, tz=UTC]` stays unmappable.
//! Zone names never take part in the match.

use std::borrow::Cow;

use arrow::datatypes::{DataType, Field, IntervalUnit, TimeUnit};

use crate::formats::error::TapError;
use crate::formats::reader::FieldType;

const TYPE_PATTERNS: &[(&str, FieldType)] = &[
    ("int", FieldType::Integer),
    ("double", FieldType::Number),
    ("string", FieldType::String),
    ("bool", FieldType::Boolean),
    ("timestamp[ns]", FieldType::Timestamp),
    ("timestamp[us]", FieldType::Timestamp),
];

/// Map a physical type descriptor to a schema field type
pub fn map_type(descriptor: &str) -> Result<FieldType, TapError> {
    let normalized = without_timezones(descriptor);
    TYPE_PATTERNS
        .iter()
        .find(|(pattern, _)| normalized.contains(pattern))
        .map(|(_, field_type)| *field_type)
        .ok_or_else(|| TapError::UnmappableType(descriptor.to_string()))
}

/// Drop every `, tz=<zone>` suffix inside a bracketed timestamp unit
fn without_timezones(descriptor: &str) -> Cow<'_, str> {
    const TZ_MARKER: &str = ", tz=";

    if !descriptor.contains(TZ_MARKER) {
        return Cow::Borrowed(descriptor);
    }

    let mut normalized = String::with_capacity(descriptor.len());
    let mut rest = descriptor;
    while let Some(start) = rest.find(TZ_MARKER) {
        normalized.push_str(&rest[..start]);
        match rest[start..].find(']') {
            Some(end) => rest = &rest[start + end..],
            None => {
                // Unterminated suffix; keep it verbatim
                rest = &rest[start..];
                break;
            }
        }
    }
    normalized.push_str(rest);
    Cow::Owned(normalized)
}

/// Render an Arrow data type as a physical type descriptor
pub fn type_descriptor(data_type: &DataType) -> String {
    match data_type {
        DataType::Null => "null".to_string(),
        DataType::Boolean => "bool".to_string(),
        DataType::Int8 => "int8".to_string(),
        DataType::Int16 => "int16".to_string(),
        DataType::Int32 => "int32".to_string(),
        DataType::Int64 => "int64".to_string(),
        DataType::UInt8 => "uint8".to_string(),
        DataType::UInt16 => "uint16".to_string(),
        DataType::UInt32 => "uint32".to_string(),
        DataType::UInt64 => "uint64".to_string(),
        DataType::Float16 => "halffloat".to_string(),
        DataType::Float32 => "float".to_string(),
        DataType::Float64 => "double".to_string(),
        DataType::Utf8 => "string".to_string(),
        DataType::LargeUtf8 => "large_string".to_string(),
        DataType::Utf8View => "string_view".to_string(),
        DataType::Binary => "binary".to_string(),
        DataType::LargeBinary => "large_binary".to_string(),
        DataType::BinaryView => "binary_view".to_string(),
        DataType::FixedSizeBinary(size) => format!("fixed_size_binary[{}]", size),
        DataType::Date32 => "date32[day]".to_string(),
        DataType::Date64 => "date64[ms]".to_string(),
        DataType::Time32(unit) => format!("time32[{}]", unit_suffix(unit)),
        DataType::Time64(unit) => format!("time64[{}]", unit_suffix(unit)),
        DataType::Timestamp(unit, None) => format!("timestamp[{}]", unit_suffix(unit)),
        DataType::Timestamp(unit, Some(tz)) => {
            format!("timestamp[{}, tz={}]", unit_suffix(unit), tz)
        }
        DataType::Duration(unit) => format!("duration[{}]", unit_suffix(unit)),
        DataType::Interval(IntervalUnit::YearMonth) => "month_interval".to_string(),
        DataType::Interval(IntervalUnit::DayTime) => "day_time_interval".to_string(),
        DataType::Interval(IntervalUnit::MonthDayNano) => "month_day_nano_interval".to_string(),
        DataType::Decimal128(precision, scale) => format!("decimal128({}, {})", precision, scale),
        DataType::Decimal256(precision, scale) => format!("decimal256({}, {})", precision, scale),
        DataType::List(field) => format!("list<{}>", field_descriptor(field)),
        DataType::LargeList(field) => format!("large_list<{}>", field_descriptor(field)),
        DataType::FixedSizeList(field, size) => {
            format!("fixed_size_list<{}>[{}]", field_descriptor(field), size)
        }
        DataType::Struct(fields) => {
            let inner: Vec<String> = fields.iter().map(|f| field_descriptor(f)).collect();
            format!("struct<{}>", inner.join(", "))
        }
        DataType::Map(entries, _) => match entries.data_type() {
            DataType::Struct(kv) if kv.len() == 2 => format!(
                "map<{}, {}>",
                type_descriptor(kv[0].data_type()),
                type_descriptor(kv[1].data_type())
            ),
            other => format!("map<{}>", type_descriptor(other)),
        },
        DataType::Dictionary(key, value) => format!(
            "dictionary<values={}, indices={}, ordered=0>",
            type_descriptor(value),
            type_descriptor(key)
        ),
        other => other.to_string().to_lowercase(),
    }
}

fn field_descriptor(field: &Field) -> String {
    format!("{}: {}", field.name(), type_descriptor(field.data_type()))
}

fn unit_suffix(unit: &TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}
