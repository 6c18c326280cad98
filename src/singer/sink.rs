//! Destinations for Singer messages.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;

use super::messages::{Message, json_schema};
use crate::formats::{Record, Schema};

/// Consumer of a stream's schema and records
pub trait RecordSink {
    /// Announce the schema of `stream`; must precede its records
    fn write_schema(&mut self, stream: &str, schema: &Schema) -> Result<()>;

    fn write_record(&mut self, stream: &str, record: Record) -> Result<()>;

    fn flush(&mut self) -> Result<()>;
}

/// RecordSink that writes one Singer message per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_message(&mut self, message: &Message<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, message).context("Failed to serialize message")?;
        self.writer
            .write_all(b"\n")
            .context("Failed to write message")?;
        Ok(())
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn write_schema(&mut self, stream: &str, schema: &Schema) -> Result<()> {
        self.write_message(&Message::Schema {
            stream,
            schema: json_schema(schema),
            key_properties: Vec::new(),
        })
    }

    fn write_record(&mut self, stream: &str, record: Record) -> Result<()> {
        self.write_message(&Message::Record {
            stream,
            record: record.into_map(),
            time_extracted: Utc::now(),
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush output")
    }
}
