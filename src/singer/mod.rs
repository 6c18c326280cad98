//! Singer protocol output: messages, catalog, and record sinks

pub mod catalog;
pub mod messages;
pub mod sink;

pub use catalog::{Catalog, CatalogEntry};
pub use messages::{Message, json_schema};
pub use sink::{JsonLinesSink, RecordSink};
