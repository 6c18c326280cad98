//! High-level runner API for the tap.
//!
//! This module wires configuration, stream discovery, and row sources to a
//! record sink. It is the primary API for the CLI and for embedding the tap.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::TapConfig;
use crate::formats::ParquetRowSource;
use crate::io::SourcePath;
use crate::singer::{Catalog, CatalogEntry, RecordSink};
use crate::telemetry::{SyncStats, TelemetryEvent};

/// A named stream backed by one Parquet file
pub struct ParquetStream {
    pub name: String,
    pub source: ParquetRowSource,
}

/// Options that affect how a sync is reported, not what it emits
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Draw a row progress bar on stderr when the row count is known
    pub show_progress: bool,
}

/// Result of a completed sync
#[derive(Debug)]
pub struct SyncResult {
    pub streams_synced: usize,
    pub records_emitted: u64,
    pub batches_read: u64,
    pub duration: Duration,
}

/// Build the streams described by the configuration
///
/// The configured file is exposed as a single stream named after its
/// `filepath` setting.
pub fn discover_streams(config: &TapConfig) -> Result<Vec<ParquetStream>> {
    config.validate()?;
    let path = SourcePath::parse(&config.filepath)?;

    let source = ParquetRowSource::open(path.as_path()).with_batch_size(config.batch_size);
    Ok(vec![ParquetStream {
        name: config.filepath.clone(),
        source,
    }])
}

/// Run discovery mode and return the catalog of available streams
pub fn run_discover(config: &TapConfig) -> Result<Catalog> {
    let mut entries = Vec::new();
    for stream in discover_streams(config)? {
        let schema = stream
            .source
            .schema()
            .with_context(|| format!("Failed to discover stream '{}'", stream.name))?;
        info!("Discovered stream '{}' with {} fields", stream.name, schema.len());
        entries.push(CatalogEntry::new(&stream.name, &schema));
    }
    Ok(Catalog { streams: entries })
}

/// Run sync mode, writing every stream's schema and records to `sink`
///
/// # Example
///
/// ```no_run
/// use tap_parquet::config::TapConfigBuilder;
/// use tap_parquet::runner::{SyncOptions, run_sync};
/// use tap_parquet::singer::JsonLinesSink;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = TapConfigBuilder::default()
///     .filepath("data/users.parquet")
///     .build()?;
///
/// let mut sink = JsonLinesSink::new(std::io::stdout().lock());
/// let result = run_sync(&config, &mut sink, &SyncOptions::default())?;
/// eprintln!("Emitted {} records in {:?}", result.records_emitted, result.duration);
/// # Ok(())
/// # }
/// ```
pub fn run_sync(
    config: &TapConfig,
    sink: &mut dyn RecordSink,
    options: &SyncOptions,
) -> Result<SyncResult> {
    let start_time = Instant::now();

    if let Some(start_date) = config.start_date {
        debug!(%start_date, "start_date is accepted but rows are not filtered by it");
    }

    let mut stats = SyncStats::new();
    for stream in discover_streams(config)? {
        sync_stream(&stream, sink, &mut stats, options)
            .with_context(|| format!("Failed to sync stream '{}'", stream.name))?;
    }
    sink.flush()?;

    let duration = start_time.elapsed();
    info!(
        "Sync complete: {} records from {} stream(s) in {:.2}s",
        stats.records_emitted,
        stats.streams_completed,
        duration.as_secs_f64()
    );

    Ok(SyncResult {
        streams_synced: stats.streams_completed,
        records_emitted: stats.records_emitted,
        batches_read: stats.batches_read,
        duration,
    })
}

fn sync_stream(
    stream: &ParquetStream,
    sink: &mut dyn RecordSink,
    stats: &mut SyncStats,
    options: &SyncOptions,
) -> Result<()> {
    let schema = stream.source.schema()?;
    sink.write_schema(&stream.name, &schema)?;

    let mut rows = stream.source.rows()?;
    stats.update(&TelemetryEvent::StreamStarted);
    info!("Syncing stream '{}'", stream.name);

    let progress = progress_bar(stream, options)?;
    for row in rows.by_ref() {
        sink.write_record(&stream.name, row?)?;
        stats.update(&TelemetryEvent::RecordEmitted);
        progress.inc(1);
    }
    progress.finish_and_clear();

    stats.update(&TelemetryEvent::StreamCompleted {
        batches_read: rows.batches_read(),
    });
    info!(
        "Stream '{}' complete: {} records in {} batch(es)",
        stream.name,
        rows.rows_read(),
        rows.batches_read()
    );
    Ok(())
}

fn progress_bar(stream: &ParquetStream, options: &SyncOptions) -> Result<ProgressBar> {
    if !options.show_progress {
        return Ok(ProgressBar::hidden());
    }
    let Some(total_rows) = stream.source.estimated_rows()? else {
        return Ok(ProgressBar::hidden());
    };

    let bar = ProgressBar::new(total_rows);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] Rows: [{bar:30.green/blue}] {human_pos}/{human_len} ({percent}%) | {per_sec}")?
            .progress_chars("=>-"),
    );
    Ok(bar)
}
