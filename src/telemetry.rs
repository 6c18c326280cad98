/// Telemetry events raised while a stream is being synced
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    /// Schema message was written and the row sequence opened
    StreamStarted,
    /// Record was handed to the sink
    RecordEmitted,
    /// Row sequence was exhausted
    StreamCompleted { batches_read: u64 },
}

/// Statistics aggregated from telemetry events
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncStats {
    pub streams_started: usize,
    pub streams_completed: usize,
    pub records_emitted: u64,
    pub batches_read: u64,
}

impl SyncStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update stats with a telemetry event
    pub fn update(&mut self, event: &TelemetryEvent) {
        match event {
            TelemetryEvent::StreamStarted => {
                self.streams_started += 1;
            }
            TelemetryEvent::RecordEmitted => {
                self.records_emitted += 1;
            }
            TelemetryEvent::StreamCompleted { batches_read } => {
                self.streams_completed += 1;
                self.batches_read += batches_read;
            }
        }
    }
}
