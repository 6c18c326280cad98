//! Configuration for the tap
//!
//! This module centralizes the tunable constants used throughout the tap and
//! the `TapConfig` object read from the `--config` JSON file.

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::Deserialize;

// ============================================================================
// Tap identity
// ============================================================================

pub const TAP_NAME: &str = "tap-parquet";

// ============================================================================
// Reader Configuration
// ============================================================================

/// Maximum number of rows decoded per record batch
///
/// Matches the batch size columnar readers conventionally default to. Memory
/// held by a row iterator is proportional to one batch of this many rows, so
/// lowering it bounds memory for very wide tables.
pub const DEFAULT_BATCH_SIZE: usize = 65_536;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Settings supplied to the tap through its `--config` file
#[derive(Debug, Clone, PartialEq, Deserialize, Builder)]
pub struct TapConfig {
    /// Local path or `file://` URI of the Parquet file to extract
    #[builder(setter(into))]
    pub filepath: String,

    /// Accepted for compatibility with incremental replication; not used for filtering
    #[serde(default)]
    #[builder(default, setter(strip_option))]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default = "default_batch_size")]
    #[builder(default = "DEFAULT_BATCH_SIZE")]
    pub batch_size: usize,
}

impl TapConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Invalid config file '{}'", path.display()))
    }

    /// Parse and validate a configuration document
    pub fn from_json(content: &str) -> Result<Self> {
        let config: TapConfig =
            serde_json::from_str(content).context("Failed to parse config JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.filepath.trim().is_empty() {
            bail!("'filepath' must not be empty");
        }
        if self.batch_size == 0 {
            bail!("'batch_size' must be greater than zero");
        }
        Ok(())
    }
}
