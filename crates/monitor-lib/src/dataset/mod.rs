//! Rolling-window dataset persistence
//!
//! The historical dataset is a single CSV file holding every retained
//! `QueueSample`. Mutation follows append-then-atomic-rewrite-on-evict:
//! the current window is loaded, new rows merged in, expired rows
//! dropped, and the result written to a temp file that is renamed over
//! the original, so a concurrent reader never observes a half-written
//! file.

use crate::error::{csv_io, MonitorError};
use crate::models::QueueSample;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Flat-table store for the historical dataset.
///
/// The CSV file stays behind load/append/evict so it could later be
/// swapped for an embedded database without touching collection or
/// aggregation logic.
pub struct HistoryStore {
    path: PathBuf,
}

/// Counters from merging one collection batch into the store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Batch rows actually appended
    pub appended: usize,
    /// Batch rows skipped because an identical key was already present
    pub duplicates: usize,
    /// Previously retained rows dropped by eviction
    pub evicted: usize,
    /// Rows in the dataset after the rewrite
    pub retained: usize,
}

/// Lenient load result: parsed rows plus the count of rows that did not
/// parse.
#[derive(Debug, Default)]
pub struct LoadedHistory {
    pub samples: Vec<QueueSample>,
    pub skipped_rows: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every row, requiring all of them to parse.
    ///
    /// Used on the append path: the subsequent rewrite would silently
    /// drop any row we cannot parse, so corruption here fails the cycle
    /// instead of truncating history.
    pub fn load_strict(&self) -> Result<Vec<QueueSample>, MonitorError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|e| MonitorError::persistence("failed to open dataset", &self.path, csv_io(e)))?;

        let mut samples = Vec::new();
        for row in reader.deserialize() {
            let sample: QueueSample = row.map_err(|e| MonitorError::CorruptDataset {
                path: self.path.clone(),
                detail: e.to_string(),
            })?;
            samples.push(sample);
        }
        Ok(samples)
    }

    /// Load every parseable row, counting the rest.
    ///
    /// Used on the aggregation path, where a malformed row is skipped and
    /// counted rather than failing the run.
    pub fn load_lenient(&self) -> Result<LoadedHistory, MonitorError> {
        let mut loaded = LoadedHistory::default();
        if !self.path.exists() {
            return Ok(loaded);
        }

        let mut reader = csv::Reader::from_path(&self.path)
            .map_err(|e| MonitorError::persistence("failed to open dataset", &self.path, csv_io(e)))?;

        for row in reader.deserialize::<QueueSample>() {
            match row {
                Ok(sample) => loaded.samples.push(sample),
                Err(e) => {
                    loaded.skipped_rows += 1;
                    warn!(error = %e, "Skipping malformed dataset row");
                }
            }
        }
        Ok(loaded)
    }

    /// Merge a batch into the dataset, evict rows older than
    /// `now - retention`, and rewrite atomically.
    ///
    /// Appends are idempotent: a batch row whose
    /// `(namespace, pod, collected_at)` key is already present is
    /// skipped. Creates the dataset (and parent directories) on first
    /// use.
    pub fn append_and_evict(
        &self,
        batch: &[QueueSample],
        retention: Duration,
        now: DateTime<Utc>,
    ) -> Result<AppendOutcome, MonitorError> {
        let mut samples = self.load_strict()?;

        let mut seen: HashSet<(String, String, DateTime<Utc>)> = samples
            .iter()
            .map(|s| (s.namespace.clone(), s.pod.clone(), s.collected_at))
            .collect();

        let mut outcome = AppendOutcome::default();
        for sample in batch {
            let key = (sample.namespace.clone(), sample.pod.clone(), sample.collected_at);
            if seen.insert(key) {
                samples.push(sample.clone());
                outcome.appended += 1;
            } else {
                outcome.duplicates += 1;
            }
        }

        let cutoff = now - retention;
        let before = samples.len();
        samples.retain(|s| s.collected_at >= cutoff);
        outcome.evicted = before - samples.len();
        outcome.retained = samples.len();

        self.write_atomic(&samples)?;

        info!(
            appended = outcome.appended,
            duplicates = outcome.duplicates,
            evicted = outcome.evicted,
            retained = outcome.retained,
            path = %self.path.display(),
            "Dataset updated"
        );

        Ok(outcome)
    }

    /// Drop rows older than `now - retention` without appending anything.
    pub fn evict(
        &self,
        retention: Duration,
        now: DateTime<Utc>,
    ) -> Result<AppendOutcome, MonitorError> {
        self.append_and_evict(&[], retention, now)
    }

    /// Rewrite the dataset through a temp file plus rename.
    fn write_atomic(&self, samples: &[QueueSample]) -> Result<(), MonitorError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MonitorError::persistence("failed to create dataset directory", parent, e))?;
        }

        let temp_path = self.path.with_extension("csv.tmp");
        let mut file = fs::File::create(&temp_path)
            .map_err(|e| MonitorError::persistence("failed to create temp dataset", &temp_path, e))?;

        {
            let mut writer = csv::Writer::from_writer(&mut file);
            for sample in samples {
                writer.serialize(sample).map_err(|e| {
                    MonitorError::persistence("failed to write dataset", &temp_path, csv_io(e))
                })?;
            }
            // An empty dataset still gets its header row.
            if samples.is_empty() {
                writer
                    .write_record([
                        "collected_at",
                        "namespace",
                        "pod",
                        "pod_uid",
                        "queue_seconds",
                        "created_at",
                        "started_at",
                    ])
                    .map_err(|e| {
                        MonitorError::persistence("failed to write dataset", &temp_path, csv_io(e))
                    })?;
            }
            writer.flush().map_err(|e| {
                MonitorError::persistence("failed to flush dataset", &temp_path, e)
            })?;
        }

        file.sync_all()
            .map_err(|e| MonitorError::persistence("failed to sync dataset", &temp_path, e))?;

        fs::rename(&temp_path, &self.path)
            .map_err(|e| MonitorError::persistence("failed to replace dataset", &self.path, e))?;

        Ok(())
    }
}
