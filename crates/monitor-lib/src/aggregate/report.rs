//! Report artifacts
//!
//! One aggregation run produces four CSV files under the reports
//! directory, each named with the run timestamp, plus the in-memory
//! `QueueReport` the CLI renders. Report files are never merged with
//! prior runs and are not subject to retention pruning.

use crate::error::{csv_io, MonitorError};
use crate::models::QueueSample;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::stats::QueueStats;

/// Full output of one aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct QueueReport {
    pub summary: Summary,
    /// Per-namespace statistics, sorted by mean queue time descending
    pub namespaces: Vec<NamespaceRow>,
    /// Per-day statistics, sorted by day ascending
    pub daily: Vec<DailyRow>,
    /// Longest observed queue times, descending
    pub top: Vec<TopRow>,
}

impl QueueReport {
    /// True when no valid samples survived dedup and filtering.
    pub fn is_empty(&self) -> bool {
        self.summary.analyzed == 0
    }
}

/// Run-level counts and overall statistics.
///
/// `analyzed == 0` is the empty-dataset condition; the statistics fields
/// are zero in that case and no report files should be written.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub generated_at: DateTime<Utc>,
    /// Rows parsed from the dataset
    pub raw_rows: usize,
    /// Rows dropped at parse time
    pub skipped_rows: usize,
    /// Rows remaining after per-day deduplication
    pub deduplicated: usize,
    /// Rows remaining after exclusion and validity filters
    pub analyzed: usize,
    /// Percentile level the percentile columns were computed at
    pub percentile_level: f64,
    pub mean_seconds: f64,
    pub median_seconds: f64,
    pub percentile_seconds: f64,
    pub min_seconds: f64,
    pub max_seconds: f64,
}

impl Summary {
    pub(super) fn new(
        generated_at: DateTime<Utc>,
        raw_rows: usize,
        skipped_rows: usize,
        deduplicated: usize,
        percentile_level: f64,
        overall: Option<&QueueStats>,
    ) -> Self {
        Self {
            generated_at,
            raw_rows,
            skipped_rows,
            deduplicated,
            analyzed: overall.map_or(0, |s| s.count),
            percentile_level,
            mean_seconds: overall.map_or(0.0, |s| s.mean_seconds),
            median_seconds: overall.map_or(0.0, |s| s.median_seconds),
            percentile_seconds: overall.map_or(0.0, |s| s.percentile_seconds),
            min_seconds: overall.map_or(0.0, |s| s.min_seconds),
            max_seconds: overall.map_or(0.0, |s| s.max_seconds),
        }
    }
}

/// Per-namespace statistics row.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceRow {
    pub namespace: String,
    pub count: usize,
    pub mean_seconds: f64,
    pub median_seconds: f64,
    pub percentile_seconds: f64,
    pub min_seconds: f64,
    pub max_seconds: f64,
}

impl NamespaceRow {
    pub(super) fn new(namespace: String, stats: QueueStats) -> Self {
        Self {
            namespace,
            count: stats.count,
            mean_seconds: stats.mean_seconds,
            median_seconds: stats.median_seconds,
            percentile_seconds: stats.percentile_seconds,
            min_seconds: stats.min_seconds,
            max_seconds: stats.max_seconds,
        }
    }
}

/// Per-calendar-day statistics row.
#[derive(Debug, Clone, Serialize)]
pub struct DailyRow {
    pub day: NaiveDate,
    pub count: usize,
    pub mean_seconds: f64,
    pub median_seconds: f64,
    pub percentile_seconds: f64,
    pub min_seconds: f64,
    pub max_seconds: f64,
}

impl DailyRow {
    pub(super) fn new(day: NaiveDate, stats: QueueStats) -> Self {
        Self {
            day,
            count: stats.count,
            mean_seconds: stats.mean_seconds,
            median_seconds: stats.median_seconds,
            percentile_seconds: stats.percentile_seconds,
            min_seconds: stats.min_seconds,
            max_seconds: stats.max_seconds,
        }
    }
}

/// One of the longest-queued samples, with identifying fields.
#[derive(Debug, Clone, Serialize)]
pub struct TopRow {
    pub namespace: String,
    pub pod: String,
    pub pod_uid: String,
    pub queue_seconds: f64,
    pub created_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    pub collected_at: DateTime<Utc>,
}

impl From<QueueSample> for TopRow {
    fn from(sample: QueueSample) -> Self {
        Self {
            namespace: sample.namespace,
            pod: sample.pod,
            pod_uid: sample.pod_uid,
            queue_seconds: sample.queue_seconds,
            created_at: sample.created_at,
            started_at: sample.started_at,
            collected_at: sample.collected_at,
        }
    }
}

/// Paths of one run's report artifacts.
#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub namespace_stats: PathBuf,
    pub daily_stats: PathBuf,
    pub top_queue_times: PathBuf,
    pub summary: PathBuf,
}

/// Write each aggregate to its own timestamped CSV under `reports_dir`.
///
/// The raw dataset is never touched by this path. Callers must not
/// invoke this for an empty report.
pub fn write_reports(report: &QueueReport, reports_dir: &Path) -> Result<ReportFiles, MonitorError> {
    fs::create_dir_all(reports_dir)
        .map_err(|e| MonitorError::persistence("failed to create reports directory", reports_dir, e))?;

    let stamp = report.summary.generated_at.format("%Y%m%d_%H%M%S");
    let files = ReportFiles {
        namespace_stats: reports_dir.join(format!("namespace_stats_{stamp}.csv")),
        daily_stats: reports_dir.join(format!("daily_stats_{stamp}.csv")),
        top_queue_times: reports_dir.join(format!("top_queue_times_{stamp}.csv")),
        summary: reports_dir.join(format!("summary_{stamp}.csv")),
    };

    write_csv(&files.namespace_stats, &report.namespaces)?;
    write_csv(&files.daily_stats, &report.daily)?;
    write_csv(&files.top_queue_times, &report.top)?;
    write_csv(&files.summary, std::slice::from_ref(&report.summary))?;

    info!(dir = %reports_dir.display(), "Reports written");
    Ok(files)
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), MonitorError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| MonitorError::persistence("failed to create report", path, csv_io(e)))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| MonitorError::persistence("failed to write report", path, csv_io(e)))?;
    }
    writer
        .flush()
        .map_err(|e| MonitorError::persistence("failed to flush report", path, e))?;
    Ok(())
}
