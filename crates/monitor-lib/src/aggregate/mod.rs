//! Dataset aggregation
//!
//! Transforms raw historical rows into summary reports: deduplicate to
//! one sample per pod per day, drop excluded namespaces and implausible
//! values, then group by namespace and by calendar day. The raw dataset
//! is read-only to this pipeline.

mod report;
mod stats;

pub use report::{
    write_reports, DailyRow, NamespaceRow, QueueReport, ReportFiles, Summary, TopRow,
};
pub use stats::QueueStats;

use crate::config::MonitorConfig;
use crate::models::QueueSample;
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Keep the most recently collected sample per `(namespace, pod)` per
/// UTC calendar day.
///
/// A pod observed several times in one day has its latest observation
/// retained, since that one reflects the most complete queue-time
/// measurement.
pub fn dedup_daily_latest(samples: Vec<QueueSample>) -> Vec<QueueSample> {
    let mut latest: BTreeMap<(String, String, NaiveDate), QueueSample> = BTreeMap::new();
    for sample in samples {
        let key = (
            sample.namespace.clone(),
            sample.pod.clone(),
            sample.collected_at.date_naive(),
        );
        match latest.get(&key) {
            Some(existing) if existing.collected_at >= sample.collected_at => {}
            _ => {
                latest.insert(key, sample);
            }
        }
    }
    latest.into_values().collect()
}

/// Drop excluded namespaces and out-of-range values.
///
/// The validity ceiling is re-applied here: retained history may predate
/// a policy change at collection time.
pub fn filter_valid(samples: Vec<QueueSample>, config: &MonitorConfig) -> Vec<QueueSample> {
    let max_age = config.max_age_seconds();
    samples
        .into_iter()
        .filter(|s| {
            !config.is_excluded(&s.namespace)
                && s.queue_seconds >= 0.0
                && s.queue_seconds <= max_age
        })
        .collect()
}

/// Build the full report from raw dataset rows.
pub fn aggregate(
    raw: Vec<QueueSample>,
    skipped_rows: usize,
    config: &MonitorConfig,
    generated_at: DateTime<Utc>,
) -> QueueReport {
    let raw_rows = raw.len();

    let deduped = dedup_daily_latest(raw);
    let deduplicated = deduped.len();
    let samples = filter_valid(deduped, config);

    debug!(
        raw_rows,
        deduplicated,
        analyzed = samples.len(),
        "Aggregation input prepared"
    );

    let mut by_namespace: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    let mut all_values = Vec::with_capacity(samples.len());
    for sample in &samples {
        by_namespace
            .entry(sample.namespace.clone())
            .or_default()
            .push(sample.queue_seconds);
        by_day
            .entry(sample.collected_at.date_naive())
            .or_default()
            .push(sample.queue_seconds);
        all_values.push(sample.queue_seconds);
    }

    let mut namespaces: Vec<NamespaceRow> = by_namespace
        .into_iter()
        .filter_map(|(namespace, values)| {
            QueueStats::compute(&values, config.percentile)
                .map(|stats| NamespaceRow::new(namespace, stats))
        })
        .collect();
    namespaces.sort_by(|a, b| {
        b.mean_seconds
            .partial_cmp(&a.mean_seconds)
            .unwrap_or(Ordering::Equal)
    });

    // BTreeMap iteration already yields days in ascending order.
    let daily: Vec<DailyRow> = by_day
        .into_iter()
        .filter_map(|(day, values)| {
            QueueStats::compute(&values, config.percentile).map(|stats| DailyRow::new(day, stats))
        })
        .collect();

    let mut longest = samples;
    longest.sort_by(|a, b| {
        b.queue_seconds
            .partial_cmp(&a.queue_seconds)
            .unwrap_or(Ordering::Equal)
    });
    let top: Vec<TopRow> = longest.into_iter().take(config.top_n).map(TopRow::from).collect();

    let overall = QueueStats::compute(&all_values, config.percentile);
    let summary = Summary::new(
        generated_at,
        raw_rows,
        skipped_rows,
        deduplicated,
        config.percentile,
        overall.as_ref(),
    );

    QueueReport {
        summary,
        namespaces,
        daily,
        top,
    }
}
