//! Summary statistics over queue-time values

use serde::Serialize;

/// Count, mean, median, percentile, min and max of a value set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueStats {
    pub count: usize,
    pub mean_seconds: f64,
    pub median_seconds: f64,
    pub percentile_seconds: f64,
    pub min_seconds: f64,
    pub max_seconds: f64,
}

impl QueueStats {
    /// Compute statistics over `values`; `percentile` is a level in
    /// 0-100.
    ///
    /// Returns `None` for an empty set: callers treat "no samples" as
    /// its own condition rather than a row of zeros.
    pub fn compute(values: &[f64], percentile: f64) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;

        Some(Self {
            count,
            mean_seconds: mean,
            median_seconds: median(&sorted),
            percentile_seconds: percentile_of(&sorted, percentile),
            min_seconds: sorted[0],
            max_seconds: sorted[count - 1],
        })
    }
}

/// Median of an ascending-sorted slice.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Nearest-rank percentile of an ascending-sorted slice; `level` in
/// 0-100.
fn percentile_of(sorted: &[f64], level: f64) -> f64 {
    let level = level.clamp(0.0, 100.0);
    let index = ((level / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[index.min(sorted.len() - 1)]
}
