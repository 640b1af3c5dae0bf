//! Core data models for the queue-time monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One persisted queue-time observation for a single pod.
///
/// `queue_seconds` is the interval between the pod's creation and its
/// recorded start. `collected_at` is when the sample was taken; together
/// with `namespace` and `pod` it forms the exact-duplicate key for
/// idempotent appends. Field order matches the dataset CSV columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSample {
    pub collected_at: DateTime<Utc>,
    pub namespace: String,
    pub pod: String,
    pub pod_uid: String,
    pub queue_seconds: f64,
    pub created_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
}

/// A pod as seen in one cluster listing, before sample derivation.
///
/// `started_at` is absent while the pod is still pending scheduling;
/// such pods produce no sample until a later cycle observes a start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodObservation {
    pub namespace: String,
    pub name: String,
    pub uid: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
}
