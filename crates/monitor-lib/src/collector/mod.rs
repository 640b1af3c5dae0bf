//! Queue-time collection
//!
//! One collection cycle lists pods through the cluster seam, derives a
//! queue-time sample for every started pod, and merges the batch into
//! the historical dataset (append + evict). A failed listing aborts the
//! cycle before any dataset mutation.

mod kubectl;

pub use kubectl::KubectlPodSource;

use crate::config::MonitorConfig;
use crate::dataset::{AppendOutcome, HistoryStore};
use crate::error::MonitorError;
use crate::models::{PodObservation, QueueSample};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Cluster seam: anything that can produce the pod listing to sample.
pub trait PodSource {
    fn list_pods(&self) -> Result<Vec<PodObservation>, MonitorError>;
}

/// Counters for one collection cycle.
#[derive(Debug, Default, Clone)]
pub struct CycleOutcome {
    /// Valid samples derived from the listing
    pub sampled: usize,
    /// Pods skipped because they have not started yet
    pub pending: usize,
    /// Pods skipped by the namespace exclusion set
    pub excluded: usize,
    /// Pods discarded by the validity filter
    pub invalid: usize,
    /// Dataset merge counters
    pub append: AppendOutcome,
}

/// Derives queue-time samples from pod observations and persists them.
pub struct Collector {
    source: Box<dyn PodSource>,
}

impl Collector {
    pub fn new(source: Box<dyn PodSource>) -> Self {
        Self { source }
    }

    /// Derive valid samples from one pod listing.
    ///
    /// Pods without a start time are skipped until a later cycle
    /// resolves them; recording an open-ended interval would skew the
    /// aggregates. Samples outside [0, max_age] are discarded as
    /// clock-skew or stale-object artifacts.
    pub fn collect(
        &self,
        config: &MonitorConfig,
        now: DateTime<Utc>,
    ) -> Result<(Vec<QueueSample>, CycleOutcome), MonitorError> {
        let pods = self.source.list_pods()?;
        let max_age = config.max_age_seconds();

        let mut outcome = CycleOutcome::default();
        let mut samples = Vec::new();

        for pod in pods {
            if config.is_excluded(&pod.namespace) {
                outcome.excluded += 1;
                continue;
            }

            let Some(started_at) = pod.started_at else {
                outcome.pending += 1;
                debug!(namespace = %pod.namespace, pod = %pod.name, "Pod not started yet, skipping");
                continue;
            };

            let queue_seconds = (started_at - pod.created_at).num_milliseconds() as f64 / 1000.0;
            if queue_seconds < 0.0 || queue_seconds > max_age {
                outcome.invalid += 1;
                debug!(
                    namespace = %pod.namespace,
                    pod = %pod.name,
                    queue_seconds,
                    "Discarding implausible queue time"
                );
                continue;
            }

            samples.push(QueueSample {
                collected_at: now,
                namespace: pod.namespace,
                pod: pod.name,
                pod_uid: pod.uid,
                queue_seconds,
                created_at: pod.created_at,
                started_at,
            });
        }

        outcome.sampled = samples.len();
        Ok((samples, outcome))
    }

    /// Run one full cycle: list, derive, append, evict.
    pub fn run_cycle(
        &self,
        store: &HistoryStore,
        config: &MonitorConfig,
        now: DateTime<Utc>,
    ) -> Result<CycleOutcome, MonitorError> {
        let (samples, mut outcome) = self.collect(config, now)?;
        outcome.append = store.append_and_evict(&samples, config.retention(), now)?;

        info!(
            sampled = outcome.sampled,
            pending = outcome.pending,
            excluded = outcome.excluded,
            invalid = outcome.invalid,
            appended = outcome.append.appended,
            retained = outcome.append.retained,
            "Collection cycle complete"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    struct StaticSource {
        pods: Vec<PodObservation>,
    }

    impl PodSource for StaticSource {
        fn list_pods(&self) -> Result<Vec<PodObservation>, MonitorError> {
            Ok(self.pods.clone())
        }
    }

    struct FailingSource;

    impl PodSource for FailingSource {
        fn list_pods(&self) -> Result<Vec<PodObservation>, MonitorError> {
            Err(MonitorError::ClusterQuery("connection refused".to_string()))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 5, 12, 0, 0).unwrap()
    }

    fn pod(namespace: &str, name: &str, queued_for: Duration) -> PodObservation {
        let created_at = now() - Duration::hours(2) - queued_for;
        PodObservation {
            namespace: namespace.to_string(),
            name: name.to_string(),
            uid: format!("uid-{name}"),
            created_at,
            started_at: Some(created_at + queued_for),
        }
    }

    fn pending_pod(namespace: &str, name: &str) -> PodObservation {
        PodObservation {
            namespace: namespace.to_string(),
            name: name.to_string(),
            uid: format!("uid-{name}"),
            created_at: now() - Duration::minutes(10),
            started_at: None,
        }
    }

    #[test]
    fn test_collect_derives_queue_seconds() {
        let collector = Collector::new(Box::new(StaticSource {
            pods: vec![pod("default", "web-1", Duration::seconds(42))],
        }));
        let config = MonitorConfig::default();

        let (samples, outcome) = collector.collect(&config, now()).unwrap();
        assert_eq!(outcome.sampled, 1);
        assert_eq!(samples[0].queue_seconds, 42.0);
        assert_eq!(samples[0].collected_at, now());
    }

    #[test]
    fn test_pending_pods_are_skipped() {
        let collector = Collector::new(Box::new(StaticSource {
            pods: vec![pending_pod("default", "web-1"), pod("default", "web-2", Duration::seconds(5))],
        }));
        let config = MonitorConfig::default();

        let (samples, outcome) = collector.collect(&config, now()).unwrap();
        assert_eq!(outcome.pending, 1);
        assert_eq!(outcome.sampled, 1);
        assert_eq!(samples[0].pod, "web-2");
    }

    #[test]
    fn test_excluded_namespaces_are_skipped() {
        let collector = Collector::new(Box::new(StaticSource {
            pods: vec![
                pod("kube-system", "coredns-1", Duration::seconds(3)),
                pod("default", "web-1", Duration::seconds(3)),
            ],
        }));
        let config = MonitorConfig::default();

        let (samples, outcome) = collector.collect(&config, now()).unwrap();
        assert_eq!(outcome.excluded, 1);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].namespace, "default");
    }

    #[test]
    fn test_validity_ceiling() {
        let collector = Collector::new(Box::new(StaticSource {
            pods: vec![
                pod("default", "too-old", Duration::days(31)),
                pod("default", "plausible", Duration::days(29)),
            ],
        }));
        let config = MonitorConfig::default();

        let (samples, outcome) = collector.collect(&config, now()).unwrap();
        assert_eq!(outcome.invalid, 1);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].pod, "plausible");
    }

    #[test]
    fn test_negative_queue_time_is_invalid() {
        let created_at = now();
        let collector = Collector::new(Box::new(StaticSource {
            pods: vec![PodObservation {
                namespace: "default".to_string(),
                name: "skewed".to_string(),
                uid: "uid-skewed".to_string(),
                created_at,
                started_at: Some(created_at - Duration::seconds(30)),
            }],
        }));
        let config = MonitorConfig::default();

        let (samples, outcome) = collector.collect(&config, now()).unwrap();
        assert!(samples.is_empty());
        assert_eq!(outcome.invalid, 1);
    }

    #[test]
    fn test_run_cycle_persists_batch() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        let collector = Collector::new(Box::new(StaticSource {
            pods: vec![pod("default", "web-1", Duration::seconds(10))],
        }));
        let config = MonitorConfig::default();

        let outcome = collector.run_cycle(&store, &config, now()).unwrap();
        assert_eq!(outcome.append.appended, 1);
        assert_eq!(store.load_strict().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_listing_leaves_dataset_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");
        let store = HistoryStore::new(&path);
        let collector = Collector::new(Box::new(FailingSource));
        let config = MonitorConfig::default();

        let err = collector.run_cycle(&store, &config, now()).unwrap_err();
        assert!(matches!(err, MonitorError::ClusterQuery(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_rerun_same_listing_appends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.csv"));
        let collector = Collector::new(Box::new(StaticSource {
            pods: vec![pod("default", "web-1", Duration::seconds(10))],
        }));
        let config = MonitorConfig::default();

        collector.run_cycle(&store, &config, now()).unwrap();
        // Same listing, same instant: the duplicate key is skipped.
        let second = collector.run_cycle(&store, &config, now()).unwrap();
        assert_eq!(second.append.appended, 0);
        assert_eq!(second.append.duplicates, 1);
        assert_eq!(store.load_strict().unwrap().len(), 1);
    }
}
