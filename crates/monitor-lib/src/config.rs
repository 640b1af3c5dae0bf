//! Monitor configuration
//!
//! One immutable configuration object, constructed at process start from
//! defaults and `QTM_*` environment variables (CLI flags override
//! individual fields before the struct is handed to the components).
//! Core logic never performs ambient lookups.

use anyhow::Result;
use chrono::Duration;
use serde::Deserialize;
use std::path::PathBuf;

/// Filename of the persisted historical dataset.
pub const DATASET_FILE: &str = "queue_time_history.csv";

/// Monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Directory holding the dataset and the reports subdirectory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Kubeconfig handed to kubectl
    #[serde(default = "default_kubeconfig")]
    pub kubeconfig: PathBuf,

    /// kubectl binary to invoke
    #[serde(default = "default_kubectl_path")]
    pub kubectl_path: PathBuf,

    /// Rolling window horizon in days
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Maximum plausible queue time in days; larger samples are invalid
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,

    /// Namespaces excluded from collection and aggregation
    #[serde(default = "default_exclude_namespaces")]
    pub exclude_namespaces: Vec<String>,

    /// Entries in the top queue times report
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Percentile level computed per group, 0-100
    #[serde(default = "default_percentile")]
    pub percentile: f64,
}

fn home_dir() -> PathBuf {
    dirs_next::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_output_dir() -> PathBuf {
    home_dir().join("k8s-queue-monitor-data")
}

fn default_kubeconfig() -> PathBuf {
    home_dir().join(".kube").join("config")
}

fn default_kubectl_path() -> PathBuf {
    PathBuf::from("kubectl")
}

fn default_retention_days() -> u32 {
    7
}

fn default_max_age_days() -> u32 {
    30
}

fn default_exclude_namespaces() -> Vec<String> {
    vec![
        "kube-system".to_string(),
        "kube-public".to_string(),
        "kube-node-lease".to_string(),
    ]
}

fn default_top_n() -> usize {
    20
}

fn default_percentile() -> f64 {
    95.0
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            kubeconfig: default_kubeconfig(),
            kubectl_path: default_kubectl_path(),
            retention_days: default_retention_days(),
            max_age_days: default_max_age_days(),
            exclude_namespaces: default_exclude_namespaces(),
            top_n: default_top_n(),
            percentile: default_percentile(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from defaults and `QTM_*` environment variables.
    ///
    /// `QTM_EXCLUDE_NAMESPACES` accepts a comma-separated list.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("QTM")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("exclude_namespaces"),
            )
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }

    /// Path of the persisted historical dataset.
    pub fn dataset_path(&self) -> PathBuf {
        self.output_dir.join(DATASET_FILE)
    }

    /// Directory receiving aggregation reports.
    pub fn reports_dir(&self) -> PathBuf {
        self.output_dir.join("reports")
    }

    /// Rolling window horizon.
    pub fn retention(&self) -> Duration {
        Duration::days(i64::from(self.retention_days))
    }

    /// Validity ceiling in seconds.
    pub fn max_age_seconds(&self) -> f64 {
        f64::from(self.max_age_days) * 86_400.0
    }

    /// Whether `namespace` is in the exclusion set.
    pub fn is_excluded(&self, namespace: &str) -> bool {
        self.exclude_namespaces.iter().any(|ns| ns == namespace)
    }
}
