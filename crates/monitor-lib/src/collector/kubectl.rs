//! Pod listing via the kubectl CLI
//!
//! The cluster is reached through `kubectl get pods --all-namespaces -o
//! json` as an external subprocess; only the fields needed for
//! queue-time sampling are deserialized from its output. A non-zero exit
//! or unparseable listing is a hard failure for the cycle.

use super::PodSource;
use crate::error::MonitorError;
use crate::models::PodObservation;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

pub struct KubectlPodSource {
    kubectl_path: PathBuf,
    kubeconfig: PathBuf,
}

#[derive(Debug, Deserialize)]
struct PodList {
    #[serde(default)]
    items: Vec<PodItem>,
}

#[derive(Debug, Deserialize)]
struct PodItem {
    metadata: PodMetadata,
    #[serde(default)]
    status: PodStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodMetadata {
    namespace: String,
    name: String,
    uid: String,
    creation_timestamp: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PodStatus {
    start_time: Option<DateTime<Utc>>,
}

impl KubectlPodSource {
    pub fn new(kubectl_path: impl Into<PathBuf>, kubeconfig: impl Into<PathBuf>) -> Self {
        Self {
            kubectl_path: kubectl_path.into(),
            kubeconfig: kubeconfig.into(),
        }
    }

    fn parse_listing(json: &str) -> Result<Vec<PodObservation>, MonitorError> {
        let list: PodList = serde_json::from_str(json)?;
        Ok(list
            .items
            .into_iter()
            .map(|item| PodObservation {
                namespace: item.metadata.namespace,
                name: item.metadata.name,
                uid: item.metadata.uid,
                created_at: item.metadata.creation_timestamp,
                started_at: item.status.start_time,
            })
            .collect())
    }
}

impl PodSource for KubectlPodSource {
    fn list_pods(&self) -> Result<Vec<PodObservation>, MonitorError> {
        debug!(kubectl = %self.kubectl_path.display(), "Querying pod listing");

        let output = Command::new(&self.kubectl_path)
            .arg(format!("--kubeconfig={}", self.kubeconfig.display()))
            .args(["get", "pods", "--all-namespaces", "-o", "json"])
            .output()
            .map_err(|e| {
                MonitorError::ClusterQuery(format!(
                    "failed to run {}: {e}",
                    self.kubectl_path.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MonitorError::ClusterQuery(format!(
                "kubectl exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Self::parse_listing(&stdout)
    }
}
