//! `qtm collect` — run one collection cycle

use anyhow::Result;
use monitor_lib::collector::{Collector, KubectlPodSource};
use monitor_lib::dataset::HistoryStore;
use monitor_lib::MonitorConfig;

use crate::output::{print_info, print_success};

pub fn run(config: &MonitorConfig) -> Result<()> {
    let source = KubectlPodSource::new(&config.kubectl_path, &config.kubeconfig);
    let collector = Collector::new(Box::new(source));
    let store = HistoryStore::new(config.dataset_path());

    let outcome = collector.run_cycle(&store, config, chrono::Utc::now())?;

    print_success(&format!(
        "Collected {} samples ({} pending, {} excluded, {} invalid)",
        outcome.sampled, outcome.pending, outcome.excluded, outcome.invalid
    ));
    print_info(&format!(
        "Dataset: {} rows retained ({} appended, {} duplicates, {} evicted) at {}",
        outcome.append.retained,
        outcome.append.appended,
        outcome.append.duplicates,
        outcome.append.evicted,
        store.path().display()
    ));

    Ok(())
}
