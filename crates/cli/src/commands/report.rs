//! `qtm report` — aggregate the historical dataset

use anyhow::Result;
use colored::Colorize;
use monitor_lib::aggregate::{self, QueueReport};
use monitor_lib::dataset::HistoryStore;
use monitor_lib::{MonitorConfig, MonitorError};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

use crate::output::{format_duration, print_info, print_success, print_warning, OutputFormat};

/// Row for the top-namespaces table
#[derive(Tabled)]
struct NamespaceLine {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Pods")]
    count: usize,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Median")]
    median: String,
    #[tabled(rename = "Max")]
    max: String,
}

pub fn run(config: &MonitorConfig, input: Option<&Path>, format: OutputFormat) -> Result<()> {
    let dataset_path = match input {
        Some(path) => {
            // An explicitly named input must exist; only the default
            // location degrades to the empty-dataset condition.
            if !path.exists() {
                return Err(MonitorError::InputNotFound {
                    path: path.to_path_buf(),
                }
                .into());
            }
            path.to_path_buf()
        }
        None => config.dataset_path(),
    };

    if !dataset_path.exists() {
        print_warning(&format!(
            "No dataset at {}; nothing to aggregate (run `qtm collect` first)",
            dataset_path.display()
        ));
        return Ok(());
    }

    let store = HistoryStore::new(&dataset_path);
    let loaded = store.load_lenient()?;
    info!(
        rows = loaded.samples.len(),
        skipped = loaded.skipped_rows,
        path = %dataset_path.display(),
        "Loaded dataset"
    );

    let report = aggregate::aggregate(
        loaded.samples,
        loaded.skipped_rows,
        config,
        chrono::Utc::now(),
    );

    if report.is_empty() {
        print_warning("0 valid samples in the dataset; no reports written");
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_summary(&report, config),
    }

    let files = aggregate::write_reports(&report, &config.reports_dir())?;
    print_success(&format!("Reports written to {}", config.reports_dir().display()));
    for path in [
        &files.namespace_stats,
        &files.daily_stats,
        &files.top_queue_times,
        &files.summary,
    ] {
        if let Some(name) = path.file_name() {
            print_info(&format!("- {}", name.to_string_lossy()));
        }
    }

    Ok(())
}

fn print_summary(report: &QueueReport, config: &MonitorConfig) {
    let summary = &report.summary;

    println!(
        "{}",
        format!("{}-day queue time analysis", config.retention_days).bold()
    );
    println!("{}", "=".repeat(60));
    println!("Samples analyzed:  {}", summary.analyzed);
    if summary.skipped_rows > 0 {
        println!("Malformed rows:    {}", summary.skipped_rows);
    }
    println!(
        "Mean queue time:   {} ({:.2}s)",
        format_duration(summary.mean_seconds),
        summary.mean_seconds
    );
    println!(
        "Median queue time: {} ({:.2}s)",
        format_duration(summary.median_seconds),
        summary.median_seconds
    );
    println!(
        "Max queue time:    {} ({:.2}s)",
        format_duration(summary.max_seconds),
        summary.max_seconds
    );
    println!(
        "Min queue time:    {} ({:.2}s)",
        format_duration(summary.min_seconds),
        summary.min_seconds
    );
    println!();

    println!("{}", "Top namespaces by mean queue time".bold());
    let rows: Vec<NamespaceLine> = report
        .namespaces
        .iter()
        .take(10)
        .map(|ns| NamespaceLine {
            namespace: ns.namespace.clone(),
            count: ns.count,
            mean: format_duration(ns.mean_seconds),
            median: format_duration(ns.median_seconds),
            max: format_duration(ns.max_seconds),
        })
        .collect();
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}
