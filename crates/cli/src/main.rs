//! Kubernetes queue-time monitor CLI
//!
//! `qtm collect` runs one collection cycle against the cluster and
//! updates the rolling historical dataset; `qtm report` aggregates the
//! dataset into timestamped report files. Both finish in one shot and
//! are meant to be driven by an external timer (cron) and an operator.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use monitor_lib::MonitorConfig;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Kubernetes queue-time monitor
#[derive(Parser)]
#[command(name = "qtm")]
#[command(author, version, about = "Records and reports pod scheduling queue times", long_about = None)]
pub struct Cli {
    /// Directory holding the dataset and reports
    #[arg(long, env = "QTM_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Kubeconfig passed to kubectl
    #[arg(long, env = "QTM_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// kubectl binary to invoke
    #[arg(long, env = "QTM_KUBECTL_PATH")]
    pub kubectl_path: Option<PathBuf>,

    /// Rolling window horizon in days
    #[arg(long, env = "QTM_RETENTION_DAYS")]
    pub retention_days: Option<u32>,

    /// Maximum plausible queue time in days
    #[arg(long, env = "QTM_MAX_AGE_DAYS")]
    pub max_age_days: Option<u32>,

    /// Namespace to exclude from collection and reports (repeatable)
    #[arg(long = "exclude-namespace", value_name = "NAMESPACE")]
    pub exclude_namespaces: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one collection cycle and update the historical dataset
    Collect,

    /// Aggregate the historical dataset into reports
    Report {
        /// Dataset file to aggregate (defaults to the standard location)
        input: Option<PathBuf>,

        /// Number of entries in the top queue times report
        #[arg(long, env = "QTM_TOP_N")]
        top: Option<usize>,

        /// Percentile level computed per group (0-100)
        #[arg(long)]
        percentile: Option<f64>,

        /// Output format for the terminal summary
        #[arg(long, short, default_value = "table")]
        format: output::OutputFormat,
    },
}

fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout is for the report summary.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;

    match cli.command {
        Commands::Collect => commands::collect::run(&config),
        Commands::Report {
            input,
            top,
            percentile,
            format,
        } => {
            let mut config = config;
            if let Some(top) = top {
                config.top_n = top;
            }
            if let Some(percentile) = percentile {
                config.percentile = percentile;
            }
            commands::report::run(&config, input.as_deref(), format)
        }
    }
}

/// Defaults, then `QTM_*` environment, then CLI flags.
fn build_config(cli: &Cli) -> Result<MonitorConfig> {
    let mut config = MonitorConfig::load()?;
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(path) = &cli.kubeconfig {
        config.kubeconfig = path.clone();
    }
    if let Some(path) = &cli.kubectl_path {
        config.kubectl_path = path.clone();
    }
    if let Some(days) = cli.retention_days {
        config.retention_days = days;
    }
    if let Some(days) = cli.max_age_days {
        config.max_age_days = days;
    }
    if !cli.exclude_namespaces.is_empty() {
        config.exclude_namespaces = cli.exclude_namespaces.clone();
    }
    Ok(config)
}
