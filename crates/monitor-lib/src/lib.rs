//! Core library for the Kubernetes queue-time monitor
//!
//! This crate provides the core functionality for:
//! - Sampling pod scheduling latency ("queue time") via the kubectl CLI
//! - Maintaining a rolling-window CSV dataset with idempotent appends
//!   and time-based eviction
//! - Aggregating the retained history into grouped statistical reports
//! - Configuration from defaults, environment, and CLI overrides

pub mod aggregate;
pub mod collector;
pub mod config;
pub mod dataset;
pub mod error;
pub mod models;

pub use config::MonitorConfig;
pub use error::MonitorError;
pub use models::{PodObservation, QueueSample};
