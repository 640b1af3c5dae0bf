//! Error taxonomy for the monitor
//!
//! Only failures that abort an invocation live here. Per-row validation
//! problems are recovered locally by the caller: the offending row is
//! skipped and counted, never fatal.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// The cluster-query collaborator failed; the collection cycle aborts
    /// with no dataset mutation.
    #[error("cluster query failed: {0}")]
    ClusterQuery(String),

    /// The collaborator's pod listing could not be interpreted.
    #[error("malformed pod listing: {0}")]
    MalformedListing(#[from] serde_json::Error),

    /// Reading or writing a persisted file failed.
    #[error("{context} {path}: {source}")]
    Persistence {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A dataset row failed to parse on the strict (append) path, where a
    /// rewrite would silently drop it.
    #[error("corrupt dataset {path}: {detail}")]
    CorruptDataset { path: PathBuf, detail: String },

    /// An explicitly supplied input path does not exist.
    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },
}

impl MonitorError {
    pub(crate) fn persistence(
        context: &'static str,
        path: &Path,
        source: std::io::Error,
    ) -> Self {
        Self::Persistence {
            context,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Unwrap the io error inside a csv error, or wrap the rest as
/// `InvalidData`.
pub(crate) fn csv_io(e: csv::Error) -> std::io::Error {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => io,
        other => std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{other:?}")),
    }
}
