//! Types for the reconcile module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One file that was moved or deleted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledFile {
    /// Where the file was before the batch
    pub source: PathBuf,
    /// Where it is now, `None` when it was deleted
    pub destination: Option<PathBuf>,
}

/// Result of a batch in which every file succeeded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Files in input order
    pub files: Vec<ReconciledFile>,
    /// Files that overwrote an existing file of the same name
    pub overwritten: usize,
    pub duration_ms: u64,
}

impl ReconcileReport {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
