//! # Error Module
//!
//! Error types for the duplicate image comparer.
//!
//! ## Taxonomy
//! - **Decode failures** (`HashError`) are recoverable: the file is skipped
//!   and the comparison continues
//! - **Discovery failures** (`ScanError`) abort the `load_files` call
//! - **Reconciliation failures** (`ReconcileError`) are reported after every
//!   file in the batch has been attempted
//! - **Concurrency violations** (`ComparerError::AlreadyProcessing`) are
//!   caller bugs and are always surfaced

use std::path::PathBuf;
use thiserror::Error;

/// Top-level engine error
#[derive(Error, Debug)]
pub enum ComparerError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("A comparison is already in progress")]
    AlreadyProcessing,

    #[error("Run was cancelled")]
    Cancelled,

    #[error("Stage '{stage}' panicked: {message}")]
    TaskPanicked { stage: String, message: String },

    #[error("Settings error for {path}: {reason}")]
    Settings { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur during file discovery
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File filter failed on {path}: {source}")]
    Predicate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while decoding an image or computing a signature
#[derive(Error, Debug)]
pub enum HashError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeError { path: PathBuf, reason: String },

    #[error("Image is empty: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single file that could not be moved or deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Errors that occur while moving or deleting duplicates
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Destination {path} is not usable: {reason}")]
    InvalidDestination { path: PathBuf, reason: String },

    #[error("{} of {} files failed: {}", .failures.len(), .failures.len() + .succeeded, summarize(.failures))]
    Partial {
        succeeded: usize,
        failures: Vec<FileFailure>,
    },
}

impl ReconcileError {
    /// Files that could not be processed, empty for precondition failures
    pub fn failures(&self) -> &[FileFailure] {
        match self {
            ReconcileError::Partial { failures, .. } => failures,
            ReconcileError::InvalidDestination { .. } => &[],
        }
    }
}

fn summarize(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.path.display(), f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, ComparerError>;
