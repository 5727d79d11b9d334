//! # Reconcile Module
//!
//! Moves or deletes the files extraction marked as duplicates.
//!
//! ## Guarantees
//! - The destination of a move is checked before any file is touched
//! - Files are processed in parallel; one failure never stops the batch
//! - Failures are collected and reported together once every file was tried
//! - A file reported as failed is still at its source path (a move whose
//!   source removal failed leaves it at both paths)
//!
//! Moving onto an existing file name overwrites it.
//!
//! ## Example
//! ```rust,ignore
//! use duplicate_image_comparer::core::reconcile::move_files;
//!
//! let report = move_files(Path::new("/photos/duplicates"), &duplicates)?;
//! ```

mod executor;
mod types;

pub use types::{ReconcileReport, ReconciledFile};

use crate::error::{FileFailure, ReconcileError};
use crate::events::{Event, EventSender, ReconcileAction, ReconcileEvent};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Runs reconciliation batches, reporting progress on an event channel
pub struct Reconciler {
    events: EventSender,
}

impl Reconciler {
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }

    /// Move every file into `destination`
    pub fn move_files(
        &self,
        destination: &Path,
        files: &[PathBuf],
    ) -> Result<ReconcileReport, ReconcileError> {
        executor::probe_destination(destination).map_err(|reason| {
            ReconcileError::InvalidDestination {
                path: destination.to_path_buf(),
                reason,
            }
        })?;

        let occupied = occupied_names(destination, files);
        let action = ReconcileAction::Move {
            destination: destination.to_path_buf(),
        };
        self.run_batch(
            action,
            files,
            |source| {
                executor::move_into(source, destination).map(|moved| ReconciledFile {
                    source: source.to_path_buf(),
                    destination: Some(moved),
                })
            },
            |done| count_overwrites(done, &occupied),
        )
    }

    /// Permanently delete every file
    pub fn delete_files(&self, files: &[PathBuf]) -> Result<ReconcileReport, ReconcileError> {
        self.run_batch(
            ReconcileAction::Delete,
            files,
            |source| {
                executor::delete(source).map(|()| ReconciledFile {
                    source: source.to_path_buf(),
                    destination: None,
                })
            },
            |_| 0,
        )
    }

    fn run_batch<F, O>(
        &self,
        action: ReconcileAction,
        files: &[PathBuf],
        operation: F,
        overwrites: O,
    ) -> Result<ReconcileReport, ReconcileError>
    where
        F: Fn(&Path) -> Result<ReconciledFile, FileFailure> + Sync,
        O: FnOnce(&[ReconciledFile]) -> usize,
    {
        let start = Instant::now();

        let mut seen = HashSet::new();
        let files: Vec<&PathBuf> = files.iter().filter(|f| seen.insert(*f)).collect();

        tracing::info!(action = ?action, files = files.len(), "Reconciliation started");
        self.events.send(Event::Reconcile(ReconcileEvent::Started {
            action,
            total_files: files.len(),
        }));

        let outcomes: Vec<Result<ReconciledFile, FileFailure>> = files
            .par_iter()
            .map(|path| {
                let outcome = operation(path.as_path());
                match &outcome {
                    Ok(_) => {
                        self.events.send(Event::Reconcile(ReconcileEvent::FileDone {
                            path: path.to_path_buf(),
                        }));
                    }
                    Err(failure) => {
                        tracing::warn!(path = %path.display(), reason = %failure.reason, "Reconciliation failed for file");
                        self.events.send(Event::Reconcile(ReconcileEvent::FileFailed {
                            path: path.to_path_buf(),
                            reason: failure.reason.clone(),
                        }));
                    }
                }
                outcome
            })
            .collect();

        let mut done = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(file) => done.push(file),
                Err(failure) => failures.push(failure),
            }
        }

        tracing::info!(
            succeeded = done.len(),
            failed = failures.len(),
            "Reconciliation finished"
        );
        self.events.send(Event::Reconcile(ReconcileEvent::Completed {
            succeeded: done.len(),
            failed: failures.len(),
        }));

        if !failures.is_empty() {
            return Err(ReconcileError::Partial {
                succeeded: done.len(),
                failures,
            });
        }

        let overwritten = overwrites(&done);
        if overwritten > 0 {
            tracing::warn!(overwritten, "Moved files replaced files of the same name");
        }

        Ok(ReconcileReport {
            files: done,
            overwritten,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Names already taken in `destination` by files outside the batch
fn occupied_names(destination: &Path, files: &[PathBuf]) -> HashSet<OsString> {
    files
        .iter()
        .filter_map(|file| file.file_name())
        .filter(|name| {
            let target = destination.join(name);
            target.exists() && !files.contains(&target)
        })
        .map(OsStr::to_os_string)
        .collect()
}

/// Files replaced by a finished move batch.
///
/// Moves sharing a name race each other, so the count is taken per name
/// rather than per file: every successful move but the first replaces
/// something, and the first does too if the name was taken beforehand.
fn count_overwrites(done: &[ReconciledFile], occupied: &HashSet<OsString>) -> usize {
    let mut per_name: HashMap<&OsStr, usize> = HashMap::new();
    for name in done.iter().filter_map(|f| f.source.file_name()) {
        *per_name.entry(name).or_default() += 1;
    }
    per_name
        .into_iter()
        .map(|(name, moved)| {
            if occupied.contains(name) {
                moved
            } else {
                moved - 1
            }
        })
        .sum()
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(crate::events::null_sender())
    }
}

/// Move `files` into `destination`, see [`Reconciler::move_files`]
pub fn move_files(destination: &Path, files: &[PathBuf]) -> Result<ReconcileReport, ReconcileError> {
    Reconciler::default().move_files(destination, files)
}

/// Delete `files`, see [`Reconciler::delete_files`]
pub fn delete_files(files: &[PathBuf]) -> Result<ReconcileReport, ReconcileError> {
    Reconciler::default().delete_files(files)
}
