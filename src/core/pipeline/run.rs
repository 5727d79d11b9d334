//! Full runs: discovery, comparison, review and reconciliation as one task.

use super::comparer::ImageComparer;
use super::task::{Task, TaskHandle};
use crate::core::comparator::ComparisonResult;
use crate::core::reconcile::ReconcileReport;
use crate::error::Result;
use crate::events::{Event, PipelineEvent, PipelineStage, RunSummary};
use std::path::PathBuf;
use std::time::Instant;

/// What to do with the duplicates once they are known
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Reconciliation {
    /// Report only
    #[default]
    None,
    /// Move duplicates into the directory
    MoveTo(PathBuf),
    /// Delete duplicates permanently
    Delete,
}

/// Answer of the review step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Proceed,
    Cancel,
}

type ReviewFn = Box<dyn FnOnce(&ComparisonResult) -> ReviewDecision + Send>;

/// Parameters of one [`ImageComparer::run`]
pub struct RunRequest {
    roots: Vec<PathBuf>,
    reconciliation: Reconciliation,
    review: Option<ReviewFn>,
}

impl RunRequest {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            reconciliation: Reconciliation::None,
            review: None,
        }
    }

    pub fn reconcile(mut self, reconciliation: Reconciliation) -> Self {
        self.reconciliation = reconciliation;
        self
    }

    /// Inspect the comparison before anything is moved or deleted
    pub fn review<F>(mut self, review: F) -> Self
    where
        F: FnOnce(&ComparisonResult) -> ReviewDecision + Send + 'static,
    {
        self.review = Some(Box::new(review));
        self
    }
}

/// How a run ended, when it did not fail
#[derive(Debug)]
pub enum RunOutcome {
    Completed {
        summary: RunSummary,
        comparison: ComparisonResult,
        /// `None` when no reconciliation was requested
        report: Option<ReconcileReport>,
    },
    /// The review step declined; nothing was moved or deleted
    Declined { comparison: ComparisonResult },
}

impl RunOutcome {
    pub fn comparison(&self) -> &ComparisonResult {
        match self {
            RunOutcome::Completed { comparison, .. } | RunOutcome::Declined { comparison } => {
                comparison
            }
        }
    }
}

impl ImageComparer {
    /// Start a run on the rayon pool.
    ///
    /// The lock is taken before this returns, so a concurrent run fails here
    /// with `AlreadyProcessing`. It is released when the run ends, however
    /// it ends. `on_complete` receives the result on the worker thread.
    pub fn run<C>(&self, request: RunRequest, on_complete: C) -> Result<TaskHandle<RunOutcome>>
    where
        C: FnOnce(&Result<RunOutcome>) + Send + 'static,
    {
        let mut session = self.lock()?;
        let events = self.events().clone();
        let start = Instant::now();
        let RunRequest {
            roots,
            reconciliation,
            review,
        } = request;

        tracing::info!(roots = roots.len(), reconciliation = ?reconciliation, "Run started");
        events.send(Event::Pipeline(PipelineEvent::Started));

        let stage_events = events.clone();
        let task = Task::new(PipelineStage::Discovery, move || {
            session.load_files(&roots)?;
            Ok(session)
        })
        .then(PipelineStage::Comparison, |mut session| {
            let comparison = session.process()?;
            Ok((session, comparison))
        })
        .then(PipelineStage::Review, move |(session, comparison)| {
            let decision = match review {
                Some(review) => review(&comparison),
                None => ReviewDecision::Proceed,
            };
            Ok((session, comparison, decision))
        })
        .then(
            PipelineStage::Reconciliation,
            move |(session, comparison, decision)| {
                if decision == ReviewDecision::Cancel {
                    tracing::info!(duplicates = comparison.duplicates.len(), "Run declined at review");
                    stage_events.send(Event::Pipeline(PipelineEvent::Declined {
                        duplicates: comparison.duplicates.len(),
                    }));
                    session.release();
                    return Ok(RunOutcome::Declined { comparison });
                }

                let report = match &reconciliation {
                    Reconciliation::None => None,
                    Reconciliation::MoveTo(destination) => {
                        Some(session.move_files(destination, &comparison.duplicates)?)
                    }
                    Reconciliation::Delete => Some(session.delete_files(&comparison.duplicates)?),
                };

                let summary = RunSummary {
                    total_files: session.input().len(),
                    skipped_files: comparison.skipped.len(),
                    duplicate_groups: comparison.grouping.duplicate_groups().count(),
                    duplicate_count: comparison.duplicates.len(),
                    reconciled: report.as_ref().map(|r| r.len()).unwrap_or(0),
                    duration_ms: start.elapsed().as_millis() as u64,
                };
                session.release();

                tracing::info!(
                    files = summary.total_files,
                    duplicates = summary.duplicate_count,
                    reconciled = summary.reconciled,
                    duration_ms = summary.duration_ms,
                    "Run completed"
                );
                stage_events.send(Event::Pipeline(PipelineEvent::Completed {
                    summary: summary.clone(),
                }));

                Ok(RunOutcome::Completed {
                    summary,
                    comparison,
                    report,
                })
            },
        );

        Ok(task.spawn(events, on_complete))
    }
}
