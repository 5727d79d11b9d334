//! Event type definitions for progress reporting and state changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// All events emitted by the comparer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Discovery phase events
    Scan(ScanEvent),
    /// Decoding and signature events
    Hash(HashEvent),
    /// Grouping and extraction events
    Compare(CompareEvent),
    /// Move/delete events
    Reconcile(ReconcileEvent),
    /// Run-level events
    Pipeline(PipelineEvent),
    /// A named engine property changed
    Property(PropertyChange),
}

/// Events during file discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Discovery has started
    Started { roots: Vec<PathBuf> },
    /// A candidate file was accepted
    FileFound { path: PathBuf },
    /// Discovery completed
    Completed { total_files: usize },
}

/// Events while decoding images and computing signatures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HashEvent {
    /// Record building has started
    Started { total_files: usize },
    /// Progress update
    Progress(HashProgress),
    /// A file could not be decoded and was left out of every group
    Skipped { path: PathBuf, reason: String },
    /// Record building completed
    Completed { total_records: usize, skipped: usize },
}

/// Progress information while building records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashProgress {
    /// Files processed so far, including skipped ones
    pub completed: usize,
    /// Total number of files
    pub total: usize,
    /// File that was just processed
    pub current_path: PathBuf,
}

/// Events during grouping and extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompareEvent {
    /// Grouping has started
    Started { total_records: usize, algorithms: usize },
    /// One refinement pass finished
    PassCompleted { algorithm: String, groups: usize },
    /// Grouping and extraction completed
    Completed {
        total_groups: usize,
        duplicate_groups: usize,
        total_duplicates: usize,
    },
}

/// Events during reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReconcileEvent {
    /// A batch has started
    Started { action: ReconcileAction, total_files: usize },
    /// A file was moved or deleted
    FileDone { path: PathBuf },
    /// A file could not be moved or deleted; the batch continues
    FileFailed { path: PathBuf, reason: String },
    /// The batch completed, with or without failures
    Completed { succeeded: usize, failed: usize },
}

/// What a reconciliation batch does to each file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileAction {
    Move { destination: PathBuf },
    Delete,
}

/// Run-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// A run has started
    Started,
    /// A stage finished and its output was handed to the next stage
    StageCompleted { stage: PipelineStage },
    /// The run finished successfully
    Completed { summary: RunSummary },
    /// The caller declined to continue past an intermediate result
    Declined { duplicates: usize },
    /// The run was cancelled through its token
    Cancelled,
    /// A stage failed; later stages did not run
    Failed { stage: PipelineStage, message: String },
}

/// Stages of a run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineStage {
    Discovery,
    Comparison,
    Review,
    Reconciliation,
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files found by discovery
    pub total_files: usize,
    /// Files that could not be decoded
    pub skipped_files: usize,
    /// Groups with more than one member
    pub duplicate_groups: usize,
    /// Files marked as duplicates
    pub duplicate_count: usize,
    /// Files moved or deleted
    pub reconciled: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Names of the observable engine properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyName {
    Processing,
    Input,
    Output,
    PerceptualHash,
    PixelByPixel,
    Mode,
    OutputPath,
}

/// Value carried by a property change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Flag(bool),
    /// File lists are reported by size, the lists themselves stay with the engine
    Count(usize),
    Text(String),
    Path(Option<PathBuf>),
}

/// A change of one named property
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyChange {
    pub name: PropertyName,
    pub old_value: PropertyValue,
    pub new_value: PropertyValue,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStage::Discovery => write!(f, "Discovery"),
            PipelineStage::Comparison => write!(f, "Comparison"),
            PipelineStage::Review => write!(f, "Review"),
            PipelineStage::Reconciliation => write!(f, "Reconciliation"),
        }
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyName::Processing => "processing",
            PropertyName::Input => "input",
            PropertyName::Output => "output",
            PropertyName::PerceptualHash => "perceptualHash",
            PropertyName::PixelByPixel => "pixelByPixel",
            PropertyName::Mode => "mode",
            PropertyName::OutputPath => "outputPath",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Flag(value) => write!(f, "{}", value),
            PropertyValue::Count(count) => write!(f, "{} files", count),
            PropertyValue::Text(text) => write!(f, "{}", text),
            PropertyValue::Path(Some(path)) => write!(f, "{}", path.display()),
            PropertyValue::Path(None) => write!(f, "<unset>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Property(PropertyChange {
            name: PropertyName::Output,
            old_value: PropertyValue::Count(0),
            new_value: PropertyValue::Count(3),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Property(change) => {
                assert_eq!(change.name, PropertyName::Output);
                assert_eq!(change.new_value, PropertyValue::Count(3));
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn run_summary_is_serializable() {
        let summary = RunSummary {
            total_files: 1000,
            duplicate_count: 150,
            ..Default::default()
        };

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"duplicate_count\":150"));
    }

    #[test]
    fn property_values_display() {
        assert_eq!(PropertyValue::Count(2).to_string(), "2 files");
        assert_eq!(PropertyValue::Path(None).to_string(), "<unset>");
        assert_eq!(PropertyName::PixelByPixel.to_string(), "pixelByPixel");
    }
}
