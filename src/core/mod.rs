//! # Core Module
//!
//! The UI-agnostic comparison engine.
//!
//! ## Modules
//! - `scanner` - Discovers candidate images under one or more roots
//! - `hasher` - Decodes images and computes signatures
//! - `comparator` - Groups records by signature and extracts duplicates
//! - `reconcile` - Moves or deletes duplicates
//! - `pipeline` - Single-flight engine, run stages and settings

pub mod comparator;
pub mod hasher;
pub mod pipeline;
pub mod reconcile;
pub mod scanner;

// Re-export commonly used types
pub use comparator::{compare, extract_duplicates, ComparisonResult, Grouping};
pub use hasher::{AlgorithmKind, AlgorithmSet, Signature};
pub use pipeline::{ComparerProperties, ComparerSettings, ImageComparer};
pub use reconcile::{delete_files, move_files, ReconcileReport};
pub use scanner::{load_files, ImageFilter, ScanDepth, ScanMode};
