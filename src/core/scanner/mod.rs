//! # Scanner Module
//!
//! Discovers candidate image files under one or more roots.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - WebP (.webp)
//! - GIF (.gif)
//! - BMP (.bmp)
//! - TIFF (.tiff, .tif)
//!
//! ## Example
//! ```rust,ignore
//! use duplicate_image_comparer::core::scanner::{load_files, ImageFilter, ScanDepth};
//!
//! let files = load_files(ScanDepth::Unlimited, &ImageFilter::new(), &["/Users/photos".into()])?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
    Gif,
    Bmp,
    Tiff,
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "webp" => ImageFormat::WebP,
            "gif" => ImageFormat::Gif,
            "bmp" => ImageFormat::Bmp,
            "tiff" | "tif" => ImageFormat::Tiff,
            _ => ImageFormat::Unknown,
        }
    }

    /// Detect format from a path's extension
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(ImageFormat::from_extension)
            .unwrap_or(ImageFormat::Unknown)
    }
}

/// How deep discovery descends below each root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDepth {
    /// Direct children of the root only
    Flat,
    /// Every level below the root
    Unlimited,
}

impl ScanDepth {
    /// Maximum walk depth, counting the root as depth 0
    pub fn max_depth(&self) -> usize {
        match self {
            ScanDepth::Flat => 1,
            ScanDepth::Unlimited => usize::MAX,
        }
    }
}

/// Discovery mode as persisted in settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanMode {
    #[default]
    Recursive,
    NotRecursive,
}

impl From<ScanMode> for ScanDepth {
    fn from(mode: ScanMode) -> Self {
        match mode {
            ScanMode::Recursive => ScanDepth::Unlimited,
            ScanMode::NotRecursive => ScanDepth::Flat,
        }
    }
}

impl std::fmt::Display for ScanMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanMode::Recursive => write!(f, "RECURSIVE"),
            ScanMode::NotRecursive => write!(f, "NOT_RECURSIVE"),
        }
    }
}

/// Acceptance test applied to every discovered file.
///
/// Implementations must be deterministic and free of side effects. An
/// `Err` aborts discovery instead of silently excluding the file.
pub trait FilePredicate: Send + Sync {
    fn accept(&self, path: &Path) -> io::Result<bool>;
}

impl<F> FilePredicate for F
where
    F: Fn(&Path) -> io::Result<bool> + Send + Sync,
{
    fn accept(&self, path: &Path) -> io::Result<bool> {
        self(path)
    }
}

/// Enumerate the files under `roots` accepted by `predicate`.
///
/// Uses the default scanner configuration (hidden directories skipped,
/// symlinks not followed). See [`WalkDirScanner`] for the configurable form.
pub fn load_files(
    depth: ScanDepth,
    predicate: &dyn FilePredicate,
    roots: &[PathBuf],
) -> Result<Vec<PathBuf>, ScanError> {
    let scanner = WalkDirScanner::new(ScanConfig {
        depth,
        ..Default::default()
    });
    scanner.load_files(predicate, roots, &crate::events::null_sender())
}
