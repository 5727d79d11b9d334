//! Directory walking implementation using walkdir.

use super::{FilePredicate, ScanDepth};
use crate::error::ScanError;
use crate::events::{Event, EventSender, ScanEvent};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// How deep to descend below each root
    pub depth: ScanDepth,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
    /// Whether to descend into hidden directories
    pub include_hidden: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            depth: ScanDepth::Unlimited,
            follow_symlinks: false,
            include_hidden: false,
        }
    }
}

/// Scanner implementation using the walkdir crate
pub struct WalkDirScanner {
    config: ScanConfig,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Enumerate accepted files under every root.
    ///
    /// Fails on the first unreadable root, unreadable directory or
    /// predicate error. Files reachable from several roots are reported
    /// once, under the first path they were found by.
    pub fn load_files(
        &self,
        predicate: &dyn FilePredicate,
        roots: &[PathBuf],
        events: &EventSender,
    ) -> Result<Vec<PathBuf>, ScanError> {
        events.send(Event::Scan(ScanEvent::Started {
            roots: roots.to_vec(),
        }));

        let mut files = Vec::new();
        let mut seen: HashSet<PathBuf> = HashSet::new();

        for root in roots {
            self.scan_root(root, predicate, &mut seen, &mut files, events)?;
        }

        tracing::info!(roots = roots.len(), files = files.len(), "Discovery finished");
        events.send(Event::Scan(ScanEvent::Completed {
            total_files: files.len(),
        }));

        Ok(files)
    }

    fn scan_root(
        &self,
        root: &Path,
        predicate: &dyn FilePredicate,
        seen: &mut HashSet<PathBuf>,
        files: &mut Vec<PathBuf>,
        events: &EventSender,
    ) -> Result<(), ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let include_hidden = self.config.include_hidden;
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.config.depth.max_depth())
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| include_hidden || !is_hidden_dir(entry));

        for entry_result in walker {
            let entry = entry_result.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                match e.into_io_error() {
                    Some(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                        ScanError::PermissionDenied { path }
                    }
                    Some(io) => ScanError::ReadDirectory { path, source: io },
                    None => ScanError::ReadDirectory {
                        path,
                        source: std::io::Error::other("filesystem loop detected"),
                    },
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let accepted = predicate
                .accept(path)
                .map_err(|source| ScanError::Predicate {
                    path: path.to_path_buf(),
                    source,
                })?;
            if !accepted {
                continue;
            }

            let canonical = fs::canonicalize(path).map_err(|source| ScanError::ReadDirectory {
                path: path.to_path_buf(),
                source,
            })?;
            if !seen.insert(canonical) {
                tracing::debug!(path = %path.display(), "Already discovered under another root");
                continue;
            }

            tracing::debug!(path = %path.display(), "Discovered");
            events.send(Event::Scan(ScanEvent::FileFound {
                path: path.to_path_buf(),
            }));
            files.push(path.to_path_buf());
        }

        Ok(())
    }
}

impl Default for WalkDirScanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}
