//! File filtering logic for the scanner.

use super::FilePredicate;
use std::collections::HashSet;
use std::io;
use std::path::Path;

/// Accepts files whose extension names a supported raster format
pub struct ImageFilter {
    /// File extensions to include, lowercase
    extensions: HashSet<String>,
    /// Whether to include hidden files
    include_hidden: bool,
}

impl ImageFilter {
    /// Create a new filter with default supported extensions
    pub fn new() -> Self {
        Self {
            extensions: ["jpg", "jpeg", "png", "webp", "gif", "bmp", "tiff", "tif"]
                .into_iter()
                .map(String::from)
                .collect(),
            include_hidden: false,
        }
    }

    /// Include hidden files (starting with .)
    pub fn with_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Override the list of extensions to accept
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        self
    }

    /// Check if a file should be included
    pub fn should_include(&self, path: &Path) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self.extensions.contains(&ext.to_lowercase()),
            None => false,
        }
    }
}

impl Default for ImageFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl FilePredicate for ImageFilter {
    fn accept(&self, path: &Path) -> io::Result<bool> {
        Ok(self.should_include(path))
    }
}
