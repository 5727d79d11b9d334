//! Persisted comparer settings.

use crate::core::hasher::{AlgorithmSet, DEFAULT_HASH_SIZE, HASH_SIZE_RANGE};
use crate::core::scanner::{ScanConfig, ScanMode};
use crate::error::{ComparerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_DIR: &str = "duplicate-image-comparer";
const SETTINGS_FILE: &str = "settings.json";

/// Algorithm toggles and discovery options, stored as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparerSettings {
    pub perceptual_hash: bool,
    pub pixel_by_pixel: bool,
    pub mode: ScanMode,
    /// Where `move_files` puts duplicates
    pub output_path: Option<PathBuf>,
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    pub perceptual_hash_size: u32,
}

impl Default for ComparerSettings {
    fn default() -> Self {
        Self {
            perceptual_hash: true,
            pixel_by_pixel: true,
            mode: ScanMode::Recursive,
            output_path: None,
            include_hidden: false,
            follow_symlinks: false,
            perceptual_hash_size: DEFAULT_HASH_SIZE,
        }
    }
}

impl ComparerSettings {
    /// `<config dir>/duplicate-image-comparer/settings.json`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
    }

    /// Read settings from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(settings_error(path, e)),
        };

        let settings: Self = serde_json::from_str(&contents).map_err(|e| settings_error(path, e))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write settings to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| settings_error(path, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| settings_error(path, e))?;
        fs::write(path, json).map_err(|e| settings_error(path, e))?;
        tracing::info!(path = %path.display(), "Settings saved");
        Ok(())
    }

    /// Reject values the algorithms cannot work with
    pub fn validate(&self) -> Result<()> {
        if !HASH_SIZE_RANGE.contains(&self.perceptual_hash_size) {
            return Err(ComparerError::Config(format!(
                "perceptual hash size must be between {} and {}, got {}",
                HASH_SIZE_RANGE.start(),
                HASH_SIZE_RANGE.end(),
                self.perceptual_hash_size
            )));
        }
        Ok(())
    }

    /// The algorithm chain these toggles select
    pub fn algorithms(&self) -> AlgorithmSet {
        AlgorithmSet::from_flags(
            self.perceptual_hash,
            self.pixel_by_pixel,
            self.perceptual_hash_size,
        )
    }

    /// Scanner configuration for discovery
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            depth: self.mode.into(),
            follow_symlinks: self.follow_symlinks,
            include_hidden: self.include_hidden,
        }
    }
}

fn settings_error(path: &Path, error: impl std::fmt::Display) -> ComparerError {
    ComparerError::Settings {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}
