//! Lock guard through which a run reads and writes the engine state.

use super::comparer::ImageComparer;
use super::settings::ComparerSettings;
use crate::core::comparator::{compare, ComparisonResult};
use crate::core::reconcile::{ReconcileReport, Reconciler};
use crate::core::scanner::{ImageFilter, WalkDirScanner};
use crate::error::Result;
use crate::events::{PropertyName, PropertyValue};
use std::path::{Path, PathBuf};

/// Exclusive access to an [`ImageComparer`] for the length of one run.
///
/// Releasing the session, or dropping it, ends the run: input and output
/// are cleared and the lock is returned, whether the run succeeded, failed
/// or was abandoned.
pub struct RunSession {
    comparer: ImageComparer,
    released: bool,
    clear_on_release: bool,
}

impl RunSession {
    pub(super) fn new(comparer: ImageComparer) -> Self {
        Self {
            comparer,
            released: false,
            clear_on_release: true,
        }
    }

    /// Return the lock without clearing, so a later step can continue
    pub(super) fn keep_state(mut self) {
        self.clear_on_release = false;
        self.finish();
    }

    /// Snapshot of the files the run compares
    pub fn input(&self) -> Vec<PathBuf> {
        self.comparer.state().input.clone()
    }

    /// Snapshot of the duplicates found by [`RunSession::process`]
    pub fn output(&self) -> Vec<PathBuf> {
        self.comparer.state().output.clone()
    }

    /// Settings in effect for this run
    pub fn settings(&self) -> ComparerSettings {
        self.comparer.state().settings.clone()
    }

    pub fn set_input(&mut self, files: Vec<PathBuf>) {
        let old = std::mem::replace(&mut self.comparer.state().input, files).len();
        let new = self.comparer.state().input.len();
        self.comparer.events().property_changed(
            PropertyName::Input,
            PropertyValue::Count(old),
            PropertyValue::Count(new),
        );
    }

    /// Discover files under `roots` and make them the run's input
    pub fn load_files(&mut self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let settings = self.settings();
        let filter = ImageFilter::new().with_hidden(settings.include_hidden);
        let scanner = WalkDirScanner::new(settings.scan_config());

        let files = scanner.load_files(&filter, roots, self.comparer.events())?;
        self.set_input(files.clone());
        Ok(files)
    }

    /// Group the input, extract duplicates and store them as the output
    pub fn process(&mut self) -> Result<ComparisonResult> {
        let settings = self.settings();
        settings.validate()?;
        let input = self.input();

        let result = compare(&input, &settings.algorithms(), self.comparer.events());

        let old = std::mem::replace(
            &mut self.comparer.state().output,
            result.duplicates.clone(),
        )
        .len();
        self.comparer.events().property_changed(
            PropertyName::Output,
            PropertyValue::Count(old),
            PropertyValue::Count(result.duplicates.len()),
        );

        Ok(result)
    }

    /// Move `files` into `destination`
    pub fn move_files(&self, destination: &Path, files: &[PathBuf]) -> Result<ReconcileReport> {
        let reconciler = Reconciler::new(self.comparer.events().clone());
        Ok(reconciler.move_files(destination, files)?)
    }

    /// Permanently delete `files`
    pub fn delete_files(&self, files: &[PathBuf]) -> Result<ReconcileReport> {
        let reconciler = Reconciler::new(self.comparer.events().clone());
        Ok(reconciler.delete_files(files)?)
    }

    /// End the run now instead of at drop
    pub fn release(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.released {
            self.released = true;
            if self.clear_on_release {
                self.comparer.clear();
            }
            self.comparer.unlock();
        }
    }
}

impl Drop for RunSession {
    fn drop(&mut self) {
        self.finish();
    }
}

impl std::fmt::Debug for RunSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunSession")
            .field("released", &self.released)
            .field("clear_on_release", &self.clear_on_release)
            .finish()
    }
}
