//! The comparer engine and its single-flight guard.

use super::session::RunSession;
use super::settings::ComparerSettings;
use crate::core::comparator::ComparisonResult;
use crate::core::reconcile::ReconcileReport;
use crate::error::{ComparerError, Result};
use crate::events::{null_sender, EventSender, PropertyName, PropertyValue};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Input, output and settings of the engine
#[derive(Debug, Default)]
pub(super) struct ComparerState {
    pub input: Vec<PathBuf>,
    pub output: Vec<PathBuf>,
    pub settings: ComparerSettings,
}

struct Inner {
    state: Mutex<ComparerState>,
    processing: AtomicBool,
    events: EventSender,
}

/// Duplicate image comparer.
///
/// At most one run is in flight per engine: [`ImageComparer::lock`] hands
/// out a [`RunSession`] and every other attempt fails with
/// [`ComparerError::AlreadyProcessing`] until the session is released.
/// Clones share the same state and lock.
#[derive(Clone)]
pub struct ImageComparer {
    inner: Arc<Inner>,
}

impl ImageComparer {
    /// Engine with default settings and no listener
    pub fn new() -> Self {
        Self::with_settings(ComparerSettings::default(), null_sender())
    }

    /// Engine reporting progress and property changes on `events`
    pub fn with_events(events: EventSender) -> Self {
        Self::with_settings(ComparerSettings::default(), events)
    }

    pub fn with_settings(settings: ComparerSettings, events: EventSender) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(ComparerState {
                    settings,
                    ..Default::default()
                }),
                processing: AtomicBool::new(false),
                events,
            }),
        }
    }

    /// Whether a run currently holds the lock
    pub fn is_processing(&self) -> bool {
        self.inner.processing.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> &EventSender {
        &self.inner.events
    }

    /// Take the single-flight lock.
    ///
    /// Fails immediately, without touching the running session's state, if
    /// another session holds it.
    pub fn lock(&self) -> Result<RunSession> {
        {
            let _state = self.state();
            self.inner
                .processing
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .map_err(|_| {
                    tracing::warn!("Rejected run: a comparison is already in progress");
                    ComparerError::AlreadyProcessing
                })?;
        }

        tracing::debug!("Lock acquired");
        self.inner.events.property_changed(
            PropertyName::Processing,
            PropertyValue::Flag(false),
            PropertyValue::Flag(true),
        );
        Ok(RunSession::new(self.clone()))
    }

    /// Discover files under `roots` and make them the input.
    ///
    /// The input stays set for a following [`ImageComparer::process`].
    pub fn load_files(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        self.step(false, |session| session.load_files(roots))
    }

    /// Compare the current input and extract its duplicates.
    ///
    /// The duplicates stay readable through `output()` until the run ends.
    pub fn process(&self) -> Result<ComparisonResult> {
        self.step(false, |session| session.process())
    }

    /// Move `files` into `destination`, ending the run
    pub fn move_files(&self, destination: &Path, files: &[PathBuf]) -> Result<ReconcileReport> {
        self.step(true, |session| session.move_files(destination, files))
    }

    /// Move `files` into the configured output path, ending the run
    pub fn move_to_output(&self, files: &[PathBuf]) -> Result<ReconcileReport> {
        self.step(true, |session| {
            let destination = session
                .settings()
                .output_path
                .ok_or_else(|| ComparerError::Config("no output path configured".to_string()))?;
            session.move_files(&destination, files)
        })
    }

    /// Permanently delete `files`, ending the run
    pub fn delete_files(&self, files: &[PathBuf]) -> Result<ReconcileReport> {
        self.step(true, |session| session.delete_files(files))
    }

    /// Run one step under the lock.
    ///
    /// A successful step keeps input and output for the next one. A failed
    /// step, or one that ends the run, clears them.
    fn step<T>(&self, ends_run: bool, f: impl FnOnce(&mut RunSession) -> Result<T>) -> Result<T> {
        let mut session = self.lock()?;
        let result = f(&mut session);
        if result.is_ok() && !ends_run {
            session.keep_state();
        }
        result
    }

    /// Clear input and output
    pub(super) fn clear(&self) {
        let (input, output) = {
            let mut state = self.state();
            (
                std::mem::take(&mut state.input).len(),
                std::mem::take(&mut state.output).len(),
            )
        };

        let events = &self.inner.events;
        events.property_changed(
            PropertyName::Input,
            PropertyValue::Count(input),
            PropertyValue::Count(0),
        );
        events.property_changed(
            PropertyName::Output,
            PropertyValue::Count(output),
            PropertyValue::Count(0),
        );
    }

    /// Return to idle
    pub(super) fn unlock(&self) {
        self.inner.processing.store(false, Ordering::SeqCst);
        tracing::debug!("Lock released");
        self.inner.events.property_changed(
            PropertyName::Processing,
            PropertyValue::Flag(true),
            PropertyValue::Flag(false),
        );
    }

    /// State guard; a panicked run cannot leave the state unusable
    pub(super) fn state(&self) -> MutexGuard<'_, ComparerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ImageComparer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ImageComparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageComparer")
            .field("processing", &self.is_processing())
            .field("settings", &self.state().settings)
            .finish()
    }
}
