//! # Pipeline Module
//!
//! Orchestrates a comparison run and guards the engine against concurrent runs.
//!
//! ## Run Stages
//! 1. **Discovery** - Find candidate images under the roots
//! 2. **Comparison** - Build records, group them, extract duplicates
//! 3. **Review** - Let the caller look at the duplicates and decline
//! 4. **Reconciliation** - Move or delete the duplicates
//!
//! ## Single Flight
//! [`ImageComparer::lock`] moves the engine from idle to processing and
//! returns a [`RunSession`]. Every other operation fails with
//! `AlreadyProcessing` until the session is released, which happens on drop
//! no matter how the run ended.
//!
//! The engine-level steps (`load_files`, `process`, `move_files`,
//! `delete_files`) each hold the lock only for their own duration. Input and
//! output survive between successful steps, so `load_files` then `process`
//! leaves the duplicates in `output()`. A failed step, a reconciliation step
//! or the end of a full run clears them.
//!
//! ## Example
//! ```rust,ignore
//! let comparer = ImageComparer::with_events(sender);
//! let handle = comparer.run(
//!     RunRequest::new(vec!["/photos".into()]).reconcile(Reconciliation::Delete),
//!     |result| println!("done: {}", result.is_ok()),
//! )?;
//! let outcome = handle.wait()?;
//! ```

mod comparer;
mod properties;
mod run;
mod session;
mod settings;
mod task;

pub use comparer::ImageComparer;
pub use properties::ComparerProperties;
pub use run::{Reconciliation, ReviewDecision, RunOutcome, RunRequest};
pub use session::RunSession;
pub use settings::ComparerSettings;
pub use task::{CancellationToken, Task, TaskHandle};
