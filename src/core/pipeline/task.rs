//! Generic stage chain executed on the rayon pool.

use crate::error::{ComparerError, Result};
use crate::events::{Event, EventSender, PipelineEvent, PipelineStage};
use crossbeam_channel::{bounded, Receiver};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between a task and its callers
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; honored before the next stage starts
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// What every stage of a running task can see
struct TaskContext {
    token: CancellationToken,
    events: EventSender,
}

impl TaskContext {
    fn run_stage<T, F>(&self, stage: PipelineStage, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if self.token.is_cancelled() {
            tracing::info!(%stage, "Cancelled before stage");
            self.events.send(Event::Pipeline(PipelineEvent::Cancelled));
            return Err(ComparerError::Cancelled);
        }

        let outcome = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result,
            Err(payload) => Err(ComparerError::TaskPanicked {
                stage: stage.to_string(),
                message: panic_message(payload.as_ref()),
            }),
        };

        match &outcome {
            Ok(_) => {
                tracing::debug!(%stage, "Stage completed");
                self.events
                    .send(Event::Pipeline(PipelineEvent::StageCompleted { stage }));
            }
            Err(ComparerError::Cancelled) => {
                self.events.send(Event::Pipeline(PipelineEvent::Cancelled));
            }
            Err(e) => {
                tracing::error!(%stage, error = %e, "Stage failed");
                self.events.send(Event::Pipeline(PipelineEvent::Failed {
                    stage,
                    message: e.to_string(),
                }));
            }
        }

        outcome
    }
}

type StageChain<T> = Box<dyn FnOnce(&TaskContext) -> Result<T> + Send>;

/// A sequence of stages, each consuming the previous stage's value.
///
/// The first failure skips every later stage and becomes the task's result.
///
/// ```rust,ignore
/// let task = Task::new(PipelineStage::Discovery, move || load(&roots))
///     .then(PipelineStage::Comparison, |files| compare(files));
/// let handle = task.spawn(events, |result| println!("{:?}", result.is_ok()));
/// ```
pub struct Task<T> {
    chain: StageChain<T>,
}

impl<T: Send + 'static> Task<T> {
    /// A task with a single stage
    pub fn new<F>(stage: PipelineStage, f: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self {
            chain: Box::new(move |ctx| ctx.run_stage(stage, f)),
        }
    }

    /// Append a stage fed with this task's value
    pub fn then<U, F>(self, stage: PipelineStage, f: F) -> Task<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let previous = self.chain;
        Task {
            chain: Box::new(move |ctx| {
                let value = previous(ctx)?;
                ctx.run_stage(stage, move || f(value))
            }),
        }
    }

    /// Run every stage on the current thread
    pub fn run(self, token: &CancellationToken, events: &EventSender) -> Result<T> {
        let ctx = TaskContext {
            token: token.clone(),
            events: events.clone(),
        };
        (self.chain)(&ctx)
    }

    /// Run on the rayon pool and call `on_complete` with the result.
    ///
    /// The callback runs on the worker thread; marshaling to a UI thread is
    /// up to the caller.
    pub fn spawn<C>(self, events: EventSender, on_complete: C) -> TaskHandle<T>
    where
        C: FnOnce(&Result<T>) + Send + 'static,
    {
        let token = CancellationToken::new();
        let finished = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = bounded(1);

        let ctx = TaskContext {
            token: token.clone(),
            events,
        };
        let done = Arc::clone(&finished);
        let chain = self.chain;

        rayon::spawn(move || {
            let result = chain(&ctx);
            if panic::catch_unwind(AssertUnwindSafe(|| on_complete(&result))).is_err() {
                tracing::error!("Completion callback panicked");
            }
            done.store(true, Ordering::SeqCst);
            // The handle may have been dropped already
            let _ = sender.send(result);
        });

        TaskHandle {
            token,
            finished,
            receiver,
        }
    }
}

/// Handle to a spawned [`Task`]
pub struct TaskHandle<T> {
    token: CancellationToken,
    finished: Arc<AtomicBool>,
    receiver: Receiver<Result<T>>,
}

impl<T> TaskHandle<T> {
    /// Stop the task before its next stage
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Whether the task ran to its end and its callback returned
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Block until the task's result is available
    pub fn wait(self) -> Result<T> {
        self.receiver
            .recv()
            .unwrap_or_else(|_| {
                Err(ComparerError::TaskPanicked {
                    stage: "task".to_string(),
                    message: "worker exited without a result".to_string(),
                })
            })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
