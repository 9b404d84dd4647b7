//! Single-consumer work queue for model-store access.
//!
//! Any number of threads submit units of work through a cloneable
//! [`WorkQueue`]. Exactly one [`MainContext`], owned by the designated thread,
//! holds the model store and runs queued units in submission order each time
//! it is pumped. Submitters block on a [`Pending`] until their unit has run.
//!
//! Tearing the context down drops every unit still queued; their `Pending`
//! handles then resolve to [`CommandError::Shutdown`] instead of hanging.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::dispatch::CommandError;
use crate::model::ModelStore;

pub(crate) const EXECUTOR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::executor");

type Job = Box<dyn FnOnce(&mut dyn ModelStore) + Send>;

struct Shared {
    queue: Mutex<Option<VecDeque<Job>>>,
    submitted: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Option<VecDeque<Job>>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle for submitting units of work.
#[derive(Clone)]
pub struct WorkQueue {
    shared: Arc<Shared>,
}

impl WorkQueue {
    /// Queues `unit` to run on the designated context.
    ///
    /// Returns immediately. A panic inside the unit resolves its handle with
    /// [`CommandError::Internal`] and leaves later units unaffected.
    pub fn submit<T, F>(&self, unit: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn ModelStore) -> Result<T, CommandError> + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(1);
        let job: Job = Box::new(move |store| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| unit(store)))
                .unwrap_or_else(|payload| Err(CommandError::internal(panic_message(&*payload))));
            if sender.send(outcome).is_err() {
                debug!(target: EXECUTOR_TARGET, "submitter stopped waiting");
            }
        });

        let mut guard = self.shared.lock();
        let Some(queue) = guard.as_mut() else {
            return Pending::ready(Err(CommandError::Shutdown));
        };
        queue.push_back(job);
        self.shared.submitted.fetch_add(1, Ordering::SeqCst);
        Pending::waiting(receiver)
    }

    /// Total number of units accepted since the queue was created.
    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.shared.submitted.load(Ordering::SeqCst)
    }

    /// Units accepted but not yet started.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.lock().as_ref().map_or(0, VecDeque::len)
    }

    /// Whether the designated context has shut down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.lock().is_none()
    }
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("pending", &self.pending())
            .field("submitted", &self.submitted())
            .finish()
    }
}

/// Result handle for one submitted unit.
#[must_use = "a submitted unit's outcome should be awaited"]
pub struct Pending<T> {
    state: PendingState<T>,
}

enum PendingState<T> {
    Waiting(Receiver<Result<T, CommandError>>),
    Ready(Result<T, CommandError>),
}

impl<T> Pending<T> {
    const fn waiting(receiver: Receiver<Result<T, CommandError>>) -> Self {
        Self {
            state: PendingState::Waiting(receiver),
        }
    }

    const fn ready(outcome: Result<T, CommandError>) -> Self {
        Self {
            state: PendingState::Ready(outcome),
        }
    }

    /// Blocks the calling thread until the unit has run.
    ///
    /// # Errors
    ///
    /// Returns the unit's own error, or [`CommandError::Shutdown`] if the
    /// unit was dropped without running.
    pub fn wait(self) -> Result<T, CommandError> {
        match self.state {
            PendingState::Ready(outcome) => outcome,
            PendingState::Waiting(receiver) => receiver.recv().unwrap_or(Err(CommandError::Shutdown)),
        }
    }
}

/// Owner of the model store; runs queued units on the current thread.
///
/// Deliberately not `Clone` or `Sync`: exactly one designated context exists
/// per queue.
pub struct MainContext {
    shared: Arc<Shared>,
    store: Box<dyn ModelStore>,
}

impl MainContext {
    /// Takes ownership of `store` and opens an empty queue.
    pub fn new(store: impl ModelStore + 'static) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(Some(VecDeque::new())),
                submitted: AtomicU64::new(0),
            }),
            store: Box::new(store),
        }
    }

    /// Returns a submission handle for this context.
    #[must_use]
    pub fn queue(&self) -> WorkQueue {
        WorkQueue {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Runs queued units until the queue is empty and returns how many ran.
    ///
    /// Never waits for new work. Units queued by other threads while the pump
    /// is running are picked up in the same pass.
    pub fn pump(&mut self) -> usize {
        let mut ran = 0_usize;
        loop {
            let next = self.shared.lock().as_mut().and_then(VecDeque::pop_front);
            let Some(job) = next else {
                break;
            };
            job(self.store.as_mut());
            ran = ran.saturating_add(1);
        }
        ran
    }

    /// Closes the queue and drops every unit that has not run.
    ///
    /// Waiting submitters observe [`CommandError::Shutdown`]; later
    /// submissions fail immediately. Returns the number of dropped units.
    pub fn shutdown(&mut self) -> usize {
        let dropped = self.shared.lock().take().map_or(0, |queue| queue.len());
        if dropped > 0 {
            warn!(
                target: EXECUTOR_TARGET,
                pending = dropped,
                "dropping queued units at shutdown"
            );
        }
        dropped
    }
}

impl Drop for MainContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Pumps `context` once per `tick` until `stop` is set, then pumps a final
/// time so units queued before the flag was observed still run.
pub fn run_until(context: &mut MainContext, tick: Duration, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        let ran = context.pump();
        if ran > 0 {
            debug!(target: EXECUTOR_TARGET, ran, "pumped work queue");
        }
        thread::sleep(tick);
    }
    context.pump();
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .map_or_else(
            || "unit of work panicked".to_owned(),
            |message| format!("unit of work panicked: {message}"),
        )
}

#[cfg(test)]
mod tests;
