// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Running the solver on a worker thread.
//!
//! The worker owns its inputs and talks back only through a bounded event
//! queue. Cancellation is cooperative: [`SolverHandle::abort`] sets a shared
//! flag that the search polls before every candidate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use stunt_core::Sheet;
use tracing::debug;

use crate::params::{SolverConfig, TransitionSolverParams};
use crate::{solve_with, ProgressDelegate, SolverError, TransitionSolverResult};

/// How often [`SolverHandle::drain_into`] polls its delegate for abort while
/// no events arrive.
const ABORT_POLL: Duration = Duration::from_millis(25);

/// A notification from the worker.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverEvent {
    /// Overall progress in `[0, 1]`. Dropped when the queue is full.
    Progress(f64),
    /// Progress of the current candidate. Dropped when the queue is full.
    SubtaskProgress(f64),
    /// A better solution needing this many beats was found.
    NewBest(u32),
    /// The search ended; always the last event.
    Complete(TransitionSolverResult),
}

/// Delegate living on the worker: forwards callbacks as events.
struct ChannelDelegate {
    events: SyncSender<SolverEvent>,
    abort: Arc<AtomicBool>,
}

impl ProgressDelegate for ChannelDelegate {
    fn on_progress(&mut self, progress: f64) {
        let _ = self.events.try_send(SolverEvent::Progress(progress));
    }

    fn on_subtask_progress(&mut self, progress: f64) {
        let _ = self.events.try_send(SolverEvent::SubtaskProgress(progress));
    }

    fn on_new_best(&mut self, beats: u32) {
        // Blocks until there is room; fails only if the handle is gone.
        let _ = self.events.send(SolverEvent::NewBest(beats));
    }

    fn on_complete(&mut self, result: &TransitionSolverResult) {
        let _ = self.events.send(SolverEvent::Complete(result.clone()));
    }

    fn should_abort(&mut self) -> bool {
        self.abort.load(Ordering::Acquire)
    }
}

/// Caller-side handle to a solver running on its own thread.
///
/// Dropping the handle aborts the search.
#[derive(Debug)]
pub struct SolverHandle {
    events: Receiver<SolverEvent>,
    abort: Arc<AtomicBool>,
    worker: Option<JoinHandle<TransitionSolverResult>>,
}

/// Starts solving the `start` → `end` transition on a new thread.
///
/// # Errors
/// Returns [`SolverError::Spawn`] if the thread cannot be created.
pub fn spawn_solver(
    start: Sheet,
    end: Sheet,
    params: TransitionSolverParams,
    config: SolverConfig,
) -> Result<SolverHandle, SolverError> {
    let (tx, rx) = mpsc::sync_channel(config.channel_capacity.max(1));
    let abort = Arc::new(AtomicBool::new(false));
    let mut delegate = ChannelDelegate {
        events: tx,
        abort: Arc::clone(&abort),
    };
    let worker = thread::Builder::new()
        .name("stunt-solver".into())
        .spawn(move || {
            debug!("solver worker started");
            solve_with(&start, &end, &params, &config, &mut delegate)
        })?;
    Ok(SolverHandle {
        events: rx,
        abort,
        worker: Some(worker),
    })
}

impl SolverHandle {
    /// The event queue, for callers that poll it themselves.
    pub const fn events(&self) -> &Receiver<SolverEvent> {
        &self.events
    }

    /// Asks the worker to stop after the candidate it is evaluating.
    pub fn abort(&self) {
        self.abort.store(true, Ordering::Release);
    }

    /// Whether [`abort`](Self::abort) has been called.
    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Acquire)
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Forwards events to `delegate` on the calling thread until the search
    /// completes, aborting the worker once `delegate.should_abort()` says so.
    ///
    /// Returns the final result, or `None` if the worker went away without
    /// completing.
    pub fn drain_into(&self, delegate: &mut dyn ProgressDelegate) -> Option<TransitionSolverResult> {
        loop {
            if !self.is_aborted() && delegate.should_abort() {
                self.abort();
            }
            match self.events.recv_timeout(ABORT_POLL) {
                Ok(SolverEvent::Progress(p)) => delegate.on_progress(p),
                Ok(SolverEvent::SubtaskProgress(p)) => delegate.on_subtask_progress(p),
                Ok(SolverEvent::NewBest(beats)) => delegate.on_new_best(beats),
                Ok(SolverEvent::Complete(result)) => {
                    delegate.on_complete(&result);
                    return Some(result);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Waits for the worker, discarding any events not yet received.
    ///
    /// # Errors
    /// Returns [`SolverError::WorkerPanicked`] if the worker panicked.
    pub fn join(mut self) -> Result<TransitionSolverResult, SolverError> {
        // Keep the queue moving so a blocked `send` cannot deadlock the join.
        while self.events.recv().is_ok() {}
        let worker = self.worker.take().ok_or(SolverError::WorkerPanicked)?;
        worker.join().map_err(|_| SolverError::WorkerPanicked)
    }
}

impl Drop for SolverHandle {
    fn drop(&mut self) {
        self.abort();
    }
}
