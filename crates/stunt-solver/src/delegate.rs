// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The boundary between a running search and whoever is watching it.

use crate::TransitionSolverResult;

/// Receives solver progress and decides when to stop.
///
/// All callbacks run on the thread executing the search. When the search
/// runs on a worker (see [`spawn_solver`](crate::spawn_solver)) the worker
/// forwards them as [`SolverEvent`](crate::SolverEvent)s instead.
pub trait ProgressDelegate {
    /// Overall progress in `[0, 1]`.
    fn on_progress(&mut self, progress: f64);
    /// Progress in `[0, 1]` of the candidate being evaluated.
    fn on_subtask_progress(&mut self, progress: f64);
    /// A better solution was found; it needs `beats` beats.
    fn on_new_best(&mut self, beats: u32);
    /// The search finished (or was aborted) with `result`.
    fn on_complete(&mut self, result: &TransitionSolverResult);
    /// Polled at least once per candidate; `true` ends the search with the
    /// best result so far.
    fn should_abort(&mut self) -> bool;
}

/// A delegate that ignores every notification and never aborts.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ProgressDelegate for Silent {
    fn on_progress(&mut self, _progress: f64) {}
    fn on_subtask_progress(&mut self, _progress: f64) {}
    fn on_new_best(&mut self, _beats: u32) {}
    fn on_complete(&mut self, _result: &TransitionSolverResult) {}
    fn should_abort(&mut self) -> bool {
        false
    }
}
