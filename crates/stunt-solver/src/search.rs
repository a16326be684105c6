// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use tracing::{debug, info};

use crate::problem::{Problem, Verdict};
use crate::ProgressDelegate;

/// Why a search stopped before running out of candidates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Stop {
    Aborted,
    Exhausted,
}

/// Bookkeeping shared by every strategy: the candidate budget, abort
/// polling, progress forwarding and the best assignment so far.
pub(crate) struct Search<'a> {
    problem: &'a Problem,
    delegate: &'a mut dyn ProgressDelegate,
    max_candidates: u64,
    evaluated: u64,
    stopped: Option<Stop>,
    best: Option<(u32, Vec<usize>)>,
}

impl<'a> Search<'a> {
    pub fn new(
        problem: &'a Problem,
        delegate: &'a mut dyn ProgressDelegate,
        max_candidates: u64,
    ) -> Self {
        Self {
            problem,
            delegate,
            max_candidates,
            evaluated: 0,
            stopped: None,
            best: None,
        }
    }

    pub const fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// Polls the delegate and the budget. Strategies call this before every
    /// candidate and return as soon as it says so.
    pub fn should_stop(&mut self) -> bool {
        if self.stopped.is_some() {
            return true;
        }
        if self.delegate.should_abort() {
            debug!(evaluated = self.evaluated, "search aborted");
            self.stopped = Some(Stop::Aborted);
        } else if self.evaluated >= self.max_candidates {
            debug!(evaluated = self.evaluated, "candidate budget exhausted");
            self.stopped = Some(Stop::Exhausted);
        }
        self.stopped.is_some()
    }

    /// Evaluates one assignment (an option index per unit).
    pub fn evaluate(&mut self, assignment: &[usize]) -> Verdict {
        self.evaluated += 1;
        let problem = self.problem;
        let best = self.best_beats();
        let delegate = &mut *self.delegate;
        delegate.on_subtask_progress(0.0);
        let verdict = problem.evaluate(assignment, best, |f| delegate.on_subtask_progress(f));
        if let Verdict::Valid(beats) = verdict {
            info!(beats, evaluated = self.evaluated, "new best transition");
            self.best = Some((beats, assignment.to_vec()));
            self.delegate.on_new_best(beats);
        }
        verdict
    }

    /// Reports overall progress, clamped to `[0, 1]`.
    pub fn progress(&mut self, fraction: f64) {
        self.delegate.on_progress(fraction.clamp(0.0, 1.0));
    }

    /// Fraction of the candidate budget spent.
    #[allow(clippy::cast_precision_loss)]
    pub fn budget_spent(&self) -> f64 {
        if self.max_candidates == 0 {
            1.0
        } else {
            self.evaluated as f64 / self.max_candidates as f64
        }
    }

    pub fn best_beats(&self) -> Option<u32> {
        self.best.as_ref().map(|(beats, _)| *beats)
    }

    /// The best known solution cannot be beaten.
    pub fn is_optimal(&self) -> bool {
        self.best_beats() == Some(self.problem.lower_bound)
    }

    pub const fn evaluated(&self) -> u64 {
        self.evaluated
    }

    pub const fn stopped(&self) -> Option<Stop> {
        self.stopped
    }

    pub fn into_best(self) -> Option<(u32, Vec<usize>)> {
        self.best
    }
}
