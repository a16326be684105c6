// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use thiserror::Error;

/// Host-level failures around a solver run.
///
/// Not finding a solution, or being aborted, is a normal
/// [`TransitionSolverResult`](crate::TransitionSolverResult), not an error.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The worker thread could not be started.
    #[error("failed to spawn solver worker: {0}")]
    Spawn(#[from] std::io::Error),
    /// The worker thread panicked before returning a result.
    #[error("solver worker panicked")]
    WorkerPanicked,
}
