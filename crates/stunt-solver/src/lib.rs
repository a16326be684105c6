// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! stunt-solver: automatic continuities between two sheets.
//!
//! Given a start sheet, an end sheet and a small library of
//! [`MarcherInstruction`]s, the solver picks a destination for every marcher
//! and an instruction for every group so that everybody arrives without
//! collisions, as early as possible. The winning assignment comes back as
//! per-symbol continuity text that `stunt-core` compiles.
//!
//! [`solve`] runs synchronously; [`spawn_solver`] runs the same search on a
//! worker thread and streams [`SolverEvent`]s back.
#![forbid(unsafe_code)]

mod delegate;
mod error;
mod matching;
/// Solver inputs.
pub mod params;
mod problem;
mod result;
mod search;
mod solve;
mod strategy;
mod worker;

pub use delegate::{ProgressDelegate, Silent};
pub use error::SolverError;
pub use params::{
    AlgorithmIdentifier, GroupConstraint, MarcherInstruction, MovementPattern, SolverConfig,
    TransitionSolverParams, MAX_INSTRUCTIONS,
};
pub use result::TransitionSolverResult;
pub use solve::{solve, solve_with, validate_sheet_for_solver};
pub use worker::{spawn_solver, SolverEvent, SolverHandle};
