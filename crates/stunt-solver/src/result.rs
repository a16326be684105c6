// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stunt_core::Symbol;
use stunt_geom::Coord;

/// Outcome of one solver run.
///
/// Only `success`, `aborted` and `candidates_evaluated` are meaningful when
/// no solution was found; the remaining fields are then empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSolverResult {
    /// Whether a collision-free assignment was found.
    pub success: bool,
    /// Beats until the last marcher arrives.
    pub total_beats: u32,
    /// Destination of each marcher, indexed by start-sheet marcher.
    pub final_positions: Vec<Coord>,
    /// Instruction library slot used by each marcher. Empty when nobody
    /// needs to move.
    pub assignments: Vec<usize>,
    /// Continuity text per symbol used by the solution.
    pub continuities: BTreeMap<Symbol, String>,
    /// Symbol each marcher should carry so it runs its continuity.
    pub marcher_symbols: Vec<Symbol>,
    /// The run stopped early because the caller asked it to.
    pub aborted: bool,
    /// Candidate assignments evaluated.
    pub candidates_evaluated: u64,
}

impl TransitionSolverResult {
    /// A result with no solution.
    #[must_use]
    pub fn unsolved(aborted: bool, candidates_evaluated: u64) -> Self {
        Self {
            aborted,
            candidates_evaluated,
            ..Self::default()
        }
    }
}
