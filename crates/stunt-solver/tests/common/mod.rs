// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use stunt_core::{Sheet, SheetPoint, Show, Symbol};
use stunt_geom::Coord;
use stunt_solver::{
    AlgorithmIdentifier, GroupConstraint, MarcherInstruction, MovementPattern, ProgressDelegate,
    TransitionSolverParams, TransitionSolverResult,
};

/// A sheet with plain marchers at whole-step positions.
pub fn sheet(points: &[(i32, i32)]) -> Sheet {
    Sheet::new(
        "fixture",
        0,
        points
            .iter()
            .map(|&(x, y)| SheetPoint::new(Coord::from_steps(x, y), Symbol::Plain))
            .collect(),
    )
}

/// Two marchers whose straight paths cross at (2, 2) on beat 2, each pinned
/// to its own destination. `NSEW:0` collides; waiting two beats does not.
pub fn crossing(algorithm: AlgorithmIdentifier) -> (Sheet, Sheet, TransitionSolverParams) {
    let params = TransitionSolverParams::with_instructions(
        algorithm,
        [
            MarcherInstruction::new(MovementPattern::Nsew, 0),
            MarcherInstruction::new(MovementPattern::Nsew, 2),
        ],
    )
    .with_group(GroupConstraint::new([0], [0]))
    .with_group(GroupConstraint::new([1], [1]));
    (sheet(&[(0, 2), (2, 0)]), sheet(&[(4, 2), (2, 4)]), params)
}

/// Builds the two-sheet show a solver result describes.
pub fn replay(start: &Sheet, result: &TransitionSolverResult) -> Show {
    let points = start
        .points()
        .iter()
        .zip(&result.marcher_symbols)
        .map(|(p, &symbol)| SheetPoint::new(p.position, symbol))
        .collect();
    let mut first = Sheet::new("start", result.total_beats, points);
    for (&symbol, text) in &result.continuities {
        first = first.with_continuity(symbol, text.clone());
    }
    let last = Sheet::new(
        "end",
        1,
        result
            .final_positions
            .iter()
            .map(|&c| SheetPoint::new(c, Symbol::Plain))
            .collect(),
    );
    Show::new(vec![first, last]).expect("solver results describe valid shows")
}

/// Delegate that records everything and aborts after a number of polls.
#[derive(Debug, Default)]
pub struct Recorder {
    pub progress: Vec<f64>,
    pub subtasks: usize,
    pub bests: Vec<u32>,
    pub completed: Vec<TransitionSolverResult>,
    pub polls: u64,
    pub abort_after: Option<u64>,
}

impl Recorder {
    pub fn aborting_after(polls: u64) -> Self {
        Self {
            abort_after: Some(polls),
            ..Self::default()
        }
    }
}

impl ProgressDelegate for Recorder {
    fn on_progress(&mut self, progress: f64) {
        self.progress.push(progress);
    }

    fn on_subtask_progress(&mut self, _progress: f64) {
        self.subtasks += 1;
    }

    fn on_new_best(&mut self, beats: u32) {
        self.bests.push(beats);
    }

    fn on_complete(&mut self, result: &TransitionSolverResult) {
        self.completed.push(result.clone());
    }

    fn should_abort(&mut self) -> bool {
        self.polls += 1;
        self.abort_after.is_some_and(|n| self.polls > n)
    }
}
