// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::BTreeMap;

use stunt_core::{Sheet, Symbol};
use stunt_geom::Coord;
use tracing::{debug, info, instrument};

use crate::params::{SolverConfig, TransitionSolverParams};
use crate::problem::{position_problems, Problem, Setup};
use crate::search::{Search, Stop};
use crate::strategy::strategy_for;
use crate::{ProgressDelegate, TransitionSolverResult};

/// Reasons `sheet` cannot be used as solver input; empty when it can.
///
/// Every marcher must stand on a whole step and no two marchers may share
/// a position.
#[must_use]
pub fn validate_sheet_for_solver(sheet: &Sheet) -> Vec<String> {
    position_problems(&positions(sheet))
}

fn positions(sheet: &Sheet) -> Vec<Coord> {
    sheet.points().iter().map(|p| p.position).collect()
}

/// Solves the transition from `start` to `end` with default limits.
///
/// See [`solve_with`].
pub fn solve(
    start: &Sheet,
    end: &Sheet,
    params: &TransitionSolverParams,
    delegate: &mut dyn ProgressDelegate,
) -> TransitionSolverResult {
    solve_with(start, end, params, &SolverConfig::default(), delegate)
}

/// Searches for instruction assignments that move every marcher of `start`
/// onto a point of `end` without collisions, in as few beats as possible.
///
/// Runs on the calling thread. The delegate is polled for abort before
/// every candidate; an abort ends the search with the best solution found
/// so far. `on_complete` is always called exactly once, with the value this
/// function returns.
#[instrument(skip_all, fields(algorithm = %params.algorithm, marchers = start.marcher_count()))]
pub fn solve_with(
    start: &Sheet,
    end: &Sheet,
    params: &TransitionSolverParams,
    config: &SolverConfig,
    delegate: &mut dyn ProgressDelegate,
) -> TransitionSolverResult {
    let result = run(start, end, params, config, delegate);
    info!(
        success = result.success,
        beats = result.total_beats,
        aborted = result.aborted,
        evaluated = result.candidates_evaluated,
        "transition solver finished"
    );
    delegate.on_complete(&result);
    result
}

fn run(
    start: &Sheet,
    end: &Sheet,
    params: &TransitionSolverParams,
    config: &SolverConfig,
    delegate: &mut dyn ProgressDelegate,
) -> TransitionSolverResult {
    let starts = positions(start);
    let ends = positions(end);
    let problem = match Problem::build(&starts, &ends, params, config) {
        Ok(Setup::Search(problem)) => problem,
        Ok(Setup::AlreadyThere) => {
            delegate.on_new_best(0);
            delegate.on_progress(1.0);
            return TransitionSolverResult {
                success: true,
                total_beats: 0,
                final_positions: ends,
                ..TransitionSolverResult::default()
            };
        }
        Err(reason) => {
            info!(%reason, "transition cannot be solved");
            delegate.on_progress(1.0);
            return TransitionSolverResult::unsolved(false, 0);
        }
    };
    debug!(
        units = problem.unit_count(),
        instructions = problem.instructions.len(),
        lower_bound = problem.lower_bound,
        "searching"
    );

    let mut search = Search::new(&problem, delegate, config.max_candidates);
    strategy_for(params.algorithm).run(&mut search);
    let aborted = search.stopped() == Some(Stop::Aborted);
    if !aborted {
        search.progress(1.0);
    }
    let evaluated = search.evaluated();
    let Some((beats, assignment)) = search.into_best() else {
        return TransitionSolverResult::unsolved(aborted, evaluated);
    };

    let n = problem.destinations.len();
    let mut slots = vec![0; n];
    for (unit_index, unit) in problem.units.iter().enumerate() {
        let k = problem.instruction(unit_index, assignment[unit_index]);
        for &m in &unit.members {
            slots[m] = problem.instructions[k].0;
        }
    }
    let marcher_symbols: Vec<Symbol> = slots.iter().map(|&slot| Symbol::ALL[slot]).collect();
    let continuities: BTreeMap<Symbol, String> = problem
        .instructions
        .iter()
        .filter(|(slot, _)| slots.contains(slot))
        .map(|(slot, instruction)| (Symbol::ALL[*slot], instruction.continuity()))
        .collect();

    TransitionSolverResult {
        success: true,
        total_beats: beats,
        final_positions: problem.destinations.clone(),
        assignments: slots,
        continuities,
        marcher_symbols,
        aborted,
        candidates_evaluated: evaluated,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::params::{AlgorithmIdentifier, MarcherInstruction, MovementPattern};
    use crate::Silent;
    use stunt_core::SheetPoint;

    fn sheet(points: &[(i32, i32)]) -> Sheet {
        Sheet::new(
            "s",
            0,
            points
                .iter()
                .map(|&(x, y)| SheetPoint::new(Coord::from_steps(x, y), Symbol::Plain))
                .collect(),
        )
    }

    #[test]
    fn validation_lists_every_problem() {
        let mut bad = sheet(&[(0, 0), (0, 0)]);
        assert_eq!(validate_sheet_for_solver(&bad).len(), 1);
        bad = Sheet::new(
            "s",
            0,
            vec![SheetPoint::new(Coord::new(3, 0), Symbol::Plain)],
        );
        assert_eq!(validate_sheet_for_solver(&bad).len(), 1);
        assert!(validate_sheet_for_solver(&sheet(&[(0, 0), (2, 2)])).is_empty());
    }

    #[test]
    fn result_carries_symbols_and_continuities() {
        let mut params = TransitionSolverParams::with_instructions(
            AlgorithmIdentifier::ChiuZamoraMalani,
            [
                MarcherInstruction::new(MovementPattern::Ewns, 5),
                MarcherInstruction::new(MovementPattern::Nsew, 0),
            ],
        );
        params.instruction_mask[0] = false;
        let result = solve(
            &sheet(&[(0, 0)]),
            &sheet(&[(2, 1)]),
            &params,
            &mut Silent,
        );
        assert!(result.success);
        assert_eq!(result.total_beats, 3);
        assert_eq!(result.assignments, vec![1]);
        assert_eq!(result.marcher_symbols, vec![Symbol::Sol]);
        assert_eq!(
            result.continuities.get(&Symbol::Sol).map(String::as_str),
            Some("NSEW NP\nMTRM E")
        );
    }
}
