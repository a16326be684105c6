// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Search strategies over per-unit instruction choices.
//!
//! An assignment holds one option index per unit; option 0 is always the
//! unit's cheapest instruction. Strategies only decide which assignments
//! to try and in what order. The [`Search`] they drive enforces the
//! candidate budget, polls for abort and keeps the best result.

use std::collections::BTreeSet;

use crate::params::AlgorithmIdentifier;
use crate::problem::Verdict;
use crate::search::Search;

/// A way of walking the assignment space.
pub(crate) trait Strategy {
    fn run(&self, search: &mut Search<'_>);
}

/// The strategy implementing `algorithm`.
pub(crate) fn strategy_for(algorithm: AlgorithmIdentifier) -> &'static dyn Strategy {
    match algorithm {
        AlgorithmIdentifier::ChiuZamoraMalani => &Exhaustive,
        AlgorithmIdentifier::NaminiaslRamirezZhang => &Repair,
        AlgorithmIdentifier::SoverEliceiriHershkovitz => &CostOrdered,
    }
}

/// Advances `digits` like an odometer whose wheel `u` has `limits[u]`
/// positions, last wheel fastest. Returns `false` after the last setting.
fn advance(digits: &mut [usize], limits: &[usize]) -> bool {
    for (digit, &limit) in digits.iter_mut().zip(limits).rev() {
        *digit += 1;
        if *digit < limit {
            return true;
        }
        *digit = 0;
    }
    false
}

/// Every combination, in odometer order, with pruning against the best.
struct Exhaustive;

impl Strategy for Exhaustive {
    #[allow(clippy::cast_precision_loss)]
    fn run(&self, search: &mut Search<'_>) {
        let problem = search.problem();
        let limits: Vec<usize> = problem.units.iter().map(|u| u.options.len()).collect();
        let total: f64 = limits.iter().map(|&l| l as f64).product();
        let mut digits = vec![0; limits.len()];
        let mut visited = 0_f64;
        loop {
            if search.should_stop() {
                return;
            }
            search.evaluate(&digits);
            if search.is_optimal() {
                return;
            }
            visited += 1.0;
            search.progress(visited / total);
            if !advance(&mut digits, &limits) {
                return;
            }
        }
    }
}

/// Cheapest-first enumeration: candidates are grouped by their beat cost
/// and tried one cost level at a time, so the first valid one is optimal.
struct CostOrdered;

impl Strategy for CostOrdered {
    #[allow(clippy::cast_precision_loss)]
    fn run(&self, search: &mut Search<'_>) {
        let problem = search.problem();
        let levels: BTreeSet<u32> = problem
            .units
            .iter()
            .flat_map(|u| u.options.iter().map(|&(_, cost)| cost))
            .filter(|&cost| cost >= problem.lower_bound)
            .collect();
        let level_count = levels.len() as f64;
        for (index, level) in levels.into_iter().enumerate() {
            // Options are sorted by cost, so each wheel is a prefix.
            let limits: Vec<usize> = problem
                .units
                .iter()
                .map(|u| u.options.partition_point(|&(_, cost)| cost <= level))
                .collect();
            let mut digits = vec![0; limits.len()];
            loop {
                if search.should_stop() {
                    return;
                }
                // Cheaper combinations were tried on an earlier level.
                if problem.cost(&digits) == level {
                    search.evaluate(&digits);
                    if search.best_beats().is_some() {
                        return;
                    }
                }
                if !advance(&mut digits, &limits) {
                    break;
                }
            }
            search.progress((index + 1) as f64 / level_count);
        }
    }
}

/// Local search: start from every unit's cheapest instruction, then move
/// units that collide (or that set the pace of a valid solution) to another
/// instruction, never revisiting an assignment.
struct Repair;

impl Repair {
    /// The first unvisited assignment that changes one of `movers`, trying
    /// each mover's options in `order`.
    fn neighbor(
        current: &[usize],
        movers: &[usize],
        limits: &[usize],
        visited: &BTreeSet<Vec<usize>>,
        cheaper_only: bool,
    ) -> Option<Vec<usize>> {
        for &unit in movers {
            let here = current[unit];
            let choices: Vec<usize> = if cheaper_only {
                (0..here).rev().collect()
            } else {
                (here + 1..limits[unit]).chain(0..here).collect()
            };
            for option in choices {
                let mut next = current.to_vec();
                next[unit] = option;
                if !visited.contains(&next) {
                    return Some(next);
                }
            }
        }
        None
    }
}

impl Strategy for Repair {
    fn run(&self, search: &mut Search<'_>) {
        let problem = search.problem();
        let limits: Vec<usize> = problem.units.iter().map(|u| u.options.len()).collect();
        let mut current = vec![0; limits.len()];
        let mut visited: BTreeSet<Vec<usize>> = BTreeSet::new();
        loop {
            if search.should_stop() {
                return;
            }
            visited.insert(current.clone());
            let verdict = search.evaluate(&current);
            if search.is_optimal() {
                return;
            }
            let budget = search.budget_spent();
            search.progress(budget);
            let next = match verdict {
                Verdict::Collides { units, .. } => {
                    // Rotate the starting mover so repeated collisions between
                    // the same units do not always blame the first one.
                    let shift = usize::try_from(search.evaluated()).unwrap_or(0) % units.len();
                    let mut movers = units;
                    movers.rotate_left(shift);
                    Self::neighbor(&current, &movers, &limits, &visited, false)
                }
                Verdict::Valid(beats) | Verdict::Pruned(beats) => {
                    let pace: Vec<usize> = (0..limits.len())
                        .filter(|&u| problem.units[u].cost(current[u]) == beats)
                        .collect();
                    Self::neighbor(&current, &pace, &limits, &visited, true)
                }
            };
            match next {
                Some(next) => current = next,
                None => return,
            }
        }
    }
}
