// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! One transition, prepared for searching.
//!
//! Destinations are fixed up front by [`min_cost_assignment`]. What remains
//! is choosing an instruction per unit (a group, or a lone marcher). Every
//! marcher's path under every usable instruction is precomputed by running
//! the instruction's continuity through `stunt-core`, so evaluating a
//! candidate is only a matter of replaying tracks and looking for
//! collisions.

use std::collections::{BTreeMap, BTreeSet};

use stunt_core::animate::{CollisionPolicy, CollisionSet};
use stunt_core::exec::{self, ExecContext, RefTrack, Variables};
use stunt_core::{compile, MarcherId, ProcedureList};
use stunt_geom::coord::{units_to_whole_steps, UNITS_PER_STEP};
use stunt_geom::{direction, Coord};
use thiserror::Error;
use tracing::warn;

use crate::matching::min_cost_assignment;
use crate::params::{MarcherInstruction, SolverConfig, TransitionSolverParams};

/// Why a transition cannot be searched at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum Infeasible {
    #[error("no instructions are enabled")]
    NoInstructions,
    #[error("group {0} has no members")]
    EmptyGroup(usize),
    #[error("start sheet has {start} marchers but end sheet has {end}")]
    CountMismatch { start: usize, end: usize },
    #[error("{0}")]
    InvalidSheet(String),
    #[error("no destination assignment satisfies the group constraints within {0} beats")]
    NoMatching(u32),
    #[error("no enabled instruction brings unit {0} to its destinations")]
    NoInstructionFits(usize),
}

/// What preparing a transition produced.
#[derive(Debug)]
pub(crate) enum Setup {
    /// Every marcher already stands on its end position.
    AlreadyThere,
    /// A search is needed.
    Search(Problem),
}

/// A marcher's precomputed path under one instruction.
#[derive(Debug, Clone)]
struct Track {
    finish: u32,
    positions: Vec<Coord>,
}

impl Track {
    fn at(&self, beat: u32) -> Coord {
        usize::try_from(beat)
            .ok()
            .and_then(|b| self.positions.get(b))
            .or_else(|| self.positions.last())
            .copied()
            .unwrap_or_default()
    }
}

/// Marchers that must share one instruction.
#[derive(Debug, Clone)]
pub(crate) struct Unit {
    pub members: Vec<usize>,
    /// `(enabled instruction index, beats)` sorted by beats, then index.
    pub options: Vec<(usize, u32)>,
}

impl Unit {
    pub fn cost(&self, option: usize) -> u32 {
        self.options[option].1
    }
}

/// Result of replaying one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Verdict {
    /// Collision-free; everybody is home after this many beats.
    Valid(u32),
    /// At least as slow as the best known solution; not replayed.
    Pruned(u32),
    /// The listed units take part in at least one collision.
    Collides { beats: u32, units: Vec<usize> },
}

/// A transition ready for a strategy to search.
#[derive(Debug)]
pub(crate) struct Problem {
    pub destinations: Vec<Coord>,
    /// Enabled instructions as `(library slot, instruction)`.
    pub instructions: Vec<(usize, MarcherInstruction)>,
    pub units: Vec<Unit>,
    unit_of: Vec<usize>,
    /// `tracks[marcher][instruction]`, `None` where unusable.
    tracks: Vec<Vec<Option<Track>>>,
    /// No assignment can finish faster than this.
    pub lower_bound: u32,
}

/// Checks that a set of positions is usable by the solver.
pub(crate) fn position_problems(positions: &[Coord]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen: BTreeMap<Coord, usize> = BTreeMap::new();
    for (marcher, position) in positions.iter().enumerate() {
        let (x, y) = position.to_steps();
        if position.x % UNITS_PER_STEP != 0 || position.y % UNITS_PER_STEP != 0 {
            problems.push(format!(
                "marcher {} at ({x}, {y}) is not on a whole step",
                MarcherId(marcher)
            ));
        }
        if let Some(&other) = seen.get(position) {
            problems.push(format!(
                "marchers {} and {} share position ({x}, {y})",
                MarcherId(other),
                MarcherId(marcher)
            ));
        } else {
            seen.insert(*position, marcher);
        }
    }
    problems
}

fn whole_steps(delta: Coord) -> (u32, u32) {
    (
        units_to_whole_steps(delta.x).unsigned_abs(),
        units_to_whole_steps(delta.y).unsigned_abs(),
    )
}

/// Smallest-index-rooted union-find over marcher indices.
struct Groups {
    parent: Vec<usize>,
}

impl Groups {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut m: usize) -> usize {
        while self.parent[m] != m {
            self.parent[m] = self.parent[self.parent[m]];
            m = self.parent[m];
        }
        m
    }

    fn join(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        self.parent[hi] = lo;
    }
}

impl Problem {
    /// Prepares the transition from `starts` to `ends`.
    ///
    /// Checks run in a fixed order so degenerate inputs fail fast: enabled
    /// instructions, group membership, marcher counts, the already-there
    /// case, position validity, destination matching, then instruction fit.
    pub fn build(
        starts: &[Coord],
        ends: &[Coord],
        params: &TransitionSolverParams,
        config: &SolverConfig,
    ) -> Result<Setup, Infeasible> {
        let instructions: Vec<(usize, MarcherInstruction)> = params.enabled().collect();
        if instructions.is_empty() {
            return Err(Infeasible::NoInstructions);
        }
        if let Some(empty) = params.groups.iter().position(|g| g.members.is_empty()) {
            return Err(Infeasible::EmptyGroup(empty));
        }
        if starts.len() != ends.len() {
            return Err(Infeasible::CountMismatch {
                start: starts.len(),
                end: ends.len(),
            });
        }
        if starts == ends {
            return Ok(Setup::AlreadyThere);
        }
        for positions in [starts, ends] {
            if let Some(problem) = position_problems(positions).into_iter().next() {
                return Err(Infeasible::InvalidSheet(problem));
            }
        }

        let n = starts.len();
        let destinations = Self::match_destinations(starts, ends, params, config.max_beats)?;
        let (units, unit_of) = Self::units(n, params);
        let tracks = Self::tracks(starts, &destinations, &instructions, config.max_beats);

        let mut built = Vec::with_capacity(units.len());
        for (index, members) in units.into_iter().enumerate() {
            let mut options: Vec<(usize, u32)> = (0..instructions.len())
                .filter_map(|k| {
                    members
                        .iter()
                        .map(|&m| tracks[m][k].as_ref().map(|t| t.finish))
                        .try_fold(0, |acc, finish| finish.map(|f| acc.max(f)))
                        .map(|cost| (k, cost))
                })
                .collect();
            if options.is_empty() {
                return Err(Infeasible::NoInstructionFits(index));
            }
            options.sort_by_key(|&(k, cost)| (cost, k));
            built.push(Unit { members, options });
        }
        let lower_bound = built.iter().map(|u| u.cost(0)).max().unwrap_or(0);

        Ok(Setup::Search(Self {
            destinations,
            instructions,
            units: built,
            unit_of,
            tracks,
            lower_bound,
        }))
    }

    fn match_destinations(
        starts: &[Coord],
        ends: &[Coord],
        params: &TransitionSolverParams,
        max_beats: u32,
    ) -> Result<Vec<Coord>, Infeasible> {
        let n = starts.len();
        let mut allowed: Vec<Option<BTreeSet<usize>>> = vec![None; n];
        for group in &params.groups {
            for member in group.members.iter().filter(|m| m.index() < n) {
                allowed[member.index()]
                    .get_or_insert_with(BTreeSet::new)
                    .extend(group.allowed_destinations.iter().map(|d| d.index()));
            }
        }
        let costs: Vec<Vec<Option<u32>>> = starts
            .iter()
            .enumerate()
            .map(|(m, &start)| {
                ends.iter()
                    .enumerate()
                    .map(|(d, &end)| {
                        let (dx, dy) = whole_steps(end - start);
                        let distance = dx.saturating_add(dy);
                        let permitted = allowed[m].as_ref().is_none_or(|set| set.contains(&d));
                        (permitted && distance <= max_beats).then_some(distance)
                    })
                    .collect()
            })
            .collect();
        let assignment =
            min_cost_assignment(&costs).ok_or(Infeasible::NoMatching(max_beats))?;
        Ok(assignment.into_iter().map(|d| ends[d]).collect())
    }

    fn units(n: usize, params: &TransitionSolverParams) -> (Vec<Vec<usize>>, Vec<usize>) {
        let mut groups = Groups::new(n);
        for group in &params.groups {
            let mut members = group.members.iter().map(|m| m.index()).filter(|&m| m < n);
            if let Some(first) = members.next() {
                for other in members {
                    groups.join(first, other);
                }
            }
        }
        let mut index_of_root: BTreeMap<usize, usize> = BTreeMap::new();
        let mut units: Vec<Vec<usize>> = Vec::new();
        let mut unit_of = vec![0; n];
        for m in 0..n {
            let root = groups.find(m);
            let unit = *index_of_root.entry(root).or_insert_with(|| {
                units.push(Vec::new());
                units.len() - 1
            });
            units[unit].push(m);
            unit_of[m] = unit;
        }
        (units, unit_of)
    }

    fn tracks(
        starts: &[Coord],
        destinations: &[Coord],
        instructions: &[(usize, MarcherInstruction)],
        max_beats: u32,
    ) -> Vec<Vec<Option<Track>>> {
        let compiled: Vec<Option<ProcedureList>> = instructions
            .iter()
            .map(|(slot, instruction)| match compile(&instruction.continuity()) {
                Ok(list) => Some(list),
                Err(err) => {
                    warn!(slot, %instruction, %err, "instruction continuity does not compile");
                    None
                }
            })
            .collect();
        starts
            .iter()
            .zip(destinations)
            .map(|(&start, &dest)| {
                let (dx, dy) = whole_steps(dest - start);
                instructions
                    .iter()
                    .zip(&compiled)
                    .map(|((_, instruction), list)| {
                        let finish = instruction.beats_for(dx, dy);
                        if finish > max_beats {
                            return None;
                        }
                        let ctx = ExecContext {
                            beats: finish,
                            start,
                            start_facing: direction::E,
                            sheet_position: start,
                            next: Some(dest),
                            refs: [RefTrack::Fixed(start); 3],
                            empty_continuity: exec::EmptyContinuity::HoldPosition,
                        };
                        let plan = exec::plan(list.as_ref()?, &ctx, &mut Variables::new());
                        (plan.diagnostics().is_empty() && plan.end_position() == dest).then(|| {
                            Track {
                                finish,
                                positions: plan.track(),
                            }
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Number of units to assign.
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Cheapest possible finish of `assignment` (option index per unit).
    pub fn cost(&self, assignment: &[usize]) -> u32 {
        self.units
            .iter()
            .zip(assignment)
            .map(|(unit, &option)| unit.cost(option))
            .max()
            .unwrap_or(0)
    }

    /// Enabled-instruction index a unit uses under `option`.
    pub fn instruction(&self, unit: usize, option: usize) -> usize {
        self.units[unit].options[option].0
    }

    fn track(&self, marcher: usize, assignment: &[usize]) -> &Track {
        let unit = self.unit_of[marcher];
        let k = self.instruction(unit, assignment[unit]);
        // Unit options only list instructions usable by every member.
        match &self.tracks[marcher][k] {
            Some(track) => track,
            None => unreachable!("unit option without a track"),
        }
    }

    /// Replays `assignment` beat by beat and reports collisions.
    ///
    /// Two marchers collide when they stand less than a step apart on a
    /// beat, or when they pass through the same point between two beats
    /// (swapping places or crossing diagonals). Candidates no faster than
    /// `best` are not replayed. `on_beat` receives the fraction replayed.
    pub fn evaluate(
        &self,
        assignment: &[usize],
        best: Option<u32>,
        mut on_beat: impl FnMut(f64),
    ) -> Verdict {
        let beats = self.cost(assignment);
        if best.is_some_and(|b| beats >= b) {
            return Verdict::Pruned(beats);
        }
        let n = self.unit_of.len();
        let tracks: Vec<&Track> = (0..n).map(|m| self.track(m, assignment)).collect();
        let mut colliding: BTreeSet<usize> = BTreeSet::new();
        let mut previous: Vec<Coord> = tracks.iter().map(|t| t.at(0)).collect();
        let mut flag = |a: usize, b: usize| {
            colliding.insert(self.unit_of[a]);
            colliding.insert(self.unit_of[b]);
        };

        for beat in 0..=beats {
            let positions: Vec<Coord> = tracks.iter().map(|t| t.at(beat)).collect();
            for (a, b, _) in CollisionSet::detect(&positions, CollisionPolicy::IntersectOnly).iter()
            {
                flag(a.index(), b.index());
            }
            if beat > 0 {
                let mut midpoints: BTreeMap<Coord, usize> = BTreeMap::new();
                for m in (0..n).filter(|&m| positions[m] != previous[m]) {
                    let doubled = positions[m] + previous[m];
                    if let Some(&other) = midpoints.get(&doubled) {
                        flag(other, m);
                    } else {
                        midpoints.insert(doubled, m);
                    }
                }
            }
            previous = positions;
            on_beat(f64::from(beat + 1) / f64::from(beats + 1));
        }

        if colliding.is_empty() {
            Verdict::Valid(beats)
        } else {
            Verdict::Collides {
                beats,
                units: colliding.into_iter().collect(),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::params::{AlgorithmIdentifier, GroupConstraint, MovementPattern};

    fn c(x: i32, y: i32) -> Coord {
        Coord::from_steps(x, y)
    }

    fn params(instructions: &[MarcherInstruction]) -> TransitionSolverParams {
        TransitionSolverParams::with_instructions(
            AlgorithmIdentifier::default(),
            instructions.iter().copied(),
        )
    }

    fn problem(starts: &[Coord], ends: &[Coord], params: &TransitionSolverParams) -> Problem {
        match Problem::build(starts, ends, params, &SolverConfig::default()) {
            Ok(Setup::Search(p)) => p,
            other => panic!("expected a search, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_inputs_fail_in_order() {
        let none = TransitionSolverParams::default();
        let starts = [c(0, 0)];
        assert_eq!(
            Problem::build(&starts, &starts, &none, &SolverConfig::default()).unwrap_err(),
            Infeasible::NoInstructions
        );
        let one = params(&[MarcherInstruction::default()]);
        let empty_group = one.clone().with_group(GroupConstraint::new([], [0]));
        assert_eq!(
            Problem::build(&starts, &starts, &empty_group, &SolverConfig::default()).unwrap_err(),
            Infeasible::EmptyGroup(0)
        );
        assert!(matches!(
            Problem::build(&starts, &[], &one, &SolverConfig::default()),
            Err(Infeasible::CountMismatch { start: 1, end: 0 })
        ));
        assert!(matches!(
            Problem::build(&starts, &starts, &one, &SolverConfig::default()),
            Ok(Setup::AlreadyThere)
        ));
    }

    #[test]
    fn matching_respects_allowed_destinations() {
        let starts = [c(0, 0), c(4, 0)];
        let ends = [c(0, 4), c(4, 4)];
        let crossed = params(&[MarcherInstruction::new(MovementPattern::Ewns, 0)])
            .with_group(GroupConstraint::new([0], [1]));
        let p = problem(&starts, &ends, &crossed);
        assert_eq!(p.destinations, vec![c(4, 4), c(0, 4)]);

        let nowhere = params(&[MarcherInstruction::default()])
            .with_group(GroupConstraint::new([0, 1], []));
        assert_eq!(
            Problem::build(&starts, &ends, &nowhere, &SolverConfig::default()).unwrap_err(),
            Infeasible::NoMatching(48)
        );
    }

    #[test]
    fn groups_share_one_unit() {
        let starts = [c(0, 0), c(4, 0), c(8, 0)];
        let ends = [c(0, 2), c(4, 2), c(8, 2)];
        let p = problem(
            &starts,
            &ends,
            &params(&[MarcherInstruction::default()])
                .with_group(GroupConstraint::new([0, 2], [0, 2])),
        );
        assert_eq!(p.unit_count(), 2);
        assert_eq!(p.units[0].members, vec![0, 2]);
        assert_eq!(p.units[1].members, vec![1]);
    }

    #[test]
    fn options_are_sorted_by_cost() {
        let p = problem(
            &[c(0, 0)],
            &[c(3, 3)],
            &params(&[
                MarcherInstruction::new(MovementPattern::Ewns, 0),
                MarcherInstruction::new(MovementPattern::Dmhs, 1),
            ]),
        );
        assert_eq!(p.units[0].options, vec![(1, 4), (0, 6)]);
        assert_eq!(p.lower_bound, 4);
    }

    #[test]
    fn swaps_count_as_collisions() {
        let starts = [c(0, 0), c(1, 0)];
        let ends = [c(1, 0), c(0, 0)];
        let crossing = params(&[MarcherInstruction::new(MovementPattern::Nsew, 0)])
            .with_group(GroupConstraint::new([0], [0]))
            .with_group(GroupConstraint::new([1], [1]));
        let p = problem(&starts, &ends, &crossing);
        assert_eq!(p.destinations, vec![c(1, 0), c(0, 0)]);
        assert_eq!(
            p.evaluate(&[0, 0], None, |_| {}),
            Verdict::Collides {
                beats: 1,
                units: vec![0, 1]
            }
        );
    }

    #[test]
    fn slower_candidates_are_pruned() {
        let p = problem(
            &[c(0, 0)],
            &[c(2, 0)],
            &params(&[MarcherInstruction::new(MovementPattern::Nsew, 0)]),
        );
        let mut seen = Vec::new();
        assert_eq!(p.evaluate(&[0], None, |f| seen.push(f)), Verdict::Valid(2));
        assert_eq!(seen.len(), 3);
        assert_eq!(p.evaluate(&[0], Some(2), |_| {}), Verdict::Pruned(2));
    }

    #[test]
    fn position_checks_flag_fractions_and_duplicates() {
        let problems = position_problems(&[c(0, 0), Coord::new(8, 0), c(0, 0)]);
        assert_eq!(problems.len(), 2);
        assert!(problems[0].contains("whole step"));
        assert!(problems[1].contains("#0 and #2"));
    }
}
