// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Solver inputs: instructions, groups and tuning knobs.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use stunt_core::MarcherId;

/// Size of the instruction library; one slot per marcher symbol.
pub const MAX_INSTRUCTIONS: usize = 8;

/// Search strategy used by the solver.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmIdentifier {
    /// Exhaustive enumeration of per-unit instruction choices.
    #[default]
    ChiuZamoraMalani,
    /// Local search that repairs collisions one unit at a time.
    NaminiaslRamirezZhang,
    /// Enumeration in order of increasing beat cost.
    SoverEliceiriHershkovitz,
}

impl AlgorithmIdentifier {
    /// Every strategy, in declaration order.
    pub const ALL: [Self; 3] = [
        Self::ChiuZamoraMalani,
        Self::NaminiaslRamirezZhang,
        Self::SoverEliceiriHershkovitz,
    ];

    /// Short name used on the command line and in preference files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChiuZamoraMalani => "chiu_zamora_malani",
            Self::NaminiaslRamirezZhang => "naminiasl_ramirez_zhang",
            Self::SoverEliceiriHershkovitz => "sover_eliceiri_hershkovitz",
        }
    }
}

impl fmt::Display for AlgorithmIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a marcher gets from its start to its destination once it moves.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPattern {
    /// East-west leg first, then north-south.
    #[default]
    Ewns,
    /// North-south leg first, then east-west.
    Nsew,
    /// Diagonal leg first, then a straight high-step leg.
    Dmhs,
    /// Straight high-step leg first, then diagonal.
    Hsdm,
}

impl MovementPattern {
    /// Every pattern, in declaration order.
    pub const ALL: [Self; 4] = [Self::Ewns, Self::Nsew, Self::Dmhs, Self::Hsdm];

    /// Continuity verb for this pattern.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Ewns => "EWNS",
            Self::Nsew => "NSEW",
            Self::Dmhs => "DMHS",
            Self::Hsdm => "HSDM",
        }
    }

    /// Parses a continuity verb, ignoring case.
    #[must_use]
    pub fn from_verb(verb: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.verb().eq_ignore_ascii_case(verb))
    }

    /// Beats needed to cover a displacement of `(dx, dy)` whole steps.
    ///
    /// The straight patterns walk both legs at one step per beat; the
    /// diagonal ones cover the shorter axis during the diagonal leg.
    #[must_use]
    pub const fn beats_for(self, dx: u32, dy: u32) -> u32 {
        match self {
            Self::Ewns | Self::Nsew => dx.saturating_add(dy),
            Self::Dmhs | Self::Hsdm => {
                if dx > dy {
                    dx
                } else {
                    dy
                }
            }
        }
    }
}

impl fmt::Display for MovementPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Mark time for `wait_beats`, then move with `pattern`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarcherInstruction {
    /// Movement after the wait.
    pub pattern: MovementPattern,
    /// Beats of mark time before moving.
    #[serde(default)]
    pub wait_beats: u32,
}

impl MarcherInstruction {
    /// Creates an instruction.
    #[must_use]
    pub const fn new(pattern: MovementPattern, wait_beats: u32) -> Self {
        Self {
            pattern,
            wait_beats,
        }
    }

    /// Continuity text a marcher following this instruction runs.
    #[must_use]
    pub fn continuity(&self) -> String {
        if self.wait_beats == 0 {
            format!("{} NP\nMTRM E", self.pattern)
        } else {
            format!("MT {} E\n{} NP\nMTRM E", self.wait_beats, self.pattern)
        }
    }

    /// Total beats for a displacement of `(dx, dy)` whole steps.
    #[must_use]
    pub const fn beats_for(&self, dx: u32, dy: u32) -> u32 {
        self.wait_beats.saturating_add(self.pattern.beats_for(dx, dy))
    }
}

impl fmt::Display for MarcherInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pattern, self.wait_beats)
    }
}

/// Marchers that share one instruction and a set of permitted destinations.
///
/// Destinations are marcher indices on the end sheet. A marcher listed in
/// several groups may finish at any destination of any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConstraint {
    /// Marchers in the group.
    pub members: BTreeSet<MarcherId>,
    /// End-sheet points the members may finish on.
    pub allowed_destinations: BTreeSet<MarcherId>,
}

impl GroupConstraint {
    /// Creates a group from member and destination indices.
    pub fn new(
        members: impl IntoIterator<Item = usize>,
        allowed_destinations: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            members: members.into_iter().map(MarcherId).collect(),
            allowed_destinations: allowed_destinations.into_iter().map(MarcherId).collect(),
        }
    }
}

/// Everything the caller chooses about one solver run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSolverParams {
    /// Search strategy.
    #[serde(default)]
    pub algorithm: AlgorithmIdentifier,
    /// Group constraints; marchers in no group are unconstrained.
    #[serde(default)]
    pub groups: Vec<GroupConstraint>,
    /// Instruction library.
    pub available_instructions: [MarcherInstruction; MAX_INSTRUCTIONS],
    /// Which library slots the solver may use.
    pub instruction_mask: [bool; MAX_INSTRUCTIONS],
}

impl TransitionSolverParams {
    /// Params with `instructions` enabled in the first slots; extra
    /// instructions beyond the library size are ignored.
    pub fn with_instructions(
        algorithm: AlgorithmIdentifier,
        instructions: impl IntoIterator<Item = MarcherInstruction>,
    ) -> Self {
        let mut params = Self {
            algorithm,
            ..Self::default()
        };
        for (slot, instruction) in instructions.into_iter().take(MAX_INSTRUCTIONS).enumerate() {
            params.available_instructions[slot] = instruction;
            params.instruction_mask[slot] = true;
        }
        params
    }

    /// Adds a group constraint.
    #[must_use]
    pub fn with_group(mut self, group: GroupConstraint) -> Self {
        self.groups.push(group);
        self
    }

    /// Enabled library slots with their instructions, in slot order.
    pub fn enabled(&self) -> impl Iterator<Item = (usize, MarcherInstruction)> + '_ {
        self.available_instructions
            .iter()
            .zip(self.instruction_mask)
            .enumerate()
            .filter(|(_, (_, on))| *on)
            .map(|(slot, (instruction, _))| (slot, *instruction))
    }
}

/// Limits for one solver run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Candidates evaluated before the search gives up with its best so far.
    pub max_candidates: u64,
    /// Capacity of the worker's event queue.
    pub channel_capacity: usize,
    /// Longest transition considered; farther destinations are unreachable.
    pub max_beats: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_candidates: 100_000,
            channel_capacity: 64,
            max_beats: 48,
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn continuity_text_waits_then_moves() {
        assert_eq!(
            MarcherInstruction::new(MovementPattern::Nsew, 0).continuity(),
            "NSEW NP\nMTRM E"
        );
        assert_eq!(
            MarcherInstruction::new(MovementPattern::Dmhs, 3).continuity(),
            "MT 3 E\nDMHS NP\nMTRM E"
        );
    }

    #[test]
    fn beat_costs_per_pattern() {
        assert_eq!(MovementPattern::Ewns.beats_for(3, 4), 7);
        assert_eq!(MovementPattern::Hsdm.beats_for(3, 4), 4);
        assert_eq!(MarcherInstruction::new(MovementPattern::Dmhs, 2).beats_for(5, 1), 7);
    }

    #[test]
    fn enabled_slots_follow_the_mask() {
        let mut params = TransitionSolverParams::with_instructions(
            AlgorithmIdentifier::default(),
            [
                MarcherInstruction::new(MovementPattern::Ewns, 0),
                MarcherInstruction::new(MovementPattern::Nsew, 2),
            ],
        );
        params.instruction_mask[0] = false;
        let enabled: Vec<_> = params.enabled().collect();
        assert_eq!(enabled, vec![(1, MarcherInstruction::new(MovementPattern::Nsew, 2))]);
    }

    #[test]
    fn params_round_trip_through_json() {
        let params = TransitionSolverParams::with_instructions(
            AlgorithmIdentifier::SoverEliceiriHershkovitz,
            [MarcherInstruction::new(MovementPattern::Hsdm, 1)],
        )
        .with_group(GroupConstraint::new([0, 1], [2]));
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("sover_eliceiri_hershkovitz"));
        let back: TransitionSolverParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
        assert_eq!(MovementPattern::from_verb("hsdm"), Some(MovementPattern::Hsdm));
    }
}
