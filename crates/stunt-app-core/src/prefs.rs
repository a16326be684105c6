// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted preferences for stunt tools (animation + solver defaults).

use serde::{Deserialize, Serialize};
use stunt_core::exec::EmptyContinuity;
use stunt_core::{AnimationConfig, CollisionPolicy};
use stunt_solver::{
    AlgorithmIdentifier, MarcherInstruction, MovementPattern, SolverConfig,
    TransitionSolverParams,
};

/// Key the preference bundle is stored under.
pub const PREFS_KEY: &str = "prefs";

/// Everything a stunt tool remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StuntPrefs {
    /// Timeline building.
    pub animation: AnimationPrefs,
    /// Transition solving.
    pub solver: SolverPrefs,
}

/// How timelines are built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationPrefs {
    /// Behavior of sheets whose continuity is empty.
    pub empty_continuity: EmptyContinuity,
    /// Whether one-step separations count as collisions.
    pub collision_policy: CollisionPolicy,
}

impl From<AnimationPrefs> for AnimationConfig {
    fn from(prefs: AnimationPrefs) -> Self {
        Self {
            empty_continuity: prefs.empty_continuity,
            collision_policy: prefs.collision_policy,
        }
    }
}

/// Default solver run settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverPrefs {
    /// Strategy.
    pub algorithm: AlgorithmIdentifier,
    /// Instruction library, at most eight entries, all enabled.
    pub instructions: Vec<MarcherInstruction>,
    /// Candidate budget.
    pub max_candidates: u64,
    /// Longest transition considered.
    pub max_beats: u32,
    /// Worker event queue size.
    pub channel_capacity: usize,
}

impl Default for SolverPrefs {
    fn default() -> Self {
        let limits = SolverConfig::default();
        Self {
            algorithm: AlgorithmIdentifier::default(),
            instructions: MovementPattern::ALL
                .into_iter()
                .map(|p| MarcherInstruction::new(p, 0))
                .collect(),
            max_candidates: limits.max_candidates,
            max_beats: limits.max_beats,
            channel_capacity: limits.channel_capacity,
        }
    }
}

impl SolverPrefs {
    /// Solver limits.
    pub const fn config(&self) -> SolverConfig {
        SolverConfig {
            max_candidates: self.max_candidates,
            channel_capacity: self.channel_capacity,
            max_beats: self.max_beats,
        }
    }

    /// Solver params with the saved algorithm and instruction library.
    pub fn params(&self) -> TransitionSolverParams {
        TransitionSolverParams::with_instructions(self.algorithm, self.instructions.iter().copied())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_fill_in_defaults() {
        let prefs: StuntPrefs =
            serde_json::from_str(r#"{"solver": {"max_beats": 12}}"#).unwrap();
        assert_eq!(prefs.solver.max_beats, 12);
        assert_eq!(prefs.solver.instructions.len(), 4);
        assert_eq!(prefs.animation, AnimationPrefs::default());
    }

    #[test]
    fn prefs_convert_to_run_settings() {
        let prefs = StuntPrefs {
            animation: AnimationPrefs {
                empty_continuity: EmptyContinuity::EvenToNext,
                collision_policy: CollisionPolicy::IncludeWarnings,
            },
            solver: SolverPrefs {
                instructions: vec![MarcherInstruction::new(MovementPattern::Hsdm, 2)],
                ..SolverPrefs::default()
            },
        };
        let config = AnimationConfig::from(prefs.animation);
        assert_eq!(config.empty_continuity, EmptyContinuity::EvenToNext);
        let params = prefs.solver.params();
        assert_eq!(params.enabled().count(), 1);
        assert_eq!(prefs.solver.config(), SolverConfig::default());
    }
}
