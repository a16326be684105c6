// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};
use stunt_geom::{direction, Coord};

use crate::continuity::Var;

/// Per-marcher variable storage.
///
/// Variables persist across the sheets of one timeline build. Reading an
/// unset variable is an [`Undefined`](super::AnimateErrorKind::Undefined)
/// problem and yields 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Variables {
    values: [Option<f64>; Var::ALL.len()],
}

impl Variables {
    /// Creates an empty set of variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a variable.
    #[must_use]
    pub fn get(&self, var: Var) -> Option<f64> {
        self.values[var.index()]
    }

    /// Writes a variable.
    pub fn set(&mut self, var: Var, value: f64) {
        self.values[var.index()] = Some(value);
    }
}

/// Where a reference point is during a sheet.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RefTrack<'a> {
    /// A fixed field position.
    Fixed(Coord),
    /// Another marcher's per-beat positions on this sheet; index `b` is the
    /// position at sheet beat `b`, the last entry is where it ends up.
    Follow(&'a [Coord]),
}

impl RefTrack<'_> {
    /// Position at sheet beat `beat`.
    #[must_use]
    pub fn at(&self, beat: u32, fallback: Coord) -> Coord {
        match self {
            Self::Fixed(c) => *c,
            Self::Follow(track) => usize::try_from(beat)
                .ok()
                .and_then(|b| track.get(b))
                .or_else(|| track.last())
                .copied()
                .unwrap_or(fallback),
        }
    }
}

/// What an empty continuity does.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyContinuity {
    /// Mark time in place for the whole sheet, with no fix-up move.
    #[default]
    HoldPosition,
    /// `EVEN REM NP` when a next sheet exists, otherwise `MTRM E`.
    EvenToNext,
}

/// Everything a marcher's procedures may read on one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecContext<'a> {
    /// Beats on the sheet.
    pub beats: u32,
    /// Where the marcher actually begins the sheet.
    pub start: Coord,
    /// Facing at the start of the sheet.
    pub start_facing: f64,
    /// The marcher's point on this sheet (`SP`, `R0`).
    pub sheet_position: Coord,
    /// The marcher's point on the next animated sheet (`NP`).
    pub next: Option<Coord>,
    /// Reference points `R1`..`R3`.
    pub refs: [RefTrack<'a>; 3],
    /// Behavior for empty continuities.
    pub empty_continuity: EmptyContinuity,
}

impl ExecContext<'static> {
    /// A context with no next sheet whose references all sit on `start`.
    #[must_use]
    pub fn standalone(start: Coord, beats: u32) -> Self {
        Self {
            beats,
            start,
            start_facing: direction::E,
            sheet_position: start,
            next: None,
            refs: [RefTrack::Fixed(start); 3],
            empty_continuity: EmptyContinuity::HoldPosition,
        }
    }
}
