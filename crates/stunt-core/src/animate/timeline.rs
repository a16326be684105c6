// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::fmt;

use serde::{Deserialize, Serialize};
use stunt_geom::{Beat, Coord};

use super::collision::CollisionSet;
use crate::continuity::Span;
use crate::exec::{AnimateErrorKind, MarcherState, StepStyle};
use crate::show::{MarcherId, Symbol};

/// One marcher on one global beat.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// Which marcher.
    pub marcher: MarcherId,
    /// Global beat.
    pub beat: Beat,
    /// Field position.
    pub position: Coord,
    /// Facing direction in degrees.
    pub facing: f64,
    /// Step style on this beat.
    pub style: StepStyle,
}

impl Info {
    pub(crate) const fn from_state(marcher: MarcherId, beat: Beat, state: &MarcherState) -> Self {
        Self {
            marcher,
            beat,
            position: state.position,
            facing: state.facing,
            style: state.style,
        }
    }
}

/// A problem animating one marcher on one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimateError {
    /// What went wrong.
    pub kind: AnimateErrorKind,
    /// Sheet index in the show.
    pub sheet: usize,
    /// Affected marcher.
    pub marcher: MarcherId,
    /// Symbol whose continuity was running.
    pub symbol: Symbol,
    /// Continuity position, when a procedure is to blame.
    pub span: Option<Span>,
    /// Extra detail, such as the compiler's message.
    pub message: Option<String>,
}

impl fmt::Display for AnimateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sheet {}, marcher {} ({}): {}",
            self.sheet, self.marcher, self.symbol, self.kind
        )?;
        if let Some(span) = self.span {
            write!(f, " at line {}, column {}", span.line, span.column)?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AnimateError {}

/// Every problem found while building a timeline, in build order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimateErrors {
    errors: Vec<AnimateError>,
}

impl AnimateErrors {
    pub(crate) fn push(&mut self, error: AnimateError) {
        self.errors.push(error);
    }

    /// Returns `true` when the show animated cleanly.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of problems.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// All problems.
    pub fn iter(&self) -> impl Iterator<Item = &AnimateError> {
        self.errors.iter()
    }

    /// Problems on one sheet.
    pub fn for_sheet(&self, sheet: usize) -> impl Iterator<Item = &AnimateError> {
        self.errors.iter().filter(move |e| e.sheet == sheet)
    }

    /// Problems for one marcher.
    pub fn for_marcher(&self, marcher: MarcherId) -> impl Iterator<Item = &AnimateError> {
        self.errors.iter().filter(move |e| e.marcher == marcher)
    }
}

impl<'a> IntoIterator for &'a AnimateErrors {
    type Item = &'a AnimateError;
    type IntoIter = core::slice::Iter<'a, AnimateError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct SheetSpan {
    pub sheet: usize,
    pub first_beat: usize,
    pub beats: usize,
}

/// Random-access record of a whole show, one frame per global beat.
///
/// Immutable once built; rebuild from the show after any change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    pub(crate) spans: Vec<SheetSpan>,
    pub(crate) frames: Vec<Vec<Info>>,
    pub(crate) collisions: Vec<CollisionSet>,
    pub(crate) errors: AnimateErrors,
    pub(crate) end: Vec<Coord>,
}

impl Timeline {
    /// Number of global beats.
    #[must_use]
    pub fn total_beats(&self) -> usize {
        self.frames.len()
    }

    /// Every marcher on `beat`, indexed by [`MarcherId`].
    #[must_use]
    pub fn frame_at(&self, beat: Beat) -> Option<&[Info]> {
        self.frames.get(beat.index()).map(Vec::as_slice)
    }

    /// One marcher on `beat`.
    #[must_use]
    pub fn info_at(&self, beat: Beat, marcher: MarcherId) -> Option<&Info> {
        self.frame_at(beat)?.get(marcher.index())
    }

    /// Colliding pairs on `beat`.
    #[must_use]
    pub fn collisions_at(&self, beat: Beat) -> Option<&CollisionSet> {
        self.collisions.get(beat.index())
    }

    /// Sheet index and beat within that sheet for a global beat.
    #[must_use]
    pub fn sheet_at(&self, beat: Beat) -> Option<(usize, u32)> {
        let idx = self
            .spans
            .partition_point(|s| s.first_beat + s.beats <= beat.index());
        let span = self.spans.get(idx)?;
        let offset = beat.index().checked_sub(span.first_beat)?;
        Some((span.sheet, u32::try_from(offset).ok()?))
    }

    /// First global beat of sheet `sheet`, `None` for unanimated sheets.
    #[must_use]
    pub fn sheet_start(&self, sheet: usize) -> Option<Beat> {
        self.spans
            .iter()
            .find(|s| s.sheet == sheet)
            .map(|s| Beat::new(s.first_beat))
    }

    /// Problems found while building.
    #[must_use]
    pub const fn errors(&self) -> &AnimateErrors {
        &self.errors
    }

    /// Beats whose collision set is not empty.
    pub fn beats_with_collisions(&self) -> impl Iterator<Item = Beat> + '_ {
        self.collisions
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_empty())
            .map(|(i, _)| Beat::new(i))
    }

    /// Where every marcher stands once the last beat completes.
    #[must_use]
    pub fn final_positions(&self) -> &[Coord] {
        &self.end
    }
}
