// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use stunt_geom::Coord;

use super::command::{Command, StepStyle};
use super::error::Diagnostic;

/// A marcher at one beat of a sheet.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarcherState {
    /// Beat within the sheet, starting at 0.
    pub beat: u32,
    /// Position at the start of the beat.
    pub position: Coord,
    /// Facing direction in degrees.
    pub facing: f64,
    /// Step style on this beat.
    pub style: StepStyle,
    /// Beats left on the sheet after this one.
    pub remaining: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Segment {
    pub start_beat: u32,
    pub start: Coord,
    pub command: Command,
}

/// The executed form of one marcher's procedures on one sheet.
///
/// Built once, then sampled per beat. The commands always cover exactly
/// `beats` beats, so a [`Run`] yields exactly `beats` states.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub(crate) beats: u32,
    pub(crate) start: Coord,
    pub(crate) start_facing: f64,
    /// Commands with at least one beat, in order.
    pub(crate) segments: Vec<Segment>,
    pub(crate) end: Coord,
    pub(crate) end_facing: f64,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Plan {
    /// A plan that stands still at `start` for `beats` beats.
    #[must_use]
    pub fn hold(start: Coord, facing: f64, beats: u32) -> Self {
        let segments = if beats == 0 {
            Vec::new()
        } else {
            vec![Segment {
                start_beat: 0,
                start,
                command: Command::mark_time(beats, facing),
            }]
        };
        Self {
            beats,
            start,
            start_facing: facing,
            segments,
            end: start,
            end_facing: facing,
            diagnostics: Vec::new(),
        }
    }

    /// Beats covered by the plan.
    #[must_use]
    pub const fn beats(&self) -> u32 {
        self.beats
    }

    /// Position at beat 0, before any zero-beat command applies.
    #[must_use]
    pub const fn start_position(&self) -> Coord {
        self.start
    }

    /// Facing the marcher had entering the sheet.
    #[must_use]
    pub const fn start_facing(&self) -> f64 {
        self.start_facing
    }

    /// Position after the last beat.
    #[must_use]
    pub const fn end_position(&self) -> Coord {
        self.end
    }

    /// Facing after the last beat.
    #[must_use]
    pub const fn end_facing(&self) -> f64 {
        self.end_facing
    }

    /// Problems reported while building the plan.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Commands in execution order, zero-beat commands excluded.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.segments.iter().map(|s| &s.command)
    }

    /// State at sheet beat `beat`.
    ///
    /// # Panics
    /// Panics when `beat >= self.beats()`; callers index within the sheet.
    #[must_use]
    pub fn state_at(&self, beat: u32) -> MarcherState {
        assert!(
            beat < self.beats,
            "beat {beat} out of range for a {}-beat plan",
            self.beats
        );
        let idx = self
            .segments
            .partition_point(|s| s.start_beat + s.command.beats() <= beat);
        let (position, facing, style) = self.segments.get(idx).map_or(
            (self.end, self.end_facing, StepStyle::MarkTime),
            |seg| {
                let offset = beat - seg.start_beat;
                (
                    seg.command.position_at(seg.start, offset),
                    seg.command.facing_at(offset),
                    seg.command.style(),
                )
            },
        );
        MarcherState {
            beat,
            position,
            facing,
            style,
            remaining: self.beats - beat - 1,
        }
    }

    /// The state one beat after `state`, or `None` at the end of the sheet.
    #[must_use]
    pub fn step(&self, state: &MarcherState) -> Option<MarcherState> {
        let next = state.beat.checked_add(1)?;
        (next < self.beats).then(|| self.state_at(next))
    }

    /// Iterates every beat's state.
    #[must_use]
    pub fn run(&self) -> Run<'_> {
        Run {
            plan: Cow::Borrowed(self),
            next: 0,
        }
    }

    /// Consumes the plan into an iterator over every beat's state.
    #[must_use]
    pub fn into_run(self) -> Run<'static> {
        Run {
            plan: Cow::Owned(self),
            next: 0,
        }
    }

    /// Per-beat positions followed by the end position (`beats + 1` entries).
    #[must_use]
    pub fn track(&self) -> Vec<Coord> {
        self.run()
            .map(|s| s.position)
            .chain(core::iter::once(self.end))
            .collect()
    }
}

/// Lazy, restartable, finite sequence of [`MarcherState`]s, one per beat.
#[derive(Debug, Clone)]
pub struct Run<'a> {
    plan: Cow<'a, Plan>,
    next: u32,
}

impl Run<'_> {
    /// Rewinds to beat 0.
    pub fn restart(&mut self) {
        self.next = 0;
    }

    /// The plan being sampled.
    #[must_use]
    pub fn plan(&self) -> &Plan {
        &self.plan
    }
}

impl Iterator for Run<'_> {
    type Item = MarcherState;

    fn next(&mut self) -> Option<MarcherState> {
        if self.next >= self.plan.beats {
            return None;
        }
        let state = self.plan.state_at(self.next);
        self.next += 1;
        Some(state)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.plan.beats.saturating_sub(self.next)).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Run<'_> {}
