// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Beat-stepped motion primitives produced by procedures.

use serde::{Deserialize, Serialize};
use stunt_geom::coord::float_to_units;
use stunt_geom::Coord;

/// How a marcher is stepping on a given beat.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStyle {
    /// Travelling.
    #[default]
    Marching,
    /// Marking time in place.
    MarkTime,
    /// Standing in close position.
    Close,
}

/// One motion primitive covering `beats()` beats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Stay in place.
    Still {
        /// Duration.
        beats: u32,
        /// Facing direction in degrees.
        facing: f64,
        /// [`StepStyle::MarkTime`] or [`StepStyle::Close`].
        style: StepStyle,
    },
    /// Travel `vector` evenly over `beats` (instantly when `beats` is 0).
    Move {
        /// Duration.
        beats: u32,
        /// Total displacement.
        vector: Coord,
        /// Facing direction in degrees.
        facing: f64,
    },
    /// Arc about `origin` from `start_angle` to `end_angle`.
    Rotate {
        /// Duration.
        beats: u32,
        /// Pivot.
        origin: Coord,
        /// Radius in coordinate units.
        radius: f64,
        /// Starting polar angle in degrees.
        start_angle: f64,
        /// Final polar angle in degrees.
        end_angle: f64,
        /// Marcher faces against the direction of travel.
        backwards: bool,
    },
}

impl Command {
    /// Mark time facing `facing`.
    #[must_use]
    pub const fn mark_time(beats: u32, facing: f64) -> Self {
        Self::Still {
            beats,
            facing,
            style: StepStyle::MarkTime,
        }
    }

    /// Move along `vector`, facing the way of travel.
    #[must_use]
    pub fn travel(beats: u32, vector: Coord) -> Self {
        Self::Move {
            beats,
            vector,
            facing: vector.direction(),
        }
    }

    /// Duration in beats.
    #[must_use]
    pub const fn beats(&self) -> u32 {
        match self {
            Self::Still { beats, .. } | Self::Move { beats, .. } | Self::Rotate { beats, .. } => {
                *beats
            }
        }
    }

    /// Shortens the command to `beats`.
    ///
    /// A clipped move still covers its whole vector; a clipped rotation stops
    /// part way round its arc.
    pub fn clip(&mut self, new_beats: u32) {
        match self {
            Self::Still { beats, .. } | Self::Move { beats, .. } => *beats = new_beats,
            Self::Rotate {
                beats,
                start_angle,
                end_angle,
                ..
            } => {
                if *beats > 0 {
                    *end_angle = *start_angle
                        + (*end_angle - *start_angle) * f64::from(new_beats) / f64::from(*beats);
                }
                *beats = new_beats;
            }
        }
    }

    fn angle_at(start_angle: f64, end_angle: f64, beats: u32, beat: u32) -> f64 {
        if beats == 0 {
            start_angle
        } else {
            (end_angle - start_angle) * f64::from(beat) / f64::from(beats) + start_angle
        }
    }

    fn on_arc(origin: Coord, radius: f64, degrees: f64) -> Coord {
        let radians = degrees.to_radians();
        // radius is already in coordinate units; round once per axis.
        let step = f64::from(stunt_geom::UNITS_PER_STEP);
        Coord::new(
            origin.x.saturating_add(float_to_units(radians.cos() * radius / step)),
            origin.y.saturating_sub(float_to_units(radians.sin() * radius / step)),
        )
    }

    /// Position `beat` beats into the command, starting from `start`.
    ///
    /// Moves advance by `beat * v / n` with truncating integer division, so
    /// the final beat always lands exactly on `start + v`.
    #[must_use]
    pub fn position_at(&self, start: Coord, beat: u32) -> Coord {
        match self {
            Self::Still { .. } => start,
            Self::Move { beats, vector, .. } => {
                if *beats == 0 || beat >= *beats {
                    return start + *vector;
                }
                let n = i64::from(*beats);
                let b = i64::from(beat);
                let dx = b * i64::from(vector.x) / n;
                let dy = b * i64::from(vector.y) / n;
                // |dx| <= |vector.x| so the narrowing cannot overflow.
                start + Coord::new(
                    i32::try_from(dx).unwrap_or(vector.x),
                    i32::try_from(dy).unwrap_or(vector.y),
                )
            }
            Self::Rotate {
                beats,
                origin,
                radius,
                start_angle,
                end_angle,
                ..
            } => {
                let angle = Self::angle_at(*start_angle, *end_angle, *beats, beat.min(*beats));
                Self::on_arc(*origin, *radius, angle)
            }
        }
    }

    /// Position after the whole command.
    #[must_use]
    pub fn end_position(&self, start: Coord) -> Coord {
        self.position_at(start, self.beats())
    }

    /// Facing `beat` beats into the command.
    #[must_use]
    pub fn facing_at(&self, beat: u32) -> f64 {
        match self {
            Self::Still { facing, .. } | Self::Move { facing, .. } => *facing,
            Self::Rotate {
                beats,
                start_angle,
                end_angle,
                backwards,
                ..
            } => {
                let angle = Self::angle_at(*start_angle, *end_angle, *beats, beat.min(*beats));
                let face = if *backwards { -90.0 } else { 90.0 };
                if end_angle > start_angle {
                    angle + face
                } else {
                    angle - face
                }
            }
        }
    }

    /// Facing once the command completes.
    #[must_use]
    pub fn end_facing(&self) -> f64 {
        self.facing_at(self.beats())
    }

    /// Direction of travel, or the facing when standing still.
    #[must_use]
    pub fn motion_direction(&self) -> f64 {
        match self {
            Self::Move { vector, .. } => vector.direction(),
            _ => self.end_facing(),
        }
    }

    /// Step style while the command runs.
    #[must_use]
    pub const fn style(&self) -> StepStyle {
        match self {
            Self::Still { style, .. } => *style,
            Self::Move { .. } | Self::Rotate { .. } => StepStyle::Marching,
        }
    }
}
