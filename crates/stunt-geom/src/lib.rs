// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Field geometry for stunt shows.

This crate provides:
- Fixed-point field positions (`Coord`), 16 units per marching step.
- Marching directions in degrees and the vector helpers built on them.
- Collision classification between two marcher positions (`CollisionKind`).
- A broad-phase trait with an all-pairs baseline and a uniform grid.
- A typed beat index (`Beat`).

Design notes:
- Deterministic: integer positions, no ambient state, canonical pair ordering.
- Floating point only enters through directions and is rounded back to
  coordinate units exactly once per conversion.
"]

/// Beat indices.
pub mod beat;
/// Broad-phase pairing of nearby marchers.
pub mod broad;
/// Collision classification.
pub mod collision;
/// Fixed-point field positions.
pub mod coord;
/// Marching directions and vector construction.
pub mod direction;

pub use beat::Beat;
pub use collision::CollisionKind;
pub use coord::{Coord, UNITS_PER_STEP};
