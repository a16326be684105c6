// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Marching directions.
//!
//! Directions are plain `f64` degrees. The field coordinate system is
//! clockwise: `N` is 0° along `+x`, `W` is 90° along `-y`, `S` is 180° and
//! `E` is 270° along `+y`.

use crate::coord::{float_to_units, Coord};

/// North.
pub const N: f64 = 0.0;
/// Northwest.
pub const NW: f64 = 45.0;
/// West.
pub const W: f64 = 90.0;
/// Southwest.
pub const SW: f64 = 135.0;
/// South.
pub const S: f64 = 180.0;
/// Southeast.
pub const SE: f64 = 225.0;
/// East.
pub const E: f64 = 270.0;
/// Northeast.
pub const NE: f64 = 315.0;

/// Tolerance used when comparing directions and other derived floats.
pub const EPSILON: f64 = 1e-5;

/// Returns `true` when `value` is within [`EPSILON`] of zero.
#[must_use]
pub fn is_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Normalizes a direction into `[0, 360)`.
#[must_use]
pub fn bound_direction(degrees: f64) -> f64 {
    let bounded = degrees.rem_euclid(360.0);
    if bounded >= 360.0 {
        0.0
    } else {
        bounded
    }
}

/// Normalizes a direction into `[-180, 180)`.
#[must_use]
pub fn bound_direction_signed(degrees: f64) -> f64 {
    let bounded = bound_direction(degrees);
    if bounded >= 180.0 {
        bounded - 360.0
    } else {
        bounded
    }
}

/// Returns `true` for the four diagonal directions (45°, 135°, 225°, 315°).
#[must_use]
pub fn is_diagonal(degrees: f64) -> bool {
    let bounded = bound_direction(degrees);
    [NW, SW, SE, NE].iter().any(|diag| is_zero(bounded - diag))
}

/// Unit vector for a direction, in step space.
#[must_use]
pub fn unit_vector(degrees: f64) -> (f64, f64) {
    let radians = bound_direction(degrees).to_radians();
    (radians.cos(), -radians.sin())
}

/// Unit vector where a diagonal step advances one whole step on each axis.
#[must_use]
pub fn marching_unit_vector(degrees: f64) -> (f64, f64) {
    let (x, y) = unit_vector(degrees);
    if is_diagonal(degrees) {
        let scale = core::f64::consts::SQRT_2 / 2.0;
        (x / scale, y / scale)
    } else {
        (x, y)
    }
}

/// Displacement for `steps` marching steps in `degrees`.
///
/// Diagonal directions use [`marching_unit_vector`], so `steps` diagonal steps
/// travel `steps` whole steps along both axes.
#[must_use]
pub fn marching_vector(degrees: f64, steps: f64) -> Coord {
    let (x, y) = marching_unit_vector(degrees);
    Coord::new(float_to_units(x * steps), float_to_units(y * steps))
}

/// Displacement of Euclidean length `steps` in `degrees`.
#[must_use]
pub fn vector(degrees: f64, steps: f64) -> Coord {
    let (x, y) = unit_vector(degrees);
    Coord::new(float_to_units(x * steps), float_to_units(y * steps))
}
