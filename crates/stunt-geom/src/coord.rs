// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Fixed-point field positions.
//!
//! A [`Coord`] stores integer "coordinate units"; one marching step is
//! [`UNITS_PER_STEP`] units. All per-beat arithmetic stays in integers so a
//! long sheet never drifts. Floating point values enter through
//! [`float_to_units`], which rounds half away from zero exactly once.

use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::collision::CollisionKind;

/// Left shift that converts whole steps to coordinate units.
pub const COORD_SHIFT: u32 = 4;
/// Number of coordinate units in one marching step.
pub const UNITS_PER_STEP: i32 = 1 << COORD_SHIFT;

/// Converts a step count (possibly fractional) to coordinate units, rounding
/// half away from zero.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn float_to_units(steps: f64) -> i32 {
    let scaled = steps * f64::from(UNITS_PER_STEP);
    if scaled < 0.0 {
        (scaled - 0.5) as i32
    } else {
        (scaled + 0.5) as i32
    }
}

/// Converts coordinate units to fractional steps.
#[must_use]
pub fn units_to_steps(units: i32) -> f64 {
    f64::from(units) / f64::from(UNITS_PER_STEP)
}

/// Converts coordinate units to whole steps, truncating toward zero.
#[must_use]
pub const fn units_to_whole_steps(units: i32) -> i32 {
    units / UNITS_PER_STEP
}

/// Rounds `value` to the nearest multiple of `|modulus|` (half away from
/// zero). A zero modulus returns `value` unchanged.
#[must_use]
pub const fn round_to_multiple(value: i32, modulus: i32) -> i32 {
    let modulus = modulus.saturating_abs();
    if modulus == 0 {
        return value;
    }
    if value < 0 {
        (value.saturating_sub(modulus / 2) / modulus).saturating_mul(modulus)
    } else {
        (value.saturating_add(modulus / 2) / modulus).saturating_mul(modulus)
    }
}

/// A position (or displacement) on the field in coordinate units.
///
/// `x` grows toward `N` and `y` grows toward `E`. Arithmetic saturates at
/// the `i32` range instead of overflowing.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Coord {
    /// Horizontal component in coordinate units.
    pub x: i32,
    /// Vertical component in coordinate units.
    pub y: i32,
}

impl Coord {
    /// The origin / zero displacement.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Creates a coordinate from raw units.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Creates a coordinate from whole steps.
    #[must_use]
    pub const fn from_steps(x: i32, y: i32) -> Self {
        Self {
            x: x * UNITS_PER_STEP,
            y: y * UNITS_PER_STEP,
        }
    }

    /// Creates a coordinate from fractional steps, rounding each axis once.
    #[must_use]
    pub fn from_steps_f64(x: f64, y: f64) -> Self {
        Self {
            x: float_to_units(x),
            y: float_to_units(y),
        }
    }

    /// Returns `(x, y)` in fractional steps.
    #[must_use]
    pub fn to_steps(&self) -> (f64, f64) {
        (units_to_steps(self.x), units_to_steps(self.y))
    }

    /// Returns `true` for the zero displacement.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// Squared length in coordinate units.
    #[must_use]
    pub fn length_squared_units(&self) -> i64 {
        let x = i64::from(self.x);
        let y = i64::from(self.y);
        (x * x).saturating_add(y * y)
    }

    /// Euclidean length in steps.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        (self.length_squared_units() as f64).sqrt() / f64::from(UNITS_PER_STEP)
    }

    /// Length in steps as counted for diagonal marching.
    ///
    /// A pure diagonal displacement of `n` steps on each axis takes `n`
    /// beats, so its "diagonal marching" magnitude is `n`; every other
    /// displacement falls back to [`Coord::magnitude`].
    #[must_use]
    pub fn dm_magnitude(&self) -> f64 {
        let (x, y) = (self.x.unsigned_abs(), self.y.unsigned_abs());
        if x == y {
            f64::from(x) / f64::from(UNITS_PER_STEP)
        } else {
            self.magnitude()
        }
    }

    /// Direction of this displacement in degrees.
    ///
    /// `N` (0°) is `+x`, angles grow clockwise so `W` (90°) is `-y` and `E`
    /// (270°, reported as -90°) is `+y`. The zero vector has direction 0.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn direction(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let mag = (self.length_squared_units() as f64).sqrt();
        let cosine = (f64::from(self.x) / mag).clamp(-1.0, 1.0);
        let angle = cosine.acos().to_degrees();
        if self.y > 0 {
            -angle
        } else {
            angle
        }
    }

    /// Direction from `self` toward `other` in degrees.
    #[must_use]
    pub fn direction_to(&self, other: Self) -> f64 {
        (other - *self).direction()
    }

    /// Classifies how close `self` is to `other`.
    #[must_use]
    pub fn collision(&self, other: Self) -> CollisionKind {
        CollisionKind::classify(*self, other)
    }

    /// Returns a copy with `x` snapped to multiples of `modulus` and `y`
    /// snapped to multiples offset by `y_offset`.
    #[must_use]
    pub const fn snapped(&self, modulus: i32, y_offset: i32) -> Self {
        Self {
            x: round_to_multiple(self.x, modulus),
            y: round_to_multiple(self.y.saturating_sub(y_offset), modulus).saturating_add(y_offset),
        }
    }
}

impl Add for Coord {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_add(rhs.x), self.y.saturating_add(rhs.y))
    }
}

impl AddAssign for Coord {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Coord {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x.saturating_sub(rhs.x), self.y.saturating_sub(rhs.y))
    }
}

impl SubAssign for Coord {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Neg for Coord {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(self.x.saturating_neg(), self.y.saturating_neg())
    }
}

impl Mul<i32> for Coord {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.x.saturating_mul(rhs), self.y.saturating_mul(rhs))
    }
}

/// Truncating integer division on each axis.
impl Div<i32> for Coord {
    type Output = Self;
    fn div(self, rhs: i32) -> Self {
        Self::new(self.x.saturating_div(rhs), self.y.saturating_div(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_to_units_rounds_half_away_from_zero() {
        assert_eq!(float_to_units(0.5), 8);
        assert_eq!(float_to_units(1.0 / 32.0), 1);
        assert_eq!(float_to_units(-1.0 / 32.0), -1);
        assert_eq!(float_to_units(-0.5), -8);
        assert_eq!(float_to_units(0.0), 0);
    }

    #[test]
    fn round_to_multiple_is_symmetric() {
        assert_eq!(round_to_multiple(7, 16), 0);
        assert_eq!(round_to_multiple(8, 16), 16);
        assert_eq!(round_to_multiple(-8, 16), -16);
        assert_eq!(round_to_multiple(-7, 16), 0);
        assert_eq!(round_to_multiple(5, 0), 5);
        assert_eq!(round_to_multiple(9, -16), 16);
        assert_eq!(round_to_multiple(i32::MAX, 16), i32::MAX / 16 * 16);
    }

    #[test]
    fn arithmetic_saturates() {
        let far = Coord::new(i32::MAX, i32::MIN);
        assert_eq!(far + Coord::new(1, -1), far);
        assert_eq!(-far, Coord::new(-i32::MAX, i32::MAX));
        assert!(far.dm_magnitude().is_finite());
        assert!(far.length_squared_units() > 0);
    }

    #[test]
    fn directions_follow_field_convention() {
        assert!((Coord::from_steps(1, 0).direction() - 0.0).abs() < 1e-9);
        assert!((Coord::from_steps(0, -1).direction() - 90.0).abs() < 1e-9);
        assert!((Coord::from_steps(-1, 0).direction() - 180.0).abs() < 1e-9);
        assert!((Coord::from_steps(0, 1).direction() + 90.0).abs() < 1e-9);
        assert!(Coord::ZERO.direction().abs() < f64::EPSILON);
    }

    #[test]
    fn dm_magnitude_counts_diagonal_steps() {
        assert!((Coord::from_steps(3, -3).dm_magnitude() - 3.0).abs() < 1e-9);
        assert!((Coord::from_steps(3, 4).dm_magnitude() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn snapping_applies_y_offset() {
        let c = Coord::new(37, 40);
        let s = c.snapped(32, 32);
        assert_eq!(s, Coord::new(32, 32));
    }
}
