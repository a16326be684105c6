// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Collision classification between two marchers.

use serde::{Deserialize, Serialize};

use crate::coord::{Coord, UNITS_PER_STEP};

/// How close two marchers are.
///
/// Ordered by severity so the worst of several collisions is `max()`.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CollisionKind {
    /// More than one step apart.
    #[default]
    None,
    /// Exactly one step apart.
    Warning,
    /// Closer than one step.
    Intersect,
}

impl CollisionKind {
    /// Classifies the separation between `a` and `b`.
    #[must_use]
    pub fn classify(a: Coord, b: Coord) -> Self {
        let dx = i64::from(a.x) - i64::from(b.x);
        let dy = i64::from(a.y) - i64::from(b.y);
        let step = i64::from(UNITS_PER_STEP);
        if dx.abs() > step || dy.abs() > step {
            return Self::None;
        }
        let dist_sq = dx * dx + dy * dy;
        let step_sq = step * step;
        match dist_sq.cmp(&step_sq) {
            core::cmp::Ordering::Less => Self::Intersect,
            core::cmp::Ordering::Equal => Self::Warning,
            core::cmp::Ordering::Greater => Self::None,
        }
    }

    /// Returns `true` for anything other than [`CollisionKind::None`].
    #[must_use]
    pub const fn is_collision(self) -> bool {
        !matches!(self, Self::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_apart_is_a_warning() {
        assert_eq!(
            CollisionKind::classify(Coord::ZERO, Coord::from_steps(1, 0)),
            CollisionKind::Warning
        );
        assert_eq!(
            CollisionKind::classify(Coord::ZERO, Coord::from_steps(1, 1)),
            CollisionKind::None
        );
        assert_eq!(
            CollisionKind::classify(Coord::ZERO, Coord::new(8, 8)),
            CollisionKind::Intersect
        );
    }

    #[test]
    fn severity_orders_worst_last() {
        assert!(CollisionKind::Intersect > CollisionKind::Warning);
        assert!(CollisionKind::Warning > CollisionKind::None);
    }
}
