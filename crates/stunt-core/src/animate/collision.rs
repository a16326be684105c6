// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};
use stunt_geom::broad::{BroadPhase, UniformGrid};
use stunt_geom::{Coord, CollisionKind};

use crate::show::MarcherId;

/// Which separations count as collisions.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Only marchers closer than one step.
    #[default]
    IntersectOnly,
    /// Marchers exactly one step apart as well.
    IncludeWarnings,
}

impl CollisionPolicy {
    /// Returns `true` when a pair of this kind belongs in a [`CollisionSet`].
    #[must_use]
    pub const fn admits(self, kind: CollisionKind) -> bool {
        match kind {
            CollisionKind::None => false,
            CollisionKind::Warning => matches!(self, Self::IncludeWarnings),
            CollisionKind::Intersect => true,
        }
    }
}

/// Marcher pairs that collide on one beat.
///
/// Pairs are stored once, as `(low, high)`, sorted ascending; lookups accept
/// either order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionSet {
    pairs: Vec<(MarcherId, MarcherId, CollisionKind)>,
}

impl CollisionSet {
    /// Finds every admitted pair among `positions` (indexed by marcher).
    #[must_use]
    pub fn detect(positions: &[Coord], policy: CollisionPolicy) -> Self {
        let mut grid = UniformGrid::new();
        for (id, position) in positions.iter().enumerate() {
            grid.upsert(id, *position);
        }
        let pairs = grid
            .pairs()
            .into_iter()
            .filter_map(|(a, b)| {
                let kind = CollisionKind::classify(positions[a], positions[b]);
                policy
                    .admits(kind)
                    .then_some((MarcherId(a), MarcherId(b), kind))
            })
            .collect();
        Self { pairs }
    }

    /// Returns `true` when nobody collides.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of colliding pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// How `a` and `b` collide, [`CollisionKind::None`] if they don't.
    #[must_use]
    pub fn kind(&self, a: MarcherId, b: MarcherId) -> CollisionKind {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.pairs
            .binary_search_by(|(x, y, _)| (*x, *y).cmp(&key))
            .map_or(CollisionKind::None, |i| self.pairs[i].2)
    }

    /// Returns `true` when `a` and `b` collide, in either order.
    #[must_use]
    pub fn contains(&self, a: MarcherId, b: MarcherId) -> bool {
        self.kind(a, b).is_collision()
    }

    /// Worst collision `marcher` is part of.
    #[must_use]
    pub fn worst_for(&self, marcher: MarcherId) -> CollisionKind {
        self.pairs
            .iter()
            .filter(|(a, b, _)| *a == marcher || *b == marcher)
            .map(|(_, _, k)| *k)
            .max()
            .unwrap_or_default()
    }

    /// Canonical pairs with their kinds.
    pub fn iter(&self) -> impl Iterator<Item = (MarcherId, MarcherId, CollisionKind)> + '_ {
        self.pairs.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_symmetric_and_classified() {
        let positions = [
            Coord::ZERO,
            Coord::new(8, 0),
            Coord::from_steps(1, 1),
            Coord::from_steps(10, 10),
            Coord::from_steps(11, 10),
        ];
        let strict = CollisionSet::detect(&positions, CollisionPolicy::IntersectOnly);
        assert_eq!(strict.len(), 1);
        assert!(strict.contains(MarcherId(1), MarcherId(0)));
        assert!(strict.contains(MarcherId(0), MarcherId(1)));
        assert!(!strict.contains(MarcherId(3), MarcherId(4)));

        let loose = CollisionSet::detect(&positions, CollisionPolicy::IncludeWarnings);
        assert_eq!(loose.kind(MarcherId(4), MarcherId(3)), CollisionKind::Warning);
        assert_eq!(loose.worst_for(MarcherId(0)), CollisionKind::Intersect);
        assert_eq!(loose.worst_for(MarcherId(2)), CollisionKind::None);
    }
}
