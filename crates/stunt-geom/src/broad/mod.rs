// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Broad-phase pairing of marchers that may be colliding.
//!
//! Determinism contract (applies to all implementations here):
//! - Pair identity is canonicalized as `(min_id, max_id)`.
//! - The emitted pair list is strictly sorted lexicographically by that tuple.
//! - A pair is emitted when both axis separations are at most one step
//!   (inclusive), which is a superset of every non-`None` [`CollisionKind`].
//!
//! [`AllPairs`] is the `O(n^2)` baseline; [`UniformGrid`] buckets marchers
//! into one-step cells and only compares neighbouring cells. Both produce the
//! same list for the same input.
//!
//! [`CollisionKind`]: crate::CollisionKind

mod grid;

use std::collections::BTreeMap;

pub use grid::UniformGrid;

use crate::coord::{Coord, UNITS_PER_STEP};

/// Broad-phase interface for inserting marcher positions and querying
/// candidate pairs.
///
/// Implementations must return pairs deterministically: the pair `(a, b)` is
/// canonicalized such that `a < b`, and the full list is sorted ascending by
/// `(a, b)`.
pub trait BroadPhase {
    /// Inserts or updates the marcher with the given `id`.
    fn upsert(&mut self, id: usize, position: Coord);
    /// Removes a marcher if present.
    fn remove(&mut self, id: usize);
    /// Returns a canonical, deterministically-ordered list of nearby pairs.
    fn pairs(&self) -> Vec<(usize, usize)>;
}

/// Returns `true` when `a` and `b` are within one step on both axes.
#[must_use]
pub fn within_one_step(a: Coord, b: Coord) -> bool {
    let dx = (i64::from(a.x) - i64::from(b.x)).abs();
    let dy = (i64::from(a.y) - i64::from(b.y)).abs();
    let step = i64::from(UNITS_PER_STEP);
    dx <= step && dy <= step
}

/// All-pairs broad phase over a sorted map.
#[derive(Debug, Default, Clone)]
pub struct AllPairs {
    items: BTreeMap<usize, Coord>,
}

impl AllPairs {
    /// Creates an empty broad phase.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl BroadPhase for AllPairs {
    fn upsert(&mut self, id: usize, position: Coord) {
        self.items.insert(id, position);
    }

    fn remove(&mut self, id: usize) {
        self.items.remove(&id);
    }

    fn pairs(&self) -> Vec<(usize, usize)> {
        // BTreeMap iteration is sorted by key, so the nested loop already
        // emits canonical pairs in order.
        let items: Vec<(usize, Coord)> = self.items.iter().map(|(id, c)| (*id, *c)).collect();
        let mut out = Vec::new();
        for (i, (a_id, a)) in items.iter().enumerate() {
            for (b_id, b) in items.iter().skip(i + 1) {
                if within_one_step(*a, *b) {
                    out.push((*a_id, *b_id));
                }
            }
        }
        out
    }
}
