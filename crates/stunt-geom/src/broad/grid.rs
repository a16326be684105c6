// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use std::collections::{BTreeMap, BTreeSet};

use super::{within_one_step, BroadPhase};
use crate::coord::{Coord, UNITS_PER_STEP};

type Cell = (i32, i32);

/// Spatial hash with one-step cells.
///
/// Two marchers within one step of each other always sit in the same or an
/// adjacent cell, so only the 3x3 neighbourhood of each cell is compared.
#[derive(Debug, Default, Clone)]
pub struct UniformGrid {
    positions: BTreeMap<usize, Coord>,
    cells: BTreeMap<Cell, BTreeSet<usize>>,
}

impl UniformGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cell_of(position: Coord) -> Cell {
        (
            position.x.div_euclid(UNITS_PER_STEP),
            position.y.div_euclid(UNITS_PER_STEP),
        )
    }

    fn detach(&mut self, id: usize, position: Coord) {
        let cell = Self::cell_of(position);
        if let Some(members) = self.cells.get_mut(&cell) {
            members.remove(&id);
            if members.is_empty() {
                self.cells.remove(&cell);
            }
        }
    }
}

impl BroadPhase for UniformGrid {
    fn upsert(&mut self, id: usize, position: Coord) {
        if let Some(old) = self.positions.insert(id, position) {
            self.detach(id, old);
        }
        self.cells
            .entry(Self::cell_of(position))
            .or_default()
            .insert(id);
    }

    fn remove(&mut self, id: usize) {
        if let Some(old) = self.positions.remove(&id) {
            self.detach(id, old);
        }
    }

    fn pairs(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (&id, &position) in &self.positions {
            let (cx, cy) = Self::cell_of(position);
            for nx in cx - 1..=cx + 1 {
                for ny in cy - 1..=cy + 1 {
                    let Some(members) = self.cells.get(&(nx, ny)) else {
                        continue;
                    };
                    for &other in members.range(id + 1..) {
                        if within_one_step(position, self.positions[&other]) {
                            out.push((id, other));
                        }
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }
}
