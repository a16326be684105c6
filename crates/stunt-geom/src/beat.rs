// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};

/// Global beat index across a whole show.
///
/// Beat 0 is the first beat of the first animated sheet. This newtype keeps
/// global beats from being confused with beats inside a single sheet.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Beat {
    index: usize,
}

impl Beat {
    /// Creates a beat with the given index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self { index }
    }

    /// Returns the beat index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Returns the following beat.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            index: self.index + 1,
        }
    }
}

impl From<usize> for Beat {
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}
