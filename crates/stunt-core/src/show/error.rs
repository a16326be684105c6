// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use thiserror::Error;

use super::MarcherId;

/// Structural problems that keep a show's marchers from being executed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// Marchers whose reference points follow each other in a loop.
    #[error("cyclic reference between marchers {marchers:?}")]
    CyclicReference {
        /// Every marcher on a cycle, ascending.
        marchers: Vec<MarcherId>,
    },
    /// A reference names a marcher the sheet does not have.
    #[error("marcher {marcher} references unknown marcher {target}")]
    UnknownMarcher {
        /// The referring marcher.
        marcher: MarcherId,
        /// The missing marcher.
        target: MarcherId,
    },
    /// Reference slots are `R1` through `R3`.
    #[error("reference point R{0} is out of range")]
    ReferenceOutOfRange(u8),
    /// No sheet at this index.
    #[error("no sheet at index {0}")]
    UnknownSheet(usize),
    /// Every sheet must place the same marchers.
    #[error("sheet {sheet} has {found} points, expected {expected}")]
    PointCountMismatch {
        /// Offending sheet index.
        sheet: usize,
        /// Points on the first sheet.
        expected: usize,
        /// Points on the offending sheet.
        found: usize,
    },
}
