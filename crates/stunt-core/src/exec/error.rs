// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::continuity::Span;

/// Problems found while executing a marcher's procedures on one sheet.
///
/// None of these stop execution. The marcher keeps going with a fallback
/// value (0, or its current position) and the problem is reported as data.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Error, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AnimateErrorKind {
    /// A procedure needed more beats than were left.
    #[error("Ran out of time")]
    OutOfTime,
    /// The procedures finished before the sheet did.
    #[error("Not enough to do")]
    ExtraTime,
    /// The marcher did not end on its next-sheet position.
    #[error("Didn't make it to position")]
    WrongPlace,
    /// Countermarch geometry does not pass through the marcher.
    #[error("Invalid countermarch")]
    InvalidCountermarch,
    /// Fountain directions cannot reach the destination.
    #[error("Invalid fountain")]
    InvalidFountain,
    /// Division by zero; the quotient is treated as 0.
    #[error("Division by zero")]
    DivisionByZero,
    /// Unset variable, missing next sheet, or direction between equal points.
    #[error("Undefined value")]
    Undefined,
    /// The continuity text failed to compile.
    #[error("Syntax error")]
    Syntax,
    /// A value used as a count was not a whole number.
    #[error("Non-integer value")]
    NonInteger,
    /// A value used as a count was negative.
    #[error("Negative value")]
    NegativeInteger,
    /// Reference points between marchers form a cycle.
    #[error("Cyclic reference between marchers")]
    CyclicReference,
}

/// An execution problem and the procedure that raised it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What went wrong.
    pub kind: AnimateErrorKind,
    /// The procedure being executed, or `None` for end-of-sheet fix-ups.
    pub span: Option<Span>,
}
